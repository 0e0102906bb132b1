//! AWS client modules for the handler
//!
//! This module provides wrappers around AWS SDK clients for:
//! - EC2: instance description and network interface management
//! - Auto Scaling: lifecycle action completion
//! - gateway: the mockable [`ResourceGateway`] the orchestration runs against

pub mod autoscaling;
pub mod context;
pub mod ec2;
pub mod error;
pub mod gateway;

pub use autoscaling::AutoScalingClient;
pub use context::AwsContext;
pub use ec2::Ec2Client;
pub use error::{AwsError, classify_aws_error, classify_sdk_error};
pub use gateway::{AwsGateway, GatewayOperation, InterfaceSpec, ResourceGateway};

#[cfg(test)]
pub use gateway::MockResourceGateway;
