//! asg-nic-common - Shared types for the management NIC lifecycle handler
//!
//! This crate holds the pure data model of the handler, without any AWS SDK
//! dependencies, so it can be tested and reused without AWS credentials.
//!
//! ## Modules
//!
//! - [`config`]: Target subnet and security group configuration
//! - [`decision`]: Lifecycle action result reported back to the Auto Scaling group
//! - [`defaults`]: Environment variable names and fixed values
//! - [`event`]: EventBridge lifecycle hook event parsing
//! - [`instance`]: Described instance state used for eligibility
//! - [`tags`]: Tag schema applied to created network interfaces

pub mod config;
pub mod decision;
pub mod defaults;
pub mod event;
pub mod instance;
pub mod tags;

// Re-export commonly used types
pub use config::{ConfigError, SubnetResolver, TargetConfig, UnresolvedSubnetError};
pub use decision::LifecycleDecision;
pub use event::{LifecycleEvent, MalformedEventError};
pub use instance::InstanceSnapshot;
