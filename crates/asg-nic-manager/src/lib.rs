//! asg-nic-manager - management network interface attachment for Auto Scaling launches
//!
//! Reacts to an EC2 Auto Scaling lifecycle hook event for a launching
//! instance, attaches a pre-configured management interface, and reports
//! CONTINUE or ABANDON back to the lifecycle hook.
//!
//! ## Modules
//!
//! - [`aws`]: EC2 / Auto Scaling clients and the [`ResourceGateway`] trait
//! - [`eligibility`]: whether a described instance should get an interface
//! - [`orchestrator`]: create, attach, and finalize with compensation on failure
//! - [`reporter`]: the single lifecycle action completion per event
//! - [`handler`]: wires the above together for one event
//! - [`wait`]: bounded polling with exponential backoff

pub mod aws;
pub mod eligibility;
pub mod error;
pub mod handler;
pub mod orchestrator;
pub mod reporter;
pub mod wait;

pub use aws::{AwsContext, AwsGateway, GatewayOperation, InterfaceSpec, ResourceGateway};
pub use error::{AttachError, HandlerError, ProvisioningError};
pub use handler::LifecycleHandler;
pub use orchestrator::{AttachOrchestrator, AttachState, ProvisionedInterface};
pub use reporter::{HandledEvent, OutcomeReporter};
