//! Error taxonomy for lifecycle event handling
//!
//! Attachment failures keep the compensable and non-compensable paths as
//! separate variants so the outcome reporter and operators can tell whether
//! a resource was created (and whether it was cleaned up).

use crate::aws::AwsError;
use crate::aws::gateway::GatewayOperation;
use crate::eligibility::Ineligibility;
use asg_nic_common::{LifecycleDecision, MalformedEventError, UnresolvedSubnetError};
use thiserror::Error;

/// A gateway call failed
#[derive(Debug, Error)]
#[error("{operation} failed: {source}")]
pub struct ProvisioningError {
    pub operation: GatewayOperation,
    #[source]
    pub source: AwsError,
}

impl ProvisioningError {
    pub fn new(operation: GatewayOperation, source: AwsError) -> Self {
        Self { operation, source }
    }
}

/// Attachment of the management interface failed
#[derive(Debug, Error)]
pub enum AttachError {
    /// Nothing was created: the instance's zone has no configured subnet
    #[error(transparent)]
    UnresolvedSubnet(#[from] UnresolvedSubnetError),

    /// Nothing was created: the create call itself failed
    #[error("could not create management interface: {0}")]
    Create(#[source] ProvisioningError),

    /// A step after creation failed and the interface was deleted
    #[error("{cause} (interface {interface_id} deleted)")]
    Compensated {
        interface_id: String,
        #[source]
        cause: ProvisioningError,
    },

    /// A step after creation failed and deleting the interface failed too
    #[error("{cause} (cleanup of interface {interface_id} also failed: {cleanup})")]
    CompensationFailed {
        interface_id: String,
        #[source]
        cause: ProvisioningError,
        cleanup: ProvisioningError,
    },
}

impl AttachError {
    /// Whether a resource had been created when the failure happened
    pub fn is_compensable(&self) -> bool {
        matches!(
            self,
            Self::Compensated { .. } | Self::CompensationFailed { .. }
        )
    }

    /// The provisioning failure that ended the attachment, if any
    pub fn cause(&self) -> Option<&ProvisioningError> {
        match self {
            Self::UnresolvedSubnet(_) => None,
            Self::Create(cause)
            | Self::Compensated { cause, .. }
            | Self::CompensationFailed { cause, .. } => Some(cause),
        }
    }

    /// Interface left behind because its cleanup failed
    pub fn orphaned_interface(&self) -> Option<&str> {
        match self {
            Self::CompensationFailed { interface_id, .. } => Some(interface_id.as_str()),
            _ => None,
        }
    }
}

/// Failure of one lifecycle event invocation
#[derive(Debug, Error)]
pub enum HandlerError {
    /// Payload could not be parsed; no report was possible
    #[error(transparent)]
    MalformedEvent(#[from] MalformedEventError),

    /// The instance could not be described
    #[error("could not describe instance: {0}")]
    Describe(#[source] ProvisioningError),

    /// The instance is not one this handler attaches interfaces to
    #[error("instance is not eligible: {0}")]
    Ineligible(#[from] Ineligibility),

    /// Attaching the management interface failed
    #[error("management interface attachment failed: {0}")]
    Attach(#[from] AttachError),

    /// Reporting the decision failed after every earlier step succeeded
    #[error("could not report {decision} to the lifecycle hook: {source}")]
    Reporting {
        decision: LifecycleDecision,
        #[source]
        source: ProvisioningError,
    },
}
