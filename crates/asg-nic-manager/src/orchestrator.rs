//! Attach-or-compensate orchestration of the management interface
//!
//! ```text
//! START -> SUBNET_RESOLVED -> INTERFACE_CREATED -> ATTACHED -> FINALIZED
//!                                     |               |
//!                                     +-> COMPENSATING <+ -> ABANDONED
//! ```
//!
//! Whether an interface exists yet is the only compensation trigger. Failures
//! before `create_interface` succeeds leave nothing behind; failures after it
//! delete the interface (once, no retries) before the error is returned.

use crate::aws::gateway::{InterfaceSpec, ResourceGateway};
use crate::error::{AttachError, ProvisioningError};
use asg_nic_common::{InstanceSnapshot, LifecycleEvent, TargetConfig};
use tracing::{debug, error, info, warn};

/// Orchestration states, logged on every transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum AttachState {
    Start,
    SubnetResolved,
    InterfaceCreated,
    Attached,
    Finalized,
    Compensating,
    Abandoned,
}

/// An interface created during orchestration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionedInterface {
    pub interface_id: String,
    /// Set once the attach call succeeds
    pub attachment_id: Option<String>,
}

/// Runs the attach sequence for one event against a gateway
pub struct AttachOrchestrator<'a, G> {
    gateway: &'a G,
    config: &'a TargetConfig,
}

impl<'a, G: ResourceGateway> AttachOrchestrator<'a, G> {
    pub fn new(gateway: &'a G, config: &'a TargetConfig) -> Self {
        Self { gateway, config }
    }

    /// Create, attach, and finalize the management interface for the instance.
    ///
    /// On success the interface is attached and marked delete-on-termination.
    /// On failure nothing created here is left behind, unless the cleanup
    /// itself failed ([`AttachError::CompensationFailed`]).
    pub async fn attach(
        &self,
        event: &LifecycleEvent,
        snapshot: &InstanceSnapshot,
    ) -> Result<ProvisionedInterface, AttachError> {
        let instance_id = event.instance_id.as_str();
        enter(instance_id, AttachState::Start);

        let subnet_id = match self.config.subnets.resolve(&snapshot.availability_zone) {
            Ok(subnet_id) => subnet_id,
            Err(e) => {
                error!(instance_id = %instance_id, error = %e, "Cannot resolve subnet");
                enter(instance_id, AttachState::Abandoned);
                return Err(e.into());
            }
        };
        enter(instance_id, AttachState::SubnetResolved);

        let spec = InterfaceSpec {
            subnet_id: subnet_id.to_string(),
            security_group_id: self.config.security_group_id.clone(),
            instance_id: instance_id.to_string(),
            asg_name: event.asg_name.clone(),
        };
        let interface_id = match self.gateway.create_interface(spec).await {
            Ok(interface_id) => interface_id,
            Err(e) => {
                error!(instance_id = %instance_id, error = %e, "Failed to create interface");
                enter(instance_id, AttachState::Abandoned);
                return Err(AttachError::Create(e));
            }
        };
        let mut interface = ProvisionedInterface {
            interface_id,
            attachment_id: None,
        };
        enter(instance_id, AttachState::InterfaceCreated);

        let attachment_id = match self
            .gateway
            .attach_interface(&interface.interface_id, instance_id)
            .await
        {
            Ok(attachment_id) => attachment_id,
            Err(cause) => return Err(self.compensate(instance_id, interface, cause).await),
        };
        interface.attachment_id = Some(attachment_id.clone());
        enter(instance_id, AttachState::Attached);

        if let Err(cause) = self
            .gateway
            .mark_delete_on_termination(&attachment_id, &interface.interface_id)
            .await
        {
            return Err(self.compensate(instance_id, interface, cause).await);
        }
        enter(instance_id, AttachState::Finalized);

        info!(
            instance_id = %instance_id,
            interface_id = %interface.interface_id,
            attachment_id = %attachment_id,
            "Management interface attached"
        );
        Ok(interface)
    }

    /// Delete a created interface after `cause` and build the resulting error.
    ///
    /// Runs to completion once started. The delete is attempted exactly once.
    async fn compensate(
        &self,
        instance_id: &str,
        interface: ProvisionedInterface,
        cause: ProvisioningError,
    ) -> AttachError {
        enter(instance_id, AttachState::Compensating);
        warn!(
            instance_id = %instance_id,
            interface_id = %interface.interface_id,
            attachment_id = ?interface.attachment_id,
            error = %cause,
            "Unable to attach interface, deleting it"
        );

        let result = match self.gateway.delete_interface(&interface.interface_id).await {
            Ok(()) => {
                info!(interface_id = %interface.interface_id, "Deleted interface");
                AttachError::Compensated {
                    interface_id: interface.interface_id,
                    cause,
                }
            }
            Err(cleanup) => {
                // Not retried; the managed tags let an external sweep find it
                error!(
                    interface_id = %interface.interface_id,
                    error = %cleanup,
                    "Failed to delete interface, it may be orphaned"
                );
                AttachError::CompensationFailed {
                    interface_id: interface.interface_id,
                    cause,
                    cleanup,
                }
            }
        };

        enter(instance_id, AttachState::Abandoned);
        result
    }
}

fn enter(instance_id: &str, state: AttachState) {
    debug!(instance_id = %instance_id, %state, "Attach state");
}
