//! Resource gateway: the external capability surface of the handler
//!
//! Each method is one logical AWS call, attempted once. Failures are wrapped
//! in [`ProvisioningError`] naming the operation that failed.

use super::autoscaling::AutoScalingClient;
use super::context::AwsContext;
use super::ec2::{Ec2Client, interface_tag_spec};
use super::error::AwsError;
use crate::error::ProvisioningError;
use asg_nic_common::{InstanceSnapshot, LifecycleDecision, LifecycleEvent, tags};
use chrono::Utc;
use tracing::warn;

/// Gateway operations, named in errors and logs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum GatewayOperation {
    DescribeInstance,
    CreateInterface,
    AttachInterface,
    MarkDeleteOnTermination,
    DeleteInterface,
    ReportOutcome,
}

/// Everything needed to create one management interface
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceSpec {
    pub subnet_id: String,
    pub security_group_id: String,
    /// Instance the interface is created for (tagging and description only)
    pub instance_id: String,
    /// Auto Scaling group that launched the instance (tagging and description only)
    pub asg_name: String,
}

impl InterfaceSpec {
    pub fn description(&self) -> String {
        format!(
            "Management interface for {} ({})",
            self.instance_id, self.asg_name
        )
    }
}

/// Trait for the provisioning calls the handler makes, mockable in tests.
///
/// No method retries internally.
#[allow(async_fn_in_trait)] // Internal use only, Send+Sync bounds on trait are sufficient
#[cfg_attr(test, mockall::automock)]
pub trait ResourceGateway: Send + Sync {
    /// Describe the instance the event refers to
    async fn describe_instance(&self, instance_id: &str)
    -> Result<InstanceSnapshot, ProvisioningError>;

    /// Create a tagged network interface, returning its id
    async fn create_interface(&self, spec: InterfaceSpec) -> Result<String, ProvisioningError>;

    /// Attach an interface at the management device index, returning the attachment id
    async fn attach_interface(
        &self,
        interface_id: &str,
        instance_id: &str,
    ) -> Result<String, ProvisioningError>;

    /// Set DeleteOnTermination on the attachment
    async fn mark_delete_on_termination(
        &self,
        attachment_id: &str,
        interface_id: &str,
    ) -> Result<(), ProvisioningError>;

    /// Delete an interface; an interface that no longer exists counts as deleted
    async fn delete_interface(&self, interface_id: &str) -> Result<(), ProvisioningError>;

    /// Complete the lifecycle action for the event with `decision`
    async fn report_outcome(
        &self,
        event: &LifecycleEvent,
        decision: LifecycleDecision,
    ) -> Result<(), ProvisioningError>;
}

/// AWS-backed gateway over EC2 and Auto Scaling
pub struct AwsGateway {
    ec2: Ec2Client,
    autoscaling: AutoScalingClient,
}

impl AwsGateway {
    pub fn new(ec2: Ec2Client, autoscaling: AutoScalingClient) -> Self {
        Self { ec2, autoscaling }
    }

    /// Create both clients from a pre-loaded AWS context
    pub fn from_context(ctx: &AwsContext) -> Self {
        Self::new(
            Ec2Client::from_context(ctx),
            AutoScalingClient::from_context(ctx),
        )
    }
}

/// Wrap an AWS error with the failed operation, logging any known remedy
fn failed(operation: GatewayOperation) -> impl FnOnce(AwsError) -> ProvisioningError {
    move |source| {
        if let Some(suggestion) = source.suggestion() {
            warn!(%operation, error = %source, suggestion, "AWS call failed");
        }
        ProvisioningError::new(operation, source)
    }
}

impl ResourceGateway for AwsGateway {
    async fn describe_instance(
        &self,
        instance_id: &str,
    ) -> Result<InstanceSnapshot, ProvisioningError> {
        self.ec2
            .describe_instance(instance_id)
            .await
            .map_err(failed(GatewayOperation::DescribeInstance))
    }

    async fn create_interface(&self, spec: InterfaceSpec) -> Result<String, ProvisioningError> {
        let tags = interface_tag_spec(&tags::interface_tags(
            &spec.instance_id,
            &spec.asg_name,
            Utc::now(),
        ));

        self.ec2
            .create_interface(
                &spec.subnet_id,
                &spec.security_group_id,
                &spec.description(),
                tags,
            )
            .await
            .map_err(failed(GatewayOperation::CreateInterface))
    }

    async fn attach_interface(
        &self,
        interface_id: &str,
        instance_id: &str,
    ) -> Result<String, ProvisioningError> {
        self.ec2
            .attach_interface(interface_id, instance_id)
            .await
            .map_err(failed(GatewayOperation::AttachInterface))
    }

    async fn mark_delete_on_termination(
        &self,
        attachment_id: &str,
        interface_id: &str,
    ) -> Result<(), ProvisioningError> {
        self.ec2
            .mark_delete_on_termination(attachment_id, interface_id)
            .await
            .map_err(failed(GatewayOperation::MarkDeleteOnTermination))
    }

    async fn delete_interface(&self, interface_id: &str) -> Result<(), ProvisioningError> {
        self.ec2
            .delete_interface(interface_id)
            .await
            .map_err(failed(GatewayOperation::DeleteInterface))
    }

    async fn report_outcome(
        &self,
        event: &LifecycleEvent,
        decision: LifecycleDecision,
    ) -> Result<(), ProvisioningError> {
        self.autoscaling
            .complete_lifecycle_action(event, decision)
            .await
            .map_err(failed(GatewayOperation::ReportOutcome))
    }
}
