//! Auto Scaling lifecycle action completion

use super::context::AwsContext;
use super::error::{AwsError, classify_sdk_error};
use asg_nic_common::{LifecycleDecision, LifecycleEvent};
use aws_sdk_autoscaling::Client;
use tracing::{debug, info};

/// Auto Scaling client for completing lifecycle actions
pub struct AutoScalingClient {
    client: Client,
}

impl AutoScalingClient {
    /// Create an Auto Scaling client from a pre-loaded AWS context
    pub fn from_context(ctx: &AwsContext) -> Self {
        Self {
            client: ctx.autoscaling_client(),
        }
    }

    /// Report the lifecycle action result for the event's hook and token
    pub async fn complete_lifecycle_action(
        &self,
        event: &LifecycleEvent,
        decision: LifecycleDecision,
    ) -> Result<(), AwsError> {
        debug!(
            hook = %event.hook_name,
            asg = %event.asg_name,
            instance_id = %event.instance_id,
            %decision,
            "Completing lifecycle action"
        );

        self.client
            .complete_lifecycle_action()
            .lifecycle_hook_name(&event.hook_name)
            .auto_scaling_group_name(&event.asg_name)
            .instance_id(&event.instance_id)
            .lifecycle_action_token(&event.action_token)
            .lifecycle_action_result(decision.to_string())
            .send()
            .await
            .map_err(|e| classify_sdk_error(&e))?;

        info!(instance_id = %event.instance_id, %decision, "Lifecycle action completed");
        Ok(())
    }
}
