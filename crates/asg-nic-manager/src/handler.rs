//! Entry coordinator: one lifecycle event, start to finish
//!
//! parse -> describe instance -> eligibility -> attach -> report. Every
//! event that parses reaches exactly one report; a payload that does not
//! parse carries no usable token and is never reported.

use crate::aws::gateway::ResourceGateway;
use crate::eligibility;
use crate::error::HandlerError;
use crate::orchestrator::{AttachOrchestrator, ProvisionedInterface};
use crate::reporter::{HandledEvent, OutcomeReporter};
use asg_nic_common::{LifecycleEvent, TargetConfig};
use tracing::info;

/// Handles lifecycle events against one gateway and configuration
pub struct LifecycleHandler<G> {
    gateway: G,
    config: TargetConfig,
}

impl<G: ResourceGateway> LifecycleHandler<G> {
    pub fn new(gateway: G, config: TargetConfig) -> Self {
        Self { gateway, config }
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Parse and handle a raw EventBridge payload
    pub async fn handle_raw(&self, raw: &serde_json::Value) -> Result<HandledEvent, HandlerError> {
        let event = LifecycleEvent::parse(raw)?;
        self.handle(&event).await
    }

    /// Handle a parsed event, reporting exactly one decision for it
    pub async fn handle(&self, event: &LifecycleEvent) -> Result<HandledEvent, HandlerError> {
        info!(
            instance_id = %event.instance_id,
            asg = %event.asg_name,
            hook = %event.hook_name,
            "Processing lifecycle event"
        );

        let result = self.provision(event).await;
        OutcomeReporter::new(&self.gateway).finish(event, result).await
    }

    async fn provision(&self, event: &LifecycleEvent) -> Result<ProvisionedInterface, HandlerError> {
        let snapshot = self
            .gateway
            .describe_instance(&event.instance_id)
            .await
            .map_err(HandlerError::Describe)?;

        eligibility::check(event, &snapshot)?;

        let interface = AttachOrchestrator::new(&self.gateway, &self.config)
            .attach(event, &snapshot)
            .await?;
        Ok(interface)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aws::AwsError;
    use crate::aws::gateway::{GatewayOperation, MockResourceGateway};
    use crate::eligibility::Ineligibility;
    use crate::error::{AttachError, ProvisioningError};
    use asg_nic_common::{InstanceSnapshot, LifecycleDecision, SubnetResolver};
    use serde_json::json;
    use std::collections::BTreeMap;

    fn raw_event(destination: &str) -> serde_json::Value {
        json!({
            "detail-type": "EC2 Instance-launch Lifecycle Action",
            "source": "aws.autoscaling",
            "detail": {
                "LifecycleActionToken": "87654321-4321-4321-4321-210987654321",
                "AutoScalingGroupName": "my-asg",
                "LifecycleHookName": "my-lifecycle-hook",
                "EC2InstanceId": "i-1234567890abcdef0",
                "LifecycleTransition": "autoscaling:EC2_INSTANCE_LAUNCHING",
                "Destination": destination
            }
        })
    }

    fn config() -> TargetConfig {
        TargetConfig::new(
            SubnetResolver::ByZone(BTreeMap::from([(
                "us-east-1a".to_string(),
                "subnet-123".to_string(),
            )])),
            "sg-1",
        )
    }

    fn expect_describe(gateway: &mut MockResourceGateway, zone: &'static str, nics: usize) {
        gateway
            .expect_describe_instance()
            .withf(|instance_id| instance_id == "i-1234567890abcdef0")
            .times(1)
            .returning(move |_| Ok(InstanceSnapshot::new(zone, nics)));
    }

    fn expect_report(gateway: &mut MockResourceGateway, decision: LifecycleDecision) {
        gateway
            .expect_report_outcome()
            .withf(move |event, d| {
                event.hook_name == "my-lifecycle-hook"
                    && event.asg_name == "my-asg"
                    && event.instance_id == "i-1234567890abcdef0"
                    && event.action_token == "87654321-4321-4321-4321-210987654321"
                    && *d == decision
            })
            .times(1)
            .returning(|_, _| Ok(()));
    }

    #[tokio::test]
    async fn test_eligible_instance_proceeds() {
        let mut gateway = MockResourceGateway::new();
        expect_describe(&mut gateway, "us-east-1a", 0);
        gateway
            .expect_create_interface()
            .withf(|spec| spec.subnet_id == "subnet-123")
            .times(1)
            .returning(|_| Ok("eni-1".to_string()));
        gateway
            .expect_attach_interface()
            .times(1)
            .returning(|_, _| Ok("att-1".to_string()));
        gateway
            .expect_mark_delete_on_termination()
            .times(1)
            .returning(|_, _| Ok(()));
        gateway.expect_delete_interface().never();
        expect_report(&mut gateway, LifecycleDecision::Proceed);

        let handler = LifecycleHandler::new(gateway, config());
        let handled = handler.handle_raw(&raw_event("AutoScalingGroup")).await.unwrap();

        assert_eq!(handled.decision, LifecycleDecision::Proceed);
        assert_eq!(handled.interface.interface_id, "eni-1");
        assert_eq!(handled.interface.attachment_id.as_deref(), Some("att-1"));
    }

    #[tokio::test]
    async fn test_wrong_destination_abandons_without_create() {
        let mut gateway = MockResourceGateway::new();
        expect_describe(&mut gateway, "us-east-1a", 1);
        gateway.expect_create_interface().never();
        expect_report(&mut gateway, LifecycleDecision::Abandon);

        let handler = LifecycleHandler::new(gateway, config());
        let err = handler.handle_raw(&raw_event("WarmPool")).await.unwrap_err();

        assert!(matches!(err, HandlerError::Ineligible(Ineligibility::Destination(_))));
    }

    #[tokio::test]
    async fn test_multi_nic_instance_abandons_without_gateway_writes() {
        let mut gateway = MockResourceGateway::new();
        expect_describe(&mut gateway, "us-east-1a", 2);
        gateway.expect_create_interface().never();
        gateway.expect_attach_interface().never();
        expect_report(&mut gateway, LifecycleDecision::Abandon);

        let handler = LifecycleHandler::new(gateway, config());
        let err = handler.handle_raw(&raw_event("AutoScalingGroup")).await.unwrap_err();

        assert!(matches!(
            err,
            HandlerError::Ineligible(Ineligibility::TooManyInterfaces(2))
        ));
    }

    #[tokio::test]
    async fn test_unmapped_zone_abandons() {
        let mut gateway = MockResourceGateway::new();
        expect_describe(&mut gateway, "us-east-1c", 1);
        gateway.expect_create_interface().never();
        expect_report(&mut gateway, LifecycleDecision::Abandon);

        let handler = LifecycleHandler::new(gateway, config());
        let err = handler.handle_raw(&raw_event("AutoScalingGroup")).await.unwrap_err();

        assert!(matches!(
            err,
            HandlerError::Attach(AttachError::UnresolvedSubnet(_))
        ));
    }

    #[tokio::test]
    async fn test_describe_failure_abandons() {
        let mut gateway = MockResourceGateway::new();
        gateway
            .expect_describe_instance()
            .times(1)
            .returning(|_| {
                Err(ProvisioningError::new(
                    GatewayOperation::DescribeInstance,
                    AwsError::Sdk {
                        code: Some("UnauthorizedOperation".to_string()),
                        message: "unauthorized".to_string(),
                    },
                ))
            });
        gateway.expect_create_interface().never();
        expect_report(&mut gateway, LifecycleDecision::Abandon);

        let handler = LifecycleHandler::new(gateway, config());
        let err = handler.handle_raw(&raw_event("AutoScalingGroup")).await.unwrap_err();

        assert!(matches!(err, HandlerError::Describe(_)));
    }

    #[tokio::test]
    async fn test_malformed_event_is_never_reported() {
        let mut gateway = MockResourceGateway::new();
        gateway.expect_describe_instance().never();
        gateway.expect_report_outcome().never();

        let handler = LifecycleHandler::new(gateway, config());
        let err = handler.handle_raw(&json!({"foo": "bar"})).await.unwrap_err();

        assert!(matches!(err, HandlerError::MalformedEvent(_)));
    }
}
