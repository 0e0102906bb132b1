//! Outcome reporting: exactly one lifecycle action completion per event

use crate::aws::gateway::ResourceGateway;
use crate::error::HandlerError;
use crate::orchestrator::ProvisionedInterface;
use asg_nic_common::{LifecycleDecision, LifecycleEvent};
use tracing::{error, info, warn};

/// Result of a successfully handled event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandledEvent {
    pub interface: ProvisionedInterface,
    pub decision: LifecycleDecision,
}

/// Decision for a processing result: success proceeds, any failure abandons
pub fn decide<T, E>(result: &Result<T, E>) -> LifecycleDecision {
    match result {
        Ok(_) => LifecycleDecision::Proceed,
        Err(_) => LifecycleDecision::Abandon,
    }
}

/// Reports the decision for an event's processing result
pub struct OutcomeReporter<'a, G> {
    gateway: &'a G,
}

impl<'a, G: ResourceGateway> OutcomeReporter<'a, G> {
    pub fn new(gateway: &'a G) -> Self {
        Self { gateway }
    }

    /// Report the decision for `result` and return the invocation outcome.
    ///
    /// `report_outcome` is called exactly once. A failed ABANDON report is
    /// logged and the original error is returned; a failed PROCEED report
    /// becomes [`HandlerError::Reporting`].
    pub async fn finish(
        &self,
        event: &LifecycleEvent,
        result: Result<ProvisionedInterface, HandlerError>,
    ) -> Result<HandledEvent, HandlerError> {
        let decision = decide(&result);
        let report = self.gateway.report_outcome(event, decision).await;

        match (result, report) {
            (Ok(interface), Ok(())) => {
                info!(instance_id = %event.instance_id, %decision, "Lifecycle action completed successfully");
                Ok(HandledEvent { interface, decision })
            }
            (Ok(interface), Err(source)) => {
                // Interface stays attached with delete-on-termination set
                error!(
                    instance_id = %event.instance_id,
                    interface_id = %interface.interface_id,
                    error = %source,
                    "Failed to report lifecycle decision; hook will time out"
                );
                Err(HandlerError::Reporting { decision, source })
            }
            (Err(e), Ok(())) => {
                warn!(instance_id = %event.instance_id, %decision, error = %e, "Abandoned lifecycle action");
                Err(e)
            }
            (Err(e), Err(report_error)) => {
                error!(
                    instance_id = %event.instance_id,
                    %decision,
                    error = %e,
                    report_error = %report_error,
                    "Failed to report lifecycle decision; hook will time out"
                );
                Err(e)
            }
        }
    }
}
