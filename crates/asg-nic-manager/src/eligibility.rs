//! Eligibility of a described instance for a management interface
//!
//! Rules run in order and the first failing rule decides. Runs once per
//! event, after the instance has been described.

use asg_nic_common::defaults::{AUTO_SCALING_GROUP_DESTINATION, MAX_EXISTING_INTERFACES};
use asg_nic_common::{InstanceSnapshot, LifecycleEvent};
use thiserror::Error;
use tracing::warn;

/// Why an instance was not eligible
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Ineligibility {
    /// Hook fired for something other than the scale-out path
    #[error(
        "destination should be '{expected}' but is '{0}'",
        expected = AUTO_SCALING_GROUP_DESTINATION
    )]
    Destination(String),

    /// Instance already carries more than its primary interface
    #[error(
        "instance has {0} network interfaces, at most {max} allowed",
        max = MAX_EXISTING_INTERFACES
    )]
    TooManyInterfaces(usize),
}

/// Check the rules, returning the first one that fails
pub fn check(event: &LifecycleEvent, snapshot: &InstanceSnapshot) -> Result<(), Ineligibility> {
    let result = if event.destination != AUTO_SCALING_GROUP_DESTINATION {
        Err(Ineligibility::Destination(event.destination.clone()))
    } else if snapshot.network_interface_count > MAX_EXISTING_INTERFACES {
        Err(Ineligibility::TooManyInterfaces(
            snapshot.network_interface_count,
        ))
    } else {
        Ok(())
    };

    if let Err(reason) = &result {
        warn!(instance_id = %event.instance_id, %reason, "Instance is not eligible");
    }
    result
}

pub fn is_eligible(event: &LifecycleEvent, snapshot: &InstanceSnapshot) -> bool {
    check(event, snapshot).is_ok()
}
