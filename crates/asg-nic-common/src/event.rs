//! EventBridge lifecycle hook event parsing
//!
//! Only presence of the required `detail` keys is checked here; whether the
//! event is one the handler should act on is decided after the instance has
//! been described.

use serde::Deserialize;
use thiserror::Error;

/// Inbound payload is missing a required field (or is not shaped like an event)
#[derive(Debug, Error)]
#[error("Malformed lifecycle event: {0}")]
pub struct MalformedEventError(#[from] serde_json::Error);

/// A parsed `EC2 Instance-launch Lifecycle Action` event.
///
/// Identity is `(hook_name, instance_id, action_token)`; the token is
/// single-use per the lifecycle hook contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecycleEvent {
    pub instance_id: String,
    pub asg_name: String,
    pub destination: String,
    pub hook_name: String,
    pub action_token: String,
}

#[derive(Deserialize)]
struct Envelope {
    detail: Detail,
}

#[derive(Deserialize)]
struct Detail {
    #[serde(rename = "EC2InstanceId")]
    instance_id: String,
    #[serde(rename = "AutoScalingGroupName")]
    asg_name: String,
    #[serde(rename = "Destination")]
    destination: String,
    #[serde(rename = "LifecycleHookName")]
    hook_name: String,
    #[serde(rename = "LifecycleActionToken")]
    action_token: String,
}

impl From<Envelope> for LifecycleEvent {
    fn from(envelope: Envelope) -> Self {
        let Detail {
            instance_id,
            asg_name,
            destination,
            hook_name,
            action_token,
        } = envelope.detail;
        Self {
            instance_id,
            asg_name,
            destination,
            hook_name,
            action_token,
        }
    }
}

impl LifecycleEvent {
    /// Parse an already-decoded JSON payload
    pub fn parse(raw: &serde_json::Value) -> Result<Self, MalformedEventError> {
        Ok(Envelope::deserialize(raw)?.into())
    }
}
