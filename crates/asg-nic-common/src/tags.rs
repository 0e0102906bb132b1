//! Resource tag schema for created network interfaces
//!
//! Every interface the handler creates carries these tags so an external
//! sweep can find interfaces left behind by a failed cleanup.
//!
//! ## Tag Schema
//!
//! | Tag Key | Description |
//! |---------|-------------|
//! | `asg-nic-manager:managed` | Static marker ("true") |
//! | `asg-nic-manager:instance-id` | Instance the interface was created for |
//! | `asg-nic-manager:asg-name` | Auto Scaling group that launched the instance |
//! | `asg-nic-manager:created-at` | RFC 3339 creation timestamp |
//! | `Name` | `asg-nic-manager-<instance-id>` |

use chrono::{DateTime, Utc};

/// Tag key marking a resource as managed by this tool
pub const TAG_MANAGED: &str = "asg-nic-manager:managed";

/// Tag value for the managed marker
pub const TAG_MANAGED_VALUE: &str = "true";

/// Tag key for the owning instance
pub const TAG_INSTANCE_ID: &str = "asg-nic-manager:instance-id";

/// Tag key for the launching Auto Scaling group
pub const TAG_ASG_NAME: &str = "asg-nic-manager:asg-name";

/// Tag key for creation timestamp (RFC 3339 format)
pub const TAG_CREATED_AT: &str = "asg-nic-manager:created-at";

/// Helper to format creation timestamp for tags
pub fn format_created_at(time: DateTime<Utc>) -> String {
    time.to_rfc3339()
}

/// Name tag value for the management interface of an instance
pub fn interface_name(instance_id: &str) -> String {
    format!("asg-nic-manager-{instance_id}")
}

/// Full tag set for a management interface created for an instance
pub fn interface_tags(
    instance_id: &str,
    asg_name: &str,
    created_at: DateTime<Utc>,
) -> Vec<(&'static str, String)> {
    vec![
        (TAG_MANAGED, TAG_MANAGED_VALUE.to_string()),
        (TAG_INSTANCE_ID, instance_id.to_string()),
        (TAG_ASG_NAME, asg_name.to_string()),
        (TAG_CREATED_AT, format_created_at(created_at)),
        ("Name", interface_name(instance_id)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_interface_tags() {
        let created_at = Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap();
        let tags = interface_tags("i-abc", "sensors", created_at);

        assert!(tags.contains(&(TAG_MANAGED, "true".to_string())));
        assert!(tags.contains(&(TAG_INSTANCE_ID, "i-abc".to_string())));
        assert!(tags.contains(&(TAG_ASG_NAME, "sensors".to_string())));
        assert!(tags.contains(&(TAG_CREATED_AT, "2026-10-16T12:00:00+00:00".to_string())));
        assert!(tags.contains(&("Name", "asg-nic-manager-i-abc".to_string())));
    }
}
