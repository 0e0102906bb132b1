//! Fixed values shared across the handler
//!
//! These constants pin the contract with the Auto Scaling lifecycle hook and
//! the deployment environment.

/// Environment variable holding the target subnet (an id or a zone-to-subnet JSON object)
pub const ENV_TARGET_SUBNET: &str = "TARGET_SUBNET";

/// Environment variable holding the security group applied to the management interface
pub const ENV_TARGET_SECURITY_GROUP_ID: &str = "TARGET_SECURITY_GROUP_ID";

/// Lifecycle hook destination for the scale-out path
pub const AUTO_SCALING_GROUP_DESTINATION: &str = "AutoScalingGroup";

/// Device index the management interface is attached at (0 is the primary NIC)
pub const MANAGEMENT_DEVICE_INDEX: i32 = 1;

/// Instances carrying more interfaces than this are left alone
pub const MAX_EXISTING_INTERFACES: usize = 1;

/// Upper bound on waiting for a forced detach before deleting an interface
pub const DEFAULT_DETACH_TIMEOUT_SECS: u64 = 60;
