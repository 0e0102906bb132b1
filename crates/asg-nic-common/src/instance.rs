//! Described instance state

/// The slice of a described EC2 instance the handler needs.
///
/// Fetched once per event and passed by value through eligibility and
/// attachment; never cached across events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceSnapshot {
    /// Availability zone from the instance placement (e.g. "us-east-1a")
    pub availability_zone: String,
    /// Number of network interfaces already attached, primary included
    pub network_interface_count: usize,
}

impl InstanceSnapshot {
    pub fn new(availability_zone: impl Into<String>, network_interface_count: usize) -> Self {
        Self {
            availability_zone: availability_zone.into(),
            network_interface_count,
        }
    }
}
