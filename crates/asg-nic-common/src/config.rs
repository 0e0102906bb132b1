//! Target network configuration
//!
//! The subnet for the management interface is either a single subnet id or
//! a JSON object keyed by availability zone. Both forms load into one
//! [`SubnetResolver`] so the attach path never branches on configuration shape.

use crate::defaults::{ENV_TARGET_SECURITY_GROUP_ID, ENV_TARGET_SUBNET};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Configuration loading errors (fatal at startup)
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required variable is unset or empty
    #[error("environment variable ${0} is not defined")]
    Missing(&'static str),

    /// Mapping-form subnet value is not a JSON object of strings
    #[error("${var} is not a valid zone-to-subnet JSON object: {source}")]
    InvalidSubnetMap {
        var: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// Mapping-form subnet value has no entries
    #[error("${0} maps no availability zones")]
    EmptySubnetMap(&'static str),

    /// A zone maps to an empty subnet id
    #[error("${var} maps availability zone '{zone}' to an empty subnet id")]
    EmptySubnetId { var: &'static str, zone: String },
}

/// The instance's availability zone has no configured subnet
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "no subnet configured for availability zone '{zone}' (configured zones: {})",
    configured.join(", ")
)]
pub struct UnresolvedSubnetError {
    pub zone: String,
    pub configured: Vec<String>,
}

/// Subnet selection for the management interface
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubnetResolver {
    /// Same subnet for every zone
    Fixed(String),
    /// Subnet looked up by the instance's availability zone
    ByZone(BTreeMap<String, String>),
}

impl SubnetResolver {
    /// Parse a `TARGET_SUBNET` value.
    ///
    /// A value that looks like JSON (starts with `{`, `[` or `"`) must be a
    /// zone-to-subnet object; anything else is a single subnet id.
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let raw = raw.trim();
        if !raw.starts_with(['{', '[', '"']) {
            return Ok(Self::Fixed(raw.to_string()));
        }

        let map: BTreeMap<String, String> =
            serde_json::from_str(raw).map_err(|source| ConfigError::InvalidSubnetMap {
                var: ENV_TARGET_SUBNET,
                source,
            })?;

        if map.is_empty() {
            return Err(ConfigError::EmptySubnetMap(ENV_TARGET_SUBNET));
        }
        if let Some((zone, _)) = map.iter().find(|(_, subnet)| subnet.trim().is_empty()) {
            return Err(ConfigError::EmptySubnetId {
                var: ENV_TARGET_SUBNET,
                zone: zone.clone(),
            });
        }

        Ok(Self::ByZone(
            map.into_iter()
                .map(|(zone, subnet)| (zone, subnet.trim().to_string()))
                .collect(),
        ))
    }

    /// Subnet for an instance placed in `zone`
    pub fn resolve(&self, zone: &str) -> Result<&str, UnresolvedSubnetError> {
        match self {
            Self::Fixed(subnet) => Ok(subnet.as_str()),
            Self::ByZone(map) => {
                map.get(zone)
                    .map(String::as_str)
                    .ok_or_else(|| UnresolvedSubnetError {
                        zone: zone.to_string(),
                        configured: map.keys().cloned().collect(),
                    })
            }
        }
    }
}

impl fmt::Display for SubnetResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(subnet) => f.write_str(subnet),
            Self::ByZone(map) => {
                let pairs: Vec<String> = map
                    .iter()
                    .map(|(zone, subnet)| format!("{zone}={subnet}"))
                    .collect();
                write!(f, "{{{}}}", pairs.join(", "))
            }
        }
    }
}

/// Where management interfaces are created. Loaded once per invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetConfig {
    pub subnets: SubnetResolver,
    pub security_group_id: String,
}

impl TargetConfig {
    pub fn new(subnets: SubnetResolver, security_group_id: impl Into<String>) -> Self {
        Self {
            subnets,
            security_group_id: security_group_id.into(),
        }
    }

    /// Load from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using an arbitrary variable lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .ok_or(ConfigError::Missing(key))
        };

        let subnet = required(ENV_TARGET_SUBNET)?;
        let security_group_id = required(ENV_TARGET_SECURITY_GROUP_ID)?;

        Ok(Self {
            subnets: SubnetResolver::parse(&subnet)?,
            security_group_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_fixed_subnet() {
        let config = TargetConfig::from_lookup(lookup(&[
            ("TARGET_SUBNET", "subnet-123"),
            ("TARGET_SECURITY_GROUP_ID", "sg-456"),
        ]))
        .unwrap();

        assert_eq!(config.subnets, SubnetResolver::Fixed("subnet-123".to_string()));
        assert_eq!(config.security_group_id, "sg-456");
        assert_eq!(config.subnets.resolve("any-zone").unwrap(), "subnet-123");
    }

    #[test]
    fn test_zone_map() {
        let config = TargetConfig::from_lookup(lookup(&[
            (
                "TARGET_SUBNET",
                r#"{"us-east-1a": "subnet-123", "us-east-1b": " subnet-456 "}"#,
            ),
            ("TARGET_SECURITY_GROUP_ID", "sg-1"),
        ]))
        .unwrap();

        assert_eq!(config.subnets.resolve("us-east-1a").unwrap(), "subnet-123");
        assert_eq!(config.subnets.resolve("us-east-1b").unwrap(), "subnet-456");
    }

    #[test]
    fn test_unmapped_zone_names_zone_and_configured_zones() {
        let resolver =
            SubnetResolver::parse(r#"{"us-east-1a": "subnet-123", "us-east-1b": "subnet-456"}"#)
                .unwrap();

        let err = resolver.resolve("us-east-1c").unwrap_err();
        assert_eq!(err.zone, "us-east-1c");
        assert_eq!(err.configured, vec!["us-east-1a", "us-east-1b"]);
        assert_eq!(
            err.to_string(),
            "no subnet configured for availability zone 'us-east-1c' (configured zones: us-east-1a, us-east-1b)"
        );
    }

    #[test]
    fn test_missing_variables() {
        let err = TargetConfig::from_lookup(lookup(&[("TARGET_SECURITY_GROUP_ID", "sg-1")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Missing("TARGET_SUBNET")));

        let err = TargetConfig::from_lookup(lookup(&[("TARGET_SUBNET", "subnet-1")])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("TARGET_SECURITY_GROUP_ID")));
    }

    #[test]
    fn test_empty_value_counts_as_missing() {
        let err = TargetConfig::from_lookup(lookup(&[
            ("TARGET_SUBNET", "  "),
            ("TARGET_SECURITY_GROUP_ID", "sg-1"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Missing("TARGET_SUBNET")));
    }

    #[test]
    fn test_malformed_zone_map() {
        let err = SubnetResolver::parse(r#"{"us-east-1a": "#).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidSubnetMap { .. }));

        let err = SubnetResolver::parse(r#"{"us-east-1a": 7}"#).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidSubnetMap { .. }));
    }

    #[test]
    fn test_non_object_json_is_not_a_subnet_id() {
        for raw in [r#"["subnet-1"]"#, r#""subnet-1""#, " [] "] {
            let err = SubnetResolver::parse(raw).unwrap_err();
            assert!(
                matches!(err, ConfigError::InvalidSubnetMap { var: "TARGET_SUBNET", .. }),
                "{raw} should be rejected, got {err}"
            );
        }
    }

    #[test]
    fn test_empty_zone_map_rejected() {
        assert!(matches!(
            SubnetResolver::parse("{}").unwrap_err(),
            ConfigError::EmptySubnetMap(_)
        ));
        assert!(matches!(
            SubnetResolver::parse(r#"{"us-east-1a": ""}"#).unwrap_err(),
            ConfigError::EmptySubnetId { zone, .. } if zone == "us-east-1a"
        ));
    }

    #[test]
    fn test_display() {
        assert_eq!(SubnetResolver::Fixed("subnet-1".into()).to_string(), "subnet-1");
        let resolver =
            SubnetResolver::parse(r#"{"us-east-1b": "subnet-2", "us-east-1a": "subnet-1"}"#)
                .unwrap();
        assert_eq!(
            resolver.to_string(),
            "{us-east-1a=subnet-1, us-east-1b=subnet-2}"
        );
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            ConfigError::Missing("TARGET_SUBNET").to_string(),
            "environment variable $TARGET_SUBNET is not defined"
        );
    }
}
