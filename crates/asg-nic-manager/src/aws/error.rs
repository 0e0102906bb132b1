//! AWS error classification and handling
//!
//! Provides typed errors for AWS SDK operations using the `.code()` method
//! instead of string matching on Debug format.

use crate::wait::WaitTimeout;
use aws_sdk_ec2::error::ProvideErrorMetadata;
use thiserror::Error;

/// AWS error categories used by cleanup and operator diagnostics
#[derive(Debug, Error)]
pub enum AwsError {
    /// Resource was not found (safe to skip in cleanup)
    #[error("Resource not found ({code}): {message}")]
    NotFound { code: String, message: String },

    /// Rate limit exceeded
    #[error("Rate limit exceeded ({code}): {message}")]
    Throttled { code: String, message: String },

    /// Resource has dependent objects (e.g. interface still attached)
    #[error("Resource has dependent objects ({code}): {message}")]
    DependencyViolation { code: String, message: String },

    /// Request was rejected as invalid
    #[error("Invalid request ({code}): {message}")]
    InvalidParameter { code: String, message: String },

    /// Successful response lacked a field the caller relies on
    #[error("Response is missing {0}")]
    MissingField(&'static str),

    /// A bounded wait on resource state ran out
    #[error(transparent)]
    Timeout(#[from] WaitTimeout),

    /// Generic AWS SDK error with code and message
    #[error("AWS error: {message}")]
    Sdk {
        code: Option<String>,
        message: String,
    },
}

impl AwsError {
    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, AwsError::NotFound { .. })
    }

    /// AWS error code, when the service returned one
    pub fn code(&self) -> Option<&str> {
        match self {
            AwsError::NotFound { code, .. }
            | AwsError::Throttled { code, .. }
            | AwsError::DependencyViolation { code, .. }
            | AwsError::InvalidParameter { code, .. } => Some(code.as_str()),
            AwsError::Sdk { code, .. } => code.as_deref(),
            _ => None,
        }
    }

    /// Get a user-friendly suggestion for resolving this error, if available.
    pub fn suggestion(&self) -> Option<&'static str> {
        self.code().and_then(suggestion_for_code)
    }
}

/// Known AWS error codes for "not found" conditions
const NOT_FOUND_CODES: &[&str] = &[
    "InvalidInstanceID.NotFound",
    "InvalidNetworkInterfaceID.NotFound",
    "InvalidAttachmentID.NotFound",
    "InvalidSubnetID.NotFound",
    "InvalidGroup.NotFound",
];

/// Known AWS error codes for throttling/rate limiting
const THROTTLING_CODES: &[&str] = &["Throttling", "ThrottlingException", "RequestLimitExceeded"];

/// Known AWS error codes for dependency violations (resource still in use)
const DEPENDENCY_CODES: &[&str] = &["DependencyViolation", "InvalidNetworkInterface.InUse"];

/// Known AWS error codes for rejected requests
const INVALID_PARAMETER_CODES: &[&str] = &[
    "InvalidParameterValue",
    "InvalidParameterCombination",
    "InvalidParameter",
    "ValidationError",
];

/// Classify an AWS error from its code and message.
pub fn classify_aws_error(code: Option<&str>, message: Option<&str>) -> AwsError {
    let message = message.unwrap_or("Unknown error").to_string();

    match code {
        Some(c) if NOT_FOUND_CODES.contains(&c) => AwsError::NotFound {
            code: c.to_string(),
            message,
        },
        Some(c) if THROTTLING_CODES.contains(&c) => AwsError::Throttled {
            code: c.to_string(),
            message,
        },
        Some(c) if DEPENDENCY_CODES.contains(&c) => AwsError::DependencyViolation {
            code: c.to_string(),
            message,
        },
        Some(c) if INVALID_PARAMETER_CODES.contains(&c) => AwsError::InvalidParameter {
            code: c.to_string(),
            message,
        },
        _ => AwsError::Sdk {
            code: code.map(|s| s.to_string()),
            message,
        },
    }
}

/// Classify any AWS SDK operation error.
///
/// Works for both the EC2 and Auto Scaling clients since `SdkError<E, R>`
/// exposes the service error code through `ProvideErrorMetadata`. Errors
/// without service metadata (dispatch failures, timeouts) keep the full
/// source chain as their message.
pub fn classify_sdk_error<E>(error: &E) -> AwsError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
{
    match error.message() {
        Some(message) => classify_aws_error(error.code(), Some(message)),
        None => classify_aws_error(error.code(), Some(&error_chain(error))),
    }
}

fn error_chain(error: &(dyn std::error::Error + 'static)) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

/// Error code to user-friendly suggestion mapping
const SUGGESTIONS: &[(&str, &str)] = &[
    (
        "InvalidSubnetID.NotFound",
        "Check $TARGET_SUBNET; the subnet does not exist in this region.",
    ),
    (
        "InvalidGroup.NotFound",
        "Check $TARGET_SECURITY_GROUP_ID; the group does not exist or belongs to another VPC.",
    ),
    (
        "InvalidParameterCombination",
        "The interface subnet must be in the instance's availability zone. Configure $TARGET_SUBNET as a zone-to-subnet map.",
    ),
    (
        "AttachmentLimitExceeded",
        "The instance type does not support another network interface.",
    ),
    (
        "NetworkInterfaceLimitExceeded",
        "Request a network interface quota increase via AWS Service Quotas console.",
    ),
    (
        "InsufficientFreeAddressesInSubnet",
        "The target subnet has no free addresses left.",
    ),
    (
        "UnauthorizedOperation",
        "The execution role is missing an EC2 permission for this call.",
    ),
    (
        "AccessDenied",
        "The execution role is missing an Auto Scaling permission for this call.",
    ),
    (
        "Throttling",
        "AWS API rate limit hit. The lifecycle hook can be retried by the next launch.",
    ),
    (
        "RequestLimitExceeded",
        "AWS API rate limit hit. The lifecycle hook can be retried by the next launch.",
    ),
];

/// Get a user-friendly suggestion for a known error code.
fn suggestion_for_code(code: &str) -> Option<&'static str> {
    SUGGESTIONS
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, s)| *s)
}
