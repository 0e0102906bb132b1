//! Lifecycle action result
//!
//! Exactly one decision is reported per lifecycle event. The wire values
//! are the ones `CompleteLifecycleAction` accepts.

/// Outcome reported to the Auto Scaling lifecycle hook
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[strum(ascii_case_insensitive)]
pub enum LifecycleDecision {
    /// Let the instance enter service
    #[strum(to_string = "CONTINUE", serialize = "PROCEED")]
    Proceed,
    /// Roll the instance back
    #[strum(to_string = "ABANDON")]
    Abandon,
}
