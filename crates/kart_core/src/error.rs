use thiserror::Error;

use crate::matching::PilotId;

/// Internal-consistency failures of the matching engine.
///
/// These indicate a bug in the layered search, never a bad input: the
/// engine accepts any graph and any car list.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MatchingError {
    #[error("Matching invariant violated at layer {layer}: {reason}")]
    InvariantViolation { layer: usize, reason: String },
}

impl MatchingError {
    pub(crate) fn invariant(layer: usize, reason: impl Into<String>) -> Self {
        MatchingError::InvariantViolation { layer, reason: reason.into() }
    }

    /// Re-running the engine on the same input hits the same bug.
    pub fn is_recoverable(&self) -> bool {
        false
    }
}

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("No cars selected for the session")]
    NoCarsSelected,

    #[error("Invalid group {group} (session has {group_count} groups)")]
    InvalidGroup { group: u32, group_count: u32 },

    #[error("Unknown pilot {pilot} (session has {pilot_count} pilots)")]
    UnknownPilot { pilot: PilotId, pilot_count: u32 },

    #[error("Pilot {pilot} is not in group {group}")]
    PilotNotInGroup { pilot: PilotId, group: u32 },

    #[error("Group {group} has {size} pilots but only {cars} cars are available")]
    GroupTooLarge { group: u32, size: usize, cars: usize },

    #[error("Race number mismatch for group {group}: expected {expected}, found {found}")]
    RaceNumberMismatch { group: u32, expected: u32, found: u32 },

    #[error("Race history is empty")]
    EmptyHistory,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Matching(#[from] MatchingError),
}

impl SessionError {
    pub fn is_recoverable(&self) -> bool {
        match self {
            SessionError::Matching(err) => err.is_recoverable(),
            SessionError::Config(_) => false,
            _ => true,
        }
    }
}

impl From<serde_json::Error> for SessionError {
    fn from(err: serde_json::Error) -> Self {
        SessionError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SessionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matching_error_is_fatal() {
        let err = MatchingError::invariant(0, "augmenting search at layer 0");
        assert!(!err.is_recoverable());
        assert!(err.to_string().contains("layer 0"));

        let wrapped: SessionError = err.into();
        assert!(!wrapped.is_recoverable());
    }

    #[test]
    fn test_caller_errors_are_recoverable() {
        assert!(SessionError::EmptyHistory.is_recoverable());
        assert!(SessionError::InvalidGroup { group: 3, group_count: 2 }.is_recoverable());
        assert_eq!(
            SessionError::GroupTooLarge { group: 1, size: 6, cars: 5 }.to_string(),
            "Group 1 has 6 pilots but only 5 cars are available"
        );
    }
}
