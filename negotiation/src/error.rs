//! Error types shared by every negotiation component.

use thiserror::Error;

/// Result type alias for negotiation operations
pub type NegotiationResult<T> = Result<T, NegotiationError>;

/// Errors that can occur in the negotiation core
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NegotiationError {
    /// A ranking premise compared a criterion with a value.
    #[error("types mismatch: cannot rank {better} against {worse}")]
    TypeMismatch { better: String, worse: String },

    /// No session was pre-allocated for this pair of agents.
    #[error("unknown negotiation pair ({first}, {second})")]
    UnknownPair { first: String, second: String },

    /// An argument without a rating premise was handed to the ledger.
    #[error("argument about {item} has no rating premise")]
    Ungrounded { item: String },

    /// Ledger checkpoint could not be written or restored.
    #[error("checkpoint error: {0}")]
    Checkpoint(#[from] CheckpointError),
}

/// Errors raised while persisting or restoring a ledger checkpoint
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CheckpointError {
    #[error("serialize failed: {reason}")]
    SerializeFailed { reason: String },

    #[error("deserialize failed: {reason}")]
    DeserializeFailed { reason: String },

    #[error("version mismatch: expected at most {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },

    #[error("io error on {path}: {reason}")]
    Io { path: String, reason: String },
}

impl NegotiationError {
    pub(crate) fn unknown_pair(first: &str, second: &str) -> Self {
        Self::UnknownPair {
            first: first.to_string(),
            second: second.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = NegotiationError::unknown_pair("Alice", "Zed");
        assert_eq!(err.to_string(), "unknown negotiation pair (Alice, Zed)");

        let err: NegotiationError = CheckpointError::VersionMismatch {
            expected: 1,
            found: 3,
        }
        .into();
        assert_eq!(
            err.to_string(),
            "checkpoint error: version mismatch: expected at most 1, found 3"
        );
    }
}
