//! Ledger checkpoint: JSON snapshot and restore of every session.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Ledger, NegotiationSession, RepetitionPolicy};
use crate::error::{CheckpointError, NegotiationResult};

/// A complete ledger snapshot for serialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerCheckpoint {
    /// Schema version for forward compatibility.
    pub version: u32,
    /// When the snapshot was taken.
    pub created_at: DateTime<Utc>,
    /// Repetition policy the ledger was running with.
    pub policy: RepetitionPolicy,
    /// Every session, in pair order.
    pub sessions: Vec<NegotiationSession>,
}

impl LedgerCheckpoint {
    /// Current schema version.
    pub const CURRENT_VERSION: u32 = 1;

    pub fn new(ledger: &Ledger) -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            created_at: Utc::now(),
            policy: ledger.policy(),
            sessions: ledger.sessions().cloned().collect(),
        }
    }

    /// Rebuild the ledger this checkpoint was taken from.
    pub fn into_ledger(self) -> Ledger {
        Ledger::from_sessions(self.sessions, self.policy)
    }

    pub fn to_json(&self) -> Result<String, CheckpointError> {
        serde_json::to_string_pretty(self).map_err(|e| CheckpointError::SerializeFailed {
            reason: e.to_string(),
        })
    }

    pub fn from_json(json: &str) -> Result<Self, CheckpointError> {
        let checkpoint: Self =
            serde_json::from_str(json).map_err(|e| CheckpointError::DeserializeFailed {
                reason: e.to_string(),
            })?;

        if checkpoint.version > Self::CURRENT_VERSION {
            return Err(CheckpointError::VersionMismatch {
                expected: Self::CURRENT_VERSION,
                found: checkpoint.version,
            });
        }

        Ok(checkpoint)
    }
}

impl Ledger {
    pub fn checkpoint(&self) -> LedgerCheckpoint {
        LedgerCheckpoint::new(self)
    }

    /// Write a JSON checkpoint to `path`.
    pub fn save(&self, path: &Path) -> NegotiationResult<()> {
        let json = self.checkpoint().to_json()?;
        std::fs::write(path, json).map_err(|e| CheckpointError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Ok(())
    }

    /// Restore a ledger from a JSON checkpoint at `path`.
    pub fn load(path: &Path) -> NegotiationResult<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| CheckpointError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Ok(LedgerCheckpoint::from_json(&json)?.into_ledger())
    }
}
