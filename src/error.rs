use std::path::PathBuf;

use uuid::Uuid;

use crate::switch::Phase;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    // ── I/O boundary ─────────────────────────────────────────────────────────
    #[error("cannot read profile {}: {reason}", path.display())]
    ReadFailure { path: PathBuf, reason: String },

    #[error("cannot write profile {}: {reason}", path.display())]
    WriteFailure { path: PathBuf, reason: String },

    #[error("cannot {op} last context in {}: {reason}", path.display())]
    StoreFailure {
        op: &'static str,
        path: PathBuf,
        reason: String,
    },

    // ── Domain ───────────────────────────────────────────────────────────────
    #[error("subscription not found: {0}")]
    SubscriptionNotFound(String),

    #[error("tenant not found: {0}")]
    TenantNotFound(Uuid),

    #[error("no candidates to select from")]
    NoCandidates,

    #[error("no tenants found in profile")]
    NoTenants,

    #[error("no previous context, switch subscription at least once first")]
    NoPreviousContext,

    #[error("stored previous context id is not a valid UUID: {0:?}")]
    InvalidStoredIdentifier(String),

    #[error("invalid tenant ID")]
    InvalidTenantId,

    #[error("custom name cannot be empty")]
    EmptyName,

    #[error("selected index {index} is out of range ({len} candidates)")]
    SelectionOutOfRange { index: usize, len: usize },

    // ── Validation ───────────────────────────────────────────────────────────
    #[error("configuration is empty or has no installation ID")]
    EmptyConfiguration,

    #[error("invalid tenant {id}: {reason}")]
    InvalidTenant { id: Uuid, reason: &'static str },

    #[error("invalid subscription {id}: {reason}")]
    InvalidSubscription { id: Uuid, reason: &'static str },

    // ── Control ──────────────────────────────────────────────────────────────
    #[error("selection aborted")]
    Aborted,

    #[error("deadline exceeded while {phase}")]
    DeadlineExceeded { phase: Phase },

    #[error("picker failed: {0}")]
    PickerFailure(String),
}

impl Error {
    /// User cancelled an interactive pick; callers exit quietly with status 0.
    pub fn is_aborted(&self) -> bool {
        matches!(self, Error::Aborted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_aborted_is_aborted() {
        assert!(Error::Aborted.is_aborted());
        assert!(!Error::NoCandidates.is_aborted());
        assert!(!Error::DeadlineExceeded {
            phase: Phase::Resolving
        }
        .is_aborted());
    }

    #[test]
    fn io_failures_name_the_path() {
        let err = Error::ReadFailure {
            path: PathBuf::from("/tmp/azureProfile.json"),
            reason: "expected value at line 1 column 1".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("/tmp/azureProfile.json"));
        assert!(msg.contains("line 1"));
    }
}
