use thiserror::Error;

/// The user stream ended with an error. Terminal for that subscription; the
/// bridge does not resubscribe on its own.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("user stream terminated: {reason}")]
pub struct StreamTerminated {
    pub reason: String,
}

impl StreamTerminated {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// A commit's underlying write failed. Scoped to that commit call; the
/// stream subscription is unaffected.
#[derive(Debug, Error)]
#[error("failed to persist user update: {source}")]
pub struct PersistenceError {
    #[from]
    pub source: anyhow::Error,
}
