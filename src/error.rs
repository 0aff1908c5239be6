//! Error types for navigation.
//!
//! Every public operation in this crate returns [`NavigationError`]. The
//! variants fall into a handful of classes (usage errors, cancellation,
//! builder conflicts, content errors, collaborator failures), and the
//! classification helpers let callers branch on the class without matching
//! every variant.

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T, E = NavigationError> = std::result::Result<T, E>;

/// Navigation error.
#[derive(Debug, Error)]
pub enum NavigationError {
    /// A verb or builder was requested before `initialize`.
    #[error("navigator is not initialized")]
    NotInitialized,

    /// `initialize` was called a second time.
    #[error("navigator is already initialized")]
    AlreadyInitialized,

    /// The navigator has been disposed.
    #[error("navigator has been disposed")]
    Disposed,

    /// Pop needs at least two history entries.
    #[error("cannot pop: history depth is {depth}, need at least 2")]
    CannotPop { depth: usize },

    /// Replace or reload on an empty history.
    #[error("history is empty")]
    EmptyHistory,

    /// History builder index rejected (index 0 is the current entry and is immutable).
    #[error("index {index} is out of range for history of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    /// The global wrapper has no inner navigator.
    #[error("no navigator has been registered")]
    NotRegistered,

    /// The global wrapper was already started.
    #[error("navigator registration is closed after start")]
    RegistrationClosed,

    /// The operation is not supported by this navigator.
    #[error("operation not supported: {0}")]
    Unsupported(&'static str),

    /// A newer transition superseded this one, or the caller cancelled.
    #[error("navigation was canceled")]
    Canceled,

    /// A transition is in flight.
    #[error("a transition is in progress")]
    Busy,

    /// History changed since the builder was taken.
    #[error("history changed since the builder was taken (version {captured}, now {current})")]
    VersionConflict { captured: u64, current: u64 },

    /// No content is active, so history cannot be rebuilt.
    #[error("no active content")]
    NoActiveContent,

    /// Loaded content exposes no entry point.
    #[error("entry point not found in content '{0}'")]
    EntryPointNotFound(String),

    /// Content handle loaded twice.
    #[error("content '{0}' is already loaded")]
    AlreadyLoaded(String),

    /// Content handle unloaded while not loaded.
    #[error("content '{0}' is not loaded")]
    NotLoaded(String),

    /// The data slot is empty or holds another type.
    #[error("no data of type {expected} in store")]
    MissingData { expected: &'static str },

    /// Failure raised by an external collaborator, propagated verbatim.
    #[error(transparent)]
    Collaborator(#[from] anyhow::Error),
}

impl NavigationError {
    /// Returns true if this error is a cancellation (not a failure).
    pub fn is_canceled(&self) -> bool {
        matches!(self, NavigationError::Canceled)
    }

    /// Returns true if the caller misused the API (wrong state or argument).
    pub fn is_usage_error(&self) -> bool {
        matches!(
            self,
            NavigationError::NotInitialized
                | NavigationError::AlreadyInitialized
                | NavigationError::Disposed
                | NavigationError::CannotPop { .. }
                | NavigationError::EmptyHistory
                | NavigationError::IndexOutOfRange { .. }
                | NavigationError::NotRegistered
                | NavigationError::RegistrationClosed
                | NavigationError::Unsupported(_)
        )
    }

    /// Returns true if history could not be rebuilt because the navigator moved on.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            NavigationError::Busy
                | NavigationError::VersionConflict { .. }
                | NavigationError::NoActiveContent
        )
    }

    /// Wrap an arbitrary collaborator failure.
    pub fn collaborator(msg: impl std::fmt::Display) -> Self {
        NavigationError::Collaborator(anyhow::anyhow!("{msg}"))
    }
}

/// Fail with [`NavigationError::Canceled`] if the token has fired.
pub(crate) fn check(cancel: &tokio_util::sync::CancellationToken) -> Result<()> {
    if cancel.is_cancelled() {
        Err(NavigationError::Canceled)
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        assert!(NavigationError::Canceled.is_canceled());
        assert!(!NavigationError::Canceled.is_usage_error());
        assert!(NavigationError::CannotPop { depth: 1 }.is_usage_error());
        assert!(NavigationError::VersionConflict {
            captured: 1,
            current: 2
        }
        .is_conflict());
        assert!(!NavigationError::collaborator("boom").is_usage_error());
    }

    #[test]
    fn test_collaborator_message_is_verbatim() {
        let err = NavigationError::from(anyhow::anyhow!("disk on fire"));
        assert_eq!(err.to_string(), "disk on fire");
    }

    #[test]
    fn test_check_token() {
        let token = tokio_util::sync::CancellationToken::new();
        assert!(check(&token).is_ok());
        token.cancel();
        assert!(check(&token).unwrap_err().is_canceled());
    }
}
