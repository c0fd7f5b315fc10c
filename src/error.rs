//! Error types for the navigation engine.
//!
//! Every failure is handled at the boundary of a single navigation step and
//! reported to the requesting user; the `Display` strings below are the
//! user-facing text. Nothing here is retried automatically.

use std::path::PathBuf;
use thiserror::Error;

/// Navigation error covering the failure modes of one menu step.
#[derive(Debug, Error)]
pub enum NavError {
    /// The resolved rclone config file does not exist.
    #[error("rclone config file not found: {path:?}")]
    ConfigNotFound {
        /// Path that was probed.
        path: PathBuf,
        /// How the user can recover (depends on whether the path is per-user).
        hint: &'static str,
    },

    /// A remote section is missing or its crypt pointer is unresolvable.
    #[error("Invalid remote configuration for '{remote}': {reason}")]
    InvalidRemote {
        /// Remote (section) name the lookup started from.
        remote: String,
        reason: String,
    },

    /// The external listing command exited nonzero or produced garbage.
    #[error("Listing failed: {0}")]
    ListingFailed(String),

    /// A callback string did not decode to a known navigation state.
    /// Handlers log this and ignore the press; it never aborts the session.
    #[error("malformed callback: {0}")]
    MalformedCallback(String),
}

impl NavError {
    pub(crate) fn invalid_remote(remote: impl Into<String>, reason: impl Into<String>) -> Self {
        NavError::InvalidRemote {
            remote: remote.into(),
            reason: reason.into(),
        }
    }

    /// Text shown to the requesting user when a step fails on this error.
    /// For a missing config this is the recovery hint matching the path
    /// rule; everything else reports its `Display` form.
    pub fn user_message(&self) -> String {
        match self {
            NavError::ConfigNotFound { hint, .. } => (*hint).to_string(),
            other => other.to_string(),
        }
    }
}

/// Result alias for navigation operations.
pub type Result<T> = std::result::Result<T, NavError>;
