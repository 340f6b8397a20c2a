//! Crate-wide error type and result alias.

use thiserror::Error;

/// Errors surfaced by patchdeck clients and services.
///
/// `Transport`, `Status` and `Decode` form the transport/server failure class:
/// fatal when the catalog lookup step fails, swallowed per item inside the
/// best-effort name resolver.
#[derive(Debug, Error)]
pub enum PatchdeckError {
    /// Network-level failure (DNS, connect, timeout, broken body).
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Upstream answered with a non-success status code.
    #[error("{url} returned status {status}")]
    Status { url: String, status: u16 },

    /// Response body was not the JSON shape we expected.
    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    /// A favorites mutation was attempted with no signed-in user.
    /// Reads with no user return empty results instead of this error.
    #[error("no signed-in user")]
    Unauthenticated,

    /// The favorites store backend reported a failure.
    #[error("favorites store error: {0}")]
    Store(String),
}

impl PatchdeckError {
    /// True for the transport/server failure class (network, status, decode).
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            PatchdeckError::Transport(_) | PatchdeckError::Status { .. } | PatchdeckError::Decode(_)
        )
    }
}

/// Result type alias for patchdeck operations.
pub type Result<T> = std::result::Result<T, PatchdeckError>;
