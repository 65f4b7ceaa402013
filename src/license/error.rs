use thiserror::Error;

/// Failures of the license subsystem.
#[derive(Debug, Error)]
pub enum LicenseError {
    #[error("token cannot be empty")]
    EmptyInput,

    #[error("activation server unreachable: {0}")]
    Network(String),

    #[error("activation server rejected the token")]
    ServerRejected,

    #[error("unreadable cache entry {0}")]
    CorruptCacheFile(String),

    #[error("failed to persist activation: {0}")]
    CacheWriteFailed(#[from] std::io::Error),

    #[error("verification cancelled")]
    Cancelled,
}

impl LicenseError {
    /// The registration dialog stays open and the user may try again.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, LicenseError::CorruptCacheFile(_))
    }

    /// The server accepted the token but it could not be stored.
    pub fn is_persistence_failure(&self) -> bool {
        matches!(self, LicenseError::CacheWriteFailed(_))
    }

    pub fn user_message(&self) -> String {
        match self {
            LicenseError::EmptyInput => "Please enter an API token.".into(),
            LicenseError::Network(e) => format!("Failed to verify token: {e}"),
            LicenseError::ServerRejected => "Invalid API token. Please try again.".into(),
            LicenseError::CorruptCacheFile(_) => "Stored activation is unreadable.".into(),
            LicenseError::CacheWriteFailed(e) => {
                format!("Your token is valid but could not be saved: {e}")
            }
            LicenseError::Cancelled => "Verification cancelled.".into(),
        }
    }
}
