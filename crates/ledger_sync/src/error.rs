use ledger::ValidationError;
use thiserror::Error;

/// Failure reported by a [`RemoteLedger`](crate::RemoteLedger).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RemoteError {
    /// Connection, timeout or a body that could not be decoded.
    #[error("network error: {0}")]
    Network(String),
    /// The server answered with a non-success status.
    #[error("{status}: {reason}")]
    Rejected { status: u16, reason: String },
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),
}

/// Everything the coordinator can report back to a caller.
///
/// None of these is fatal; the caller decides how to show it.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SyncError {
    /// Bad input, caught before any network call.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// Transport failure; retrying or refreshing may help.
    #[error("network error: {0}")]
    Network(String),
    /// The remote ledger refused the request.
    #[error("rejected by server ({status}): {reason}")]
    RemoteRejection { status: u16, reason: String },
}

impl From<RemoteError> for SyncError {
    fn from(err: RemoteError) -> Self {
        match err {
            RemoteError::Network(message) => Self::Network(message),
            RemoteError::InvalidEndpoint(message) => {
                Self::Network(format!("invalid endpoint: {message}"))
            }
            RemoteError::Rejected { status, reason } => Self::RemoteRejection { status, reason },
        }
    }
}

impl SyncError {
    /// Message suitable for a toast or status line.
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(err) => err.to_string(),
            Self::Network(_) => {
                "Network error. Please check your internet connection and try again.".to_string()
            }
            Self::RemoteRejection { reason, .. } => reason.clone(),
        }
    }
}
