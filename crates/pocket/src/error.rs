use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("remote error: {0}")]
    Remote(#[from] ledger_sync::RemoteError),
    #[error("{}", .0.user_message())]
    Sync(#[from] ledger_sync::SyncError),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("not signed in: set user_id in the config, POCKET_USER_ID or --user")]
    SignedOut,
}
