//! Errors raised by the ledger core.
//!
//! - [`LedgerError`] covers malformed values and store misuse.
//! - [`ValidationError`] is returned when a [`TransactionDraft`] cannot be
//!   turned into something worth sending to the remote ledger.
//!
//!  [`TransactionDraft`]: crate::TransactionDraft
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Unknown category: \"{0}\"")]
    UnknownCategory(String),
    #[error("Unknown timeframe: \"{0}\"")]
    UnknownTimeframe(String),
}

/// Draft rejected before any network call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please enter a transaction title")]
    EmptyTitle,
    #[error("Please enter a valid amount: {0}")]
    InvalidAmount(String),
    #[error("Amount must not be zero")]
    ZeroAmount,
    #[error("Please select a category (got \"{0}\")")]
    UnknownCategory(String),
}

impl ValidationError {
    /// Name of the draft field the error refers to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::EmptyTitle => "title",
            Self::InvalidAmount(_) | Self::ZeroAmount => "amount",
            Self::UnknownCategory(_) => "category",
        }
    }
}
