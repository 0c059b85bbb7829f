//! Client-side core of the pocket ledger.
//!
//! - [`Money`], [`Category`] and [`Transaction`] model what the remote ledger
//!   stores.
//! - [`TransactionDraft`] validates create-form input before it goes anywhere.
//! - [`aggregate`] turns transaction lists into summaries and analytics.
//! - [`LedgerStore`] holds the active user's transactions and their summary.
//!
//! The crate does no I/O and never reads the clock.

pub use aggregate::{
    CategoryView, Share, Summary, Timeframe, TimeframeStats, bucket_by_category,
    bucket_by_category_with, filter_by_timeframe, income_expense_split, summarize,
    timeframe_stats,
};
pub use category::Category;
pub use error::{LedgerError, ValidationError};
pub use money::Money;
pub use store::{LedgerSnapshot, LedgerStore};
pub use transaction::{
    DraftKind, Transaction, TransactionDraft, TransactionId, UserId, ValidDraft,
};

pub mod aggregate;
mod category;
mod error;
mod money;
mod store;
mod transaction;
