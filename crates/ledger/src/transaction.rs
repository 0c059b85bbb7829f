//! Transactions and the drafts users fill in to create them.
//!
//! A [`Transaction`] is owned by the remote ledger; the client only caches it.
//! A [`TransactionDraft`] is raw form input. [`TransactionDraft::validate`]
//! is the only way to obtain a [`ValidDraft`], so nothing reaches the network
//! with an empty title, a zero amount or a category outside the fixed set.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{Category, Money, ValidationError};

/// Opaque identifier assigned by the remote ledger.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct TransactionId(String);

impl TransactionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of the signed-in user, as handed out by the session provider.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub user_id: UserId,
    pub title: String,
    /// Signed amount: negative is an expense, positive is income.
    pub amount: Money,
    pub category: Category,
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    pub fn is_expense(&self) -> bool {
        self.amount.is_negative()
    }
}

/// How the sign of a draft amount is decided.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DraftKind {
    /// Keep the sign the user typed.
    #[default]
    Signed,
    /// Always stored as a negative amount.
    Expense,
    /// Always stored as a positive amount.
    Income,
}

/// Unvalidated create-form input.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TransactionDraft {
    pub title: String,
    pub amount: String,
    pub category: String,
    pub kind: DraftKind,
}

impl TransactionDraft {
    pub fn new(
        title: impl Into<String>,
        amount: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            amount: amount.into(),
            category: category.into(),
            kind: DraftKind::Signed,
        }
    }

    pub fn expense(
        title: impl Into<String>,
        amount: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            kind: DraftKind::Expense,
            ..Self::new(title, amount, category)
        }
    }

    pub fn income(
        title: impl Into<String>,
        amount: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            kind: DraftKind::Income,
            ..Self::new(title, amount, category)
        }
    }

    /// Checks title, amount and category, in that order, and returns the
    /// first problem found.
    pub fn validate(&self) -> Result<ValidDraft, ValidationError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(ValidationError::EmptyTitle);
        }

        let typed: Money = self
            .amount
            .parse()
            .map_err(|err: crate::LedgerError| ValidationError::InvalidAmount(err.to_string()))?;
        if typed.is_zero() {
            return Err(ValidationError::ZeroAmount);
        }
        let amount = match self.kind {
            DraftKind::Signed => typed,
            DraftKind::Expense => -typed.abs(),
            DraftKind::Income => typed.abs(),
        };

        let category = self
            .category
            .parse::<Category>()
            .map_err(|_| ValidationError::UnknownCategory(self.category.trim().to_string()))?;

        Ok(ValidDraft {
            title: title.to_string(),
            amount,
            category,
        })
    }
}

/// A draft that passed [`TransactionDraft::validate`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidDraft {
    title: String,
    amount: Money,
    category: Category,
}

impl ValidDraft {
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn amount(&self) -> Money {
        self.amount
    }

    pub fn category(&self) -> Category {
        self.category
    }
}
