use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Error body returned by the remote ledger on any non-2xx response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// A monetary value as the remote ledger sends it.
///
/// `NUMERIC` columns come back as strings (`"-20.00"`), computed values may
/// come back as plain JSON numbers. Both are accepted here; turning them into
/// exact minor units is the client's job.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawAmount {
    Number(f64),
    Text(String),
}

impl fmt::Display for RawAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(value) => write!(f, "{value}"),
            Self::Text(value) => f.write_str(value),
        }
    }
}

pub mod transaction {
    use super::*;

    /// Record identifier assigned by the remote ledger.
    ///
    /// Serial keys arrive as numbers, opaque keys as strings.
    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(untagged)]
    pub enum RecordId {
        Serial(i64),
        Opaque(String),
    }

    impl fmt::Display for RecordId {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                Self::Serial(id) => write!(f, "{id}"),
                Self::Opaque(id) => f.write_str(id),
            }
        }
    }

    /// Row of `GET /transactions/{user_id}` and body of a `201` create.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionRecord {
        pub id: RecordId,
        pub user_id: String,
        pub title: String,
        /// Signed amount; negative for expenses.
        #[serde(default)]
        pub amount: Option<RawAmount>,
        #[serde(default)]
        pub category: String,
        pub created_at: DateTime<Utc>,
    }

    /// Body of `POST /transactions`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionNew {
        pub user_id: String,
        pub title: String,
        /// Signed amount in major units (`-12.5` is a 12.50 expense).
        pub amount: f64,
        pub category: String,
    }
}

pub mod summary {
    use super::*;

    /// Body of `GET /transactions/summary/{user_id}`.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct SummaryResponse {
        #[serde(default)]
        pub balance: Option<RawAmount>,
        #[serde(default)]
        pub income: Option<RawAmount>,
        #[serde(default)]
        pub expenses: Option<RawAmount>,
    }
}
