//! Signals emitted by the coordinator for the notification layer.
//!
//! Every write is announced as `WritePending` and then resolved exactly once,
//! as `WriteConfirmed` or `WriteRejected`, under the same [`WriteId`].

use std::fmt;

use ledger::{TransactionId, UserId};
use serde::Serialize;
use uuid::Uuid;

/// Correlates the events of one write.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct WriteId(Uuid);

impl WriteId {
    pub(crate) fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for WriteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum WriteOp {
    Create { title: String },
    Delete { id: TransactionId },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LedgerEvent {
    WritePending {
        write: WriteId,
        op: WriteOp,
    },
    WriteConfirmed {
        write: WriteId,
        op: WriteOp,
        /// Id of the affected transaction.
        id: TransactionId,
    },
    WriteRejected {
        write: WriteId,
        op: WriteOp,
        reason: String,
    },
    Loaded {
        user: UserId,
        count: usize,
    },
    LoadFailed {
        user: UserId,
        reason: String,
    },
}

impl LedgerEvent {
    /// Short text for a toast, `None` for events that need no attention.
    pub fn notice(&self) -> Option<String> {
        match self {
            Self::WriteConfirmed {
                op: WriteOp::Create { .. },
                ..
            } => Some("Transaction created successfully".to_string()),
            Self::WriteConfirmed {
                op: WriteOp::Delete { .. },
                ..
            } => Some("Transaction deleted successfully".to_string()),
            Self::WriteRejected { reason, .. } => Some(reason.clone()),
            Self::LoadFailed { reason, .. } => Some(format!("Could not refresh: {reason}")),
            Self::WritePending { .. } | Self::Loaded { .. } => None,
        }
    }
}
