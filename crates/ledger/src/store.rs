//! In-memory ledger for the signed-in user.
//!
//! The store is the single source of truth the UI reads from. It holds the
//! transaction list and the summary derived from it, and updates both under
//! one lock so a reader never sees a list paired with a summary of another
//! list.
//!
//! Handles are cheap to clone and share the same state.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::{Summary, Transaction, TransactionId, UserId, aggregate::summarize};

#[derive(Debug, Default)]
struct State {
    user: Option<UserId>,
    /// Newest first by `created_at`.
    entries: Vec<Transaction>,
    summary: Summary,
    remote_summary: Option<Summary>,
}

impl State {
    fn reset_for(&mut self, user: &UserId) {
        if self.user.as_ref() != Some(user) {
            *self = State {
                user: Some(user.clone()),
                ..State::default()
            };
        }
    }
}

/// Consistent copy of the store taken under a single lock.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LedgerSnapshot {
    pub user: Option<UserId>,
    pub transactions: Vec<Transaction>,
    pub summary: Summary,
    pub remote_summary: Option<Summary>,
}

#[derive(Clone, Debug, Default)]
pub struct LedgerStore {
    inner: Arc<Mutex<State>>,
}

impl LedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        // Every mutation leaves `State` consistent before it can panic, so a
        // poisoned lock still guards valid data.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// User whose data is currently held, if any.
    pub fn user(&self) -> Option<UserId> {
        self.lock().user.clone()
    }

    /// Transactions newest first. Entries sharing a timestamp keep the order
    /// they were fetched in; an optimistic insert goes ahead of its ties.
    pub fn transactions(&self) -> Vec<Transaction> {
        self.lock().entries.clone()
    }

    /// Summary derived from exactly the list returned by `transactions`.
    pub fn summary(&self) -> Summary {
        self.lock().summary
    }

    /// Last summary computed by the remote ledger, as of the last full load.
    pub fn remote_summary(&self) -> Option<Summary> {
        self.lock().remote_summary
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }

    pub fn snapshot(&self) -> LedgerSnapshot {
        let state = self.lock();
        LedgerSnapshot {
            user: state.user.clone(),
            transactions: state.entries.clone(),
            summary: state.summary,
            remote_summary: state.remote_summary,
        }
    }

    /// Swaps in a complete list for `user`, dropping whatever another user
    /// left behind.
    pub fn replace_all(
        &self,
        user: &UserId,
        mut transactions: Vec<Transaction>,
        remote_summary: Option<Summary>,
    ) {
        transactions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let summary = summarize(&transactions);

        if let Some(remote) = remote_summary
            && remote != summary
        {
            tracing::warn!(
                user = %user,
                local_balance = %summary.balance,
                remote_balance = %remote.balance,
                "remote summary disagrees with the transaction list"
            );
        }

        let mut state = self.lock();
        *state = State {
            user: Some(user.clone()),
            entries: transactions,
            summary,
            remote_summary,
        };
    }

    /// Puts a freshly created transaction at the head of its timestamp and
    /// folds it into the summary. An entry with the same id is replaced, so
    /// a racing reload cannot produce a duplicate.
    pub fn insert_optimistic(&self, transaction: Transaction) {
        let mut state = self.lock();
        state.reset_for(&transaction.user_id);

        if let Some(index) = state.entries.iter().position(|e| e.id == transaction.id) {
            state.entries.remove(index);
            state.summary = summarize(&state.entries);
        }

        let index = state
            .entries
            .iter()
            .position(|e| e.created_at <= transaction.created_at)
            .unwrap_or(state.entries.len());
        state.summary.apply(transaction.amount);
        state.entries.insert(index, transaction);
    }

    /// Drops the transaction with `id` and recomputes the summary. Returns
    /// the removed entry.
    pub fn remove_by_id(&self, id: &TransactionId) -> Option<Transaction> {
        let mut state = self.lock();
        let index = state.entries.iter().position(|e| &e.id == id)?;
        let removed = state.entries.remove(index);
        state.summary = summarize(&state.entries);
        Some(removed)
    }

    /// Forgets everything, including which user was active.
    pub fn clear(&self) {
        *self.lock() = State::default();
    }
}
