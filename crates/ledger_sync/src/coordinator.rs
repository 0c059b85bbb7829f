//! Keeps the [`LedgerStore`] in step with the remote ledger.
//!
//! Every load is stamped with a sequence number when it is issued. When its
//! responses arrive the data is applied only if no later load was issued and
//! no write or sign-out happened in between; otherwise the result is dropped
//! and reported as [`LoadOutcome::StaleResponseDiscarded`]. The latest issued
//! request always wins, whatever order the responses come back in.
//!
//! Failed calls never touch the store, so it always holds the last data that
//! was known to be good for the signed-in user. Data cached for anyone else is
//! dropped as soon as a load for the new user completes, whatever its result.

use std::sync::{Mutex, MutexGuard, PoisonError};

use ledger::{LedgerStore, Transaction, TransactionDraft, TransactionId, UserId};
use tokio::sync::broadcast;

use crate::{
    LedgerEvent, NewTransaction, RemoteLedger, SessionProvider, SyncError, WriteId, WriteOp,
};

const EVENT_CAPACITY: usize = 64;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The store now holds this many transactions from the remote ledger.
    Applied { transactions: usize },
    /// A newer request, a write or a sign-out superseded this one.
    StaleResponseDiscarded,
    /// No authenticated session for the requested user; nothing was done.
    NoSession,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WriteOutcome<T> {
    Confirmed(T),
    /// Nobody is signed in; nothing was sent.
    NoSession,
}

/// A confirmed delete and the reload that followed it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Deleted {
    pub id: TransactionId,
    pub reload: Result<LoadOutcome, SyncError>,
}

pub struct SyncCoordinator<R, S> {
    remote: R,
    session: S,
    store: LedgerStore,
    /// Stamp of the most recently issued load or store-changing write.
    latest: Mutex<u64>,
    events: broadcast::Sender<LedgerEvent>,
}

impl<R, S> SyncCoordinator<R, S>
where
    R: RemoteLedger,
    S: SessionProvider,
{
    pub fn new(remote: R, session: S, store: LedgerStore) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            remote,
            session,
            store,
            latest: Mutex::new(0),
            events,
        }
    }

    pub fn store(&self) -> &LedgerStore {
        &self.store
    }

    /// Receives every event emitted after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<LedgerEvent> {
        self.events.subscribe()
    }

    fn emit(&self, event: LedgerEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    fn lock_latest(&self) -> MutexGuard<'_, u64> {
        self.latest.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Issues a new stamp and keeps it locked, so that loads still in flight
    /// are invalidated before the caller touches the store.
    fn supersede_in_flight(&self) -> MutexGuard<'_, u64> {
        let mut latest = self.lock_latest();
        *latest += 1;
        latest
    }

    fn is_active(&self, user: &UserId) -> bool {
        self.session.user_id().as_ref() == Some(user)
    }

    /// Fetches the transaction list and the summary for `user` in parallel
    /// and replaces the store content with them.
    ///
    /// If either fetch fails the whole load fails and the store is left as it
    /// was, unless it still held another user's data.
    pub async fn load(&self, user: &UserId) -> Result<LoadOutcome, SyncError> {
        if !self.is_active(user) {
            tracing::debug!(user = %user, "no session for user, skipping load");
            return Ok(LoadOutcome::NoSession);
        }

        let stamp = *self.supersede_in_flight();
        tracing::debug!(user = %user, stamp, "loading ledger");

        let fetched = tokio::try_join!(
            self.remote.fetch_transactions(user),
            self.remote.fetch_summary(user),
        );

        let latest = self.lock_latest();
        if *latest != stamp || !self.is_active(user) {
            tracing::warn!(
                user = %user,
                stamp,
                latest = *latest,
                "discarding superseded load response"
            );
            return Ok(LoadOutcome::StaleResponseDiscarded);
        }

        // Last known-good data only survives a failed load for the same user.
        if let Some(held) = self.store.user()
            && &held != user
        {
            tracing::info!(
                previous = %held,
                user = %user,
                "session switched, dropping cached ledger"
            );
            self.store.clear();
        }

        match fetched {
            Ok((transactions, summary)) => {
                let count = transactions.len();
                self.store.replace_all(user, transactions, Some(summary));
                drop(latest);

                tracing::info!(user = %user, count, "ledger loaded");
                self.emit(LedgerEvent::Loaded {
                    user: user.clone(),
                    count,
                });
                Ok(LoadOutcome::Applied {
                    transactions: count,
                })
            }
            Err(err) => {
                drop(latest);
                let err = SyncError::from(err);

                tracing::warn!(user = %user, error = %err, "ledger load failed");
                self.emit(LedgerEvent::LoadFailed {
                    user: user.clone(),
                    reason: err.user_message(),
                });
                Err(err)
            }
        }
    }

    /// Reloads the signed-in user's ledger. A no-op without a session.
    pub async fn refresh(&self) -> Result<LoadOutcome, SyncError> {
        match self.session.user_id() {
            Some(user) => self.load(&user).await,
            None => {
                tracing::debug!("refresh requested without a session");
                Ok(LoadOutcome::NoSession)
            }
        }
    }

    /// Validates `draft`, stores it remotely and puts the created
    /// transaction in the local store ahead of the next reload.
    pub async fn create(
        &self,
        draft: &TransactionDraft,
    ) -> Result<WriteOutcome<Transaction>, SyncError> {
        let Some(user) = self.session.user_id() else {
            tracing::debug!("create requested without a session");
            return Ok(WriteOutcome::NoSession);
        };

        let draft = draft.validate().map_err(|err| {
            tracing::debug!(field = err.field(), error = %err, "draft rejected");
            SyncError::from(err)
        })?;

        let write = WriteId::new();
        let op = WriteOp::Create {
            title: draft.title().to_string(),
        };
        self.emit(LedgerEvent::WritePending {
            write,
            op: op.clone(),
        });

        let new = NewTransaction {
            user_id: user.clone(),
            draft,
        };
        let created = match self.remote.create(&new).await {
            Ok(created) => created,
            Err(err) => {
                let err = SyncError::from(err);
                tracing::warn!(%write, error = %err, "create rejected");
                self.emit(LedgerEvent::WriteRejected {
                    write,
                    op,
                    reason: err.user_message(),
                });
                return Err(err);
            }
        };

        {
            let _latest = self.supersede_in_flight();
            if created.user_id != user {
                tracing::warn!(
                    %write,
                    expected = %user,
                    got = %created.user_id,
                    "created transaction belongs to another user, not caching it"
                );
            } else if self.is_active(&user) {
                self.store.insert_optimistic(created.clone());
            }
        }

        tracing::info!(%write, id = %created.id, amount = %created.amount, "transaction created");
        self.emit(LedgerEvent::WriteConfirmed {
            write,
            op,
            id: created.id.clone(),
        });
        Ok(WriteOutcome::Confirmed(created))
    }

    /// Deletes remotely, then reloads the whole ledger.
    ///
    /// The local entry is only dropped once the remote ledger confirmed the
    /// delete. The reload result is reported alongside the confirmation: a
    /// failed reload does not undo a delete the server already performed.
    pub async fn delete(&self, id: &TransactionId) -> Result<WriteOutcome<Deleted>, SyncError> {
        let Some(user) = self.session.user_id() else {
            tracing::debug!("delete requested without a session");
            return Ok(WriteOutcome::NoSession);
        };

        let write = WriteId::new();
        let op = WriteOp::Delete { id: id.clone() };
        self.emit(LedgerEvent::WritePending {
            write,
            op: op.clone(),
        });

        if let Err(err) = self.remote.delete(id).await {
            let err = SyncError::from(err);
            tracing::warn!(%write, id = %id, error = %err, "delete rejected");
            self.emit(LedgerEvent::WriteRejected {
                write,
                op,
                reason: err.user_message(),
            });
            return Err(err);
        }

        {
            let _latest = self.supersede_in_flight();
            if self.store.user().as_ref() == Some(&user) {
                self.store.remove_by_id(id);
            }
        }

        tracing::info!(%write, id = %id, "transaction deleted");
        self.emit(LedgerEvent::WriteConfirmed {
            write,
            op,
            id: id.clone(),
        });

        let reload = self.load(&user).await;
        Ok(WriteOutcome::Confirmed(Deleted {
            id: id.clone(),
            reload,
        }))
    }

    /// Drops all cached data and any load still in flight.
    pub fn sign_out(&self) {
        let _latest = self.supersede_in_flight();
        self.store.clear();
        tracing::info!("ledger cleared");
    }
}
