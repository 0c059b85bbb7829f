use std::future::Future;

use ledger::{Summary, Transaction, TransactionId, UserId, ValidDraft};

use crate::RemoteError;

/// Create request: a validated draft plus its owner.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewTransaction {
    pub user_id: UserId,
    pub draft: ValidDraft,
}

/// The durable, authoritative ledger the client mirrors.
///
/// [`HttpLedger`](crate::HttpLedger) talks to the REST backend; tests plug in
/// scripted implementations.
pub trait RemoteLedger {
    /// Every transaction owned by `user`.
    fn fetch_transactions(
        &self,
        user: &UserId,
    ) -> impl Future<Output = Result<Vec<Transaction>, RemoteError>> + Send;

    /// Server-computed summary for `user`.
    fn fetch_summary(
        &self,
        user: &UserId,
    ) -> impl Future<Output = Result<Summary, RemoteError>> + Send;

    /// Stores a new transaction and returns it with its assigned id.
    fn create(
        &self,
        new: &NewTransaction,
    ) -> impl Future<Output = Result<Transaction, RemoteError>> + Send;

    fn delete(&self, id: &TransactionId) -> impl Future<Output = Result<(), RemoteError>> + Send;
}
