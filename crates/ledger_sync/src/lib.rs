//! Synchronisation between the local [`ledger::LedgerStore`] and the remote
//! ledger REST API.
//!
//! [`SyncCoordinator`] is the only component that talks to the network. It
//! loads, creates and deletes transactions through a [`RemoteLedger`],
//! applies the results to the store and reports what happened as
//! [`LedgerEvent`]s.

pub use coordinator::{Deleted, LoadOutcome, SyncCoordinator, WriteOutcome};
pub use error::{RemoteError, SyncError};
pub use events::{LedgerEvent, WriteId, WriteOp};
pub use http::HttpLedger;
pub use remote::{NewTransaction, RemoteLedger};
pub use session::{SessionProvider, SharedSession};

mod coordinator;
mod error;
mod events;
mod http;
mod remote;
mod session;
mod wire;
