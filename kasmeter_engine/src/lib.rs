//! Kasmeter Engine
//!
//! The kasmeter engine is the core of a "pay-as-you-use" time meter for the Kaspa network. Clients
//! pay a uniquely-tagged amount of KAS into a shared receiver address; the engine matches newly
//! observed unspent outputs on that address to pending sessions by exact sompi amount and extends
//! each matched session's paid-until timestamp by its checkpoint duration.
//!
//! The library is divided into three main sections:
//! 1. Database management and control ([`mod@sqlite`]). SQLite is the supported backend. You should
//!    never need to access the database directly; use the public APIs instead. The exception is the
//!    data types stored in the database, which are defined in [`db_types`] and are public.
//! 2. The session API ([`SessionApi`]): creating sessions (price derivation plus a random
//!    disambiguation tag) and reading their derived access status.
//! 3. The reconciler ([`Reconciler`]): a stateless matching engine that applies one ledger snapshot
//!    at a time against the pending sessions, with at-most-once crediting per outpoint.
//!
//! The engine knows nothing about HTTP. Fetching UTXO snapshots from an explorer API is the
//! caller's concern; see the `kaspa_rest` crate and the server's reconciler worker.

pub mod db_types;
pub mod helpers;
mod kme_api;
pub mod reconciler;
#[cfg(feature = "sqlite")]
mod sqlite;
pub mod traits;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

pub use kme_api::{session_objects, SessionApi};
pub use reconciler::{Reconciler, TickSummary};
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;
pub use traits::{MeteringDatabase, MeteringError};
