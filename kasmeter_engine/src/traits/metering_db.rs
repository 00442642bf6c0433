use chrono::{DateTime, Utc};
use km_common::Sompi;
use thiserror::Error;

use crate::db_types::{LedgerEntry, NewSession, SeenOutpoint, Session, SessionId};

/// This trait defines the highest level of behaviour for backends supporting the kasmeter engine.
///
/// This behaviour includes:
/// * Creating and fetching session records.
/// * Remembering which ledger outpoints have already been processed.
/// * Applying time credits to sessions, atomically with the seen-marking.
#[allow(async_fn_in_trait)]
pub trait MeteringDatabase: Clone {
    /// The URL of the database
    fn url(&self) -> &str;

    /// Stores a new session with zero credit (`paid_until` starts equal to `created_at`).
    ///
    /// Fails with [`MeteringError::ExpectedAmountTaken`] if another session on the same receiver
    /// address already expects this amount; callers re-roll the tag and try again.
    async fn insert_session(&self, session: NewSession) -> Result<Session, MeteringError>;

    /// Fetches the session with the given id, or `None` if it does not exist.
    async fn fetch_session(&self, id: &SessionId) -> Result<Option<Session>, MeteringError>;

    /// All sessions paying into `address`, ordered oldest first (by `created_at`, then id) so that
    /// matching is deterministic.
    async fn fetch_sessions_for_address(&self, address: &str) -> Result<Vec<Session>, MeteringError>;

    /// Whether the outpoint has been processed before.
    async fn outpoint_seen(&self, outpoint_id: &str) -> Result<bool, MeteringError>;

    /// Fetches the audit record for a processed outpoint, if any.
    async fn fetch_seen_outpoint(&self, outpoint_id: &str) -> Result<Option<SeenOutpoint>, MeteringError>;

    /// In a single atomic transaction, records `entry` as seen and extends the session's
    /// `paid_until` to `max(paid_until, now) + checkpoint`, updating `last_payment_outpoint`.
    ///
    /// If the outpoint was processed before, fails with [`MeteringError::OutpointAlreadySeen`] and
    /// changes nothing; a replayed entry can therefore never credit twice, and a half-applied
    /// credit can never survive (the seen-record and the session update commit or roll back
    /// together).
    async fn credit_session(
        &self,
        id: &SessionId,
        entry: &LedgerEntry,
        now: DateTime<Utc>,
    ) -> Result<Session, MeteringError>;

    /// Closes the database connection.
    async fn close(&mut self) -> Result<(), MeteringError> {
        Ok(())
    }
}

#[derive(Debug, Clone, Error)]
pub enum MeteringError {
    #[error("We have an internal database engine error (configuration/uptime etc.): {0}")]
    DatabaseError(String),
    #[error("The requested session {0} does not exist")]
    SessionNotFound(SessionId),
    #[error("Outpoint {0} has already been credited")]
    OutpointAlreadySeen(String),
    #[error("Another pending session already expects {0}")]
    ExpectedAmountTaken(Sompi),
    #[error("Could not find an unused expected amount after {0} attempts")]
    AmountTagExhausted(usize),
}

impl From<sqlx::Error> for MeteringError {
    fn from(e: sqlx::Error) -> Self {
        MeteringError::DatabaseError(e.to_string())
    }
}
