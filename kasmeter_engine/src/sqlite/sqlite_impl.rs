//! `SqliteDatabase` is a concrete implementation of a kasmeter engine backend.
//!
//! Unsurprisingly, it uses SQLite as the backend and implements the [`MeteringDatabase`] trait.
use std::{fmt::Debug, fs, path::Path};

use chrono::{DateTime, Utc};
use log::*;
use sqlx::{migrate::MigrateDatabase, Sqlite, SqlitePool};

use super::db::{new_pool, outpoints, sessions};
use crate::{
    db_types::{LedgerEntry, NewSession, SeenOutpoint, Session, SessionId},
    helpers::pricing::next_paid_until,
    traits::{MeteringDatabase, MeteringError},
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl SqliteDatabase {
    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, MeteringError> {
        let pool = new_pool(url, max_connections).await?;
        Ok(Self { url: url.to_string(), pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Creates the database file (and its parent directory) if it does not exist yet.
    pub async fn create_database_if_missing(url: &str) -> Result<(), MeteringError> {
        if Sqlite::database_exists(url).await.unwrap_or(false) {
            return Ok(());
        }
        if let Some(dir) = url.strip_prefix("sqlite://").and_then(|p| Path::new(p).parent()) {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir).map_err(|e| MeteringError::DatabaseError(e.to_string()))?;
            }
        }
        Sqlite::create_database(url).await?;
        info!("🗃️ Created database {url}");
        Ok(())
    }

    /// Applies any outstanding schema migrations.
    pub async fn run_migrations(&self) -> Result<(), MeteringError> {
        sqlx::migrate!("./src/sqlite/db/migrations")
            .run(&self.pool)
            .await
            .map_err(|e| MeteringError::DatabaseError(e.to_string()))?;
        Ok(())
    }
}

impl MeteringDatabase for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn insert_session(&self, session: NewSession) -> Result<Session, MeteringError> {
        let mut conn = self.pool.acquire().await?;
        let session = sessions::insert_session(session, &mut conn).await?;
        debug!("🗃️ Session {} saved. It expects payments of {}", session.id, session.expected_amount);
        Ok(session)
    }

    async fn fetch_session(&self, id: &SessionId) -> Result<Option<Session>, MeteringError> {
        let mut conn = self.pool.acquire().await?;
        let session = sessions::fetch_session(id, &mut conn).await?;
        Ok(session)
    }

    async fn fetch_sessions_for_address(&self, address: &str) -> Result<Vec<Session>, MeteringError> {
        let mut conn = self.pool.acquire().await?;
        let sessions = sessions::fetch_sessions_for_address(address, &mut conn).await?;
        Ok(sessions)
    }

    async fn outpoint_seen(&self, outpoint_id: &str) -> Result<bool, MeteringError> {
        let mut conn = self.pool.acquire().await?;
        let seen = outpoints::is_seen(outpoint_id, &mut conn).await?;
        Ok(seen)
    }

    async fn fetch_seen_outpoint(&self, outpoint_id: &str) -> Result<Option<SeenOutpoint>, MeteringError> {
        let mut conn = self.pool.acquire().await?;
        let seen = outpoints::fetch_seen(outpoint_id, &mut conn).await?;
        Ok(seen)
    }

    /// Takes a matched ledger entry, and in a single atomic transaction,
    /// * records the outpoint as seen. If it was processed before, the whole call fails with
    ///   [`MeteringError::OutpointAlreadySeen`] and nothing changes.
    /// * extends the session's `paid_until` to `max(paid_until, now) + checkpoint` and points
    ///   `last_payment_outpoint` at this entry.
    async fn credit_session(
        &self,
        id: &SessionId,
        entry: &LedgerEntry,
        now: DateTime<Utc>,
    ) -> Result<Session, MeteringError> {
        let mut tx = self.pool.begin().await?;
        outpoints::mark_seen(entry, now, &mut tx).await?;
        let session =
            sessions::fetch_session(id, &mut tx).await?.ok_or_else(|| MeteringError::SessionNotFound(id.clone()))?;
        let paid_until = next_paid_until(session.paid_until, now, session.checkpoint_seconds);
        let session = sessions::apply_credit(id, paid_until, &entry.outpoint_id, &mut tx).await?;
        tx.commit().await?;
        debug!("🗃️ Outpoint {} credited session {} through {}", entry.outpoint_id, session.id, session.paid_until);
        Ok(session)
    }
}
