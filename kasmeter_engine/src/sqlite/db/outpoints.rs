use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;

use crate::{
    db_types::{LedgerEntry, SeenOutpoint},
    traits::MeteringError,
};

/// Records the outpoint as processed, keeping the observed amount for audit.
///
/// Fails loudly with [`MeteringError::OutpointAlreadySeen`] on a replay. The primary key on
/// `outpoint_id` is what makes crediting at-most-once; callers must never swallow this error in a
/// way that re-applies the credit.
pub async fn mark_seen(
    entry: &LedgerEntry,
    seen_at: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<SeenOutpoint, MeteringError> {
    let outpoint_id = entry.outpoint_id.clone();
    let seen = sqlx::query_as(
        r#"
            INSERT INTO seen_outpoints (outpoint_id, amount, seen_at) VALUES ($1, $2, $3)
            RETURNING *;
        "#,
    )
    .bind(&entry.outpoint_id)
    .bind(entry.amount)
    .bind(seen_at)
    .fetch_one(conn)
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(err) if err.is_unique_violation() => MeteringError::OutpointAlreadySeen(outpoint_id),
        _ => MeteringError::from(e),
    })?;
    Ok(seen)
}

pub async fn is_seen(outpoint_id: &str, conn: &mut SqliteConnection) -> Result<bool, sqlx::Error> {
    let row: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM seen_outpoints WHERE outpoint_id = $1")
        .bind(outpoint_id)
        .fetch_optional(conn)
        .await?;
    Ok(row.is_some())
}

pub async fn fetch_seen(outpoint_id: &str, conn: &mut SqliteConnection) -> Result<Option<SeenOutpoint>, sqlx::Error> {
    let seen = sqlx::query_as("SELECT * FROM seen_outpoints WHERE outpoint_id = $1")
        .bind(outpoint_id)
        .fetch_optional(conn)
        .await?;
    Ok(seen)
}
