use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;

use crate::{
    db_types::{NewSession, Session, SessionId},
    traits::MeteringError,
};

/// Inserts a new session with zero credit: `paid_until` starts out equal to `created_at`.
///
/// A unique violation on `(receiver_address, expected_amount)` is reported as
/// [`MeteringError::ExpectedAmountTaken`] so the caller can re-roll the tag.
pub async fn insert_session(session: NewSession, conn: &mut SqliteConnection) -> Result<Session, MeteringError> {
    let id = SessionId::random();
    let now = Utc::now();
    let amount = session.expected_amount;
    let session = sqlx::query_as(
        r#"
            INSERT INTO sessions (
                id,
                receiver_address,
                expected_amount,
                checkpoint_seconds,
                rate_kas_per_minute,
                created_at,
                paid_until
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *;
        "#,
    )
    .bind(id)
    .bind(session.receiver_address)
    .bind(session.expected_amount)
    .bind(session.checkpoint_seconds)
    .bind(session.rate_kas_per_minute)
    .bind(now)
    .bind(now)
    .fetch_one(conn)
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(err) if err.is_unique_violation() => MeteringError::ExpectedAmountTaken(amount),
        _ => MeteringError::from(e),
    })?;
    Ok(session)
}

pub async fn fetch_session(id: &SessionId, conn: &mut SqliteConnection) -> Result<Option<Session>, sqlx::Error> {
    let session =
        sqlx::query_as("SELECT * FROM sessions WHERE id = $1").bind(id.as_str()).fetch_optional(conn).await?;
    Ok(session)
}

/// All sessions paying into `address`, oldest first. The secondary ordering on id keeps the result
/// stable for sessions created in the same instant.
pub async fn fetch_sessions_for_address(
    address: &str,
    conn: &mut SqliteConnection,
) -> Result<Vec<Session>, sqlx::Error> {
    let sessions = sqlx::query_as("SELECT * FROM sessions WHERE receiver_address = $1 ORDER BY created_at, id")
        .bind(address)
        .fetch_all(conn)
        .await?;
    Ok(sessions)
}

/// Overwrites `paid_until` and `last_payment_outpoint`, leaving every other column untouched.
/// This is not atomic on its own; callers embed it in a transaction together with the
/// seen-outpoint insert.
pub async fn apply_credit(
    id: &SessionId,
    paid_until: DateTime<Utc>,
    outpoint_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Session, MeteringError> {
    let session =
        sqlx::query_as("UPDATE sessions SET paid_until = $1, last_payment_outpoint = $2 WHERE id = $3 RETURNING *")
            .bind(paid_until)
            .bind(outpoint_id)
            .bind(id.as_str())
            .fetch_optional(conn)
            .await?
            .ok_or_else(|| MeteringError::SessionNotFound(id.clone()))?;
    Ok(session)
}
