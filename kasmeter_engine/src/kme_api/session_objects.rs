use chrono::{DateTime, Utc};
use km_common::Sompi;
use serde::Serialize;

use crate::db_types::{Session, SessionId};

/// The derived, client-facing view of a session.
///
/// Access state is never stored. It is recomputed from `paid_until` on every read, so there is no
/// lock/unlock transition anywhere in the system.
#[derive(Debug, Clone, Serialize)]
pub struct SessionStatus {
    pub id: SessionId,
    pub receiver_address: String,
    pub expected_amount_sompi: Sompi,
    pub expected_amount_kas: f64,
    pub checkpoint_seconds: i64,
    pub rate_kas_per_minute: f64,
    pub created_at: DateTime<Utc>,
    pub paid_until: DateTime<Utc>,
    pub remaining_seconds: i64,
    pub is_unlocked: bool,
    pub last_payment_outpoint: Option<String>,
}

impl SessionStatus {
    pub fn derive(session: &Session, now: DateTime<Utc>) -> Self {
        let remaining_seconds = (session.paid_until - now).num_seconds().max(0);
        Self {
            id: session.id.clone(),
            receiver_address: session.receiver_address.clone(),
            expected_amount_sompi: session.expected_amount,
            expected_amount_kas: session.expected_amount.as_kas(),
            checkpoint_seconds: session.checkpoint_seconds,
            rate_kas_per_minute: session.rate_kas_per_minute,
            created_at: session.created_at,
            paid_until: session.paid_until,
            remaining_seconds,
            is_unlocked: remaining_seconds > 0,
            last_payment_outpoint: session.last_payment_outpoint.clone(),
        }
    }
}
