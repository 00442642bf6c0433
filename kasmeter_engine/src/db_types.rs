use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use km_common::Sompi;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;

//--------------------------------------      SessionId      ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct SessionId(pub String);

impl SessionId {
    /// A fresh, unguessable session id.
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for SessionId {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl From<String> for SessionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

//--------------------------------------       Session       ---------------------------------------------------------
/// A payment-metered access window.
///
/// The session holds zero credit at creation (`paid_until == created_at`); each matched payment
/// extends `paid_until` by `checkpoint_seconds`. `receiver_address` and `expected_amount` never
/// change once set, and `paid_until` only ever moves forward.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Session {
    pub id: SessionId,
    /// The Kaspa address this session pays into. Shared between sessions.
    pub receiver_address: String,
    /// The exact amount, in sompi, a payment must carry to be recognized as this session's.
    /// Unique among sessions on the same receiver address.
    pub expected_amount: Sompi,
    /// Seconds of access credited per matched payment.
    pub checkpoint_seconds: i64,
    /// Price per minute of access, in KAS. Informational after creation.
    pub rate_kas_per_minute: f64,
    pub created_at: DateTime<Utc>,
    /// The timestamp through which access is granted. Access itself is derived on read.
    pub paid_until: DateTime<Utc>,
    /// The most recently matched outpoint, if any.
    pub last_payment_outpoint: Option<String>,
}

//--------------------------------------      NewSession     ---------------------------------------------------------
#[derive(Debug, Clone)]
pub struct NewSession {
    pub receiver_address: String,
    pub expected_amount: Sompi,
    pub checkpoint_seconds: i64,
    pub rate_kas_per_minute: f64,
}

impl NewSession {
    pub fn new(
        receiver_address: impl Into<String>,
        expected_amount: Sompi,
        checkpoint_seconds: i64,
        rate_kas_per_minute: f64,
    ) -> Self {
        Self { receiver_address: receiver_address.into(), expected_amount, checkpoint_seconds, rate_kas_per_minute }
    }
}

//--------------------------------------     LedgerEntry     ---------------------------------------------------------
/// A normalized unspent output as reported by the ledger: the opaque outpoint identifier and the
/// amount it carries. Everything else the explorer returns is irrelevant to matching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerEntry {
    pub outpoint_id: String,
    pub amount: Sompi,
}

impl LedgerEntry {
    pub fn new(outpoint_id: impl Into<String>, amount: Sompi) -> Self {
        Self { outpoint_id: outpoint_id.into(), amount }
    }
}

//--------------------------------------     SeenOutpoint    ---------------------------------------------------------
/// A processed ledger entry. Rows are written once, never updated or deleted; the primary key on
/// `outpoint_id` is what guarantees at-most-once crediting, including across process restarts.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SeenOutpoint {
    pub outpoint_id: String,
    /// The amount observed at processing time, kept for audit.
    pub amount: Sompi,
    pub seen_at: DateTime<Utc>,
}
