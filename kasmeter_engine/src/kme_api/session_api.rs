use std::fmt::Debug;

use chrono::Utc;
use log::*;

use crate::{
    db_types::{NewSession, Session, SessionId},
    helpers::pricing::{base_price, tag_amount},
    kme_api::session_objects::SessionStatus,
    traits::{MeteringDatabase, MeteringError},
};

/// How many fresh tags session creation draws before giving up when the tagged amount collides
/// with a pending session on the same receiver address.
const MAX_TAG_ATTEMPTS: usize = 5;

/// `SessionApi` is the primary API for creating metered sessions and reading their derived status.
pub struct SessionApi<B> {
    db: B,
}

impl<B> Debug for SessionApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SessionApi")
    }
}

impl<B> SessionApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> SessionApi<B>
where B: MeteringDatabase
{
    /// Creates a new metered session paying into `receiver_address`.
    ///
    /// The expected amount is the price of `duration_seconds` of access at `rate_kas_per_minute`,
    /// plus a random disambiguation tag. If the tagged amount is already taken by another session
    /// on the same address, a fresh tag is drawn, up to [`MAX_TAG_ATTEMPTS`] times.
    pub async fn create_session(
        &self,
        receiver_address: &str,
        rate_kas_per_minute: f64,
        checkpoint_seconds: i64,
        duration_seconds: i64,
    ) -> Result<Session, MeteringError> {
        let base = base_price(rate_kas_per_minute, duration_seconds);
        for attempt in 1..=MAX_TAG_ATTEMPTS {
            let expected = tag_amount(base);
            let session = NewSession::new(receiver_address, expected, checkpoint_seconds, rate_kas_per_minute);
            match self.db.insert_session(session).await {
                Ok(session) => {
                    debug!(
                        "🧾️ Session {} created. Expecting {} into {receiver_address}",
                        session.id, session.expected_amount
                    );
                    return Ok(session);
                },
                Err(MeteringError::ExpectedAmountTaken(amount)) => {
                    warn!("🧾️ Tagged amount {amount} is already taken (attempt {attempt}/{MAX_TAG_ATTEMPTS})");
                },
                Err(e) => return Err(e),
            }
        }
        Err(MeteringError::AmountTagExhausted(MAX_TAG_ATTEMPTS))
    }

    /// Fetches the session with the given id.
    pub async fn fetch_session(&self, id: &SessionId) -> Result<Option<Session>, MeteringError> {
        self.db.fetch_session(id).await
    }

    /// Fetches the session and derives its access status as of now. `None` if the id is unknown,
    /// which callers must surface as "absent", not as an error.
    pub async fn session_status(&self, id: &SessionId) -> Result<Option<SessionStatus>, MeteringError> {
        let session = self.db.fetch_session(id).await?;
        Ok(session.map(|s| SessionStatus::derive(&s, Utc::now())))
    }
}
