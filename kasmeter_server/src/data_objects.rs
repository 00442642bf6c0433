use chrono::{DateTime, Utc};
use kasmeter_engine::db_types::{Session, SessionId};
use km_common::Sompi;
use serde::{Deserialize, Serialize};

use crate::{config::SessionDefaults, errors::ServerError};

pub const MIN_CHECKPOINT_SECONDS: i64 = 1;
pub const MAX_CHECKPOINT_SECONDS: i64 = 3600;
pub const MIN_DURATION_SECONDS: i64 = 5;
pub const MAX_DURATION_SECONDS: i64 = 24 * 60 * 60;
pub const DEFAULT_DURATION_SECONDS: i64 = 60;
pub const MIN_RATE_KAS_PER_MINUTE: f64 = 0.000_001;
pub const MAX_RATE_KAS_PER_MINUTE: f64 = 1000.0;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateSessionRequest {
    pub checkpoint_seconds: Option<i64>,
    pub duration_seconds: Option<i64>,
    pub rate_kas_per_minute: Option<f64>,
}

/// A fully validated set of session parameters, with server defaults filled in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionParams {
    pub checkpoint_seconds: i64,
    pub duration_seconds: i64,
    pub rate_kas_per_minute: f64,
}

impl CreateSessionRequest {
    pub fn validate(&self, defaults: &SessionDefaults) -> Result<SessionParams, ServerError> {
        let checkpoint_seconds = self.checkpoint_seconds.unwrap_or(defaults.checkpoint_seconds);
        if !(MIN_CHECKPOINT_SECONDS..=MAX_CHECKPOINT_SECONDS).contains(&checkpoint_seconds) {
            return Err(ServerError::ValidationError(format!(
                "checkpoint_seconds must be between {MIN_CHECKPOINT_SECONDS} and {MAX_CHECKPOINT_SECONDS}"
            )));
        }
        let duration_seconds = self.duration_seconds.unwrap_or(DEFAULT_DURATION_SECONDS);
        if !(MIN_DURATION_SECONDS..=MAX_DURATION_SECONDS).contains(&duration_seconds) {
            return Err(ServerError::ValidationError(format!(
                "duration_seconds must be between {MIN_DURATION_SECONDS} and {MAX_DURATION_SECONDS}"
            )));
        }
        let rate_kas_per_minute = self.rate_kas_per_minute.unwrap_or(defaults.rate_kas_per_minute);
        if !rate_kas_per_minute.is_finite()
            || !(MIN_RATE_KAS_PER_MINUTE..=MAX_RATE_KAS_PER_MINUTE).contains(&rate_kas_per_minute)
        {
            return Err(ServerError::ValidationError(format!(
                "rate_kas_per_minute must be between {MIN_RATE_KAS_PER_MINUTE} and {MAX_RATE_KAS_PER_MINUTE}"
            )));
        }
        Ok(SessionParams { checkpoint_seconds, duration_seconds, rate_kas_per_minute })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionCreatedResponse {
    pub id: SessionId,
    pub receiver_address: String,
    pub expected_amount_sompi: Sompi,
    pub expected_amount_kas: f64,
    pub checkpoint_seconds: i64,
    pub duration_seconds: i64,
    pub rate_kas_per_minute: f64,
    pub created_at: DateTime<Utc>,
    pub paid_until: DateTime<Utc>,
}

impl SessionCreatedResponse {
    pub fn new(session: &Session, duration_seconds: i64) -> Self {
        Self {
            id: session.id.clone(),
            receiver_address: session.receiver_address.clone(),
            expected_amount_sompi: session.expected_amount,
            expected_amount_kas: session.expected_amount.as_kas(),
            checkpoint_seconds: session.checkpoint_seconds,
            duration_seconds,
            rate_kas_per_minute: session.rate_kas_per_minute,
            created_at: session.created_at,
            paid_until: session.paid_until,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn defaults() -> SessionDefaults {
        SessionDefaults { receiver_address: None, checkpoint_seconds: 60, rate_kas_per_minute: 0.1 }
    }

    #[test]
    fn an_empty_body_takes_the_server_defaults() {
        let params = CreateSessionRequest::default().validate(&defaults()).unwrap();
        assert_eq!(params, SessionParams { checkpoint_seconds: 60, duration_seconds: 60, rate_kas_per_minute: 0.1 });
    }

    #[test]
    fn out_of_range_fields_are_rejected() {
        let req = CreateSessionRequest { checkpoint_seconds: Some(0), ..Default::default() };
        assert!(matches!(req.validate(&defaults()), Err(ServerError::ValidationError(_))));
        let req = CreateSessionRequest { checkpoint_seconds: Some(3601), ..Default::default() };
        assert!(req.validate(&defaults()).is_err());
        let req = CreateSessionRequest { duration_seconds: Some(4), ..Default::default() };
        assert!(req.validate(&defaults()).is_err());
        let req = CreateSessionRequest { rate_kas_per_minute: Some(0.0), ..Default::default() };
        assert!(req.validate(&defaults()).is_err());
        let req = CreateSessionRequest { rate_kas_per_minute: Some(f64::NAN), ..Default::default() };
        assert!(req.validate(&defaults()).is_err());
    }

    #[test]
    fn in_range_fields_pass_through() {
        let req = CreateSessionRequest {
            checkpoint_seconds: Some(30),
            duration_seconds: Some(600),
            rate_kas_per_minute: Some(1.5),
        };
        let params = req.validate(&defaults()).unwrap();
        assert_eq!(params, SessionParams { checkpoint_seconds: 30, duration_seconds: 600, rate_kas_per_minute: 1.5 });
    }
}
