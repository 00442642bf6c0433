//! Request handler definitions
//!
//! Define each route and its handler here. Handlers that are more than a line or two MUST go into
//! a separate module. Keep this module neat and tidy 🙏
use actix_web::{get, post, web, HttpResponse, Responder};
use kasmeter_engine::{db_types::SessionId, SessionApi, SqliteDatabase};
use log::*;

use crate::{
    config::SessionDefaults,
    data_objects::{CreateSessionRequest, SessionCreatedResponse},
    errors::ServerError,
};

/// Route handler for the health check endpoint
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

/// Route handler for creating a new metered session.
///
/// The request body is validated against the configured bounds, the expected payment amount is
/// derived (price plus disambiguation tag), and the new session's public fields are returned.
/// Without a configured receiver address this endpoint refuses with a server error.
#[post("/session")]
pub async fn create_session(
    body: web::Json<CreateSessionRequest>,
    api: web::Data<SessionApi<SqliteDatabase>>,
    defaults: web::Data<SessionDefaults>,
) -> Result<HttpResponse, ServerError> {
    let params = body.validate(&defaults)?;
    let receiver = defaults.receiver_address.as_deref().ok_or_else(|| {
        ServerError::ConfigurationError("No receiver address has been configured on this server".to_string())
    })?;
    let session = api
        .create_session(receiver, params.rate_kas_per_minute, params.checkpoint_seconds, params.duration_seconds)
        .await?;
    info!("💻️ Session {} created. It expects payments of {} into {receiver}", session.id, session.expected_amount);
    Ok(HttpResponse::Ok().json(SessionCreatedResponse::new(&session, params.duration_seconds)))
}

/// Route handler for reading a session's derived status.
///
/// An unknown id is a 404, distinct from a session that exists but is locked.
#[get("/session/{id}")]
pub async fn session_status(
    path: web::Path<String>,
    api: web::Data<SessionApi<SqliteDatabase>>,
) -> Result<HttpResponse, ServerError> {
    let id = SessionId::from(path.into_inner());
    match api.session_status(&id).await? {
        Some(status) => Ok(HttpResponse::Ok().json(status)),
        None => Err(ServerError::NoRecordFound(format!("Session {id} does not exist"))),
    }
}
