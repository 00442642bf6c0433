use actix_web::{dev::Server, middleware::Logger, web, App, HttpServer};
use kaspa_rest::KaspaApi;
use kasmeter_engine::{SessionApi, SqliteDatabase};
use log::*;

use crate::{
    config::{KmConfig, SessionDefaults},
    errors::ServerError,
    reconciler_worker::start_reconciler,
    routes::{create_session, health, session_status},
};

pub async fn run_server(config: KmConfig) -> Result<(), ServerError> {
    SqliteDatabase::create_database_if_missing(&config.database_url)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    db.run_migrations().await.map_err(|e| ServerError::InitializeError(e.to_string()))?;
    match &config.receiver_address {
        Some(address) => {
            let ledger = KaspaApi::new(config.kaspa.clone()).map_err(|e| ServerError::InitializeError(e.to_string()))?;
            start_reconciler(db.clone(), ledger, address.clone(), config.poll_interval);
        },
        None => warn!("🚨️ No receiver address is configured. The reconciler is not running."),
    }
    let srv = create_server_instance(config, db)?;
    srv.await.map_err(|e| ServerError::BackendError(e.to_string()))
}

pub fn create_server_instance(config: KmConfig, db: SqliteDatabase) -> Result<Server, ServerError> {
    let defaults = SessionDefaults::from_config(&config);
    let srv = HttpServer::new(move || {
        let sessions_api = SessionApi::new(db.clone());
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("kasmeter::access_log"))
            .app_data(web::Data::new(sessions_api))
            .app_data(web::Data::new(defaults.clone()))
            .service(health)
            .service(web::scope("/api").service(create_session).service(session_status))
    })
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}
