//! HTTP endpoint tests, run against a real (throwaway) SQLite database.
use actix_web::{test, web, App};
use kasmeter_engine::{
    test_utils::{prepare_test_env, random_db_path},
    SessionApi,
    SqliteDatabase,
};
use serde_json::{json, Value};

use crate::{
    config::SessionDefaults,
    routes::{create_session, health, session_status},
};

const RECEIVER: &str = "kaspa:qr63nzn5crywrt3nuzvz0mfawvpomanyxg0uuygpczfa4q8c2vh0qk9mkfeyw";

async fn test_db() -> SqliteDatabase {
    let url = random_db_path();
    prepare_test_env(&url).await;
    SqliteDatabase::new_with_url(&url, 5).await.expect("Error creating connection to database")
}

fn defaults(receiver: Option<&str>) -> SessionDefaults {
    SessionDefaults { receiver_address: receiver.map(String::from), checkpoint_seconds: 60, rate_kas_per_minute: 0.1 }
}

#[actix_web::test]
async fn health_check() {
    let app = test::init_service(App::new().service(health)).await;
    let req = test::TestRequest::get().uri("/health").to_request();
    let res = test::call_service(&app, req).await;
    assert!(res.status().is_success());
}

#[actix_web::test]
async fn create_session_and_read_its_status() {
    let db = test_db().await;
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(SessionApi::new(db.clone())))
            .app_data(web::Data::new(defaults(Some(RECEIVER))))
            .service(web::scope("/api").service(create_session).service(session_status)),
    )
    .await;

    let body = json!({ "checkpoint_seconds": 30, "duration_seconds": 60, "rate_kas_per_minute": 0.1 });
    let req = test::TestRequest::post().uri("/api/session").set_json(&body).to_request();
    let created: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(created["receiver_address"], RECEIVER);
    assert_eq!(created["checkpoint_seconds"], 30);
    assert_eq!(created["duration_seconds"], 60);
    // 0.1 KAS base price plus a tag in (0, 0.001) KAS
    let expected = created["expected_amount_sompi"].as_i64().unwrap();
    assert!((10_000_001..=10_099_999).contains(&expected), "unexpected amount {expected}");
    assert_eq!(created["created_at"], created["paid_until"]);

    let id = created["id"].as_str().unwrap();
    let req = test::TestRequest::get().uri(&format!("/api/session/{id}")).to_request();
    let status: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(status["id"], id);
    assert_eq!(status["expected_amount_sompi"].as_i64().unwrap(), expected);
    assert_eq!(status["remaining_seconds"], 0);
    assert_eq!(status["is_unlocked"], false);
    assert_eq!(status["last_payment_outpoint"], Value::Null);
}

#[actix_web::test]
async fn create_session_rejects_out_of_range_input() {
    let db = test_db().await;
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(SessionApi::new(db.clone())))
            .app_data(web::Data::new(defaults(Some(RECEIVER))))
            .service(web::scope("/api").service(create_session)),
    )
    .await;

    let body = json!({ "checkpoint_seconds": 0 });
    let req = test::TestRequest::post().uri("/api/session").set_json(&body).to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status().as_u16(), 400);
    let err: Value = test::read_body_json(res).await;
    assert!(err["error"].as_str().unwrap().contains("checkpoint_seconds"));
}

#[actix_web::test]
async fn create_session_without_a_receiver_address_is_a_server_error() {
    let db = test_db().await;
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(SessionApi::new(db.clone())))
            .app_data(web::Data::new(defaults(None)))
            .service(web::scope("/api").service(create_session)),
    )
    .await;

    let req = test::TestRequest::post().uri("/api/session").set_json(&json!({})).to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status().as_u16(), 500);
}

#[actix_web::test]
async fn unknown_session_is_not_found() {
    let db = test_db().await;
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(SessionApi::new(db.clone())))
            .app_data(web::Data::new(defaults(Some(RECEIVER))))
            .service(web::scope("/api").service(session_status)),
    )
    .await;

    let req = test::TestRequest::get().uri("/api/session/no-such-session").to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status().as_u16(), 404);
}
