use kasmeter_engine::SqliteDatabase;
use log::*;
use sqlx::{migrate, migrate::MigrateDatabase, Sqlite};

/// Spins up a fresh, fully migrated SQLite database in the system temp directory.
pub async fn new_test_db() -> SqliteDatabase {
    dotenvy::from_filename(".env.test").ok();
    let _ = env_logger::try_init();
    let url = random_db_path();
    if let Err(e) = Sqlite::drop_database(&url).await {
        warn!("Error dropping database {url}: {e:?}");
    }
    Sqlite::create_database(&url).await.expect("Error creating database");
    let db = SqliteDatabase::new_with_url(&url, 5).await.expect("Error creating connection to database");
    migrate!("./src/sqlite/db/migrations").run(db.pool()).await.expect("Error running DB migrations");
    db
}

pub fn random_db_path() -> String {
    format!("sqlite://{}/kasmeter_test_{}.db", std::env::temp_dir().display(), rand::random::<u64>())
}
