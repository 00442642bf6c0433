//! SQLite database module for the kasmeter engine.

mod sqlite_impl;

pub mod db;
pub use sqlite_impl::SqliteDatabase;
