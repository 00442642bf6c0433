//! # kasmeter server
//!
//! This crate hosts the HTTP surface and the background reconciler for kasmeter. It is
//! responsible for:
//! * Creating metered sessions and reporting their derived status to clients.
//! * Polling the Kaspa REST explorer for the receiver address's UTXO set and feeding each
//!   snapshot to the engine's reconciler.
//!
//! ## Configuration
//! The server is configured via `KM_*` environment variables. See [config](config/index.html) for
//! more information.
//!
//! ## Routes
//! * `/health`: a health check that returns a 200 OK response.
//! * `/api/session`: POST, creates a session and returns its expected payment amount.
//! * `/api/session/{id}`: GET, the session's full derived status.

pub mod config;
pub mod data_objects;
pub mod errors;
pub mod reconciler_worker;
pub mod routes;
pub mod server;

#[cfg(test)]
mod endpoint_tests;
