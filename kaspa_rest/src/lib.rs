//! A thin client for the Kaspa REST explorer API (`api.kaspa.org` and compatible deployments).
//!
//! Only the single endpoint kasmeter needs is wrapped: the UTXO set for an address. Explorer
//! deployments differ slightly in how they spell the UTXO fields, so the response is normalized
//! defensively in [`data_objects`] rather than deserialized against a rigid schema.

mod api;
mod config;
mod error;

pub mod data_objects;

pub use api::KaspaApi;
pub use config::KaspaRestConfig;
pub use data_objects::Utxo;
pub use error::LedgerApiError;
