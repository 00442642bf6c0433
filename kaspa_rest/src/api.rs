use std::sync::Arc;

use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT},
    Client,
};
use serde_json::Value;

use crate::{
    config::KaspaRestConfig,
    data_objects::{normalize_utxos, Utxo},
    LedgerApiError,
};

#[derive(Debug, Clone)]
pub struct KaspaApi {
    config: KaspaRestConfig,
    client: Arc<Client>,
}

impl KaspaApi {
    pub fn new(config: KaspaRestConfig) -> Result<Self, LedgerApiError> {
        let mut headers = HeaderMap::with_capacity(1);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| LedgerApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Fetches the current unspent outputs for `address` and normalizes them.
    ///
    /// Any transport error, non-success status or undecodable body is returned as an error so the
    /// caller can skip the snapshot and retry later.
    pub async fn address_utxos(&self, address: &str) -> Result<Vec<Utxo>, LedgerApiError> {
        let url = format!("{}/addresses/{}/utxos", self.config.base_url, urlencoding::encode(address));
        trace!("Fetching UTXO set: {url}");
        let response =
            self.client.get(&url).send().await.map_err(|e| LedgerApiError::ResponseError(e.to_string()))?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.map_err(|e| LedgerApiError::ResponseError(e.to_string()))?;
            return Err(LedgerApiError::QueryError { status, message });
        }
        let payload = response.json::<Value>().await.map_err(|e| LedgerApiError::JsonError(e.to_string()))?;
        let utxos = normalize_utxos(&payload);
        trace!("Fetched {} UTXOs for {address}", utxos.len());
        Ok(utxos)
    }
}
