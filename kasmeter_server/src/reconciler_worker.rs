use chrono::Utc;
use kaspa_rest::KaspaApi;
use kasmeter_engine::{db_types::LedgerEntry, Reconciler, SqliteDatabase};
use log::*;
use tokio::task::JoinHandle;

/// Starts the reconciler worker. Do not await the returned JoinHandle, as it will run indefinitely.
///
/// Each tick fetches the receiver address's current UTXO set and hands it to the engine's
/// [`Reconciler`]. A failed fetch skips the tick entirely; nothing is mutated and the next tick
/// retries.
pub fn start_reconciler(
    db: SqliteDatabase,
    ledger: KaspaApi,
    receiver_address: String,
    poll_interval: std::time::Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut timer = tokio::time::interval(poll_interval);
        let reconciler = Reconciler::new(db, receiver_address.clone());
        info!("⛏️ Reconciler started. Watching receiver address {receiver_address}");
        info!("⛏️ Ledger API base: {}", ledger.base_url());
        info!("⛏️ Poll interval: {}s", poll_interval.as_secs());
        loop {
            timer.tick().await;
            let utxos = match ledger.address_utxos(&receiver_address).await {
                Ok(utxos) => utxos,
                Err(e) => {
                    error!("⛏️ Failed to fetch the UTXO set: {e}. Skipping this tick.");
                    continue;
                },
            };
            let entries = utxos.into_iter().map(|u| LedgerEntry::new(u.outpoint_id, u.amount)).collect::<Vec<_>>();
            match reconciler.process_snapshot(&entries, Utc::now()).await {
                Ok(summary) if summary.credited > 0 => info!("⛏️ {summary}"),
                Ok(summary) => trace!("⛏️ {summary}"),
                Err(e) => error!("⛏️ Error processing the UTXO snapshot: {e}"),
            }
        }
    })
}
