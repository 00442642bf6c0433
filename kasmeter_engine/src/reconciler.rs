//! The reconciliation core.
//!
//! A [`Reconciler`] takes one snapshot of the receiver address's unspent outputs at a time and
//! matches it against the pending sessions in the store. It keeps no state of its own: which
//! outpoints have been handled and how far each session is paid both live in the database, so a
//! crashed or restarted process simply resumes with the next snapshot.

use std::fmt::{Debug, Display};

use chrono::{DateTime, Utc};
use log::*;

use crate::{
    db_types::LedgerEntry,
    traits::{MeteringDatabase, MeteringError},
};

/// Outcome of processing one ledger snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickSummary {
    /// Entries that credited a session.
    pub credited: usize,
    /// Entries skipped because their outpoint was already processed.
    pub already_seen: usize,
    /// Entries matching no session's expected amount.
    pub unmatched: usize,
}

impl Display for TickSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} credited, {} already seen, {} unmatched", self.credited, self.already_seen, self.unmatched)
    }
}

/// Matches ledger snapshots against pending sessions and applies time credits.
pub struct Reconciler<B> {
    db: B,
    receiver_address: String,
}

impl<B> Debug for Reconciler<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Reconciler ({})", self.receiver_address)
    }
}

impl<B> Reconciler<B> {
    pub fn new(db: B, receiver_address: impl Into<String>) -> Self {
        Self { db, receiver_address: receiver_address.into() }
    }

    pub fn receiver_address(&self) -> &str {
        &self.receiver_address
    }
}

impl<B> Reconciler<B>
where B: MeteringDatabase
{
    /// Processes one snapshot of the receiver address's unspent outputs, observed at `now`.
    ///
    /// Per entry: outpoints already recorded as seen are skipped; otherwise the entry is matched by
    /// exact amount against the sessions on this address, oldest first. On a match, marking the
    /// outpoint seen and extending `paid_until` happen in one transaction; a replay that slips past
    /// the seen check fails there and is downgraded to "already handled". A failure on one entry is
    /// logged and does not block the remaining entries.
    ///
    /// Entry order within the snapshot carries no meaning; matching is keyed by amount alone.
    pub async fn process_snapshot(
        &self,
        entries: &[LedgerEntry],
        now: DateTime<Utc>,
    ) -> Result<TickSummary, MeteringError> {
        let mut summary = TickSummary::default();
        if entries.is_empty() {
            return Ok(summary);
        }
        let mut sessions = self.db.fetch_sessions_for_address(&self.receiver_address).await?;
        if sessions.is_empty() {
            trace!("⛏️ No sessions are paying into {}. Nothing to match.", self.receiver_address);
            return Ok(summary);
        }
        for entry in entries {
            match self.db.outpoint_seen(&entry.outpoint_id).await {
                Ok(true) => {
                    summary.already_seen += 1;
                    continue;
                },
                Ok(false) => {},
                Err(e) => {
                    error!("⛏️ Could not check outpoint {}: {e}", entry.outpoint_id);
                    continue;
                },
            }
            let Some(idx) = sessions.iter().position(|s| s.expected_amount == entry.amount) else {
                trace!("⛏️ Outpoint {} ({}) matches no pending session", entry.outpoint_id, entry.amount);
                summary.unmatched += 1;
                continue;
            };
            match self.db.credit_session(&sessions[idx].id, entry, now).await {
                Ok(updated) => {
                    info!(
                        "⛏️ Matched payment for session {}: +{}s (outpoint {})",
                        updated.id, updated.checkpoint_seconds, entry.outpoint_id
                    );
                    summary.credited += 1;
                    // keep the in-memory copy current so a second matching outpoint in the same
                    // snapshot extends the new expiry
                    sessions[idx] = updated;
                },
                Err(MeteringError::OutpointAlreadySeen(outpoint)) => {
                    debug!("⛏️ Outpoint {outpoint} was already handled. Skipping.");
                    summary.already_seen += 1;
                },
                Err(e) => {
                    error!("⛏️ Could not credit session {} from outpoint {}: {e}", sessions[idx].id, entry.outpoint_id);
                },
            }
        }
        debug!("⛏️ Snapshot for {} processed: {summary}", self.receiver_address);
        Ok(summary)
    }
}
