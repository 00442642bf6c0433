//! Normalization of explorer UTXO responses.
//!
//! Explorer deployments are not consistent about field names or envelope shape, and amounts are
//! sometimes serialized as strings. The functions here fold the known variants into a single
//! [`Utxo`] shape and silently drop anything unrecognizable. A deposit the explorer reports in a
//! shape we cannot read is simply invisible to the reconciler until the API settles down; it is
//! never an error.

use km_common::Sompi;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One unspent output on the receiver address, reduced to the two fields kasmeter cares about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Utxo {
    /// `txid:index`, unique per output on the ledger.
    pub outpoint_id: String,
    pub amount: Sompi,
}

/// Accepts either a bare array of UTXO entries or an object wrapping one under `utxos`.
/// Anything else yields an empty list.
pub fn normalize_utxos(payload: &Value) -> Vec<Utxo> {
    let entries = match payload {
        Value::Array(entries) => entries.as_slice(),
        Value::Object(map) => match map.get("utxos") {
            Some(Value::Array(entries)) => entries.as_slice(),
            _ => return Vec::new(),
        },
        _ => return Vec::new(),
    };
    entries.iter().filter_map(normalize_entry).collect()
}

fn normalize_entry(entry: &Value) -> Option<Utxo> {
    let outpoint_id = outpoint_of(entry)?;
    let amount = amount_of(entry)?;
    Some(Utxo { outpoint_id, amount })
}

/// Builds the `txid:index` identifier. Known spellings: `transactionId`, `txId`, `txid` and
/// `index`, `outpointIndex`, `vout`, each also nested under an `outpoint` object.
fn outpoint_of(entry: &Value) -> Option<String> {
    let nested = &entry["outpoint"];
    let txid = first_str(&[&entry["transactionId"], &entry["txId"], &entry["txid"], &nested["transactionId"]])?;
    let index = first_u64(&[&entry["index"], &entry["outpointIndex"], &entry["vout"], &nested["index"]])?;
    Some(format!("{txid}:{index}"))
}

/// The amount in sompi, from `amount` or nested `utxoEntry.amount`, as a number or a string.
fn amount_of(entry: &Value) -> Option<Sompi> {
    let raw = [&entry["amount"], &entry["utxoEntry"]["amount"]].into_iter().find(|v| !v.is_null())?;
    match raw {
        Value::Number(n) => n.as_i64().map(Sompi::from),
        Value::String(s) => s.parse::<i64>().ok().map(Sompi::from),
        _ => None,
    }
}

fn first_str(candidates: &[&Value]) -> Option<String> {
    candidates.iter().find_map(|v| v.as_str().map(String::from))
}

fn first_u64(candidates: &[&Value]) -> Option<u64> {
    candidates.iter().find_map(|v| v.as_u64())
}

#[cfg(test)]
mod test {
    use serde_json::json;

    use super::*;

    #[test]
    fn bare_array_with_canonical_fields() {
        let payload = json!([{"transactionId": "abc", "index": 0, "amount": 12345}]);
        let utxos = normalize_utxos(&payload);
        assert_eq!(utxos, vec![Utxo { outpoint_id: "abc:0".into(), amount: Sompi::from(12345) }]);
    }

    #[test]
    fn wrapped_array_with_nested_outpoint_and_string_amount() {
        let payload = json!({"utxos": [{
            "outpoint": {"transactionId": "def", "index": 2},
            "utxoEntry": {"amount": "500000000"}
        }]});
        let utxos = normalize_utxos(&payload);
        assert_eq!(utxos, vec![Utxo { outpoint_id: "def:2".into(), amount: Sompi::from(500_000_000) }]);
    }

    #[test]
    fn alias_spellings() {
        let payload = json!([
            {"txId": "a", "outpointIndex": 1, "amount": 10},
            {"txid": "b", "vout": 3, "amount": 20},
        ]);
        let utxos = normalize_utxos(&payload);
        assert_eq!(utxos.len(), 2);
        assert_eq!(utxos[0].outpoint_id, "a:1");
        assert_eq!(utxos[1].outpoint_id, "b:3");
    }

    #[test]
    fn unreadable_entries_are_dropped() {
        let payload = json!([
            {"transactionId": "ok", "index": 0, "amount": 1},
            {"index": 0, "amount": 2},
            {"transactionId": "no-index", "amount": 3},
            {"transactionId": "no-amount", "index": 4},
            {"transactionId": "bad-amount", "index": 5, "amount": [1]},
        ]);
        let utxos = normalize_utxos(&payload);
        assert_eq!(utxos.len(), 1);
        assert_eq!(utxos[0].outpoint_id, "ok:0");
    }

    #[test]
    fn unrecognized_envelopes_yield_nothing() {
        assert!(normalize_utxos(&json!({"entries": []})).is_empty());
        assert!(normalize_utxos(&json!("nope")).is_empty());
        assert!(normalize_utxos(&json!(null)).is_empty());
    }
}
