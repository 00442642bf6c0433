use chrono::{DateTime, Duration, Utc};
use kasmeter_engine::{
    db_types::{LedgerEntry, NewSession, Session},
    MeteringDatabase,
    Reconciler,
    SqliteDatabase,
    TickSummary,
};
use km_common::Sompi;

mod support;

const RECEIVER: &str = "kaspa:qr63nzn5crywrt3nuzvz0mfawvpomanyxg0uuygpczfa4q8c2vh0qk9mkfeyw";

fn at(ts: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(ts, 0).unwrap()
}

async fn session_expecting(db: &SqliteDatabase, amount: i64, checkpoint_seconds: i64) -> Session {
    db.insert_session(NewSession::new(RECEIVER, Sompi::from(amount), checkpoint_seconds, 0.1))
        .await
        .expect("Error inserting session")
}

#[tokio::test]
async fn matched_payment_extends_paid_until_from_now() {
    let db = support::new_test_db().await;
    let session = session_expecting(&db, 10_042_117, 60).await;
    let reconciler = Reconciler::new(db.clone(), RECEIVER);

    // the payment lands 5 seconds after creation, while paid_until is still in the past
    let t1 = at(session.created_at.timestamp() + 5);
    let entries = vec![LedgerEntry::new("tx1:0", Sompi::from(10_042_117))];
    let summary = reconciler.process_snapshot(&entries, t1).await.expect("Error processing snapshot");
    assert_eq!(summary, TickSummary { credited: 1, already_seen: 0, unmatched: 0 });

    let updated = db.fetch_session(&session.id).await.unwrap().unwrap();
    assert_eq!(updated.paid_until, t1 + Duration::seconds(60));
    assert_eq!(updated.last_payment_outpoint.as_deref(), Some("tx1:0"));
}

#[tokio::test]
async fn distinct_outpoints_accrue_and_unused_credit_is_preserved() {
    let db = support::new_test_db().await;
    let session = session_expecting(&db, 10_042_117, 60).await;
    let reconciler = Reconciler::new(db.clone(), RECEIVER);
    let amount = Sompi::from(10_042_117);

    let t1 = at(session.created_at.timestamp() + 5);
    reconciler.process_snapshot(&[LedgerEntry::new("tx1:0", amount)], t1).await.unwrap();
    let p1 = db.fetch_session(&session.id).await.unwrap().unwrap().paid_until;
    assert_eq!(p1, t1 + Duration::seconds(60));

    // the session has lapsed by t2, so the credit counts from t2, not from the stale expiry
    let t2 = t1 + Duration::seconds(65);
    reconciler.process_snapshot(&[LedgerEntry::new("tx2:0", amount)], t2).await.unwrap();
    let p2 = db.fetch_session(&session.id).await.unwrap().unwrap().paid_until;
    assert_eq!(p2, t2 + Duration::seconds(60));

    // paying again before the expiry stacks on top of the remaining credit
    let t3 = t2 + Duration::seconds(10);
    reconciler.process_snapshot(&[LedgerEntry::new("tx3:0", amount)], t3).await.unwrap();
    let p3 = db.fetch_session(&session.id).await.unwrap().unwrap().paid_until;
    assert_eq!(p3, p2 + Duration::seconds(60));

    assert!(p1 < p2 && p2 < p3);
    assert!(session.created_at <= p1);
}

#[tokio::test]
async fn replayed_outpoint_credits_exactly_once() {
    let db = support::new_test_db().await;
    let session = session_expecting(&db, 10_042_117, 60).await;
    let reconciler = Reconciler::new(db.clone(), RECEIVER);
    let entries = vec![LedgerEntry::new("tx1:0", Sompi::from(10_042_117))];

    let t1 = at(session.created_at.timestamp() + 5);
    let summary = reconciler.process_snapshot(&entries, t1).await.unwrap();
    assert_eq!(summary.credited, 1);
    let p1 = db.fetch_session(&session.id).await.unwrap().unwrap().paid_until;

    // the ledger re-lists the same unspent output on the next tick
    let t2 = t1 + Duration::seconds(2);
    let summary = reconciler.process_snapshot(&entries, t2).await.unwrap();
    assert_eq!(summary, TickSummary { credited: 0, already_seen: 1, unmatched: 0 });
    let p2 = db.fetch_session(&session.id).await.unwrap().unwrap().paid_until;
    assert_eq!(p1, p2);

    let seen = db.fetch_seen_outpoint("tx1:0").await.unwrap().expect("Outpoint should be recorded");
    assert_eq!(seen.amount, Sompi::from(10_042_117));
    assert_eq!(seen.seen_at, t1);
}

#[tokio::test]
async fn unmatched_amounts_credit_nothing() {
    let db = support::new_test_db().await;
    let session = session_expecting(&db, 10_042_117, 60).await;
    let reconciler = Reconciler::new(db.clone(), RECEIVER);

    let entries = vec![LedgerEntry::new("stray:0", Sompi::from(10_042_118))];
    let summary = reconciler.process_snapshot(&entries, Utc::now()).await.unwrap();
    assert_eq!(summary, TickSummary { credited: 0, already_seen: 0, unmatched: 1 });

    let untouched = db.fetch_session(&session.id).await.unwrap().unwrap();
    assert_eq!(untouched.paid_until, untouched.created_at);
    assert!(untouched.last_payment_outpoint.is_none());
    // unrecognized deposits are not marked seen; they stay visible for later matching
    assert!(!db.outpoint_seen("stray:0").await.unwrap());
}

#[tokio::test]
async fn sessions_match_independently_within_one_snapshot() {
    let db = support::new_test_db().await;
    let short = session_expecting(&db, 10_000_001, 60).await;
    let long = session_expecting(&db, 10_000_002, 120).await;
    let reconciler = Reconciler::new(db.clone(), RECEIVER);

    let t = at(short.created_at.timestamp() + 3);
    let entries = vec![
        LedgerEntry::new("tx1:0", Sompi::from(10_000_001)),
        LedgerEntry::new("tx1:1", Sompi::from(10_000_002)),
        LedgerEntry::new("tx1:2", Sompi::from(999)),
    ];
    let summary = reconciler.process_snapshot(&entries, t).await.unwrap();
    assert_eq!(summary, TickSummary { credited: 2, already_seen: 0, unmatched: 1 });

    let short = db.fetch_session(&short.id).await.unwrap().unwrap();
    let long = db.fetch_session(&long.id).await.unwrap().unwrap();
    assert_eq!(short.paid_until, t + Duration::seconds(60));
    assert_eq!(long.paid_until, t + Duration::seconds(120));
}

#[tokio::test]
async fn empty_snapshots_are_a_no_op() {
    let db = support::new_test_db().await;
    let reconciler = Reconciler::new(db.clone(), RECEIVER);

    // no entries at all
    let summary = reconciler.process_snapshot(&[], Utc::now()).await.unwrap();
    assert_eq!(summary, TickSummary::default());

    // entries but no sessions: nothing to match, nothing marked seen
    let entries = vec![LedgerEntry::new("tx9:0", Sompi::from(123_456))];
    let summary = reconciler.process_snapshot(&entries, Utc::now()).await.unwrap();
    assert_eq!(summary, TickSummary::default());
    assert!(!db.outpoint_seen("tx9:0").await.unwrap());
}
