//! Price derivation and amount tagging.

use chrono::{DateTime, Duration, Utc};
use km_common::Sompi;
use rand::Rng;

/// Upper bound (inclusive) of the random disambiguation tag, in sompi. Just under 0.001 KAS.
pub const TAG_MAX: i64 = 99_999;

/// The price, in sompi, of `seconds` of access at `rate_kas_per_minute`, rounded to the nearest
/// sompi and clamped to at least one sompi. A zero-value expectation could spuriously match
/// unrelated zero-value outputs, so it is never produced.
pub fn base_price(rate_kas_per_minute: f64, seconds: i64) -> Sompi {
    let kas = rate_kas_per_minute * (seconds as f64 / 60.0);
    Sompi::from(Sompi::from_kas(kas).value().max(1))
}

/// Adds a random tag in `[1, TAG_MAX]` sompi to `base` so that concurrent sessions paying the same
/// receiver address expect distinguishable amounts.
///
/// The tag is purely a disambiguator, not a security mechanism: it proves nothing about who paid,
/// it only makes two pending sessions landing on the same expected amount vanishingly unlikely.
pub fn tag_amount(base: Sompi) -> Sompi {
    let tag = rand::thread_rng().gen_range(1..=TAG_MAX);
    base + Sompi::from(tag)
}

/// The timestamp through which a session is paid after one matched checkpoint payment.
///
/// Credit counts from the later of the current expiry and `now`: unused time is preserved, but a
/// session whose expiry is far in the past starts counting from the present rather than accruing a
/// backlog.
pub fn next_paid_until(paid_until: DateTime<Utc>, now: DateTime<Utc>, checkpoint_seconds: i64) -> DateTime<Utc> {
    paid_until.max(now) + Duration::seconds(checkpoint_seconds)
}
