pub mod pricing;

pub use pricing::{base_price, next_paid_until, tag_amount, TAG_MAX};
