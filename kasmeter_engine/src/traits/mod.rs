mod metering_db;

pub use metering_db::{MeteringDatabase, MeteringError};
