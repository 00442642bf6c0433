mod sompi;

pub mod op;

pub use sompi::{Sompi, SompiConversionError, KAS_CURRENCY_CODE, KAS_CURRENCY_CODE_LOWER, SOMPI_PER_KAS};
