pub mod payout;
pub mod rate_limit;
pub mod settlement;
pub mod types;
pub mod validate;
pub mod wheel;

pub use settlement::SpinEngine;
pub use types::*;
pub use wheel::{OsEntropySource, OutcomeSource};
