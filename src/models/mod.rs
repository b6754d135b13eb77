pub mod supply;

pub use supply::{FetchOutcome, SupplySnapshot};
