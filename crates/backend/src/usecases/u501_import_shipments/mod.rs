pub mod cache;
pub mod committer;
pub mod dedup;
pub mod executor;
pub mod numeric;
pub mod parser;
pub mod store;

pub use executor::ImportExecutor;
pub use store::{ShipmentStore, StoreError};
