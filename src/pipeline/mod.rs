//! Pipeline module - load, clean, value and filter house-sale tables

pub mod cleaner;
pub mod error;
pub mod filter;
pub mod loader;
pub mod region;
pub mod schema;
pub mod valuation;

pub use cleaner::*;
pub use error::{ConfigError, DataError, HouseError};
pub use filter::*;
pub use loader::*;
pub use region::*;
pub use schema::*;
pub use valuation::*;
