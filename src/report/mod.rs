//! Report module - summaries, opportunity tables and file exports

pub mod export;
pub mod opportunities;
pub mod summary;

pub use export::*;
pub use opportunities::*;
pub use summary::*;
