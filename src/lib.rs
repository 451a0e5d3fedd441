//! House Rocket: House Valuation Library
//!
//! A library for cleaning house-sale datasets, recommending purchases,
//! pricing resales from regional medians, and filtering the results.

pub mod cli;
pub mod pipeline;
pub mod report;
pub mod utils;
