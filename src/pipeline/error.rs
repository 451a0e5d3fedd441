//! Error types for the house valuation pipeline.
//!
//! Every core stage (schema validation, cleaning, valuation, filtering)
//! returns [`HouseError`]. A failed stage never yields a partial table.

use polars::prelude::PolarsError;
use thiserror::Error;

/// Result alias used by the core pipeline stages.
pub type Result<T> = std::result::Result<T, HouseError>;

/// Top-level error for a pipeline run.
#[derive(Debug, Error)]
pub enum HouseError {
    /// The dataset itself is unusable for the requested computation.
    #[error("data error: {0}")]
    Data(#[from] DataError),

    /// The filter criteria or other user-supplied configuration is invalid.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// The underlying table engine failed.
    #[error(transparent)]
    Polars(#[from] PolarsError),
}

/// Problems with the shape or content of the house-sale table.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DataError {
    /// One or more required columns are absent.
    #[error("missing required column(s): {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    /// A required column contains nulls (or values that could not be cast).
    #[error("column '{column}' contains {count} null or non-numeric value(s)")]
    NullValues { column: String, count: usize },

    /// A statistic needs at least one row.
    #[error("cannot compute {statistic} over an empty table")]
    EmptyInput { statistic: &'static str },

    /// A sale date could not be parsed in any accepted format.
    #[error("row {row}: unrecognized sale date '{value}'")]
    InvalidDate { row: usize, value: String },

    /// Every row carries the outlier bedroom count, so there is nothing to replace it with.
    #[error("all {rows} row(s) have the outlier bedroom count; no regular value to replace it with")]
    UncorrectableOutliers { rows: usize },

    /// Some rows did not receive a regional median price.
    #[error("{rows} row(s) have no (zipcode, living_size) median price")]
    MissingRegionMedian { rows: usize },

    /// The geographic boundary document is not a usable FeatureCollection.
    #[error("invalid boundary data: {0}")]
    InvalidBoundaries(String),
}

/// Problems with user-supplied filter configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// The field name is not one of the recognized filter fields.
    #[error("unknown filter field '{0}' (expected one of: zipcode, bedrooms, bathrooms, floors, grade, sqft_living, sqft_above)")]
    UnknownField(String),

    /// The criterion's shape does not match the field's filter kind.
    #[error("filter field '{field}' expects {expected}, got {found}")]
    TypeMismatch {
        field: String,
        expected: &'static str,
        found: String,
    },

    /// The criterion value is not a finite number.
    #[error("filter field '{field}' has invalid value '{value}'")]
    InvalidValue { field: String, value: String },

    /// The filter document could not be parsed.
    #[error("could not parse filter criteria: {0}")]
    Parse(String),
}
