//! Dataset loader for CSV and Parquet house-sale files

use std::path::Path;

use anyhow::{Context, Result};
use polars::prelude::*;

use super::schema::HouseTable;

/// Scan a CSV or Parquet file (by extension) without collecting it.
///
/// `infer_schema_length` applies to CSV only; 0 means a full table scan.
pub fn scan_dataset(path: &Path, infer_schema_length: usize) -> Result<LazyFrame> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    let schema_length = if infer_schema_length == 0 {
        None
    } else {
        Some(infer_schema_length)
    };

    let lf = match extension.as_str() {
        "csv" => LazyCsvReader::new(path)
            .with_infer_schema_length(schema_length)
            .finish()
            .with_context(|| format!("Failed to load CSV file: {}", path.display()))?,
        "parquet" => LazyFrame::scan_parquet(path, Default::default())
            .with_context(|| format!("Failed to load Parquet file: {}", path.display()))?,
        _ => anyhow::bail!(
            "Unsupported file format: {}. Supported formats: csv, parquet",
            extension
        ),
    };

    Ok(lf)
}

/// Read a CSV or Parquet file into a DataFrame
pub fn read_frame(path: &Path, infer_schema_length: usize) -> Result<DataFrame> {
    scan_dataset(path, infer_schema_length)?
        .collect()
        .with_context(|| format!("Failed to read dataset: {}", path.display()))
}

/// Load and validate a house-sale dataset.
///
/// Schema problems surface as [`HouseError`](super::HouseError) inside the
/// returned `anyhow::Error` and can be recovered with `downcast_ref`.
pub fn load_houses(path: &Path, infer_schema_length: usize) -> Result<HouseTable> {
    let df = read_frame(path, infer_schema_length)?;
    let table = HouseTable::from_frame(df)
        .with_context(|| format!("Invalid house dataset: {}", path.display()))?;
    Ok(table)
}

/// Column names of a dataset without validating it
pub fn get_column_names(path: &Path) -> Result<Vec<String>> {
    let schema = scan_dataset(path, 100)?
        .collect_schema()
        .with_context(|| format!("Failed to read schema: {}", path.display()))?;
    Ok(schema.iter_names().map(|name| name.to_string()).collect())
}
