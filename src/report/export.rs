//! Writing the valued table, the region map and the JSON run report

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use polars::prelude::*;
use serde::Serialize;

use crate::pipeline::{RegionProfit, ValuationRules};

use super::{Opportunity, PortfolioSummary};

/// Save a table to file (CSV or Parquet based on extension)
pub fn save_table(df: &mut DataFrame, path: &Path) -> Result<()> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match extension.as_str() {
        "csv" => {
            let mut file = std::fs::File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path.display()))?;
            CsvWriter::new(&mut file)
                .finish(df)
                .with_context(|| format!("Failed to write CSV file: {}", path.display()))?;
        }
        "parquet" => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path.display()))?;
            ParquetWriter::new(file)
                .finish(df)
                .with_context(|| format!("Failed to write Parquet file: {}", path.display()))?;
        }
        _ => anyhow::bail!(
            "Unsupported output format: {}. Supported formats: csv, parquet",
            extension
        ),
    }

    Ok(())
}

/// Write a JSON document (GeoJSON region map, etc.) with pretty formatting
pub fn write_json(value: &serde_json::Value, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize JSON")?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write JSON file: {}", path.display()))?;
    Ok(())
}

/// Metadata about the run
#[derive(Serialize)]
pub struct RunMetadata {
    /// Timestamp of the run (RFC 3339)
    pub timestamp: String,
    pub houserocket_version: String,
    pub input_file: String,
    pub output_file: String,
    /// Active filter criteria, one entry per field
    pub filters: Vec<String>,
    pub rules: ValuationRules,
}

/// Cleaning figures carried into the report
#[derive(Serialize)]
pub struct CleaningSection {
    pub rows_loaded: usize,
    pub duplicates_removed: usize,
    pub outliers_corrected: usize,
    pub bedrooms_median: f64,
}

/// Complete run report
#[derive(Serialize)]
pub struct RunReport {
    pub metadata: RunMetadata,
    pub cleaning: CleaningSection,
    /// Summary over the full valued table
    pub overall: PortfolioSummary,
    /// Summary over the filtered selection
    pub selection: PortfolioSummary,
    pub top_regions: Vec<RegionProfit>,
    pub top_opportunities: Vec<Opportunity>,
}

/// Parameters for building the run report metadata
pub struct ReportParams<'a> {
    pub input_file: &'a str,
    pub output_file: &'a str,
    pub filters: Vec<String>,
    pub rules: ValuationRules,
}

impl RunReport {
    pub fn new(
        params: ReportParams<'_>,
        cleaning: CleaningSection,
        overall: PortfolioSummary,
        selection: PortfolioSummary,
        top_regions: Vec<RegionProfit>,
        top_opportunities: Vec<Opportunity>,
    ) -> Self {
        Self {
            metadata: RunMetadata {
                timestamp: Utc::now().to_rfc3339(),
                houserocket_version: env!("CARGO_PKG_VERSION").to_string(),
                input_file: params.input_file.to_string(),
                output_file: params.output_file.to_string(),
                filters: params.filters,
                rules: params.rules,
            },
            cleaning,
            overall,
            selection,
            top_regions,
            top_opportunities,
        }
    }
}

/// Export the run report as pretty-printed JSON
pub fn export_run_report(report: &RunReport, output_path: &Path) -> Result<()> {
    let json =
        serde_json::to_string_pretty(report).context("Failed to serialize run report to JSON")?;

    std::fs::write(output_path, json)
        .with_context(|| format!("Failed to write run report to {}", output_path.display()))?;

    Ok(())
}
