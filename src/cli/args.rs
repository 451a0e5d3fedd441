//! Command-line argument definitions using clap

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use crate::pipeline::{ConfigError, FilterCriteria, FilterField};

/// House Rocket - recommend houses to buy and price their resale
#[derive(Parser, Debug)]
#[command(name = "houserocket")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Input file path (CSV or Parquet) with one row per house sale
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Output file path for the valued, filtered table (CSV or Parquet, by extension).
    /// Defaults to input directory with '_valued' suffix (e.g., data.csv → data_valued.csv).
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Keep only these zipcodes (comma-separated). Empty keeps all.
    #[arg(long, value_delimiter = ',')]
    pub zipcode: Vec<i64>,

    /// Keep only these bedroom counts (comma-separated). Empty keeps all.
    #[arg(long, value_delimiter = ',')]
    pub bedrooms: Vec<f64>,

    /// Keep only these bathroom counts (comma-separated). Empty keeps all.
    #[arg(long, value_delimiter = ',')]
    pub bathrooms: Vec<f64>,

    /// Keep only these floor counts (comma-separated). Empty keeps all.
    #[arg(long, value_delimiter = ',')]
    pub floors: Vec<f64>,

    /// Keep only these grades (comma-separated). Empty keeps all.
    #[arg(long, value_delimiter = ',')]
    pub grade: Vec<i64>,

    /// Keep only houses with living area strictly below this (sqft)
    #[arg(long)]
    pub max_sqft_living: Option<i64>,

    /// Keep only houses with interior above basement strictly below this (sqft)
    #[arg(long)]
    pub max_sqft_above: Option<i64>,

    /// JSON file with filter criteria, e.g. {"zipcode": [98004], "sqft_living": 3000}.
    /// Command-line filter flags override entries for the same field.
    #[arg(long)]
    pub filters: Option<PathBuf>,

    /// GeoJSON file with zipcode boundary polygons (features keyed by a 'ZIP' property).
    /// When given, a boundary file with average profit per region is written next to the output.
    #[arg(long)]
    pub geojson: Option<PathBuf>,

    /// JSON run report path.
    /// Defaults to input directory with '_report.json' suffix.
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Number of rows shown in the opportunity and region tables
    #[arg(long, default_value = "10")]
    pub top: usize,

    /// Skip interactive filter selection
    #[arg(long, default_value = "false")]
    pub no_confirm: bool,

    /// Number of rows to use for schema inference (CSV only).
    /// Use 0 for full table scan.
    #[arg(long, default_value = "10000")]
    pub infer_schema_length: usize,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the selectable values for every filter field and exit
    Options {
        /// Input file path (CSV or Parquet)
        input: PathBuf,

        /// Number of rows to use for schema inference (CSV only)
        #[arg(long, default_value = "10000")]
        infer_schema_length: usize,
    },
}

impl Cli {
    /// Get the input path, if one was given.
    pub fn input(&self) -> Option<&PathBuf> {
        self.input.as_ref()
    }

    /// Get the output path, deriving from input if not explicitly provided.
    pub fn output_path(&self) -> Option<PathBuf> {
        let input = self.input.as_ref()?;
        Some(
            self.output
                .clone()
                .unwrap_or_else(|| sibling_path(input, "_valued", None)),
        )
    }

    /// Get the run report path, deriving from input if not explicitly provided.
    pub fn report_path(&self) -> Option<PathBuf> {
        let input = self.input.as_ref()?;
        Some(
            self.report
                .clone()
                .unwrap_or_else(|| sibling_path(input, "_report", Some("json"))),
        )
    }

    /// Path of the region profit GeoJSON, only when a boundary file was given.
    pub fn region_map_path(&self) -> Option<PathBuf> {
        self.geojson.as_ref()?;
        let input = self.input.as_ref()?;
        Some(sibling_path(input, "_region_profit", Some("geojson")))
    }

    /// Filter criteria given directly as command-line flags.
    pub fn flag_criteria(&self) -> Result<FilterCriteria, ConfigError> {
        let mut criteria = FilterCriteria::new();
        criteria.allow(
            FilterField::Zipcode,
            self.zipcode.iter().map(|&z| z as f64).collect(),
        )?;
        criteria.allow(FilterField::Bedrooms, self.bedrooms.clone())?;
        criteria.allow(FilterField::Bathrooms, self.bathrooms.clone())?;
        criteria.allow(FilterField::Floors, self.floors.clone())?;
        criteria.allow(
            FilterField::Grade,
            self.grade.iter().map(|&g| g as f64).collect(),
        )?;
        if let Some(bound) = self.max_sqft_living {
            criteria.upper_bound(FilterField::SqftLiving, bound as f64)?;
        }
        if let Some(bound) = self.max_sqft_above {
            criteria.upper_bound(FilterField::SqftAbove, bound as f64)?;
        }
        Ok(criteria)
    }
}

/// `<dir>/<stem><suffix>.<ext>`, keeping the input's extension unless overridden
fn sibling_path(input: &Path, suffix: &str, extension: Option<&str>) -> PathBuf {
    let parent = input.parent().unwrap_or_else(|| Path::new("."));
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    let extension = extension.unwrap_or_else(|| {
        input
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("csv")
    });
    parent.join(format!("{}{}.{}", stem, suffix, extension))
}
