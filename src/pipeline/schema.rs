//! House-sale table schema and pipeline phase types
//!
//! The pipeline moves a table through three phases, each with its own type:
//! [`HouseTable`] (schema-validated input), [`CleanedTable`] (deduplicated,
//! outlier-corrected) and [`ValuedTable`] (tiers, recommendation, sale price
//! and profit attached). Only the cleaner can produce a `CleanedTable` and
//! only the valuation engine (or filtering) can produce a `ValuedTable`, so
//! valuation can never run on raw rows.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use polars::prelude::*;
use serde::Serialize;

use super::error::{DataError, Result};

/// Column names used throughout the pipeline.
pub mod columns {
    pub const ID: &str = "id";
    pub const DATE: &str = "date";
    pub const PRICE: &str = "price";
    pub const BEDROOMS: &str = "bedrooms";
    pub const BATHROOMS: &str = "bathrooms";
    pub const SQFT_LIVING: &str = "sqft_living";
    pub const SQFT_ABOVE: &str = "sqft_above";
    pub const FLOORS: &str = "floors";
    pub const GRADE: &str = "grade";
    pub const ZIPCODE: &str = "zipcode";
    pub const LAT: &str = "lat";
    pub const LONG: &str = "long";

    // Derived by the valuation engine
    pub const LIVING_SIZE: &str = "living_size";
    pub const NUM_BEDROOM: &str = "num_bedroom";
    pub const NUM_BATHROOM: &str = "num_bathroom";
    pub const BUY_HOUSE: &str = "buy_house";
    pub const PRICE_MED_REGION_SIZE: &str = "price_med_region_size";
    pub const PRICE_SALE: &str = "price_sale";
    pub const PROFIT: &str = "profit";
}

/// Columns every input table must carry.
pub const REQUIRED_COLUMNS: [&str; 12] = [
    columns::ID,
    columns::DATE,
    columns::PRICE,
    columns::BEDROOMS,
    columns::BATHROOMS,
    columns::SQFT_LIVING,
    columns::SQFT_ABOVE,
    columns::FLOORS,
    columns::GRADE,
    columns::ZIPCODE,
    columns::LAT,
    columns::LONG,
];

/// Columns appended by the valuation engine, in output order.
pub const DERIVED_COLUMNS: [&str; 7] = [
    columns::LIVING_SIZE,
    columns::NUM_BEDROOM,
    columns::NUM_BATHROOM,
    columns::BUY_HOUSE,
    columns::PRICE_MED_REGION_SIZE,
    columns::PRICE_SALE,
    columns::PROFIT,
];

const INTEGER_COLUMNS: [&str; 5] = [
    columns::ID,
    columns::SQFT_LIVING,
    columns::SQFT_ABOVE,
    columns::GRADE,
    columns::ZIPCODE,
];

const FLOAT_COLUMNS: [&str; 6] = [
    columns::PRICE,
    columns::BEDROOMS,
    columns::BATHROOMS,
    columns::FLOORS,
    columns::LAT,
    columns::LONG,
];

const DATETIME_FORMATS: [&str; 3] = ["%Y%m%dT%H%M%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%m/%d/%Y", "%Y%m%d"];

/// Size bucket derived from a numeric threshold pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Small,
    Medium,
    Large,
}

impl Tier {
    /// Classify a value; both upper bounds are inclusive.
    pub fn classify(value: f64, small_max: f64, medium_max: f64) -> Tier {
        if value <= small_max {
            Tier::Small
        } else if value <= medium_max {
            Tier::Medium
        } else {
            Tier::Large
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Tier::Small => "small",
            Tier::Medium => "medium",
            Tier::Large => "large",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tier {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "small" => Ok(Tier::Small),
            "medium" => Ok(Tier::Medium),
            "large" => Ok(Tier::Large),
            other => Err(format!("unknown tier '{}'", other)),
        }
    }
}

/// Purchase decision stored in the `buy_house` column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Recommendation {
    Yes,
    No,
}

impl Recommendation {
    pub fn as_str(self) -> &'static str {
        match self {
            Recommendation::Yes => "Yes",
            Recommendation::No => "No",
        }
    }

    pub fn is_buy(self) -> bool {
        self == Recommendation::Yes
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Recommendation {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "Yes" => Ok(Recommendation::Yes),
            "No" => Ok(Recommendation::No),
            other => Err(format!("unknown recommendation '{}'", other)),
        }
    }
}

/// Schema-validated house-sale table, as read from the source dataset.
///
/// Required columns are present, null-free and cast to canonical types
/// (integers as Int64, measures as Float64) and `date` is normalized to
/// `YYYY-MM-DD`. Valuation columns left over from an earlier run are
/// dropped; other extra columns are carried along untouched.
#[derive(Debug, Clone)]
pub struct HouseTable {
    df: DataFrame,
}

impl HouseTable {
    pub fn from_frame(df: DataFrame) -> Result<Self> {
        let present: HashSet<&str> = df.get_column_names().iter().map(|n| n.as_str()).collect();
        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|name| !present.contains(*name))
            .map(|name| name.to_string())
            .collect();

        if !missing.is_empty() {
            return Err(DataError::MissingColumns(missing).into());
        }

        // Derived columns from an earlier valuation are recomputed, never reused
        let stale: Vec<String> = DERIVED_COLUMNS
            .iter()
            .filter(|name| present.contains(*name))
            .map(|name| name.to_string())
            .collect();
        let df = df.drop_many(&stale);

        let casts: Vec<Expr> = INTEGER_COLUMNS
            .iter()
            .map(|name| col(*name).cast(DataType::Int64))
            .chain(FLOAT_COLUMNS.iter().map(|name| col(*name).cast(DataType::Float64)))
            .collect();

        let mut df = df.lazy().with_columns(casts).collect()?;

        // Failed casts surface as nulls, so this also catches non-numeric text
        for name in REQUIRED_COLUMNS {
            let count = df.column(name)?.null_count();
            if count > 0 {
                return Err(DataError::NullValues {
                    column: name.to_string(),
                    count,
                }
                .into());
            }
        }

        let dates = normalize_dates(df.column(columns::DATE)?)?;
        df.with_column(dates)?;

        Ok(Self { df })
    }

    pub fn df(&self) -> &DataFrame {
        &self.df
    }

    pub fn height(&self) -> usize {
        self.df.height()
    }
}

impl From<CleanedTable> for HouseTable {
    fn from(table: CleanedTable) -> Self {
        Self { df: table.df }
    }
}

/// Deduplicated, outlier-corrected table. Produced only by the cleaner.
#[derive(Debug, Clone)]
pub struct CleanedTable {
    df: DataFrame,
}

impl CleanedTable {
    pub(crate) fn new(df: DataFrame) -> Self {
        Self { df }
    }

    pub fn df(&self) -> &DataFrame {
        &self.df
    }

    pub fn height(&self) -> usize {
        self.df.height()
    }
}

/// Table with tiers, recommendation, regional median, sale price and profit.
///
/// Produced by the valuation engine; filtering a `ValuedTable` yields another
/// `ValuedTable` whose derived columns still refer to the full dataset.
#[derive(Debug, Clone)]
pub struct ValuedTable {
    df: DataFrame,
}

impl ValuedTable {
    pub(crate) fn new(df: DataFrame) -> Self {
        Self { df }
    }

    pub fn df(&self) -> &DataFrame {
        &self.df
    }

    pub fn height(&self) -> usize {
        self.df.height()
    }

    pub fn is_empty(&self) -> bool {
        self.df.height() == 0
    }

    /// Number of rows recommended for purchase
    pub fn recommended_count(&self) -> Result<usize> {
        let buy = self.df.column(columns::BUY_HOUSE)?;
        Ok(buy
            .str()?
            .into_iter()
            .filter(|v| *v == Some(Recommendation::Yes.as_str()))
            .count())
    }
}

/// Parse a sale date in any of the accepted source formats.
///
/// Accepts the King County export form (`20141013T000000`), ISO dates and
/// datetimes, US `MM/DD/YYYY` and compact `YYYYMMDD`.
pub fn parse_sale_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok().map(|dt| dt.date()))
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        })
}

fn normalize_dates(column: &Column) -> Result<Column> {
    let text = match column.dtype() {
        DataType::Date => return Ok(column.cast(&DataType::String)?),
        DataType::Datetime(_, _) => {
            return Ok(column.cast(&DataType::Date)?.cast(&DataType::String)?)
        }
        DataType::String => column.clone(),
        _ => column.cast(&DataType::String)?,
    };

    let mut normalized: Vec<String> = Vec::with_capacity(text.len());
    for (row, value) in text.str()?.into_iter().enumerate() {
        let value = value.unwrap_or_default();
        let date = parse_sale_date(value).ok_or_else(|| DataError::InvalidDate {
            row,
            value: value.to_string(),
        })?;
        normalized.push(date.format("%Y-%m-%d").to_string());
    }

    Ok(Column::new(columns::DATE.into(), normalized))
}
