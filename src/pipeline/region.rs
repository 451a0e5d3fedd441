//! Average expected profit per zipcode and its join onto boundary polygons

use std::collections::HashMap;

use polars::prelude::*;
use serde::Serialize;
use serde_json::{Map, Value};

use super::error::{DataError, Result};
use super::schema::{columns, Recommendation, ValuedTable};

pub const AVG_PROFIT: &str = "avg_profit";
pub const HOUSES: &str = "houses";

/// Property on boundary features holding the zipcode
pub const ZIP_PROPERTY: &str = "ZIP";
pub const PROFIT_PROPERTY: &str = "PROFIT";
pub const PROFIT_LABEL_PROPERTY: &str = "PROFIT_LABEL";

/// One row of the region profit table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionProfit {
    pub zipcode: i64,
    pub avg_profit: f64,
    pub houses: u64,
}

/// Mean profit per zipcode over recommended houses.
///
/// Columns `zipcode`, `avg_profit`, `houses`; sorted by `avg_profit`
/// descending, ties by zipcode ascending. Empty when nothing is recommended.
pub fn region_profit(table: &ValuedTable) -> Result<DataFrame> {
    let df = table
        .df()
        .clone()
        .lazy()
        .filter(col(columns::BUY_HOUSE).eq(lit(Recommendation::Yes.as_str())))
        .group_by([col(columns::ZIPCODE)])
        .agg([
            col(columns::PROFIT).mean().alias(AVG_PROFIT),
            col(columns::PROFIT).count().cast(DataType::UInt64).alias(HOUSES),
        ])
        .sort(
            [AVG_PROFIT, columns::ZIPCODE],
            SortMultipleOptions::default().with_order_descending_multi([true, false]),
        )
        .collect()?;
    Ok(df)
}

/// Rows of a [`region_profit`] table as records
pub fn region_rows(region: &DataFrame) -> Result<Vec<RegionProfit>> {
    let zipcodes = region.column(columns::ZIPCODE)?.cast(&DataType::Int64)?;
    let profits = region.column(AVG_PROFIT)?.cast(&DataType::Float64)?;
    let houses = region.column(HOUSES)?.cast(&DataType::UInt64)?;

    let rows = zipcodes
        .i64()?
        .into_iter()
        .zip(profits.f64()?.into_iter())
        .zip(houses.u64()?.into_iter())
        .filter_map(|((zip, profit), count)| {
            Some(RegionProfit {
                zipcode: zip?,
                avg_profit: profit?,
                houses: count?,
            })
        })
        .collect();
    Ok(rows)
}

/// Join region profits onto a GeoJSON FeatureCollection keyed by `ZIP`.
///
/// Only features whose `ZIP` matches a region are kept (inner join). Matched
/// features gain a numeric `PROFIT` and a `PROFIT_LABEL` such as `$12,345`.
/// Other top-level members of the collection are preserved.
pub fn attach_region_profit(boundaries: &Value, region: &DataFrame) -> Result<Value> {
    let mut collection = boundaries
        .as_object()
        .cloned()
        .ok_or_else(|| DataError::InvalidBoundaries("expected a GeoJSON object".to_string()))?;
    let features = collection
        .get("features")
        .and_then(Value::as_array)
        .ok_or_else(|| DataError::InvalidBoundaries("missing 'features' array".to_string()))?;

    let profits: HashMap<i64, f64> = region_rows(region)?
        .into_iter()
        .map(|row| (row.zipcode, row.avg_profit))
        .collect();

    let joined: Vec<Value> = features
        .iter()
        .filter_map(|feature| {
            let zip = feature
                .get("properties")
                .and_then(|p| p.get(ZIP_PROPERTY))
                .and_then(zip_key)?;
            let profit = *profits.get(&zip)?;

            let mut feature = feature.clone();
            let properties = feature
                .as_object_mut()?
                .entry("properties")
                .or_insert_with(|| Value::Object(Map::new()))
                .as_object_mut()?;
            properties.insert(PROFIT_PROPERTY.to_string(), Value::from(profit));
            properties.insert(
                PROFIT_LABEL_PROPERTY.to_string(),
                Value::from(format_currency(profit)),
            );
            Some(feature)
        })
        .collect();

    collection.insert("features".to_string(), Value::Array(joined));
    Ok(Value::Object(collection))
}

fn zip_key(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Format as whole dollars with thousands separators, e.g. `$-1,234`
pub fn format_currency(amount: f64) -> String {
    let rounded = format!("{:.0}", amount);
    let (sign, digits) = match rounded.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", rounded.as_str()),
    };

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("${}{}", sign, grouped)
}
