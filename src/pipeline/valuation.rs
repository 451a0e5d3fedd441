//! Valuation engine: size tiers, purchase recommendation, resale price and profit
//!
//! The regional median is a two-pass computation. First the full cleaned
//! table is aggregated into a small lookup table keyed by
//! `(zipcode, living_size)`, then that lookup is joined back onto every row.
//! Medians always describe the whole cleaned dataset, never a filtered view.

use polars::prelude::*;
use serde::Serialize;

use super::error::{DataError, Result};
use super::schema::{columns, CleanedTable, Recommendation, Tier, ValuedTable};

const ROW_INDEX: &str = "__row_index";

/// Business constants for the valuation rules
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ValuationRules {
    /// Largest `sqft_living` still classed as small
    pub living_small_max: f64,
    /// Largest `sqft_living` still classed as medium
    pub living_medium_max: f64,
    /// Largest bedroom/bathroom count still classed as small
    pub rooms_small_max: f64,
    /// Largest bedroom/bathroom count still classed as medium
    pub rooms_medium_max: f64,
    /// Recommended houses have strictly fewer floors than this
    pub floors_below: f64,
    /// Recommended houses have at least this grade
    pub min_grade: i64,
    /// Markup for recommended houses priced at or below their regional median
    pub discount_markup: f64,
    /// Markup for every other house
    pub standard_markup: f64,
}

impl Default for ValuationRules {
    fn default() -> Self {
        Self {
            living_small_max: 2000.0,
            living_medium_max: 5000.0,
            rooms_small_max: 2.0,
            rooms_medium_max: 5.0,
            floors_below: 3.0,
            min_grade: 7,
            discount_markup: 1.10,
            standard_markup: 1.30,
        }
    }
}

/// Value a cleaned table using the default rules
pub fn value(table: &CleanedTable) -> Result<ValuedTable> {
    value_with_rules(table, &ValuationRules::default())
}

/// Attach tiers, `buy_house`, `price_med_region_size`, `price_sale` and `profit`.
///
/// Row order of the input is preserved. `price_sale` is computed for every
/// row: recommended houses at or below their regional median get the
/// discount markup, all others (including non-recommended houses) get the
/// standard markup. `profit` is `price_sale - price` for recommended houses
/// and zero otherwise.
///
/// # Errors
/// `DataError::MissingRegionMedian` if any row fails to receive a median.
pub fn value_with_rules(table: &CleanedTable, rules: &ValuationRules) -> Result<ValuedTable> {
    let tiered = tiered_plan(table, rules).with_row_index(ROW_INDEX, None);
    let medians = region_median_plan(tiered.clone());

    let keys = [col(columns::ZIPCODE), col(columns::LIVING_SIZE)];
    let valued = tiered
        .join(medians, keys.clone(), keys, JoinArgs::new(JoinType::Left))
        .with_column(price_sale_expr(rules).alias(columns::PRICE_SALE))
        .with_column(profit_expr().alias(columns::PROFIT))
        .sort([ROW_INDEX], SortMultipleOptions::default())
        .collect()?;

    let unmatched = valued.column(columns::PRICE_MED_REGION_SIZE)?.null_count();
    if unmatched > 0 {
        return Err(DataError::MissingRegionMedian { rows: unmatched }.into());
    }

    Ok(ValuedTable::new(valued.drop(ROW_INDEX)?))
}

/// Median `price` per `(zipcode, living_size)` over the full cleaned table.
///
/// Returns columns `zipcode`, `living_size`, `price_med_region_size`, sorted
/// by key.
pub fn region_medians(table: &CleanedTable, rules: &ValuationRules) -> Result<DataFrame> {
    let medians = region_median_plan(tiered_plan(table, rules))
        .sort(
            [columns::ZIPCODE, columns::LIVING_SIZE],
            SortMultipleOptions::default(),
        )
        .collect()?;
    Ok(medians)
}

fn tiered_plan(table: &CleanedTable, rules: &ValuationRules) -> LazyFrame {
    table
        .df()
        .clone()
        .lazy()
        .with_columns([
            tier_expr(
                columns::SQFT_LIVING,
                rules.living_small_max,
                rules.living_medium_max,
            )
            .alias(columns::LIVING_SIZE),
            tier_expr(columns::BEDROOMS, rules.rooms_small_max, rules.rooms_medium_max)
                .alias(columns::NUM_BEDROOM),
            tier_expr(columns::BATHROOMS, rules.rooms_small_max, rules.rooms_medium_max)
                .alias(columns::NUM_BATHROOM),
        ])
        .with_column(recommendation_expr(rules).alias(columns::BUY_HOUSE))
}

fn region_median_plan(tiered: LazyFrame) -> LazyFrame {
    tiered
        .group_by([col(columns::ZIPCODE), col(columns::LIVING_SIZE)])
        .agg([col(columns::PRICE)
            .median()
            .alias(columns::PRICE_MED_REGION_SIZE)])
}

/// Same inclusive-upper-bound rule as [`Tier::classify`], as an expression
fn tier_expr(column: &str, small_max: f64, medium_max: f64) -> Expr {
    let value = col(column).cast(DataType::Float64);
    when(value.clone().lt_eq(lit(small_max)))
        .then(lit(Tier::Small.as_str()))
        .when(value.lt_eq(lit(medium_max)))
        .then(lit(Tier::Medium.as_str()))
        .otherwise(lit(Tier::Large.as_str()))
}

fn recommendation_expr(rules: &ValuationRules) -> Expr {
    let aligned = col(columns::LIVING_SIZE)
        .eq(col(columns::NUM_BEDROOM))
        .and(col(columns::LIVING_SIZE).eq(col(columns::NUM_BATHROOM)));
    let sound = col(columns::FLOORS)
        .lt(lit(rules.floors_below))
        .and(col(columns::GRADE).gt_eq(lit(rules.min_grade)));

    when(aligned.and(sound))
        .then(lit(Recommendation::Yes.as_str()))
        .otherwise(lit(Recommendation::No.as_str()))
}

fn is_recommended() -> Expr {
    col(columns::BUY_HOUSE).eq(lit(Recommendation::Yes.as_str()))
}

fn price_sale_expr(rules: &ValuationRules) -> Expr {
    let below_region = col(columns::PRICE).lt_eq(col(columns::PRICE_MED_REGION_SIZE));
    when(is_recommended().and(below_region))
        .then(col(columns::PRICE) * lit(rules.discount_markup))
        .otherwise(col(columns::PRICE) * lit(rules.standard_markup))
}

fn profit_expr() -> Expr {
    when(is_recommended())
        .then(col(columns::PRICE_SALE) - col(columns::PRICE))
        .otherwise(lit(0.0))
}
