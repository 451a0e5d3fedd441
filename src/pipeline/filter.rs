//! User filter criteria and the filter stage
//!
//! Categorical fields (`zipcode`, `bedrooms`, `bathrooms`, `floors`, `grade`)
//! take a set of allowed values; an empty set means no filtering on that
//! field. Size fields (`sqft_living`, `sqft_above`) take a single exclusive
//! upper bound. Active criteria combine with AND.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use polars::prelude::*;
use serde::Serialize;
use serde_json::Value;

use super::error::{ConfigError, Result};
use super::schema::{columns, ValuedTable};

/// How a filter field restricts rows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    /// Keep rows whose value is in the allowed set
    Membership,
    /// Keep rows whose value is strictly below the bound
    UpperBound,
}

/// The recognized filter fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FilterField {
    Zipcode,
    Bedrooms,
    Bathrooms,
    Floors,
    Grade,
    SqftLiving,
    SqftAbove,
}

impl FilterField {
    pub const ALL: [FilterField; 7] = [
        FilterField::Zipcode,
        FilterField::Bedrooms,
        FilterField::Bathrooms,
        FilterField::Floors,
        FilterField::Grade,
        FilterField::SqftLiving,
        FilterField::SqftAbove,
    ];

    /// Column the field filters on (also its name in filter files)
    pub fn column(self) -> &'static str {
        match self {
            FilterField::Zipcode => columns::ZIPCODE,
            FilterField::Bedrooms => columns::BEDROOMS,
            FilterField::Bathrooms => columns::BATHROOMS,
            FilterField::Floors => columns::FLOORS,
            FilterField::Grade => columns::GRADE,
            FilterField::SqftLiving => columns::SQFT_LIVING,
            FilterField::SqftAbove => columns::SQFT_ABOVE,
        }
    }

    pub fn kind(self) -> FilterKind {
        match self {
            FilterField::SqftLiving | FilterField::SqftAbove => FilterKind::UpperBound,
            _ => FilterKind::Membership,
        }
    }

    /// Human-readable label used by prompts and the config card
    pub fn label(self) -> &'static str {
        match self {
            FilterField::Zipcode => "Zipcode",
            FilterField::Bedrooms => "# of Bedrooms",
            FilterField::Bathrooms => "# of Bathrooms",
            FilterField::Floors => "# of Floors",
            FilterField::Grade => "Grade",
            FilterField::SqftLiving => "Living Size (sqft)",
            FilterField::SqftAbove => "Interior Size Above Basement (sqft)",
        }
    }
}

impl fmt::Display for FilterField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

impl FromStr for FilterField {
    type Err = ConfigError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        FilterField::ALL
            .into_iter()
            .find(|field| field.column() == s)
            .ok_or_else(|| ConfigError::UnknownField(s.to_string()))
    }
}

/// Active filter criteria. The default value filters nothing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterCriteria {
    allowed: BTreeMap<FilterField, Vec<f64>>,
    bounds: BTreeMap<FilterField, f64>,
}

impl FilterCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict a categorical field to `values`. An empty list clears the field.
    pub fn allow(
        &mut self,
        field: FilterField,
        values: Vec<f64>,
    ) -> std::result::Result<&mut Self, ConfigError> {
        if field.kind() != FilterKind::Membership {
            return Err(ConfigError::TypeMismatch {
                field: field.to_string(),
                expected: "a single upper bound",
                found: "a set of values".to_string(),
            });
        }
        if let Some(bad) = values.iter().find(|v| !v.is_finite()) {
            return Err(ConfigError::InvalidValue {
                field: field.to_string(),
                value: bad.to_string(),
            });
        }

        if values.is_empty() {
            self.allowed.remove(&field);
        } else {
            self.allowed.insert(field, values);
        }
        Ok(self)
    }

    /// Set an exclusive upper bound on a size field.
    pub fn upper_bound(
        &mut self,
        field: FilterField,
        bound: f64,
    ) -> std::result::Result<&mut Self, ConfigError> {
        if field.kind() != FilterKind::UpperBound {
            return Err(ConfigError::TypeMismatch {
                field: field.to_string(),
                expected: "a set of values",
                found: "a single upper bound".to_string(),
            });
        }
        if !bound.is_finite() {
            return Err(ConfigError::InvalidValue {
                field: field.to_string(),
                value: bound.to_string(),
            });
        }
        self.bounds.insert(field, bound);
        Ok(self)
    }

    pub fn allowed(&self, field: FilterField) -> Option<&[f64]> {
        self.allowed.get(&field).map(|v| v.as_slice())
    }

    pub fn bound(&self, field: FilterField) -> Option<f64> {
        self.bounds.get(&field).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.allowed.is_empty() && self.bounds.is_empty()
    }

    /// Overlay `other` on top of `self`; fields set in `other` win.
    pub fn merge(&mut self, other: FilterCriteria) {
        self.allowed.extend(other.allowed);
        self.bounds.extend(other.bounds);
    }

    /// Parse a JSON object such as `{"zipcode": [98004], "sqft_living": 3000}`.
    pub fn from_json_str(text: &str) -> std::result::Result<Self, ConfigError> {
        let value: Value =
            serde_json::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        Self::from_json_value(&value)
    }

    pub fn from_json_value(value: &Value) -> std::result::Result<Self, ConfigError> {
        let object = value.as_object().ok_or_else(|| {
            ConfigError::Parse(format!("expected a JSON object, got {}", json_kind(value)))
        })?;

        let mut criteria = FilterCriteria::new();
        for (key, entry) in object {
            let field: FilterField = key.parse()?;
            match field.kind() {
                FilterKind::Membership => {
                    let items = entry.as_array().ok_or_else(|| ConfigError::TypeMismatch {
                        field: key.clone(),
                        expected: "an array of numbers",
                        found: json_kind(entry).to_string(),
                    })?;
                    let values = items
                        .iter()
                        .map(|item| {
                            item.as_f64().ok_or_else(|| ConfigError::TypeMismatch {
                                field: key.clone(),
                                expected: "an array of numbers",
                                found: format!("an array containing {}", json_kind(item)),
                            })
                        })
                        .collect::<std::result::Result<Vec<f64>, _>>()?;
                    criteria.allow(field, values)?;
                }
                FilterKind::UpperBound => {
                    if entry.is_null() {
                        continue;
                    }
                    let bound = entry.as_f64().ok_or_else(|| ConfigError::TypeMismatch {
                        field: key.clone(),
                        expected: "a number",
                        found: json_kind(entry).to_string(),
                    })?;
                    criteria.upper_bound(field, bound)?;
                }
            }
        }
        Ok(criteria)
    }

    /// One line per active criterion, for display and reports
    pub fn describe(&self) -> Vec<String> {
        let mut lines: Vec<String> = self
            .allowed
            .iter()
            .map(|(field, values)| {
                let listed: Vec<String> = values.iter().map(|v| format_number(*v)).collect();
                format!("{} in [{}]", field, listed.join(", "))
            })
            .collect();
        lines.extend(
            self.bounds
                .iter()
                .map(|(field, bound)| format!("{} < {}", field, format_number(*bound))),
        );
        lines
    }

    /// Combined row predicate, or `None` when nothing is active
    fn predicate(&self) -> Option<Expr> {
        let membership = self.allowed.iter().filter_map(|(field, values)| {
            let value = col(field.column()).cast(DataType::Float64);
            values
                .iter()
                .map(|v| value.clone().eq(lit(*v)))
                .reduce(|acc, e| acc.or(e))
        });
        let bounds = self.bounds.iter().map(|(field, bound)| {
            col(field.column())
                .cast(DataType::Float64)
                .lt(lit(*bound))
        });

        membership.chain(bounds).reduce(|acc, e| acc.and(e))
    }
}

/// Apply filter criteria to a valued table.
///
/// Derived columns (regional medians in particular) are not recomputed: they
/// keep describing the full dataset. An empty result is valid.
pub fn filter(table: &ValuedTable, criteria: &FilterCriteria) -> Result<ValuedTable> {
    let Some(predicate) = criteria.predicate() else {
        return Ok(table.clone());
    };

    let df = table.df().clone().lazy().filter(predicate).collect()?;
    Ok(ValuedTable::new(df))
}

/// Inclusive range of a size column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SizeRange {
    pub min: i64,
    pub max: i64,
}

/// Selectable values for each filter field, drawn from a valued table
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilterOptions {
    pub zipcodes: Vec<i64>,
    pub bedrooms: Vec<i64>,
    pub bathrooms: Vec<i64>,
    pub floors: Vec<i64>,
    pub grades: Vec<i64>,
    pub sqft_living: Option<SizeRange>,
    pub sqft_above: Option<SizeRange>,
}

impl FilterOptions {
    /// Options for a categorical field (empty for size fields)
    pub fn values(&self, field: FilterField) -> &[i64] {
        match field {
            FilterField::Zipcode => &self.zipcodes,
            FilterField::Bedrooms => &self.bedrooms,
            FilterField::Bathrooms => &self.bathrooms,
            FilterField::Floors => &self.floors,
            FilterField::Grade => &self.grades,
            FilterField::SqftLiving | FilterField::SqftAbove => &[],
        }
    }

    /// Values to offer for a categorical field, each flagged when `current` selects it.
    ///
    /// Selected values missing from the option list (a bathroom count of 2.5
    /// next to the truncated option 2, say) are added so they stay selected.
    pub fn choices(&self, field: FilterField, current: &FilterCriteria) -> Vec<(f64, bool)> {
        let selected = current.allowed(field).unwrap_or(&[]);
        let mut values: Vec<f64> = self.values(field).iter().map(|v| *v as f64).collect();
        for value in selected {
            if !values.contains(value) {
                values.push(*value);
            }
        }
        values.sort_by(|a, b| a.total_cmp(b));

        values
            .into_iter()
            .map(|v| (v, selected.contains(&v)))
            .collect()
    }

    pub fn range(&self, field: FilterField) -> Option<SizeRange> {
        match field {
            FilterField::SqftLiving => self.sqft_living,
            FilterField::SqftAbove => self.sqft_above,
            _ => None,
        }
    }
}

/// Collect the option lists offered to the user.
///
/// Categorical options are distinct values truncated to integers, sorted.
/// Membership is still tested against the stored value, so a selected
/// bathroom count of 2 matches 2.0 but not 2.25.
pub fn filter_options(table: &ValuedTable) -> Result<FilterOptions> {
    let df = table.df();
    Ok(FilterOptions {
        zipcodes: distinct_truncated(df, columns::ZIPCODE)?,
        bedrooms: distinct_truncated(df, columns::BEDROOMS)?,
        bathrooms: distinct_truncated(df, columns::BATHROOMS)?,
        floors: distinct_truncated(df, columns::FLOORS)?,
        grades: distinct_truncated(df, columns::GRADE)?,
        sqft_living: size_range(df, columns::SQFT_LIVING)?,
        sqft_above: size_range(df, columns::SQFT_ABOVE)?,
    })
}

fn distinct_truncated(df: &DataFrame, name: &str) -> Result<Vec<i64>> {
    let values = df.column(name)?.cast(&DataType::Float64)?;
    let distinct: BTreeSet<i64> = values
        .f64()?
        .into_iter()
        .flatten()
        .map(|v| v.trunc() as i64)
        .collect();
    Ok(distinct.into_iter().collect())
}

fn size_range(df: &DataFrame, name: &str) -> Result<Option<SizeRange>> {
    let values = df.column(name)?.cast(&DataType::Int64)?;
    let ca = values.i64()?;
    Ok(match (ca.min(), ca.max()) {
        (Some(min), Some(max)) => Some(SizeRange { min, max }),
        _ => None,
    })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

pub(crate) fn format_number(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{}", v as i64)
    } else {
        format!("{}", v)
    }
}
