//! Record cleaning: id deduplication and bedroom outlier correction

use polars::prelude::*;

use super::error::{DataError, Result};
use super::schema::{columns, CleanedTable, HouseTable};

/// Bedroom count treated as a data-entry error in the source dataset
pub const OUTLIER_BEDROOMS: f64 = 33.0;

/// What the cleaner changed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CleaningStats {
    pub rows_in: usize,
    pub duplicates_removed: usize,
    pub outliers_corrected: usize,
    /// Median bedrooms used for replacement (over deduplicated rows, outliers included)
    pub bedrooms_median: f64,
}

/// Clean a house table. See [`clean_with_stats`].
pub fn clean(table: &HouseTable) -> Result<CleanedTable> {
    clean_with_stats(table).map(|(cleaned, _)| cleaned)
}

/// Deduplicate by `id` and replace outlier bedroom counts with the median.
///
/// Rows are sorted by `id` descending (stable) and the first row per `id` is
/// kept, so among duplicate ids the earliest input row wins. The output keeps
/// that descending-id order. Rows with `bedrooms == 33` get the median of
/// `bedrooms` over the deduplicated table, computed once with the outliers
/// still in it. When that median is itself 33, the median of the remaining
/// rows is used instead.
///
/// # Errors
/// `DataError::EmptyInput` when the table has no rows (the median is undefined).
/// `DataError::UncorrectableOutliers` when every row has 33 bedrooms.
pub fn clean_with_stats(table: &HouseTable) -> Result<(CleanedTable, CleaningStats)> {
    let rows_in = table.height();
    if rows_in == 0 {
        return Err(DataError::EmptyInput {
            statistic: "bedrooms median",
        }
        .into());
    }

    let deduped = table
        .df()
        .clone()
        .lazy()
        .sort(
            [columns::ID],
            SortMultipleOptions::default()
                .with_order_descending(true)
                .with_maintain_order(true),
        )
        .unique_stable(Some(vec![columns::ID.into()]), UniqueKeepStrategy::First)
        .collect()?;

    let bedrooms = deduped.column(columns::BEDROOMS)?.f64()?;
    let outliers_corrected = bedrooms
        .into_iter()
        .filter(|v| *v == Some(OUTLIER_BEDROOMS))
        .count();
    let mut bedrooms_median = bedrooms.median().ok_or(DataError::EmptyInput {
        statistic: "bedrooms median",
    })?;
    if bedrooms_median == OUTLIER_BEDROOMS {
        // Outliers dominate; replace them with the median of the regular rows
        let regular = bedrooms.filter(&bedrooms.not_equal(OUTLIER_BEDROOMS))?;
        bedrooms_median = regular.median().ok_or(DataError::UncorrectableOutliers {
            rows: outliers_corrected,
        })?;
    }

    let cleaned = deduped
        .clone()
        .lazy()
        .with_column(
            when(col(columns::BEDROOMS).eq(lit(OUTLIER_BEDROOMS)))
                .then(lit(bedrooms_median))
                .otherwise(col(columns::BEDROOMS))
                .alias(columns::BEDROOMS),
        )
        .collect()?;

    let stats = CleaningStats {
        rows_in,
        duplicates_removed: rows_in - cleaned.height(),
        outliers_corrected,
        bedrooms_median,
    };

    Ok((CleanedTable::new(cleaned), stats))
}
