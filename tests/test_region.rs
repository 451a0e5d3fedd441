//! Tests for region profit aggregation, the boundary join and opportunities

use houserocket::pipeline::{
    attach_region_profit, filter, region_profit, region_rows, FilterCriteria, FilterField,
};
use houserocket::report::{save_table, top_opportunities, PortfolioSummary};
use serde_json::json;

#[path = "common/mod.rs"]
mod common;

use common::*;

#[test]
fn test_region_profit_ranking() {
    let valued = valued_table(&create_market_rows());
    let rows = region_rows(&region_profit(&valued).unwrap()).unwrap();

    let zips: Vec<i64> = rows.iter().map(|r| r.zipcode).collect();
    assert_eq!(zips, vec![98039, 98004, 98103]);

    assert!((rows[0].avg_profit - 250_000.0).abs() < 1e-6);
    assert!((rows[1].avg_profit - 225_000.0).abs() < 1e-6);
    assert!((rows[2].avg_profit - 130_000.0).abs() < 1e-6);
    assert_eq!(
        rows.iter().map(|r| r.houses).collect::<Vec<_>>(),
        vec![1, 2, 2]
    );
}

#[test]
fn test_region_profit_follows_selection() {
    let valued = valued_table(&create_market_rows());
    let mut criteria = FilterCriteria::new();
    criteria.allow(FilterField::Zipcode, vec![98103.0]).unwrap();
    let selection = filter(&valued, &criteria).unwrap();

    let rows = region_rows(&region_profit(&selection).unwrap()).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].zipcode, 98103);
}

#[test]
fn test_region_profit_empty_without_recommendations() {
    // Grade 6 everywhere: nothing recommended
    let rows: Vec<HouseRow> = (1..=4)
        .map(|id| HouseRow::new(id, 400_000.0).grade(6))
        .collect();
    let regions = region_profit(&valued_table(&rows)).unwrap();
    assert_eq!(regions.height(), 0);
}

#[test]
fn test_boundary_join() {
    let valued = valued_table(&create_market_rows());
    let regions = region_profit(&valued).unwrap();
    let boundaries = json!({
        "type": "FeatureCollection",
        "features": [
            {"type": "Feature", "properties": {"ZIP": 98004}, "geometry": null},
            {"type": "Feature", "properties": {"ZIP": 98001}, "geometry": null},
            {"type": "Feature", "properties": {"ZIP": "98103"}, "geometry": null}
        ]
    });

    let joined = attach_region_profit(&boundaries, &regions).unwrap();
    let features = joined["features"].as_array().unwrap();

    assert_eq!(features.len(), 2);
    assert_eq!(features[0]["properties"]["PROFIT_LABEL"], "$225,000");
    assert_eq!(features[1]["properties"]["PROFIT_LABEL"], "$130,000");
    assert_eq!(joined["type"], "FeatureCollection");
}

#[test]
fn test_top_opportunities() {
    let valued = valued_table(&create_market_rows());
    let top = top_opportunities(&valued, 3).unwrap();

    let ids: Vec<i64> = top.iter().map(|o| o.id).collect();
    assert_eq!(ids, vec![103, 105, 101]);
    assert_eq!(top[0].zipcode, 98004);
    assert!((top[0].profit - 360_000.0).abs() < 1e-6);

    let all = top_opportunities(&valued, 100).unwrap();
    assert_eq!(all.len(), 5, "Only recommended houses are opportunities");
}

#[test]
fn test_portfolio_summary() {
    let valued = valued_table(&create_market_rows());
    let summary = PortfolioSummary::from_table(&valued).unwrap();

    assert_eq!(summary.houses_analyzed, 9);
    assert_eq!(summary.recommended, 5);
    assert!((summary.total_expected_profit - 960_000.0).abs() < 1e-6);
    assert!((summary.mean_expected_profit - 192_000.0).abs() < 1e-6);
    assert!(summary.headline().starts_with("A total of 9 homes were analyzed"));
}

#[test]
fn test_reports_on_empty_selection() {
    let valued = valued_table(&create_market_rows());
    let mut criteria = FilterCriteria::new();
    criteria.allow(FilterField::Zipcode, vec![12345.0]).unwrap();
    let empty = filter(&valued, &criteria).unwrap();
    assert!(empty.is_empty());

    let summary = PortfolioSummary::from_table(&empty).unwrap();
    assert_eq!(summary, PortfolioSummary::default());
    summary.display();

    assert_eq!(region_profit(&empty).unwrap().height(), 0);
    assert!(region_rows(&region_profit(&empty).unwrap()).unwrap().is_empty());
    assert!(top_opportunities(&empty, 10).unwrap().is_empty());

    let temp_dir = tempfile::TempDir::new().unwrap();
    let out = temp_dir.path().join("empty.parquet");
    let mut df = empty.df().clone();
    save_table(&mut df, &out).unwrap();
    assert!(out.exists());
}
