//! Shared test utilities and fixture generators
#![allow(dead_code)]

use houserocket::pipeline::{clean, value, HouseTable, ValuedTable};
use polars::prelude::*;
use std::path::PathBuf;
use tempfile::TempDir;

/// One house sale for building fixture tables.
///
/// `HouseRow::new` gives a small, well-built house (1500 sqft, 2 bed, 2 bath,
/// 1 floor, grade 7) that the default rules recommend.
#[derive(Debug, Clone)]
pub struct HouseRow {
    pub id: i64,
    pub date: &'static str,
    pub price: f64,
    pub bedrooms: f64,
    pub bathrooms: f64,
    pub sqft_living: i64,
    pub sqft_above: i64,
    pub floors: f64,
    pub grade: i64,
    pub zipcode: i64,
}

impl HouseRow {
    pub fn new(id: i64, price: f64) -> Self {
        Self {
            id,
            date: "20141013T000000",
            price,
            bedrooms: 2.0,
            bathrooms: 2.0,
            sqft_living: 1500,
            sqft_above: 1500,
            floors: 1.0,
            grade: 7,
            zipcode: 98103,
        }
    }

    pub fn sqft(mut self, living: i64, above: i64) -> Self {
        self.sqft_living = living;
        self.sqft_above = above;
        self
    }

    pub fn rooms(mut self, bedrooms: f64, bathrooms: f64) -> Self {
        self.bedrooms = bedrooms;
        self.bathrooms = bathrooms;
        self
    }

    pub fn floors(mut self, floors: f64) -> Self {
        self.floors = floors;
        self
    }

    pub fn grade(mut self, grade: i64) -> Self {
        self.grade = grade;
        self
    }

    pub fn zipcode(mut self, zipcode: i64) -> Self {
        self.zipcode = zipcode;
        self
    }

    pub fn date(mut self, date: &'static str) -> Self {
        self.date = date;
        self
    }
}

/// Build a raw house-sale DataFrame with every required column
pub fn create_house_dataframe(rows: &[HouseRow]) -> DataFrame {
    df! {
        "id" => rows.iter().map(|r| r.id).collect::<Vec<_>>(),
        "date" => rows.iter().map(|r| r.date).collect::<Vec<_>>(),
        "price" => rows.iter().map(|r| r.price).collect::<Vec<_>>(),
        "bedrooms" => rows.iter().map(|r| r.bedrooms).collect::<Vec<_>>(),
        "bathrooms" => rows.iter().map(|r| r.bathrooms).collect::<Vec<_>>(),
        "sqft_living" => rows.iter().map(|r| r.sqft_living).collect::<Vec<_>>(),
        "sqft_above" => rows.iter().map(|r| r.sqft_above).collect::<Vec<_>>(),
        "floors" => rows.iter().map(|r| r.floors).collect::<Vec<_>>(),
        "grade" => rows.iter().map(|r| r.grade).collect::<Vec<_>>(),
        "zipcode" => rows.iter().map(|r| r.zipcode).collect::<Vec<_>>(),
        "lat" => rows.iter().map(|r| 47.5 + r.id as f64 * 1e-4).collect::<Vec<_>>(),
        "long" => rows.iter().map(|r| -122.2 - r.id as f64 * 1e-4).collect::<Vec<_>>(),
    }
    .unwrap()
}

pub fn house_table(rows: &[HouseRow]) -> HouseTable {
    HouseTable::from_frame(create_house_dataframe(rows)).unwrap()
}

pub fn valued_table(rows: &[HouseRow]) -> ValuedTable {
    value(&clean(&house_table(rows)).unwrap()).unwrap()
}

/// A small market across three zipcodes.
///
/// - 98103: small houses, two recommended (ids 100, 101), one with a medium
///   bedroom tier (102), one grade 6 (107), and a 33-bedroom entry (108)
/// - 98004: two recommended medium houses (103, 104) and one three-floor house (106)
/// - 98039: one recommended large house (105)
/// - id 101 appears twice; the first occurrence (price 700k) is kept
pub fn create_market_rows() -> Vec<HouseRow> {
    vec![
        HouseRow::new(100, 500_000.0).grade(8),
        HouseRow::new(101, 700_000.0).grade(8),
        HouseRow::new(102, 300_000.0).sqft(1200, 1200).rooms(3.0, 2.0),
        HouseRow::new(103, 1_200_000.0)
            .sqft(3000, 2500)
            .rooms(4.0, 3.0)
            .floors(2.0)
            .grade(9)
            .zipcode(98004),
        HouseRow::new(104, 900_000.0)
            .sqft(3500, 3000)
            .rooms(4.0, 3.5)
            .floors(2.0)
            .grade(10)
            .zipcode(98004),
        HouseRow::new(105, 2_500_000.0)
            .sqft(5500, 4800)
            .rooms(6.0, 6.0)
            .floors(2.0)
            .grade(12)
            .zipcode(98039),
        HouseRow::new(106, 800_000.0)
            .sqft(2500, 2500)
            .rooms(3.0, 2.5)
            .floors(3.0)
            .grade(8)
            .zipcode(98004),
        HouseRow::new(107, 450_000.0).sqft(1800, 1000).rooms(2.0, 1.0).grade(6),
        HouseRow::new(101, 650_000.0).grade(8).date("2015-03-01"),
        HouseRow::new(108, 640_000.0).sqft(1600, 1600).rooms(33.0, 1.75),
    ]
}

pub fn f64_column(df: &DataFrame, name: &str) -> Vec<f64> {
    df.column(name)
        .unwrap()
        .cast(&DataType::Float64)
        .unwrap()
        .f64()
        .unwrap()
        .into_no_null_iter()
        .collect()
}

pub fn i64_column(df: &DataFrame, name: &str) -> Vec<i64> {
    df.column(name)
        .unwrap()
        .cast(&DataType::Int64)
        .unwrap()
        .i64()
        .unwrap()
        .into_no_null_iter()
        .collect()
}

pub fn str_column(df: &DataFrame, name: &str) -> Vec<String> {
    df.column(name)
        .unwrap()
        .str()
        .unwrap()
        .into_no_null_iter()
        .map(|s| s.to_string())
        .collect()
}

/// Create a temporary directory with a test CSV file
pub fn create_temp_csv(df: &mut DataFrame) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let csv_path = temp_dir.path().join("kc_house_data.csv");

    let mut file = std::fs::File::create(&csv_path).unwrap();
    CsvWriter::new(&mut file).finish(df).unwrap();

    (temp_dir, csv_path)
}

/// Create a temporary directory with a test Parquet file
pub fn create_temp_parquet(df: &mut DataFrame) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let parquet_path = temp_dir.path().join("kc_house_data.parquet");

    let file = std::fs::File::create(&parquet_path).unwrap();
    ParquetWriter::new(file).finish(df).unwrap();

    (temp_dir, parquet_path)
}

/// Assert that a DataFrame contains specific columns
pub fn assert_has_columns(df: &DataFrame, expected_cols: &[&str]) {
    let actual_cols: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect();
    for col in expected_cols {
        assert!(
            actual_cols.contains(&col.to_string()),
            "Missing expected column: '{}'. Actual columns: {:?}",
            col,
            actual_cols
        );
    }
}
