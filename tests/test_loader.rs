//! Unit tests for the dataset loader

use houserocket::pipeline::{
    get_column_names, load_houses, read_frame, DataError, HouseError, REQUIRED_COLUMNS,
};
use polars::prelude::*;
use std::io::Write;
use tempfile::TempDir;

#[path = "common/mod.rs"]
mod common;

use common::*;

const KC_HEADER: &str =
    "id,date,price,bedrooms,bathrooms,sqft_living,sqft_lot,floors,waterfront,view,condition,grade,sqft_above,sqft_basement,yr_built,yr_renovated,zipcode,lat,long,sqft_living15,sqft_lot15";

#[test]
fn test_load_kc_style_csv() {
    let temp_dir = TempDir::new().unwrap();
    let csv_path = temp_dir.path().join("kc_house_data.csv");

    let mut file = std::fs::File::create(&csv_path).unwrap();
    writeln!(file, "{}", KC_HEADER).unwrap();
    writeln!(
        file,
        "7129300520,20141013T000000,221900,3,1,1180,5650,1,0,0,3,7,1180,0,1955,0,98178,47.5112,-122.257,1340,5650"
    )
    .unwrap();
    writeln!(
        file,
        "6414100192,20141209T000000,538000,3,2.25,2570,7242,2,0,0,3,7,2170,400,1951,1991,98125,47.721,-122.319,1690,7639"
    )
    .unwrap();
    drop(file);

    let table = load_houses(&csv_path, 100).unwrap();
    let df = table.df();

    assert_eq!(table.height(), 2);
    assert_eq!(df.column("price").unwrap().dtype(), &DataType::Float64);
    assert_eq!(df.column("bedrooms").unwrap().dtype(), &DataType::Float64);
    assert_eq!(df.column("zipcode").unwrap().dtype(), &DataType::Int64);
    assert_eq!(str_column(df, "date"), vec!["2014-10-13", "2014-12-09"]);
    // Columns outside the required set are carried along
    assert_has_columns(df, &["yr_built", "sqft_lot15"]);
}

#[test]
fn test_load_parquet_file() {
    let mut df = create_house_dataframe(&create_market_rows());
    let (_dir, path) = create_temp_parquet(&mut df);

    let table = load_houses(&path, 100).unwrap();
    assert_eq!(table.height(), 10);
    assert_has_columns(table.df(), &REQUIRED_COLUMNS);
}

#[test]
fn test_csv_round_trip_of_fixture() {
    let mut df = create_house_dataframe(&create_market_rows());
    let (_dir, path) = create_temp_csv(&mut df);

    let table = load_houses(&path, 0).unwrap();
    assert_eq!(table.height(), 10);
    assert_eq!(i64_column(table.df(), "id"), i64_column(&df, "id"));
}

#[test]
fn test_missing_columns_reported() {
    let temp_dir = TempDir::new().unwrap();
    let csv_path = temp_dir.path().join("partial.csv");

    let mut file = std::fs::File::create(&csv_path).unwrap();
    writeln!(file, "id,date,price").unwrap();
    writeln!(file, "1,20141013T000000,100000").unwrap();
    drop(file);

    let err = load_houses(&csv_path, 100).unwrap_err();
    let house_err = err.downcast_ref::<HouseError>().unwrap();
    match house_err {
        HouseError::Data(DataError::MissingColumns(cols)) => {
            assert!(cols.contains(&"bedrooms".to_string()));
            assert!(cols.contains(&"lat".to_string()));
            assert!(!cols.contains(&"price".to_string()));
        }
        other => panic!("Unexpected error: {:?}", other),
    }
}

#[test]
fn test_unparseable_date_rejected() {
    let mut df = create_house_dataframe(&[HouseRow::new(1, 100_000.0).date("last tuesday")]);
    let (_dir, path) = create_temp_csv(&mut df);

    let err = load_houses(&path, 100).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<HouseError>(),
        Some(HouseError::Data(DataError::InvalidDate { .. }))
    ));
}

#[test]
fn test_unsupported_format() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("houses.xlsx");
    std::fs::write(&path, "not a table").unwrap();

    let err = read_frame(&path, 100).unwrap_err();
    assert!(err.to_string().contains("Unsupported file format"));
}

#[test]
fn test_get_column_names_csv() {
    let temp_dir = TempDir::new().unwrap();
    let csv_path = temp_dir.path().join("test.csv");

    let mut file = std::fs::File::create(&csv_path).unwrap();
    writeln!(file, "id,price,zipcode").unwrap();
    writeln!(file, "1,2,3").unwrap();
    drop(file);

    let names = get_column_names(&csv_path).unwrap();
    assert_eq!(names, vec!["id", "price", "zipcode"]);
}

#[test]
fn test_nonexistent_file() {
    let result = load_houses(std::path::Path::new("/nonexistent/kc_house_data.csv"), 100);
    assert!(result.is_err());
}
