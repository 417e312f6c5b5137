//! Shared test utilities and fixture generators

#![allow(dead_code)]

use polars::prelude::*;
use std::path::PathBuf;
use tempfile::TempDir;

const PROVINCES: [&str; 3] = ["Seoul", "Busan", "Daegu"];
const CITIES: [&str; 4] = ["Gangnam-gu", "Jung-gu", "Nam-gu", "etc"];
const CASES: [&str; 3] = ["overseas inflow", "contact with patient", "Shincheonji Church"];

/// Birth year used to build row `i`, before any value is blanked out
pub fn true_birth_year(i: usize) -> f64 {
    (1930 + (i * 7) % 70) as f64
}

/// Outcome of row `i`: older patients are deceased, every third of the
/// rest isolated, the others released
pub fn expected_state(i: usize) -> &'static str {
    if true_birth_year(i) < 1950.0 {
        "deceased"
    } else if i % 3 == 0 {
        "isolated"
    } else {
        "released"
    }
}

/// Patient records with the full column layout and scattered missing values.
///
/// - `patient_id`: unique, never null
/// - `birth_year`: null every 6th row (i % 6 == 5)
/// - `disease`: `true` for some deceased rows, null otherwise
/// - `state`: one of released / isolated / deceased, see [`expected_state`]
pub fn create_patient_dataframe(rows: usize) -> DataFrame {
    let idx: Vec<usize> = (0..rows).collect();

    let patient_id: Vec<i64> = idx.iter().map(|&i| 1_000_000_000 + i as i64).collect();
    let global_num: Vec<Option<f64>> = idx
        .iter()
        .map(|&i| if i % 7 == 3 { None } else { Some(i as f64 * 3.0) })
        .collect();
    let sex: Vec<Option<&str>> = idx
        .iter()
        .map(|&i| match i % 5 {
            4 => None,
            n if n % 2 == 0 => Some("male"),
            _ => Some("female"),
        })
        .collect();
    let birth_year: Vec<Option<f64>> = idx
        .iter()
        .map(|&i| if i % 6 == 5 { None } else { Some(true_birth_year(i)) })
        .collect();
    let age: Vec<Option<String>> = idx
        .iter()
        .map(|&i| {
            if i % 9 == 8 {
                None
            } else {
                let decade = ((2020.0 - true_birth_year(i)) / 10.0).floor() as i64 * 10;
                Some(format!("{}s", decade))
            }
        })
        .collect();
    let country: Vec<&str> = idx.iter().map(|&i| if i % 10 == 9 { "China" } else { "Korea" }).collect();
    let province: Vec<&str> = idx.iter().map(|&i| PROVINCES[i % 3]).collect();
    let city: Vec<&str> = idx.iter().map(|&i| CITIES[i % 4]).collect();
    let infection_case: Vec<Option<&str>> = idx
        .iter()
        .map(|&i| if i % 4 == 0 { None } else { Some(CASES[i % 3]) })
        .collect();
    let infection_order: Vec<Option<f64>> = idx
        .iter()
        .map(|&i| if i % 3 == 0 { Some(1.0 + (i % 4) as f64) } else { None })
        .collect();
    let infected_by: Vec<Option<f64>> = idx
        .iter()
        .map(|&i| if i % 2 == 0 { Some(1_000_000_000.0 + i as f64) } else { None })
        .collect();
    let contact_number: Vec<Option<f64>> = idx
        .iter()
        .map(|&i| if i % 4 == 1 { None } else { Some(((i * 13) % 50) as f64) })
        .collect();
    let symptom_onset_date: Vec<Option<&str>> = idx
        .iter()
        .map(|&i| if i % 2 == 0 { Some("2020-02-18") } else { None })
        .collect();
    let confirmed_date: Vec<&str> = idx.iter().map(|_| "2020-03-01").collect();
    let released_date: Vec<Option<&str>> = idx
        .iter()
        .map(|&i| if expected_state(i) == "released" { Some("2020-03-20") } else { None })
        .collect();
    let deceased_date: Vec<Option<&str>> = idx
        .iter()
        .map(|&i| if expected_state(i) == "deceased" { Some("2020-03-15") } else { None })
        .collect();
    let disease: Vec<Option<bool>> = idx
        .iter()
        .map(|&i| if expected_state(i) == "deceased" && i % 2 == 0 { Some(true) } else { None })
        .collect();
    let state: Vec<&str> = idx.iter().map(|&i| expected_state(i)).collect();

    DataFrame::new(vec![
        Column::new("patient_id".into(), patient_id),
        Column::new("global_num".into(), global_num),
        Column::new("sex".into(), sex),
        Column::new("birth_year".into(), birth_year),
        Column::new("age".into(), age),
        Column::new("country".into(), country),
        Column::new("province".into(), province),
        Column::new("city".into(), city),
        Column::new("infection_case".into(), infection_case),
        Column::new("infection_order".into(), infection_order),
        Column::new("infected_by".into(), infected_by),
        Column::new("contact_number".into(), contact_number),
        Column::new("symptom_onset_date".into(), symptom_onset_date),
        Column::new("confirmed_date".into(), confirmed_date),
        Column::new("released_date".into(), released_date),
        Column::new("deceased_date".into(), deceased_date),
        Column::new("disease".into(), disease),
        Column::new("state".into(), state),
    ])
    .unwrap()
}

/// Patient records where rows 0 and 1 carry outcomes outside the mapping
pub fn create_patient_dataframe_with_unmapped(rows: usize) -> DataFrame {
    let mut df = create_patient_dataframe(rows);
    let state: Vec<Option<&str>> = (0..rows)
        .map(|i| match i {
            0 => Some("unknown"),
            1 => None,
            _ => Some(expected_state(i)),
        })
        .collect();
    df.with_column(Column::new("state".into(), state)).unwrap();
    df
}

/// Create a temporary directory with a test CSV file
pub fn create_temp_csv(df: &mut DataFrame) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let csv_path = temp_dir.path().join("patients.csv");

    let mut file = std::fs::File::create(&csv_path).unwrap();
    CsvWriter::new(&mut file).finish(df).unwrap();

    (temp_dir, csv_path)
}

/// Create a temporary directory with a test Parquet file
pub fn create_temp_parquet(df: &mut DataFrame) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let parquet_path = temp_dir.path().join("patients.parquet");

    let file = std::fs::File::create(&parquet_path).unwrap();
    ParquetWriter::new(file).finish(df).unwrap();

    (temp_dir, parquet_path)
}

/// Assert that a DataFrame contains specific columns
pub fn assert_has_columns(df: &DataFrame, expected_cols: &[&str]) {
    let actual_cols: Vec<String> = df.get_column_names().iter().map(|s| s.to_string()).collect();
    for col in expected_cols {
        assert!(
            actual_cols.contains(&col.to_string()),
            "Missing expected column: '{}'. Actual columns: {:?}",
            col,
            actual_cols
        );
    }
}

/// Assert that a DataFrame does NOT contain specific columns
pub fn assert_missing_columns(df: &DataFrame, unexpected_cols: &[&str]) {
    let actual_cols: Vec<String> = df.get_column_names().iter().map(|s| s.to_string()).collect();
    for col in unexpected_cols {
        assert!(
            !actual_cols.contains(&col.to_string()),
            "Unexpected column still present: '{}'",
            col
        );
    }
}

/// Column values as f64 (nulls become NaN)
pub fn f64_values(df: &DataFrame, name: &str) -> Vec<f64> {
    df.column(name)
        .unwrap()
        .cast(&DataType::Float64)
        .unwrap()
        .f64()
        .unwrap()
        .into_iter()
        .map(|v| v.unwrap_or(f64::NAN))
        .collect()
}
