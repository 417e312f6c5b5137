//! Dataset profiling: null counts, unique values, numeric summaries, duplicates

use std::collections::{HashMap, HashSet};

use anyhow::{Context, Result};
use polars::prelude::*;
use serde::Serialize;

use super::column_values::{column_to_f64_vec, column_to_string_vec, is_categorical};

/// Distinct non-null values in one column
#[derive(Debug, Clone, Serialize)]
pub struct UniqueCount {
    pub column: String,
    pub unique: usize,
    /// `unique / rows`
    pub ratio: f64,
}

/// Describe-style statistics for one numeric column
#[derive(Debug, Clone, Serialize)]
pub struct NumericSummary {
    pub column: String,
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation (n - 1)
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}

/// Shape, missing values and outcome counts of the table as loaded
#[derive(Debug, Clone, Serialize)]
pub struct DatasetProfile {
    pub rows: usize,
    pub columns: usize,
    pub null_counts: Vec<(String, usize)>,
    pub outcome_counts: Vec<(String, usize)>,
}

/// Value statistics of a table; the pipeline builds this from the cleaned table
#[derive(Debug, Clone, Serialize)]
pub struct ValueProfile {
    pub rows: usize,
    pub columns: usize,
    pub unique_counts: Vec<UniqueCount>,
    pub numeric_summary: Vec<NumericSummary>,
    pub duplicate_rows: usize,
    pub categorical_levels: Vec<(String, usize)>,
}

/// Profile the raw table: shape, null counts and outcome counts
pub fn profile_dataset(df: &DataFrame, outcome_column: &str) -> Result<DatasetProfile> {
    let (rows, columns) = df.shape();
    Ok(DatasetProfile {
        rows,
        columns,
        null_counts: null_counts(df),
        outcome_counts: value_counts(df, outcome_column)?,
    })
}

/// Unique counts, numeric summaries, duplicates and text levels of a table
pub fn profile_values(df: &DataFrame) -> Result<ValueProfile> {
    let (rows, columns) = df.shape();
    Ok(ValueProfile {
        rows,
        columns,
        unique_counts: unique_counts(df)?,
        numeric_summary: describe(df)?,
        duplicate_rows: count_duplicate_rows(df)?,
        categorical_levels: categorical_levels(df)?,
    })
}

/// Null count per column, sorted descending (ties keep column order)
pub fn null_counts(df: &DataFrame) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = df
        .get_columns()
        .iter()
        .map(|c| (c.name().to_string(), c.null_count()))
        .collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

/// Occurrences of each non-null value, most frequent first
pub fn value_counts(df: &DataFrame, column: &str) -> Result<Vec<(String, usize)>> {
    let col = df
        .column(column)
        .with_context(|| format!("Column '{}' not found", column))?;

    let mut counts: HashMap<String, usize> = HashMap::new();
    for value in column_to_string_vec(col)?.into_iter().flatten() {
        *counts.entry(value).or_insert(0) += 1;
    }

    let mut sorted: Vec<(String, usize)> = counts.into_iter().collect();
    sorted.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    Ok(sorted)
}

/// Distinct non-null values per column with their share of the row count
pub fn unique_counts(df: &DataFrame) -> Result<Vec<UniqueCount>> {
    let rows = df.height();
    df.get_columns()
        .iter()
        .map(|col| {
            let distinct: HashSet<String> = column_to_string_vec(col)?.into_iter().flatten().collect();
            let unique = distinct.len();
            Ok(UniqueCount {
                column: col.name().to_string(),
                unique,
                ratio: if rows == 0 { 0.0 } else { unique as f64 / rows as f64 },
            })
        })
        .collect()
}

/// Summary statistics for every numeric column with at least one value
pub fn describe(df: &DataFrame) -> Result<Vec<NumericSummary>> {
    let mut summaries = Vec::new();
    for col in df.get_columns() {
        if is_categorical(col) {
            continue;
        }
        let mut values: Vec<f64> = column_to_f64_vec(col)?
            .into_iter()
            .flatten()
            .filter(|v| !v.is_nan())
            .collect();
        if values.is_empty() {
            continue;
        }
        values.sort_by(|a, b| a.total_cmp(b));

        let count = values.len();
        let mean = values.iter().sum::<f64>() / count as f64;
        let std = if count > 1 {
            let ss: f64 = values.iter().map(|v| (v - mean) * (v - mean)).sum();
            (ss / (count - 1) as f64).sqrt()
        } else {
            f64::NAN
        };

        summaries.push(NumericSummary {
            column: col.name().to_string(),
            count,
            mean,
            std,
            min: values[0],
            q25: quantile_sorted(&values, 0.25),
            median: quantile_sorted(&values, 0.5),
            q75: quantile_sorted(&values, 0.75),
            max: values[count - 1],
        });
    }
    Ok(summaries)
}

/// Linear-interpolation quantile of an ascending, non-empty slice
fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let weight = pos - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * weight
}

/// Rows identical to an earlier row across every column
pub fn count_duplicate_rows(df: &DataFrame) -> Result<usize> {
    let columns: Vec<Vec<Option<String>>> = df
        .get_columns()
        .iter()
        .map(column_to_string_vec)
        .collect::<Result<_>>()?;

    let mut seen: HashSet<Vec<Option<&str>>> = HashSet::with_capacity(df.height());
    let mut duplicates = 0;
    for row in 0..df.height() {
        let key: Vec<Option<&str>> = columns.iter().map(|c| c[row].as_deref()).collect();
        if !seen.insert(key) {
            duplicates += 1;
        }
    }
    Ok(duplicates)
}

/// Text columns and their number of levels, most levels first
pub fn categorical_levels(df: &DataFrame) -> Result<Vec<(String, usize)>> {
    let mut levels: Vec<(String, usize)> = Vec::new();
    for col in df.get_columns() {
        if col.dtype() != &DataType::String {
            continue;
        }
        let distinct: HashSet<String> = column_to_string_vec(col)?.into_iter().flatten().collect();
        levels.push((col.name().to_string(), distinct.len()));
    }
    levels.sort_by(|a, b| b.1.cmp(&a.1));
    Ok(levels)
}
