//! Record cleaning: derived age, per-column fill policy, dropped date columns
//!
//! Cleaning never mutates its input. Each step takes a table by reference and
//! returns a new one, so the raw table stays available for profiling.

use anyhow::{Context, Result};
use polars::prelude::*;
use serde::Serialize;

use super::column_values::{column_to_f64_vec, column_to_string_vec};
use super::schema::ColumnSchema;

/// How missing values in one column are replaced
#[derive(Debug, Clone, PartialEq)]
pub enum FillStrategy {
    /// Replace with the mean of the non-missing values
    Mean,
    /// Replace with zero (`"0"` for text, `false` for boolean columns)
    Zero,
    /// Presence flag: missing, zero, false or empty becomes 0, anything else 1
    Indicator,
}

impl FillStrategy {
    fn label(&self) -> &'static str {
        match self {
            FillStrategy::Mean => "mean",
            FillStrategy::Zero => "zero",
            FillStrategy::Indicator => "indicator",
        }
    }
}

/// Rows over which fill means are computed
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ImputeScope {
    /// Every row of the table, including rows later held out for evaluation
    #[default]
    FullTable,
    /// Only the given row indices (the training partition)
    Rows(Vec<usize>),
}

impl ImputeScope {
    pub fn describe(&self) -> &'static str {
        match self {
            ImputeScope::FullTable => "full table",
            ImputeScope::Rows(_) => "training rows",
        }
    }
}

/// Ordered per-column fill strategies plus a catch-all for any remaining nulls
#[derive(Debug, Clone, Default)]
pub struct FillPolicy {
    pub columns: Vec<(String, FillStrategy)>,
    pub fallback: Option<FillStrategy>,
    pub mean_scope: ImputeScope,
}

impl FillPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_column(mut self, name: impl Into<String>, strategy: FillStrategy) -> Self {
        self.columns.push((name.into(), strategy));
        self
    }

    pub fn with_fallback(mut self, strategy: FillStrategy) -> Self {
        self.fallback = Some(strategy);
        self
    }

    pub fn with_mean_scope(mut self, scope: ImputeScope) -> Self {
        self.mean_scope = scope;
        self
    }

    /// The policy used for the patient dataset: indicator flag, column means,
    /// then zero for everything else.
    pub fn for_schema(schema: &ColumnSchema, scope: ImputeScope) -> Self {
        let mut policy = FillPolicy::new()
            .with_column(schema.flag_column.clone(), FillStrategy::Indicator)
            .with_mean_scope(scope);
        for column in &schema.mean_fill_columns {
            policy = policy.with_column(column.clone(), FillStrategy::Mean);
        }
        policy.with_fallback(FillStrategy::Zero)
    }
}

/// What was filled in one column
#[derive(Debug, Clone, Serialize)]
pub struct FillRecord {
    pub column: String,
    pub strategy: String,
    /// Replacement value, `None` when the column had no values to average
    pub fill_value: Option<String>,
    pub filled: usize,
}

/// Summary of one cleaning run
#[derive(Debug, Clone, Serialize)]
pub struct CleaningReport {
    pub reference_year: i32,
    pub age_column: String,
    pub age_missing: usize,
    pub impute_scope: String,
    pub fills: Vec<FillRecord>,
    pub dropped_columns: Vec<String>,
}

/// Options for [`clean_records`]
#[derive(Debug, Clone)]
pub struct CleaningOptions {
    pub reference_year: i32,
    pub impute_scope: ImputeScope,
}

/// Add `age_column = reference_year - birth_year`.
///
/// Rows without a birth year get a null age.
pub fn derive_age(
    df: &DataFrame,
    birth_year_column: &str,
    age_column: &str,
    reference_year: i32,
) -> Result<DataFrame> {
    let birth = df
        .column(birth_year_column)
        .with_context(|| format!("Birth year column '{}' not found", birth_year_column))?;
    let ages: Vec<Option<f64>> = column_to_f64_vec(birth)?
        .into_iter()
        .map(|year| year.filter(|y| !y.is_nan()).map(|y| reference_year as f64 - y))
        .collect();

    let mut out = df.clone();
    out.with_column(Column::new(age_column.into(), ages))?;
    Ok(out)
}

/// Apply a fill policy, returning a new table and a record per filled column.
///
/// Explicit strategies run first, in policy order. The fallback then fills
/// every column that still has nulls.
pub fn apply_fill_policy(df: &DataFrame, policy: &FillPolicy) -> Result<(DataFrame, Vec<FillRecord>)> {
    let mut out = df.clone();
    let mut records = Vec::new();

    for (name, strategy) in &policy.columns {
        let column = out
            .column(name)
            .with_context(|| format!("Fill policy column '{}' not found", name))?;
        let (filled, record) = fill_column(column, strategy, &policy.mean_scope)
            .with_context(|| format!("Failed to fill column '{}'", name))?;
        out.with_column(filled)?;
        records.push(record);
    }

    if let Some(fallback) = &policy.fallback {
        let remaining: Vec<String> = out
            .get_columns()
            .iter()
            .filter(|c| c.null_count() > 0)
            .map(|c| c.name().to_string())
            .collect();

        for name in remaining {
            let column = out.column(&name)?;
            let (filled, record) = fill_column(column, fallback, &policy.mean_scope)
                .with_context(|| format!("Failed to fill column '{}'", name))?;
            out.with_column(filled)?;
            records.push(record);
        }
    }

    Ok((out, records))
}

/// Run the full cleaning stage for the patient schema
pub fn clean_records(
    df: &DataFrame,
    schema: &ColumnSchema,
    options: &CleaningOptions,
) -> Result<(DataFrame, CleaningReport)> {
    let with_age = derive_age(
        df,
        &schema.birth_year_column,
        &schema.age_column,
        options.reference_year,
    )?;
    let age_missing = with_age.column(&schema.age_column)?.null_count();

    let policy = FillPolicy::for_schema(schema, options.impute_scope.clone());
    let (filled, fills) = apply_fill_policy(&with_age, &policy)?;

    let present: Vec<String> = filled
        .get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect();
    let dropped_columns: Vec<String> = schema
        .date_columns
        .iter()
        .filter(|name| present.contains(name))
        .cloned()
        .collect();
    let cleaned = filled.drop_many(dropped_columns.iter().map(|s| s.as_str()));

    let report = CleaningReport {
        reference_year: options.reference_year,
        age_column: schema.age_column.clone(),
        age_missing,
        impute_scope: options.impute_scope.describe().to_string(),
        fills,
        dropped_columns,
    };

    Ok((cleaned, report))
}

fn fill_column(column: &Column, strategy: &FillStrategy, scope: &ImputeScope) -> Result<(Column, FillRecord)> {
    let name = column.name().clone();
    let null_count = column.null_count();

    let (filled, fill_value) = match strategy {
        FillStrategy::Indicator => (indicator_column(column)?, Some("present=1, absent=0".to_string())),
        FillStrategy::Mean => {
            let values = column_to_f64_vec(column)?;
            match scoped_mean(&values, scope) {
                Some(mean) => {
                    let filled: Vec<f64> = values.iter().map(|v| v.unwrap_or(mean)).collect();
                    (Column::new(name.clone(), filled), Some(format!("{:.4}", mean)))
                }
                None => (Column::new(name.clone(), values), None),
            }
        }
        FillStrategy::Zero => (zero_column(column)?, Some("0".to_string())),
    };

    let filled_count = match strategy {
        FillStrategy::Mean if fill_value.is_none() => 0,
        _ => null_count,
    };

    let record = FillRecord {
        column: name.to_string(),
        strategy: strategy.label().to_string(),
        fill_value,
        filled: filled_count,
    };
    Ok((filled, record))
}

/// Mean of the non-null values, restricted to the scope's rows
fn scoped_mean(values: &[Option<f64>], scope: &ImputeScope) -> Option<f64> {
    let (sum, count) = match scope {
        ImputeScope::FullTable => values
            .iter()
            .flatten()
            .filter(|v| !v.is_nan())
            .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1)),
        ImputeScope::Rows(rows) => rows
            .iter()
            .filter_map(|&i| values.get(i).copied().flatten())
            .filter(|v| !v.is_nan())
            .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1)),
    };
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

fn indicator_column(column: &Column) -> Result<Column> {
    let flags: Vec<i32> = match column.dtype() {
        DataType::Boolean => column
            .bool()?
            .into_iter()
            .map(|v| i32::from(v.unwrap_or(false)))
            .collect(),
        dtype if dtype.is_primitive_numeric() => column_to_f64_vec(column)?
            .into_iter()
            .map(|v| match v {
                Some(x) if x != 0.0 && !x.is_nan() => 1,
                _ => 0,
            })
            .collect(),
        _ => column_to_string_vec(column)?
            .into_iter()
            .map(|v| match v {
                Some(s) if !is_absent_text(&s) => 1,
                _ => 0,
            })
            .collect(),
    };
    Ok(Column::new(column.name().clone(), flags))
}

fn is_absent_text(s: &str) -> bool {
    let trimmed = s.trim();
    trimmed.is_empty()
        || trimmed.eq_ignore_ascii_case("false")
        || trimmed.parse::<f64>().map(|v| v == 0.0).unwrap_or(false)
}

fn zero_column(column: &Column) -> Result<Column> {
    let name = column.name().clone();
    let filled = match column.dtype() {
        DataType::Boolean => {
            let values: Vec<bool> = column
                .bool()?
                .into_iter()
                .map(|v| v.unwrap_or(false))
                .collect();
            Column::new(name, values)
        }
        dtype if dtype.is_primitive_numeric() => {
            let values: Vec<f64> = column_to_f64_vec(column)?
                .into_iter()
                .map(|v| v.unwrap_or(0.0))
                .collect();
            Column::new(name, values)
        }
        _ => {
            let values: Vec<String> = column_to_string_vec(column)?
                .into_iter()
                .map(|v| v.unwrap_or_else(|| "0".to_string()))
                .collect();
            Column::new(name, values)
        }
    };
    Ok(filled)
}
