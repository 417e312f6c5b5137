//! Feature encoding: one-hot indicator columns and the ordinal outcome code

use std::collections::{BTreeMap, BTreeSet};

use anyhow::{Context, Result};
use polars::prelude::*;
use serde::Serialize;
use thiserror::Error;

use super::column_values::{column_to_f64_vec, column_to_string_vec, is_categorical};

/// Placeholder used when reporting a null outcome value
const NULL_LABEL: &str = "<null>";

/// Errors raised while building the feature matrix or the outcome codes
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("column '{column}' still has {count} missing value(s) after cleaning")]
    MissingValues { column: String, count: usize },

    #[error(
        "outcome column '{column}' has {} row(s) outside the mapping: {}",
        total_count(.values),
        summarize_counts(.values)
    )]
    UnmappedOutcome {
        column: String,
        values: BTreeMap<String, usize>,
    },

    #[error("outcome mapping needs at least one label")]
    EmptyMapping,

    #[error("outcome label '{0}' appears more than once in the mapping")]
    DuplicateLabel(String),
}

fn total_count(values: &BTreeMap<String, usize>) -> usize {
    values.values().sum()
}

fn summarize_counts(values: &BTreeMap<String, usize>) -> String {
    values
        .iter()
        .map(|(value, count)| format!("'{}' ({})", value, count))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Numeric, row-major feature matrix with ordered column names
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    pub names: Vec<String>,
    pub rows: Vec<Vec<f64>>,
}

impl FeatureMatrix {
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn n_features(&self) -> usize {
        self.names.len()
    }

    /// Keep only the given rows, in the given order
    pub fn select_rows(&self, indices: &[usize]) -> FeatureMatrix {
        FeatureMatrix {
            names: self.names.clone(),
            rows: indices.iter().map(|&i| self.rows[i].clone()).collect(),
        }
    }

    /// Index of a named feature column
    pub fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }
}

/// Expand the selected columns into a numeric feature matrix.
///
/// Numeric columns pass through in the order given. Each categorical column
/// then contributes one `{column}_{value}` indicator per observed value,
/// values sorted. Nulls are an error: cleaning must run first.
pub fn one_hot_encode(df: &DataFrame, columns: &[String]) -> Result<FeatureMatrix> {
    let n_rows = df.height();
    let mut numeric: Vec<(String, Vec<f64>)> = Vec::new();
    let mut categorical: Vec<(String, Vec<String>)> = Vec::new();

    for name in columns {
        let column = df
            .column(name)
            .with_context(|| format!("Feature column '{}' not found", name))?;

        let nulls = column.null_count();
        if nulls > 0 {
            return Err(EncodeError::MissingValues {
                column: name.clone(),
                count: nulls,
            }
            .into());
        }

        if is_categorical(column) {
            let values: Vec<String> = column_to_string_vec(column)?
                .into_iter()
                .map(|v| v.unwrap_or_default())
                .collect();
            categorical.push((name.clone(), values));
        } else {
            let values: Vec<f64> = column_to_f64_vec(column)?
                .into_iter()
                .map(|v| v.unwrap_or(f64::NAN))
                .collect();
            numeric.push((name.clone(), values));
        }
    }

    let mut names: Vec<String> = numeric.iter().map(|(name, _)| name.clone()).collect();
    let mut feature_columns: Vec<Vec<f64>> = numeric.into_iter().map(|(_, values)| values).collect();

    for (name, values) in &categorical {
        let levels: BTreeSet<&str> = values.iter().map(|s| s.as_str()).collect();
        for level in levels {
            names.push(format!("{}_{}", name, level));
            feature_columns.push(
                values
                    .iter()
                    .map(|v| if v == level { 1.0 } else { 0.0 })
                    .collect(),
            );
        }
    }

    let rows: Vec<Vec<f64>> = (0..n_rows)
        .map(|row| feature_columns.iter().map(|col| col[row]).collect())
        .collect();

    Ok(FeatureMatrix { names, rows })
}

/// Ordered outcome labels: the first label maps to code 1, the second to 2, ...
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutcomeMapping {
    labels: Vec<String>,
}

impl OutcomeMapping {
    pub fn new(labels: Vec<String>) -> Result<Self, EncodeError> {
        if labels.is_empty() {
            return Err(EncodeError::EmptyMapping);
        }
        let mut seen = BTreeSet::new();
        for label in &labels {
            if !seen.insert(label.as_str()) {
                return Err(EncodeError::DuplicateLabel(label.clone()));
            }
        }
        Ok(Self { labels })
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn code_of(&self, label: &str) -> Option<u32> {
        self.labels
            .iter()
            .position(|l| l == label)
            .map(|i| i as u32 + 1)
    }

    pub fn label_of(&self, code: u32) -> Option<&str> {
        let index = (code as usize).checked_sub(1)?;
        self.labels.get(index).map(|s| s.as_str())
    }

    /// Map every row of the outcome column, collecting values outside the mapping
    pub fn map_column(&self, df: &DataFrame, column: &str) -> Result<OutcomeCodes> {
        let col = df
            .column(column)
            .with_context(|| format!("Outcome column '{}' not found", column))?;
        let values = column_to_string_vec(col)?;

        let mut unmapped: BTreeMap<String, usize> = BTreeMap::new();
        let codes: Vec<Option<u32>> = values
            .iter()
            .map(|v| {
                let code = v.as_deref().and_then(|s| self.code_of(s));
                if code.is_none() {
                    let key = v.clone().unwrap_or_else(|| NULL_LABEL.to_string());
                    *unmapped.entry(key).or_insert(0) += 1;
                }
                code
            })
            .collect();

        Ok(OutcomeCodes {
            column: column.to_string(),
            codes,
            unmapped,
        })
    }
}

/// Outcome codes per row; `None` marks a row whose label is outside the mapping
#[derive(Debug, Clone)]
pub struct OutcomeCodes {
    pub column: String,
    pub codes: Vec<Option<u32>>,
    pub unmapped: BTreeMap<String, usize>,
}

impl OutcomeCodes {
    pub fn unmapped_rows(&self) -> usize {
        self.unmapped.values().sum()
    }

    /// All codes, or an error naming every unmapped value
    pub fn require_all_mapped(&self) -> Result<Vec<u32>, EncodeError> {
        if !self.unmapped.is_empty() {
            return Err(EncodeError::UnmappedOutcome {
                column: self.column.clone(),
                values: self.unmapped.clone(),
            });
        }
        Ok(self.codes.iter().flatten().copied().collect())
    }

    /// Indices of rows with a mapped outcome
    pub fn mapped_rows(&self) -> Vec<usize> {
        self.codes
            .iter()
            .enumerate()
            .filter_map(|(i, c)| c.map(|_| i))
            .collect()
    }

    /// Codes for the given rows; rows without a code are skipped
    pub fn codes_for_rows(&self, rows: &[usize]) -> Vec<u32> {
        rows.iter().filter_map(|&i| self.codes.get(i).copied().flatten()).collect()
    }
}
