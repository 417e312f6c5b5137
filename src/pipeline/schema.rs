//! Column schema for the patient dataset
//!
//! Every stage of the pipeline reads its column names from a [`ColumnSchema`]
//! rather than from hand-written lists scattered across the code. The schema
//! is validated against the loaded table before any cleaning happens.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::column_values::column_to_string_vec;

/// Errors raised when a loaded table does not match the expected schema
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("input is missing {} required column(s): {}", .missing.len(), .missing.join(", "))]
    MissingColumns { missing: Vec<String> },

    #[error("identifier column '{column}' contains duplicate value '{value}'")]
    DuplicateId { column: String, value: String },

    #[error("identifier column '{column}' contains {count} null value(s)")]
    NullId { column: String, count: usize },

    #[error("schema lists column '{column}' as {role} but it is not a source or derived column")]
    UnknownColumn { column: String, role: &'static str },
}

/// Named configuration of the columns used at each pipeline stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSchema {
    /// Unique row identifier
    pub id_column: String,
    /// Birth year, source of the derived age column
    pub birth_year_column: String,
    /// Name given to the derived age column
    pub age_column: String,
    /// Presence flag (missing means absent)
    pub flag_column: String,
    /// Outcome label predicted by the classifier
    pub outcome_column: String,
    /// Outcome labels in code order: the first maps to 1, the second to 2, ...
    pub outcome_labels: Vec<String>,
    /// Numeric columns whose missing values are filled with the column mean
    pub mean_fill_columns: Vec<String>,
    /// Date columns removed after cleaning
    pub date_columns: Vec<String>,
    /// Columns passed to the encoder, in output order
    pub feature_columns: Vec<String>,
}

impl Default for ColumnSchema {
    fn default() -> Self {
        let owned = |names: &[&str]| names.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        Self {
            id_column: "patient_id".to_string(),
            birth_year_column: "birth_year".to_string(),
            age_column: "n_age".to_string(),
            flag_column: "disease".to_string(),
            outcome_column: "state".to_string(),
            outcome_labels: owned(&["released", "isolated", "deceased"]),
            mean_fill_columns: owned(&[
                "global_num",
                "birth_year",
                "infection_order",
                "infected_by",
                "contact_number",
                "n_age",
            ]),
            date_columns: owned(&[
                "symptom_onset_date",
                "confirmed_date",
                "released_date",
                "deceased_date",
            ]),
            feature_columns: owned(&[
                "patient_id",
                "global_num",
                "sex",
                "birth_year",
                "age",
                "country",
                "province",
                "city",
                "infection_case",
                "infection_order",
                "infected_by",
                "contact_number",
                "disease",
                "n_age",
            ]),
        }
    }
}

impl ColumnSchema {
    /// Load a schema from a JSON file
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read schema file: {}", path.display()))?;
        let schema: ColumnSchema = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse schema file: {}", path.display()))?;
        schema.check_consistency()?;
        Ok(schema)
    }

    /// Columns that must exist in the input file.
    ///
    /// The derived age column is excluded; it is created by the cleaner.
    pub fn required_source_columns(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut required = Vec::new();

        let singles = [
            &self.id_column,
            &self.birth_year_column,
            &self.flag_column,
            &self.outcome_column,
        ];
        let all = singles
            .into_iter()
            .chain(self.mean_fill_columns.iter())
            .chain(self.date_columns.iter())
            .chain(self.feature_columns.iter());

        for name in all {
            if name != &self.age_column && seen.insert(name.clone()) {
                required.push(name.clone());
            }
        }
        required
    }

    /// Check that the schema does not route a dropped date column into the features
    pub fn check_consistency(&self) -> Result<(), SchemaError> {
        for column in &self.feature_columns {
            if self.date_columns.contains(column) {
                return Err(SchemaError::UnknownColumn {
                    column: column.clone(),
                    role: "a feature",
                });
            }
        }
        if self.date_columns.contains(&self.outcome_column) {
            return Err(SchemaError::UnknownColumn {
                column: self.outcome_column.clone(),
                role: "the outcome",
            });
        }
        Ok(())
    }

    /// Validate a loaded table against this schema.
    ///
    /// Reports every missing column at once, then checks the identifier
    /// column is non-null and unique.
    pub fn validate(&self, df: &DataFrame) -> Result<(), SchemaError> {
        self.check_consistency()?;

        let present: HashSet<String> = df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();

        let missing: Vec<String> = self
            .required_source_columns()
            .into_iter()
            .filter(|name| !present.contains(name))
            .collect();

        if !missing.is_empty() {
            return Err(SchemaError::MissingColumns { missing });
        }

        self.validate_ids(df)
    }

    fn validate_ids(&self, df: &DataFrame) -> Result<(), SchemaError> {
        let missing_id = || SchemaError::MissingColumns {
            missing: vec![self.id_column.clone()],
        };
        let column = df.column(&self.id_column).map_err(|_| missing_id())?;
        let values = column_to_string_vec(column).map_err(|_| missing_id())?;

        let null_count = values.iter().filter(|v| v.is_none()).count();
        if null_count > 0 {
            return Err(SchemaError::NullId {
                column: self.id_column.clone(),
                count: null_count,
            });
        }

        let mut seen = HashSet::with_capacity(values.len());
        for value in values.into_iter().flatten() {
            if !seen.insert(value.clone()) {
                return Err(SchemaError::DuplicateId {
                    column: self.id_column.clone(),
                    value,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_schema() -> ColumnSchema {
        ColumnSchema {
            id_column: "id".to_string(),
            birth_year_column: "born".to_string(),
            age_column: "age_now".to_string(),
            flag_column: "flag".to_string(),
            outcome_column: "state".to_string(),
            outcome_labels: vec!["a".to_string(), "b".to_string()],
            mean_fill_columns: vec!["born".to_string(), "age_now".to_string()],
            date_columns: vec!["seen_on".to_string()],
            feature_columns: vec!["born".to_string(), "flag".to_string(), "age_now".to_string()],
        }
    }

    #[test]
    fn test_required_columns_exclude_derived_age() {
        let schema = minimal_schema();
        let required = schema.required_source_columns();
        assert_eq!(required, vec!["id", "born", "flag", "state", "seen_on"]);
    }

    #[test]
    fn test_validate_accepts_matching_table() {
        let df = df! {
            "id" => [1i64, 2, 3],
            "born" => [Some(1990i64), None, Some(1970)],
            "flag" => [Some(true), None, None],
            "state" => ["a", "b", "a"],
            "seen_on" => ["2020-01-01", "2020-01-02", "2020-01-03"],
        }
        .unwrap();
        assert!(minimal_schema().validate(&df).is_ok());
    }

    #[test]
    fn test_validate_lists_all_missing_columns() {
        let df = df! {
            "id" => [1i64, 2],
            "born" => [1990i64, 1980],
        }
        .unwrap();
        match minimal_schema().validate(&df) {
            Err(SchemaError::MissingColumns { missing }) => {
                assert_eq!(missing, vec!["flag", "state", "seen_on"]);
            }
            other => panic!("expected MissingColumns, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_rejects_duplicate_ids() {
        let df = df! {
            "id" => [1i64, 2, 2],
            "born" => [1990i64, 1980, 1970],
            "flag" => [true, false, true],
            "state" => ["a", "b", "a"],
            "seen_on" => ["x", "y", "z"],
        }
        .unwrap();
        let err = minimal_schema().validate(&df).unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateId { ref value, .. } if value == "2"));
    }

    #[test]
    fn test_validate_rejects_null_ids() {
        let df = df! {
            "id" => [Some(1i64), None, Some(3)],
            "born" => [1990i64, 1980, 1970],
            "flag" => [true, false, true],
            "state" => ["a", "b", "a"],
            "seen_on" => ["x", "y", "z"],
        }
        .unwrap();
        let err = minimal_schema().validate(&df).unwrap_err();
        assert!(matches!(err, SchemaError::NullId { count: 1, .. }));
    }

    #[test]
    fn test_date_column_cannot_be_feature() {
        let mut schema = minimal_schema();
        schema.feature_columns.push("seen_on".to_string());
        assert!(matches!(
            schema.check_consistency(),
            Err(SchemaError::UnknownColumn { .. })
        ));
    }

    #[test]
    fn test_default_schema_round_trips_through_json() {
        let schema = ColumnSchema::default();
        let json = serde_json::to_string(&schema).unwrap();
        let parsed: ColumnSchema = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, schema);
        assert_eq!(parsed.outcome_labels, vec!["released", "isolated", "deceased"]);
    }
}
