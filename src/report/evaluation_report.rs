//! JSON report of a full case-study run

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;

use super::summary::{class_label, CaseStudySummary};
use crate::evaluate::{ConfusionMatrix, RankedFeature};
use crate::pipeline::{CleaningReport, CorrelationMatrix, DatasetProfile, TrainTestSplit, ValueProfile};

/// Settings the run was made with
#[derive(Debug, Clone, Serialize)]
pub struct RunSettings {
    pub outcome_column: String,
    pub outcome_labels: Vec<String>,
    pub reference_year: i32,
    pub test_size: f64,
    pub seed: u64,
    pub n_trees: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_depth: Option<usize>,
    pub impute_scope: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportMetadata {
    pub timestamp: String,
    pub stateforest_version: String,
    pub input_file: String,
    pub report_file: String,
    pub settings: RunSettings,
}

#[derive(Debug, Clone, Serialize)]
pub struct SplitSummary {
    pub train_rows: usize,
    pub test_rows: usize,
    pub test_fraction: f64,
    /// Rows removed because their outcome was outside the mapping
    pub dropped_unmapped_rows: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClassEntry {
    pub code: u32,
    pub label: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClassScore {
    pub label: String,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct EvaluationSection {
    pub accuracy: f64,
    pub weighted_f1: f64,
    /// Row/column order of both confusion matrices
    pub classes: Vec<ClassEntry>,
    pub class_metrics: Vec<ClassScore>,
    pub confusion_matrix: Vec<Vec<usize>>,
    pub confusion_matrix_normalized: Vec<Vec<f64>>,
}

/// Timing information in milliseconds
#[derive(Debug, Clone, Default, Serialize)]
pub struct TimingInfo {
    pub load_ms: u64,
    pub clean_ms: u64,
    pub train_ms: u64,
    pub evaluate_ms: u64,
    pub total_ms: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct EvaluationReport {
    pub metadata: ReportMetadata,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<DatasetProfile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cleaning: Option<CleaningReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cleaned_profile: Option<ValueProfile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub split: Option<SplitSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evaluation: Option<EvaluationSection>,
    pub feature_importance: Vec<RankedFeature>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation: Option<CorrelationMatrix>,
    pub timing: TimingInfo,
}

/// Fixed inputs for [`EvaluationReportBuilder::new`]
pub struct ReportBuilderParams {
    pub input_file: String,
    pub report_file: String,
    pub settings: RunSettings,
}

/// Collects results as the pipeline runs
pub struct EvaluationReportBuilder {
    input_file: String,
    report_file: String,
    settings: RunSettings,
    profile: Option<DatasetProfile>,
    cleaning: Option<CleaningReport>,
    cleaned_profile: Option<ValueProfile>,
    split: Option<SplitSummary>,
    evaluation: Option<EvaluationSection>,
    importance: Vec<RankedFeature>,
    correlation: Option<CorrelationMatrix>,
    timing: TimingInfo,
}

impl EvaluationReportBuilder {
    pub fn new(params: ReportBuilderParams) -> Self {
        Self {
            input_file: params.input_file,
            report_file: params.report_file,
            settings: params.settings,
            profile: None,
            cleaning: None,
            cleaned_profile: None,
            split: None,
            evaluation: None,
            importance: Vec::new(),
            correlation: None,
            timing: TimingInfo::default(),
        }
    }

    pub fn set_profile(&mut self, profile: DatasetProfile) {
        self.profile = Some(profile);
    }

    pub fn set_cleaned_profile(&mut self, profile: ValueProfile) {
        self.cleaned_profile = Some(profile);
    }

    pub fn set_correlation(&mut self, matrix: CorrelationMatrix) {
        self.correlation = Some(matrix);
    }

    pub fn set_cleaning(&mut self, report: CleaningReport) {
        self.cleaning = Some(report);
    }

    pub fn set_split(&mut self, split: &TrainTestSplit, dropped_unmapped_rows: usize) {
        self.split = Some(SplitSummary {
            train_rows: split.train.len(),
            test_rows: split.test.len(),
            test_fraction: split.test_fraction(),
            dropped_unmapped_rows,
        });
    }

    /// Record test-set scores; `class_names` maps outcome codes to labels
    pub fn set_evaluation(&mut self, matrix: &ConfusionMatrix, class_names: &[(u32, String)]) {
        let classes = matrix
            .classes()
            .iter()
            .map(|&code| ClassEntry {
                code,
                label: class_label(code, class_names),
            })
            .collect();
        let class_metrics = matrix
            .class_metrics()
            .into_iter()
            .map(|m| ClassScore {
                label: class_label(m.class, class_names),
                precision: m.precision,
                recall: m.recall,
                f1: m.f1,
                support: m.support,
            })
            .collect();

        self.evaluation = Some(EvaluationSection {
            accuracy: matrix.accuracy(),
            weighted_f1: matrix.weighted_f1(),
            classes,
            class_metrics,
            confusion_matrix: matrix.counts().to_vec(),
            confusion_matrix_normalized: matrix.normalized(),
        });
    }

    pub fn set_importance(&mut self, ranked: Vec<RankedFeature>) {
        self.importance = ranked;
    }

    pub fn set_timing(&mut self, summary: &CaseStudySummary) {
        self.timing = TimingInfo {
            load_ms: summary.load_time.as_millis() as u64,
            clean_ms: summary.clean_time.as_millis() as u64,
            train_ms: summary.train_time.as_millis() as u64,
            evaluate_ms: summary.evaluate_time.as_millis() as u64,
            total_ms: summary.total_time().as_millis() as u64,
        };
    }

    pub fn build(self) -> EvaluationReport {
        EvaluationReport {
            metadata: ReportMetadata {
                timestamp: Utc::now().to_rfc3339(),
                stateforest_version: env!("CARGO_PKG_VERSION").to_string(),
                input_file: self.input_file,
                report_file: self.report_file,
                settings: self.settings,
            },
            profile: self.profile,
            cleaning: self.cleaning,
            cleaned_profile: self.cleaned_profile,
            split: self.split,
            evaluation: self.evaluation,
            feature_importance: self.importance,
            correlation: self.correlation,
            timing: self.timing,
        }
    }
}

/// Write the report as pretty-printed JSON
pub fn export_evaluation_report(report: &EvaluationReport, output_path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(report)
        .context("Failed to serialize evaluation report to JSON")?;

    std::fs::write(output_path, json)
        .with_context(|| format!("Failed to write evaluation report to {}", output_path.display()))?;

    Ok(())
}

/// Write a Graphviz DOT document
pub fn export_tree_dot(dot: &str, output_path: &Path) -> Result<()> {
    std::fs::write(output_path, dot)
        .with_context(|| format!("Failed to write tree diagram to {}", output_path.display()))
}
