//! Command-line argument definitions using clap

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

/// stateforest - Predict patient outcome state with a Random Forest
#[derive(Parser, Debug)]
#[command(name = "stateforest")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Input file path (CSV or Parquet)
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// JSON report path.
    /// Defaults to the input directory with a '_rf_report.json' suffix (e.g., patients.csv → patients_rf_report.json).
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// JSON file describing the column roles (id, birth year, flag, outcome, features...).
    /// Defaults to the built-in patient record layout.
    #[arg(long)]
    pub schema: Option<PathBuf>,

    /// Year used to derive age from birth year. Defaults to the current year.
    #[arg(long)]
    pub reference_year: Option<i32>,

    /// Fraction of rows held out for evaluation, strictly between 0 and 1
    #[arg(long, default_value = "0.2", value_parser = validate_test_size)]
    pub test_size: f64,

    /// Seed for the train/test split and the forest
    #[arg(long, default_value = "1")]
    pub seed: u64,

    /// Number of trees in the forest
    #[arg(long, default_value = "300", value_parser = validate_n_trees)]
    pub n_trees: usize,

    /// Maximum tree depth (unbounded when omitted)
    #[arg(long)]
    pub max_depth: Option<usize>,

    /// Minimum samples a node needs before it may be split
    #[arg(long, default_value = "2", value_parser = validate_min_samples_split)]
    pub min_samples_split: usize,

    /// Minimum samples on each side of a split
    #[arg(long, default_value = "1", value_parser = validate_min_samples_leaf)]
    pub min_samples_leaf: usize,

    /// Number of features listed in the importance ranking
    #[arg(long, default_value = "30")]
    pub top_features: usize,

    /// Compute mean-fill values from the training rows only.
    /// Without this flag the means use the full table, which leaks test-set statistics.
    #[arg(long, default_value = "false")]
    pub impute_from_train: bool,

    /// Drop rows whose outcome is not one of the known labels instead of failing
    #[arg(long, default_value = "false")]
    pub drop_unmapped: bool,

    /// Write one estimator of the forest as Graphviz DOT to this path
    #[arg(long)]
    pub tree_dot: Option<PathBuf>,

    /// Index of the estimator written by --tree-dot
    #[arg(long, default_value = "5")]
    pub tree_index: usize,

    /// Skip interactive confirmation prompts
    #[arg(long, default_value = "false")]
    pub no_confirm: bool,

    /// Number of rows to use for schema inference (CSV only).
    /// Use 0 for full table scan.
    #[arg(long, default_value = "10000")]
    pub infer_schema_length: usize,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load a dataset, validate it against the schema and print its profile
    Profile {
        /// Input file path (CSV or Parquet)
        input: PathBuf,

        /// JSON column schema file
        #[arg(long)]
        schema: Option<PathBuf>,

        /// Number of rows to use for schema inference (CSV only)
        #[arg(long, default_value = "10000")]
        infer_schema_length: usize,
    },

    /// Fit a small forest on the bundled Iris measurements and write one tree as DOT
    TreeDemo {
        /// DOT output path
        #[arg(short, long, default_value = "iris_tree.dot")]
        output: PathBuf,

        /// Number of trees in the demo forest
        #[arg(long, default_value = "10", value_parser = validate_n_trees)]
        n_trees: usize,

        /// Index of the exported estimator
        #[arg(long, default_value = "5")]
        tree_index: usize,

        /// Seed for bootstrapping and feature sampling
        #[arg(long, default_value = "1")]
        seed: u64,
    },
}

impl Cli {
    pub fn input(&self) -> Option<&PathBuf> {
        self.input.as_ref()
    }

    /// Report path, derived from the input when not given explicitly
    pub fn output_path(&self) -> Option<PathBuf> {
        let input = self.input.as_ref()?;
        Some(
            self.output
                .clone()
                .unwrap_or_else(|| derived_path(input, "_rf_report.json")),
        )
    }
}

/// `dir/stem{suffix}` next to `input`
pub fn derived_path(input: &Path, suffix: &str) -> PathBuf {
    let parent = input.parent().unwrap_or_else(|| Path::new("."));
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    parent.join(format!("{}{}", stem, suffix))
}

fn validate_test_size(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;

    if value > 0.0 && value < 1.0 {
        Ok(value)
    } else {
        Err(format!(
            "test_size must be strictly between 0.0 and 1.0, got {}",
            value
        ))
    }
}

fn validate_n_trees(s: &str) -> Result<usize, String> {
    let value: usize = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid tree count", s))?;

    if value == 0 {
        Err("n_trees must be at least 1".to_string())
    } else {
        Ok(value)
    }
}

fn validate_min_samples_split(s: &str) -> Result<usize, String> {
    let value: usize = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid sample count", s))?;

    if value < 2 {
        Err(format!("min_samples_split must be at least 2, got {}", value))
    } else {
        Ok(value)
    }
}

fn validate_min_samples_leaf(s: &str) -> Result<usize, String> {
    let value: usize = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid sample count", s))?;

    if value == 0 {
        Err("min_samples_leaf must be at least 1".to_string())
    } else {
        Ok(value)
    }
}
