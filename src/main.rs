//! stateforest: patient outcome Random Forest CLI
//!
//! Loads a patient table, profiles and cleans it, trains a Random Forest on
//! a seeded train/test split and reports accuracy, confusion matrices and
//! feature importance.

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use chrono::{Datelike, Local};
use clap::Parser;
use console::style;
use polars::prelude::*;

use stateforest::cli::{confirm_drop_unmapped, Cli, Commands};
use stateforest::demo::iris_tree;
use stateforest::evaluate::{accuracy, relative_importance, ConfusionMatrix};
use stateforest::model::{MaxFeatures, RandomForestConfig};
use stateforest::pipeline::{
    clean_records, correlation_matrix, load_dataset_with_progress, one_hot_encode, profile_dataset,
    profile_values, top_correlated_pairs, train_test_split, CleaningOptions, ColumnSchema, ImputeScope, OutcomeCodes,
    OutcomeMapping, StandardScaler,
};
use stateforest::report::{
    display_cleaning, display_correlations, display_evaluation, display_importance, display_profile,
    display_value_profile, export_evaluation_report, export_tree_dot, CaseStudySummary, EvaluationReportBuilder,
    ReportBuilderParams, RunSettings,
};
use stateforest::utils::{
    create_spinner, create_tree_progress, finish_with_success, finish_with_warning, print_banner,
    print_completion, print_config, print_count, print_info, print_step_header, print_step_time,
    print_success, print_warning, RunSummary,
};

/// Correlated pairs listed in the profile output
const TOP_CORRELATED_PAIRS: usize = 10;

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(command) = &cli.command {
        return match command {
            Commands::Profile {
                input,
                schema,
                infer_schema_length,
            } => run_profile(input, schema.as_deref(), *infer_schema_length),
            Commands::TreeDemo {
                output,
                n_trees,
                tree_index,
                seed,
            } => run_tree_demo(output, *n_trees, *tree_index, *seed),
        };
    }

    let input = cli.input().ok_or_else(|| {
        anyhow::anyhow!("Input file is required. Use -i/--input to specify a file.")
    })?;
    let output_path = cli
        .output_path()
        .ok_or_else(|| anyhow::anyhow!("Could not derive a report path from the input"))?;
    let schema = load_schema(cli.schema.as_deref())?;
    let reference_year = cli.reference_year.unwrap_or_else(|| Local::now().year());
    let outcome_mapping = OutcomeMapping::new(schema.outcome_labels.clone())?;

    print_banner(env!("CARGO_PKG_VERSION"));
    let impute_label = if cli.impute_from_train { "training rows" } else { "full table" };
    print_config(&RunSummary {
        input,
        outcome: &schema.outcome_column,
        output: &output_path,
        reference_year,
        test_size: cli.test_size,
        n_trees: cli.n_trees,
        seed: cli.seed,
        impute_scope: impute_label,
    });

    let mut report = EvaluationReportBuilder::new(ReportBuilderParams {
        input_file: input.display().to_string(),
        report_file: output_path.display().to_string(),
        settings: RunSettings {
            outcome_column: schema.outcome_column.clone(),
            outcome_labels: schema.outcome_labels.clone(),
            reference_year,
            test_size: cli.test_size,
            seed: cli.seed,
            n_trees: cli.n_trees,
            max_depth: cli.max_depth,
            impute_scope: impute_label.to_string(),
        },
    });

    // Step 1: Load, validate and profile
    print_step_header(1, "Load & Profile");
    let step_start = Instant::now();
    let (df, rows, cols, memory_mb) = load_dataset_with_progress(input, cli.infer_schema_length)?;
    println!("\n    {} Dataset Statistics:", style("✧").cyan());
    println!("      Rows: {}", rows);
    println!("      Columns: {}", cols);
    println!("      Estimated memory: {:.2} MB", memory_mb);

    schema.validate(&df)?;
    print_success("Columns match the schema");

    let profile = profile_dataset(&df, &schema.outcome_column)?;
    display_profile(&profile);
    report.set_profile(profile);

    let mut summary = CaseStudySummary::new(rows);
    summary.load_time = step_start.elapsed();
    print_step_time(summary.load_time);

    // Step 2: Outcome mapping and train/test split
    print_step_header(2, "Outcome Mapping & Split");
    let step_start = Instant::now();
    let codes = outcome_mapping.map_column(&df, &schema.outcome_column)?;
    let kept_rows = resolve_unmapped(&codes, cli.drop_unmapped, cli.no_confirm)?;
    let labels = codes.codes_for_rows(&kept_rows);
    summary.rows_dropped = rows - kept_rows.len();
    let df = if summary.rows_dropped > 0 {
        select_rows(&df, &kept_rows)?
    } else {
        df
    };

    let split = train_test_split(df.height(), cli.test_size, cli.seed)?;
    print_count(
        "training / test row(s)",
        split.train.len(),
        Some(&format!("/ {} (seed {})", split.test.len(), cli.seed)),
    );
    summary.train_rows = split.train.len();
    summary.test_rows = split.test.len();
    report.set_split(&split, summary.rows_dropped);

    // Step 3: Clean
    print_step_header(3, "Cleaning");
    let impute_scope = if cli.impute_from_train {
        ImputeScope::Rows(split.train.clone())
    } else {
        print_warning("Fill means use the full table, including test rows (use --impute-from-train to avoid this)");
        ImputeScope::FullTable
    };
    let spinner = create_spinner("Cleaning records...");
    let (cleaned, cleaning) = clean_records(
        &df,
        &schema,
        &CleaningOptions {
            reference_year,
            impute_scope,
        },
    )?;
    let unfilled: Vec<&str> = cleaning
        .fills
        .iter()
        .filter(|f| f.fill_value.is_none())
        .map(|f| f.column.as_str())
        .collect();
    if unfilled.is_empty() {
        finish_with_success(&spinner, "Records cleaned");
    } else {
        finish_with_warning(
            &spinner,
            &format!("Records cleaned; no values to average in: {}", unfilled.join(", ")),
        );
    }
    display_cleaning(&cleaning);
    report.set_cleaning(cleaning);

    let cleaned_profile = profile_values(&cleaned)?;
    display_value_profile("CLEANED DATA", &cleaned_profile);
    let correlation = correlation_matrix(&cleaned)?;
    display_correlations(&top_correlated_pairs(&correlation, TOP_CORRELATED_PAIRS));
    report.set_cleaned_profile(cleaned_profile);
    report.set_correlation(correlation);

    // Step 4: Encode and scale
    print_step_header(4, "Encoding & Scaling");
    let features = one_hot_encode(&cleaned, &schema.feature_columns)?;
    print_count(
        "encoded feature column(s)",
        features.n_features(),
        Some(&format!("from {} source column(s)", schema.feature_columns.len())),
    );
    summary.n_features = features.n_features();

    let train_x = features.select_rows(&split.train);
    let test_x = features.select_rows(&split.test);
    let train_y: Vec<u32> = split.train.iter().map(|&i| labels[i]).collect();
    let test_y: Vec<u32> = split.test.iter().map(|&i| labels[i]).collect();

    let scaler = StandardScaler::fit(&train_x.rows)?;
    let train_scaled = scaler.transform(&train_x.rows)?;
    let test_scaled = scaler.transform(&test_x.rows)?;
    print_success("Scaler fitted on training rows");
    summary.clean_time = step_start.elapsed();
    print_step_time(summary.clean_time);

    // Step 5: Train
    print_step_header(5, "Random Forest");
    let step_start = Instant::now();
    let config = RandomForestConfig::new(cli.n_trees)?
        .with_max_features(MaxFeatures::Sqrt)
        .with_max_depth(cli.max_depth)
        .with_min_samples_split(cli.min_samples_split)
        .with_min_samples_leaf(cli.min_samples_leaf)
        .with_seed(cli.seed);
    let progress = create_tree_progress(cli.n_trees);
    let forest = config.fit_with_progress(&train_scaled, &train_y, &features.names, Some(&progress))?;
    finish_with_success(&progress, &format!("Trained {} trees", forest.n_trees()));
    summary.n_trees = forest.n_trees();
    summary.train_time = step_start.elapsed();
    print_step_time(summary.train_time);

    // Step 6: Evaluate
    print_step_header(6, "Evaluation");
    let step_start = Instant::now();
    let predictions = forest.predict_batch(&test_scaled)?;
    let matrix = ConfusionMatrix::from_labels(&test_y, &predictions)?;
    let class_names: Vec<(u32, String)> = outcome_mapping
        .labels()
        .iter()
        .enumerate()
        .map(|(i, label)| (i as u32 + 1, label.clone()))
        .collect();
    display_evaluation(&matrix, &class_names);
    summary.accuracy = Some(accuracy(&test_y, &predictions)?);
    report.set_evaluation(&matrix, &class_names);

    let ranked = relative_importance(&forest.feature_importances(), &features.names, cli.top_features);
    display_importance(&ranked);
    report.set_importance(ranked);
    summary.evaluate_time = step_start.elapsed();
    print_step_time(summary.evaluate_time);

    // Step 7: Save
    print_step_header(7, "Save Results");
    report.set_timing(&summary);
    export_evaluation_report(&report.build(), &output_path)?;
    print_success(&format!("Report saved to {}", output_path.display()));

    if let Some(dot_path) = &cli.tree_dot {
        let tree = forest.tree(cli.tree_index)?;
        let tree_classes: Vec<String> = forest
            .classes()
            .iter()
            .map(|&code| outcome_mapping.label_of(code).unwrap_or("unknown").to_string())
            .collect();
        export_tree_dot(&tree.to_dot(&features.names, &tree_classes), dot_path)?;
        print_success(&format!(
            "Tree {} ({} nodes, depth {}) saved to {}",
            cli.tree_index,
            tree.n_nodes(),
            tree.depth(),
            dot_path.display()
        ));
    }

    summary.display();
    print_completion();

    Ok(())
}

/// `profile` subcommand: load, validate and profile the uncleaned table.
///
/// Statistics skip missing cells and correlations use the rows both columns share.
fn run_profile(input: &Path, schema_path: Option<&Path>, infer_schema_length: usize) -> Result<()> {
    let schema = load_schema(schema_path)?;
    print_banner(env!("CARGO_PKG_VERSION"));

    let (df, _, _, _) = load_dataset_with_progress(input, infer_schema_length)?;
    schema.validate(&df)?;
    print_success("Columns match the schema");

    display_profile(&profile_dataset(&df, &schema.outcome_column)?);
    display_value_profile("VALUE SUMMARY (UNCLEANED)", &profile_values(&df)?);
    let correlation = correlation_matrix(&df)?;
    display_correlations(&top_correlated_pairs(&correlation, TOP_CORRELATED_PAIRS));
    Ok(())
}

/// `tree-demo` subcommand: fit a forest on the bundled Iris table and export one tree
fn run_tree_demo(output: &Path, n_trees: usize, tree_index: usize, seed: u64) -> Result<()> {
    print_banner(env!("CARGO_PKG_VERSION"));
    print_step_header(1, "Iris Tree Demo");

    let config = RandomForestConfig::new(n_trees)?.with_seed(seed);
    let spinner = create_spinner("Fitting forest on Iris...");
    let result = iris_tree(&config, tree_index);
    spinner.finish_and_clear();
    let exported = result?;
    print_success(&format!("Trained {} trees", n_trees));
    print_count("Iris sample(s)", exported.n_samples, Some("(4 features, 3 species)"));
    print_info(&format!("Training accuracy: {:.3}", exported.training_accuracy));

    export_tree_dot(&exported.dot, output)?;
    print_success(&format!(
        "Tree {} ({} nodes, depth {}) saved to {}",
        tree_index,
        exported.n_nodes,
        exported.depth,
        output.display()
    ));
    print_info(&format!("Render with: dot -Tpng {} -o tree.png", output.display()));
    Ok(())
}

fn load_schema(path: Option<&Path>) -> Result<ColumnSchema> {
    match path {
        Some(path) => ColumnSchema::from_json_file(path),
        None => Ok(ColumnSchema::default()),
    }
}

/// Rows to keep given the outcome codes.
///
/// Unmapped rows are dropped only with `--drop-unmapped` or an interactive yes;
/// otherwise the unmapped values are returned as an error.
fn resolve_unmapped(codes: &OutcomeCodes, drop_unmapped: bool, no_confirm: bool) -> Result<Vec<usize>> {
    if codes.unmapped.is_empty() {
        print_success("Every outcome value is mapped");
        return Ok((0..codes.codes.len()).collect());
    }

    let allowed = drop_unmapped || (!no_confirm && confirm_drop_unmapped(&codes.column, &codes.unmapped)?);
    if !allowed {
        codes.require_all_mapped()?;
    }

    print_warning(&format!(
        "Dropping {} row(s) with unknown outcome values",
        codes.unmapped_rows()
    ));
    for (value, count) in &codes.unmapped {
        print_info(&format!("'{}': {} row(s)", value, count));
    }
    Ok(codes.mapped_rows())
}

fn select_rows(df: &DataFrame, rows: &[usize]) -> Result<DataFrame> {
    let mut mask = vec![false; df.height()];
    for &row in rows {
        mask[row] = true;
    }
    let mask = BooleanChunked::from_slice("keep".into(), &mask);
    df.filter(&mask).context("Failed to drop rows with unknown outcomes")
}

