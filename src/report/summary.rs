//! Console tables for the profile, cleaning, evaluation and final summary

use std::time::Duration;

use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, CellAlignment, Color, Table};
use console::style;

use crate::evaluate::{ConfusionMatrix, RankedFeature};
use crate::pipeline::{CleaningReport, CorrelatedPair, DatasetProfile, ValueProfile};

/// Rows shown in the per-column profile tables
const MAX_PROFILE_ROWS: usize = 25;

fn new_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(
        headers
            .iter()
            .map(|h| Cell::new(h).add_attribute(Attribute::Bold))
            .collect::<Vec<_>>(),
    );
    table
}

fn print_indented(table: &Table) {
    for line in table.to_string().lines() {
        println!("    {}", line);
    }
}

fn print_section(icon: &str, title: &str) {
    println!();
    println!("    {} {}", style(icon).cyan(), style(title).white().bold());
    println!("    {}", style("─".repeat(50)).dim());
}

fn num(value: f64) -> Cell {
    let text = if value.is_nan() { "-".to_string() } else { format!("{:.2}", value) };
    Cell::new(text).set_alignment(CellAlignment::Right)
}

/// Resolve a class code to its label, falling back to the code itself
pub fn class_label(code: u32, class_names: &[(u32, String)]) -> String {
    class_names
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| name.clone())
        .unwrap_or_else(|| code.to_string())
}

/// Shape, missing values and outcome counts of the loaded table
pub fn display_profile(profile: &DatasetProfile) {
    print_section("🔎", "DATASET PROFILE");
    println!(
        "      Shape: {} rows × {} columns",
        style(profile.rows).yellow().bold(),
        style(profile.columns).yellow().bold()
    );

    let missing: Vec<&(String, usize)> = profile.null_counts.iter().filter(|(_, n)| *n > 0).collect();
    if !missing.is_empty() {
        println!();
        let mut table = new_table(&["Column", "Missing", "Missing %"]);
        for (column, count) in missing.iter().take(MAX_PROFILE_ROWS) {
            let pct = if profile.rows == 0 { 0.0 } else { 100.0 * *count as f64 / profile.rows as f64 };
            table.add_row(vec![
                Cell::new(column),
                Cell::new(count).set_alignment(CellAlignment::Right),
                Cell::new(format!("{:.1}%", pct))
                    .fg(if pct > 50.0 { Color::Red } else { Color::Yellow })
                    .set_alignment(CellAlignment::Right),
            ]);
        }
        print_indented(&table);
    }

    if !profile.outcome_counts.is_empty() {
        println!();
        let mut table = new_table(&["Outcome", "Rows"]);
        for (value, count) in &profile.outcome_counts {
            table.add_row(vec![Cell::new(value), Cell::new(count).set_alignment(CellAlignment::Right)]);
        }
        print_indented(&table);
    }
}

/// Numeric summaries, unique counts and duplicates under `title`
pub fn display_value_profile(title: &str, profile: &ValueProfile) {
    print_section("📊", title);
    println!(
        "      Shape: {} rows × {} columns, {} duplicate row(s)",
        style(profile.rows).yellow().bold(),
        style(profile.columns).yellow().bold(),
        style(profile.duplicate_rows).yellow()
    );

    if !profile.numeric_summary.is_empty() {
        println!();
        let mut table = new_table(&["Column", "Count", "Mean", "Std", "Min", "25%", "50%", "75%", "Max"]);
        for s in profile.numeric_summary.iter().take(MAX_PROFILE_ROWS) {
            table.add_row(vec![
                Cell::new(&s.column),
                Cell::new(s.count).set_alignment(CellAlignment::Right),
                num(s.mean),
                num(s.std),
                num(s.min),
                num(s.q25),
                num(s.median),
                num(s.q75),
                num(s.max),
            ]);
        }
        print_indented(&table);
    }

    println!();
    let mut table = new_table(&["Column", "Unique", "Unique ratio", "Type"]);
    for unique in profile.unique_counts.iter().take(MAX_PROFILE_ROWS) {
        let kind = if profile.categorical_levels.iter().any(|(name, _)| name == &unique.column) {
            "text"
        } else {
            "numeric"
        };
        table.add_row(vec![
            Cell::new(&unique.column),
            Cell::new(unique.unique).set_alignment(CellAlignment::Right),
            Cell::new(format!("{:.3}", unique.ratio)).set_alignment(CellAlignment::Right),
            Cell::new(kind).fg(Color::Cyan),
        ]);
    }
    print_indented(&table);
}

pub fn display_correlations(pairs: &[CorrelatedPair]) {
    if pairs.is_empty() {
        return;
    }
    print_section("🔗", "STRONGEST CORRELATIONS");
    let mut table = new_table(&["Feature 1", "Feature 2", "Correlation"]);
    for pair in pairs {
        let color = if pair.correlation.abs() > 0.7 { Color::Red } else { Color::White };
        table.add_row(vec![
            Cell::new(&pair.feature1),
            Cell::new(&pair.feature2),
            Cell::new(format!("{:+.3}", pair.correlation))
                .fg(color)
                .set_alignment(CellAlignment::Right),
        ]);
    }
    print_indented(&table);
}

pub fn display_cleaning(report: &CleaningReport) {
    print_section("🧹", "CLEANING");
    println!(
        "      Derived '{}' from reference year {} ({} row(s) without birth year)",
        report.age_column,
        style(report.reference_year).yellow(),
        report.age_missing
    );
    println!("      Mean imputation over: {}", style(&report.impute_scope).yellow());

    let fills: Vec<_> = report.fills.iter().filter(|f| f.filled > 0).collect();
    if !fills.is_empty() {
        println!();
        let mut table = new_table(&["Column", "Strategy", "Fill value", "Cells filled"]);
        for fill in fills {
            table.add_row(vec![
                Cell::new(&fill.column),
                Cell::new(&fill.strategy),
                Cell::new(fill.fill_value.as_deref().unwrap_or("-")),
                Cell::new(fill.filled).set_alignment(CellAlignment::Right),
            ]);
        }
        print_indented(&table);
    }

    if !report.dropped_columns.is_empty() {
        println!();
        println!("      Dropped columns:");
        for column in &report.dropped_columns {
            println!("        {} {}", style("•").dim(), column);
        }
    }
}

/// Accuracy, per-class scores and both confusion matrices
pub fn display_evaluation(matrix: &ConfusionMatrix, class_names: &[(u32, String)]) {
    print_section("📈", "EVALUATION (TEST SET)");

    let accuracy = matrix.accuracy();
    let color = if accuracy >= 0.8 {
        Color::Green
    } else if accuracy >= 0.6 {
        Color::Yellow
    } else {
        Color::Red
    };
    let mut table = new_table(&["Class", "Precision", "Recall", "F1", "Support"]);
    for m in matrix.class_metrics() {
        table.add_row(vec![
            Cell::new(class_label(m.class, class_names)),
            num(m.precision),
            num(m.recall),
            num(m.f1),
            Cell::new(m.support).set_alignment(CellAlignment::Right),
        ]);
    }
    table.add_row(vec![
        Cell::new("accuracy").add_attribute(Attribute::Bold),
        Cell::new(""),
        Cell::new(""),
        Cell::new(format!("{:.2}", accuracy))
            .fg(color)
            .add_attribute(Attribute::Bold)
            .set_alignment(CellAlignment::Right),
        Cell::new(matrix.total()).set_alignment(CellAlignment::Right),
    ]);
    table.add_row(vec![
        Cell::new("weighted F1"),
        Cell::new(""),
        Cell::new(""),
        num(matrix.weighted_f1()),
        Cell::new(""),
    ]);
    print_indented(&table);

    let labels: Vec<String> = matrix
        .classes()
        .iter()
        .map(|&c| class_label(c, class_names))
        .collect();
    let mut headers = vec!["true \\ predicted"];
    headers.extend(labels.iter().map(|s| s.as_str()));

    println!();
    println!("      Confusion matrix (counts)");
    let mut counts = new_table(&headers);
    for (label, row) in labels.iter().zip(matrix.counts()) {
        let mut cells = vec![Cell::new(label).add_attribute(Attribute::Bold)];
        cells.extend(row.iter().map(|c| Cell::new(c).set_alignment(CellAlignment::Right)));
        counts.add_row(cells);
    }
    print_indented(&counts);

    println!();
    println!("      Confusion matrix (row %)");
    let mut normalized = new_table(&headers);
    for (i, (label, row)) in labels.iter().zip(matrix.normalized()).enumerate() {
        let mut cells = vec![Cell::new(label).add_attribute(Attribute::Bold)];
        cells.extend(row.iter().enumerate().map(|(j, p)| {
            let cell = Cell::new(format!("{:.1}%", p * 100.0)).set_alignment(CellAlignment::Right);
            if i == j {
                cell.fg(Color::Green)
            } else {
                cell
            }
        }));
        normalized.add_row(cells);
    }
    print_indented(&normalized);
}

pub fn display_importance(ranked: &[RankedFeature]) {
    print_section("🌲", "RELATIVE FEATURE IMPORTANCE");
    let mut table = new_table(&["Rank", "Feature", "Relative", ""]);
    for feature in ranked {
        let bar_len = (feature.relative / 5.0).round() as usize;
        table.add_row(vec![
            Cell::new(feature.rank).set_alignment(CellAlignment::Right),
            Cell::new(&feature.name),
            Cell::new(format!("{:.1}", feature.relative)).set_alignment(CellAlignment::Right),
            Cell::new("█".repeat(bar_len)).fg(Color::Green),
        ]);
    }
    print_indented(&table);
}

/// Row counts and per-step timings for the closing summary
#[derive(Debug, Default)]
pub struct CaseStudySummary {
    pub rows_loaded: usize,
    pub rows_dropped: usize,
    pub train_rows: usize,
    pub test_rows: usize,
    pub n_features: usize,
    pub n_trees: usize,
    pub accuracy: Option<f64>,
    pub load_time: Duration,
    pub clean_time: Duration,
    pub train_time: Duration,
    pub evaluate_time: Duration,
}

impl CaseStudySummary {
    pub fn new(rows_loaded: usize) -> Self {
        Self {
            rows_loaded,
            ..Default::default()
        }
    }

    pub fn total_time(&self) -> Duration {
        self.load_time + self.clean_time + self.train_time + self.evaluate_time
    }

    pub fn display(&self) {
        print_section("📋", "SUMMARY");
        let mut table = new_table(&["Metric", "Value"]);
        table.add_row(vec![Cell::new("📁 Rows loaded"), Cell::new(self.rows_loaded)]);
        table.add_row(vec![
            Cell::new("🗑️  Rows dropped"),
            Cell::new(self.rows_dropped).fg(if self.rows_dropped == 0 { Color::White } else { Color::Red }),
        ]);
        table.add_row(vec![
            Cell::new("✂️  Train / test"),
            Cell::new(format!("{} / {}", self.train_rows, self.test_rows)),
        ]);
        table.add_row(vec![Cell::new("🧮 Encoded features"), Cell::new(self.n_features)]);
        table.add_row(vec![Cell::new("🌲 Trees"), Cell::new(self.n_trees)]);
        if let Some(accuracy) = self.accuracy {
            table.add_row(vec![
                Cell::new("✅ Test accuracy"),
                Cell::new(format!("{:.2}%", accuracy * 100.0))
                    .fg(Color::Green)
                    .add_attribute(Attribute::Bold),
            ]);
        }
        table.add_row(vec![
            Cell::new("⏱️  Total time"),
            Cell::new(format!("{:.2}s", self.total_time().as_secs_f64())),
        ]);
        print_indented(&table);
    }
}
