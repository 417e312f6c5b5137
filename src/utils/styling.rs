//! Terminal styling for step headers, status lines and the configuration card

use console::{style, Emoji};
use std::path::Path;
use std::time::Duration;

pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "[*] ");
pub static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "[!] ");
pub static TREE: Emoji<'_, '_> = Emoji("🌲 ", ">> ");
pub static FOLDER: Emoji<'_, '_> = Emoji("📂 ", "");
pub static TARGET: Emoji<'_, '_> = Emoji("🎯 ", "");
pub static SAVE: Emoji<'_, '_> = Emoji("💾 ", "");
pub static DICE: Emoji<'_, '_> = Emoji("🎲 ", "");
pub static CALENDAR: Emoji<'_, '_> = Emoji("📅 ", "");

/// Values shown on the configuration card
pub struct RunSummary<'a> {
    pub input: &'a Path,
    pub outcome: &'a str,
    pub output: &'a Path,
    pub reference_year: i32,
    pub test_size: f64,
    pub n_trees: usize,
    pub seed: u64,
    pub impute_scope: &'a str,
}

pub fn print_banner(version: &str) {
    let banner = r#"
     _        _        __                     _
 ___| |_ __ _| |_ ___ / _| ___  _ __ ___  ___| |_
/ __| __/ _` | __/ _ \ |_ / _ \| '__/ _ \/ __| __|
\__ \ || (_| | ||  __/  _| (_) | | |  __/\__ \ |_
|___/\__\__,_|\__\___|_|  \___/|_|  \___||___/\__|
    "#;

    println!();
    println!("{}", style(banner).green().bold());
    println!(
        "    {} {}",
        TREE,
        style("Patient outcome classification with a Random Forest").dim()
    );
    println!("    {}", style(format!("v{}", version)).dim());
    println!("    {}", style("━".repeat(50)).dim());
    println!();
}

/// Print the configuration card
pub fn print_config(run: &RunSummary) {
    let box_width = 56;
    let line = "─".repeat(box_width - 2);

    println!("    ┌{}┐", line);
    println!(
        "    │ {}{}│",
        style("⚙️  Configuration").cyan().bold(),
        " ".repeat(box_width - 20)
    );
    println!("    ├{}┤", line);
    println!("    │  {} Input:   {:<38}│", FOLDER, truncate_path(run.input, 37));
    println!("    │  {} Outcome: {:<38}│", TARGET, truncate_string(run.outcome, 37));
    println!("    │  {} Report:  {:<38}│", SAVE, truncate_path(run.output, 37));
    println!("    ├{}┤", line);
    println!(
        "    │  {} Reference year: {:<31}│",
        CALENDAR,
        style(run.reference_year).yellow()
    );
    println!(
        "    │  {} Trees: {:<5} Seed: {:<6} Test size: {:<9}│",
        DICE,
        style(run.n_trees).yellow(),
        style(run.seed).yellow(),
        style(format!("{:.0}%", run.test_size * 100.0)).yellow()
    );
    println!(
        "    │     Mean imputation: {:<30}│",
        truncate_string(run.impute_scope, 30)
    );
    println!("    └{}┘", line);
    println!();
}

pub fn print_step_header(step_num: u8, title: &str) {
    println!();
    println!(
        "    {} {} {}",
        style(format!("STEP {}", step_num)).cyan().bold(),
        style("│").dim(),
        style(title).white().bold()
    );
    println!("    {}", style("─".repeat(50)).dim());
}

pub fn print_success(message: &str) {
    println!("    {} {}", style("✓").green().bold(), style(message).green());
}

pub fn print_info(message: &str) {
    println!("    {} {}", INFO, message);
}

/// Warnings go to stderr so they survive stdout redirection
pub fn print_warning(message: &str) {
    eprintln!("    {} {}", WARN, style(message).yellow());
}

pub fn print_step_time(elapsed: Duration) {
    println!("      {}", style(format!("({:.2}s)", elapsed.as_secs_f64())).dim());
}

pub fn print_completion() {
    println!();
    println!("    {} {}", TREE, style("Case study complete!").green().bold());
    println!();
}

pub fn print_count(description: &str, count: usize, detail: Option<&str>) {
    match detail {
        Some(info) => println!(
            "      Found {} {} {}",
            style(count).yellow().bold(),
            description,
            style(info).dim()
        ),
        None => println!("      Found {} {}", style(count).yellow().bold(), description),
    }
}

fn truncate_path(path: &Path, max_len: usize) -> String {
    truncate_string(&path.display().to_string(), max_len)
}

/// Keep the tail of long strings, prefixed with "..."
pub fn truncate_string(s: &str, max_len: usize) -> String {
    let chars: Vec<char> = s.chars().collect();
    if chars.len() <= max_len {
        s.to_string()
    } else {
        let tail: String = chars[chars.len() - (max_len - 3)..].iter().collect();
        format!("...{}", tail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_string_keeps_tail() {
        assert_eq!(truncate_string("short", 10), "short");
        assert_eq!(truncate_string("/very/long/path/data.csv", 12), ".../data.csv");
    }

    #[test]
    fn test_truncate_string_is_char_safe() {
        let truncated = truncate_string("ééééééééé", 6);
        assert_eq!(truncated, "...ééé");
    }
}
