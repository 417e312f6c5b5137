//! indicatif spinners and bars

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

/// Spinner for steps with no known length
pub fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("    {spinner:.cyan} {msg}")
            .unwrap()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Bar advanced once per fitted tree
pub fn create_tree_progress(n_trees: usize) -> ProgressBar {
    let pb = ProgressBar::new(n_trees as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("    Growing trees [{bar:40.green/blue}] {pos}/{len} ({percent}%) [{eta}]")
            .unwrap()
            .progress_chars("=>-"),
    );
    pb
}

pub fn finish_with_success(pb: &ProgressBar, message: &str) {
    pb.finish_with_message(format!("✅ {}", message));
}

pub fn finish_with_warning(pb: &ProgressBar, message: &str) {
    pb.finish_with_message(format!("⚠️  {}", message));
}
