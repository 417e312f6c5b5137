//! Interactive prompts using dialoguer

use std::collections::BTreeMap;

use anyhow::Result;
use dialoguer::Confirm;

/// Ask a yes/no question, defaulting to `default`
pub fn confirm_step(message: &str, default: bool) -> Result<bool> {
    let confirmed = Confirm::new()
        .with_prompt(message)
        .default(default)
        .interact()?;
    Ok(confirmed)
}

/// Ask whether rows with unknown outcome values may be dropped
pub fn confirm_drop_unmapped(column: &str, values: &BTreeMap<String, usize>) -> Result<bool> {
    let rows: usize = values.values().sum();
    let message = format!(
        "Column '{}' has {} row(s) with unknown outcome values ({}). Drop them and continue?",
        column,
        rows,
        values.keys().cloned().collect::<Vec<_>>().join(", ")
    );
    confirm_step(&message, false)
}
