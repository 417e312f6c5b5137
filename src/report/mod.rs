//! Report module - console summaries and the JSON evaluation report

pub mod evaluation_report;
pub mod summary;

pub use evaluation_report::*;
pub use summary::*;
