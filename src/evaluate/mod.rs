//! Evaluate module - accuracy, confusion matrices and importance ranking

pub mod confusion;
pub mod importance;

pub use confusion::{accuracy, ClassMetrics, ConfusionMatrix};
pub use importance::{relative_importance, RankedFeature};
