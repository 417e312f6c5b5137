//! Model module - Random Forest classifier built from CART trees

pub mod dot;
pub mod error;
pub mod forest;
pub mod node;
pub mod split;
pub mod tree;

pub use error::ModelError;
pub use forest::{MaxFeatures, RandomForest, RandomForestConfig};
pub use node::Node;
pub use tree::DecisionTree;
