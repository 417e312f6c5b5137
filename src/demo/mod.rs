//! Demo module - bundled datasets for trying out the forest without input files

pub mod iris;

pub use iris::{iris, iris_tree, IrisData, IrisTree, IRIS_CLASSES, IRIS_FEATURES};
