//! Pipeline module - load, profile, clean, encode, split and scale

pub mod clean;
pub mod column_values;
pub mod correlation;
pub mod encode;
pub mod loader;
pub mod profile;
pub mod scale;
pub mod schema;
pub mod split;

pub use clean::*;
pub use correlation::*;
pub use encode::*;
pub use loader::*;
pub use profile::*;
pub use scale::*;
pub use schema::*;
pub use split::*;
