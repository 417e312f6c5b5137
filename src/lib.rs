//! stateforest: patient outcome classification library
//!
//! Loads patient records, cleans and encodes them, and trains a Random
//! Forest that predicts the outcome state (released, isolated, deceased).

pub mod cli;
pub mod demo;
pub mod evaluate;
pub mod model;
pub mod pipeline;
pub mod report;
pub mod utils;
