//! Column value extraction helpers shared by the pipeline stages

use anyhow::Result;
use polars::prelude::*;

/// Convert a column to a Vec of Option<String>, one entry per row
pub fn column_to_string_vec(col: &Column) -> Result<Vec<Option<String>>> {
    let values: Vec<Option<String>> = match col.dtype() {
        DataType::String => col
            .str()?
            .into_iter()
            .map(|v| v.map(|s| s.to_string()))
            .collect(),
        DataType::Int8 | DataType::Int16 | DataType::Int32 | DataType::Int64 => {
            let cast = col.cast(&DataType::Int64)?;
            cast.i64()?
                .into_iter()
                .map(|v| v.map(|n| n.to_string()))
                .collect()
        }
        DataType::UInt8 | DataType::UInt16 | DataType::UInt32 | DataType::UInt64 => {
            let cast = col.cast(&DataType::UInt64)?;
            cast.u64()?
                .into_iter()
                .map(|v| v.map(|n| n.to_string()))
                .collect()
        }
        DataType::Float32 | DataType::Float64 => {
            let cast = col.cast(&DataType::Float64)?;
            cast.f64()?
                .into_iter()
                .map(|v| v.map(|n| format!("{}", n)))
                .collect()
        }
        DataType::Boolean => col
            .bool()?
            .into_iter()
            .map(|v| v.map(|b| b.to_string()))
            .collect(),
        _ => {
            let cast = col.cast(&DataType::String)?;
            cast.str()?
                .into_iter()
                .map(|v| v.map(|s| s.to_string()))
                .collect()
        }
    };

    Ok(values)
}

/// Convert a numeric column to a Vec of Option<f64>, one entry per row
pub fn column_to_f64_vec(col: &Column) -> Result<Vec<Option<f64>>> {
    if !col.dtype().is_primitive_numeric() && col.dtype() != &DataType::Boolean {
        anyhow::bail!(
            "Column '{}' has type {} and cannot be read as numeric",
            col.name(),
            col.dtype()
        );
    }
    let cast = col.cast(&DataType::Float64)?;
    Ok(cast.f64()?.into_iter().collect())
}

/// Whether a column should be treated as categorical by the encoder and profiler
pub fn is_categorical(col: &Column) -> bool {
    !col.dtype().is_primitive_numeric()
}
