//! Pearson correlation matrix of the numeric columns (heatmap data)

use anyhow::Result;
use faer::Mat;
use polars::prelude::*;
use rayon::prelude::*;
use serde::Serialize;

use super::column_values::column_to_f64_vec;

/// Square correlation matrix with the column names along both axes
#[derive(Debug, Clone, Serialize)]
pub struct CorrelationMatrix {
    pub names: Vec<String>,
    pub values: Vec<Vec<f64>>,
}

/// A pair of columns and their correlation
#[derive(Debug, Clone, Serialize)]
pub struct CorrelatedPair {
    pub feature1: String,
    pub feature2: String,
    pub correlation: f64,
}

/// Compute the Pearson correlation matrix of every non-constant numeric column.
///
/// Each pair is correlated over the rows where both columns have a value
/// (pairwise-complete). Pairs with fewer than two shared rows, or with no
/// variance over the shared rows, get `NaN`.
///
/// Algorithm:
/// 1. Center and scale each column by its own mean and std; missing cells become 0
/// 2. Stack the values into X and the presence mask into M (n_rows x n_cols)
/// 3. Shared counts N = M^T M, cross sums XY = X^T X,
///    masked sums S = X^T M and masked squares Q = (X∘X)^T M
/// 4. r_ij = (N XY - S_ij S_ji) / sqrt((N Q_ij - S_ij^2)(N Q_ji - S_ji^2))
pub fn correlation_matrix(df: &DataFrame) -> Result<CorrelationMatrix> {
    let numeric: Vec<(String, Vec<Option<f64>>)> = df
        .get_columns()
        .iter()
        .filter(|col| col.dtype().is_primitive_numeric())
        .map(|col| -> Result<(String, Vec<Option<f64>>)> {
            Ok((col.name().to_string(), column_to_f64_vec(col)?))
        })
        .collect::<Result<_>>()?;

    let n_rows = df.height();
    if n_rows == 0 {
        return Ok(CorrelationMatrix {
            names: Vec::new(),
            values: Vec::new(),
        });
    }

    let standardized: Vec<(String, Vec<Option<f64>>)> = numeric
        .par_iter()
        .filter_map(|(name, values)| standardize(values).map(|z| (name.clone(), z)))
        .collect();

    let n_cols = standardized.len();
    let mut x = Mat::<f64>::zeros(n_rows, n_cols);
    let mut x_sq = Mat::<f64>::zeros(n_rows, n_cols);
    let mut mask = Mat::<f64>::zeros(n_rows, n_cols);
    for (col_idx, (_, col_data)) in standardized.iter().enumerate() {
        for (row_idx, val) in col_data.iter().enumerate() {
            if let Some(v) = val {
                x[(row_idx, col_idx)] = *v;
                x_sq[(row_idx, col_idx)] = v * v;
                mask[(row_idx, col_idx)] = 1.0;
            }
        }
    }

    let shared = mask.transpose() * &mask;
    let cross = x.transpose() * &x;
    let sums = x.transpose() * &mask;
    let squares = x_sq.transpose() * &mask;

    let values: Vec<Vec<f64>> = (0..n_cols)
        .map(|i| {
            (0..n_cols)
                .map(|j| {
                    let n = shared[(i, j)];
                    if n < 2.0 {
                        return f64::NAN;
                    }
                    let (s_i, s_j) = (sums[(i, j)], sums[(j, i)]);
                    let var_i = n * squares[(i, j)] - s_i * s_i;
                    let var_j = n * squares[(j, i)] - s_j * s_j;
                    let tolerance = 1e-12 * n * n;
                    if var_i <= tolerance || var_j <= tolerance {
                        return f64::NAN;
                    }
                    ((n * cross[(i, j)] - s_i * s_j) / (var_i * var_j).sqrt()).clamp(-1.0, 1.0)
                })
                .collect()
        })
        .collect();
    let names = standardized.into_iter().map(|(name, _)| name).collect();

    Ok(CorrelationMatrix { names, values })
}

/// Center and scale the present values of a column; missing cells stay `None`.
///
/// Returns `None` for constant columns or columns with fewer than two values.
fn standardize(values: &[Option<f64>]) -> Option<Vec<Option<f64>>> {
    let present: Vec<f64> = values.iter().flatten().copied().filter(|v| !v.is_nan()).collect();
    let n = present.len();
    if n < 2 {
        return None;
    }
    let mean = present.iter().sum::<f64>() / n as f64;
    let ss: f64 = present.iter().map(|v| (v - mean) * (v - mean)).sum();
    if ss <= f64::EPSILON {
        return None;
    }
    let std = (ss / n as f64).sqrt();

    Some(
        values
            .iter()
            .map(|v| v.filter(|x| !x.is_nan()).map(|x| (x - mean) / std))
            .collect(),
    )
}

/// Strongest off-diagonal pairs by absolute correlation
pub fn top_correlated_pairs(matrix: &CorrelationMatrix, limit: usize) -> Vec<CorrelatedPair> {
    let n = matrix.names.len();
    let mut pairs: Vec<CorrelatedPair> = (0..n)
        .flat_map(|i| ((i + 1)..n).map(move |j| (i, j)))
        .map(|(i, j)| CorrelatedPair {
            feature1: matrix.names[i].clone(),
            feature2: matrix.names[j].clone(),
            correlation: matrix.values[i][j],
        })
        .filter(|p| !p.correlation.is_nan())
        .collect();

    pairs.sort_by(|a, b| {
        b.correlation
            .abs()
            .partial_cmp(&a.correlation.abs())
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    pairs.truncate(limit);
    pairs
}
