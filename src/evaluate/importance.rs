//! Relative feature importance ranking

use serde::Serialize;

/// One ranked feature
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedFeature {
    /// 1 = most important
    pub rank: usize,
    pub name: String,
    /// Raw MDI importance (sums to 1 across all features)
    pub importance: f64,
    /// Importance rescaled so the largest is exactly 100
    pub relative: f64,
}

/// Rescale importances to a 0-100 scale, sort descending and keep `top_k`.
///
/// Ties keep feature order. When every importance is zero the relative
/// values stay zero.
pub fn relative_importance(importances: &[f64], names: &[String], top_k: usize) -> Vec<RankedFeature> {
    let max = importances.iter().copied().fold(0.0_f64, f64::max);

    let mut ranked: Vec<RankedFeature> = names
        .iter()
        .zip(importances)
        .map(|(name, &importance)| RankedFeature {
            rank: 0,
            name: name.clone(),
            importance,
            relative: if max > 0.0 { 100.0 * importance / max } else { 0.0 },
        })
        .collect();

    ranked.sort_by(|a, b| b.importance.total_cmp(&a.importance));
    ranked.truncate(top_k);
    for (i, feature) in ranked.iter_mut().enumerate() {
        feature.rank = i + 1;
    }
    ranked
}
