//! Measurement-outcome histograms and the moments computed over them.
//!
//! A histogram maps fixed-width bitstring labels (`"00101"`) to the number of
//! shots that produced that outcome. Two histograms being compared rarely share
//! the exact same key set, so every pairwise metric works on a zero-filled
//! union built locally by [`aligned`]; callers' maps are never mutated.

use std::collections::{BTreeMap, HashMap};

use crate::error::{QbenchError, Result};

/// Observed counts per bitstring outcome.
pub type CountsHistogram = HashMap<String, u64>;

/// Per-outcome weights, either raw counts or probabilities.
pub type Distribution = HashMap<String, f64>;

/// Total number of shots recorded in a histogram.
pub fn total_shots(counts: &CountsHistogram) -> u64 {
    counts.values().fold(0u64, |acc, &c| acc.saturating_add(c))
}

/// Normalize counts by `shots` into a probability distribution.
///
/// Returns an empty distribution for `shots == 0`.
pub fn probabilities(counts: &CountsHistogram, shots: u64) -> Distribution {
    if shots == 0 {
        return Distribution::new();
    }
    counts
        .iter()
        .map(|(key, &count)| (key.clone(), count as f64 / shots as f64))
        .collect()
}

/// Most frequent outcome and its count. Ties resolve to the smallest label.
pub fn mode(counts: &CountsHistogram) -> Option<(&str, u64)> {
    counts
        .iter()
        .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(a.0)))
        .map(|(key, &count)| (key.as_str(), count))
}

/// Parse an outcome label as an unsigned binary integer.
pub fn bitstring_value(key: &str) -> Result<u128> {
    // Measurement labels from multi-register circuits carry spaces between registers.
    let digits: String = key.chars().filter(|c| *c != ' ').collect();
    if digits.is_empty() {
        return Err(QbenchError::InvalidBitstring {
            key: key.to_string(),
        });
    }
    u128::from_str_radix(&digits, 2).map_err(|_| QbenchError::InvalidBitstring {
        key: key.to_string(),
    })
}

/// Σ value(key) × weight(key), reading every key as a binary number.
///
/// Meaningful when the weights are probabilities (see [`probabilities`]).
pub fn expected_value(dist: &Distribution) -> Result<f64> {
    let mut result = 0.0;
    for (key, weight) in sorted(dist) {
        result += bitstring_value(key)? as f64 * weight;
    }
    Ok(result)
}

/// sqrt(Σ weight(key) × (value(key) − expected_value)²).
pub fn standard_deviation(dist: &Distribution, expected_value: f64) -> Result<f64> {
    let mut sum = 0.0;
    for (key, weight) in sorted(dist) {
        let diff = bitstring_value(key)? as f64 - expected_value;
        sum += diff * diff * weight;
    }
    Ok(sum.sqrt())
}

/// Union of both key sets with missing entries filled by zero.
///
/// Ordered by label so that floating-point sums do not depend on the hash
/// order of the inputs.
pub(crate) fn aligned<'a>(
    sim: &'a CountsHistogram,
    real: &'a CountsHistogram,
) -> BTreeMap<&'a str, (u64, u64)> {
    let mut union: BTreeMap<&str, (u64, u64)> = BTreeMap::new();
    for (key, &count) in sim {
        union.entry(key.as_str()).or_default().0 = count;
    }
    for (key, &count) in real {
        union.entry(key.as_str()).or_default().1 = count;
    }
    union
}

fn sorted(dist: &Distribution) -> Vec<(&str, f64)> {
    let mut entries: Vec<(&str, f64)> = dist.iter().map(|(k, &v)| (k.as_str(), v)).collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));
    entries
}
