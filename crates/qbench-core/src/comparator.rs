//! Agreement metrics between a simulator histogram and a device histogram.
//!
//! Every metric treats outcomes missing from one side as observed zero times
//! there. The zero-filling happens on a private aligned view, so the same pair
//! of histograms can be passed to all metrics in turn.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{QbenchError, Result};
use crate::histogram::{CountsHistogram, aligned};

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// All four comparison metrics for one simulator/device pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct HistogramComparison {
    /// Relative error per outcome observed by both backends.
    pub percentage_error: BTreeMap<String, f64>,
    /// Pearson-style correlation; `None` when either histogram is flat.
    pub correlation: Option<f64>,
    pub chi_square: f64,
    /// Overlap of the two histograms as a fraction of the shots.
    pub histogram_intersection: f64,
}

// ---------------------------------------------------------------------------
// Metrics
// ---------------------------------------------------------------------------

/// |sim − real| / sim for every outcome present in both histograms.
///
/// Outcomes only seen by the simulator are omitted. A zero simulator count on a
/// shared outcome is a [`QbenchError::DivisionByZero`] naming the smallest such
/// label.
pub fn percentage_error(
    sim: &CountsHistogram,
    real: &CountsHistogram,
) -> Result<BTreeMap<String, f64>> {
    let ordered: BTreeMap<&String, u64> = sim.iter().map(|(k, &v)| (k, v)).collect();
    let mut result = BTreeMap::new();
    for (key, sim_count) in ordered {
        let Some(&real_count) = real.get(key) else {
            continue;
        };
        if sim_count == 0 {
            return Err(QbenchError::DivisionByZero { key: key.clone() });
        }
        let error = (sim_count as f64 - real_count as f64) / sim_count as f64;
        result.insert(key.clone(), error.abs());
    }
    Ok(result)
}

/// Σ min(sim, real) over the union of outcomes, divided by `shots`.
pub fn histogram_intersection(
    sim: &CountsHistogram,
    real: &CountsHistogram,
    shots: u64,
) -> Result<f64> {
    if shots == 0 {
        return Err(QbenchError::ZeroShots);
    }
    let overlap: u128 = aligned(sim, real)
        .values()
        .map(|&(s, r)| u128::from(s.min(r)))
        .sum();
    Ok(overlap as f64 / shots as f64)
}

/// ½ Σ (real − sim)² / (real + sim) over the union of outcomes.
///
/// Outcomes with a zero count on both sides contribute nothing.
pub fn chi_square_distance(sim: &CountsHistogram, real: &CountsHistogram) -> f64 {
    let sum: f64 = aligned(sim, real)
        .values()
        .filter(|&&(s, r)| s > 0 || r > 0)
        .map(|&(s, r)| {
            let (s, r) = (s as f64, r as f64);
            let diff = r - s;
            diff * diff / (r + s)
        })
        .sum();
    sum / 2.0
}

/// Correlation of the two histograms around the uniform baseline `shots / n`.
///
/// `n` is the size of the zero-filled outcome union. Returns `None` when either
/// histogram does not deviate from the baseline (or both are empty), since
/// the coefficient is undefined there.
pub fn correlation(sim: &CountsHistogram, real: &CountsHistogram, shots: u64) -> Option<f64> {
    let union = aligned(sim, real);
    if union.is_empty() {
        return None;
    }
    let baseline = shots as f64 / union.len() as f64;

    let mut sum_combined = 0.0;
    let mut sum_sim = 0.0;
    let mut sum_real = 0.0;
    for &(s, r) in union.values() {
        let ds = s as f64 - baseline;
        let dr = r as f64 - baseline;
        sum_combined += ds * dr;
        sum_sim += ds * ds;
        sum_real += dr * dr;
    }

    if sum_sim == 0.0 || sum_real == 0.0 {
        return None;
    }
    Some(sum_combined / (sum_sim * sum_real).sqrt())
}

/// Run every metric on one pair.
pub fn analyze(
    sim: &CountsHistogram,
    real: &CountsHistogram,
    shots: u64,
) -> Result<HistogramComparison> {
    Ok(HistogramComparison {
        percentage_error: percentage_error(sim, real)?,
        correlation: correlation(sim, real, shots),
        chi_square: chi_square_distance(sim, real),
        histogram_intersection: histogram_intersection(sim, real, shots)?,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(entries: &[(&str, u64)]) -> CountsHistogram {
        entries.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    fn sim_pair() -> (CountsHistogram, CountsHistogram) {
        (
            counts(&[("11111", 500), ("00000", 500)]),
            counts(&[
                ("11111", 350),
                ("00000", 200),
                ("10101", 200),
                ("11100", 250),
            ]),
        )
    }

    fn round3(x: f64) -> f64 {
        (x * 1000.0).round() / 1000.0
    }

    #[test]
    fn test_percentage_error() {
        let (sim, real) = sim_pair();
        let result = percentage_error(&sim, &real).unwrap();
        assert_eq!(result.len(), 2);
        assert!((result["11111"] - 0.3).abs() < 1e-12);
        assert!((result["00000"] - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_percentage_error_skips_keys_missing_from_real() {
        let sim = counts(&[("0", 10), ("1", 10)]);
        let real = counts(&[("0", 5)]);
        let result = percentage_error(&sim, &real).unwrap();
        assert_eq!(result.keys().collect::<Vec<_>>(), vec!["0"]);
    }

    #[test]
    fn test_percentage_error_division_by_zero() {
        let sim = counts(&[("01", 0), ("10", 4)]);
        let real = counts(&[("01", 3), ("10", 4)]);
        match percentage_error(&sim, &real) {
            Err(QbenchError::DivisionByZero { key }) => assert_eq!(key, "01"),
            other => panic!("expected division by zero, got {other:?}"),
        }
    }

    #[test]
    fn test_division_by_zero_reports_smallest_label() {
        let sim = counts(&[("11", 0), ("01", 0), ("10", 0), ("00", 0)]);
        let real = counts(&[("00", 1), ("01", 1), ("10", 1), ("11", 1)]);
        for _ in 0..50 {
            let shuffled: CountsHistogram = sim.iter().map(|(k, v)| (k.clone(), *v)).collect();
            match percentage_error(&shuffled, &real) {
                Err(QbenchError::DivisionByZero { key }) => assert_eq!(key, "00"),
                other => panic!("expected division by zero, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_metrics_with_counts_near_u64_max() {
        let sim = counts(&[("0", u64::MAX), ("1", u64::MAX)]);
        let real = counts(&[("0", u64::MAX), ("1", 1)]);

        let intersection = histogram_intersection(&sim, &real, u64::MAX).unwrap();
        assert!((intersection - 1.0).abs() < 1e-9);

        let chi = chi_square_distance(&counts(&[("0", u64::MAX)]), &counts(&[("0", 1)]));
        assert!(chi.is_finite());
        assert!(chi > 0.0);

        let cmp = analyze(&sim, &real, u64::MAX).unwrap();
        assert_eq!(cmp.percentage_error["0"], 0.0);
    }

    #[test]
    fn test_histogram_intersection() {
        let (sim, real) = sim_pair();
        let result = histogram_intersection(&sim, &real, 1000).unwrap();
        assert!((result - 0.55).abs() < 1e-12);
    }

    #[test]
    fn test_histogram_intersection_zero_shots() {
        let (sim, real) = sim_pair();
        assert!(matches!(
            histogram_intersection(&sim, &real, 0),
            Err(QbenchError::ZeroShots)
        ));
    }

    #[test]
    fn test_intersection_identical_is_one() {
        let (_, real) = sim_pair();
        let result = histogram_intersection(&real, &real, 1000).unwrap();
        assert_eq!(result, 1.0);
    }

    #[test]
    fn test_chi_square_distance() {
        let (sim, real) = sim_pair();
        assert_eq!(round3(chi_square_distance(&sim, &real)), 302.521);
    }

    #[test]
    fn test_chi_square_identical_is_zero() {
        let (sim, _) = sim_pair();
        assert_eq!(chi_square_distance(&sim, &sim), 0.0);
    }

    #[test]
    fn test_correlation() {
        let (sim, real) = sim_pair();
        let result = correlation(&sim, &real, 1000).unwrap();
        assert_eq!(round3(result), 0.408);
    }

    #[test]
    fn test_correlation_flat_is_undefined() {
        let flat = counts(&[("00", 250), ("01", 250), ("10", 250), ("11", 250)]);
        let peaked = counts(&[("00", 1000)]);
        assert_eq!(correlation(&flat, &peaked, 1000), None);
        assert_eq!(correlation(&peaked, &flat, 1000), None);
    }

    #[test]
    fn test_correlation_empty_is_undefined() {
        let empty = CountsHistogram::new();
        assert_eq!(correlation(&empty, &empty, 1000), None);
    }

    #[test]
    fn test_inputs_not_mutated() {
        let (sim, real) = sim_pair();
        let before = (sim.clone(), real.clone());
        let _ = analyze(&sim, &real, 1000).unwrap();
        assert_eq!((sim, real), before);
    }

    #[test]
    fn test_analyze_combines_metrics() {
        let (sim, real) = sim_pair();
        let result = analyze(&sim, &real, 1000).unwrap();
        assert!((result.histogram_intersection - 0.55).abs() < 1e-12);
        assert_eq!(round3(result.chi_square), 302.521);
        assert_eq!(result.correlation.map(round3), Some(0.408));
        assert_eq!(result.percentage_error.len(), 2);
    }

    #[test]
    fn test_comparison_serializes_kebab_case() {
        let (sim, real) = sim_pair();
        let json = serde_json::to_value(analyze(&sim, &real, 1000).unwrap()).unwrap();
        assert!(json.get("percentage-error").is_some());
        assert!(json.get("histogram-intersection").is_some());
        assert!(json.get("chi-square").is_some());
    }

    #[test]
    fn test_undefined_correlation_serializes_null() {
        let flat = counts(&[("0", 500), ("1", 500)]);
        let result = analyze(&flat, &flat, 1000).unwrap();
        let json = serde_json::to_value(result).unwrap();
        assert!(json["correlation"].is_null());
    }
}
