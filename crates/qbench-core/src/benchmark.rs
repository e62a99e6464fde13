//! Benchmark execution records and simulator/device pair analysis.
//!
//! A randomized benchmark circuit is transpiled twice, once for a simulator
//! and once for a real device. Both executions are stored as
//! [`BenchmarkRecord`]s sharing a `benchmark_id`; comparing their histograms
//! tells how far the device drifts from the ideal result.

use std::collections::BTreeMap;
use std::path::Path;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

use crate::comparator::{HistogramComparison, analyze};
use crate::error::Result;
use crate::histogram::CountsHistogram;

/// Simulator used as the reference side of a pair unless configured otherwise.
pub const DEFAULT_SIMULATOR_BACKEND: &str = "ibmq_qasm_simulator";

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// One transpiled-circuit execution.
///
/// Created when the circuit is enqueued; completed exactly once through
/// [`BenchmarkRecord::complete_with`] when the job finishes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkRecord {
    #[serde(default)]
    pub id: String,
    /// Pairs the simulator run with the device run of the same logical circuit.
    #[serde(default)]
    pub benchmark_id: u64,
    #[serde(default, deserialize_with = "deserialize_backend")]
    pub backend: String,
    #[serde(default)]
    pub shots: u64,
    #[serde(default)]
    pub original_depth: u32,
    #[serde(default)]
    pub original_width: u32,
    #[serde(default, alias = "original_number_of_multi_qubit_gates")]
    pub original_multi_qubit_gates: u32,
    #[serde(default)]
    pub transpiled_depth: u32,
    #[serde(default)]
    pub transpiled_width: u32,
    #[serde(default, alias = "transpiled_number_of_multi_qubit_gates")]
    pub transpiled_multi_qubit_gates: u32,
    #[serde(default)]
    pub clifford: bool,
    #[serde(default)]
    pub complete: bool,
    /// Result histogram, present once the job has completed.
    #[serde(default, deserialize_with = "deserialize_counts")]
    pub counts: Option<CountsHistogram>,
}

impl BenchmarkRecord {
    /// Record the finished job's histogram and mark the record complete.
    pub fn complete_with(&mut self, counts: CountsHistogram) {
        self.counts = Some(counts);
        self.complete = true;
    }

    /// Completed and carrying a histogram.
    pub fn has_result(&self) -> bool {
        self.complete && self.counts.is_some()
    }

    /// Whether this record ran on `backend` (quoted names are accepted).
    pub fn ran_on(&self, backend: &str) -> bool {
        self.backend == normalize_backend(backend)
    }
}

/// Strip the JSON quoting that persisted backend names sometimes carry.
pub fn normalize_backend(name: &str) -> &str {
    let trimmed = name.trim();
    trimmed
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(trimmed)
}

fn deserialize_backend<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<String, D::Error> {
    let raw = String::deserialize(d)?;
    Ok(normalize_backend(&raw).to_string())
}

/// Accept either an inline JSON object or the JSON-encoded string form.
fn deserialize_counts<'de, D: Deserializer<'de>>(
    d: D,
) -> std::result::Result<Option<CountsHistogram>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawCounts {
        Inline(CountsHistogram),
        Encoded(String),
    }

    match Option::<RawCounts>::deserialize(d)? {
        None => Ok(None),
        Some(RawCounts::Inline(counts)) => Ok(Some(counts)),
        Some(RawCounts::Encoded(s)) if s.trim().is_empty() => Ok(None),
        Some(RawCounts::Encoded(s)) => serde_json::from_str(&s).map(Some).map_err(D::Error::custom),
    }
}

/// Load a JSON array of records from disk.
pub fn load_records(path: &Path) -> Result<Vec<BenchmarkRecord>> {
    let text = std::fs::read_to_string(path)?;
    let records: Vec<BenchmarkRecord> = serde_json::from_str(&text)?;
    log::debug!("loaded {} benchmark records from {}", records.len(), path.display());
    Ok(records)
}

// ---------------------------------------------------------------------------
// Pair analysis
// ---------------------------------------------------------------------------

/// How the two records of a benchmark group are oriented.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairingConfig {
    /// Backend whose record is the reference ("simulator") side.
    pub simulator_backend: String,
}

impl Default for PairingConfig {
    fn default() -> Self {
        Self {
            simulator_backend: DEFAULT_SIMULATOR_BACKEND.to_string(),
        }
    }
}

/// Comparison of one benchmark group's simulator and device histograms.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct BenchmarkAnalysis {
    pub benchmark_id: u64,
    pub transpiled_depth: u32,
    pub transpiled_width: u32,
    pub transpiled_multi_qubit_gates: u32,
    pub counts_sim: CountsHistogram,
    pub counts_real: CountsHistogram,
    #[serde(flatten)]
    pub comparison: HistogramComparison,
}

/// Analyze every complete benchmark group, ordered by `benchmark_id`.
///
/// Groups that are incomplete, not exactly a pair, or whose metrics fail are
/// skipped.
pub fn analyze_benchmarks(
    records: &[BenchmarkRecord],
    pairing: &PairingConfig,
) -> Vec<BenchmarkAnalysis> {
    let mut out = Vec::new();
    for (benchmark_id, group) in group_by_benchmark(records) {
        let Some((sim, real)) = orient(&group, pairing) else {
            continue;
        };
        match analyze_pair(benchmark_id, sim, real) {
            Ok(analysis) => out.push(analysis),
            Err(e) => log::warn!("skipping benchmark {benchmark_id}: {e}"),
        }
    }
    out
}

/// Analyze a single benchmark group.
///
/// `Ok(None)` when the group does not exist or is not yet a complete pair.
pub fn analyze_benchmark(
    records: &[BenchmarkRecord],
    benchmark_id: u64,
    pairing: &PairingConfig,
) -> Result<Option<BenchmarkAnalysis>> {
    let group: Vec<&BenchmarkRecord> = records
        .iter()
        .filter(|r| r.benchmark_id == benchmark_id)
        .collect();
    match orient(&group, pairing) {
        Some((sim, real)) => analyze_pair(benchmark_id, sim, real).map(Some),
        None => Ok(None),
    }
}

fn group_by_benchmark(records: &[BenchmarkRecord]) -> BTreeMap<u64, Vec<&BenchmarkRecord>> {
    let mut groups: BTreeMap<u64, Vec<&BenchmarkRecord>> = BTreeMap::new();
    for record in records {
        groups.entry(record.benchmark_id).or_default().push(record);
    }
    groups
}

fn orient<'a>(
    group: &[&'a BenchmarkRecord],
    pairing: &PairingConfig,
) -> Option<(&'a BenchmarkRecord, &'a BenchmarkRecord)> {
    let [a, b] = group else {
        return None;
    };
    if !a.has_result() || !b.has_result() {
        return None;
    }
    if b.ran_on(&pairing.simulator_backend) && !a.ran_on(&pairing.simulator_backend) {
        Some((*b, *a))
    } else {
        Some((*a, *b))
    }
}

fn analyze_pair(
    benchmark_id: u64,
    sim: &BenchmarkRecord,
    real: &BenchmarkRecord,
) -> Result<BenchmarkAnalysis> {
    let counts_sim = sim.counts.clone().unwrap_or_default();
    let counts_real = real.counts.clone().unwrap_or_default();
    let comparison = analyze(&counts_sim, &counts_real, real.shots)?;
    Ok(BenchmarkAnalysis {
        benchmark_id,
        transpiled_depth: real.transpiled_depth,
        transpiled_width: real.transpiled_width,
        transpiled_multi_qubit_gates: real.transpiled_multi_qubit_gates,
        counts_sim,
        counts_real,
        comparison,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(entries: &[(&str, u64)]) -> CountsHistogram {
        entries.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    fn record(benchmark_id: u64, backend: &str, hist: Option<CountsHistogram>) -> BenchmarkRecord {
        let mut r = BenchmarkRecord {
            benchmark_id,
            backend: backend.to_string(),
            shots: 1000,
            transpiled_depth: 12,
            transpiled_width: 5,
            ..Default::default()
        };
        if let Some(h) = hist {
            r.complete_with(h);
        }
        r
    }

    fn sim_hist() -> CountsHistogram {
        counts(&[("11111", 500), ("00000", 500)])
    }

    fn real_hist() -> CountsHistogram {
        counts(&[
            ("11111", 350),
            ("00000", 200),
            ("10101", 200),
            ("11100", 250),
        ])
    }

    #[test]
    fn counts_accepts_encoded_string() {
        let json = r#"{"backend": "\"ibmq_lima\"", "shots": 10, "complete": true,
                       "counts": "{\"01\": 7, \"10\": 3}"}"#;
        let r: BenchmarkRecord = serde_json::from_str(json).unwrap();
        assert_eq!(r.backend, "ibmq_lima");
        assert_eq!(r.counts.unwrap()["01"], 7);
    }

    #[test]
    fn counts_accepts_inline_object_and_empty_string() {
        let r: BenchmarkRecord =
            serde_json::from_str(r#"{"backend": "x", "counts": {"0": 1}}"#).unwrap();
        assert_eq!(r.counts.unwrap()["0"], 1);
        let r: BenchmarkRecord = serde_json::from_str(r#"{"backend": "x", "counts": ""}"#).unwrap();
        assert!(r.counts.is_none());
        let r: BenchmarkRecord = serde_json::from_str(r#"{"backend": "x"}"#).unwrap();
        assert!(r.counts.is_none());
    }

    #[test]
    fn legacy_gate_count_names() {
        let r: BenchmarkRecord = serde_json::from_str(
            r#"{"backend": "x", "transpiled_number_of_multi_qubit_gates": 4}"#,
        )
        .unwrap();
        assert_eq!(r.transpiled_multi_qubit_gates, 4);
    }

    #[test]
    fn complete_with_sets_flag() {
        let mut r = record(0, "ibmq_lima", None);
        assert!(!r.has_result());
        r.complete_with(sim_hist());
        assert!(r.complete);
        assert!(r.has_result());
    }

    #[test]
    fn pair_oriented_by_simulator_name() {
        let records = vec![
            record(3, "ibmq_lima", Some(real_hist())),
            record(3, DEFAULT_SIMULATOR_BACKEND, Some(sim_hist())),
        ];
        let out = analyze_benchmarks(&records, &PairingConfig::default());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].benchmark_id, 3);
        assert_eq!(out[0].counts_sim, sim_hist());
        assert!((out[0].comparison.histogram_intersection - 0.55).abs() < 1e-12);
    }

    #[test]
    fn incomplete_and_unpaired_groups_skipped() {
        let records = vec![
            record(1, DEFAULT_SIMULATOR_BACKEND, Some(sim_hist())),
            record(1, "ibmq_lima", None),
            record(2, DEFAULT_SIMULATOR_BACKEND, Some(sim_hist())),
            record(4, DEFAULT_SIMULATOR_BACKEND, Some(sim_hist())),
            record(4, "ibmq_lima", Some(real_hist())),
        ];
        let out = analyze_benchmarks(&records, &PairingConfig::default());
        assert_eq!(out.iter().map(|a| a.benchmark_id).collect::<Vec<_>>(), vec![4]);
    }

    #[test]
    fn failing_pair_skipped_not_fatal() {
        let records = vec![
            record(1, DEFAULT_SIMULATOR_BACKEND, Some(counts(&[("0", 0), ("1", 10)]))),
            record(1, "ibmq_lima", Some(counts(&[("0", 5), ("1", 5)]))),
            record(2, DEFAULT_SIMULATOR_BACKEND, Some(sim_hist())),
            record(2, "ibmq_lima", Some(real_hist())),
        ];
        let out = analyze_benchmarks(&records, &PairingConfig::default());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].benchmark_id, 2);
        assert!(analyze_benchmark(&records, 1, &PairingConfig::default()).is_err());
    }

    #[test]
    fn single_benchmark_lookup() {
        let records = vec![
            record(7, DEFAULT_SIMULATOR_BACKEND, Some(sim_hist())),
            record(7, "ibmq_lima", Some(real_hist())),
        ];
        let pairing = PairingConfig::default();
        assert!(analyze_benchmark(&records, 7, &pairing).unwrap().is_some());
        assert!(analyze_benchmark(&records, 8, &pairing).unwrap().is_none());
    }

    #[test]
    fn analysis_serializes_flat() {
        let records = vec![
            record(7, DEFAULT_SIMULATOR_BACKEND, Some(sim_hist())),
            record(7, "ibmq_lima", Some(real_hist())),
        ];
        let out = analyze_benchmarks(&records, &PairingConfig::default());
        let json = serde_json::to_value(&out[0]).unwrap();
        assert_eq!(json["benchmark-id"], 7);
        assert_eq!(json["transpiled-width"], 5);
        assert!(json.get("chi-square").is_some());
        assert!(json.get("counts-real").is_some());
    }

    #[test]
    fn normalize_strips_quotes() {
        assert_eq!(normalize_backend("\"ibmq_lima\""), "ibmq_lima");
        assert_eq!(normalize_backend(" ibmq_lima "), "ibmq_lima");
        assert_eq!(normalize_backend("\""), "\"");
    }
}
