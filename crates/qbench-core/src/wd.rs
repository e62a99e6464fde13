//! The wd-value: the largest width × depth a backend executes reliably.
//!
//! Completed clifford benchmark records for one backend are bucketed into a
//! fixed grid indexed by (depth band, width). A record succeeds when its most
//! frequent outcome holds at least `success_threshold` of the shots; a cell
//! succeeds when at least `class_success_fraction` of its samples succeed.
//!
//! Every cell is scored `depth_midpoint × width`. A failing cell invalidates
//! every cell scoring at least as much as it does, so the reported wd is
//! monotone: a larger circuit class is never trusted once a smaller one fails.
//!
//! The record criterion only looks at the empirical mode of the histogram. It
//! does not compare against an ideal expected histogram, which is why all the
//! thresholds live in [`WdConfig`] instead of being hard-coded.

use serde::{Deserialize, Serialize};

use crate::benchmark::BenchmarkRecord;
use crate::histogram::{CountsHistogram, mode};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Grid geometry and success thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WdConfig {
    /// Width of one depth band in layers.
    pub depth_band: u32,
    /// Last band index; it collects every deeper circuit.
    pub max_depth_band: usize,
    /// Widest circuit (in qubits) the grid tracks.
    pub max_width: usize,
    /// Samples kept per cell; later records for a full cell are ignored.
    pub sample_cap: usize,
    /// Minimum mode share for a single record to count as successful.
    pub success_threshold: f64,
    /// Minimum fraction of successful samples for a cell to succeed.
    pub class_success_fraction: f64,
}

impl Default for WdConfig {
    fn default() -> Self {
        Self {
            depth_band: 5,
            max_depth_band: 6,
            max_width: 5,
            sample_cap: 15,
            success_threshold: 0.75,
            class_success_fraction: 2.0 / 3.0,
        }
    }
}

impl WdConfig {
    fn band_width(&self) -> u32 {
        self.depth_band.max(1)
    }

    /// Depth band a transpiled depth falls into.
    pub fn band_of(&self, depth: u32) -> usize {
        ((depth / self.band_width()) as usize).min(self.max_depth_band)
    }

    /// Midpoint depth of a band, the depth factor of its score.
    pub fn band_midpoint(&self, band: usize) -> f64 {
        let w = self.band_width() as f64;
        band as f64 * w + w / 2.0
    }
}

// ---------------------------------------------------------------------------
// Grid
// ---------------------------------------------------------------------------

/// Sample and success tally of one (depth band, width) cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridCell {
    pub samples: usize,
    pub successes: usize,
}

impl GridCell {
    /// successes / samples, 0 for an empty cell.
    pub fn success_rate(&self) -> f64 {
        if self.samples == 0 {
            0.0
        } else {
            self.successes as f64 / self.samples as f64
        }
    }
}

/// Success tallies for one backend, rebuilt on every query.
#[derive(Debug, Clone, PartialEq)]
pub struct SuccessGrid {
    config: WdConfig,
    /// Indexed `[depth_band][width - 1]`.
    cells: Vec<Vec<GridCell>>,
}

impl SuccessGrid {
    pub fn new(config: WdConfig) -> Self {
        let cells = vec![vec![GridCell::default(); config.max_width]; config.max_depth_band + 1];
        Self { config, cells }
    }

    /// Build the grid from every record that ran on `backend`.
    pub fn from_records(backend: &str, records: &[BenchmarkRecord], config: WdConfig) -> Self {
        let mut grid = Self::new(config);
        let accepted = records
            .iter()
            .filter(|r| r.ran_on(backend))
            .filter(|r| grid.add(r))
            .count();
        log::debug!("wd grid for {backend}: {accepted} of {} records used", records.len());
        grid
    }

    pub fn cells(&self) -> &[Vec<GridCell>] {
        &self.cells
    }

    /// Tally one record. Returns false when the record is not usable or its
    /// cell is already full.
    pub fn add(&mut self, record: &BenchmarkRecord) -> bool {
        if !record.complete || !record.clifford || record.shots == 0 {
            return false;
        }
        let Some(counts) = record.counts.as_ref() else {
            log::debug!("record {} is complete but has no counts", record.id);
            return false;
        };
        let width = record.transpiled_width as usize;
        if width == 0 || width > self.config.max_width {
            log::debug!("record {} width {width} outside grid", record.id);
            return false;
        }
        let band = self.config.band_of(record.transpiled_depth);
        let cap = self.config.sample_cap;
        let success = is_successful(counts, record.shots, self.config.success_threshold);

        let cell = &mut self.cells[band][width - 1];
        if cell.samples >= cap {
            return false;
        }
        cell.samples += 1;
        if success {
            cell.successes += 1;
        }
        true
    }

    /// Whether the cell's success rate reaches the class threshold.
    pub fn is_class_successful(&self, band: usize, width_index: usize) -> bool {
        self.cells[band][width_index].success_rate() >= self.config.class_success_fraction
    }

    /// depth_midpoint × width for every cell, ignoring outcomes.
    pub fn raw_scores(&self) -> Vec<Vec<f64>> {
        (0..self.cells.len())
            .map(|band| {
                let depth = self.config.band_midpoint(band);
                (0..self.config.max_width)
                    .map(|w| depth * (w + 1) as f64)
                    .collect()
            })
            .collect()
    }

    /// Scores that survive both the class threshold and the dominance sweep.
    pub fn masked_scores(&self) -> Vec<Vec<f64>> {
        let raw = self.raw_scores();
        let mut masked = raw.clone();
        let mut failing = Vec::new();
        for (band, row) in masked.iter_mut().enumerate() {
            for (w, score) in row.iter_mut().enumerate() {
                if !self.is_class_successful(band, w) {
                    failing.push(raw[band][w]);
                    *score = 0.0;
                }
            }
        }
        for failed in failing {
            for score in masked.iter_mut().flatten() {
                if *score >= failed {
                    *score = 0.0;
                }
            }
        }
        masked
    }

    /// Largest surviving score, 0 when nothing survives.
    pub fn wd(&self) -> f64 {
        self.masked_scores()
            .into_iter()
            .flatten()
            .fold(0.0, f64::max)
    }

    /// Sample counts per cell.
    pub fn data_count(&self) -> Vec<Vec<usize>> {
        self.map_cells(|c| c.samples)
    }

    /// Success counts per cell.
    pub fn success_count(&self) -> Vec<Vec<usize>> {
        self.map_cells(|c| c.successes)
    }

    fn map_cells<T>(&self, f: impl Fn(&GridCell) -> T) -> Vec<Vec<T>> {
        self.cells
            .iter()
            .map(|row| row.iter().map(&f).collect())
            .collect()
    }
}

/// Mode share of a single execution against the threshold.
fn is_successful(counts: &CountsHistogram, shots: u64, threshold: f64) -> bool {
    match mode(counts) {
        Some((_, top)) => top as f64 / shots as f64 >= threshold,
        None => false,
    }
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// wd-value plus the per-cell tallies it was derived from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct WdReport {
    pub backend: String,
    pub wd: f64,
    /// Samples per cell, indexed `[depth_band][width - 1]`.
    pub data_count: Vec<Vec<usize>>,
    pub success_count: Vec<Vec<usize>>,
}

/// Compute the wd-value of `backend` from all stored records.
pub fn compute_wd(backend: &str, records: &[BenchmarkRecord], config: &WdConfig) -> WdReport {
    let grid = SuccessGrid::from_records(backend, records, config.clone());
    WdReport {
        backend: crate::benchmark::normalize_backend(backend).to_string(),
        wd: grid.wd(),
        data_count: grid.data_count(),
        success_count: grid.success_count(),
    }
}
