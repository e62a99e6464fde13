//! # qbench-core
//!
//! **How far does a quantum device drift from the simulator?**
//!
//! `qbench-core` is the analysis core of a quantum benchmarking service. It
//! compares measurement histograms from a simulator and a real backend, scores
//! each backend with a monotone reliability value (the *wd-value*), and types
//! user-supplied circuit parameters.
//!
//! ## Quick Start
//!
//! ```
//! use qbench_core::{CountsHistogram, analyze};
//!
//! let sim: CountsHistogram = [("11111".to_string(), 500), ("00000".to_string(), 500)].into();
//! let real: CountsHistogram = [
//!     ("11111".to_string(), 350),
//!     ("00000".to_string(), 200),
//!     ("10101".to_string(), 200),
//!     ("11100".to_string(), 250),
//! ]
//! .into();
//!
//! let cmp = analyze(&sim, &real, 1000).unwrap();
//! assert!((cmp.histogram_intersection - 0.55).abs() < 1e-12);
//! ```
//!
//! ## Architecture
//!
//! Records → pairs by benchmark group → [`comparator`] metrics
//!
//! Records → per-backend [`wd::SuccessGrid`] → wd-value
//!
//! Everything here is pure and synchronous. Storage, job queues and provider
//! SDKs belong to the callers.

pub mod benchmark;
pub mod comparator;
pub mod error;
pub mod histogram;
pub mod parameters;
pub mod wd;

pub use benchmark::{
    BenchmarkAnalysis, BenchmarkRecord, DEFAULT_SIMULATOR_BACKEND, PairingConfig,
    analyze_benchmark, analyze_benchmarks, load_records, normalize_backend,
};
pub use comparator::{
    HistogramComparison, analyze, chi_square_distance, correlation, histogram_intersection,
    percentage_error,
};
pub use error::{QbenchError, Result};
pub use histogram::{
    CountsHistogram, Distribution, expected_value, mode, probabilities,
    standard_deviation, total_shots,
};
pub use parameters::{
    ParameterDictionary, ParameterType, TypedValue, type_parameter, type_parameters,
};
pub use wd::{GridCell, SuccessGrid, WdConfig, WdReport, compute_wd};

/// Library version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
