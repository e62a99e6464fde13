pub mod analyze;
pub mod compare;
pub mod params;
pub mod server;
pub mod wd;

use std::path::Path;

use serde_json::Value;

use qbench_core::{BenchmarkRecord, WdConfig};

use crate::WdArgs;

/// Print an error and exit non-zero.
pub fn fail(msg: impl std::fmt::Display) -> ! {
    eprintln!("Error: {msg}");
    std::process::exit(1);
}

/// Read a JSON file into any deserializable type.
pub fn read_json<T: serde::de::DeserializeOwned>(path: &str) -> Result<T, String> {
    let text = std::fs::read_to_string(path).map_err(|e| format!("cannot read {path}: {e}"))?;
    serde_json::from_str(&text).map_err(|e| format!("{path} is not valid JSON: {e}"))
}

/// Load benchmark records or exit.
pub fn load_records_or_exit(path: &str) -> Vec<BenchmarkRecord> {
    qbench_core::load_records(Path::new(path)).unwrap_or_else(|e| fail(e))
}

/// Pretty-print JSON to stdout, or write it to `output_path`.
pub fn emit(json: &Value, output_path: Option<&str>) {
    let text = match serde_json::to_string_pretty(json) {
        Ok(t) => t,
        Err(e) => fail(e),
    };
    match output_path {
        Some(path) => match std::fs::write(path, text) {
            Ok(()) => log::info!("wrote {path}"),
            Err(e) => fail(format!("cannot write {path}: {e}")),
        },
        None => println!("{text}"),
    }
}

/// Apply CLI overrides on top of the default wd configuration.
pub fn wd_config(args: &WdArgs) -> WdConfig {
    let mut config = WdConfig::default();
    if let Some(v) = args.depth_band {
        config.depth_band = v;
    }
    if let Some(v) = args.max_depth_band {
        config.max_depth_band = v;
    }
    if let Some(v) = args.max_width {
        config.max_width = v;
    }
    if let Some(v) = args.sample_cap {
        config.sample_cap = v;
    }
    if let Some(v) = args.success_threshold {
        config.success_threshold = v;
    }
    if let Some(v) = args.class_fraction {
        config.class_success_fraction = v;
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_wd_config_defaults() {
        assert_eq!(wd_config(&WdArgs::default()), WdConfig::default());
    }

    #[test]
    fn test_wd_config_overrides() {
        let args = WdArgs {
            max_width: Some(7),
            success_threshold: Some(0.9),
            ..WdArgs::default()
        };
        let config = wd_config(&args);
        assert_eq!(config.max_width, 7);
        assert_eq!(config.success_threshold, 0.9);
        assert_eq!(config.sample_cap, WdConfig::default().sample_cap);
    }

    #[test]
    fn test_read_json_counts() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(br#"{"01": 3, "10": 5}"#).unwrap();
        let counts: qbench_core::CountsHistogram =
            read_json(file.path().to_str().unwrap()).unwrap();
        assert_eq!(qbench_core::total_shots(&counts), 8);
    }

    #[test]
    fn test_read_json_errors_name_path() {
        let err = read_json::<Value>("/nonexistent/qbench.json").unwrap_err();
        assert!(err.contains("/nonexistent/qbench.json"));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"[1, 2").unwrap();
        let path = file.path().to_str().unwrap().to_string();
        let err = read_json::<Value>(&path).unwrap_err();
        assert!(err.contains("not valid JSON"));
    }
}
