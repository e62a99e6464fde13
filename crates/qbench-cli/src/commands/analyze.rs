use qbench_core::PairingConfig;

pub fn run(records_path: &str, simulator: &str, output_path: Option<&str>) {
    let records = super::load_records_or_exit(records_path);
    let pairing = PairingConfig {
        simulator_backend: simulator.to_string(),
    };
    let analyses = qbench_core::analyze_benchmarks(&records, &pairing);
    log::info!(
        "{} of {} records formed {} complete benchmark pairs",
        records.iter().filter(|r| r.has_result()).count(),
        records.len(),
        analyses.len()
    );

    match serde_json::to_value(&analyses) {
        Ok(json) => super::emit(&json, output_path),
        Err(e) => super::fail(e),
    }
}
