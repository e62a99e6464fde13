use qbench_core::CountsHistogram;

pub fn run(sim_path: &str, real_path: &str, shots: Option<u64>, output_path: Option<&str>) {
    let sim: CountsHistogram = super::read_json(sim_path).unwrap_or_else(|e| super::fail(e));
    let real: CountsHistogram = super::read_json(real_path).unwrap_or_else(|e| super::fail(e));
    let shots = shots.unwrap_or_else(|| qbench_core::total_shots(&real));

    let comparison = match qbench_core::analyze(&sim, &real, shots) {
        Ok(c) => c,
        Err(e) => super::fail(e),
    };
    if comparison.correlation.is_none() {
        log::warn!("correlation undefined: one histogram is flat around shots/outcomes");
    }

    let json = serde_json::json!({
        "shots": shots,
        "outcomes-sim": sim.len(),
        "outcomes-real": real.len(),
        "comparison": comparison,
    });
    super::emit(&json, output_path);
}
