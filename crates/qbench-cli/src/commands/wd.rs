use crate::WdArgs;

pub fn run(records_path: &str, backend: &str, args: &WdArgs, output_path: Option<&str>) {
    let records = super::load_records_or_exit(records_path);
    let config = super::wd_config(args);
    let report = qbench_core::compute_wd(backend, &records, &config);

    let samples: usize = report.data_count.iter().flatten().sum();
    if samples == 0 {
        log::warn!("no completed clifford records for {backend}; wd is 0");
    }

    let json = serde_json::json!({
        "config": config,
        "report": report,
    });
    super::emit(&json, output_path);
}
