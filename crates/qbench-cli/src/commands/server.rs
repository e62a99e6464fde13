use std::path::PathBuf;

use qbench_core::PairingConfig;
use qbench_server::ServerConfig;

use crate::WdArgs;

pub fn run(host: &str, port: u16, records_path: Option<&str>, simulator: &str, wd: &WdArgs) {
    let records = records_path
        .map(super::load_records_or_exit)
        .unwrap_or_default();

    let config = ServerConfig {
        host: host.to_string(),
        port,
        records_path: records_path.map(PathBuf::from),
        wd: super::wd_config(wd),
        pairing: PairingConfig {
            simulator_backend: simulator.to_string(),
        },
    };

    let base = format!("http://{host}:{port}");
    println!("qbench server v{}", qbench_core::VERSION);
    println!("   {base}");
    println!("   {} benchmark records loaded", records.len());
    println!();
    println!("   Endpoints:");
    println!("     GET  /                              API index");
    println!("     GET  /health                        Record counts");
    println!("     GET  /api/v1/analysis               Compare all benchmark pairs");
    println!("     GET  /api/v1/benchmarks/<id>        Compare one benchmark pair");
    println!("     POST /api/v1/benchmarks             Store or complete a record");
    println!("     GET  /api/v1/calc-wd/<qpu>          wd-value of a backend");
    println!("     POST /api/v1/compare                Metrics for two histograms");
    println!("     POST /api/v1/parameters             Type raw parameters");
    println!();
    println!("   Examples:");
    println!("     curl {base}/api/v1/calc-wd/ibmq_lima");
    println!("     curl -X POST {base}/api/v1/compare -H 'content-type: application/json' \\");
    println!("          -d '{{\"counts-sim\": {{\"0\": 512, \"1\": 512}}, \"counts-real\": {{\"0\": 480, \"1\": 544}}}}'");
    println!();

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => super::fail(e),
    };
    if let Err(e) = rt.block_on(qbench_server::run_server(records, config)) {
        super::fail(format!("server stopped: {e}"));
    }
}
