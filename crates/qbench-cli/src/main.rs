//! CLI for qbench: compare simulator and device histograms, score backends.

mod commands;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "qbench")]
#[command(about = "qbench: how far does a quantum device drift from the simulator?")]
#[command(version = qbench_core::VERSION)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Overrides for the wd grid thresholds.
#[derive(Args, Clone, Debug, Default)]
pub struct WdArgs {
    /// Depth band width in layers
    #[arg(long)]
    depth_band: Option<u32>,

    /// Last depth band index (collects all deeper circuits)
    #[arg(long)]
    max_depth_band: Option<usize>,

    /// Widest circuit tracked, in qubits
    #[arg(long)]
    max_width: Option<usize>,

    /// Samples kept per grid cell
    #[arg(long)]
    sample_cap: Option<usize>,

    /// Minimum mode share for one execution to succeed (0-1)
    #[arg(long)]
    success_threshold: Option<f64>,

    /// Minimum fraction of successful samples for a cell (0-1)
    #[arg(long)]
    class_fraction: Option<f64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare a simulator histogram with a device histogram.
    /// Prints percentage error, correlation, chi-square distance and intersection.
    Compare {
        /// JSON file with the simulator counts ({"00101": 12, ...})
        #[arg(long)]
        sim: String,

        /// JSON file with the device counts
        #[arg(long)]
        real: String,

        /// Shot count (default: total of the device counts)
        #[arg(long)]
        shots: Option<u64>,

        /// Write the result JSON to a file instead of stdout
        #[arg(long)]
        output: Option<String>,
    },

    /// Compare every complete simulator/device benchmark pair in a records file
    Analyze {
        /// JSON array of benchmark records
        #[arg(long)]
        records: String,

        /// Backend used as the reference side of each pair
        #[arg(long, default_value = qbench_core::DEFAULT_SIMULATOR_BACKEND)]
        simulator: String,

        /// Write the result JSON to a file instead of stdout
        #[arg(long)]
        output: Option<String>,
    },

    /// Compute the wd-value of a backend from its clifford benchmark records
    Wd {
        /// JSON array of benchmark records
        #[arg(long)]
        records: String,

        /// Backend (QPU) name
        #[arg(long)]
        backend: String,

        #[command(flatten)]
        wd: WdArgs,

        /// Write the result JSON to a file instead of stdout
        #[arg(long)]
        output: Option<String>,
    },

    /// Type a raw parameter payload ({"name": {"rawValue": "9", "type": "Integer"}})
    Params {
        /// JSON file with the raw parameters
        #[arg(long)]
        input: String,
    },

    /// Start the HTTP analysis server
    Server {
        /// Port to listen on
        #[arg(long, default_value_t = qbench_server::DEFAULT_PORT)]
        port: u16,

        /// Bind address
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// JSON array of benchmark records to seed the store with
        #[arg(long)]
        records: Option<String>,

        /// Backend used as the reference side of each pair
        #[arg(long, default_value = qbench_core::DEFAULT_SIMULATOR_BACKEND)]
        simulator: String,

        #[command(flatten)]
        wd: WdArgs,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Compare {
            sim,
            real,
            shots,
            output,
        } => commands::compare::run(&sim, &real, shots, output.as_deref()),
        Commands::Analyze {
            records,
            simulator,
            output,
        } => commands::analyze::run(&records, &simulator, output.as_deref()),
        Commands::Wd {
            records,
            backend,
            wd,
            output,
        } => commands::wd::run(&records, &backend, &wd, output.as_deref()),
        Commands::Params { input } => commands::params::run(&input),
        Commands::Server {
            port,
            host,
            records,
            simulator,
            wd,
        } => commands::server::run(&host, port, records.as_deref(), &simulator, &wd),
    }
}
