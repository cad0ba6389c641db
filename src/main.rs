use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use netbench_core::{ParseMode, RunConfig};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Runs iperf and ping against a target and saves the parsed stats as CSV")]
struct Cli {
    /// Seconds the bandwidth test runs for.
    #[arg(short = 't', long = "time", default_value_t = 30)]
    time: u64,

    /// Seconds between bandwidth interval reports.
    #[arg(short = 'i', long = "interval", default_value_t = 1)]
    interval: u64,

    /// iperf binary path.
    #[arg(long, default_value = "iperf")]
    iperf_bin: PathBuf,

    /// ping binary path.
    #[arg(long, default_value = "ping")]
    ping_bin: PathBuf,

    /// Number of echo requests ping sends.
    #[arg(short = 'n', long = "count", default_value_t = 10, value_parser = clap::value_parser!(u32).range(1..))]
    count: u32,

    /// Target address to measure against.
    #[arg(short = 'c', long = "ip", default_value = "0.0.0.0")]
    ip: String,

    /// Output CSV file. Defaults to netbench_<YYYYMMDD>_<HHMMSS>.csv.
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Also write the full run as JSON to this path.
    #[arg(long)]
    json: Option<PathBuf>,

    /// Read the Err column from iperf's own error count and fail when ping prints no summary.
    #[arg(long, action = clap::ArgAction::SetTrue)]
    strict: bool,

    /// Do not draw progress bars while the tools run.
    #[arg(long, action = clap::ArgAction::SetTrue)]
    no_progress: bool,
}

impl From<Cli> for RunConfig {
    fn from(cli: Cli) -> Self {
        RunConfig {
            target: cli.ip,
            bandwidth_bin: cli.iperf_bin,
            latency_bin: cli.ping_bin,
            duration_secs: cli.time,
            interval_secs: cli.interval,
            echo_count: cli.count,
            output: cli.output.unwrap_or_else(default_output),
            json_output: cli.json,
            parse_mode: if cli.strict { ParseMode::Strict } else { ParseMode::Compatible },
            show_progress: !cli.no_progress && std::io::stderr().is_terminal(),
        }
    }
}

fn default_output() -> PathBuf {
    PathBuf::from(format!("netbench_{}.csv", chrono::Local::now().format("%Y%m%d_%H%M%S")))
}

fn init_tracing() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))?;
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_tracing() {
        eprintln!("Failed to initialise logging: {:#}", e);
    }

    let config = RunConfig::from(cli);

    match netbench_core::runner::run(&config).await {
        Ok(report) => {
            println!(
                "{} intervals and {} echoes saved to {}",
                report.bandwidth.len(),
                report.latency.echoes.len(),
                config.output.display()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            // Diagnostics go to stdout alongside the rest of the run's output.
            println!("{}", e);
            ExitCode::from(e.exit_code())
        }
    }
}
