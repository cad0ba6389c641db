// Run configuration structures

use std::path::PathBuf;
use std::time::Duration;

/// Progress ticks drawn per second while a tool runs.
pub const PROGRESS_TICK_HZ: u32 = 10;

/// How strictly tool output is interpreted.
///
/// `Compatible` keeps two long-standing quirks of the CSV this tool has always
/// produced: the `Err` column repeats the `Write` count, and a latency summary
/// that cannot be found is reported as all zeroes. `Strict` reads the error
/// count from its own column and fails when the summary is missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParseMode {
    #[default]
    Compatible,
    Strict,
}

#[derive(Debug, Clone)]
pub struct RunConfig {
    pub target: String,
    pub bandwidth_bin: PathBuf, // iperf (2.x, enhanced reports)
    pub latency_bin: PathBuf,   // ping
    pub duration_secs: u64,
    pub interval_secs: u64,
    pub echo_count: u32,
    pub output: PathBuf,
    pub json_output: Option<PathBuf>,
    pub parse_mode: ParseMode,
    pub show_progress: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            target: "0.0.0.0".to_string(),
            bandwidth_bin: PathBuf::from("iperf"),
            latency_bin: PathBuf::from("ping"),
            duration_secs: 30,
            interval_secs: 1,
            echo_count: 10,
            output: PathBuf::from("netbench.csv"),
            json_output: None,
            parse_mode: ParseMode::Compatible,
            show_progress: true,
        }
    }
}

impl RunConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / PROGRESS_TICK_HZ as f64)
    }

    /// Ticks for the bandwidth stage, which runs for `duration_secs`.
    pub fn bandwidth_ticks(&self) -> u64 {
        self.duration_secs * PROGRESS_TICK_HZ as u64
    }

    /// Ticks for the latency stage; ping sends one echo per second by default.
    pub fn latency_ticks(&self) -> u64 {
        self.echo_count as u64 * PROGRESS_TICK_HZ as u64
    }
}
