// Cosmetic progress bar drawn while an external tool runs.
// It only writes to stderr and never feeds back into a measurement.

use std::io::Write;
use std::time::Duration;

use tokio::task::JoinHandle;

const BAR_WIDTH: usize = 40;

pub struct ProgressTicker {
    label: &'static str,
    total_ticks: u64,
    handle: JoinHandle<()>,
}

impl ProgressTicker {
    /// Spawns the ticker on the current tokio runtime.
    pub fn start(label: &'static str, total_ticks: u64, tick: Duration) -> Self {
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(tick);
            interval.tick().await; // first tick completes immediately
            for done in 1..=total_ticks {
                interval.tick().await;
                draw(&render(label, done, total_ticks));
            }
        });
        ProgressTicker { label, total_ticks, handle }
    }

    /// Stops the ticker and leaves a completed bar on its own line.
    pub fn finish(self) {
        self.handle.abort();
        draw(&render(self.label, self.total_ticks, self.total_ticks));
        eprintln!();
    }
}

fn draw(bar: &str) {
    let mut stderr = std::io::stderr();
    let _ = write!(stderr, "\r{}", bar);
    let _ = stderr.flush();
}

/// Renders a single bar, e.g. `iperf [##########----------]  50%`.
pub fn render(label: &str, done: u64, total: u64) -> String {
    let ratio = if total == 0 { 1.0 } else { (done.min(total) as f64) / total as f64 };
    let filled = (ratio * BAR_WIDTH as f64).round() as usize;
    format!(
        "{} [{}{}] {:>3}%",
        label,
        "#".repeat(filled),
        "-".repeat(BAR_WIDTH - filled),
        (ratio * 100.0).round() as u64
    )
}
