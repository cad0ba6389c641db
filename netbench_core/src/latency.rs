// Latency stage: per-echo round trips plus ping's closing statistics block

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use tracing::{debug, info};

use crate::config::{ParseMode, RunConfig};
use crate::error::NetbenchError;
use crate::metrics::{LatencyEcho, LatencyRun, LatencySummary};
use crate::parse::{number, ParseError};
use crate::progress::ProgressTicker;
use crate::runner::run_command;

static ECHO_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"icmp_seq=(\d+)\s+ttl=(\d+)\s+time=([\d.]+)\s*ms").expect("echo pattern is valid")
});

// Linux: "3 packets transmitted, 3 received, 0% packet loss, time 2003ms"
//        "rtt min/avg/max/mdev = 0.045/0.052/0.061/0.006 ms"
// BSD:   "3 packets transmitted, 3 packets received, 0.0% packet loss"
//        "round-trip min/avg/max/stddev = 0.045/0.052/0.061/0.006 ms"
static SUMMARY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"(\d+) packets transmitted, (\d+) (?:packets )?received,(?: \+\d+ \w+,)* ([\d.]+)% packet loss",
        r"(?:, time (\d+)ms)?[^\n]*\r?\n",
        r"(?:rtt|round-trip) min/avg/max/(?:mdev|stddev) = ([\d.]+)/([\d.]+)/([\d.]+)/([\d.]+) ms",
    ))
    .expect("summary pattern is valid")
});

/// Arguments for `ping -c <count> <target>`.
pub fn latency_args(config: &RunConfig) -> Vec<String> {
    vec![
        "-c".to_string(),
        config.echo_count.to_string(),
        config.target.clone(),
    ]
}

pub async fn run_latency_test(config: &RunConfig) -> Result<LatencyRun, NetbenchError> {
    let args = latency_args(config);
    let ticker = config
        .show_progress
        .then(|| ProgressTicker::start("ping", config.latency_ticks(), config.tick_interval()));

    let output = run_command(&config.latency_bin, &args, ticker).await?;
    info!(program = %config.latency_bin.display(), "ping exec success");

    let run = parse_latency_output(&output, config.parse_mode)?;
    info!(
        echoes = run.echoes.len(),
        transmitted = run.summary.transmitted,
        received = run.summary.received,
        loss_percent = run.summary.loss_percent,
        "latency echoes collected"
    );
    Ok(run)
}

/// Parses the complete stdout of a ping run.
///
/// Echo lines are strict: a captured value that does not convert is an
/// error. The statistics block is lenient in [`ParseMode::Compatible`]:
/// when it cannot be found the summary is left zeroed.
pub fn parse_latency_output(output: &str, mode: ParseMode) -> Result<LatencyRun, ParseError> {
    let mut run = LatencyRun::default();

    for line in output.lines() {
        if let Some(caps) = ECHO_LINE.captures(line) {
            run.echoes.push(LatencyEcho {
                seq: number("icmp_seq", &caps[1])?,
                ttl: number("ttl", &caps[2])?,
                time_ms: number("time", &caps[3])?,
            });
        }
    }

    match SUMMARY.captures(output) {
        Some(caps) => run.summary = summary_from(&caps)?,
        None if mode == ParseMode::Strict => return Err(ParseError::MissingSummary),
        None => debug!("no latency summary in ping output; leaving it zeroed"),
    }

    Ok(run)
}

fn summary_from(caps: &Captures<'_>) -> Result<LatencySummary, ParseError> {
    let elapsed_ms = match caps.get(4) {
        Some(m) => number("time", m.as_str())?,
        None => 0,
    };
    Ok(LatencySummary {
        transmitted: number("transmitted", &caps[1])?,
        received: number("received", &caps[2])?,
        loss_percent: number("loss", &caps[3])?,
        elapsed_ms,
        min_ms: number("min", &caps[5])?,
        avg_ms: number("avg", &caps[6])?,
        max_ms: number("max", &caps[7])?,
        stddev_ms: number("mdev", &caps[8])?,
    })
}
