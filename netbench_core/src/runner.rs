// runner.rs
use crate::bandwidth::run_bandwidth_test;
use crate::config::RunConfig;
use crate::error::NetbenchError;
use crate::latency::run_latency_test;
use crate::progress::ProgressTicker;
use crate::reporter::{write_csv_report, write_json_report, MeasurementReport};
use std::path::Path;
use std::process::Stdio;
use std::time::SystemTime;
use tokio::process::Command;
use tracing::{debug, info};

/// Runs `program` to completion and returns its stdout.
///
/// Blocks (asynchronously) until the process exits; there is no timeout, so
/// the tool's own duration flag is what bounds the call. A non-zero exit is
/// an error carrying the tool's stderr.
pub async fn run_command(
    program: &Path,
    args: &[String],
    progress: Option<ProgressTicker>,
) -> Result<String, NetbenchError> {
    let name = program.display().to_string();
    debug!(program = %name, ?args, "spawning");

    let mut cmd = Command::new(program);
    cmd.args(args);
    cmd.stdin(Stdio::null());
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());
    cmd.kill_on_drop(true);

    let result = cmd.output().await;

    if let Some(ticker) = progress {
        ticker.finish();
    }

    let output = result.map_err(|source| NetbenchError::Launch { program: name.clone(), source })?;
    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();

    if !output.status.success() {
        return Err(NetbenchError::ExitStatus {
            program: name,
            status: output.status,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    debug!(program = %name, "raw output:\n{}", stdout);
    Ok(stdout)
}

// --- Main Dispatch Function ---

/// Runs the bandwidth stage, then the latency stage.
///
/// Stages are strictly sequential and any failure aborts the run before
/// anything is written.
pub async fn run_measurements(config: &RunConfig) -> Result<MeasurementReport, NetbenchError> {
    info!(
        host = %config.target,
        duration_secs = config.duration_secs,
        interval_secs = config.interval_secs,
        echo_count = config.echo_count,
        "starting measurement"
    );
    let started_at = humantime::format_rfc3339_seconds(SystemTime::now()).to_string();

    let bandwidth = run_bandwidth_test(config).await?;
    let latency = run_latency_test(config).await?;

    Ok(MeasurementReport {
        target: config.target.clone(),
        started_at,
        finished_at: humantime::format_rfc3339_seconds(SystemTime::now()).to_string(),
        bandwidth,
        echo_average_ms: latency.average_echo_ms(),
        latency,
    })
}

/// Measures and then writes the CSV report (and the JSON export, if asked).
pub async fn run(config: &RunConfig) -> Result<MeasurementReport, NetbenchError> {
    let report = run_measurements(config).await?;

    write_csv_report(&config.output, &report)?;
    info!(path = %config.output.display(), "stats saved");

    if let Some(json_path) = &config.json_output {
        write_json_report(json_path, &report)?;
        info!(path = %json_path.display(), "json export saved");
    }

    Ok(report)
}
