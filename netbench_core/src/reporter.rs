// Report output: the three-table CSV and an optional JSON export

use crate::error::NetbenchError;
use crate::metrics::{BandwidthInterval, LatencyRun};
use csv::{QuoteStyle, WriterBuilder};
use serde::Serialize;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

pub const BANDWIDTH_HEADER: [&str; 11] = [
    "Interval", "Transfer", "TransferUnit", "Bandwidth", "BandwidthUnit", "Write", "Err", "Rtry", "Cwnd", "RTT",
    "NetPwr",
];
pub const LATENCY_SUMMARY_HEADER: [&str; 8] = ["Transmitted", "Received", "Loss", "Time", "Min", "Avg", "Max", "Mdev"];
pub const LATENCY_ECHO_HEADER: [&str; 3] = ["Seq", "TTL", "Time"];

#[derive(Debug, Clone, Serialize)]
pub struct MeasurementReport {
    pub target: String,
    pub started_at: String,  // RFC 3339
    pub finished_at: String, // RFC 3339
    pub bandwidth: Vec<BandwidthInterval>,
    pub latency: LatencyRun,
    // Mean of the parsed echoes; JSON only, the CSV keeps ping's own summary.
    pub echo_average_ms: Option<f64>,
}

fn ensure_parent(path: &Path) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

fn create_report_file(path: &Path) -> Result<BufWriter<File>, NetbenchError> {
    let create_err = |source| NetbenchError::ReportCreate { path: path.to_path_buf(), source };
    ensure_parent(path).map_err(create_err)?;
    let file = File::create(path).map_err(create_err)?;
    Ok(BufWriter::new(file))
}

/// Creates (or truncates) `path` and writes the CSV report to it.
pub fn write_csv_report(path: &Path, report: &MeasurementReport) -> Result<(), NetbenchError> {
    let mut out = create_report_file(path)?;
    write_csv_tables(&mut out, report)
        .and_then(|_| out.flush())
        .map_err(|source| NetbenchError::ReportWrite { path: path.to_path_buf(), source })
}

/// Writes the interval table, the latency summary row and the echo table,
/// separated by blank lines. Floats use six decimals and nothing is quoted.
pub fn write_csv_tables<W: Write>(out: &mut W, report: &MeasurementReport) -> io::Result<()> {
    write_table(&mut *out, &BANDWIDTH_HEADER, report.bandwidth.iter().map(bandwidth_row))?;
    out.write_all(b"\n")?;

    let s = &report.latency.summary;
    let summary_row = vec![
        s.transmitted.to_string(),
        s.received.to_string(),
        format!("{:.6}", s.loss_percent),
        s.elapsed_ms.to_string(),
        format!("{:.6}", s.min_ms),
        format!("{:.6}", s.avg_ms),
        format!("{:.6}", s.max_ms),
        format!("{:.6}", s.stddev_ms),
    ];
    write_table(&mut *out, &LATENCY_SUMMARY_HEADER, std::iter::once(summary_row))?;
    out.write_all(b"\n")?;

    let echo_rows = report
        .latency
        .echoes
        .iter()
        .map(|e| vec![e.seq.to_string(), e.ttl.to_string(), format!("{:.6}", e.time_ms)]);
    write_table(&mut *out, &LATENCY_ECHO_HEADER, echo_rows)
}

fn bandwidth_row(r: &BandwidthInterval) -> Vec<String> {
    vec![
        r.interval.clone(),
        format!("{:.6}", r.transfer),
        r.transfer_unit.clone(),
        format!("{:.6}", r.bandwidth),
        r.bandwidth_unit.clone(),
        r.write.to_string(),
        r.err.to_string(),
        r.rtry.to_string(),
        r.cwnd.clone(),
        r.rtt.clone(),
        r.net_pwr.to_string(),
    ]
}

fn write_table<W, I>(out: &mut W, header: &[&str], rows: I) -> io::Result<()>
where
    W: Write,
    I: IntoIterator<Item = Vec<String>>,
{
    let mut writer = WriterBuilder::new().quote_style(QuoteStyle::Never).from_writer(out);
    writer.write_record(header)?;
    for row in rows {
        writer.write_record(&row)?;
    }
    writer.flush()
}

pub fn write_json_report(path: &Path, report: &MeasurementReport) -> Result<(), NetbenchError> {
    let mut out = create_report_file(path)?;
    serde_json::to_writer_pretty(&mut out, report)
        .map_err(io::Error::from)
        .and_then(|_| out.flush())
        .map_err(|source| NetbenchError::ReportWrite { path: path.to_path_buf(), source })
}
