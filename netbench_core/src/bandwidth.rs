// Bandwidth stage: runs iperf in enhanced-report client mode and parses each
// interval row, e.g.
//   [  3] 0.00-1.00 sec   114 MBytes   954 Mbits/sec  912/0   0   467K/3980 us  29955
// Header, connection and [SUM] lines are skipped; fields are read by position
// after the stream id.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info};

use crate::config::{ParseMode, RunConfig};
use crate::error::NetbenchError;
use crate::metrics::BandwidthInterval;
use crate::parse::{field, number, segments, ParseError};
use crate::progress::ProgressTicker;
use crate::runner::run_command;

static DATA_ROW: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\[\s*\d+\]\s+(.*\ssec.*)$").expect("interval row pattern is valid")
});

// Older iperf builds pad the interval as "0.0- 1.0".
static INTERVAL_GAP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d+(?:\.\d+)?-)\s+").expect("interval gap pattern is valid")
});

const IDX_INTERVAL: usize = 0;
const IDX_TRANSFER: usize = 2;
const IDX_TRANSFER_UNIT: usize = 3;
const IDX_BANDWIDTH: usize = 4;
const IDX_BANDWIDTH_UNIT: usize = 5;
const IDX_WRITE_ERR: usize = 6;
const IDX_RTRY: usize = 7;
const IDX_CWND_RTT: usize = 8;
const IDX_RTT_UNIT: usize = 9;
const IDX_NET_PWR: usize = 10;

/// Arguments for `iperf -c <target> -t <duration> -i <interval> -e`.
pub fn bandwidth_args(config: &RunConfig) -> Vec<String> {
    vec![
        "-c".to_string(),
        config.target.clone(),
        "-t".to_string(),
        config.duration_secs.to_string(),
        "-i".to_string(),
        config.interval_secs.to_string(),
        "-e".to_string(),
    ]
}

pub async fn run_bandwidth_test(config: &RunConfig) -> Result<Vec<BandwidthInterval>, NetbenchError> {
    let args = bandwidth_args(config);
    let ticker = config
        .show_progress
        .then(|| ProgressTicker::start("iperf", config.bandwidth_ticks(), config.tick_interval()));

    let output = run_command(&config.bandwidth_bin, &args, ticker).await?;
    info!(program = %config.bandwidth_bin.display(), "iperf exec success");

    let records = parse_bandwidth_output(&output, config.parse_mode)?;
    info!(intervals = records.len(), "bandwidth intervals collected");
    Ok(records)
}

/// Parses the complete stdout of an iperf run.
pub fn parse_bandwidth_output(output: &str, mode: ParseMode) -> Result<Vec<BandwidthInterval>, ParseError> {
    let mut records = Vec::new();
    for line in output.lines() {
        let Some(caps) = DATA_ROW.captures(line) else {
            continue;
        };
        let body = INTERVAL_GAP.replace(&caps[1], "$1");
        let tokens: Vec<&str> = body.split_whitespace().collect();
        let record = parse_interval_tokens(&tokens, line, mode)?;
        debug!(interval = %record.interval, "parsed interval row");
        records.push(record);
    }
    Ok(records)
}

fn parse_interval_tokens(tokens: &[&str], line: &str, mode: ParseMode) -> Result<BandwidthInterval, ParseError> {
    let interval = field(tokens, IDX_INTERVAL, "interval", line)?;
    let transfer = number::<f64>("transfer", field(tokens, IDX_TRANSFER, "transfer", line)?)?;
    let transfer_unit = field(tokens, IDX_TRANSFER_UNIT, "transfer unit", line)?;
    let bandwidth = number::<f64>("bandwidth", field(tokens, IDX_BANDWIDTH, "bandwidth", line)?)?;
    let bandwidth_unit = field(tokens, IDX_BANDWIDTH_UNIT, "bandwidth unit", line)?;

    let write_err = field(tokens, IDX_WRITE_ERR, "write/err", line)?;
    let (write, err) = match mode {
        // Err repeats the write count; kept so existing reports stay comparable.
        ParseMode::Compatible => {
            let parts = segments(write_err, 1, "write/err", line)?;
            (number::<i64>("write", parts[0])?, number::<i64>("err", parts[0])?)
        }
        ParseMode::Strict => {
            let parts = segments(write_err, 2, "write/err", line)?;
            (number::<i64>("write", parts[0])?, number::<i64>("err", parts[1])?)
        }
    };

    let rtry = number::<i64>("rtry", field(tokens, IDX_RTRY, "rtry", line)?)?;

    let cwnd_rtt = segments(field(tokens, IDX_CWND_RTT, "cwnd/rtt", line)?, 2, "cwnd/rtt", line)?;
    let rtt_unit = field(tokens, IDX_RTT_UNIT, "rtt unit", line)?;
    let net_pwr = number::<i64>("net power", field(tokens, IDX_NET_PWR, "net power", line)?)?;

    Ok(BandwidthInterval {
        interval: interval.to_string(),
        transfer,
        transfer_unit: transfer_unit.to_string(),
        bandwidth,
        bandwidth_unit: bandwidth_unit.to_string(),
        write,
        err,
        rtry,
        cwnd: cwnd_rtt[0].to_string(),
        rtt: format!("{} {}", cwnd_rtt[1], rtt_unit),
        net_pwr,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const IPERF_OUTPUT: &str = "\
------------------------------------------------------------
Client connecting to 10.0.0.2, TCP port 5001 with pid 4242
Write buffer size:  128 KByte
TCP window size: 85.0 KByte (default)
------------------------------------------------------------
[  3] local 10.0.0.1 port 50122 connected with 10.0.0.2 port 5001 (ct=0.52 ms)
[ ID] Interval        Transfer    Bandwidth       Write/Err  Rtry     Cwnd/RTT        NetPwr
[  3] 0.00-1.00 sec   114 MBytes   954 Mbits/sec  912/0          0      467K/3980 us  29955
[  3] 1.00-2.00 sec   113 MBytes   949 Mbits/sec  905/0          2      380K/3301 us  35936
[  3] 0.00-2.01 sec   227 MBytes   948 Mbits/sec  1817/0         2       -1K/3605 us  32862
";

    #[test]
    fn test_padded_interval_line() {
        let line = "[  3]  0.0- 1.0 sec  1.25 MBytes  10.5 Mbits/sec  100/0  5  20K/0.5/0.2 ms  50";
        let records = parse_bandwidth_output(line, ParseMode::Compatible).unwrap();
        assert_eq!(records.len(), 1);

        let r = &records[0];
        assert_eq!(r.interval, "0.0-1.0");
        assert_eq!(r.transfer, 1.25);
        assert_eq!(r.transfer_unit, "MBytes");
        assert_eq!(r.bandwidth, 10.5);
        assert_eq!(r.bandwidth_unit, "Mbits/sec");
        assert_eq!(r.write, 100);
        assert_eq!(r.err, 100);
        assert_eq!(r.rtry, 5);
        assert_eq!(r.cwnd, "20K");
        assert_eq!(r.rtt, "0.5 ms");
        assert_eq!(r.net_pwr, 50);
    }

    #[test]
    fn test_err_repeats_write_count() {
        let line = "[  3] 0.00-1.00 sec  1.25 MBytes  10.5 Mbits/sec  12345/67  5  20K/500 us  50";
        let records = parse_bandwidth_output(line, ParseMode::Compatible).unwrap();
        assert_eq!(records[0].write, 12345);
        assert_eq!(records[0].err, 12345);
    }

    #[test]
    fn test_strict_mode_reads_err_column() {
        let line = "[  3] 0.00-1.00 sec  1.25 MBytes  10.5 Mbits/sec  12345/67  5  20K/500 us  50";
        let records = parse_bandwidth_output(line, ParseMode::Strict).unwrap();
        assert_eq!(records[0].write, 12345);
        assert_eq!(records[0].err, 67);
    }

    #[test]
    fn test_full_output_keeps_order_and_skips_headers() {
        let records = parse_bandwidth_output(IPERF_OUTPUT, ParseMode::Compatible).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].interval, "0.00-1.00");
        assert_eq!(records[1].interval, "1.00-2.00");
        assert_eq!(records[2].interval, "0.00-2.01");

        assert_eq!(records[1].rtry, 2);
        assert_eq!(records[1].cwnd, "380K");
        assert_eq!(records[1].rtt, "3301 us");
        assert_eq!(records[2].cwnd, "-1K");
        assert_eq!(records[2].net_pwr, 32862);
    }

    #[test]
    fn test_values_survive_six_decimal_formatting() {
        let records = parse_bandwidth_output(IPERF_OUTPUT, ParseMode::Compatible).unwrap();
        for r in &records {
            let transfer: f64 = format!("{:.6}", r.transfer).parse().unwrap();
            let bandwidth: f64 = format!("{:.6}", r.bandwidth).parse().unwrap();
            assert!((transfer - r.transfer).abs() < 1e-6);
            assert!((bandwidth - r.bandwidth).abs() < 1e-6);
        }
    }

    #[test]
    fn test_wide_stream_ids_and_sum_lines() {
        let output = "\
[ 13]  9.0-10.0 sec  1.25 MBytes  10.5 Mbits/sec  100/0  5  20K/500 us  50
[113]  9.0-10.0 sec  2.50 MBytes  21.0 Mbits/sec  200/1  0  40K/610 us  61
[SUM]  0.0-10.0 sec  3.75 MBytes  31.5 Mbits/sec  300/1  5
";
        let records = parse_bandwidth_output(output, ParseMode::Compatible).unwrap();
        assert_eq!(records.len(), 2);

        assert_eq!(records[0].interval, "9.0-10.0");
        assert_eq!(records[0].transfer, 1.25);
        assert_eq!(records[0].write, 100);
        assert_eq!(records[0].rtt, "500 us");
        assert_eq!(records[0].net_pwr, 50);

        assert_eq!(records[1].interval, "9.0-10.0");
        assert_eq!(records[1].bandwidth, 21.0);
        assert_eq!(records[1].bandwidth_unit, "Mbits/sec");
        assert_eq!(records[1].cwnd, "40K");
        assert_eq!(records[1].net_pwr, 61);
    }

    #[test]
    fn test_non_numeric_field_is_an_error() {
        let line = "[  3] 0.00-1.00 sec  lots MBytes  10.5 Mbits/sec  100/0  5  20K/500 us  50";
        let err = parse_bandwidth_output(line, ParseMode::Compatible).unwrap_err();
        match err {
            ParseError::InvalidNumber { field, value, .. } => {
                assert_eq!(field, "transfer");
                assert_eq!(value, "lots");
            }
            other => panic!("expected InvalidNumber, got {:?}", other),
        }
    }

    #[test]
    fn test_truncated_row_is_an_error() {
        let line = "[  3] 0.00-1.00 sec  1.25 MBytes  10.5 Mbits/sec  100/0  5";
        let err = parse_bandwidth_output(line, ParseMode::Compatible).unwrap_err();
        assert!(matches!(err, ParseError::MissingField { field: "cwnd/rtt", .. }));
    }

    #[test]
    fn test_no_rows_yields_empty() {
        let output = "connect failed: Connection refused\n";
        assert!(parse_bandwidth_output(output, ParseMode::Compatible).unwrap().is_empty());
    }

    #[test]
    fn test_bandwidth_args() {
        let config = RunConfig {
            target: "192.168.1.100".to_string(),
            duration_secs: 5,
            interval_secs: 2,
            ..Default::default()
        };
        assert_eq!(
            bandwidth_args(&config),
            vec!["-c", "192.168.1.100", "-t", "5", "-i", "2", "-e"]
        );
    }
}
