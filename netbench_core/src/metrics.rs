// Records extracted from tool output
use serde::Serialize;

/// One periodic throughput sample from the bandwidth tool.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BandwidthInterval {
    pub interval: String,
    pub transfer: f64,
    pub transfer_unit: String,
    pub bandwidth: f64,
    pub bandwidth_unit: String,
    pub write: i64,
    pub err: i64,
    pub rtry: i64,
    pub cwnd: String, // value with unit, e.g. "467K"
    pub rtt: String,  // value with unit, e.g. "3980 us"
    pub net_pwr: i64,
}

/// One echo reply from the latency tool.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LatencyEcho {
    pub seq: u64,
    pub ttl: u32,
    pub time_ms: f64,
}

/// Aggregate statistics printed by the latency tool when it finishes.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LatencySummary {
    pub transmitted: u64,
    pub received: u64,
    pub loss_percent: f64,
    pub elapsed_ms: u64,
    pub min_ms: f64,
    pub avg_ms: f64,
    pub max_ms: f64,
    pub stddev_ms: f64,
}

impl LatencySummary {
    /// True when nothing was extracted, i.e. the summary is still at its default.
    pub fn is_empty(&self) -> bool {
        *self == LatencySummary::default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LatencyRun {
    pub echoes: Vec<LatencyEcho>,
    pub summary: LatencySummary,
}

impl LatencyRun {
    /// Mean of the per-echo round trips, independent of the tool's own summary.
    pub fn average_echo_ms(&self) -> Option<f64> {
        if self.echoes.is_empty() {
            return None;
        }
        let total: f64 = self.echoes.iter().map(|e| e.time_ms).sum();
        Some(total / self.echoes.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_summary_is_empty() {
        assert!(LatencySummary::default().is_empty());
        let summary = LatencySummary { transmitted: 1, ..Default::default() };
        assert!(!summary.is_empty());
    }

    #[test]
    fn test_average_echo_ms() {
        let mut run = LatencyRun::default();
        assert_eq!(run.average_echo_ms(), None);

        run.echoes.push(LatencyEcho { seq: 1, ttl: 64, time_ms: 10.0 });
        run.echoes.push(LatencyEcho { seq: 2, ttl: 64, time_ms: 20.0 });
        let avg = run.average_echo_ms().unwrap();
        assert!((avg - 15.0).abs() < f64::EPSILON);
    }
}
