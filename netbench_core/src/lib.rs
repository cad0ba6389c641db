// This is the core library crate for netbench.
// It runs the external measurement tools, parses what they print,
// and writes the collected records out as reports.

pub mod bandwidth;   // iperf runner and interval-line parser
pub mod config;      // Run configuration structures
pub mod error;       // Error kinds and their exit codes
pub mod latency;     // ping runner and echo/summary parser
pub mod metrics;     // Records extracted from tool output
pub mod parse;       // Field extraction helpers shared by the parsers
pub mod progress;    // Cosmetic progress bar while a tool runs
pub mod reporter;    // CSV and JSON report output
pub mod runner;      // Subprocess execution and the stage pipeline

pub use config::{ParseMode, RunConfig};
pub use error::NetbenchError;
pub use reporter::MeasurementReport;
