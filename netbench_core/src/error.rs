// Error kinds surfaced by a measurement run

use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

use crate::parse::ParseError;

#[derive(Debug, Error)]
pub enum NetbenchError {
    #[error("{program} exec error: {source}")]
    Launch {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("{program} exec error: {status}{}", stderr_suffix(.stderr))]
    ExitStatus {
        program: String,
        status: ExitStatus,
        stderr: String,
    },
    #[error("stat extract error: {0}")]
    Parse(#[from] ParseError),
    #[error("file create error {}: {source}", .path.display())]
    ReportCreate {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("file write error {}: {source}", .path.display())]
    ReportWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

fn stderr_suffix(stderr: &str) -> String {
    if stderr.is_empty() {
        String::new()
    } else {
        format!(" ({})", stderr)
    }
}

impl NetbenchError {
    /// Process exit code for this error. Every failure is fatal and shares code 1.
    pub fn exit_code(&self) -> u8 {
        match self {
            NetbenchError::Launch { .. }
            | NetbenchError::ExitStatus { .. }
            | NetbenchError::Parse(_)
            | NetbenchError::ReportCreate { .. }
            | NetbenchError::ReportWrite { .. } => 1,
        }
    }
}
