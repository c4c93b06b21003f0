//! Connection scanner implementation using netstat.
//!
//! Runs `netstat -ptu` followed by the allow-listed extra flags, each passed
//! as its own argument. No shell is involved.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tracing::{debug, warn};

use crate::domain::{RawOutput, ScanOptions};
use crate::error::ScanError;
use crate::ports::ConnectionScannerPort;

/// Default connection-listing utility, resolved through `PATH`.
pub const DEFAULT_PROGRAM: &str = "netstat";

/// Default time a single scan may take.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Base flags for every scan.
///
/// -p, --program       show PID/program name owning the socket
/// -t, --tcp           TCP sockets
/// -u, --udp           UDP sockets
const BASE_ARGS: &str = "-ptu";

/// Scanner backed by the net-tools `netstat` utility.
#[derive(Debug, Clone)]
pub struct NetstatScanner {
    program: PathBuf,
    timeout: Duration,
}

impl NetstatScanner {
    /// Create a scanner using `netstat` from `PATH`.
    pub fn new() -> Self {
        Self::with_program(DEFAULT_PROGRAM)
    }

    /// Create a scanner using a specific utility path.
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set the per-scan timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn command(&self, options: &ScanOptions) -> Command {
        let mut command = Command::new(&self.program);
        command
            .arg(BASE_ARGS)
            .args(options.args())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        command
    }

    fn spawn_error(&self, e: std::io::Error) -> ScanError {
        let program = self.program.display().to_string();
        match e.kind() {
            std::io::ErrorKind::NotFound => ScanError::UtilityNotFound(program),
            std::io::ErrorKind::PermissionDenied => {
                ScanError::PermissionDenied(format!("cannot run {}", program))
            }
            _ => ScanError::Io(e),
        }
    }
}

impl Default for NetstatScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectionScannerPort for NetstatScanner {
    async fn scan(&self, options: &ScanOptions) -> Result<RawOutput, ScanError> {
        debug!(program = %self.program.display(), flags = ?options.flags(), "Running scan");

        let output = match tokio::time::timeout(self.timeout, self.command(options).output()).await
        {
            Ok(result) => result.map_err(|e| self.spawn_error(e))?,
            Err(_) => {
                warn!(timeout_ms = self.timeout.as_millis() as u64, "Scan timed out");
                return Err(ScanError::TimedOut(self.timeout.as_millis() as u64));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            if stderr.contains("Permission denied") || stderr.contains("Operation not permitted") {
                return Err(ScanError::PermissionDenied(stderr));
            }
            return Err(ScanError::NonZeroExit {
                code: output.status.code(),
                stderr,
            });
        }

        // Without privilege net-tools still exits 0; owners it cannot resolve show as `-`
        if !output.stderr.is_empty() {
            debug!(stderr = %String::from_utf8_lossy(&output.stderr).trim(), "Scan completed with warnings");
        }

        let stdout = String::from_utf8(output.stdout)
            .map_err(|e| ScanError::InvalidOutput(format!("Invalid UTF-8 in netstat output: {}", e)))?;

        Ok(RawOutput::from(stdout))
    }
}
