//! Connection scanner port (interface).

use crate::domain::{RawOutput, ScanOptions};
use crate::error::ScanError;

/// Port for acquiring the raw connection table.
///
/// Implementations run the host's connection-listing utility once per call
/// and return its text unparsed.
pub trait ConnectionScannerPort: Send + Sync {
    /// Run one scan with the given allow-listed extra flags.
    fn scan(
        &self,
        options: &ScanOptions,
    ) -> impl std::future::Future<Output = Result<RawOutput, ScanError>> + Send;
}
