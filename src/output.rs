//! Result types for batch conversion.

use crate::conversions::ConversionKind;
use crate::error::FileError;
use serde::{Deserialize, Serialize};

/// Everything a batch produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchOutput {
    pub conversion: ConversionKind,
    /// One entry per input, in input order.
    pub files: Vec<FileResult>,
    pub stats: BatchStats,
}

/// Outcome for one input of a batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileResult {
    /// 0-based position in the batch's input list.
    pub index: usize,
    /// The input exactly as given (path or URL).
    pub input: String,
    /// Output file name inside the output directory, on success.
    pub output: Option<String>,
    /// Size of the written file in bytes (0 on failure).
    pub output_bytes: u64,
    pub duration_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<FileError>,
}

impl FileResult {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchStats {
    pub total_files: usize,
    pub converted: usize,
    pub failed: usize,
    pub total_output_bytes: u64,
    /// Wall-clock time for the whole batch.
    pub duration_ms: u64,
}
