//! Error types for the edgequake-fileconv library.
//!
//! Three layers of failure, from innermost to outermost:
//!
//! * [`CodecError`] — a third-party codec (image, CSV, spreadsheet, YAML …)
//!   refused the data, or the file could not be read or written.
//!
//! * [`ConvertError`] — **Fatal** for the call that returned it. The dispatcher
//!   itself only produces `UnsupportedConversion`, `InvalidInputFormat` and
//!   `ConversionFailed` (which wraps a `CodecError`); the remaining variants
//!   come from the batch and input-resolution front-ends.
//!
//! * [`FileError`] — **Non-fatal**: a single file in a batch failed but the
//!   others carry on. Stored inside [`crate::output::FileResult`].

use crate::conversions::ConversionKind;
use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the edgequake-fileconv library.
#[derive(Debug, Error)]
pub enum ConvertError {
    // ── Dispatch errors ──────────────────────────────────────────────────
    /// The conversion identifier is not in the conversion table.
    #[error("Unsupported conversion type: {id}")]
    UnsupportedConversion { id: String },

    /// The input's extension is not one the requested conversion accepts.
    #[error(
        "Input file must be {expected} (accepted: {}; got {})",
        list_extensions(.extensions),
        describe_extension(.found)
    )]
    InvalidInputFormat {
        conversion: ConversionKind,
        expected: &'static str,
        extensions: &'static [&'static str],
        found: String,
    },

    /// The codec raised while decoding, transforming or encoding.
    #[error("{conversion} failed: {source}")]
    ConversionFailed {
        conversion: ConversionKind,
        #[source]
        source: CodecError,
    },

    // ── Input errors ─────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("Input file not found: '{path}'")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'")]
    PermissionDenied { path: PathBuf },

    /// HTTP URL was syntactically valid but download failed.
    #[error("Failed to download '{url}': {reason}")]
    DownloadFailed { url: String, reason: String },

    /// Download exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}'")]
    DownloadTimeout { url: String, secs: u64 },

    // ── Output errors ────────────────────────────────────────────────────
    /// The output directory does not exist or is not a directory.
    #[error("Output directory does not exist: '{path}'")]
    OutputDirMissing { path: PathBuf },

    // ── Batch errors ─────────────────────────────────────────────────────
    /// Every file of a batch failed; nothing was produced.
    #[error("All {total} files failed.\nFirst error: {first_error}")]
    AllFilesFailed { total: usize, first_error: String },

    // ── Config errors ────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Errors raised by the codec layer.
///
/// Each variant wraps one third-party crate so the original message survives
/// all the way to the user.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("spreadsheet read error: {0}")]
    Spreadsheet(#[from] calamine::Error),

    #[error("spreadsheet write error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    YamlSyntax(#[from] serde_yaml::Error),

    /// The YAML parsed, but uses a feature safe loading refuses.
    #[error("YAML error: {0}")]
    Yaml(String),

    /// The data parsed, but cannot be shaped into a table.
    #[error("table error: {0}")]
    Table(String),
}

/// A non-fatal error for a single file in a batch.
///
/// The batch carries on with the other files; the whole batch only fails
/// when every file does.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum FileError {
    /// The input could not be resolved (missing file, failed download).
    #[error("{input}: {detail}")]
    Input { input: String, detail: String },

    /// The dispatcher rejected the file or the codec failed.
    #[error("{input}: {detail}")]
    Conversion { input: String, detail: String },
}

fn list_extensions(exts: &[&str]) -> String {
    exts.iter()
        .map(|e| format!(".{e}"))
        .collect::<Vec<_>>()
        .join(", ")
}

fn describe_extension(ext: &str) -> String {
    if ext.is_empty() {
        "no extension".to_string()
    } else {
        format!(".{ext}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_conversion_names_identifier() {
        let e = ConvertError::UnsupportedConversion {
            id: "gif_to_mp4".into(),
        };
        assert_eq!(e.to_string(), "Unsupported conversion type: gif_to_mp4");
    }

    #[test]
    fn invalid_input_format_lists_extensions() {
        let e = ConvertError::InvalidInputFormat {
            conversion: ConversionKind::JpgToPng,
            expected: "JPG or JPEG",
            extensions: &["jpg", "jpeg"],
            found: "png".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("JPG or JPEG"), "got: {msg}");
        assert!(msg.contains(".jpg, .jpeg"), "got: {msg}");
        assert!(msg.contains("got .png"), "got: {msg}");
    }

    #[test]
    fn invalid_input_format_without_extension() {
        let e = ConvertError::InvalidInputFormat {
            conversion: ConversionKind::MdToHtml,
            expected: "Markdown (.md)",
            extensions: &["md"],
            found: String::new(),
        };
        assert!(e.to_string().contains("got no extension"));
    }

    #[test]
    fn conversion_failed_keeps_codec_message() {
        let e = ConvertError::ConversionFailed {
            conversion: ConversionKind::CsvToJson,
            source: CodecError::Table("row 3 has 3 fields, header has 2".into()),
        };
        let msg = e.to_string();
        assert!(msg.starts_with("csv_to_json failed"), "got: {msg}");
        assert!(msg.contains("row 3 has 3 fields"), "got: {msg}");
    }

    #[test]
    fn all_files_failed_display() {
        let e = ConvertError::AllFilesFailed {
            total: 3,
            first_error: "a.png: boom".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("All 3 files"));
        assert!(msg.contains("a.png: boom"));
    }
}
