//! Batch conversion: many inputs, one conversion, one output directory.
//!
//! Each input is resolved (local path or URL download) and converted on the
//! blocking pool, up to `config.concurrency` files at a time. A failing file
//! is recorded as a [`FileError`] and the batch carries on; only a batch in
//! which every file failed is an error.

use crate::config::ConversionConfig;
use crate::conversions::ConversionKind;
use crate::convert::ConversionRequest;
use crate::error::{ConvertError, FileError};
use crate::input;
use crate::output::{BatchOutput, BatchStats, FileResult};
use futures::stream::{self, StreamExt};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, warn};

/// Convert every input with the same conversion into `output_dir`.
///
/// # Errors
/// Fatal errors only:
/// - `UnsupportedConversion` — checked before any input is touched
/// - `OutputDirMissing` — `output_dir` is not an existing directory
/// - `AllFilesFailed` — nothing was produced (an empty input list is not an
///   error)
pub async fn convert_batch(
    inputs: &[String],
    conversion: &str,
    output_dir: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<BatchOutput, ConvertError> {
    let start = Instant::now();
    let kind: ConversionKind = conversion.parse()?;
    let output_dir = output_dir.as_ref();
    if !output_dir.is_dir() {
        return Err(ConvertError::OutputDirMissing {
            path: output_dir.to_path_buf(),
        });
    }

    let total = inputs.len();
    info!("Batch {}: {} file(s) → {}", kind, total, output_dir.display());
    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_start(total);
    }

    let mut conflicts = output_conflicts(inputs, kind, output_dir);

    let mut files: Vec<FileResult> = stream::iter(inputs.iter().enumerate().map(|(index, input)| {
        let config = config.clone();
        let output_dir = output_dir.to_path_buf();
        let conflict = conflicts.remove(&index);
        async move {
            if let Some(ref cb) = config.progress_callback {
                cb.on_file_start(index, total, input);
            }
            let result = match conflict {
                Some(error) => {
                    warn!("{}", error);
                    FileResult {
                        index,
                        input: input.to_string(),
                        output: None,
                        output_bytes: 0,
                        duration_ms: 0,
                        error: Some(error),
                    }
                }
                None => convert_one(index, input, kind, output_dir, &config).await,
            };
            if let Some(ref cb) = config.progress_callback {
                match (&result.output, &result.error) {
                    (_, Some(e)) => cb.on_file_error(index, total, &e.to_string()),
                    (Some(name), None) => cb.on_file_complete(index, total, name, result.output_bytes),
                    (None, None) => {}
                }
            }
            result
        }
    }))
    .buffer_unordered(config.concurrency.max(1))
    .collect()
    .await;

    files.sort_by_key(|f| f.index);

    let converted = files.iter().filter(|f| f.is_success()).count();
    let failed = total - converted;
    if total > 0 && converted == 0 {
        let first_error = files
            .iter()
            .find_map(|f| f.error.as_ref())
            .map(|e| e.to_string())
            .unwrap_or_else(|| "Unknown error".to_string());
        return Err(ConvertError::AllFilesFailed { total, first_error });
    }

    let stats = BatchStats {
        total_files: total,
        converted,
        failed,
        total_output_bytes: files.iter().map(|f| f.output_bytes).sum(),
        duration_ms: start.elapsed().as_millis() as u64,
    };
    info!(
        "Batch complete: {}/{} converted, {}ms",
        converted, total, stats.duration_ms
    );
    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_complete(total, converted);
    }

    Ok(BatchOutput {
        conversion: kind,
        files,
        stats,
    })
}

/// Inputs whose output name was already claimed by an earlier input.
///
/// Files are converted concurrently into one directory, so two inputs with
/// the same base name would write the same output file. The first one keeps
/// the name; every later one fails without being converted.
fn output_conflicts(
    inputs: &[String],
    kind: ConversionKind,
    output_dir: &Path,
) -> HashMap<usize, FileError> {
    let mut claimed: HashMap<String, usize> = HashMap::new();
    let mut conflicts = HashMap::new();
    for (index, input) in inputs.iter().enumerate() {
        // Inputs the conversion rejects fail on their own later.
        let Ok(request) = ConversionRequest::for_kind(input::local_name(input), kind, output_dir) else {
            continue;
        };
        let name = request.output_file_name();
        match claimed.get(&name) {
            Some(&first) => {
                conflicts.insert(
                    index,
                    FileError::Conversion {
                        input: input.clone(),
                        detail: format!("output {name} already produced by input #{first}"),
                    },
                );
            }
            None => {
                claimed.insert(name, index);
            }
        }
    }
    conflicts
}

async fn convert_one(
    index: usize,
    input_str: &str,
    kind: ConversionKind,
    output_dir: PathBuf,
    config: &ConversionConfig,
) -> FileResult {
    let start = Instant::now();
    let mut result = FileResult {
        index,
        input: input_str.to_string(),
        output: None,
        output_bytes: 0,
        duration_ms: 0,
        error: None,
    };

    match run(input_str, kind, &output_dir, config).await {
        Ok((name, bytes)) => {
            result.output = Some(name);
            result.output_bytes = bytes;
        }
        Err(error) => {
            warn!("{}", error);
            result.error = Some(error);
        }
    }
    result.duration_ms = start.elapsed().as_millis() as u64;
    result
}

async fn run(
    input_str: &str,
    kind: ConversionKind,
    output_dir: &Path,
    config: &ConversionConfig,
) -> Result<(String, u64), FileError> {
    let input_error = |e: ConvertError| FileError::Input {
        input: input_str.to_string(),
        detail: e.to_string(),
    };
    let conversion_error = |e: ConvertError| FileError::Conversion {
        input: input_str.to_string(),
        detail: e.to_string(),
    };

    // Held until the conversion finishes so a downloaded temp file survives.
    let resolved = input::resolve_input(input_str, config.download_timeout_secs)
        .await
        .map_err(input_error)?;

    let request = ConversionRequest::for_kind(resolved.path(), kind, output_dir)
        .map_err(conversion_error)?;
    let output_path = request.output_path();
    let config = config.clone();
    let name = tokio::task::spawn_blocking(move || request.execute(&config))
        .await
        .map_err(|e| conversion_error(ConvertError::Internal(format!("conversion task failed: {e}"))))?
        .map_err(conversion_error)?;
    drop(resolved);

    let bytes = tokio::fs::metadata(&output_path)
        .await
        .map(|m| m.len())
        .unwrap_or(0);
    Ok((name, bytes))
}
