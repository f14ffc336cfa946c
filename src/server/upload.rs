//! `POST /`: receive an upload, convert it, send the result back.

use super::{flash, AppState};
use crate::conversions::{is_allowed_upload, lookup};
use crate::convert::convert_async;
use crate::error::ConvertError;
use crate::storage::secure_filename;
use axum::body::Bytes;
use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::CookieJar;
use std::path::Path;
use tempfile::TempDir;
use thiserror::Error;
use tracing::{error, info, warn};

/// Why an upload was turned away. The `Display` text is the flash message.
#[derive(Debug, Error)]
pub(super) enum UploadError {
    #[error("No file part")]
    NoFilePart,

    #[error("No selected file")]
    NoSelectedFile,

    #[error("File type not allowed")]
    FileTypeNotAllowed,

    #[error("No conversion type selected")]
    NoConversionType,

    #[error("File name is not usable")]
    UnusableFileName,

    #[error("File too large (limit {limit})")]
    TooLarge { limit: String },

    #[error("Malformed upload: {0}")]
    Multipart(MultipartError),

    #[error(transparent)]
    Convert(#[from] ConvertError),

    #[error("Could not store the file on the server")]
    Storage(#[source] std::io::Error),
}

/// A converted file ready to send as an attachment.
struct Download {
    file_name: String,
    mime: &'static str,
    body: Vec<u8>,
}

impl IntoResponse for Download {
    fn into_response(self) -> Response {
        (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, self.mime.to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", self.file_name),
                ),
            ],
            self.body,
        )
            .into_response()
    }
}

struct Submission {
    file: Option<(String, Bytes)>,
    conversion_type: Option<String>,
}

pub(super) async fn upload(
    State(state): State<AppState>,
    jar: CookieJar,
    multipart: Multipart,
) -> Response {
    match handle(&state, multipart).await {
        Ok(download) => {
            info!("Converted upload → {} ({} bytes)", download.file_name, download.body.len());
            download.into_response()
        }
        Err(e) => {
            match &e {
                UploadError::Storage(source) => error!("Upload storage failed: {}", source),
                UploadError::Convert(ConvertError::Internal(_)) => error!("{}", e),
                _ => warn!("Upload rejected: {}", e),
            }
            (flash::push(jar, &e.to_string()), Redirect::to("/")).into_response()
        }
    }
}

async fn handle(state: &AppState, multipart: Multipart) -> Result<Download, UploadError> {
    let submission = read_submission(multipart, state.config.max_upload_bytes).await?;

    let (raw_name, bytes) = submission.file.ok_or(UploadError::NoFilePart)?;
    if raw_name.is_empty() {
        return Err(UploadError::NoSelectedFile);
    }
    if !is_allowed_upload(&raw_name) {
        return Err(UploadError::FileTypeNotAllowed);
    }
    let conversion = submission
        .conversion_type
        .filter(|c| !c.is_empty())
        .ok_or(UploadError::NoConversionType)?;
    let file_name = secure_filename(&raw_name);
    if file_name.is_empty() {
        return Err(UploadError::UnusableFileName);
    }

    // Both directories are removed when they drop at the end of this call.
    let upload_dir = request_dir(&state.config.upload_dir, "upload-")?;
    let download_dir = request_dir(&state.config.download_dir, "convert-")?;

    let input_path = upload_dir.path().join(&file_name);
    tokio::fs::write(&input_path, &bytes)
        .await
        .map_err(UploadError::Storage)?;

    let output_name = convert_async(
        &input_path,
        &conversion,
        download_dir.path(),
        &state.config.conversion,
    )
    .await?;

    let body = tokio::fs::read(download_dir.path().join(&output_name))
        .await
        .map_err(UploadError::Storage)?;
    let mime = lookup(&conversion)
        .map(|spec| spec.output_mime)
        .unwrap_or("application/octet-stream");

    Ok(Download {
        file_name: output_name,
        mime,
        body,
    })
}

async fn read_submission(mut multipart: Multipart, limit_bytes: usize) -> Result<Submission, UploadError> {
    let too_large_or = |e: MultipartError| {
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            UploadError::TooLarge {
                limit: describe_size(limit_bytes),
            }
        } else {
            UploadError::Multipart(e)
        }
    };

    let mut submission = Submission {
        file: None,
        conversion_type: None,
    };
    while let Some(field) = multipart.next_field().await.map_err(too_large_or)? {
        let field_name = field.name().map(str::to_string);
        match field_name.as_deref() {
            Some("file") => {
                let name = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await.map_err(too_large_or)?;
                submission.file = Some((name, bytes));
            }
            Some("conversion_type") => {
                submission.conversion_type = Some(field.text().await.map_err(too_large_or)?);
            }
            _ => {}
        }
    }
    Ok(submission)
}

fn request_dir(root: &Path, prefix: &str) -> Result<TempDir, UploadError> {
    tempfile::Builder::new()
        .prefix(prefix)
        .tempdir_in(root)
        .map_err(UploadError::Storage)
}

/// `32 MiB`, `512 KiB` or `100 bytes`, rounded down to the largest unit.
fn describe_size(bytes: usize) -> String {
    const KIB: usize = 1024;
    const MIB: usize = 1024 * KIB;
    if bytes >= MIB {
        format!("{} MiB", bytes / MIB)
    } else if bytes >= KIB {
        format!("{} KiB", bytes / KIB)
    } else {
        format!("{bytes} bytes")
    }
}
