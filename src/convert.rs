//! The conversion dispatcher.
//!
//! One call converts one file: look the conversion up in
//! [`CONVERSION_TABLE`](crate::conversions::CONVERSION_TABLE), check the
//! input's extension against the row, run the row's codec action, and hand
//! back the name of the file written into the output directory.
//!
//! ```text
//! convert("photo.png", "png_to_jpg", "out/")
//!  │
//!  ├─ 1. Lookup     "png_to_jpg" → table row (else UnsupportedConversion)
//!  ├─ 2. Split      base name "photo", extension "png"
//!  ├─ 3. Validate   "png" ∈ row.input_extensions (else InvalidInputFormat)
//!  ├─ 4. Run        row.action(photo.png, out/photo.jpg)  (else ConversionFailed)
//!  └─ 5. Return     "photo.jpg"
//! ```
//!
//! The dispatcher is synchronous and stateless. [`convert_async`] moves the
//! same call onto tokio's blocking pool for async callers.

use crate::config::ConversionConfig;
use crate::conversions::{ConversionKind, ConversionSpec};
use crate::error::ConvertError;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A validated conversion, ready to run.
///
/// Building the request performs the table lookup and the extension check;
/// [`execute`](Self::execute) only runs the codec.
#[derive(Debug, Clone)]
pub struct ConversionRequest {
    input_path: PathBuf,
    output_dir: PathBuf,
    spec: &'static ConversionSpec,
    base_name: String,
}

impl ConversionRequest {
    /// Validate `conversion` against `input_path`.
    ///
    /// # Errors
    /// * `UnsupportedConversion` if `conversion` is not a table identifier,
    ///   whatever the input looks like.
    /// * `InvalidInputFormat` if the input's extension is not accepted by
    ///   the conversion.
    pub fn new(
        input_path: impl AsRef<Path>,
        conversion: &str,
        output_dir: impl AsRef<Path>,
    ) -> Result<Self, ConvertError> {
        let kind: ConversionKind = conversion.parse()?;
        Self::for_kind(input_path, kind, output_dir)
    }

    /// Like [`new`](Self::new) with an already-parsed conversion.
    pub fn for_kind(
        input_path: impl AsRef<Path>,
        kind: ConversionKind,
        output_dir: impl AsRef<Path>,
    ) -> Result<Self, ConvertError> {
        let input_path = input_path.as_ref();
        let spec = kind.spec();
        let (base_name, extension) = split_name(input_path);

        if !spec.accepts(&extension) {
            return Err(ConvertError::InvalidInputFormat {
                conversion: kind,
                expected: spec.expected,
                extensions: spec.input_extensions,
                found: extension,
            });
        }

        Ok(Self {
            input_path: input_path.to_path_buf(),
            output_dir: output_dir.as_ref().to_path_buf(),
            spec,
            base_name,
        })
    }

    pub fn kind(&self) -> ConversionKind {
        self.spec.kind
    }

    /// The file name the conversion will write, e.g. `photo.jpg`.
    pub fn output_file_name(&self) -> String {
        format!("{}.{}", self.base_name, self.spec.output_extension)
    }

    /// Full path of the output file.
    pub fn output_path(&self) -> PathBuf {
        self.output_dir.join(self.output_file_name())
    }

    /// MIME type of the output, for HTTP responses.
    pub fn output_mime(&self) -> &'static str {
        self.spec.output_mime
    }

    /// Run the codec and return the output file name.
    ///
    /// A file the codec had already started writing is left in place on
    /// failure.
    pub fn execute(&self, config: &ConversionConfig) -> Result<String, ConvertError> {
        let output_path = self.output_path();
        debug!(
            "{}: {} → {}",
            self.spec.id,
            self.input_path.display(),
            output_path.display()
        );

        (self.spec.action)(&self.input_path, &output_path, config).map_err(|source| {
            ConvertError::ConversionFailed {
                conversion: self.spec.kind,
                source,
            }
        })?;

        Ok(self.output_file_name())
    }
}

/// Base name (file stem) and lower-cased extension without the dot.
///
/// `archive.tar.gz` → (`archive.tar`, `gz`); `README` → (`README`, ``);
/// `.env` → (`.env`, ``).
fn split_name(path: &Path) -> (String, String) {
    let base = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    (base, ext)
}

/// Convert one file with the default configuration.
///
/// Returns the output file name (not the full path); the file itself is
/// written to `output_dir/<base name>.<output extension>`.
///
/// # Example
/// ```rust,no_run
/// use edgequake_fileconv::convert;
///
/// let name = convert("data.csv", "csv_to_json", "out")?;
/// assert_eq!(name, "data.json");
/// # Ok::<(), edgequake_fileconv::ConvertError>(())
/// ```
pub fn convert(
    input_path: impl AsRef<Path>,
    conversion: &str,
    output_dir: impl AsRef<Path>,
) -> Result<String, ConvertError> {
    convert_with(input_path, conversion, output_dir, &ConversionConfig::default())
}

/// [`convert`] with an explicit configuration.
pub fn convert_with(
    input_path: impl AsRef<Path>,
    conversion: &str,
    output_dir: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<String, ConvertError> {
    ConversionRequest::new(input_path, conversion, output_dir)?.execute(config)
}

/// Run [`convert_with`] on tokio's blocking pool.
///
/// Codec work is CPU-bound and does synchronous file I/O, so it must not run
/// on an async worker thread.
pub async fn convert_async(
    input_path: impl AsRef<Path>,
    conversion: &str,
    output_dir: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<String, ConvertError> {
    let request = ConversionRequest::new(input_path, conversion, output_dir)?;
    let config = config.clone();
    tokio::task::spawn_blocking(move || request.execute(&config))
        .await
        .map_err(|e| ConvertError::Internal(format!("conversion task failed: {e}")))?
}
