//! Configuration types for file conversion.
//!
//! Codec knobs live in [`ConversionConfig`], built via its
//! [`ConversionConfigBuilder`]. Directory layout and limits for the upload
//! server live in [`ServerConfig`]. Both are plain values handed to the code
//! that needs them; nothing reads process-wide state.

use crate::error::ConvertError;
use crate::progress::ProgressCallback;
use std::fmt;
use std::path::PathBuf;

/// Configuration for a conversion.
///
/// Built via [`ConversionConfig::builder()`] or using
/// [`ConversionConfig::default()`].
///
/// # Example
/// ```rust
/// use edgequake_fileconv::ConversionConfig;
///
/// let config = ConversionConfig::builder()
///     .jpeg_quality(90)
///     .concurrency(8)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// JPEG quality (1–100) for `png_to_jpg` and the image inside
    /// `image_to_pdf`. Default: 75.
    pub jpeg_quality: u8,

    /// Indentation width of JSON output. Default: 4.
    pub json_indent: usize,

    /// Field delimiter used when reading and writing CSV. Default: `,`.
    pub csv_delimiter: u8,

    /// Worksheet name used for XLSX output. Default: `Sheet1`.
    pub sheet_name: String,

    /// Emit YAML mapping keys in sorted order. Default: true.
    pub sort_yaml_keys: bool,

    /// Number of files a batch converts at the same time. Default: 4.
    pub concurrency: usize,

    /// Download timeout for URL inputs in seconds. Default: 120.
    pub download_timeout_secs: u64,

    /// Optional per-file progress events for batch conversion.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            jpeg_quality: 75,
            json_indent: 4,
            csv_delimiter: b',',
            sheet_name: "Sheet1".to_string(),
            sort_yaml_keys: true,
            concurrency: 4,
            download_timeout_secs: 120,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("jpeg_quality", &self.jpeg_quality)
            .field("json_indent", &self.json_indent)
            .field("csv_delimiter", &(self.csv_delimiter as char))
            .field("sheet_name", &self.sheet_name)
            .field("sort_yaml_keys", &self.sort_yaml_keys)
            .field("concurrency", &self.concurrency)
            .field("download_timeout_secs", &self.download_timeout_secs)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn ConversionProgressCallback>"),
            )
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn jpeg_quality(mut self, quality: u8) -> Self {
        self.config.jpeg_quality = quality;
        self
    }

    pub fn json_indent(mut self, width: usize) -> Self {
        self.config.json_indent = width.min(16);
        self
    }

    pub fn csv_delimiter(mut self, delimiter: u8) -> Self {
        self.config.csv_delimiter = delimiter;
        self
    }

    pub fn sheet_name(mut self, name: impl Into<String>) -> Self {
        self.config.sheet_name = name.into();
        self
    }

    pub fn sort_yaml_keys(mut self, v: bool) -> Self {
        self.config.sort_yaml_keys = v;
        self
    }

    pub fn concurrency(mut self, n: usize) -> Self {
        self.config.concurrency = n.max(1);
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, ConvertError> {
        let c = &self.config;
        if !(1..=100).contains(&c.jpeg_quality) {
            return Err(ConvertError::InvalidConfig(format!(
                "JPEG quality must be 1–100, got {}",
                c.jpeg_quality
            )));
        }
        if !c.csv_delimiter.is_ascii() || c.csv_delimiter == b'"' || c.csv_delimiter == b'\n' {
            return Err(ConvertError::InvalidConfig(format!(
                "CSV delimiter {:?} is not usable",
                c.csv_delimiter as char
            )));
        }
        // Excel's own limits: 1–31 characters, none of []:*?/\
        let name = &c.sheet_name;
        if name.is_empty()
            || name.chars().count() > 31
            || name.contains(['[', ']', ':', '*', '?', '/', '\\'])
        {
            return Err(ConvertError::InvalidConfig(format!(
                "Sheet name {name:?} is not a valid worksheet name"
            )));
        }
        if c.concurrency == 0 {
            return Err(ConvertError::InvalidConfig(
                "Concurrency must be ≥ 1".into(),
            ));
        }
        Ok(self.config)
    }
}

/// Runtime configuration for the upload server.
///
/// Every field has a default so the server works with no flags at all.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// TCP address to bind. Default: `127.0.0.1:5000`.
    pub bind_address: String,

    /// Folder that receives uploads; one sub-directory per request.
    pub upload_dir: PathBuf,

    /// Folder that receives converted files; one sub-directory per request.
    pub download_dir: PathBuf,

    /// Largest accepted request body in bytes. Default: 32 MiB.
    pub max_upload_bytes: usize,

    /// Codec configuration used for every upload.
    pub conversion: ConversionConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:5000".to_string(),
            upload_dir: PathBuf::from("uploads"),
            download_dir: PathBuf::from("downloads"),
            max_upload_bytes: 32 * 1024 * 1024,
            conversion: ConversionConfig::default(),
        }
    }
}
