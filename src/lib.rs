//! # edgequake-fileconv
//!
//! Convert files between common formats: raster images, PDF, CSV, Excel,
//! JSON, YAML and Markdown.
//!
//! The core is a table-driven dispatcher. A conversion identifier such as
//! `"csv_to_json"` selects one row of [`CONVERSION_TABLE`]; the row says which
//! input extensions are accepted, which extension is written, and which codec
//! does the work.
//!
//! ```text
//! input file
//!  │
//!  ├─ convert()        lookup row → check extension → run codec
//!  │     └─ codec      image · pdf · table (csv/xlsx/json) · yaml · markdown
//!  └─ output_dir/<base name>.<output extension>
//!
//! front-ends
//!  ├─ convert_batch()  many inputs (paths or URLs), bounded concurrency
//!  ├─ fileconv         CLI (feature `cli`)
//!  └─ server           upload form over HTTP (feature `server`)
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edgequake_fileconv::convert;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let name = convert("photo.png", "png_to_jpg", "out")?;
//!     println!("wrote out/{name}");
//!     Ok(())
//! }
//! ```
//!
//! ## Conversions
//!
//! | Identifier      | Input                      | Output  |
//! |-----------------|----------------------------|---------|
//! | `png_to_jpg`    | png                        | jpg     |
//! | `jpg_to_png`    | jpg, jpeg                  | png     |
//! | `to_webp`       | png, jpg, jpeg, bmp        | webp    |
//! | `webp_to_png`   | webp                       | png     |
//! | `image_to_pdf`  | png, jpg, jpeg, bmp, webp  | pdf     |
//! | `csv_to_json`   | csv                        | json    |
//! | `json_to_csv`   | json                       | csv     |
//! | `csv_to_excel`  | csv                        | xlsx    |
//! | `excel_to_csv`  | xlsx, xls                  | csv     |
//! | `json_to_excel` | json                       | xlsx    |
//! | `excel_to_json` | xlsx, xls                  | json    |
//! | `json_to_yaml`  | json                       | yaml    |
//! | `yaml_to_json`  | yaml, yml                  | json    |
//! | `md_to_html`    | md                         | html    |
//!
//! ## Feature Flags
//!
//! | Feature  | Default | Description |
//! |----------|---------|-------------|
//! | `cli`    | on      | The `fileconv` binary (clap + anyhow + tracing-subscriber + indicatif) |
//! | `server` | on      | The upload server (axum + tower-http) |
//!
//! Disable both when using only the library:
//! ```toml
//! edgequake-fileconv = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod batch;
pub mod codec;
pub mod config;
pub mod conversions;
pub mod convert;
pub mod error;
pub mod input;
pub mod output;
pub mod progress;
#[cfg(feature = "server")]
pub mod server;
pub mod storage;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use batch::convert_batch;
pub use config::{ConversionConfig, ConversionConfigBuilder, ServerConfig};
pub use conversions::{
    lookup, Category, ConversionKind, ConversionSpec, ALLOWED_UPLOAD_EXTENSIONS, CONVERSION_TABLE,
};
pub use convert::{convert, convert_async, convert_with, ConversionRequest};
pub use error::{CodecError, ConvertError, FileError};
pub use output::{BatchOutput, BatchStats, FileResult};
pub use progress::{ConversionProgressCallback, NoopProgressCallback, ProgressCallback};
