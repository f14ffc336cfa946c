//! Codec actions behind the conversion table.
//!
//! Each submodule wraps one family of third-party codecs and exposes
//! functions with the [`Action`] signature: read the input path, write the
//! output path, return a [`CodecError`] on failure.
//!
//! ```text
//! image       decode/encode PNG, JPEG, WEBP, BMP        (image)
//! pdf         single-page PDF around a JPEG image        (image + lopdf)
//! table       tabular model + CSV / Excel / JSON records (csv, calamine, rust_xlsxwriter)
//! structured  JSON ⇄ YAML                                (serde_json, serde_yaml)
//! markup      Markdown → HTML                            (pulldown-cmark)
//! ```
//!
//! Every action opens its files inside its own scope, so all handles are
//! closed by the time it returns, whether it succeeded or not.

pub mod image;
pub mod markup;
pub mod pdf;
pub mod structured;
pub mod table;

use crate::config::ConversionConfig;
use crate::error::CodecError;
use std::path::Path;

/// A codec action: convert `input` into `output`.
pub type Action = fn(input: &Path, output: &Path, config: &ConversionConfig) -> Result<(), CodecError>;
