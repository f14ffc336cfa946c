//! Markdown → HTML fragment.

use crate::config::ConversionConfig;
use crate::error::CodecError;
use pulldown_cmark::{html, Parser};
use std::path::Path;

/// `md_to_html`: render CommonMark to an HTML fragment (no `<html>` wrapper).
pub fn markdown_to_html(input: &Path, output: &Path, _config: &ConversionConfig) -> Result<(), CodecError> {
    let text = std::fs::read_to_string(input)?;
    let mut out = String::with_capacity(text.len() * 3 / 2);
    html::push_html(&mut out, Parser::new(&text));
    std::fs::write(output, out)?;
    Ok(())
}
