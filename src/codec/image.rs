//! Raster image conversions via the `image` crate.
//!
//! The input format is sniffed from the file's bytes, not its extension: the
//! extension only decides which table row may run, the decoder trusts the
//! content. Outputs are written through a `BufWriter` that is flushed and
//! dropped before the function returns.

use crate::config::ConversionConfig;
use crate::error::CodecError;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat, ImageReader};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::debug;

/// Decode any supported image, detecting the format from content.
pub fn decode(input: &Path) -> Result<DynamicImage, CodecError> {
    let img = ImageReader::open(input)?.with_guessed_format()?.decode()?;
    debug!(
        "Decoded {} → {}x{} {:?}",
        input.display(),
        img.width(),
        img.height(),
        img.color()
    );
    Ok(img)
}

/// Encode `img` as JPEG at the given quality, dropping any alpha channel.
pub fn encode_jpeg<W: Write>(img: &DynamicImage, quality: u8, writer: W) -> Result<(), CodecError> {
    let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
    rgb.write_with_encoder(JpegEncoder::new_with_quality(writer, quality))?;
    Ok(())
}

/// `png_to_jpg`: decode, convert to RGB, encode JPEG.
pub fn to_jpeg(input: &Path, output: &Path, config: &ConversionConfig) -> Result<(), CodecError> {
    let img = decode(input)?;
    let mut writer = BufWriter::new(File::create(output)?);
    encode_jpeg(&img, config.jpeg_quality, &mut writer)?;
    writer.flush()?;
    Ok(())
}

/// `jpg_to_png` and `webp_to_png`.
pub fn to_png(input: &Path, output: &Path, _config: &ConversionConfig) -> Result<(), CodecError> {
    let img = decode(input)?;
    write_format(&img, output, ImageFormat::Png)
}

/// `to_webp`: lossless WebP.
///
/// The WebP encoder only takes 8-bit luma/RGB(A), so deeper images are
/// narrowed first.
pub fn to_webp(input: &Path, output: &Path, _config: &ConversionConfig) -> Result<(), CodecError> {
    let img = narrow_to_8bit(decode(input)?);
    write_format(&img, output, ImageFormat::WebP)
}

fn write_format(img: &DynamicImage, output: &Path, format: ImageFormat) -> Result<(), CodecError> {
    let mut writer = BufWriter::new(File::create(output)?);
    img.write_to(&mut writer, format)?;
    writer.flush()?;
    debug!("Encoded {:?} → {}", format, output.display());
    Ok(())
}

fn narrow_to_8bit(img: DynamicImage) -> DynamicImage {
    match img {
        DynamicImage::ImageLuma8(_)
        | DynamicImage::ImageLumaA8(_)
        | DynamicImage::ImageRgb8(_)
        | DynamicImage::ImageRgba8(_) => img,
        other if other.color().has_alpha() => DynamicImage::ImageRgba8(other.to_rgba8()),
        other => DynamicImage::ImageRgb8(other.to_rgb8()),
    }
}
