//! Image → single-page PDF.
//!
//! The page's media box is the image size in points, i.e. one pixel per
//! point (72 dpi). The pixels are embedded as a JPEG stream (`DCTDecode`),
//! which PDF readers decode natively, so no re-encoding to raw RGB is needed.

use crate::codec::image::{decode, encode_jpeg};
use crate::config::ConversionConfig;
use crate::error::CodecError;
use lopdf::{dictionary, Dictionary, Document, Object, Stream};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::debug;

/// `image_to_pdf`: decode, convert to RGB, wrap in a one-page PDF.
pub fn image_to_pdf(input: &Path, output: &Path, config: &ConversionConfig) -> Result<(), CodecError> {
    let img = decode(input)?;
    let (width, height) = (img.width() as i64, img.height() as i64);

    let mut jpeg = Vec::new();
    encode_jpeg(&img, config.jpeg_quality, &mut jpeg)?;

    let mut doc = build_document(width, height, jpeg);
    let mut writer = BufWriter::new(File::create(output)?);
    doc.save_to(&mut writer)?;
    writer.flush()?;

    debug!("Wrote {}x{} pt PDF → {}", width, height, output.display());
    Ok(())
}

fn build_document(width: i64, height: i64, jpeg: Vec<u8>) -> Document {
    let mut doc = Document::with_version("1.4");
    let pages_id = doc.new_object_id();

    let image_id = doc.add_object(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => width,
            "Height" => height,
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
            "Filter" => "DCTDecode",
        },
        jpeg,
    ));

    // Scale the unit square to the full page, then paint the image into it.
    let content = format!("q\n{width} 0 0 {height} 0 0 cm\n/Im0 Do\nQ\n");
    let content_id = doc.add_object(Stream::new(Dictionary::new(), content.into_bytes()));

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![0.into(), 0.into(), width.into(), height.into()],
        "Contents" => content_id,
        "Resources" => dictionary! {
            "XObject" => dictionary! {
                "Im0" => image_id,
            },
        },
    });

    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => vec![page_id.into()],
        "Count" => 1,
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    #[test]
    fn writes_a_single_page_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("scan.bmp");
        RgbImage::from_pixel(40, 20, Rgb([10, 120, 240]))
            .save_with_format(&input, image::ImageFormat::Bmp)
            .unwrap();
        let output = dir.path().join("scan.pdf");

        image_to_pdf(&input, &output, &ConversionConfig::default()).unwrap();

        let bytes = std::fs::read(&output).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.4"));

        let doc = Document::load(&output).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }

    #[test]
    fn media_box_matches_pixels() {
        let doc = build_document(640, 480, vec![0xFF, 0xD8]);
        let page_id = *doc.get_pages().values().next().unwrap();
        let page = doc.get_dictionary(page_id).unwrap();
        let media_box = page.get(b"MediaBox").unwrap().as_array().unwrap();
        assert_eq!(media_box[2].as_i64().unwrap(), 640);
        assert_eq!(media_box[3].as_i64().unwrap(), 480);
    }
}
