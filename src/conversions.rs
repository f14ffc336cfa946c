//! The conversion table.
//!
//! Every supported conversion is one [`ConversionSpec`] row in
//! [`CONVERSION_TABLE`]: which input extensions it accepts, which extension it
//! writes, and which codec action performs it. The dispatcher in
//! [`crate::convert`] only ever reads this table, so adding a conversion means
//! adding a row (and a [`ConversionKind`] variant), never another branch.

use crate::codec::{self, Action};
use crate::error::ConvertError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Extensions the upload handler accepts before any conversion is attempted.
pub const ALLOWED_UPLOAD_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "bmp", "webp", "csv", "json", "xlsx", "xls", "yaml", "yml", "md",
];

/// Identifier of one row of the conversion table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversionKind {
    PngToJpg,
    JpgToPng,
    ToWebp,
    WebpToPng,
    ImageToPdf,
    CsvToJson,
    JsonToCsv,
    CsvToExcel,
    ExcelToCsv,
    JsonToExcel,
    ExcelToJson,
    JsonToYaml,
    YamlToJson,
    MdToHtml,
}

impl ConversionKind {
    /// Every conversion, in table order.
    pub const ALL: [ConversionKind; 14] = [
        ConversionKind::PngToJpg,
        ConversionKind::JpgToPng,
        ConversionKind::ToWebp,
        ConversionKind::WebpToPng,
        ConversionKind::ImageToPdf,
        ConversionKind::CsvToJson,
        ConversionKind::JsonToCsv,
        ConversionKind::CsvToExcel,
        ConversionKind::ExcelToCsv,
        ConversionKind::JsonToExcel,
        ConversionKind::ExcelToJson,
        ConversionKind::JsonToYaml,
        ConversionKind::YamlToJson,
        ConversionKind::MdToHtml,
    ];

    /// The table row for this conversion.
    pub fn spec(self) -> &'static ConversionSpec {
        // Rows are laid out in `ALL` order; the table test pins that.
        &CONVERSION_TABLE[self as usize]
    }

    /// The wire identifier, e.g. `"csv_to_json"`.
    pub fn id(self) -> &'static str {
        self.spec().id
    }
}

impl fmt::Display for ConversionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for ConversionKind {
    type Err = ConvertError;

    /// Identifiers are matched exactly; there is no case folding.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        lookup(s)
            .map(|spec| spec.kind)
            .ok_or_else(|| ConvertError::UnsupportedConversion { id: s.to_string() })
    }
}

/// Groups used to lay out the upload form and `--list` output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    Image,
    Data,
    Yaml,
    Document,
}

impl Category {
    pub fn label(self) -> &'static str {
        match self {
            Category::Image => "Image",
            Category::Data => "Data",
            Category::Yaml => "YAML",
            Category::Document => "Document",
        }
    }
}

/// One row of the conversion table.
#[derive(Debug)]
pub struct ConversionSpec {
    pub kind: ConversionKind,
    pub id: &'static str,
    pub category: Category,
    /// Short label for menus, e.g. "PNG → JPG".
    pub label: &'static str,
    /// What the input must be, as shown in `InvalidInputFormat`.
    pub expected: &'static str,
    /// Accepted input extensions, lower-case, without the dot.
    pub input_extensions: &'static [&'static str],
    pub output_extension: &'static str,
    pub output_mime: &'static str,
    pub action: Action,
}

impl ConversionSpec {
    /// Whether `ext` (lower-case, no dot) is an accepted input extension.
    pub fn accepts(&self, ext: &str) -> bool {
        self.input_extensions.contains(&ext)
    }
}

const IMAGE_EXTS: &[&str] = &["png", "jpg", "jpeg", "bmp", "webp"];
const EXCEL_EXTS: &[&str] = &["xlsx", "xls"];

const MIME_JSON: &str = "application/json";
const MIME_CSV: &str = "text/csv";
const MIME_XLSX: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// The conversion table, in [`ConversionKind::ALL`] order.
pub static CONVERSION_TABLE: [ConversionSpec; 14] = [
    ConversionSpec {
        kind: ConversionKind::PngToJpg,
        id: "png_to_jpg",
        category: Category::Image,
        label: "PNG → JPG",
        expected: "PNG",
        input_extensions: &["png"],
        output_extension: "jpg",
        output_mime: "image/jpeg",
        action: codec::image::to_jpeg,
    },
    ConversionSpec {
        kind: ConversionKind::JpgToPng,
        id: "jpg_to_png",
        category: Category::Image,
        label: "JPG → PNG",
        expected: "JPG or JPEG",
        input_extensions: &["jpg", "jpeg"],
        output_extension: "png",
        output_mime: "image/png",
        action: codec::image::to_png,
    },
    ConversionSpec {
        kind: ConversionKind::ToWebp,
        id: "to_webp",
        category: Category::Image,
        label: "Image → WEBP",
        expected: "an image",
        input_extensions: &["png", "jpg", "jpeg", "bmp"],
        output_extension: "webp",
        output_mime: "image/webp",
        action: codec::image::to_webp,
    },
    ConversionSpec {
        kind: ConversionKind::WebpToPng,
        id: "webp_to_png",
        category: Category::Image,
        label: "WEBP → PNG",
        expected: "WEBP",
        input_extensions: &["webp"],
        output_extension: "png",
        output_mime: "image/png",
        action: codec::image::to_png,
    },
    ConversionSpec {
        kind: ConversionKind::ImageToPdf,
        id: "image_to_pdf",
        category: Category::Image,
        label: "Image → PDF",
        expected: "an image",
        input_extensions: IMAGE_EXTS,
        output_extension: "pdf",
        output_mime: "application/pdf",
        action: codec::pdf::image_to_pdf,
    },
    ConversionSpec {
        kind: ConversionKind::CsvToJson,
        id: "csv_to_json",
        category: Category::Data,
        label: "CSV → JSON",
        expected: "CSV",
        input_extensions: &["csv"],
        output_extension: "json",
        output_mime: MIME_JSON,
        action: codec::table::csv_to_json,
    },
    ConversionSpec {
        kind: ConversionKind::JsonToCsv,
        id: "json_to_csv",
        category: Category::Data,
        label: "JSON → CSV",
        expected: "JSON",
        input_extensions: &["json"],
        output_extension: "csv",
        output_mime: MIME_CSV,
        action: codec::table::json_to_csv,
    },
    ConversionSpec {
        kind: ConversionKind::CsvToExcel,
        id: "csv_to_excel",
        category: Category::Data,
        label: "CSV → Excel",
        expected: "CSV",
        input_extensions: &["csv"],
        output_extension: "xlsx",
        output_mime: MIME_XLSX,
        action: codec::table::csv_to_excel,
    },
    ConversionSpec {
        kind: ConversionKind::ExcelToCsv,
        id: "excel_to_csv",
        category: Category::Data,
        label: "Excel → CSV",
        expected: "Excel",
        input_extensions: EXCEL_EXTS,
        output_extension: "csv",
        output_mime: MIME_CSV,
        action: codec::table::excel_to_csv,
    },
    ConversionSpec {
        kind: ConversionKind::JsonToExcel,
        id: "json_to_excel",
        category: Category::Data,
        label: "JSON → Excel",
        expected: "JSON",
        input_extensions: &["json"],
        output_extension: "xlsx",
        output_mime: MIME_XLSX,
        action: codec::table::json_to_excel,
    },
    ConversionSpec {
        kind: ConversionKind::ExcelToJson,
        id: "excel_to_json",
        category: Category::Data,
        label: "Excel → JSON",
        expected: "Excel",
        input_extensions: EXCEL_EXTS,
        output_extension: "json",
        output_mime: MIME_JSON,
        action: codec::table::excel_to_json,
    },
    ConversionSpec {
        kind: ConversionKind::JsonToYaml,
        id: "json_to_yaml",
        category: Category::Yaml,
        label: "JSON → YAML",
        expected: "JSON",
        input_extensions: &["json"],
        output_extension: "yaml",
        output_mime: "application/yaml",
        action: codec::structured::json_to_yaml,
    },
    ConversionSpec {
        kind: ConversionKind::YamlToJson,
        id: "yaml_to_json",
        category: Category::Yaml,
        label: "YAML → JSON",
        expected: "YAML",
        input_extensions: &["yaml", "yml"],
        output_extension: "json",
        output_mime: MIME_JSON,
        action: codec::structured::yaml_to_json,
    },
    ConversionSpec {
        kind: ConversionKind::MdToHtml,
        id: "md_to_html",
        category: Category::Document,
        label: "Markdown → HTML",
        expected: "Markdown (.md)",
        input_extensions: &["md"],
        output_extension: "html",
        output_mime: "text/html; charset=utf-8",
        action: codec::markup::markdown_to_html,
    },
];

/// Find the table row for a wire identifier.
pub fn lookup(id: &str) -> Option<&'static ConversionSpec> {
    CONVERSION_TABLE.iter().find(|spec| spec.id == id)
}

/// Whether an uploaded filename carries one of [`ALLOWED_UPLOAD_EXTENSIONS`].
pub fn is_allowed_upload(filename: &str) -> bool {
    match filename.rsplit_once('.') {
        Some((_, ext)) => ALLOWED_UPLOAD_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_rows_follow_kind_order() {
        for (i, kind) in ConversionKind::ALL.iter().enumerate() {
            assert_eq!(CONVERSION_TABLE[i].kind, *kind, "row {i} out of order");
            assert_eq!(*kind as usize, i);
        }
    }

    #[test]
    fn identifiers_round_trip() {
        for kind in ConversionKind::ALL {
            let parsed: ConversionKind = kind.id().parse().expect("known id");
            assert_eq!(parsed, kind);
            assert_eq!(kind.to_string(), kind.id());
        }
    }

    #[test]
    fn serde_name_matches_id() {
        for kind in ConversionKind::ALL {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.id()));
        }
    }

    #[test]
    fn unknown_identifier_is_unsupported() {
        let err = "gif_to_png".parse::<ConversionKind>().unwrap_err();
        assert!(matches!(err, ConvertError::UnsupportedConversion { ref id } if id == "gif_to_png"));
        assert!("CSV_TO_JSON".parse::<ConversionKind>().is_err());
    }

    #[test]
    fn accepted_extensions_are_uploadable() {
        for spec in &CONVERSION_TABLE {
            for ext in spec.input_extensions {
                assert!(
                    ALLOWED_UPLOAD_EXTENSIONS.contains(ext),
                    "{} accepts .{ext} which uploads reject",
                    spec.id
                );
            }
        }
    }

    #[test]
    fn excel_rows_accept_legacy_and_modern() {
        assert!(ConversionKind::ExcelToCsv.spec().accepts("xls"));
        assert!(ConversionKind::ExcelToCsv.spec().accepts("xlsx"));
        assert!(ConversionKind::ExcelToJson.spec().accepts("xls"));
    }

    #[test]
    fn allowed_upload_check() {
        assert!(is_allowed_upload("photo.PNG"));
        assert!(is_allowed_upload("archive.tar.yml"));
        assert!(!is_allowed_upload("script.exe"));
        assert!(!is_allowed_upload("noextension"));
        assert!(!is_allowed_upload(""));
    }
}
