//! Excel workbooks: read the first sheet with calamine, write `.xlsx` with
//! rust_xlsxwriter.

use super::{normalize_headers, Cell, Table};
use crate::error::CodecError;
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use rust_xlsxwriter::{Format, FormatBorder, Workbook};
use std::io::Cursor;
use std::path::Path;
use tracing::debug;

/// Read the first worksheet; its first row is the header.
///
/// The container format (xlsx, xlsm, xlsb, xls, ods) is detected from the
/// bytes, so an `.xls` name holding an `.xlsx` workbook still opens.
pub fn read(path: &Path) -> Result<Table, CodecError> {
    let bytes = std::fs::read(path)?;
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| CodecError::Table("workbook has no worksheets".into()))??;

    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Ok(Table::default());
    };
    let mut table = Table::new(normalize_headers(header.iter().map(header_text).collect()));
    for row in rows {
        table.push_row(row.iter().map(data_to_cell).collect())?;
    }
    table.collapse_integral_floats();

    debug!(
        "Read workbook {}: {} columns × {} rows",
        path.display(),
        table.columns().len(),
        table.rows().len()
    );
    Ok(table)
}

fn header_text(data: &Data) -> String {
    match data_to_cell(data) {
        Cell::Null => String::new(),
        Cell::Bool(b) => if b { "True" } else { "False" }.to_string(),
        Cell::Int(i) => i.to_string(),
        Cell::Float(f) if super::is_integral(f) => (f as i64).to_string(),
        Cell::Float(f) => f.to_string(),
        Cell::Text(s) => s,
    }
}

fn data_to_cell(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Null,
        Data::Int(i) => Cell::Int(*i),
        Data::Float(f) => Cell::float(*f),
        Data::Bool(b) => Cell::Bool(*b),
        Data::String(s) if s.is_empty() => Cell::Null,
        Data::String(s) => Cell::Text(s.clone()),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(ndt) => Cell::Text(ndt.to_string()),
            None => Cell::float(dt.as_f64()),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
        Data::Error(e) => Cell::Text(e.to_string()),
    }
}

/// Write `table` to a single-sheet `.xlsx` workbook with a bold header row.
pub fn write(table: &Table, path: &Path, sheet_name: &str) -> Result<(), CodecError> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold().set_border(FormatBorder::Thin);

    let sheet = workbook.add_worksheet();
    sheet.set_name(sheet_name)?;

    for (c, name) in table.columns().iter().enumerate() {
        sheet.write_string_with_format(0, column_number(c)?, name, &header)?;
    }
    for (r, row) in table.rows().iter().enumerate() {
        let r = u32::try_from(r + 1)
            .map_err(|_| CodecError::Table("too many rows for a worksheet".into()))?;
        for (c, cell) in row.iter().enumerate() {
            let c = column_number(c)?;
            match cell {
                Cell::Null => {}
                Cell::Bool(b) => {
                    sheet.write_boolean(r, c, *b)?;
                }
                Cell::Int(i) => {
                    sheet.write_number(r, c, *i as f64)?;
                }
                Cell::Float(f) if f.is_finite() => {
                    sheet.write_number(r, c, *f)?;
                }
                Cell::Float(f) => {
                    sheet.write_string(r, c, f.to_string())?;
                }
                Cell::Text(s) => {
                    sheet.write_string(r, c, s)?;
                }
            }
        }
    }

    workbook.save(path)?;
    debug!("Wrote workbook {} ({} rows)", path.display(), table.rows().len());
    Ok(())
}

fn column_number(c: usize) -> Result<u16, CodecError> {
    u16::try_from(c).map_err(|_| CodecError::Table("too many columns for a worksheet".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        let mut t = Table::new(vec!["name".into(), "qty".into(), "price".into(), "ok".into()]);
        t.push_row(vec![
            Cell::Text("apple".into()),
            Cell::Int(3),
            Cell::Float(1.25),
            Cell::Bool(true),
        ])
        .unwrap();
        t.push_row(vec![Cell::Text("pear".into()), Cell::Null, Cell::Float(2.0), Cell::Bool(false)])
            .unwrap();
        t
    }

    #[test]
    fn xlsx_round_trip_keeps_types() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.xlsx");
        write(&sample(), &path, "Sheet1").unwrap();

        let back = read(&path).unwrap();
        assert_eq!(back.columns(), sample().columns());
        assert_eq!(back.rows()[0][1], Cell::Int(3));
        assert_eq!(back.rows()[1][1], Cell::Null);
        assert_eq!(back.rows()[0][2], Cell::Float(1.25));
        assert_eq!(back.rows()[1][3], Cell::Bool(false));
    }

    #[test]
    fn xls_extension_with_xlsx_content_opens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("legacy.xls");
        write(&sample(), &path, "Sheet1").unwrap();
        assert_eq!(read(&path).unwrap().rows().len(), 2);
    }

    #[test]
    fn non_workbook_bytes_fail() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fake.xlsx");
        std::fs::write(&path, b"name,qty\n").unwrap();
        assert!(read(&path).is_err());
    }

    #[test]
    fn invalid_sheet_name_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let err = write(&sample(), &dir.path().join("x.xlsx"), "bad[name]").unwrap_err();
        assert!(matches!(err, CodecError::Xlsx(_)), "got {err:?}");
    }
}
