//! CSV reader and writer.

use super::{normalize_headers, Cell, Table};
use crate::error::CodecError;
use std::path::Path;
use tracing::debug;

/// Field values read as missing.
const NA_VALUES: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

const TRUE_VALUES: &[&str] = &["True", "TRUE", "true"];
const FALSE_VALUES: &[&str] = &["False", "FALSE", "false"];

/// Read a CSV file whose first record is the header.
pub fn read(path: &Path, delimiter: u8) -> Result<Table, CodecError> {
    let mut reader = ::csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;

    let header: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    if header.is_empty() || (header.len() == 1 && header[0].is_empty()) {
        return Err(CodecError::Table("no columns to parse from file".into()));
    }
    let columns = normalize_headers(header);
    let width = columns.len();

    // Column-major raw values, typed once every row is in.
    let mut raw: Vec<Vec<String>> = vec![Vec::new(); width];
    let mut row_count = 0usize;
    for record in reader.records() {
        let record = record?;
        if record.len() == 1 && record[0].is_empty() {
            continue;
        }
        if record.len() > width {
            let line = record.position().map(|p| p.line()).unwrap_or(0);
            return Err(CodecError::Table(format!(
                "line {line}: expected {width} fields, saw {}",
                record.len()
            )));
        }
        for (col, values) in raw.iter_mut().enumerate() {
            values.push(record.get(col).unwrap_or("").to_string());
        }
        row_count += 1;
    }

    let typed: Vec<Vec<Cell>> = raw.into_iter().map(infer_column).collect();
    let mut table = Table::new(columns);
    for r in 0..row_count {
        table.push_row(typed.iter().map(|col| col[r].clone()).collect())?;
    }
    debug!("Read CSV {}: {} columns × {} rows", path.display(), width, row_count);
    Ok(table)
}

fn is_na(s: &str) -> bool {
    NA_VALUES.contains(&s)
}

/// Type one column from its raw strings.
fn infer_column(values: Vec<String>) -> Vec<Cell> {
    let present = || values.iter().filter(|v| !is_na(v));

    let all_int = present().all(|v| v.trim().parse::<i64>().is_ok());
    let all_float = all_int || present().all(|v| v.trim().parse::<f64>().is_ok());
    let all_bool = present().all(|v| TRUE_VALUES.contains(&v.as_str()) || FALSE_VALUES.contains(&v.as_str()));

    values
        .iter()
        .map(|v| {
            if is_na(v) {
                Cell::Null
            } else if all_int {
                v.trim().parse().map(Cell::Int).unwrap_or(Cell::Null)
            } else if all_float {
                v.trim().parse().map(Cell::float).unwrap_or(Cell::Null)
            } else if all_bool {
                Cell::Bool(TRUE_VALUES.contains(&v.as_str()))
            } else {
                Cell::Text(v.clone())
            }
        })
        .collect()
}

/// Write `table` as CSV: header row, no index column.
pub fn write(table: &Table, path: &Path, delimiter: u8) -> Result<(), CodecError> {
    let mut writer = ::csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_path(path)?;
    writer.write_record(table.columns())?;
    for row in table.rows() {
        writer.write_record(row.iter().map(field))?;
    }
    writer.flush()?;
    Ok(())
}

fn field(cell: &Cell) -> String {
    match cell {
        Cell::Null => String::new(),
        Cell::Bool(true) => "True".to_string(),
        Cell::Bool(false) => "False".to_string(),
        Cell::Int(i) => i.to_string(),
        Cell::Float(f) => format_float(*f),
        Cell::Text(s) => s.clone(),
    }
}

/// Floats keep a decimal point so they read back as floats.
fn format_float(f: f64) -> String {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e16 {
        format!("{f:.1}")
    } else {
        f.to_string()
    }
}
