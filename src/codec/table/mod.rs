//! Tabular data: an in-memory [`Table`] plus CSV, Excel and JSON-records
//! readers and writers.
//!
//! Every data conversion is "read a table, write a table": the six actions at
//! the bottom of this module pair one reader with one writer.
//!
//! ## Column typing
//!
//! Readers hand back typed [`Cell`]s. CSV has no types, so the whole column is
//! inferred at once (all integers → `Int`, all numbers → `Float`, all boolean
//! literals → `Bool`, anything else keeps the original text). Spreadsheets
//! store every number as a float, so integral numeric columns are folded back
//! to `Int`. JSON keeps its own types, except that a column mixing integers and
//! floats becomes all floats.

mod delimited;
mod records;
mod workbook;

use crate::config::ConversionConfig;
use crate::error::CodecError;
use std::collections::HashSet;
use std::path::Path;

/// One typed cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Cell {
    /// Float cell; NaN is a missing value.
    pub fn float(f: f64) -> Cell {
        if f.is_nan() {
            Cell::Null
        } else {
            Cell::Float(f)
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }
}

/// Ordered columns and rows of [`Cell`]s. Every row is exactly as wide as
/// the header.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    /// Append a row, padding short rows with nulls.
    pub fn push_row(&mut self, mut row: Vec<Cell>) -> Result<(), CodecError> {
        if row.len() > self.columns.len() {
            return Err(CodecError::Table(format!(
                "row {} has {} fields, header has {}",
                self.rows.len() + 1,
                row.len(),
                self.columns.len()
            )));
        }
        row.resize(self.columns.len(), Cell::Null);
        self.rows.push(row);
        Ok(())
    }

    /// In columns holding only numbers, turn integers into floats when any
    /// float is present.
    fn promote_mixed_numeric_columns(&mut self) {
        for col in 0..self.columns.len() {
            let mut has_float = false;
            let mut numeric = true;
            for row in &self.rows {
                match row[col] {
                    Cell::Float(_) => has_float = true,
                    Cell::Int(_) | Cell::Null => {}
                    _ => numeric = false,
                }
            }
            if has_float && numeric {
                for row in &mut self.rows {
                    if let Cell::Int(i) = row[col] {
                        row[col] = Cell::Float(i as f64);
                    }
                }
            }
        }
    }

    /// In columns holding only numbers, turn floats into integers when every
    /// one of them is integral.
    fn collapse_integral_floats(&mut self) {
        for col in 0..self.columns.len() {
            let integral = self.rows.iter().all(|row| match row[col] {
                Cell::Float(f) => is_integral(f),
                Cell::Int(_) | Cell::Null => true,
                _ => false,
            });
            if integral {
                for row in &mut self.rows {
                    if let Cell::Float(f) = row[col] {
                        row[col] = Cell::Int(f as i64);
                    }
                }
            }
        }
    }
}

fn is_integral(f: f64) -> bool {
    f.is_finite() && f.fract() == 0.0 && f.abs() < 9.0e15
}

/// Make header names usable as unique column keys.
///
/// Empty names become `Unnamed: {index}`; repeats get `.1`, `.2`, … suffixes.
pub fn normalize_headers(raw: Vec<String>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::with_capacity(raw.len());
    let mut out = Vec::with_capacity(raw.len());
    for (i, name) in raw.into_iter().enumerate() {
        let base = if name.is_empty() {
            format!("Unnamed: {i}")
        } else {
            name
        };
        let mut candidate = base.clone();
        let mut n = 1;
        while seen.contains(&candidate) {
            candidate = format!("{base}.{n}");
            n += 1;
        }
        seen.insert(candidate.clone());
        out.push(candidate);
    }
    out
}

// ── Actions ──────────────────────────────────────────────────────────────

pub fn csv_to_json(input: &Path, output: &Path, config: &ConversionConfig) -> Result<(), CodecError> {
    let table = delimited::read(input, config.csv_delimiter)?;
    records::write(&table, output, config.json_indent)
}

pub fn json_to_csv(input: &Path, output: &Path, config: &ConversionConfig) -> Result<(), CodecError> {
    let table = records::read(input)?;
    delimited::write(&table, output, config.csv_delimiter)
}

pub fn csv_to_excel(input: &Path, output: &Path, config: &ConversionConfig) -> Result<(), CodecError> {
    let table = delimited::read(input, config.csv_delimiter)?;
    workbook::write(&table, output, &config.sheet_name)
}

pub fn excel_to_csv(input: &Path, output: &Path, config: &ConversionConfig) -> Result<(), CodecError> {
    let table = workbook::read(input)?;
    delimited::write(&table, output, config.csv_delimiter)
}

pub fn json_to_excel(input: &Path, output: &Path, config: &ConversionConfig) -> Result<(), CodecError> {
    let table = records::read(input)?;
    workbook::write(&table, output, &config.sheet_name)
}

pub fn excel_to_json(input: &Path, output: &Path, config: &ConversionConfig) -> Result<(), CodecError> {
    let table = workbook::read(input)?;
    records::write(&table, output, config.json_indent)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn headers_deduplicated_and_named() {
        let out = normalize_headers(strings(&["a", "", "a", "b", "a"]));
        assert_eq!(out, strings(&["a", "Unnamed: 1", "a.1", "b", "a.2"]));
    }

    #[test]
    fn header_suffix_skips_taken_names() {
        let out = normalize_headers(strings(&["a", "a.1", "a"]));
        assert_eq!(out, strings(&["a", "a.1", "a.2"]));
    }

    #[test]
    fn short_rows_padded_long_rows_rejected() {
        let mut t = Table::new(strings(&["a", "b"]));
        t.push_row(vec![Cell::Int(1)]).unwrap();
        assert_eq!(t.rows()[0], vec![Cell::Int(1), Cell::Null]);
        let err = t
            .push_row(vec![Cell::Int(1), Cell::Int(2), Cell::Int(3)])
            .unwrap_err();
        assert!(err.to_string().contains("3 fields"));
    }

    #[test]
    fn mixed_numeric_column_promoted() {
        let mut t = Table::new(strings(&["x", "y"]));
        t.push_row(vec![Cell::Int(1), Cell::Int(1)]).unwrap();
        t.push_row(vec![Cell::Float(2.5), Cell::Text("z".into())]).unwrap();
        t.promote_mixed_numeric_columns();
        assert_eq!(t.rows()[0][0], Cell::Float(1.0));
        assert_eq!(t.rows()[0][1], Cell::Int(1));
    }

    #[test]
    fn integral_floats_collapsed() {
        let mut t = Table::new(strings(&["n", "m"]));
        t.push_row(vec![Cell::Float(3.0), Cell::Float(0.5)]).unwrap();
        t.push_row(vec![Cell::Null, Cell::Float(2.0)]).unwrap();
        t.collapse_integral_floats();
        assert_eq!(t.rows()[0][0], Cell::Int(3));
        assert_eq!(t.rows()[1][0], Cell::Null);
        assert_eq!(t.rows()[1][1], Cell::Float(2.0));
    }

    #[test]
    fn nan_float_is_null() {
        assert!(Cell::float(f64::NAN).is_null());
        assert_eq!(Cell::float(1.5), Cell::Float(1.5));
    }
}
