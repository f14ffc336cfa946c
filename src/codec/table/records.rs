//! JSON ⇄ table.
//!
//! Output is always an array of records (one object per row, keys in column
//! order). Input accepts the common table shapes:
//!
//! | JSON                                   | Columns                      |
//! |----------------------------------------|------------------------------|
//! | `[{"a": 1}, {"a": 2, "b": 3}]`          | union of keys, first seen    |
//! | `[[1, 2], [3, 4]]`                      | `"0"`, `"1"`, …              |
//! | `[1, 2, 3]`                             | `"0"`                        |
//! | `{"a": {"r1": 1}, "b": {"r1": 2}}`      | outer keys, rows = inner keys|
//! | `{"a": [1, 2], "b": [3, 4]}`            | outer keys                   |

use super::{Cell, Table};
use crate::codec::structured::write_json;
use crate::error::CodecError;
use serde_json::{Map, Number, Value};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

pub fn read(path: &Path) -> Result<Table, CodecError> {
    let value: Value = serde_json::from_reader(BufReader::new(File::open(path)?))?;
    let mut table = from_value(value)?;
    table.promote_mixed_numeric_columns();
    Ok(table)
}

pub fn write(table: &Table, path: &Path, indent: usize) -> Result<(), CodecError> {
    write_json(&to_records(table), path, indent)
}

fn to_records(table: &Table) -> Value {
    let records = table
        .rows()
        .iter()
        .map(|row| {
            let obj: Map<String, Value> = table
                .columns()
                .iter()
                .cloned()
                .zip(row.iter().map(cell_to_json))
                .collect();
            Value::Object(obj)
        })
        .collect();
    Value::Array(records)
}

fn cell_to_json(cell: &Cell) -> Value {
    match cell {
        Cell::Null => Value::Null,
        Cell::Bool(b) => Value::Bool(*b),
        Cell::Int(i) => Value::from(*i),
        Cell::Float(f) => Number::from_f64(*f).map(Value::Number).unwrap_or(Value::Null),
        Cell::Text(s) => Value::String(s.clone()),
    }
}

fn json_to_cell(value: Value) -> Cell {
    match value {
        Value::Null => Cell::Null,
        Value::Bool(b) => Cell::Bool(b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => Cell::Int(i),
            None => Cell::float(n.as_f64().unwrap_or(f64::NAN)),
        },
        Value::String(s) => Cell::Text(s),
        nested @ (Value::Array(_) | Value::Object(_)) => Cell::Text(nested.to_string()),
    }
}

fn shape_error(msg: &str) -> CodecError {
    CodecError::Table(msg.to_string())
}

fn from_value(value: Value) -> Result<Table, CodecError> {
    match value {
        Value::Array(items) => from_array(items),
        Value::Object(map) => from_object(map),
        _ => Err(shape_error(
            "expected an array of records or an object of columns",
        )),
    }
}

fn from_array(items: Vec<Value>) -> Result<Table, CodecError> {
    if items.iter().all(Value::is_object) {
        let mut columns: Vec<String> = Vec::new();
        for item in &items {
            if let Value::Object(obj) = item {
                for key in obj.keys() {
                    if !columns.contains(key) {
                        columns.push(key.clone());
                    }
                }
            }
        }
        let mut table = Table::new(columns.clone());
        for item in items {
            if let Value::Object(mut obj) = item {
                let row = columns
                    .iter()
                    .map(|c| obj.remove(c).map(json_to_cell).unwrap_or(Cell::Null))
                    .collect();
                table.push_row(row)?;
            }
        }
        return Ok(table);
    }

    if items.iter().all(Value::is_array) {
        let width = items
            .iter()
            .filter_map(Value::as_array)
            .map(Vec::len)
            .max()
            .unwrap_or(0);
        let mut table = Table::new((0..width).map(|i| i.to_string()).collect());
        for item in items {
            if let Value::Array(values) = item {
                table.push_row(values.into_iter().map(json_to_cell).collect())?;
            }
        }
        return Ok(table);
    }

    if items.iter().any(|v| v.is_object() || v.is_array()) {
        return Err(shape_error("array mixes records with other values"));
    }
    let mut table = Table::new(vec!["0".to_string()]);
    for item in items {
        table.push_row(vec![json_to_cell(item)])?;
    }
    Ok(table)
}

fn from_object(map: Map<String, Value>) -> Result<Table, CodecError> {
    if map.is_empty() {
        return Ok(Table::default());
    }
    let columns: Vec<String> = map.keys().cloned().collect();

    if map.values().all(Value::is_object) {
        let mut labels: Vec<String> = Vec::new();
        for inner in map.values().filter_map(Value::as_object) {
            for key in inner.keys() {
                if !labels.contains(key) {
                    labels.push(key.clone());
                }
            }
        }
        let mut by_column: Vec<Map<String, Value>> = map
            .into_iter()
            .filter_map(|(_, v)| match v {
                Value::Object(inner) => Some(inner),
                _ => None,
            })
            .collect();
        let mut table = Table::new(columns);
        for label in &labels {
            let row = by_column
                .iter_mut()
                .map(|inner| inner.remove(label).map(json_to_cell).unwrap_or(Cell::Null))
                .collect();
            table.push_row(row)?;
        }
        return Ok(table);
    }

    if map.values().any(Value::is_object) {
        return Err(shape_error("object mixes nested records with other values"));
    }
    if !map.values().any(Value::is_array) {
        return Err(shape_error(
            "an object of scalar values has no rows; use an array of records",
        ));
    }

    // Arrays are columns; a bare scalar is repeated down its column.
    let lengths: Vec<usize> = map.values().filter_map(Value::as_array).map(Vec::len).collect();
    let height = lengths[0];
    if lengths.iter().any(|&n| n != height) {
        return Err(shape_error("all column arrays must have the same length"));
    }
    let mut cols: Vec<Vec<Cell>> = map
        .into_iter()
        .map(|(_, v)| match v {
            Value::Array(values) => values.into_iter().map(json_to_cell).collect(),
            scalar => vec![json_to_cell(scalar); height],
        })
        .collect();
    let mut table = Table::new(columns);
    for r in 0..height {
        let row = cols
            .iter_mut()
            .map(|col| std::mem::replace(&mut col[r], Cell::Null))
            .collect();
        table.push_row(row)?;
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn table(value: Value) -> Table {
        from_value(value).unwrap()
    }

    #[test]
    fn records_union_keys_in_order() {
        let t = table(json!([{"a": 1, "b": "x"}, {"c": true, "a": 2}]));
        assert_eq!(t.columns(), &["a", "b", "c"]);
        assert_eq!(t.rows()[0], vec![Cell::Int(1), Cell::Text("x".into()), Cell::Null]);
        assert_eq!(t.rows()[1], vec![Cell::Int(2), Cell::Null, Cell::Bool(true)]);
    }

    #[test]
    fn nested_values_become_compact_json() {
        let t = table(json!([{"tags": ["a", "b"], "meta": {"k": 1}}]));
        assert_eq!(t.rows()[0][0], Cell::Text(r#"["a","b"]"#.into()));
        assert_eq!(t.rows()[0][1], Cell::Text(r#"{"k":1}"#.into()));
    }

    #[test]
    fn arrays_of_arrays_get_positional_columns() {
        let t = table(json!([[1, 2, 3], [4]]));
        assert_eq!(t.columns(), &["0", "1", "2"]);
        assert_eq!(t.rows()[1], vec![Cell::Int(4), Cell::Null, Cell::Null]);
    }

    #[test]
    fn array_of_scalars_is_one_column() {
        let t = table(json!(["x", null, 3]));
        assert_eq!(t.columns(), &["0"]);
        assert_eq!(t.rows().len(), 3);
    }

    #[test]
    fn object_of_objects_is_column_oriented() {
        let t = table(json!({"a": {"r1": 1, "r2": 2}, "b": {"r2": 5}}));
        assert_eq!(t.columns(), &["a", "b"]);
        assert_eq!(t.rows()[0], vec![Cell::Int(1), Cell::Null]);
        assert_eq!(t.rows()[1], vec![Cell::Int(2), Cell::Int(5)]);
    }

    #[test]
    fn object_of_arrays_broadcasts_scalars() {
        let t = table(json!({"a": [1, 2], "b": "k"}));
        assert_eq!(t.rows()[1], vec![Cell::Int(2), Cell::Text("k".into())]);
    }

    #[test]
    fn unsupported_shapes_rejected() {
        assert!(from_value(json!({"a": 1, "b": 2})).is_err());
        assert!(from_value(json!({"a": [1], "b": [1, 2]})).is_err());
        assert!(from_value(json!(42)).is_err());
        assert!(from_value(json!([{"a": 1}, 2])).is_err());
    }

    #[test]
    fn empty_inputs_are_empty_tables() {
        assert_eq!(table(json!([])).rows().len(), 0);
        assert_eq!(table(json!({})).columns().len(), 0);
    }

    #[test]
    fn records_output_keeps_column_order_and_nulls() {
        let mut t = Table::new(vec!["z".into(), "a".into()]);
        t.push_row(vec![Cell::Float(f64::INFINITY), Cell::Int(1)]).unwrap();
        let v = to_records(&t);
        assert_eq!(v, json!([{"z": null, "a": 1}]));
        let text = serde_json::to_string(&v).unwrap();
        assert!(text.find("\"z\"").unwrap() < text.find("\"a\"").unwrap());
    }
}
