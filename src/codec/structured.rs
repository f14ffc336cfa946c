//! JSON ⇄ YAML, plus the pretty JSON writer shared with the table codecs.

use crate::config::ConversionConfig;
use crate::error::CodecError;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Number, Value};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// Write `value` as JSON indented by `indent` spaces, without a trailing
/// newline.
pub fn write_json(value: &Value, path: &Path, indent: usize) -> Result<(), CodecError> {
    let indent = vec![b' '; indent];
    let mut writer = BufWriter::new(File::create(path)?);
    let mut ser = serde_json::Serializer::with_formatter(&mut writer, PrettyFormatter::with_indent(&indent));
    value.serialize(&mut ser)?;
    writer.flush()?;
    Ok(())
}

/// `json_to_yaml`: any JSON document to block-style YAML.
pub fn json_to_yaml(input: &Path, output: &Path, config: &ConversionConfig) -> Result<(), CodecError> {
    let mut value: Value = serde_json::from_reader(BufReader::new(File::open(input)?))?;
    if config.sort_yaml_keys {
        value = sort_keys(value);
    }
    let mut writer = BufWriter::new(File::create(output)?);
    serde_yaml::to_writer(&mut writer, &value)?;
    writer.flush()?;
    Ok(())
}

/// `yaml_to_json`: a single plain YAML document to indented JSON.
///
/// An empty document is `null`. Merge keys (`<<: *anchor`) are resolved;
/// tagged nodes are rejected. Plain scalars follow YAML 1.2, so `yes`/`no`
/// stay strings.
pub fn yaml_to_json(input: &Path, output: &Path, config: &ConversionConfig) -> Result<(), CodecError> {
    let text = std::fs::read_to_string(input)?;
    let json = if text.trim().is_empty() {
        Value::Null
    } else {
        let mut yaml: serde_yaml::Value = serde_yaml::from_str(&text)?;
        yaml.apply_merge()?;
        yaml_to_value(yaml)?
    };
    write_json(&json, output, config.json_indent)
}

fn sort_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            Value::Object(entries.into_iter().map(|(k, v)| (k, sort_keys(v))).collect())
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sort_keys).collect()),
        other => other,
    }
}

fn yaml_to_value(yaml: serde_yaml::Value) -> Result<Value, CodecError> {
    use serde_yaml::Value as Y;
    Ok(match yaml {
        Y::Null => Value::Null,
        Y::Bool(b) => Value::Bool(b),
        Y::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::from(i)
            } else if let Some(u) = n.as_u64() {
                Value::from(u)
            } else {
                n.as_f64()
                    .and_then(Number::from_f64)
                    .map(Value::Number)
                    .unwrap_or(Value::Null)
            }
        }
        Y::String(s) => Value::String(s),
        Y::Sequence(items) => Value::Array(
            items
                .into_iter()
                .map(yaml_to_value)
                .collect::<Result<_, _>>()?,
        ),
        Y::Mapping(mapping) => {
            let mut obj = Map::with_capacity(mapping.len());
            for (k, v) in mapping {
                obj.insert(key_string(k)?, yaml_to_value(v)?);
            }
            Value::Object(obj)
        }
        Y::Tagged(tagged) => {
            return Err(CodecError::Yaml(format!(
                "could not determine a constructor for the tag {}",
                tagged.tag
            )))
        }
    })
}

/// JSON keys are strings; scalar YAML keys are rendered the way JSON would
/// render the value.
fn key_string(key: serde_yaml::Value) -> Result<String, CodecError> {
    use serde_yaml::Value as Y;
    match key {
        Y::String(s) => Ok(s),
        Y::Null => Ok("null".to_string()),
        Y::Bool(b) => Ok(b.to_string()),
        Y::Number(n) => Ok(n.to_string()),
        Y::Sequence(_) | Y::Mapping(_) => Err(CodecError::Yaml(
            "mapping keys must be scalars to convert to JSON".into(),
        )),
        Y::Tagged(tagged) => Err(CodecError::Yaml(format!(
            "could not determine a constructor for the tag {}",
            tagged.tag
        ))),
    }
}
