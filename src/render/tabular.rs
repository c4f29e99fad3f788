//! Tabular export. Two-mode contract: with tables present, every table is
//! concatenated into one CSV stream; with no tables, the whole document is
//! flattened into a Key,Value dump. The fallback is not an error.

use crate::error::PipelineError;
use crate::render::display_value;
use serde_json::Value;

pub fn to_csv(data: &Value) -> Result<String, PipelineError> {
    let tables = data
        .get("tables")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[]);

    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_writer(Vec::new());

    if tables.is_empty() {
        writer
            .write_record(["Key", "Value"])
            .map_err(|error| PipelineError::io(format!("failed to write CSV record: {error}")))?;
        let mut entries = Vec::new();
        flatten_value(data, String::new(), &mut entries);
        for (key, value) in entries {
            writer
                .write_record([key.as_str(), value.as_str()])
                .map_err(|error| {
                    PipelineError::io(format!("failed to write CSV record: {error}"))
                })?;
        }
    } else {
        for (index, table) in tables.iter().enumerate() {
            if index > 0 {
                // One blank separator row between tables.
                writer.write_record([""]).map_err(|error| {
                    PipelineError::io(format!("failed to write CSV separator: {error}"))
                })?;
            }
            write_table(&mut writer, table)?;
        }
    }

    let bytes = writer
        .into_inner()
        .map_err(|error| PipelineError::io(format!("failed to flush CSV output: {error}")))?;
    String::from_utf8(bytes)
        .map_err(|error| PipelineError::io(format!("CSV output is not valid UTF-8: {error}")))
}

fn write_table(
    writer: &mut csv::Writer<Vec<u8>>,
    table: &Value,
) -> Result<(), PipelineError> {
    let headers = table
        .get("headers")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[]);
    if !headers.is_empty() {
        let rendered: Vec<String> = headers.iter().map(display_value).collect();
        writer
            .write_record(&rendered)
            .map_err(|error| PipelineError::io(format!("failed to write CSV header: {error}")))?;
    }

    for row in table
        .get("data")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
    {
        let cells: Vec<String> = row
            .as_array()
            .map(|cells| cells.iter().map(display_value).collect())
            .unwrap_or_default();
        writer
            .write_record(&cells)
            .map_err(|error| PipelineError::io(format!("failed to write CSV row: {error}")))?;
    }
    Ok(())
}

/// Flatten a nested document into dotted key paths. Nested mappings recurse
/// with `.`-joined keys; sequences are stringified as a single value.
fn flatten_value(value: &Value, prefix: String, entries: &mut Vec<(String, String)>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                flatten_value(child, path, entries);
            }
        }
        Value::Array(_) => entries.push((prefix, value.to_string())),
        other => entries.push((prefix, display_value(other))),
    }
}
