//! Serialization of normalized documents into the four textual output
//! formats. Renderers consume the dict-shaped `serde_json::Value` form so
//! both a `NormalizedDocument` and an already-deserialized equivalent work,
//! and they are pure: rendering the same document twice yields identical
//! output.

pub mod markdown;
pub mod tabular;
pub mod text;

pub use markdown::to_markdown;
pub use tabular::to_csv;
pub use text::to_text;

use crate::error::{ErrorKind, PipelineError};
use crate::model::NormalizedDocument;
use serde_json::Value;

/// Requested output format. Extensions map 1:1 to formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Markdown,
    Csv,
    Text,
}

impl OutputFormat {
    pub const ALL: &'static [OutputFormat] = &[
        OutputFormat::Json,
        OutputFormat::Markdown,
        OutputFormat::Csv,
        OutputFormat::Text,
    ];

    /// Parse a format name, case-insensitively.
    pub fn from_name(name: &str) -> Result<Self, PipelineError> {
        match name.to_ascii_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            "csv" => Ok(OutputFormat::Csv),
            "txt" | "text" => Ok(OutputFormat::Text),
            _ => Err(PipelineError::new(
                ErrorKind::UnsupportedOutputFormat,
                format!("unsupported output format: '{name}'. supported: json, markdown, csv, txt"),
            )),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Markdown => "markdown",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }

    /// Canonical file extension, without dot.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Markdown => "md",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }
}

/// Render a dict-shaped document into the requested format.
pub fn render(data: &Value, format: OutputFormat) -> Result<String, PipelineError> {
    match format {
        OutputFormat::Json => structured(data),
        OutputFormat::Markdown => Ok(to_markdown(data)),
        OutputFormat::Csv => to_csv(data),
        OutputFormat::Text => Ok(to_text(data)),
    }
}

/// Render a normalized document into the requested format.
pub fn render_document(
    document: &NormalizedDocument,
    format: OutputFormat,
) -> Result<String, PipelineError> {
    render(&document.to_value(), format)
}

/// Lossless passthrough: the full document as pretty-printed JSON.
fn structured(data: &Value) -> Result<String, PipelineError> {
    serde_json::to_string_pretty(data)
        .map_err(|error| PipelineError::io(format!("failed to serialize document: {error}")))
}

/// String form of a JSON value for human-readable output: strings verbatim,
/// null empty, everything else via its compact JSON form.
pub(crate) fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

pub(crate) fn str_field<'a>(data: &'a Value, field: &str) -> Option<&'a str> {
    data.get(field).and_then(Value::as_str)
}

pub(crate) fn array_field<'a>(data: &'a Value, field: &str) -> &'a [Value] {
    data.get(field)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}
