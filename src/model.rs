use crate::error::ParseIssue;
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Format family of a parsed document. Selects which content shape and
/// which renderer body applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Pdf,
    Word,
    Excel,
    PowerPoint,
}

impl FileType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileType::Pdf => "pdf",
            FileType::Word => "word",
            FileType::Excel => "excel",
            FileType::PowerPoint => "powerpoint",
        }
    }
}

/// Structured representation of a parsed document.
///
/// The single contract between parsing and rendering: parsers produce it,
/// enrichment mutates `images[*]` in place, renderers borrow it. Field
/// order here is the serialized field order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedDocument {
    pub filename: String,
    pub file_type: FileType,
    /// RFC 3339 UTC timestamp, set once at construction.
    pub parsed_at: String,
    /// Format-specific key set, all values stringified. Sorted key order.
    pub metadata: BTreeMap<String, String>,
    pub content: DocumentContent,
    /// Format-independent view of tabular content.
    pub tables: Vec<Table>,
    pub images: Vec<ImageRef>,
    /// Soft-failure log; a non-empty list does not invalidate the document.
    pub errors: Vec<ParseIssue>,
}

impl NormalizedDocument {
    pub fn new(filename: impl Into<String>, file_type: FileType, content: DocumentContent) -> Self {
        Self {
            filename: filename.into(),
            file_type,
            parsed_at: Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
            metadata: BTreeMap::new(),
            content,
            tables: Vec::new(),
            images: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Dict-shaped equivalent consumed by the renderer.
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::to_value(self).expect("document serialization is infallible")
    }

    pub fn from_value(value: serde_json::Value) -> Result<Self, String> {
        serde_json::from_value(value)
            .map_err(|error| format!("failed to decode normalized document: {error}"))
    }
}

/// Format-tagged content variant. The shape is fully determined by
/// `file_type` and never mixed; serialization is untagged because each
/// variant's field set is disjoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DocumentContent {
    Pdf(PdfContent),
    Word(WordContent),
    Excel(ExcelContent),
    PowerPoint(PowerPointContent),
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PdfContent {
    pub total_pages: usize,
    pub pages: Vec<PdfPage>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PdfPage {
    pub page_number: usize,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WordContent {
    pub paragraphs: Vec<Paragraph>,
    pub sections: Vec<Section>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paragraph {
    /// Position in body order, counting skipped empty paragraphs.
    pub index: usize,
    pub text: String,
    pub style: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_heading: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heading_level: Option<u32>,
}

/// Section geometry in inches. Orientation is `landscape` iff width > height.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub index: usize,
    pub page_width: Option<f64>,
    pub page_height: Option<f64>,
    pub orientation: String,
    pub left_margin: Option<f64>,
    pub right_margin: Option<f64>,
    pub top_margin: Option<f64>,
    pub bottom_margin: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ExcelContent {
    pub sheet_count: usize,
    pub sheet_names: Vec<String>,
    pub sheets: Vec<Sheet>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sheet {
    pub name: String,
    /// A1-style used range, e.g. "A1:C3".
    pub dimensions: String,
    pub max_row: usize,
    pub max_column: usize,
    /// Fully blank rows are dropped, not represented as empty rows.
    pub data: Vec<Vec<Option<String>>>,
    pub merged_cells: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PowerPointContent {
    pub slide_count: usize,
    pub slides: Vec<Slide>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slide {
    pub slide_number: usize,
    pub layout: Option<String>,
    pub title: Option<String>,
    /// Free text contributed by shapes, in shape order.
    pub content: Vec<String>,
    pub shapes: Vec<ShapeDescriptor>,
    pub notes: Option<String>,
    pub images: Vec<SlideImage>,
    pub tables: Vec<Table>,
    pub charts: Vec<ChartInfo>,
}

/// One entry per shape on a slide. A shape can carry text and at the same
/// time be flagged image/table/chart; the flags are not mutually exclusive
/// with `text`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeDescriptor {
    pub name: String,
    pub kind: String,
    pub left: Option<f64>,
    pub top: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub text: Option<String>,
    pub is_image: bool,
    pub is_table: bool,
    pub is_chart: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlideImage {
    pub name: String,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub content_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartInfo {
    pub chart_type: Option<String>,
    pub title: Option<String>,
}

/// Format-independent table. Invariants: `rows == data.len()` and every row
/// has exactly `columns` entries; short rows are padded, never truncated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub rows: usize,
    pub columns: usize,
    pub headers: Vec<String>,
    pub data: Vec<Vec<String>>,
}

impl Table {
    /// Build a table from raw rows, padding short rows so the row/column
    /// invariants hold.
    pub fn from_rows(
        name: Option<String>,
        mut headers: Vec<String>,
        mut data: Vec<Vec<String>>,
    ) -> Self {
        let columns = headers
            .len()
            .max(data.iter().map(Vec::len).max().unwrap_or(0));
        if !headers.is_empty() {
            headers.resize(columns, String::new());
        }
        for row in &mut data {
            row.resize(columns, String::new());
        }

        Self {
            name,
            rows: data.len(),
            columns,
            headers,
            data,
        }
    }
}

/// Reference to an image extracted from a document.
///
/// `data` carries base64 raw bytes when the source format exposes them
/// (PowerPoint); PDF image references are metadata-only. `description` is
/// filled by vision enrichment after parse, never during it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRef {
    /// 1-based page or slide number.
    pub location: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_space: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_analyzed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_error: Option<String>,
}

impl ImageRef {
    pub fn new(location: usize) -> Self {
        Self {
            location,
            name: None,
            width: None,
            height: None,
            content_type: None,
            color_space: None,
            data: None,
            description: None,
            ai_analyzed: None,
            ai_error: None,
        }
    }
}

fn is_false(value: &bool) -> bool {
    !value
}
