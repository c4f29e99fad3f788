//! Plain-text rendering: the file_type-specific body without any markup
//! syntax.

use crate::render::{array_field, display_value, str_field};
use serde_json::Value;

pub fn to_text(data: &Value) -> String {
    let mut lines: Vec<String> = Vec::new();

    let filename = str_field(data, "filename").unwrap_or("Document");
    lines.push(filename.to_owned());
    lines.push("=".repeat(filename.chars().count()));
    lines.push(String::new());

    let empty = Value::Null;
    let content = data.get("content").unwrap_or(&empty);
    match str_field(data, "file_type").unwrap_or("") {
        "pdf" => {
            for page in array_field(content, "pages") {
                lines.push(str_field(page, "text").unwrap_or("").to_owned());
                lines.push(String::new());
            }
        }
        "word" => {
            for paragraph in array_field(content, "paragraphs") {
                lines.push(str_field(paragraph, "text").unwrap_or("").to_owned());
            }
        }
        "excel" => {
            for sheet in array_field(content, "sheets") {
                lines.push(format!("\n[{}]\n", str_field(sheet, "name").unwrap_or("Sheet")));
                for row in array_field(sheet, "data") {
                    if let Some(cells) = row.as_array() {
                        let rendered: Vec<String> = cells.iter().map(display_value).collect();
                        lines.push(rendered.join("\t"));
                    }
                }
            }
        }
        "powerpoint" => {
            for slide in array_field(content, "slides") {
                let title = str_field(slide, "title").map(str::to_owned).unwrap_or_else(|| {
                    let number = slide
                        .get("slide_number")
                        .and_then(Value::as_u64)
                        .map(|n| n.to_string())
                        .unwrap_or_else(|| "?".to_owned());
                    format!("Slide {number}")
                });
                lines.push(format!("\n[{title}]\n"));
                for text in array_field(slide, "content") {
                    let text = display_value(text);
                    if !text.is_empty() {
                        lines.push(text);
                    }
                }
            }
        }
        _ => lines.push(display_value(content)),
    }

    lines.join("\n")
}
