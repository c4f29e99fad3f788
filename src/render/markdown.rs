//! Human-readable markup rendering: a title, a metadata list, a
//! file_type-specific body, then generic Tables and Images sections.

use crate::render::{array_field, display_value, str_field};
use serde_json::Value;

pub fn to_markdown(data: &Value) -> String {
    let mut lines: Vec<String> = Vec::new();

    let filename = str_field(data, "filename").unwrap_or("Document");
    lines.push(format!("# {filename}\n"));

    if let Some(metadata) = data.get("metadata").and_then(Value::as_object) {
        if !metadata.is_empty() {
            lines.push("## Metadata\n".to_owned());
            for (key, value) in metadata {
                lines.push(format!("- **{key}**: {}", display_value(value)));
            }
            lines.push(String::new());
        }
    }

    let file_type = str_field(data, "file_type").unwrap_or("");
    let empty = Value::Null;
    let content = data.get("content").unwrap_or(&empty);
    match file_type {
        "pdf" => pdf_body(&mut lines, content),
        "word" => word_body(&mut lines, content),
        "excel" => excel_body(&mut lines, content),
        "powerpoint" => powerpoint_body(&mut lines, content),
        _ => {
            lines.push("## Content\n".to_owned());
            lines.push(display_value(content));
        }
    }

    let tables = array_field(data, "tables");
    if !tables.is_empty() {
        lines.push("\n## Tables\n".to_owned());
        for (index, table) in tables.iter().enumerate() {
            lines.push(format!("### Table {}\n", index + 1));
            table_to_markdown(&mut lines, table);
            lines.push(String::new());
        }
    }

    let images = array_field(data, "images");
    if !images.is_empty() {
        lines.push("\n## Images\n".to_owned());
        for (index, image) in images.iter().enumerate() {
            let description = str_field(image, "description").unwrap_or("Image");
            lines.push(format!("- **Image {}**: {description}", index + 1));
        }
    }

    lines.join("\n")
}

fn pdf_body(lines: &mut Vec<String>, content: &Value) {
    let pages = array_field(content, "pages");
    let total_pages = content
        .get("total_pages")
        .and_then(Value::as_u64)
        .unwrap_or(pages.len() as u64);

    lines.push(format!("## Content ({total_pages} pages)\n"));
    for page in pages {
        let number = page
            .get("page_number")
            .and_then(Value::as_u64)
            .map(|n| n.to_string())
            .unwrap_or_else(|| "?".to_owned());
        lines.push(format!("### Page {number}\n"));
        lines.push(str_field(page, "text").unwrap_or("").to_owned());
        lines.push(String::new());
    }
}

fn word_body(lines: &mut Vec<String>, content: &Value) {
    lines.push("## Content\n".to_owned());
    for paragraph in array_field(content, "paragraphs") {
        let text = str_field(paragraph, "text").unwrap_or("");
        if paragraph
            .get("is_heading")
            .and_then(Value::as_bool)
            .unwrap_or(false)
        {
            let level = paragraph
                .get("heading_level")
                .and_then(Value::as_u64)
                .unwrap_or(2);
            // Offset heading depth by one: the document title owns `#`.
            lines.push(format!("{} {text}\n", "#".repeat(level as usize + 1)));
        } else {
            lines.push(text.to_owned());
            lines.push(String::new());
        }
    }
}

fn excel_body(lines: &mut Vec<String>, content: &Value) {
    for sheet in array_field(content, "sheets") {
        let name = str_field(sheet, "name").unwrap_or("Sheet");
        lines.push(format!("## {name}\n"));

        let rows = array_field(sheet, "data");
        if let Some((header, data_rows)) = rows.split_first() {
            push_pipe_row(lines, header);
            push_separator_row(lines, header);
            for row in data_rows {
                push_pipe_row(lines, row);
            }
        }
        lines.push(String::new());
    }
}

fn powerpoint_body(lines: &mut Vec<String>, content: &Value) {
    for slide in array_field(content, "slides") {
        let number = slide
            .get("slide_number")
            .and_then(Value::as_u64)
            .map(|n| n.to_string())
            .unwrap_or_else(|| "?".to_owned());
        let title = str_field(slide, "title")
            .map(str::to_owned)
            .unwrap_or_else(|| format!("Slide {number}"));
        lines.push(format!("## Slide {number}: {title}\n"));

        for text in array_field(slide, "content") {
            let text = display_value(text);
            if !text.trim().is_empty() {
                lines.push(text);
            }
        }

        for image in array_field(slide, "images") {
            let description = str_field(image, "description")
                .or_else(|| str_field(image, "name"))
                .unwrap_or("Image");
            lines.push(format!("\n*[Image: {description}]*\n"));
        }

        for chart in array_field(slide, "charts") {
            let chart_type = str_field(chart, "chart_type").unwrap_or("Chart");
            let title = str_field(chart, "title").unwrap_or("Chart");
            lines.push(format!("\n*[{chart_type}: {title}]*\n"));
        }

        if let Some(notes) = str_field(slide, "notes") {
            lines.push(format!("\n> **Speaker Notes**: {notes}\n"));
        }

        lines.push("---\n".to_owned());
    }
}

/// Render one generic table; the first data row serves as header when no
/// explicit header set is present.
fn table_to_markdown(lines: &mut Vec<String>, table: &Value) {
    let headers = array_field(table, "headers");
    let data = array_field(table, "data");

    let (headers, data): (Vec<Value>, &[Value]) = if headers.is_empty() {
        match data.split_first() {
            Some((first, rest)) => (
                first.as_array().cloned().unwrap_or_default(),
                rest,
            ),
            None => (Vec::new(), &[]),
        }
    } else {
        (headers.to_vec(), data)
    };

    if !headers.is_empty() {
        push_pipe_cells(lines, &headers);
        lines.push(format!(
            "| {} |",
            vec!["---"; headers.len()].join(" | ")
        ));
    }
    for row in data {
        if let Some(cells) = row.as_array() {
            push_pipe_cells(lines, cells);
        }
    }
}

fn push_pipe_row(lines: &mut Vec<String>, row: &Value) {
    if let Some(cells) = row.as_array() {
        push_pipe_cells(lines, cells);
    }
}

fn push_pipe_cells(lines: &mut Vec<String>, cells: &[Value]) {
    let rendered: Vec<String> = cells.iter().map(display_value).collect();
    lines.push(format!("| {} |", rendered.join(" | ")));
}

fn push_separator_row(lines: &mut Vec<String>, row: &Value) {
    if let Some(cells) = row.as_array() {
        lines.push(format!("| {} |", vec!["---"; cells.len()].join(" | ")));
    }
}
