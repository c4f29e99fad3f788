use crate::error::{ExtractStage, ParseIssue, PipelineError};
use crate::model::{
    ChartInfo, DocumentContent, FileType, ImageRef, NormalizedDocument, PowerPointContent,
    ShapeDescriptor, Slide, SlideImage, Table,
};
use crate::parser::ooxml::{
    Archive, Relationship, attribute_value, core_properties, emu_to_inches, has_part, local_name,
    media_content_type, open_archive, read_part, read_part_bytes, relationships, resolve_target,
};
use crate::parser::{DocumentParser, checked_path, extension_matches, filename_of};
use crate::validate::extension_of;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use quick_xml::Reader;
use quick_xml::events::Event;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Parser for PowerPoint presentations (PresentationML in a zip container).
///
/// Every shape is inspected once per slide and classified into at most one
/// of {image, table, chart} plus optional free text; the classifications
/// fan out into the slide's lists and are not mutually exclusive with the
/// shape contributing text to `content`.
#[derive(Debug)]
pub struct PowerPointParser {
    path: PathBuf,
}

impl PowerPointParser {
    pub const EXTENSIONS: &'static [&'static str] = &["pptx", "ppt"];

    /// Open a PowerPoint file, checking existence and extension.
    pub fn open(path: &Path) -> Result<Self, PipelineError> {
        let path = checked_path(path, Self::EXTENSIONS)?;
        if extension_of(&path) == "ppt" {
            log::warn!(
                "'{}': legacy .ppt support is best-effort; convert to .pptx for full fidelity",
                path.display()
            );
        }
        Ok(Self { path })
    }

    pub fn can_parse(path: &Path) -> bool {
        extension_matches(path, Self::EXTENSIONS)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Archive, String> {
        open_archive(&self.path)
    }
}

impl DocumentParser for PowerPointParser {
    fn parse(&self) -> NormalizedDocument {
        log::info!("parsing powerpoint: {}", self.path.display());
        let mut document = NormalizedDocument::new(
            filename_of(&self.path),
            FileType::PowerPoint,
            DocumentContent::PowerPoint(PowerPointContent::default()),
        );

        let mut archive = match self.load() {
            Ok(archive) => archive,
            Err(error) => {
                document
                    .errors
                    .push(ParseIssue::new(ExtractStage::Content, error));
                return document;
            }
        };

        match core_properties(&mut archive) {
            Ok(core) => document.metadata = core,
            Err(error) => document
                .errors
                .push(ParseIssue::new(ExtractStage::Metadata, error)),
        }

        let mut issues = Vec::new();
        let deck = match load_deck(&mut archive, &mut issues) {
            Ok(deck) => deck,
            Err(error) => {
                document
                    .errors
                    .push(ParseIssue::new(ExtractStage::Content, error));
                Deck::default()
            }
        };
        document.errors.append(&mut issues);

        document
            .metadata
            .insert("slide_count".to_owned(), deck.slides.len().to_string());
        if let Some((width, height)) = deck.slide_size {
            document
                .metadata
                .insert("slide_width".to_owned(), width.to_string());
            document
                .metadata
                .insert("slide_height".to_owned(), height.to_string());
        }

        document.tables = deck.tables;
        document.images = deck.images;
        document.content = DocumentContent::PowerPoint(PowerPointContent {
            slide_count: deck.slides.len(),
            slides: deck.slides,
        });
        document
    }

    fn extract_text(&self) -> Result<String, PipelineError> {
        let mut archive = self.load().map_err(PipelineError::parse_failed)?;
        let mut issues = Vec::new();
        let deck = load_deck(&mut archive, &mut issues).map_err(PipelineError::parse_failed)?;

        let mut parts = Vec::new();
        for slide in &deck.slides {
            parts.push(format!("=== Slide {} ===", slide.slide_number));
            for text in &slide.content {
                parts.push(text.clone());
            }
            if let Some(notes) = &slide.notes {
                parts.push(format!("[Speaker Notes: {notes}]"));
            }
            parts.push(String::new());
        }
        Ok(parts.join("\n"))
    }

    fn extract_metadata(&self) -> Result<BTreeMap<String, String>, PipelineError> {
        let mut archive = self.load().map_err(PipelineError::parse_failed)?;
        let mut metadata = core_properties(&mut archive).map_err(PipelineError::parse_failed)?;
        let mut issues = Vec::new();
        let deck = load_deck(&mut archive, &mut issues).map_err(PipelineError::parse_failed)?;
        metadata.insert("slide_count".to_owned(), deck.slides.len().to_string());
        if let Some((width, height)) = deck.slide_size {
            metadata.insert("slide_width".to_owned(), width.to_string());
            metadata.insert("slide_height".to_owned(), height.to_string());
        }
        Ok(metadata)
    }

    fn extract_tables(&self) -> Result<Vec<Table>, PipelineError> {
        let mut archive = self.load().map_err(PipelineError::parse_failed)?;
        let mut issues = Vec::new();
        let deck = load_deck(&mut archive, &mut issues).map_err(PipelineError::parse_failed)?;
        Ok(deck.tables)
    }

    fn extract_images(&self) -> Result<Vec<ImageRef>, PipelineError> {
        let mut archive = self.load().map_err(PipelineError::parse_failed)?;
        let mut issues = Vec::new();
        let deck = load_deck(&mut archive, &mut issues).map_err(PipelineError::parse_failed)?;
        Ok(deck.images)
    }
}

#[derive(Default)]
struct Deck {
    slides: Vec<Slide>,
    tables: Vec<Table>,
    images: Vec<ImageRef>,
    /// Slide dimensions in inches.
    slide_size: Option<(f64, f64)>,
}

/// Load every slide in deck order, fanning shape classifications out into
/// the slide and document-level lists. Individual slide failures degrade to
/// soft issues.
fn load_deck(archive: &mut Archive, issues: &mut Vec<ParseIssue>) -> Result<Deck, String> {
    let presentation_rels = relationships(archive, "ppt/_rels/presentation.xml.rels")?;
    let (ordered_ids, slide_size) = read_presentation(archive)?;
    let slide_parts = slide_parts_in_order(&presentation_rels, &ordered_ids);

    let mut deck = Deck {
        slide_size,
        ..Deck::default()
    };

    for (index, part) in slide_parts.iter().enumerate() {
        let slide_number = index + 1;
        match load_slide(archive, part, slide_number) {
            Ok(loaded) => {
                deck.tables.extend(loaded.document_tables);
                deck.images.extend(loaded.document_images);
                deck.slides.push(loaded.slide);
            }
            Err(error) => issues.push(ParseIssue::new(
                ExtractStage::Content,
                format!("failed to read slide {slide_number}: {error}"),
            )),
        }
    }

    Ok(deck)
}

/// Slide r:id order from `p:sldIdLst` plus the deck's slide size.
fn read_presentation(archive: &mut Archive) -> Result<(Vec<String>, Option<(f64, f64)>), String> {
    let content = read_part(archive, "ppt/presentation.xml")?;
    let mut ordered_ids = Vec::new();
    let mut slide_size = None;

    let mut reader = Reader::from_str(&content);
    reader.trim_text(true);
    loop {
        match reader.read_event() {
            Ok(Event::Start(ref element)) | Ok(Event::Empty(ref element)) => {
                match local_name(element.name().as_ref()) {
                    b"sldId" => {
                        // `id` and `r:id` share a local name; the slide
                        // relationship is the qualified one.
                        for attribute in element.attributes().flatten() {
                            if attribute.key.as_ref() == b"r:id" {
                                ordered_ids
                                    .push(String::from_utf8_lossy(&attribute.value).to_string());
                            }
                        }
                    }
                    b"sldSz" => {
                        let width = attribute_value(element, b"cx")
                            .and_then(|value| value.parse::<i64>().ok())
                            .map(emu_to_inches);
                        let height = attribute_value(element, b"cy")
                            .and_then(|value| value.parse::<i64>().ok())
                            .map(emu_to_inches);
                        if let (Some(width), Some(height)) = (width, height) {
                            slide_size = Some((width, height));
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::Eof) => break,
            Err(error) => return Err(format!("error parsing presentation part: {error}")),
            _ => {}
        }
    }

    Ok((ordered_ids, slide_size))
}

/// Resolve slide parts in deck order: `p:sldIdLst` order when present,
/// otherwise slide relationships sorted by their numeric suffix.
fn slide_parts_in_order(rels: &[Relationship], ordered_ids: &[String]) -> Vec<String> {
    let is_slide = |relationship: &Relationship| {
        relationship.rel_type.contains("/slide")
            && !relationship.rel_type.contains("slideLayout")
            && !relationship.rel_type.contains("slideMaster")
    };

    if !ordered_ids.is_empty() {
        return ordered_ids
            .iter()
            .filter_map(|id| rels.iter().find(|rel| &rel.id == id).filter(|rel| is_slide(rel)))
            .map(|rel| resolve_target("ppt", &rel.target))
            .collect();
    }

    let mut slides: Vec<(String, Option<usize>)> = rels
        .iter()
        .filter(|rel| is_slide(rel))
        .map(|rel| {
            let part = resolve_target("ppt", &rel.target);
            let order = trailing_number(&rel.target);
            (part, order)
        })
        .collect();
    slides.sort_by(|a, b| match (a.1, b.1) {
        (Some(left), Some(right)) => left.cmp(&right),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => a.0.cmp(&b.0),
    });
    slides.into_iter().map(|(part, _)| part).collect()
}

/// Numeric suffix of a part name like "slides/slide12.xml".
fn trailing_number(name: &str) -> Option<usize> {
    let trimmed = name.trim_end_matches(".xml");
    let digits: String = trimmed
        .chars()
        .rev()
        .take_while(char::is_ascii_digit)
        .collect();
    if digits.is_empty() {
        return None;
    }
    digits.chars().rev().collect::<String>().parse().ok()
}

struct LoadedSlide {
    slide: Slide,
    document_tables: Vec<Table>,
    document_images: Vec<ImageRef>,
}

fn load_slide(
    archive: &mut Archive,
    part: &str,
    slide_number: usize,
) -> Result<LoadedSlide, String> {
    let slide_rels = relationships(archive, &rels_part_for(part))?;
    let base_dir = part.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("ppt");

    let content = read_part(archive, part)?;
    let shapes = shapes_from_xml(&content, part)?;

    let title = resolve_title(&shapes);
    let mut slide = Slide {
        slide_number,
        layout: layout_name(archive, &slide_rels, base_dir),
        title,
        content: Vec::new(),
        shapes: Vec::new(),
        notes: notes_text(archive, &slide_rels, base_dir),
        images: Vec::new(),
        tables: Vec::new(),
        charts: Vec::new(),
    };
    let mut document_tables = Vec::new();
    let mut document_images = Vec::new();

    for shape in shapes {
        let text = shape.trimmed_text();
        if let Some(text) = &text {
            slide.content.push(text.clone());
        }

        let shape_name = shape.name.clone().unwrap_or_default();
        let is_table = shape.table.is_some();
        let is_chart = shape.is_chart();

        if shape.kind == RawShapeKind::Picture {
            slide.images.push(SlideImage {
                name: shape_name.clone(),
                width: shape.extent.0,
                height: shape.extent.1,
                content_type: shape
                    .blip_rel
                    .as_deref()
                    .and_then(|id| media_target(&slide_rels, id, base_dir))
                    .as_deref()
                    .and_then(media_content_type)
                    .map(str::to_owned),
            });

            let mut image = ImageRef::new(slide_number);
            image.name = Some(shape_name.clone());
            image.width = shape.extent.0;
            image.height = shape.extent.1;
            if let Some(media) = shape
                .blip_rel
                .as_deref()
                .and_then(|id| media_target(&slide_rels, id, base_dir))
            {
                image.content_type = media_content_type(&media).map(str::to_owned);
                match read_part_bytes(archive, &media) {
                    Ok(bytes) => image.data = Some(STANDARD.encode(bytes)),
                    Err(error) => log::debug!("could not read media part '{media}': {error}"),
                }
            }
            document_images.push(image);
        }

        if let Some(rows) = &shape.table {
            let slide_table = Table::from_rows(None, Vec::new(), rows.clone());
            slide.tables.push(slide_table);
            document_tables.push(Table::from_rows(
                Some(shape_name.clone()),
                Vec::new(),
                rows.clone(),
            ));
        }

        if is_chart {
            let chart = shape
                .chart_rel
                .as_deref()
                .and_then(|id| media_target(&slide_rels, id, base_dir))
                .and_then(|chart_part| chart_info(archive, &chart_part))
                .unwrap_or(ChartInfo {
                    chart_type: None,
                    title: None,
                });
            slide.charts.push(chart);
        }

        slide.shapes.push(ShapeDescriptor {
            name: shape_name,
            kind: shape.kind_label().to_owned(),
            left: shape.offset.0,
            top: shape.offset.1,
            width: shape.extent.0,
            height: shape.extent.1,
            text,
            is_image: shape.kind == RawShapeKind::Picture,
            is_table,
            is_chart,
        });
    }

    Ok(LoadedSlide {
        slide,
        document_tables,
        document_images,
    })
}

fn rels_part_for(part: &str) -> String {
    match part.rsplit_once('/') {
        Some((dir, file)) => format!("{dir}/_rels/{file}.rels"),
        None => format!("_rels/{part}.rels"),
    }
}

fn media_target(rels: &[Relationship], id: &str, base_dir: &str) -> Option<String> {
    rels.iter()
        .find(|relationship| relationship.id == id)
        .map(|relationship| resolve_target(base_dir, &relationship.target))
}

/// Prefer the designated title placeholder; fall back to any placeholder
/// whose type mentions a title.
fn resolve_title(shapes: &[RawShape]) -> Option<String> {
    shapes
        .iter()
        .find(|shape| {
            matches!(shape.placeholder.as_deref(), Some("title") | Some("ctrTitle"))
        })
        .or_else(|| {
            shapes.iter().find(|shape| {
                shape
                    .placeholder
                    .as_deref()
                    .is_some_and(|kind| kind.to_ascii_lowercase().contains("title"))
            })
        })
        .and_then(RawShape::trimmed_text)
}

fn notes_text(archive: &mut Archive, rels: &[Relationship], base_dir: &str) -> Option<String> {
    let part = rels
        .iter()
        .find(|relationship| relationship.rel_type.contains("notesSlide"))
        .map(|relationship| resolve_target(base_dir, &relationship.target))?;
    let content = read_part(archive, &part).ok()?;
    let text = collect_drawing_text(&content)?;
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_owned())
    }
}

fn layout_name(archive: &mut Archive, rels: &[Relationship], base_dir: &str) -> Option<String> {
    let part = rels
        .iter()
        .find(|relationship| relationship.rel_type.contains("slideLayout"))
        .map(|relationship| resolve_target(base_dir, &relationship.target))?;
    let content = read_part(archive, &part).ok()?;

    let mut reader = Reader::from_str(&content);
    reader.trim_text(true);
    loop {
        match reader.read_event() {
            Ok(Event::Start(ref element)) | Ok(Event::Empty(ref element))
                if local_name(element.name().as_ref()) == b"cSld" =>
            {
                return attribute_value(element, b"name");
            }
            Ok(Event::Eof) | Err(_) => return None,
            _ => {}
        }
    }
}

/// Chart type (plot-area element name) and title from a chart part.
fn chart_info(archive: &mut Archive, part: &str) -> Option<ChartInfo> {
    if !has_part(archive, part) {
        return None;
    }
    let content = read_part(archive, part).ok()?;

    let mut chart_type = None;
    let mut title = String::new();
    let mut in_title = false;

    let mut reader = Reader::from_str(&content);
    reader.trim_text(true);
    loop {
        match reader.read_event() {
            Ok(Event::Start(ref element)) | Ok(Event::Empty(ref element)) => {
                let name = element.name();
                let local = local_name(name.as_ref());
                if local == b"title" {
                    in_title = true;
                } else if chart_type.is_none() {
                    let label = String::from_utf8_lossy(local).to_string();
                    if label.ends_with("Chart") {
                        chart_type = Some(label);
                    }
                }
            }
            Ok(Event::Text(ref text)) if in_title => {
                title.push_str(&text.unescape().unwrap_or_default());
            }
            Ok(Event::End(ref element)) if local_name(element.name().as_ref()) == b"title" => {
                in_title = false;
            }
            Ok(Event::Eof) => break,
            Err(_) => break,
            _ => {}
        }
    }

    Some(ChartInfo {
        chart_type,
        title: if title.trim().is_empty() {
            None
        } else {
            Some(title.trim().to_owned())
        },
    })
}

/// All drawing text in a part, one line per paragraph.
fn collect_drawing_text(content: &str) -> Option<String> {
    let mut text = String::new();
    let mut reader = Reader::from_str(content);
    reader.trim_text(false);
    loop {
        match reader.read_event() {
            Ok(Event::Text(ref value)) => {
                text.push_str(&value.unescape().unwrap_or_default());
            }
            Ok(Event::End(ref element)) if local_name(element.name().as_ref()) == b"p" => {
                text.push('\n');
            }
            Ok(Event::Eof) => break,
            Err(_) => return None,
            _ => {}
        }
    }
    Some(text)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RawShapeKind {
    Text,
    Picture,
    GraphicFrame,
}

#[derive(Debug)]
struct RawShape {
    kind: RawShapeKind,
    name: Option<String>,
    placeholder: Option<String>,
    offset: (Option<f64>, Option<f64>),
    extent: (Option<f64>, Option<f64>),
    text: String,
    blip_rel: Option<String>,
    table: Option<Vec<Vec<String>>>,
    chart_rel: Option<String>,
    has_chart_data: bool,
}

impl RawShape {
    fn new(kind: RawShapeKind) -> Self {
        Self {
            kind,
            name: None,
            placeholder: None,
            offset: (None, None),
            extent: (None, None),
            text: String::new(),
            blip_rel: None,
            table: None,
            chart_rel: None,
            has_chart_data: false,
        }
    }

    fn trimmed_text(&self) -> Option<String> {
        let trimmed = self.text.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_owned())
        }
    }

    fn is_chart(&self) -> bool {
        self.has_chart_data || self.chart_rel.is_some()
    }

    fn kind_label(&self) -> &'static str {
        match self.kind {
            RawShapeKind::Text if self.placeholder.is_some() => "placeholder",
            RawShapeKind::Text => "text_box",
            RawShapeKind::Picture => "picture",
            RawShapeKind::GraphicFrame => "graphic_frame",
        }
    }
}

/// One pass over a slide part collecting shape descriptors.
fn shapes_from_xml(content: &str, part: &str) -> Result<Vec<RawShape>, String> {
    let mut shapes = Vec::new();
    let mut current: Option<RawShape> = None;

    let mut in_txbody = false;
    let mut in_table = false;
    let mut table_rows: Vec<Vec<String>> = Vec::new();
    let mut current_row: Vec<String> = Vec::new();
    let mut cell_text = String::new();
    let mut in_cell = false;

    let mut reader = Reader::from_str(content);
    reader.trim_text(false);

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref element)) => {
                let name = element.name();
                match local_name(name.as_ref()) {
                    b"sp" if current.is_none() => current = Some(RawShape::new(RawShapeKind::Text)),
                    b"pic" if current.is_none() => {
                        current = Some(RawShape::new(RawShapeKind::Picture));
                    }
                    b"graphicFrame" if current.is_none() => {
                        current = Some(RawShape::new(RawShapeKind::GraphicFrame));
                    }
                    b"txBody" => in_txbody = true,
                    b"tbl" => {
                        in_table = true;
                        table_rows.clear();
                    }
                    b"tr" if in_table => current_row = Vec::new(),
                    b"tc" if in_table => {
                        cell_text.clear();
                        in_cell = true;
                    }
                    b"graphicData" => {
                        if let (Some(shape), Some(uri)) =
                            (current.as_mut(), attribute_value(element, b"uri"))
                        {
                            if uri.contains("chart") {
                                shape.has_chart_data = true;
                            }
                        }
                    }
                    other => handle_descriptor_element(&mut current, other, element),
                }
            }
            Ok(Event::Empty(ref element)) => {
                let name = element.name();
                let local = local_name(name.as_ref());
                handle_descriptor_element(&mut current, local, element);
            }
            Ok(Event::Text(ref value)) => {
                let value = value.unescape().unwrap_or_default();
                if in_table && in_cell {
                    cell_text.push_str(&value);
                } else if in_txbody {
                    if let Some(shape) = current.as_mut() {
                        shape.text.push_str(&value);
                    }
                }
            }
            Ok(Event::End(ref element)) => {
                let name = element.name();
                match local_name(name.as_ref()) {
                    b"sp" | b"pic" | b"graphicFrame" => {
                        if let Some(shape) = current.take() {
                            shapes.push(shape);
                        }
                    }
                    b"txBody" => in_txbody = false,
                    b"p" => {
                        if in_table && in_cell {
                            cell_text.push('\n');
                        } else if in_txbody {
                            if let Some(shape) = current.as_mut() {
                                shape.text.push('\n');
                            }
                        }
                    }
                    b"tbl" => {
                        in_table = false;
                        if let Some(shape) = current.as_mut() {
                            shape.table = Some(std::mem::take(&mut table_rows));
                        }
                    }
                    b"tr" if in_table => table_rows.push(std::mem::take(&mut current_row)),
                    b"tc" if in_table => {
                        current_row.push(cell_text.trim().to_owned());
                        in_cell = false;
                    }
                    _ => {}
                }
            }
            Ok(Event::Eof) => break,
            Err(error) => return Err(format!("error parsing slide part '{part}': {error}")),
            _ => {}
        }
    }

    Ok(shapes)
}

fn handle_descriptor_element(
    current: &mut Option<RawShape>,
    local: &[u8],
    element: &quick_xml::events::BytesStart<'_>,
) {
    let Some(shape) = current.as_mut() else {
        return;
    };
    match local {
        b"cNvPr" => {
            if shape.name.is_none() {
                shape.name = attribute_value(element, b"name");
            }
        }
        b"ph" => {
            if shape.placeholder.is_none() {
                shape.placeholder = attribute_value(element, b"type");
            }
        }
        b"off" => {
            if shape.offset == (None, None) {
                shape.offset = (
                    attribute_value(element, b"x")
                        .and_then(|value| value.parse::<i64>().ok())
                        .map(emu_to_inches),
                    attribute_value(element, b"y")
                        .and_then(|value| value.parse::<i64>().ok())
                        .map(emu_to_inches),
                );
            }
        }
        b"ext" => {
            if shape.extent == (None, None) {
                shape.extent = (
                    attribute_value(element, b"cx")
                        .and_then(|value| value.parse::<i64>().ok())
                        .map(emu_to_inches),
                    attribute_value(element, b"cy")
                        .and_then(|value| value.parse::<i64>().ok())
                        .map(emu_to_inches),
                );
            }
        }
        b"blip" => {
            if shape.blip_rel.is_none() {
                shape.blip_rel = attribute_value(element, b"embed");
            }
        }
        b"chart" => {
            if shape.chart_rel.is_none() {
                shape.chart_rel = attribute_value(element, b"id");
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::fs;
    use std::io::Write;
    use tempfile::NamedTempFile;
    use zip::write::SimpleFileOptions;

    const PRESENTATION_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:presentation xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
  <p:sldIdLst><p:sldId id="256" r:id="rId2"/><p:sldId id="257" r:id="rId3"/></p:sldIdLst>
  <p:sldSz cx="12192000" cy="6858000"/>
</p:presentation>"#;

    const PRESENTATION_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide" Target="slides/slide1.xml"/>
  <Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide" Target="slides/slide2.xml"/>
</Relationships>"#;

    const SLIDE1_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sld xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main" xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
  <p:cSld><p:spTree>
    <p:sp>
      <p:nvSpPr><p:cNvPr id="2" name="Title 1"/><p:nvPr><p:ph type="title"/></p:nvPr></p:nvSpPr>
      <p:spPr><a:xfrm><a:off x="914400" y="457200"/><a:ext cx="9144000" cy="914400"/></a:xfrm></p:spPr>
      <p:txBody><a:p><a:r><a:t>Roadmap</a:t></a:r></a:p></p:txBody>
    </p:sp>
    <p:sp>
      <p:nvSpPr><p:cNvPr id="3" name="Content 2"/></p:nvSpPr>
      <p:txBody><a:p><a:r><a:t>First point</a:t></a:r></a:p><a:p><a:r><a:t>Second point</a:t></a:r></a:p></p:txBody>
    </p:sp>
    <p:pic>
      <p:nvPicPr><p:cNvPr id="4" name="Diagram"/></p:nvPicPr>
      <p:blipFill><a:blip r:embed="rId2"/></p:blipFill>
      <p:spPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="1828800" cy="914400"/></a:xfrm></p:spPr>
    </p:pic>
    <p:graphicFrame>
      <p:nvGraphicFramePr><p:cNvPr id="5" name="Table 4"/></p:nvGraphicFramePr>
      <a:graphic><a:graphicData uri="http://schemas.openxmlformats.org/drawingml/2006/table">
        <a:tbl>
          <a:tr><a:tc><a:txBody><a:p><a:r><a:t>Metric</a:t></a:r></a:p></a:txBody></a:tc><a:tc><a:txBody><a:p><a:r><a:t>Value</a:t></a:r></a:p></a:txBody></a:tc></a:tr>
          <a:tr><a:tc><a:txBody><a:p><a:r><a:t>Users</a:t></a:r></a:p></a:txBody></a:tc><a:tc><a:txBody><a:p><a:r><a:t>1200</a:t></a:r></a:p></a:txBody></a:tc></a:tr>
        </a:tbl>
      </a:graphicData></a:graphic>
    </p:graphicFrame>
    <p:graphicFrame>
      <p:nvGraphicFramePr><p:cNvPr id="6" name="Chart 5"/></p:nvGraphicFramePr>
      <a:graphic><a:graphicData uri="http://schemas.openxmlformats.org/drawingml/2006/chart">
        <c:chart xmlns:c="http://schemas.openxmlformats.org/drawingml/2006/chart" r:id="rId3"/>
      </a:graphicData></a:graphic>
    </p:graphicFrame>
  </p:spTree></p:cSld>
</p:sld>"#;

    const SLIDE1_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/notesSlide" Target="../notesSlides/notesSlide1.xml"/>
  <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/image" Target="../media/image1.png"/>
  <Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/chart" Target="../charts/chart1.xml"/>
  <Relationship Id="rId4" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout" Target="../slideLayouts/slideLayout1.xml"/>
</Relationships>"#;

    const SLIDE2_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sld xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main" xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main">
  <p:cSld><p:spTree>
    <p:sp>
      <p:nvSpPr><p:cNvPr id="2" name="Closing"/></p:nvSpPr>
      <p:txBody><a:p><a:r><a:t>Thanks</a:t></a:r></a:p></p:txBody>
    </p:sp>
  </p:spTree></p:cSld>
</p:sld>"#;

    const NOTES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:notes xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main" xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main">
  <p:cSld><p:spTree><p:sp><p:txBody><a:p><a:r><a:t>Remember the demo.</a:t></a:r></a:p></p:txBody></p:sp></p:spTree></p:cSld>
</p:notes>"#;

    const LAYOUT_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sldLayout xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main">
  <p:cSld name="Title and Content"><p:spTree/></p:cSld>
</p:sldLayout>"#;

    const CHART_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<c:chartSpace xmlns:c="http://schemas.openxmlformats.org/drawingml/2006/chart" xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main">
  <c:chart>
    <c:title><c:tx><c:rich><a:p><a:r><a:t>Monthly Users</a:t></a:r></a:p></c:rich></c:tx></c:title>
    <c:plotArea><c:barChart><c:ser/></c:barChart></c:plotArea>
  </c:chart>
</c:chartSpace>"#;

    const PNG_STUB: &[u8] = b"\x89PNG\r\n\x1a\nstub-bytes";

    fn write_pptx() -> NamedTempFile {
        let file = NamedTempFile::with_suffix(".pptx").expect("create pptx temp file");
        let mut writer =
            zip::ZipWriter::new(fs::File::create(file.path()).expect("open pptx for write"));
        let text_parts = [
            ("ppt/presentation.xml", PRESENTATION_XML),
            ("ppt/_rels/presentation.xml.rels", PRESENTATION_RELS),
            ("ppt/slides/slide1.xml", SLIDE1_XML),
            ("ppt/slides/_rels/slide1.xml.rels", SLIDE1_RELS),
            ("ppt/slides/slide2.xml", SLIDE2_XML),
            ("ppt/notesSlides/notesSlide1.xml", NOTES_XML),
            ("ppt/slideLayouts/slideLayout1.xml", LAYOUT_XML),
            ("ppt/charts/chart1.xml", CHART_XML),
        ];
        for (name, contents) in text_parts {
            writer
                .start_file(name, SimpleFileOptions::default())
                .expect("start zip entry");
            writer
                .write_all(contents.as_bytes())
                .expect("write zip entry");
        }
        writer
            .start_file("ppt/media/image1.png", SimpleFileOptions::default())
            .expect("start media entry");
        writer.write_all(PNG_STUB).expect("write media entry");
        writer.finish().expect("finish pptx");
        file
    }

    #[test]
    fn open_rejects_missing_file_and_foreign_extension() {
        let error =
            PowerPointParser::open(Path::new("/tmp/missing.pptx")).expect_err("missing file");
        assert_eq!(error.kind, ErrorKind::NotFound);

        let file = NamedTempFile::with_suffix(".docx").expect("create temp file");
        fs::write(file.path(), b"stub").expect("write stub");
        let error = PowerPointParser::open(file.path()).expect_err("docx extension");
        assert_eq!(error.kind, ErrorKind::UnsupportedExtension);
    }

    #[test]
    fn slides_follow_deck_order_with_titles_and_content() {
        let file = write_pptx();
        let parser = PowerPointParser::open(file.path()).expect("open pptx");
        let document = parser.parse();

        assert!(document.errors.is_empty(), "errors: {:?}", document.errors);
        let DocumentContent::PowerPoint(content) = &document.content else {
            panic!("expected powerpoint content");
        };
        assert_eq!(content.slide_count, 2);

        let first = &content.slides[0];
        assert_eq!(first.slide_number, 1);
        assert_eq!(first.title.as_deref(), Some("Roadmap"));
        assert_eq!(first.layout.as_deref(), Some("Title and Content"));
        assert_eq!(
            first.content,
            vec!["Roadmap".to_owned(), "First point\nSecond point".to_owned()]
        );
        assert_eq!(first.shapes.len(), 5);

        let second = &content.slides[1];
        assert_eq!(second.slide_number, 2);
        assert_eq!(second.title, None);
        assert_eq!(second.content, vec!["Thanks".to_owned()]);
        assert_eq!(second.notes, None);
    }

    #[test]
    fn shape_classifications_fan_out_without_exclusivity() {
        let file = write_pptx();
        let parser = PowerPointParser::open(file.path()).expect("open pptx");
        let document = parser.parse();

        let DocumentContent::PowerPoint(content) = &document.content else {
            panic!("expected powerpoint content");
        };
        let slide = &content.slides[0];

        let title_shape = &slide.shapes[0];
        assert_eq!(title_shape.kind, "placeholder");
        assert_eq!(title_shape.text.as_deref(), Some("Roadmap"));
        assert_eq!(title_shape.left, Some(1.0));
        assert_eq!(title_shape.width, Some(10.0));

        let picture = &slide.shapes[2];
        assert!(picture.is_image);
        assert!(!picture.is_table);

        let table_frame = &slide.shapes[3];
        assert!(table_frame.is_table);
        assert!(!table_frame.is_chart);

        let chart_frame = &slide.shapes[4];
        assert!(chart_frame.is_chart);
        assert!(!chart_frame.is_table);
    }

    #[test]
    fn slide_tables_keep_full_row_grids() {
        let file = write_pptx();
        let parser = PowerPointParser::open(file.path()).expect("open pptx");
        let tables = parser.extract_tables().expect("tables");

        assert_eq!(tables.len(), 1);
        let table = &tables[0];
        assert_eq!(table.name.as_deref(), Some("Table 4"));
        assert_eq!(table.rows, 2);
        assert_eq!(table.columns, 2);
        assert_eq!(table.data[0], vec!["Metric", "Value"]);
        assert_eq!(table.data[1], vec!["Users", "1200"]);
    }

    #[test]
    fn images_carry_raw_bytes_and_mime_for_enrichment() {
        let file = write_pptx();
        let parser = PowerPointParser::open(file.path()).expect("open pptx");
        let images = parser.extract_images().expect("images");

        assert_eq!(images.len(), 1);
        let image = &images[0];
        assert_eq!(image.location, 1);
        assert_eq!(image.name.as_deref(), Some("Diagram"));
        assert_eq!(image.content_type.as_deref(), Some("image/png"));
        assert_eq!(image.width, Some(2.0));
        let data = image.data.as_deref().expect("raw bytes");
        assert_eq!(STANDARD.decode(data).expect("valid base64"), PNG_STUB);
    }

    #[test]
    fn charts_resolve_type_and_title_from_chart_part() {
        let file = write_pptx();
        let parser = PowerPointParser::open(file.path()).expect("open pptx");
        let document = parser.parse();

        let DocumentContent::PowerPoint(content) = &document.content else {
            panic!("expected powerpoint content");
        };
        let charts = &content.slides[0].charts;
        assert_eq!(charts.len(), 1);
        assert_eq!(charts[0].chart_type.as_deref(), Some("barChart"));
        assert_eq!(charts[0].title.as_deref(), Some("Monthly Users"));
    }

    #[test]
    fn speaker_notes_attach_only_when_non_blank() {
        let file = write_pptx();
        let parser = PowerPointParser::open(file.path()).expect("open pptx");
        let document = parser.parse();

        let DocumentContent::PowerPoint(content) = &document.content else {
            panic!("expected powerpoint content");
        };
        assert_eq!(
            content.slides[0].notes.as_deref(),
            Some("Remember the demo.")
        );
        assert_eq!(content.slides[1].notes, None);
    }

    #[test]
    fn metadata_reports_slide_statistics_and_dimensions() {
        let file = write_pptx();
        let parser = PowerPointParser::open(file.path()).expect("open pptx");
        let metadata = parser.extract_metadata().expect("metadata");

        assert_eq!(metadata.get("slide_count").map(String::as_str), Some("2"));
        assert!(
            metadata
                .get("slide_width")
                .is_some_and(|width| width.starts_with("13.33"))
        );
        assert_eq!(metadata.get("slide_height").map(String::as_str), Some("7.5"));
    }

    #[test]
    fn extract_text_includes_notes_call_out() {
        let file = write_pptx();
        let parser = PowerPointParser::open(file.path()).expect("open pptx");
        let text = parser.extract_text().expect("text");

        assert!(text.starts_with("=== Slide 1 ===\n"));
        assert!(text.contains("=== Slide 2 ===\n"));
        assert!(text.contains("[Speaker Notes: Remember the demo.]"));
    }

    #[test]
    fn legacy_ppt_bytes_soft_fail_into_error_log() {
        let file = NamedTempFile::with_suffix(".ppt").expect("create temp file");
        fs::write(file.path(), b"\xd0\xcf\x11\xe0legacy").expect("write stub");
        let parser = PowerPointParser::open(file.path()).expect("open ppt wrapper");

        let document = parser.parse();
        assert!(!document.errors.is_empty());
        assert_eq!(document.errors[0].stage, ExtractStage::Content);
    }
}
