use crate::error::{ExtractStage, ParseIssue, PipelineError};
use crate::model::{
    DocumentContent, FileType, ImageRef, NormalizedDocument, Paragraph, Section, Table,
    WordContent,
};
use crate::parser::ooxml::{
    Archive, attribute_value, core_properties, emu_to_inches, has_part, local_name, open_archive,
    read_part, twips_to_inches,
};
use crate::parser::{DocumentParser, checked_path, extension_matches, filename_of};
use crate::validate::extension_of;
use quick_xml::Reader;
use quick_xml::events::Event;
use regex::Regex;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Parser for Word documents (WordprocessingML body in a zip container).
#[derive(Debug)]
pub struct WordParser {
    path: PathBuf,
}

impl WordParser {
    pub const EXTENSIONS: &'static [&'static str] = &["docx", "doc"];

    /// Open a Word file, checking existence and extension.
    pub fn open(path: &Path) -> Result<Self, PipelineError> {
        let path = checked_path(path, Self::EXTENSIONS)?;
        if extension_of(&path) == "doc" {
            log::warn!(
                "'{}': legacy .doc support is best-effort; convert to .docx for full fidelity",
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

impl DocumentParser for WordParser {
    fn parse(&self) -> NormalizedDocument {
        log::info!("parsing word document: {}", self.path.display());
        let mut document = NormalizedDocument::new(
            filename_of(&self.path),
            FileType::Word,
            DocumentContent::Word(WordContent::default()),
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

        let styles = load_styles(&mut archive);
        let body = match load_body(&mut archive, &styles) {
            Ok(body) => body,
            Err(error) => {
                document
                    .errors
                    .push(ParseIssue::new(ExtractStage::Content, error));
                Body::default()
            }
        };

        document
            .metadata
            .insert("paragraph_count".to_owned(), body.paragraph_count.to_string());
        document
            .metadata
            .insert("table_count".to_owned(), body.tables.len().to_string());
        document
            .metadata
            .insert("section_count".to_owned(), body.sections.len().to_string());

        document.content = DocumentContent::Word(WordContent {
            paragraphs: body.paragraphs,
            sections: body.sections,
        });
        document.tables = body.tables;
        document.images = body.images;
        document
    }

    fn extract_text(&self) -> Result<String, PipelineError> {
        let mut archive = self.load().map_err(PipelineError::parse_failed)?;
        let styles = load_styles(&mut archive);
        let body = load_body(&mut archive, &styles).map_err(PipelineError::parse_failed)?;
        Ok(body
            .paragraphs
            .iter()
            .map(|paragraph| paragraph.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n"))
    }

    fn extract_metadata(&self) -> Result<BTreeMap<String, String>, PipelineError> {
        let mut archive = self.load().map_err(PipelineError::parse_failed)?;
        let mut metadata = core_properties(&mut archive).map_err(PipelineError::parse_failed)?;
        let styles = load_styles(&mut archive);
        let body = load_body(&mut archive, &styles).map_err(PipelineError::parse_failed)?;
        metadata.insert("paragraph_count".to_owned(), body.paragraph_count.to_string());
        metadata.insert("table_count".to_owned(), body.tables.len().to_string());
        metadata.insert("section_count".to_owned(), body.sections.len().to_string());
        Ok(metadata)
    }

    fn extract_tables(&self) -> Result<Vec<Table>, PipelineError> {
        let mut archive = self.load().map_err(PipelineError::parse_failed)?;
        let styles = load_styles(&mut archive);
        let body = load_body(&mut archive, &styles).map_err(PipelineError::parse_failed)?;
        Ok(body.tables)
    }

    fn extract_images(&self) -> Result<Vec<ImageRef>, PipelineError> {
        let mut archive = self.load().map_err(PipelineError::parse_failed)?;
        let styles = load_styles(&mut archive);
        let body = load_body(&mut archive, &styles).map_err(PipelineError::parse_failed)?;
        Ok(body.images)
    }
}

#[derive(Default)]
struct Body {
    paragraphs: Vec<Paragraph>,
    sections: Vec<Section>,
    tables: Vec<Table>,
    images: Vec<ImageRef>,
    /// Body paragraphs including empty ones (metadata statistic).
    paragraph_count: usize,
}

/// styleId -> display name from `word/styles.xml`, best effort.
fn load_styles(archive: &mut Archive) -> BTreeMap<String, String> {
    if !has_part(archive, "word/styles.xml") {
        return BTreeMap::new();
    }
    let Ok(content) = read_part(archive, "word/styles.xml") else {
        return BTreeMap::new();
    };

    let mut styles = BTreeMap::new();
    let mut reader = Reader::from_str(&content);
    reader.trim_text(true);
    let mut current_id: Option<String> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref element)) | Ok(Event::Empty(ref element)) => {
                match local_name(element.name().as_ref()) {
                    b"style" => current_id = attribute_value(element, b"styleId"),
                    b"name" => {
                        if let (Some(id), Some(value)) =
                            (current_id.as_ref(), attribute_value(element, b"val"))
                        {
                            styles.insert(id.clone(), value);
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::End(ref element)) if local_name(element.name().as_ref()) == b"style" => {
                current_id = None;
            }
            Ok(Event::Eof) => break,
            Err(_) => break,
            _ => {}
        }
    }
    styles
}

/// Single pass over `word/document.xml`: body paragraphs, tables, sections
/// and inline drawing extents, in document order.
fn load_body(archive: &mut Archive, styles: &BTreeMap<String, String>) -> Result<Body, String> {
    let content = read_part(archive, "word/document.xml")?;
    let mut body = Body::default();

    let mut reader = Reader::from_str(&content);
    reader.trim_text(false);

    let mut table_depth = 0usize;
    let mut in_paragraph = false;
    let mut paragraph_style: Option<String> = None;
    let mut paragraph_text = String::new();

    let mut table_rows: Vec<Vec<String>> = Vec::new();
    let mut current_row: Vec<String> = Vec::new();
    let mut cell_text = String::new();
    let mut in_cell = false;

    let mut in_section = false;
    let mut page_size: (Option<f64>, Option<f64>) = (None, None);
    let mut margins: [Option<f64>; 4] = [None; 4];

    let mut in_drawing = false;
    let mut drawing_extent: (Option<f64>, Option<f64>) = (None, None);
    let mut drawing_name: Option<String> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref element)) => match local_name(element.name().as_ref()) {
                b"p" if table_depth == 0 && !in_drawing && !in_paragraph => {
                    in_paragraph = true;
                    paragraph_style = None;
                    paragraph_text.clear();
                }
                b"tbl" => {
                    table_depth += 1;
                    if table_depth == 1 {
                        table_rows.clear();
                    }
                }
                b"tr" if table_depth == 1 => current_row = Vec::new(),
                b"tc" if table_depth == 1 => {
                    cell_text.clear();
                    in_cell = true;
                }
                b"sectPr" => {
                    in_section = true;
                    page_size = (None, None);
                    margins = [None; 4];
                }
                b"drawing" => {
                    in_drawing = true;
                    drawing_extent = (None, None);
                    drawing_name = None;
                }
                _ => {}
            },
            Ok(Event::Empty(ref element)) => match local_name(element.name().as_ref()) {
                // Self-closing empty paragraph: counts, contributes nothing.
                b"p" if table_depth == 0 => body.paragraph_count += 1,
                b"pStyle" if in_paragraph && table_depth == 0 => {
                    paragraph_style = attribute_value(element, b"val");
                }
                b"br" if in_paragraph && table_depth == 0 => paragraph_text.push('\n'),
                b"tab" if in_paragraph && table_depth == 0 => paragraph_text.push('\t'),
                b"pgSz" if in_section => {
                    page_size = (
                        attribute_value(element, b"w")
                            .and_then(|value| value.parse::<i64>().ok())
                            .map(twips_to_inches),
                        attribute_value(element, b"h")
                            .and_then(|value| value.parse::<i64>().ok())
                            .map(twips_to_inches),
                    );
                }
                b"pgMar" if in_section => {
                    for (slot, attribute) in [b"left" as &[u8], b"right", b"top", b"bottom"]
                        .into_iter()
                        .enumerate()
                    {
                        margins[slot] = attribute_value(element, attribute)
                            .and_then(|value| value.parse::<i64>().ok())
                            .map(twips_to_inches);
                    }
                }
                b"extent" if in_drawing => {
                    drawing_extent = (
                        attribute_value(element, b"cx")
                            .and_then(|value| value.parse::<i64>().ok())
                            .map(emu_to_inches),
                        attribute_value(element, b"cy")
                            .and_then(|value| value.parse::<i64>().ok())
                            .map(emu_to_inches),
                    );
                }
                b"docPr" if in_drawing => drawing_name = attribute_value(element, b"name"),
                _ => {}
            },
            Ok(Event::Text(ref text)) => {
                let value = text.unescape().unwrap_or_default();
                if table_depth > 0 && in_cell {
                    cell_text.push_str(&value);
                } else if in_paragraph {
                    paragraph_text.push_str(&value);
                }
            }
            Ok(Event::End(ref element)) => match local_name(element.name().as_ref()) {
                b"p" => {
                    if table_depth == 0 && in_paragraph && !in_drawing {
                        if !paragraph_text.trim().is_empty() {
                            body.paragraphs.push(classify_paragraph(
                                body.paragraph_count,
                                &paragraph_text,
                                paragraph_style.as_deref(),
                                styles,
                            ));
                        }
                        body.paragraph_count += 1;
                        in_paragraph = false;
                    } else if in_cell {
                        cell_text.push('\n');
                    }
                }
                b"tbl" => {
                    table_depth = table_depth.saturating_sub(1);
                    if table_depth == 0 {
                        body.tables.push(Table::from_rows(
                            None,
                            Vec::new(),
                            std::mem::take(&mut table_rows),
                        ));
                    }
                }
                b"tr" if table_depth == 1 => {
                    table_rows.push(std::mem::take(&mut current_row));
                }
                b"tc" if table_depth == 1 => {
                    current_row.push(cell_text.trim().to_owned());
                    in_cell = false;
                }
                b"sectPr" => {
                    in_section = false;
                    body.sections.push(build_section(
                        body.sections.len(),
                        page_size,
                        margins,
                    ));
                }
                b"drawing" => {
                    in_drawing = false;
                    let mut image = ImageRef::new(body.images.len() + 1);
                    image.name = drawing_name.take();
                    image.width = drawing_extent.0;
                    image.height = drawing_extent.1;
                    body.images.push(image);
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(error) => {
                return Err(format!("error parsing word document body: {error}"));
            }
            _ => {}
        }
    }

    Ok(body)
}

fn heading_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^Heading\s*(.*)$").expect("valid heading pattern"))
}

/// Classify one body paragraph, resolving the style id to its display name.
/// A style matching `Heading <N>` marks a heading; a non-numeric suffix
/// defaults to level 1.
fn classify_paragraph(
    index: usize,
    text: &str,
    style_id: Option<&str>,
    styles: &BTreeMap<String, String>,
) -> Paragraph {
    let style = style_id.map(|id| {
        let resolved = styles.get(id).map(String::as_str).unwrap_or(id);
        normalize_style_name(resolved)
    });

    let mut paragraph = Paragraph {
        index,
        text: text.to_owned(),
        style,
        is_heading: false,
        heading_level: None,
    };

    if let Some(style) = paragraph.style.as_deref() {
        if let Some(captures) = heading_pattern().captures(style) {
            paragraph.is_heading = true;
            paragraph.heading_level = Some(
                captures
                    .get(1)
                    .map(|suffix| suffix.as_str().trim())
                    .and_then(|suffix| suffix.parse::<u32>().ok())
                    .unwrap_or(1),
            );
        }
    }

    paragraph
}

/// Built-in style names are stored lowercase in the part ("heading 2");
/// surface them the way word processors display them.
fn normalize_style_name(name: &str) -> String {
    if let Some(rest) = name.strip_prefix("heading") {
        format!("Heading{rest}")
    } else {
        name.to_owned()
    }
}

fn build_section(
    index: usize,
    page_size: (Option<f64>, Option<f64>),
    margins: [Option<f64>; 4],
) -> Section {
    let orientation = match page_size {
        (Some(width), Some(height)) if width > height => "landscape",
        _ => "portrait",
    };
    Section {
        index,
        page_width: page_size.0,
        page_height: page_size.1,
        orientation: orientation.to_owned(),
        left_margin: margins[0],
        right_margin: margins[1],
        top_margin: margins[2],
        bottom_margin: margins[3],
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

    const DOCUMENT_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" xmlns:wp="http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing">
  <w:body>
    <w:p><w:pPr><w:pStyle w:val="Heading2"/></w:pPr><w:r><w:t>Budget</w:t></w:r></w:p>
    <w:p><w:r><w:t>Revenue grew in the second quarter.</w:t></w:r></w:p>
    <w:p/>
    <w:p><w:r><w:drawing><wp:inline><wp:extent cx="914400" cy="457200"/><wp:docPr id="1" name="Picture 1"/></wp:inline></w:drawing></w:r><w:r><w:t>Figure caption</w:t></w:r></w:p>
    <w:tbl>
      <w:tr><w:tc><w:p><w:r><w:t> Name </w:t></w:r></w:p></w:tc><w:tc><w:p><w:r><w:t>Age</w:t></w:r></w:p></w:tc></w:tr>
      <w:tr><w:tc><w:p><w:r><w:t>Ana</w:t></w:r></w:p></w:tc><w:tc><w:p><w:r><w:t>30</w:t></w:r></w:p></w:tc></w:tr>
    </w:tbl>
    <w:sectPr><w:pgSz w:w="16838" w:h="11906"/><w:pgMar w:top="1440" w:right="1080" w:bottom="1440" w:left="1080"/></w:sectPr>
  </w:body>
</w:document>"#;

    const STYLES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:style w:type="paragraph" w:styleId="Heading2"><w:name w:val="heading 2"/></w:style>
  <w:style w:type="paragraph" w:styleId="Normal"><w:name w:val="Normal"/></w:style>
</w:styles>"#;

    const CORE_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/">
  <dc:title>Budget Review</dc:title>
  <dc:creator>Ana Example</dc:creator>
  <dcterms:created>2024-03-01T09:00:00Z</dcterms:created>
</cp:coreProperties>"#;

    fn write_docx() -> NamedTempFile {
        let file = NamedTempFile::with_suffix(".docx").expect("create docx temp file");
        let mut writer =
            zip::ZipWriter::new(fs::File::create(file.path()).expect("open docx for write"));
        for (name, contents) in [
            ("word/document.xml", DOCUMENT_XML),
            ("word/styles.xml", STYLES_XML),
            ("docProps/core.xml", CORE_XML),
        ] {
            writer
                .start_file(name, SimpleFileOptions::default())
                .expect("start zip entry");
            writer
                .write_all(contents.as_bytes())
                .expect("write zip entry");
        }
        writer.finish().expect("finish docx");
        file
    }

    #[test]
    fn open_rejects_missing_file_and_foreign_extension() {
        let error = WordParser::open(Path::new("/tmp/missing.docx")).expect_err("missing file");
        assert_eq!(error.kind, ErrorKind::NotFound);

        let file = NamedTempFile::with_suffix(".xlsx").expect("create temp file");
        fs::write(file.path(), b"stub").expect("write stub");
        let error = WordParser::open(file.path()).expect_err("xlsx extension");
        assert_eq!(error.kind, ErrorKind::UnsupportedExtension);
    }

    #[test]
    fn heading_style_sets_level_and_flag() {
        let file = write_docx();
        let parser = WordParser::open(file.path()).expect("open docx");
        let document = parser.parse();

        assert!(document.errors.is_empty(), "errors: {:?}", document.errors);
        let DocumentContent::Word(content) = &document.content else {
            panic!("expected word content");
        };

        let heading = &content.paragraphs[0];
        assert_eq!(heading.text, "Budget");
        assert_eq!(heading.style.as_deref(), Some("Heading 2"));
        assert!(heading.is_heading);
        assert_eq!(heading.heading_level, Some(2));

        let plain = &content.paragraphs[1];
        assert!(!plain.is_heading);
        assert_eq!(plain.heading_level, None);
    }

    #[test]
    fn paragraph_indexes_count_skipped_empty_paragraphs() {
        let file = write_docx();
        let parser = WordParser::open(file.path()).expect("open docx");
        let document = parser.parse();

        let DocumentContent::Word(content) = &document.content else {
            panic!("expected word content");
        };
        // Body order: heading(0), plain(1), empty(2, dropped), caption(3).
        assert_eq!(content.paragraphs.len(), 3);
        assert_eq!(content.paragraphs[2].index, 3);
        assert_eq!(
            document.metadata.get("paragraph_count").map(String::as_str),
            Some("4")
        );
    }

    #[test]
    fn tables_are_extracted_with_trimmed_cells() {
        let file = write_docx();
        let parser = WordParser::open(file.path()).expect("open docx");
        let tables = parser.extract_tables().expect("tables");

        assert_eq!(tables.len(), 1);
        let table = &tables[0];
        assert_eq!(table.rows, 2);
        assert_eq!(table.columns, 2);
        assert_eq!(table.data[0], vec!["Name", "Age"]);
        assert_eq!(table.data[1], vec!["Ana", "30"]);
        assert_eq!(table.rows, table.data.len());
    }

    #[test]
    fn section_orientation_derives_from_page_dimensions() {
        let file = write_docx();
        let parser = WordParser::open(file.path()).expect("open docx");
        let document = parser.parse();

        let DocumentContent::Word(content) = &document.content else {
            panic!("expected word content");
        };
        assert_eq!(content.sections.len(), 1);
        let section = &content.sections[0];
        assert_eq!(section.orientation, "landscape");
        assert!((section.page_width.expect("width") - 11.693).abs() < 0.01);
        assert_eq!(section.left_margin, Some(0.75));
        assert_eq!(section.top_margin, Some(1.0));
    }

    #[test]
    fn metadata_combines_core_properties_and_statistics() {
        let file = write_docx();
        let parser = WordParser::open(file.path()).expect("open docx");
        let metadata = parser.extract_metadata().expect("metadata");

        assert_eq!(metadata.get("author").map(String::as_str), Some("Ana Example"));
        assert_eq!(metadata.get("title").map(String::as_str), Some("Budget Review"));
        assert_eq!(
            metadata.get("created").map(String::as_str),
            Some("2024-03-01T09:00:00Z")
        );
        assert_eq!(metadata.get("table_count").map(String::as_str), Some("1"));
        assert_eq!(metadata.get("section_count").map(String::as_str), Some("1"));
    }

    #[test]
    fn inline_drawings_become_image_references() {
        let file = write_docx();
        let parser = WordParser::open(file.path()).expect("open docx");
        let images = parser.extract_images().expect("images");

        assert_eq!(images.len(), 1);
        assert_eq!(images[0].name.as_deref(), Some("Picture 1"));
        assert_eq!(images[0].width, Some(1.0));
        assert_eq!(images[0].height, Some(0.5));
        assert!(images[0].data.is_none());
    }

    #[test]
    fn extract_text_joins_non_empty_paragraphs() {
        let file = write_docx();
        let parser = WordParser::open(file.path()).expect("open docx");
        let text = parser.extract_text().expect("text");

        assert!(text.starts_with("Budget\n\n"));
        assert!(text.contains("Revenue grew"));
        assert!(!text.contains("Name")); // table cells are not body paragraphs
    }

    #[test]
    fn legacy_doc_bytes_soft_fail_into_error_log() {
        let file = NamedTempFile::with_suffix(".doc").expect("create temp file");
        fs::write(file.path(), b"\xd0\xcf\x11\xe0legacy").expect("write stub");
        let parser = WordParser::open(file.path()).expect("open doc wrapper");

        let document = parser.parse();
        assert!(!document.errors.is_empty());
        assert_eq!(document.errors[0].stage, ExtractStage::Content);
        let DocumentContent::Word(content) = &document.content else {
            panic!("expected word content");
        };
        assert!(content.paragraphs.is_empty());
    }
}
