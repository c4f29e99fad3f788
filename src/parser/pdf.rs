use crate::error::{ExtractStage, ParseIssue, PipelineError};
use crate::model::{
    DocumentContent, FileType, ImageRef, NormalizedDocument, PdfContent, PdfPage,
};
use crate::parser::{DocumentParser, checked_path, extension_matches, filename_of};
use lopdf::{Dictionary, Object, ObjectId};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Parser for PDF documents via structural access.
///
/// Image extraction is metadata-only (name, pixel dimensions, color space);
/// raw bytes are not retrieved, so these references are skipped by vision
/// enrichment. Table extraction intentionally returns empty: no geometric
/// table detection is in scope.
#[derive(Debug)]
pub struct PdfParser {
    path: PathBuf,
}

impl PdfParser {
    pub const EXTENSIONS: &'static [&'static str] = &["pdf"];

    /// Open a PDF file, checking existence and extension.
    pub fn open(path: &Path) -> Result<Self, PipelineError> {
        Ok(Self {
            path: checked_path(path, Self::EXTENSIONS)?,
        })
    }

    pub fn can_parse(path: &Path) -> bool {
        extension_matches(path, Self::EXTENSIONS)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<lopdf::Document, String> {
        lopdf::Document::load(&self.path)
            .map_err(|error| format!("failed reading pdf '{}': {error}", self.path.display()))
    }
}

impl DocumentParser for PdfParser {
    fn parse(&self) -> NormalizedDocument {
        log::info!("parsing pdf: {}", self.path.display());
        let mut document = NormalizedDocument::new(
            filename_of(&self.path),
            FileType::Pdf,
            DocumentContent::Pdf(PdfContent::default()),
        );

        let handle = match self.load() {
            Ok(handle) => handle,
            Err(error) => {
                document
                    .errors
                    .push(ParseIssue::new(ExtractStage::Content, error));
                return document;
            }
        };

        match metadata_from(&handle) {
            Ok(metadata) => document.metadata = metadata,
            Err(error) => document
                .errors
                .push(ParseIssue::new(ExtractStage::Metadata, error)),
        }

        let mut issues = Vec::new();
        let pages = pages_from(&handle, &mut issues);
        document.content = DocumentContent::Pdf(PdfContent {
            total_pages: pages.len(),
            pages,
        });
        document.errors.append(&mut issues);

        match images_from(&handle) {
            Ok(images) => document.images = images,
            Err(error) => document
                .errors
                .push(ParseIssue::new(ExtractStage::Images, error)),
        }

        document
    }

    fn extract_text(&self) -> Result<String, PipelineError> {
        let handle = self.load().map_err(PipelineError::parse_failed)?;
        let mut parts = Vec::new();
        for &number in handle.get_pages().keys() {
            if let Ok(text) = handle.extract_text(&[number]) {
                if !text.trim().is_empty() {
                    parts.push(text.trim().to_owned());
                }
            }
        }
        Ok(parts.join("\n\n"))
    }

    fn extract_metadata(&self) -> Result<BTreeMap<String, String>, PipelineError> {
        let handle = self.load().map_err(PipelineError::parse_failed)?;
        metadata_from(&handle).map_err(PipelineError::parse_failed)
    }

    fn extract_images(&self) -> Result<Vec<ImageRef>, PipelineError> {
        let handle = self.load().map_err(PipelineError::parse_failed)?;
        images_from(&handle).map_err(PipelineError::parse_failed)
    }
}

/// Metadata from the trailer Info dictionary plus a page count. A missing
/// Info dictionary is not an error.
fn metadata_from(document: &lopdf::Document) -> Result<BTreeMap<String, String>, String> {
    let mut metadata = BTreeMap::new();

    if let Ok(info_object) = document.trailer.get(b"Info") {
        let info_object = match info_object {
            Object::Reference(object_id) => document
                .get_object(*object_id)
                .map_err(|error| format!("unable to resolve Info dictionary reference: {error}"))?,
            object => object,
        };
        let dictionary = info_object
            .as_dict()
            .map_err(|error| format!("Info object is not a dictionary: {error}"))?;

        for (name, object) in dictionary {
            let key = String::from_utf8_lossy(name).to_string();
            let value = object_as_string(document, object)?;
            if !value.is_empty() {
                metadata.insert(key, value);
            }
        }
    }

    metadata.insert(
        "page_count".to_owned(),
        document.get_pages().len().to_string(),
    );
    Ok(metadata)
}

/// Pages in document order. A per-page text failure degrades to an empty
/// string for that page plus one content-stage issue, never a document
/// failure.
fn pages_from(document: &lopdf::Document, issues: &mut Vec<ParseIssue>) -> Vec<PdfPage> {
    let mut pages = Vec::new();
    for (&number, &page_id) in &document.get_pages() {
        let text = match document.extract_text(&[number]) {
            Ok(text) => text,
            Err(error) => {
                issues.push(ParseIssue::new(
                    ExtractStage::Content,
                    format!("failed to extract text from page {number}: {error}"),
                ));
                String::new()
            }
        };

        let (width, height) = page_dimensions(document, page_id);
        pages.push(PdfPage {
            page_number: number as usize,
            text,
            width,
            height,
        });
    }
    pages
}

/// Image metadata from page-resource XObjects with `Subtype /Image`.
fn images_from(document: &lopdf::Document) -> Result<Vec<ImageRef>, String> {
    let mut images = Vec::new();
    for (&number, &page_id) in &document.get_pages() {
        let Some(resources) = page_resources(document, page_id) else {
            continue;
        };
        let Some(xobjects) = resolve_dict(document, resources.get(b"XObject").ok()) else {
            continue;
        };

        for (name, object) in xobjects {
            let resolved = match object {
                Object::Reference(object_id) => match document.get_object(*object_id) {
                    Ok(resolved) => resolved,
                    Err(error) => {
                        return Err(format!("unable to resolve XObject reference: {error}"));
                    }
                },
                object => object,
            };
            let Object::Stream(stream) = resolved else {
                continue;
            };
            if !matches!(stream.dict.get(b"Subtype"), Ok(Object::Name(kind)) if kind == b"Image") {
                continue;
            }

            let mut image = ImageRef::new(number as usize);
            image.name = Some(String::from_utf8_lossy(name).to_string());
            image.width = stream.dict.get(b"Width").ok().and_then(object_as_f64);
            image.height = stream.dict.get(b"Height").ok().and_then(object_as_f64);
            image.color_space = Some(match stream.dict.get(b"ColorSpace") {
                Ok(Object::Name(space)) => String::from_utf8_lossy(space).to_string(),
                Ok(other) => object_as_string(document, other).unwrap_or_else(|_| "Unknown".to_owned()),
                Err(_) => "Unknown".to_owned(),
            });
            images.push(image);
        }
    }
    Ok(images)
}

/// Walk the page dictionary and its parents for the Resources dictionary.
fn page_resources(document: &lopdf::Document, page_id: ObjectId) -> Option<&Dictionary> {
    let mut current = page_id;
    for _ in 0..8 {
        let dictionary = document.get_dictionary(current).ok()?;
        if let Ok(object) = dictionary.get(b"Resources") {
            return resolve_dict(document, Some(object));
        }
        match dictionary.get(b"Parent") {
            Ok(Object::Reference(object_id)) => current = *object_id,
            _ => return None,
        }
    }
    None
}

fn resolve_dict<'a>(
    document: &'a lopdf::Document,
    object: Option<&'a Object>,
) -> Option<&'a Dictionary> {
    match object? {
        Object::Dictionary(dictionary) => Some(dictionary),
        Object::Reference(object_id) => document.get_object(*object_id).ok()?.as_dict().ok(),
        _ => None,
    }
}

/// MediaBox width/height in points, inherited through the page tree.
fn page_dimensions(document: &lopdf::Document, page_id: ObjectId) -> (Option<f64>, Option<f64>) {
    let mut current = page_id;
    for _ in 0..8 {
        let Ok(dictionary) = document.get_dictionary(current) else {
            break;
        };
        if let Ok(Object::Array(values)) = dictionary.get(b"MediaBox") {
            let numbers: Vec<f64> = values.iter().filter_map(object_as_f64).collect();
            if numbers.len() == 4 {
                return (Some(numbers[2] - numbers[0]), Some(numbers[3] - numbers[1]));
            }
            break;
        }
        match dictionary.get(b"Parent") {
            Ok(Object::Reference(object_id)) => current = *object_id,
            _ => break,
        }
    }
    (None, None)
}

fn object_as_f64(object: &Object) -> Option<f64> {
    match object {
        Object::Integer(value) => Some(*value as f64),
        Object::Real(value) => Some(*value as f64),
        _ => None,
    }
}

fn object_as_string(document: &lopdf::Document, object: &Object) -> Result<String, String> {
    match object {
        Object::String(bytes, _) => Ok(String::from_utf8_lossy(bytes).to_string()),
        Object::Name(bytes) => Ok(String::from_utf8_lossy(bytes).to_string()),
        Object::Integer(value) => Ok(value.to_string()),
        Object::Real(value) => Ok(value.to_string()),
        Object::Boolean(value) => Ok(value.to_string()),
        Object::Reference(object_id) => {
            let resolved = document
                .get_object(*object_id)
                .map_err(|error| format!("unable to resolve metadata reference: {error}"))?;
            object_as_string(document, resolved)
        }
        _ => Ok(format!("{object:?}")),
    }
}
