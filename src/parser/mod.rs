pub mod dispatch;
pub mod excel;
pub mod ooxml;
pub mod pdf;
pub mod powerpoint;
pub mod word;

pub use dispatch::{open_parser, open_parser_for_family};
pub use excel::ExcelParser;
pub use pdf::PdfParser;
pub use powerpoint::PowerPointParser;
pub use word::WordParser;

use crate::error::PipelineError;
use crate::model::{ImageRef, NormalizedDocument, Table};
use crate::validate::extension_of;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Capability contract shared by all format parsers.
///
/// `parse()` never fails once construction succeeded: extraction errors are
/// captured in the returned document's error log and parsing continues with
/// best-effort partial results. The standalone capabilities are fallible.
pub trait DocumentParser {
    fn parse(&self) -> NormalizedDocument;

    fn extract_text(&self) -> Result<String, PipelineError>;

    fn extract_metadata(&self) -> Result<BTreeMap<String, String>, PipelineError>;

    /// Tables in document order. Defaults to empty for variants with no
    /// native notion of tables.
    fn extract_tables(&self) -> Result<Vec<Table>, PipelineError> {
        Ok(Vec::new())
    }

    /// Image references in document order. Defaults to empty for variants
    /// with no native notion of images.
    fn extract_images(&self) -> Result<Vec<ImageRef>, PipelineError> {
        Ok(Vec::new())
    }
}

/// Format-specific parser access.
///
/// All variants carry the original file path; dispatch selects the variant
/// from the extension table, so matches stay exhaustive.
#[derive(Debug)]
pub enum Parser {
    Pdf(PdfParser),
    Word(WordParser),
    Excel(ExcelParser),
    PowerPoint(PowerPointParser),
}

impl Parser {
    pub fn path(&self) -> &Path {
        match self {
            Parser::Pdf(parser) => parser.path(),
            Parser::Word(parser) => parser.path(),
            Parser::Excel(parser) => parser.path(),
            Parser::PowerPoint(parser) => parser.path(),
        }
    }

    pub fn parse(&self) -> NormalizedDocument {
        match self {
            Parser::Pdf(parser) => parser.parse(),
            Parser::Word(parser) => parser.parse(),
            Parser::Excel(parser) => parser.parse(),
            Parser::PowerPoint(parser) => parser.parse(),
        }
    }

    pub fn extract_text(&self) -> Result<String, PipelineError> {
        match self {
            Parser::Pdf(parser) => parser.extract_text(),
            Parser::Word(parser) => parser.extract_text(),
            Parser::Excel(parser) => parser.extract_text(),
            Parser::PowerPoint(parser) => parser.extract_text(),
        }
    }

    pub fn extract_metadata(&self) -> Result<BTreeMap<String, String>, PipelineError> {
        match self {
            Parser::Pdf(parser) => parser.extract_metadata(),
            Parser::Word(parser) => parser.extract_metadata(),
            Parser::Excel(parser) => parser.extract_metadata(),
            Parser::PowerPoint(parser) => parser.extract_metadata(),
        }
    }

    pub fn extract_tables(&self) -> Result<Vec<Table>, PipelineError> {
        match self {
            Parser::Pdf(parser) => parser.extract_tables(),
            Parser::Word(parser) => parser.extract_tables(),
            Parser::Excel(parser) => parser.extract_tables(),
            Parser::PowerPoint(parser) => parser.extract_tables(),
        }
    }

    pub fn extract_images(&self) -> Result<Vec<ImageRef>, PipelineError> {
        match self {
            Parser::Pdf(parser) => parser.extract_images(),
            Parser::Word(parser) => parser.extract_images(),
            Parser::Excel(parser) => parser.extract_images(),
            Parser::PowerPoint(parser) => parser.extract_images(),
        }
    }
}

/// Shared construction checks: the path must exist and carry one of the
/// variant's declared extensions.
pub(crate) fn checked_path(path: &Path, extensions: &[&str]) -> Result<PathBuf, PipelineError> {
    if !path.exists() {
        return Err(PipelineError::not_found(format!(
            "file not found: {}",
            path.display()
        )));
    }

    let extension = extension_of(path);
    if !extensions.contains(&extension.as_str()) {
        return Err(PipelineError::unsupported_extension(format!(
            "unsupported file extension: '.{extension}'. supported: {}",
            extensions.join(", ")
        )));
    }

    Ok(path.to_path_buf())
}

/// Extension membership check shared by the `can_parse` capability.
pub(crate) fn extension_matches(path: &Path, extensions: &[&str]) -> bool {
    extensions.contains(&extension_of(path).as_str())
}

pub(crate) fn filename_of(path: &Path) -> String {
    path.file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("document")
        .to_owned()
}
