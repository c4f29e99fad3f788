use crate::error::{ErrorKind, PipelineError};
use crate::model::FileType;
use crate::parser::{ExcelParser, Parser, PdfParser, PowerPointParser, WordParser};
use crate::validate::{extension_of, family_for_extension};
use std::path::Path;

/// Open a parser using format dispatch from the path's extension.
pub fn open_parser(path: &Path) -> Result<Parser, PipelineError> {
    let extension = extension_of(path);
    let Some(family) = family_for_extension(&extension) else {
        return Err(PipelineError::new(
            ErrorKind::NoParserAvailable,
            format!("no parser available for file type: '.{extension}'"),
        ));
    };
    open_parser_for_family(path, family)
}

/// Open the parser variant registered for a validated format family.
pub fn open_parser_for_family(path: &Path, family: FileType) -> Result<Parser, PipelineError> {
    match family {
        FileType::Pdf => Ok(Parser::Pdf(PdfParser::open(path)?)),
        FileType::Word => Ok(Parser::Word(WordParser::open(path)?)),
        FileType::Excel => Ok(Parser::Excel(ExcelParser::open(path)?)),
        FileType::PowerPoint => Ok(Parser::PowerPoint(PowerPointParser::open(path)?)),
    }
}
