use serde::{Deserialize, Serialize};

/// Fatal error kinds raised before any document is produced, or by the
/// renderer/persistence layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Input path missing, or not a regular file.
    #[serde(rename = "E_NOT_FOUND")]
    NotFound,
    /// Extension outside the allowlist for every format family.
    #[serde(rename = "E_UNSUPPORTED_EXTENSION")]
    UnsupportedExtension,
    /// Sniffed content belongs to a different format family than the extension.
    #[serde(rename = "E_CONTENT_TYPE_MISMATCH")]
    ContentTypeMismatch,
    /// Empty file or file above the configured size ceiling.
    #[serde(rename = "E_SIZE_EXCEEDED")]
    SizeExceeded,
    /// No parser registered for the resolved format family.
    #[serde(rename = "E_NO_PARSER")]
    NoParserAvailable,
    /// Requested output format name is not one of json/markdown/csv/txt.
    #[serde(rename = "E_UNSUPPORTED_OUTPUT")]
    UnsupportedOutputFormat,
    /// I/O failure while writing or removing output files.
    #[serde(rename = "E_IO")]
    Io,
    /// The underlying document handle could not be loaded for a standalone
    /// capability call (parse() soft-fails instead).
    #[serde(rename = "E_PARSE")]
    ParseFailed,
}

/// Caller-facing error: a standardized kind plus free-form message text.
///
/// Callers must treat the message as non-localized free text; only `kind`
/// is stable for matching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineError {
    pub kind: ErrorKind,
    pub message: String,
}

impl PipelineError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    pub fn unsupported_extension(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnsupportedExtension, message)
    }

    pub fn size_exceeded(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::SizeExceeded, message)
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Io, message)
    }

    pub fn parse_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ParseFailed, message)
    }
}

impl std::fmt::Display for PipelineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for PipelineError {}

/// Extraction stage that produced a soft failure inside `parse()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractStage {
    Metadata,
    Content,
    Tables,
    Images,
}

/// Soft failure captured in the document's error log. A non-empty log does
/// not invalidate the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseIssue {
    pub stage: ExtractStage,
    pub message: String,
}

impl ParseIssue {
    pub fn new(stage: ExtractStage, message: impl Into<String>) -> Self {
        Self {
            stage,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_kind_as_stable_code() {
        let error = PipelineError::not_found("file not found: /tmp/missing.pdf");
        let value = serde_json::to_value(&error).expect("serialize error");
        assert_eq!(value["kind"], "E_NOT_FOUND");
        assert_eq!(value["message"], "file not found: /tmp/missing.pdf");
    }

    #[test]
    fn display_is_the_free_form_message() {
        let error = PipelineError::size_exceeded("file is empty: 0 bytes");
        assert_eq!(error.to_string(), "file is empty: 0 bytes");
    }

    #[test]
    fn issue_round_trips_with_lowercase_stage() {
        let issue = ParseIssue::new(ExtractStage::Tables, "sheet read failed");
        let value = serde_json::to_value(&issue).expect("serialize issue");
        assert_eq!(value["stage"], "tables");

        let back: ParseIssue = serde_json::from_value(value).expect("deserialize issue");
        assert_eq!(back, issue);
    }
}
