use crate::error::PipelineError;
use crate::model::{ImageRef, NormalizedDocument, Table};
use crate::parser::open_parser_for_family;
use crate::validate::{FileValidator, supported_extensions};
use crate::vision::VisionAdapter;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use std::collections::BTreeMap;
use std::path::Path;

/// Central pipeline: validate, dispatch, parse, then enrich images.
///
/// The pipeline is synchronous end-to-end and holds no shared mutable
/// state; hosts processing documents concurrently use independent engine
/// instances.
#[derive(Default)]
pub struct ParsingEngine {
    validator: FileValidator,
    vision: Option<Box<dyn VisionAdapter>>,
}

impl ParsingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_validator(mut self, validator: FileValidator) -> Self {
        self.validator = validator;
        self
    }

    /// Attach a vision adapter; enrichment stays best-effort and never
    /// aborts parsing.
    pub fn with_vision(mut self, adapter: Box<dyn VisionAdapter>) -> Self {
        self.vision = Some(adapter);
        self
    }

    /// Parse a document file into the normalized model.
    pub fn parse(&self, path: &Path) -> Result<NormalizedDocument, PipelineError> {
        let family = self.validator.validate(path)?;
        let parser = open_parser_for_family(path, family)?;
        let mut document = parser.parse();

        if let Some(adapter) = &self.vision {
            enrich_images(&mut document.images, adapter.as_ref());
        }
        Ok(document)
    }

    /// Parse and return the dict-shaped equivalent.
    pub fn parse_to_value(&self, path: &Path) -> Result<serde_json::Value, PipelineError> {
        Ok(self.parse(path)?.to_value())
    }

    /// Extract plain text only.
    pub fn extract_text(&self, path: &Path) -> Result<String, PipelineError> {
        let family = self.validator.validate(path)?;
        open_parser_for_family(path, family)?.extract_text()
    }

    /// Extract tables only.
    pub fn extract_tables(&self, path: &Path) -> Result<Vec<Table>, PipelineError> {
        let family = self.validator.validate(path)?;
        open_parser_for_family(path, family)?.extract_tables()
    }

    /// Extract metadata only.
    pub fn extract_metadata(
        &self,
        path: &Path,
    ) -> Result<BTreeMap<String, String>, PipelineError> {
        let family = self.validator.validate(path)?;
        open_parser_for_family(path, family)?.extract_metadata()
    }

    /// All file extensions accepted across format families.
    pub fn supported_extensions() -> Vec<&'static str> {
        supported_extensions()
    }
}

/// Attach descriptions to every image carrying raw bytes. Adapter failures
/// set the failure placeholder and `ai_error`; metadata-only references are
/// skipped. Existing descriptions are never cleared.
fn enrich_images(images: &mut [ImageRef], adapter: &dyn VisionAdapter) {
    for image in images.iter_mut() {
        let Some(encoded) = image.data.as_deref() else {
            continue;
        };
        let bytes = match STANDARD.decode(encoded) {
            Ok(bytes) => bytes,
            Err(error) => {
                image.description = Some("Error analyzing image".to_owned());
                image.ai_error = Some(format!("invalid image payload: {error}"));
                continue;
            }
        };

        let content_type = image.content_type.as_deref().unwrap_or("image/png");
        let chart_like = image
            .name
            .as_deref()
            .is_some_and(|name| name.to_lowercase().contains("chart"));
        let result = if chart_like {
            adapter.analyze_chart(&bytes, content_type)
        } else {
            adapter.analyze(&bytes, content_type, None)
        };

        if result.success {
            image.description = result.description.or_else(|| Some(String::new()));
            image.ai_analyzed = Some(true);
        } else {
            image.description = Some("Image analysis failed".to_owned());
            image.ai_error = result.error;
        }
    }
}
