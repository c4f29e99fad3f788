use crate::error::{ErrorKind, PipelineError};
use crate::model::FileType;
use std::fs;
use std::io::Read;
use std::path::Path;

/// Default size ceiling: 50 MB.
pub const DEFAULT_MAX_FILE_SIZE_BYTES: u64 = 50 * 1024 * 1024;

/// Fixed format-family -> extension allowlist.
const FAMILY_EXTENSIONS: &[(FileType, &[&str])] = &[
    (FileType::Pdf, &["pdf"]),
    (FileType::Word, &["docx", "doc"]),
    (FileType::Excel, &["xlsx", "xls"]),
    (FileType::PowerPoint, &["pptx", "ppt"]),
];

/// Resolve a format family from a lowercase extension (without dot).
pub fn family_for_extension(extension: &str) -> Option<FileType> {
    FAMILY_EXTENSIONS
        .iter()
        .find(|(_, extensions)| extensions.contains(&extension))
        .map(|(family, _)| *family)
}

/// Declared extension set for one family.
pub fn extensions_for(family: FileType) -> &'static [&'static str] {
    FAMILY_EXTENSIONS
        .iter()
        .find(|(candidate, _)| *candidate == family)
        .map(|(_, extensions)| *extensions)
        .unwrap_or(&[])
}

/// All supported extensions across families, in table order.
pub fn supported_extensions() -> Vec<&'static str> {
    FAMILY_EXTENSIONS
        .iter()
        .flat_map(|(_, extensions)| extensions.iter().copied())
        .collect()
}

/// Lowercase extension of a path, without the dot.
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|extension| extension.to_str())
        .unwrap_or("")
        .to_ascii_lowercase()
}

/// Validates input files before a parser is instantiated.
///
/// Checks run in order and the first failure wins: existence, non-empty,
/// size ceiling, extension allowlist, advisory content sniffing. The
/// observable contract is accept/reject plus a human-readable reason; only
/// the error kind is stable.
#[derive(Debug, Clone)]
pub struct FileValidator {
    max_size_bytes: u64,
}

impl Default for FileValidator {
    fn default() -> Self {
        Self {
            max_size_bytes: DEFAULT_MAX_FILE_SIZE_BYTES,
        }
    }
}

impl FileValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_size_bytes(max_size_bytes: u64) -> Self {
        Self { max_size_bytes }
    }

    /// Validate a file and return its format family.
    pub fn validate(&self, path: &Path) -> Result<FileType, PipelineError> {
        if !path.exists() {
            return Err(PipelineError::not_found(format!(
                "file not found: {}",
                path.display()
            )));
        }
        if !path.is_file() {
            return Err(PipelineError::not_found(format!(
                "not a file: {}",
                path.display()
            )));
        }

        let size = fs::metadata(path)
            .map_err(|error| {
                PipelineError::io(format!("failed to stat '{}': {error}", path.display()))
            })?
            .len();
        if size == 0 {
            return Err(PipelineError::size_exceeded(format!(
                "file is empty: {} (0 bytes)",
                path.display()
            )));
        }
        if size > self.max_size_bytes {
            let size_mb = size as f64 / (1024.0 * 1024.0);
            let max_mb = self.max_size_bytes as f64 / (1024.0 * 1024.0);
            return Err(PipelineError::size_exceeded(format!(
                "file too large: {size_mb:.1}MB exceeds maximum {max_mb:.0}MB"
            )));
        }

        let extension = extension_of(path);
        let Some(family) = family_for_extension(&extension) else {
            return Err(PipelineError::unsupported_extension(format!(
                "unsupported file type: '.{extension}'. supported: {}",
                supported_extensions().join(", ")
            )));
        };

        // Advisory content check: only a confidently sniffed family from a
        // different family rejects; unknown signatures pass.
        if let Some(sniffed) = sniff_family(path) {
            if sniffed != family {
                return Err(PipelineError::new(
                    ErrorKind::ContentTypeMismatch,
                    format!(
                        "file content does not match extension: '.{extension}' declared {} but content looks like {}",
                        family.as_str(),
                        sniffed.as_str()
                    ),
                ));
            }
        }

        Ok(family)
    }
}

/// Sniff a format family from magic bytes, best effort.
///
/// Zip containers are probed for the OOXML part prefixes that distinguish
/// Word/Excel/PowerPoint. Legacy OLE containers (doc/xls/ppt) share one
/// signature and stay ambiguous, so they pass the advisory check.
fn sniff_family(path: &Path) -> Option<FileType> {
    let mut prefix = [0u8; 8];
    let mut file = fs::File::open(path).ok()?;
    let read = file.read(&mut prefix).ok()?;
    let prefix = &prefix[..read];

    if prefix.starts_with(b"%PDF-") {
        return Some(FileType::Pdf);
    }
    if prefix.starts_with(b"PK\x03\x04") {
        return sniff_ooxml_family(path);
    }
    None
}

fn sniff_ooxml_family(path: &Path) -> Option<FileType> {
    let file = fs::File::open(path).ok()?;
    let mut archive = zip::ZipArchive::new(file).ok()?;

    let mut family = None;
    for index in 0..archive.len() {
        let Ok(entry) = archive.by_index(index) else {
            continue;
        };
        let name = entry.name();
        if name.starts_with("word/") {
            family = Some(FileType::Word);
        } else if name.starts_with("xl/") {
            family = Some(FileType::Excel);
        } else if name.starts_with("ppt/") {
            family = Some(FileType::PowerPoint);
        }
        if family.is_some() {
            break;
        }
    }
    family
}
