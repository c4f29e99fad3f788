use crate::error::PipelineError;
use crate::model::NormalizedDocument;
use crate::render::{OutputFormat, render};
use chrono::{DateTime, Local, SecondsFormat, Utc};
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// Persists rendered documents into one output directory.
///
/// Generated names are `<base>_<YYYYMMDD_HHMMSS>.<ext>`; a collision within
/// the same second for the same base name is an accepted limitation, not
/// guarded against. Listing and deletion operate directly on the directory
/// with no locking.
#[derive(Debug, Clone)]
pub struct OutputStore {
    dir: PathBuf,
}

/// One saved output file, as returned by `list`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputEntry {
    pub filename: String,
    pub path: PathBuf,
    pub size_bytes: u64,
    pub modified: String,
    pub format: String,
}

impl OutputStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Render and persist a document. With no explicit name, the filename is
    /// generated from the document's base name plus a second-resolution
    /// timestamp.
    pub fn save_document(
        &self,
        document: &NormalizedDocument,
        format: OutputFormat,
        filename: Option<&str>,
    ) -> Result<PathBuf, PipelineError> {
        self.save_value(&document.to_value(), format, filename)
    }

    /// Render and persist a dict-shaped document.
    pub fn save_value(
        &self,
        data: &Value,
        format: OutputFormat,
        filename: Option<&str>,
    ) -> Result<PathBuf, PipelineError> {
        let rendered = render(data, format)?;

        let stem = match filename {
            Some(name) => name.to_owned(),
            None => {
                let base = data
                    .get("filename")
                    .and_then(Value::as_str)
                    .unwrap_or("output");
                let base = Path::new(base)
                    .file_stem()
                    .and_then(|stem| stem.to_str())
                    .unwrap_or("output");
                let timestamp = Local::now().format("%Y%m%d_%H%M%S");
                format!("{base}_{timestamp}")
            }
        };

        fs::create_dir_all(&self.dir).map_err(|error| {
            PipelineError::io(format!(
                "failed to create output directory '{}': {error}",
                self.dir.display()
            ))
        })?;

        let path = self.dir.join(format!("{stem}.{}", format.extension()));
        fs::write(&path, rendered).map_err(|error| {
            PipelineError::io(format!("failed to write output '{}': {error}", path.display()))
        })?;

        log::info!("saved output to: {}", path.display());
        Ok(path)
    }

    /// All output files, sorted by modification time descending.
    pub fn list(&self) -> Result<Vec<OutputEntry>, PipelineError> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let entries = fs::read_dir(&self.dir).map_err(|error| {
            PipelineError::io(format!(
                "failed to list output directory '{}': {error}",
                self.dir.display()
            ))
        })?;

        let mut outputs = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let Ok(metadata) = entry.metadata() else {
                continue;
            };
            let modified = metadata
                .modified()
                .map(|time| {
                    DateTime::<Utc>::from(time).to_rfc3339_opts(SecondsFormat::Micros, true)
                })
                .unwrap_or_default();

            outputs.push(OutputEntry {
                filename: entry.file_name().to_string_lossy().to_string(),
                size_bytes: metadata.len(),
                modified,
                format: path
                    .extension()
                    .and_then(|extension| extension.to_str())
                    .unwrap_or("")
                    .to_owned(),
                path,
            });
        }

        outputs.sort_by(|a, b| b.modified.cmp(&a.modified));
        Ok(outputs)
    }

    /// Delete one output file. Returns whether a file was removed.
    pub fn delete(&self, filename: &str) -> bool {
        let path = self.dir.join(filename);
        if path.is_file() && fs::remove_file(&path).is_ok() {
            log::info!("deleted output: {filename}");
            true
        } else {
            false
        }
    }

    /// Delete every output file. Returns the number removed.
    pub fn clear(&self) -> usize {
        let Ok(entries) = fs::read_dir(&self.dir) else {
            return 0;
        };
        let mut count = 0;
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_file() && fs::remove_file(&path).is_ok() {
                count += 1;
            }
        }
        log::info!("cleared {count} output files");
        count
    }

    /// Path to a saved output, if it exists.
    pub fn get(&self, filename: &str) -> Option<PathBuf> {
        let path = self.dir.join(filename);
        path.exists().then_some(path)
    }
}
