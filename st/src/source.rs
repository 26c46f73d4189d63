//! Template sources
//!
//! A source is a directory plus a file pattern that can be enumerated to
//! `(file name, full path, content)` triples. Sources are read-only from the
//! reconciler's point of view; only [`crate::TemplateManager`] writes.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::TemplateError;

/// One template file found in a source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Base name with extension, the catalog key
    pub file_name: String,
    /// Location the content was read from
    pub full_path: PathBuf,
    /// File content at enumeration time
    pub content: String,
}

/// Something that can list template files
pub trait TemplateSource {
    /// Directory this source reads from
    fn location(&self) -> &Path;

    /// Enumerate all template files currently present
    ///
    /// Fails with [`TemplateError::SourceUnavailable`] when the source cannot
    /// be read. Must not create anything as a side effect.
    fn enumerate(&self) -> Result<Vec<SourceFile>, TemplateError>;
}

/// Templates stored as files in a directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirSource {
    dir: PathBuf,
    pattern: String,
}

impl DirSource {
    /// Source over `dir` using the default `*.txt` pattern
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self::with_pattern(dir, crate::TEMPLATE_FILE_PATTERN)
    }

    /// Source over `dir` using a custom glob pattern for file names
    pub fn with_pattern(dir: impl Into<PathBuf>, pattern: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            pattern: pattern.into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Full path a template with the given file name would have in this source
    pub fn path_for(&self, file_name: &str) -> PathBuf {
        self.dir.join(file_name)
    }

    /// Whether the backing directory exists
    pub fn exists(&self) -> bool {
        self.dir.is_dir()
    }

    fn unavailable(&self, path: &Path, source: std::io::Error) -> TemplateError {
        TemplateError::SourceUnavailable {
            path: path.to_path_buf(),
            source,
        }
    }
}

impl TemplateSource for DirSource {
    fn location(&self) -> &Path {
        &self.dir
    }

    fn enumerate(&self) -> Result<Vec<SourceFile>, TemplateError> {
        // Match on names only; directory paths may contain glob metacharacters.
        let pattern = glob::Pattern::new(&self.pattern).map_err(|e| {
            self.unavailable(
                &self.dir,
                std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()),
            )
        })?;

        let read_dir = fs::read_dir(&self.dir).map_err(|e| self.unavailable(&self.dir, e))?;

        let mut files = Vec::new();
        for entry in read_dir {
            let entry = entry.map_err(|e| self.unavailable(&self.dir, e))?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }

            let Some(file_name) = entry.file_name().to_str().map(str::to_string) else {
                warn!(?path, "Skipping template with non UTF-8 file name");
                continue;
            };

            if !pattern.matches(&file_name) {
                continue;
            }

            let content = fs::read_to_string(&path).map_err(|e| self.unavailable(&path, e))?;
            files.push(SourceFile {
                file_name,
                full_path: path,
                content,
            });
        }

        files.sort_by(|a, b| a.file_name.cmp(&b.file_name));
        debug!(dir = ?self.dir, count = files.len(), "Enumerated template source");
        Ok(files)
    }
}

/// Templates held in memory, listed in insertion order
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    location: PathBuf,
    files: Vec<(String, String)>,
    unavailable: bool,
}

impl MemorySource {
    pub fn new(location: impl Into<PathBuf>) -> Self {
        Self {
            location: location.into(),
            ..Default::default()
        }
    }

    /// A source that fails every enumeration
    pub fn unavailable(location: impl Into<PathBuf>) -> Self {
        Self {
            location: location.into(),
            files: Vec::new(),
            unavailable: true,
        }
    }

    pub fn with_file(mut self, file_name: impl Into<String>, content: impl Into<String>) -> Self {
        self.insert(file_name, content);
        self
    }

    pub fn insert(&mut self, file_name: impl Into<String>, content: impl Into<String>) {
        self.files.push((file_name.into(), content.into()));
    }

    pub fn remove(&mut self, file_name: &str) {
        self.files.retain(|(name, _)| name != file_name);
    }
}

impl TemplateSource for MemorySource {
    fn location(&self) -> &Path {
        &self.location
    }

    fn enumerate(&self) -> Result<Vec<SourceFile>, TemplateError> {
        if self.unavailable {
            return Err(TemplateError::SourceUnavailable {
                path: self.location.clone(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "source marked unavailable"),
            });
        }

        Ok(self
            .files
            .iter()
            .map(|(name, content)| SourceFile {
                file_name: name.clone(),
                full_path: self.location.join(name),
                content: content.clone(),
            })
            .collect())
    }
}
