//! Template error types

use std::path::PathBuf;
use thiserror::Error;

use crate::entry::Origin;

/// Errors raised by the reconciler and the lifecycle operations
///
/// None of these are fatal: a failed operation leaves the previous catalog
/// authoritative and the caller decides how to surface the message.
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Template source unavailable: {path}")]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("A template named {file_name} already exists")]
    NameCollision { file_name: String },

    #[error("Template not found: {file_name}")]
    NotFound { file_name: String },

    #[error("Built-in template {file_name} is read-only, customize it first")]
    ReadOnly { file_name: String },

    #[error("Template {file_name} is {actual}, expected {expected}")]
    WrongOrigin {
        file_name: String,
        expected: Origin,
        actual: Origin,
    },

    #[error("Invalid template file name '{file_name}': {reason}")]
    InvalidFileName { file_name: String, reason: String },

    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl TemplateError {
    /// Check if the operation failed because its target is gone
    pub fn is_not_found(&self) -> bool {
        matches!(self, TemplateError::NotFound { .. })
    }

    pub(crate) fn not_found(file_name: impl Into<String>) -> Self {
        TemplateError::NotFound {
            file_name: file_name.into(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        TemplateError::Io {
            path: path.into(),
            source,
        }
    }
}
