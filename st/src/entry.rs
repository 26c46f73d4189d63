//! Catalog entries and origin classification

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::Serialize;

/// Where a catalog entry comes from, derived by [`classify`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    /// Shipped with the editor, read-only
    BuiltIn,
    /// Custom file sharing its name with a built-in template
    CustomOverride,
    /// Custom file with no built-in counterpart
    AdditionalCustom,
    /// New custom template that has no file name yet
    UninitializedCustom,
}

impl Origin {
    pub fn name(&self) -> &'static str {
        match self {
            Self::BuiltIn => "built-in",
            Self::CustomOverride => "custom override",
            Self::AdditionalCustom => "additional custom",
            Self::UninitializedCustom => "uninitialized custom",
        }
    }

    /// Custom origins are listed in the custom section of a browser
    pub fn is_custom(&self) -> bool {
        !matches!(self, Self::BuiltIn)
    }

    /// Whether working content may be committed for this origin
    pub fn is_writable(&self) -> bool {
        self.is_custom()
    }
}

impl std::fmt::Display for Origin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Which source holds an entry's backing content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Backing {
    /// Read from the built-in source
    BuiltIn,
    /// Read from a file in the custom source
    Custom,
    /// Not on disk yet
    Pending,
}

/// One template in the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateEntry {
    file_name: String,
    full_path: PathBuf,
    backing: Backing,
    backing_content: String,
    working_content: String,
}

impl TemplateEntry {
    pub fn built_in(file_name: impl Into<String>, full_path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Self::from_parts(file_name.into(), full_path.into(), Backing::BuiltIn, content.into())
    }

    pub fn custom(file_name: impl Into<String>, full_path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Self::from_parts(file_name.into(), full_path.into(), Backing::Custom, content.into())
    }

    /// A new custom template that has neither a name nor a file yet
    pub fn pending(content: impl Into<String>) -> Self {
        let mut entry = Self::from_parts(String::new(), PathBuf::new(), Backing::Pending, String::new());
        entry.working_content = content.into();
        entry
    }

    fn from_parts(file_name: String, full_path: PathBuf, backing: Backing, content: String) -> Self {
        Self {
            file_name,
            full_path,
            backing,
            working_content: content.clone(),
            backing_content: content,
        }
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Source of truth for this entry; empty while pending
    pub fn full_path(&self) -> &Path {
        &self.full_path
    }

    pub fn backing(&self) -> Backing {
        self.backing
    }

    /// Content last read from disk
    pub fn backing_content(&self) -> &str {
        &self.backing_content
    }

    /// Editable copy
    pub fn working_content(&self) -> &str {
        &self.working_content
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.working_content != self.backing_content
    }

    pub fn set_working_content(&mut self, content: impl Into<String>) {
        self.working_content = content.into();
    }

    /// Reset the working copy to the backing content
    pub fn discard_edit(&mut self) {
        if self.has_unsaved_changes() {
            self.working_content.clone_from(&self.backing_content);
        }
    }

    /// Record that the working copy was written to disk
    pub(crate) fn mark_committed(&mut self) {
        self.backing_content.clone_from(&self.working_content);
    }
}

/// Derive the origin of an entry
///
/// Depends only on whether the entry is backed by a custom file, whether its
/// name is one of `built_in_names`, and whether it has a name at all. Entries
/// not on disk yet are always uninitialized custom templates.
pub fn classify(entry: &TemplateEntry, built_in_names: &BTreeSet<String>) -> Origin {
    match entry.backing {
        Backing::Custom if built_in_names.contains(&entry.file_name) => Origin::CustomOverride,
        Backing::Custom => Origin::AdditionalCustom,
        Backing::Pending => Origin::UninitializedCustom,
        Backing::BuiltIn if entry.file_name.trim().is_empty() => Origin::UninitializedCustom,
        Backing::BuiltIn => Origin::BuiltIn,
    }
}
