//! ScriptTemplates - built-in and project-local script template management
//!
//! Editors create new scripts from plain-text templates. A set of templates
//! ships with the editor (read-only), and a project may carry its own
//! templates that either override a built-in one of the same file name or add
//! new entries to the "create script" menu.
//!
//! This crate merges both sources into one catalog, classifies every entry and
//! tracks an editable working copy per entry.
//!
//! # Layout on disk
//!
//! ```text
//! <editor>/Data/Resources/ScriptTemplates/     # built-in, read-only
//! └── 81-C# Script-NewBehaviourScript.cs.txt
//!
//! <project>/Assets/ScriptTemplates/            # custom, read-write
//! ├── 81-C# Script-NewBehaviourScript.cs.txt   # overrides the built-in one
//! └── 99-Tools__MyTemplate.cs.txt              # additional entry
//! ```
//!
//! # Example
//!
//! ```ignore
//! use script_templates::{DirSource, TemplateManager};
//!
//! let mut manager = TemplateManager::open(
//!     DirSource::new("/opt/editor/Data/Resources/ScriptTemplates"),
//!     DirSource::new("Assets/ScriptTemplates"),
//! )?;
//! manager.customize_built_in("81-C# Script-NewBehaviourScript.cs.txt")?;
//! manager.edit("81-C# Script-NewBehaviourScript.cs.txt", "// header\n")?;
//! manager.commit_edit("81-C# Script-NewBehaviourScript.cs.txt")?;
//! ```
//!
//! # Modules
//!
//! - [`source`] - template sources (directories, in-memory)
//! - [`entry`] - catalog entries and origin classification
//! - [`name`] - template file name composition and validation
//! - [`catalog`] - the reconciler and the merged catalog
//! - [`manager`] - lifecycle operations and change notification
//! - [`config`] - configuration loading
//! - [`cli`] - command-line interface

pub mod catalog;
pub mod cli;
pub mod config;
pub mod entry;
pub mod error;
pub mod manager;
pub mod name;
pub mod source;

pub use catalog::{Catalog, reconcile};
pub use config::Config;
pub use entry::{Backing, Origin, TemplateEntry, classify};
pub use error::TemplateError;
pub use manager::{CatalogEvent, CatalogObserver, PendingTemplate, RestartNotice, TemplateManager, TemplateSpec};
pub use name::{NewTemplate, TemplateName, validate_file_name};
pub use source::{DirSource, MemorySource, SourceFile, TemplateSource};

/// Glob pattern matching template files inside a source directory
pub const TEMPLATE_FILE_PATTERN: &str = "*.txt";

/// Extension every template file name must end with
pub const TEMPLATE_FILE_EXTENSION: &str = ".txt";

/// Custom template directory, relative to the project root
pub const DEFAULT_CUSTOM_DIR: &str = "Assets/ScriptTemplates";

/// Message shown whenever templates changed and the editor must be restarted
pub const RESTART_MESSAGE: &str = "Changes to script templates require the editor to restart in order to take effect.";
