//! Template lifecycle operations
//!
//! [`TemplateManager`] owns both sources and the current catalog. Every
//! mutating operation writes to the custom directory, rebuilds the catalog and
//! notifies observers that templates changed.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, info, warn};

use crate::catalog::{Catalog, reconcile};
use crate::entry::{Origin, TemplateEntry, classify};
use crate::error::TemplateError;
use crate::name::{NewTemplate, validate_file_name};
use crate::source::DirSource;

/// File name and content for a new custom template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateSpec {
    pub file_name: String,
    pub content: String,
}

impl TemplateSpec {
    pub fn new(file_name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            content: content.into(),
        }
    }
}

/// A custom template being composed, not yet written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTemplate {
    pub name: NewTemplate,
    pub entry: TemplateEntry,
}

impl PendingTemplate {
    pub fn origin(&self) -> Origin {
        classify(&self.entry, &Default::default())
    }

    pub fn file_name(&self) -> String {
        self.name.file_name()
    }
}

/// Notification emitted after a lifecycle operation completed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogEvent {
    Created { file_name: String },
    Customized { file_name: String },
    Restored { file_name: String },
    Deleted { file_name: String },
    Committed { file_name: String },
}

impl CatalogEvent {
    pub fn file_name(&self) -> &str {
        match self {
            Self::Created { file_name }
            | Self::Customized { file_name }
            | Self::Restored { file_name }
            | Self::Deleted { file_name }
            | Self::Committed { file_name } => file_name,
        }
    }
}

impl std::fmt::Display for CatalogEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Created { file_name } => write!(f, "Created {}", file_name),
            Self::Customized { file_name } => write!(f, "Customized {}", file_name),
            Self::Restored { file_name } => write!(f, "Restored built-in {}", file_name),
            Self::Deleted { file_name } => write!(f, "Deleted {}", file_name),
            Self::Committed { file_name } => write!(f, "Saved {}", file_name),
        }
    }
}

/// Receives "catalog changed" notifications
pub trait CatalogObserver {
    fn catalog_changed(&self, event: &CatalogEvent);
}

impl<F> CatalogObserver for F
where
    F: Fn(&CatalogEvent),
{
    fn catalog_changed(&self, event: &CatalogEvent) {
        self(event)
    }
}

/// Remembers that the editor must restart to pick up template changes
#[derive(Debug, Clone, Default)]
pub struct RestartNotice {
    pending: Arc<AtomicBool>,
}

impl RestartNotice {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::SeqCst)
    }

    /// Call once the host restarted
    pub fn clear(&self) {
        self.pending.store(false, Ordering::SeqCst);
    }

    pub fn message(&self) -> &'static str {
        crate::RESTART_MESSAGE
    }
}

impl CatalogObserver for RestartNotice {
    fn catalog_changed(&self, _event: &CatalogEvent) {
        self.pending.store(true, Ordering::SeqCst);
    }
}

/// Service object over the two template directories
pub struct TemplateManager {
    built_in: DirSource,
    custom: DirSource,
    catalog: Catalog,
    pending: Option<PendingTemplate>,
    observers: Vec<Box<dyn CatalogObserver>>,
}

impl TemplateManager {
    /// Open both sources and build the initial catalog
    pub fn open(built_in: DirSource, custom: DirSource) -> Result<Self, TemplateError> {
        let catalog = reconcile(&built_in, &custom)?;
        debug!(built_in = ?built_in.dir(), custom = ?custom.dir(), entries = catalog.len(), "Opened template manager");
        Ok(Self {
            built_in,
            custom,
            catalog,
            pending: None,
            observers: Vec::new(),
        })
    }

    pub fn add_observer(&mut self, observer: impl CatalogObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn built_in_source(&self) -> &DirSource {
        &self.built_in
    }

    pub fn custom_source(&self) -> &DirSource {
        &self.custom
    }

    /// Rebuild the catalog from disk, keeping edits whose files did not change
    pub fn reconcile(&mut self) -> Result<&Catalog, TemplateError> {
        let mut catalog = reconcile(&self.built_in, &self.custom)?;
        catalog.retain_edits_from(&self.catalog);
        self.catalog = catalog;
        Ok(&self.catalog)
    }

    /// Write a new custom template
    ///
    /// When a file of that name exists, `confirm_overwrite` decides; declining
    /// fails with [`TemplateError::NameCollision`] and writes nothing.
    pub fn create_custom<F>(&mut self, spec: &TemplateSpec, confirm_overwrite: F) -> Result<(), TemplateError>
    where
        F: FnOnce(&Path) -> bool,
    {
        validate_file_name(&spec.file_name)?;

        let path = self.custom.path_for(&spec.file_name);
        if path.exists() && !confirm_overwrite(&path) {
            return Err(TemplateError::NameCollision {
                file_name: spec.file_name.clone(),
            });
        }

        self.ensure_custom_dir()?;
        write_atomic(&path, &spec.content)?;
        info!(?path, "Created custom template");

        self.finish(CatalogEvent::Created {
            file_name: spec.file_name.clone(),
        })
    }

    /// Copy a built-in template into the custom directory
    pub fn customize_built_in(&mut self, file_name: &str) -> Result<(), TemplateError> {
        let entry = self.require(file_name, Origin::BuiltIn)?.clone();

        let path = self.custom.path_for(file_name);
        self.ensure_custom_dir()?;
        write_atomic(&path, entry.backing_content())?;
        info!(?path, "Customized built-in template");

        self.finish(CatalogEvent::Customized {
            file_name: file_name.to_string(),
        })?;

        // Edits made while the entry was read-only move to the new override.
        if entry.has_unsaved_changes()
            && let Some(promoted) = self.catalog.get_mut(file_name)
        {
            promoted.set_working_content(entry.working_content());
        }
        Ok(())
    }

    /// Delete a custom override so the built-in template applies again
    pub fn restore_built_in(&mut self, file_name: &str) -> Result<(), TemplateError> {
        let path = self.require(file_name, Origin::CustomOverride)?.full_path().to_path_buf();
        remove_template(file_name, &path)?;
        info!(?path, "Restored built-in template");

        self.finish(CatalogEvent::Restored {
            file_name: file_name.to_string(),
        })
    }

    /// Delete an additional custom template
    pub fn delete_custom(&mut self, file_name: &str) -> Result<(), TemplateError> {
        let path = self.require(file_name, Origin::AdditionalCustom)?.full_path().to_path_buf();
        remove_template(file_name, &path)?;
        info!(?path, "Deleted custom template");

        self.finish(CatalogEvent::Deleted {
            file_name: file_name.to_string(),
        })
    }

    /// Replace the working copy of an entry
    pub fn edit(&mut self, file_name: &str, content: impl Into<String>) -> Result<(), TemplateError> {
        let entry = self
            .catalog
            .get_mut(file_name)
            .ok_or_else(|| TemplateError::not_found(file_name))?;
        entry.set_working_content(content);
        Ok(())
    }

    /// Write the working copy of a custom entry to its file
    ///
    /// Built-in entries are never written; customize them first.
    pub fn commit_edit(&mut self, file_name: &str) -> Result<(), TemplateError> {
        let (entry, origin) = self.lookup(file_name)?;
        if !origin.is_writable() {
            return Err(TemplateError::ReadOnly {
                file_name: file_name.to_string(),
            });
        }
        if !entry.has_unsaved_changes() {
            debug!(file_name, "No changes to commit");
            return Ok(());
        }

        let path = self.custom.path_for(file_name);
        let content = entry.working_content().to_string();
        self.ensure_custom_dir()?;
        write_atomic(&path, &content)?;
        info!(?path, "Committed template edit");

        if let Some(entry) = self.catalog.get_mut(file_name) {
            entry.mark_committed();
        }

        self.finish(CatalogEvent::Committed {
            file_name: file_name.to_string(),
        })
    }

    /// Drop the working copy of an entry
    pub fn discard_edit(&mut self, file_name: &str) -> Result<(), TemplateError> {
        let entry = self
            .catalog
            .get_mut(file_name)
            .ok_or_else(|| TemplateError::not_found(file_name))?;
        entry.discard_edit();
        Ok(())
    }

    /// Start composing a new custom template, replacing any previous draft
    pub fn begin_new(&mut self, name: NewTemplate) -> &mut PendingTemplate {
        self.pending.insert(PendingTemplate {
            name,
            entry: TemplateEntry::pending(String::new()),
        })
    }

    pub fn pending(&self) -> Option<&PendingTemplate> {
        self.pending.as_ref()
    }

    pub fn pending_mut(&mut self) -> Option<&mut PendingTemplate> {
        self.pending.as_mut()
    }

    pub fn cancel_new(&mut self) {
        self.pending = None;
    }

    /// Write the draft under its composed file name and return that name
    ///
    /// The draft is kept when the write fails.
    pub fn commit_new<F>(&mut self, confirm_overwrite: F) -> Result<String, TemplateError>
    where
        F: FnOnce(&Path) -> bool,
    {
        let spec = {
            let pending = self
                .pending
                .as_ref()
                .ok_or_else(|| TemplateError::not_found("<new template>"))?;
            TemplateSpec::new(pending.file_name(), pending.entry.working_content())
        };

        self.create_custom(&spec, confirm_overwrite)?;
        self.pending = None;
        Ok(spec.file_name)
    }

    fn lookup(&self, file_name: &str) -> Result<(&TemplateEntry, Origin), TemplateError> {
        let entry = self
            .catalog
            .get(file_name)
            .ok_or_else(|| TemplateError::not_found(file_name))?;
        Ok((entry, self.catalog.origin(entry)))
    }

    fn require(&self, file_name: &str, expected: Origin) -> Result<&TemplateEntry, TemplateError> {
        let (entry, actual) = self.lookup(file_name)?;
        if actual != expected {
            return Err(TemplateError::WrongOrigin {
                file_name: file_name.to_string(),
                expected,
                actual,
            });
        }
        Ok(entry)
    }

    fn ensure_custom_dir(&self) -> Result<(), TemplateError> {
        let dir = self.custom.dir();
        fs::create_dir_all(dir).map_err(|e| TemplateError::io(dir, e))
    }

    /// Notify observers of a completed change, then rebuild the catalog
    ///
    /// The disk is already changed at this point, so a failing rebuild does
    /// not fail the operation; the previous catalog stays until the next
    /// successful reconcile.
    fn finish(&mut self, event: CatalogEvent) -> Result<(), TemplateError> {
        info!(%event, "Template catalog changed");
        for observer in &self.observers {
            observer.catalog_changed(&event);
        }

        if let Err(e) = self.reconcile() {
            warn!(error = %e, "Catalog is stale after template change");
        }
        Ok(())
    }
}

/// Replace `path` with `content` without leaving a partial file behind
///
/// An existing target keeps its permissions; a new file gets the same mode a
/// plain write would give it.
fn write_atomic(path: &Path, content: &str) -> Result<(), TemplateError> {
    let dir = path.parent().map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from("."));

    let mut builder = tempfile::Builder::new();
    builder.prefix(".st-");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(fs::Permissions::from_mode(0o666));
    }
    let mut file = builder.tempfile_in(&dir).map_err(|e| TemplateError::io(&dir, e))?;

    if let Ok(existing) = fs::metadata(path) {
        file.as_file()
            .set_permissions(existing.permissions())
            .map_err(|e| TemplateError::io(file.path(), e))?;
    }

    file.write_all(content.as_bytes())
        .map_err(|e| TemplateError::io(file.path(), e))?;
    file.persist(path).map_err(|e| TemplateError::io(path, e.error))?;
    Ok(())
}

fn remove_template(file_name: &str, path: &Path) -> Result<(), TemplateError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(TemplateError::not_found(file_name)),
        Err(e) => Err(TemplateError::io(path, e)),
    }
}
