//! Template reconciler
//!
//! Merges the built-in and the custom source into one ordered catalog keyed
//! by file name. The catalog is always rebuilt from scratch; it is never
//! patched in place after a file-system change.

use std::collections::{BTreeSet, HashSet};

use tracing::{debug, warn};

use crate::entry::{Origin, TemplateEntry, classify};
use crate::error::TemplateError;
use crate::source::TemplateSource;

/// Merged, deduplicated, ordered set of templates
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    entries: Vec<TemplateEntry>,
    built_in_names: BTreeSet<String>,
}

/// Build the catalog from the current state of both sources
///
/// Custom entries come first, followed by built-in entries whose name is not
/// overridden, each group in source enumeration order. Reads only.
pub fn reconcile<B, C>(built_in: &B, custom: &C) -> Result<Catalog, TemplateError>
where
    B: TemplateSource + ?Sized,
    C: TemplateSource + ?Sized,
{
    let custom_files = custom.enumerate()?;
    let built_in_files = built_in.enumerate()?;

    let built_in_names: BTreeSet<String> = built_in_files.iter().map(|f| f.file_name.clone()).collect();

    let mut seen = HashSet::new();
    let mut entries = Vec::with_capacity(custom_files.len() + built_in_files.len());

    for file in custom_files {
        if !seen.insert(file.file_name.clone()) {
            warn!(file_name = %file.file_name, "Duplicate custom template, keeping first");
            continue;
        }
        entries.push(TemplateEntry::custom(file.file_name, file.full_path, file.content));
    }

    let custom_count = entries.len();

    for file in built_in_files {
        if !seen.insert(file.file_name.clone()) {
            continue;
        }
        entries.push(TemplateEntry::built_in(file.file_name, file.full_path, file.content));
    }

    debug!(
        custom = custom_count,
        built_in = entries.len() - custom_count,
        "Reconciled template catalog"
    );

    Ok(Catalog {
        entries,
        built_in_names,
    })
}

impl Catalog {
    pub fn entries(&self) -> &[TemplateEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, file_name: &str) -> Option<&TemplateEntry> {
        self.entries.iter().find(|e| e.file_name() == file_name)
    }

    pub fn get_mut(&mut self, file_name: &str) -> Option<&mut TemplateEntry> {
        self.entries.iter_mut().find(|e| e.file_name() == file_name)
    }

    /// Index of an entry in display order
    pub fn position(&self, file_name: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.file_name() == file_name)
    }

    /// Names found in the built-in source, overridden or not
    pub fn built_in_names(&self) -> &BTreeSet<String> {
        &self.built_in_names
    }

    pub fn origin(&self, entry: &TemplateEntry) -> Origin {
        classify(entry, &self.built_in_names)
    }

    pub fn origin_of(&self, file_name: &str) -> Option<Origin> {
        self.get(file_name).map(|e| self.origin(e))
    }

    /// Entries shown in the built-in section
    pub fn built_in_entries(&self) -> impl Iterator<Item = &TemplateEntry> {
        self.entries.iter().filter(|e| !self.origin(e).is_custom())
    }

    /// Entries shown in the custom section
    pub fn custom_entries(&self) -> impl Iterator<Item = &TemplateEntry> {
        self.entries.iter().filter(|e| self.origin(e).is_custom())
    }

    /// Whether any entry holds an uncommitted edit
    pub fn has_unsaved_changes(&self) -> bool {
        self.entries.iter().any(TemplateEntry::has_unsaved_changes)
    }

    /// Keep uncommitted edits from a previous catalog
    ///
    /// An edit carries over only when the entry still reads the same backing
    /// content from the same path; otherwise the file changed underneath it.
    pub(crate) fn retain_edits_from(&mut self, previous: &Catalog) {
        for entry in &mut self.entries {
            let Some(old) = previous.get(entry.file_name()) else {
                continue;
            };
            if old.has_unsaved_changes()
                && old.full_path() == entry.full_path()
                && old.backing_content() == entry.backing_content()
            {
                entry.set_working_content(old.working_content());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemorySource;
    use proptest::prelude::*;
    use std::path::Path;

    const BEHAVIOUR: &str = "81-C# Script-NewBehaviourScript.cs.txt";

    fn names(catalog: &Catalog) -> Vec<&str> {
        catalog.entries().iter().map(|e| e.file_name()).collect()
    }

    #[test]
    fn test_built_in_only() {
        let built_in = MemorySource::new("/b").with_file(BEHAVIOUR, "built-in body");
        let custom = MemorySource::new("/c");

        let catalog = reconcile(&built_in, &custom).unwrap();

        assert_eq!(catalog.len(), 1);
        let entry = catalog.get(BEHAVIOUR).unwrap();
        assert_eq!(catalog.origin(entry), Origin::BuiltIn);
        assert!(!entry.has_unsaved_changes());
    }

    #[test]
    fn test_custom_supersedes_built_in() {
        let built_in = MemorySource::new("/b").with_file(BEHAVIOUR, "built-in body");
        let custom = MemorySource::new("/c").with_file(BEHAVIOUR, "custom body");

        let catalog = reconcile(&built_in, &custom).unwrap();

        assert_eq!(catalog.len(), 1);
        let entry = catalog.get(BEHAVIOUR).unwrap();
        assert_eq!(catalog.origin(entry), Origin::CustomOverride);
        assert_eq!(entry.backing_content(), "custom body");
        assert_eq!(entry.full_path(), Path::new("/c").join(BEHAVIOUR));
    }

    #[test]
    fn test_order_custom_first_then_built_in() {
        let built_in = MemorySource::new("/b")
            .with_file("b2.txt", "")
            .with_file("shared.txt", "")
            .with_file("b1.txt", "");
        let custom = MemorySource::new("/c")
            .with_file("extra.txt", "")
            .with_file("shared.txt", "");

        let catalog = reconcile(&built_in, &custom).unwrap();

        assert_eq!(names(&catalog), vec!["extra.txt", "shared.txt", "b2.txt", "b1.txt"]);
        assert_eq!(catalog.origin_of("extra.txt"), Some(Origin::AdditionalCustom));
        assert_eq!(catalog.origin_of("shared.txt"), Some(Origin::CustomOverride));
        assert_eq!(catalog.position("b2.txt"), Some(2));
    }

    #[test]
    fn test_sections_partition_catalog() {
        let built_in = MemorySource::new("/b").with_file("a.txt", "").with_file("b.txt", "");
        let custom = MemorySource::new("/c").with_file("a.txt", "").with_file("c.txt", "");

        let catalog = reconcile(&built_in, &custom).unwrap();

        let built: Vec<_> = catalog.built_in_entries().map(|e| e.file_name()).collect();
        let custom: Vec<_> = catalog.custom_entries().map(|e| e.file_name()).collect();
        assert_eq!(built, vec!["b.txt"]);
        assert_eq!(custom, vec!["a.txt", "c.txt"]);
        assert!(catalog.built_in_names().contains("a.txt"));
    }

    #[test]
    fn test_unavailable_source() {
        let ok = MemorySource::new("/b");
        let missing = MemorySource::unavailable("/c");

        assert!(matches!(
            reconcile(&ok, &missing),
            Err(TemplateError::SourceUnavailable { .. })
        ));
        assert!(matches!(
            reconcile(&missing, &ok),
            Err(TemplateError::SourceUnavailable { .. })
        ));
    }

    #[test]
    fn test_duplicate_names_within_source_keep_first() {
        let built_in = MemorySource::new("/b");
        let custom = MemorySource::new("/c").with_file("a.txt", "first").with_file("a.txt", "second");

        let catalog = reconcile(&built_in, &custom).unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.get("a.txt").unwrap().backing_content(), "first");
    }

    #[test]
    fn test_stale_catalog_until_reconciled() {
        let built_in = MemorySource::new("/b").with_file("a.txt", "");
        let mut custom = MemorySource::new("/c");

        let before = reconcile(&built_in, &custom).unwrap();
        custom.insert("late.txt", "added externally");

        assert!(before.get("late.txt").is_none());
        let after = reconcile(&built_in, &custom).unwrap();
        assert_eq!(after.origin_of("late.txt"), Some(Origin::AdditionalCustom));
    }

    #[test]
    fn test_retain_edits_only_when_backing_unchanged() {
        let built_in = MemorySource::new("/b");
        let mut custom = MemorySource::new("/c").with_file("a.txt", "a").with_file("b.txt", "b");

        let mut previous = reconcile(&built_in, &custom).unwrap();
        previous.get_mut("a.txt").unwrap().set_working_content("a edited");
        previous.get_mut("b.txt").unwrap().set_working_content("b edited");

        custom.remove("b.txt");
        custom.insert("b.txt", "b changed on disk");

        let mut next = reconcile(&built_in, &custom).unwrap();
        next.retain_edits_from(&previous);

        assert_eq!(next.get("a.txt").unwrap().working_content(), "a edited");
        assert_eq!(next.get("b.txt").unwrap().working_content(), "b changed on disk");
        assert!(next.has_unsaved_changes());
    }

    proptest! {
        #[test]
        fn prop_file_names_unique(
            built in proptest::collection::vec("[a-e]\\.txt", 0..8),
            custom in proptest::collection::vec("[c-h]\\.txt", 0..8),
        ) {
            let mut built_in_source = MemorySource::new("/b");
            for name in &built {
                built_in_source.insert(name.clone(), "b");
            }
            let mut custom_source = MemorySource::new("/c");
            for name in &custom {
                custom_source.insert(name.clone(), "c");
            }

            let catalog = reconcile(&built_in_source, &custom_source).unwrap();

            let unique: BTreeSet<_> = catalog.entries().iter().map(|e| e.file_name().to_string()).collect();
            prop_assert_eq!(unique.len(), catalog.len());

            let expected: BTreeSet<_> = built.iter().chain(custom.iter()).cloned().collect();
            prop_assert_eq!(unique, expected);

            for entry in catalog.entries() {
                if custom.contains(&entry.file_name().to_string()) {
                    prop_assert_eq!(entry.backing_content(), "c");
                }
            }
        }
    }
}
