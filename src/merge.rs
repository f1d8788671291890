//! Stub materialization: merging missing keys into persisted files.

use indexmap::IndexMap;
use indexmap::map::Entry;

use crate::codec::{
    FlatKeySet,
    KeyTree,
    unflatten,
};
use crate::error::EngineError;
use crate::store::{
    LocaleStore,
    StoreError,
};

/// Writes missing-key stubs into translation files without disturbing
/// already-translated leaves.
#[derive(Debug, Clone, Copy)]
pub struct MergeWriter<'s> {
    store: &'s dyn LocaleStore,
}

impl<'s> MergeWriter<'s> {
    /// Creates a writer over the given store.
    #[must_use]
    pub fn new(store: &'s dyn LocaleStore) -> Self {
        Self { store }
    }

    /// Merges `missing` (key path → stub value) into `(locale, file)`,
    /// creating the file if it does not exist. Existing values always win:
    /// a stub never overwrites a human translation, and a leaf/group shape
    /// mismatch leaves the existing node untouched. Idempotent.
    ///
    /// The save is guarded by the revision captured at load, so a concurrent
    /// writer surfaces as [`StoreError::Conflict`] instead of being silently
    /// overwritten.
    ///
    /// # Errors
    /// [`CodecError`](crate::codec::CodecError) variants for malformed key
    /// paths in `missing`, store errors for load/save failures.
    pub fn apply_missing(
        &self,
        locale: &str,
        file: &str,
        missing: &FlatKeySet,
    ) -> Result<(), EngineError> {
        let (existing, revision) = match self.store.load(locale, file) {
            Ok(tree) => (tree, self.store.revision(locale, file)?),
            Err(StoreError::FileNotFound { .. }) => (KeyTree::empty(), None),
            Err(e) => return Err(e.into()),
        };

        let patch = unflatten(missing)?;
        let merged = merge_trees(existing, patch);

        self.store.save(locale, file, &merged, revision.as_ref())?;
        tracing::debug!(locale, file, stubs = missing.len(), "Applied missing-key stubs");
        Ok(())
    }
}

fn merge_trees(existing: KeyTree, patch: KeyTree) -> KeyTree {
    match (existing, patch) {
        (KeyTree::Branch(mut children), KeyTree::Branch(patch_children)) => {
            merge_children(&mut children, patch_children);
            KeyTree::Branch(children)
        }
        // Shape mismatch or existing leaf: the persisted side stays as-is.
        (existing, _) => existing,
    }
}

fn merge_children(existing: &mut IndexMap<String, KeyTree>, patch: IndexMap<String, KeyTree>) {
    for (segment, patch_node) in patch {
        match existing.entry(segment) {
            Entry::Vacant(slot) => {
                slot.insert(patch_node);
            }
            Entry::Occupied(mut slot) => match (slot.get_mut(), patch_node) {
                (KeyTree::Branch(children), KeyTree::Branch(patch_children)) => {
                    merge_children(children, patch_children);
                }
                // Existing leaf or shape mismatch: the stub is dropped,
                // never replacing what a human wrote.
                _ => {
                    tracing::debug!("Keeping existing node over incoming stub");
                }
            },
        }
    }
}
