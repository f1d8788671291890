//! In-memory locale store for tests and embedded callers.

use std::sync::RwLock;

use indexmap::IndexMap;

use crate::codec::KeyTree;
use crate::store::{
    LocaleStore,
    Revision,
    StoreError,
    parse_tree,
    serialize_tree,
};

/// [`LocaleStore`] holding serialized documents in memory. Files go through
/// the same serialize/parse cycle as the directory store, so parse failures
/// and revision checks behave identically.
#[derive(Debug, Default)]
pub struct MemoryLocaleStore {
    locales: RwLock<IndexMap<String, IndexMap<String, String>>>,
}

impl MemoryLocaleStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a file from raw document text, bypassing serialization. Lets
    /// tests plant malformed content.
    pub fn put_raw(&self, locale: &str, file: &str, content: &str) {
        let mut locales = self.locales.write().unwrap_or_else(std::sync::PoisonError::into_inner);
        locales
            .entry(locale.to_string())
            .or_default()
            .insert(file.to_string(), content.to_string());
    }
}

impl LocaleStore for MemoryLocaleStore {
    fn list_locales(&self) -> Result<Vec<String>, StoreError> {
        let locales = self.locales.read().unwrap_or_else(std::sync::PoisonError::into_inner);
        Ok(locales.keys().cloned().collect())
    }

    fn list_files(&self, locale: &str) -> Result<Vec<String>, StoreError> {
        let locales = self.locales.read().unwrap_or_else(std::sync::PoisonError::into_inner);
        let files = locales
            .get(locale)
            .ok_or_else(|| StoreError::LocaleNotFound(locale.to_string()))?;
        Ok(files.keys().cloned().collect())
    }

    fn load(&self, locale: &str, file: &str) -> Result<KeyTree, StoreError> {
        let locales = self.locales.read().unwrap_or_else(std::sync::PoisonError::into_inner);
        let content = locales.get(locale).and_then(|files| files.get(file)).ok_or_else(|| {
            StoreError::FileNotFound { locale: locale.to_string(), file: file.to_string() }
        })?;
        parse_tree(locale, file, content)
    }

    fn revision(&self, locale: &str, file: &str) -> Result<Option<Revision>, StoreError> {
        let locales = self.locales.read().unwrap_or_else(std::sync::PoisonError::into_inner);
        Ok(locales
            .get(locale)
            .and_then(|files| files.get(file))
            .map(|content| Revision::of(content.as_bytes())))
    }

    fn save(
        &self,
        locale: &str,
        file: &str,
        tree: &KeyTree,
        expected: Option<&Revision>,
    ) -> Result<(), StoreError> {
        let content = serialize_tree(locale, file, tree)?;
        let mut locales = self.locales.write().unwrap_or_else(std::sync::PoisonError::into_inner);

        if let Some(expected) = expected {
            let current = locales
                .get(locale)
                .and_then(|files| files.get(file))
                .map(|content| Revision::of(content.as_bytes()));
            if current != Some(*expected) {
                return Err(StoreError::Conflict {
                    locale: locale.to_string(),
                    file: file.to_string(),
                });
            }
        }

        locales.entry(locale.to_string()).or_default().insert(file.to_string(), content);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use googletest::prelude::*;

    use super::*;

    fn tree(json: &str) -> KeyTree {
        serde_json::from_str(json).unwrap()
    }

    #[googletest::test]
    fn list_locales_in_insertion_order() {
        let store = MemoryLocaleStore::new();
        store.save("fr", "auth", &tree(r#"{"a": "x"}"#), None).unwrap();
        store.save("en", "auth", &tree(r#"{"a": "y"}"#), None).unwrap();

        expect_that!(store.list_locales().unwrap(), elements_are![eq("fr"), eq("en")]);
    }

    #[googletest::test]
    fn load_surfaces_planted_malformed_content() {
        let store = MemoryLocaleStore::new();
        store.put_raw("en", "broken", "{oops");

        let result = store.load("en", "broken");

        expect_that!(result, err(pat!(StoreError::Parse { file: eq("broken"), .. })));
    }

    #[googletest::test]
    fn guarded_save_against_stale_revision() {
        let store = MemoryLocaleStore::new();
        store.save("en", "auth", &tree(r#"{"a": "x"}"#), None).unwrap();
        let stale = store.revision("en", "auth").unwrap().unwrap();
        store.save("en", "auth", &tree(r#"{"a": "y"}"#), None).unwrap();

        let result = store.save("en", "auth", &tree(r#"{"a": "z"}"#), Some(&stale));

        expect_that!(result, err(pat!(StoreError::Conflict { .. })));
    }

    #[googletest::test]
    fn load_round_trips_saved_tree() {
        let store = MemoryLocaleStore::new();
        store.save("en", "auth", &tree(r#"{"a": "x"}"#), None).unwrap();
        let loaded = store.load("en", "auth").unwrap();

        expect_that!(loaded, eq(&tree(r#"{"a": "x"}"#)));
    }
}
