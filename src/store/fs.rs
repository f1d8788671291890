//! Directory-tree backed locale store.
//!
//! Layout mirrors the conventional `lang/` resource tree: one subdirectory
//! per locale, one `<name>.json` per translation file.
//!
//! ```text
//! lang/
//!   en/
//!     auth.json
//!     validation.json
//!   fr/
//!     auth.json
//! ```

use std::io::Write;
use std::path::{
    Path,
    PathBuf,
};

use crate::codec::KeyTree;
use crate::store::{
    LocaleStore,
    Revision,
    StoreError,
    parse_tree,
    serialize_tree,
};

const FILE_EXTENSION: &str = "json";

/// [`LocaleStore`] over a `lang/`-style directory tree.
#[derive(Debug, Clone)]
pub struct DirLocaleStore {
    root: PathBuf,
}

impl DirLocaleStore {
    /// Creates a store rooted at the given directory.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The directory this store reads from and writes to.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn locale_dir(&self, locale: &str) -> PathBuf {
        self.root.join(locale)
    }

    fn file_path(&self, locale: &str, file: &str) -> PathBuf {
        self.locale_dir(locale).join(format!("{file}.{FILE_EXTENSION}"))
    }
}

impl LocaleStore for DirLocaleStore {
    fn list_locales(&self) -> Result<Vec<String>, StoreError> {
        let mut locales = Vec::new();
        for entry in std::fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().to_string();
            if name.starts_with('.') {
                continue;
            }
            locales.push(name);
        }
        // read_dir order is platform-dependent; sort for restartability
        locales.sort();
        Ok(locales)
    }

    fn list_files(&self, locale: &str) -> Result<Vec<String>, StoreError> {
        let dir = self.locale_dir(locale);
        if !dir.is_dir() {
            return Err(StoreError::LocaleNotFound(locale.to_string()));
        }

        let mut files = Vec::new();
        for entry in std::fs::read_dir(&dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(FILE_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                files.push(stem.to_string());
            }
        }
        files.sort();
        Ok(files)
    }

    fn load(&self, locale: &str, file: &str) -> Result<KeyTree, StoreError> {
        let path = self.file_path(locale, file);
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::FileNotFound {
                    locale: locale.to_string(),
                    file: file.to_string(),
                });
            }
            Err(e) => return Err(StoreError::Io(e)),
        };
        parse_tree(locale, file, &content)
    }

    fn revision(&self, locale: &str, file: &str) -> Result<Option<Revision>, StoreError> {
        match std::fs::read(self.file_path(locale, file)) {
            Ok(bytes) => Ok(Some(Revision::of(&bytes))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::Io(e)),
        }
    }

    fn save(
        &self,
        locale: &str,
        file: &str,
        tree: &KeyTree,
        expected: Option<&Revision>,
    ) -> Result<(), StoreError> {
        if let Some(expected) = expected
            && self.revision(locale, file)? != Some(*expected)
        {
            return Err(StoreError::Conflict {
                locale: locale.to_string(),
                file: file.to_string(),
            });
        }

        let dir = self.locale_dir(locale);
        std::fs::create_dir_all(&dir)?;

        let content = serialize_tree(locale, file, tree)?;
        // Write-then-rename so a failed write never leaves a torn file.
        let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
        tmp.write_all(content.as_bytes())?;
        tmp.persist(self.file_path(locale, file)).map_err(|e| StoreError::Io(e.error))?;

        tracing::debug!(locale, file, "Saved translation file");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use googletest::prelude::*;

    use super::*;
    use crate::codec::flatten;

    fn tree(json: &str) -> KeyTree {
        serde_json::from_str(json).unwrap()
    }

    fn seeded_store() -> (tempfile::TempDir, DirLocaleStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = DirLocaleStore::new(dir.path());
        store
            .save("en", "auth", &tree(r#"{"login": {"title": "Sign in"}}"#), None)
            .unwrap();
        store.save("en", "validation", &tree(r#"{"required": "Required."}"#), None).unwrap();
        store.save("fr", "auth", &tree(r#"{"login": {"title": "Se connecter"}}"#), None).unwrap();
        (dir, store)
    }

    #[googletest::test]
    fn lists_locales_sorted() {
        let (_dir, store) = seeded_store();

        let locales = store.list_locales().unwrap();

        expect_that!(locales, elements_are![eq("en"), eq("fr")]);
    }

    #[googletest::test]
    fn lists_files_sorted() {
        let (_dir, store) = seeded_store();

        let files = store.list_files("en").unwrap();

        expect_that!(files, elements_are![eq("auth"), eq("validation")]);
    }

    #[googletest::test]
    fn list_files_unknown_locale() {
        let (_dir, store) = seeded_store();

        let result = store.list_files("de");

        expect_that!(result, err(pat!(StoreError::LocaleNotFound(eq("de")))));
    }

    #[googletest::test]
    fn load_round_trips() {
        let (_dir, store) = seeded_store();

        let loaded = store.load("en", "auth").unwrap();

        let flat = flatten(&loaded).unwrap();
        expect_that!(flat.get("login.title"), some(eq(&"Sign in".to_string())));
    }

    #[googletest::test]
    fn load_missing_file() {
        let (_dir, store) = seeded_store();

        let result = store.load("fr", "validation");

        expect_that!(
            result,
            err(pat!(StoreError::FileNotFound { locale: eq("fr"), file: eq("validation") }))
        );
    }

    #[googletest::test]
    fn load_surfaces_malformed_content() {
        let (dir, store) = seeded_store();
        std::fs::write(dir.path().join("en/broken.json"), "{not json").unwrap();

        let result = store.load("en", "broken");

        expect_that!(result, err(pat!(StoreError::Parse { file: eq("broken"), .. })));
    }

    #[googletest::test]
    fn load_rejects_non_object_root() {
        let (dir, store) = seeded_store();
        std::fs::write(dir.path().join("en/scalar.json"), "\"just a string\"").unwrap();

        let result = store.load("en", "scalar");

        expect_that!(result, err(pat!(StoreError::Parse { file: eq("scalar"), .. })));
    }

    #[googletest::test]
    fn save_is_deterministic_across_cycles() {
        let (dir, store) = seeded_store();
        let path = dir.path().join("en/auth.json");
        let first = std::fs::read(&path).unwrap();

        let loaded = store.load("en", "auth").unwrap();
        store.save("en", "auth", &loaded, None).unwrap();

        let second = std::fs::read(&path).unwrap();
        expect_that!(second, eq(&first));
    }

    #[googletest::test]
    fn guarded_save_detects_concurrent_write() {
        let (_dir, store) = seeded_store();
        let stale = store.revision("en", "auth").unwrap().unwrap();
        store.save("en", "auth", &tree(r#"{"login": {"title": "Log in"}}"#), None).unwrap();

        let result = store.save(
            "en",
            "auth",
            &tree(r#"{"login": {"title": "Sign in again"}}"#),
            Some(&stale),
        );

        expect_that!(
            result,
            err(pat!(StoreError::Conflict { locale: eq("en"), file: eq("auth") }))
        );
    }

    #[googletest::test]
    fn guarded_save_succeeds_when_unchanged() {
        let (_dir, store) = seeded_store();
        let current = store.revision("en", "auth").unwrap().unwrap();

        let result = store.save(
            "en",
            "auth",
            &tree(r#"{"login": {"title": "Log in"}}"#),
            Some(&current),
        );

        expect_that!(result.is_ok(), eq(true));
    }

    #[googletest::test]
    fn save_creates_locale_directory() {
        let dir = tempfile::tempdir().unwrap();
        let store = DirLocaleStore::new(dir.path());

        store.save("de", "auth", &tree(r#"{"login": {"title": "Anmelden"}}"#), None).unwrap();

        expect_that!(store.list_locales().unwrap(), elements_are![eq("de")]);
    }
}
