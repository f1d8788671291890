//! Cross-locale diffing: which reference keys a target locale is missing.

use indexmap::IndexMap;

use crate::codec::{
    FlatKeySet,
    flatten,
};
use crate::error::EngineError;
use crate::store::{
    LocaleStore,
    StoreError,
};

/// A file excluded from a report because its content could not be used,
/// so one corrupt file does not hide the status of the others.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFile {
    /// Translation file name.
    pub file: String,
    /// Why it was skipped.
    pub reason: String,
}

/// Per-target-locale slice of a [`MissingReport`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocaleDiff {
    /// file name → missing keys with their reference stub values, in the
    /// reference file's own key order.
    pub files: IndexMap<String, FlatKeySet>,
    /// Files that could not be diffed.
    pub skipped: Vec<SkippedFile>,
}

/// Result of [`DiffEngine::find_missing`]. Built fresh per query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MissingReport {
    /// target locale → per-file missing keys. Only locales with findings
    /// appear.
    pub locales: IndexMap<String, LocaleDiff>,
}

impl MissingReport {
    /// True when no target is missing anything and nothing was skipped.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.locales.is_empty()
    }

    /// Total number of missing keys across all locales and files.
    #[must_use]
    pub fn missing_key_count(&self) -> usize {
        self.locales.values().flat_map(|diff| diff.files.values()).map(IndexMap::len).sum()
    }
}

/// Compares target locales against a reference locale, file by file.
#[derive(Debug, Clone, Copy)]
pub struct DiffEngine<'s> {
    store: &'s dyn LocaleStore,
}

impl<'s> DiffEngine<'s> {
    /// Creates an engine over the given store.
    #[must_use]
    pub fn new(store: &'s dyn LocaleStore) -> Self {
        Self { store }
    }

    /// Reports every key of `reference` that `target` lacks, or that every
    /// other locale lacks when no target is named. A key counts as missing
    /// when it is absent or its value is empty/whitespace-only. Reference
    /// keys that are themselves blank carry no usable stub and are never
    /// reported, which keeps the self-diff empty.
    ///
    /// Files whose content cannot be parsed or flattened are skipped and
    /// recorded in the report rather than aborting the whole diff.
    ///
    /// # Errors
    /// [`StoreError::LocaleNotFound`] if `reference` is unknown; storage I/O
    /// failures propagate.
    pub fn find_missing(
        &self,
        reference: &str,
        target: Option<&str>,
    ) -> Result<MissingReport, EngineError> {
        let locales = self.store.list_locales()?;
        if !locales.iter().any(|locale| locale == reference) {
            return Err(StoreError::LocaleNotFound(reference.to_string()).into());
        }

        let targets: Vec<String> = match target {
            Some(target) => vec![target.to_string()],
            None => locales.into_iter().filter(|locale| locale != reference).collect(),
        };

        // Load and flatten each reference file once; a broken reference file
        // is reported as skipped for every target.
        let ref_files = self.store.list_files(reference)?;
        let mut ref_flats: Vec<(String, Result<FlatKeySet, String>)> =
            Vec::with_capacity(ref_files.len());
        for file in ref_files {
            let flat = self.load_flat(reference, &file)?;
            ref_flats.push((file, flat));
        }

        let mut report = MissingReport::default();
        for target in targets {
            let diff = self.diff_locale(&target, &ref_flats)?;
            if !diff.files.is_empty() || !diff.skipped.is_empty() {
                report.locales.insert(target, diff);
            }
        }
        Ok(report)
    }

    fn diff_locale(
        &self,
        target: &str,
        ref_flats: &[(String, Result<FlatKeySet, String>)],
    ) -> Result<LocaleDiff, EngineError> {
        let mut diff = LocaleDiff::default();

        for (file, ref_flat) in ref_flats {
            let ref_flat = match ref_flat {
                Ok(flat) => flat,
                Err(reason) => {
                    diff.skipped
                        .push(SkippedFile { file: file.clone(), reason: reason.clone() });
                    continue;
                }
            };

            match self.load_flat(target, file)? {
                Ok(target_flat) => {
                    let missing: FlatKeySet = ref_flat
                        .iter()
                        .filter(|(path, value)| {
                            // A blank reference value has no stub to offer;
                            // reporting it would also make self-diff non-empty
                            // and the diff→merge loop never converge.
                            !value.trim().is_empty()
                                && !target_flat
                                    .get(*path)
                                    .is_some_and(|value| !value.trim().is_empty())
                        })
                        .map(|(path, value)| (path.clone(), value.clone()))
                        .collect();
                    if !missing.is_empty() {
                        diff.files.insert(file.clone(), missing);
                    }
                }
                Err(reason) => {
                    diff.skipped.push(SkippedFile { file: file.clone(), reason });
                }
            }
        }

        Ok(diff)
    }

    /// Loads and flattens one file. The inner `Result` carries per-file
    /// problems (absent file ⇒ empty set, unusable content ⇒ reason text);
    /// the outer one carries failures that abort the operation.
    fn load_flat(
        &self,
        locale: &str,
        file: &str,
    ) -> Result<Result<FlatKeySet, String>, EngineError> {
        let tree = match self.store.load(locale, file) {
            Ok(tree) => tree,
            Err(StoreError::FileNotFound { .. }) => return Ok(Ok(FlatKeySet::new())),
            Err(e @ StoreError::Parse { .. }) => {
                tracing::warn!(locale, file, error = %e, "Skipping unparseable translation file");
                return Ok(Err(e.to_string()));
            }
            Err(e) => return Err(e.into()),
        };
        match flatten(&tree) {
            Ok(flat) => Ok(Ok(flat)),
            Err(e) => {
                tracing::warn!(locale, file, error = %e, "Skipping unflattenable translation file");
                Ok(Err(e.to_string()))
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use googletest::prelude::*;

    use super::*;
    use crate::store::MemoryLocaleStore;

    fn store_with(entries: &[(&str, &str, &str)]) -> MemoryLocaleStore {
        let store = MemoryLocaleStore::new();
        for (locale, file, json) in entries {
            store.save(locale, file, &serde_json::from_str(json).unwrap(), None).unwrap();
        }
        store
    }

    #[googletest::test]
    fn reports_missing_keys_in_reference_order() {
        let store = store_with(&[
            ("en", "auth", r#"{"login": {"title": "Sign in", "failed": "Invalid credentials"}}"#),
            ("fr", "auth", r#"{"login": {"title": "Se connecter"}}"#),
        ]);

        let report = DiffEngine::new(&store).find_missing("en", Some("fr")).unwrap();

        let fr = report.locales.get("fr").unwrap();
        let auth = fr.files.get("auth").unwrap();
        expect_that!(auth.len(), eq(1));
        expect_that!(
            auth.get("login.failed"),
            some(eq(&"Invalid credentials".to_string()))
        );
    }

    #[googletest::test]
    fn reports_whole_file_when_target_file_absent() {
        let store = store_with(&[
            ("en", "auth", r#"{"login": {"title": "Sign in"}}"#),
            ("en", "validation", r#"{"required": "This field is required."}"#),
            ("fr", "auth", r#"{"login": {"title": "Se connecter"}}"#),
        ]);

        let report = DiffEngine::new(&store).find_missing("en", Some("fr")).unwrap();

        let fr = report.locales.get("fr").unwrap();
        let validation = fr.files.get("validation").unwrap();
        expect_that!(
            validation.get("required"),
            some(eq(&"This field is required.".to_string()))
        );
        expect_that!(fr.files.contains_key("auth"), eq(false));
    }

    #[googletest::test]
    fn empty_or_blank_values_count_as_missing() {
        let store = store_with(&[
            ("en", "auth", r#"{"a": "A", "b": "B", "c": "C"}"#),
            ("fr", "auth", r#"{"a": "", "b": "   ", "c": "C"}"#),
        ]);

        let report = DiffEngine::new(&store).find_missing("en", Some("fr")).unwrap();

        let auth = report.locales.get("fr").unwrap().files.get("auth").unwrap();
        let paths: Vec<String> = auth.keys().cloned().collect();
        expect_that!(paths, elements_are![eq("a"), eq("b")]);
    }

    #[googletest::test]
    fn self_diff_is_empty() {
        let store = store_with(&[("en", "auth", r#"{"login": {"title": "Sign in"}}"#)]);

        let report = DiffEngine::new(&store).find_missing("en", Some("en")).unwrap();

        expect_that!(report.is_empty(), eq(true));
    }

    #[googletest::test]
    fn self_diff_is_empty_even_with_blank_values() {
        let store = store_with(&[("en", "auth", r#"{"title": "Sign in", "draft": ""}"#)]);

        let report = DiffEngine::new(&store).find_missing("en", Some("en")).unwrap();

        expect_that!(report.is_empty(), eq(true));
    }

    #[googletest::test]
    fn blank_reference_values_are_not_reported() {
        let store = store_with(&[
            ("en", "auth", r#"{"title": "Sign in", "draft": "", "pending": "   "}"#),
            ("fr", "auth", r"{}"),
        ]);

        let report = DiffEngine::new(&store).find_missing("en", Some("fr")).unwrap();

        let auth = report.locales.get("fr").unwrap().files.get("auth").unwrap();
        let paths: Vec<String> = auth.keys().cloned().collect();
        expect_that!(paths, elements_are![eq("title")]);
    }

    #[googletest::test]
    fn diff_merge_diff_converges_despite_blank_reference_value() {
        let store = store_with(&[
            ("en", "auth", r#"{"title": "Sign in", "draft": ""}"#),
            ("fr", "auth", r"{}"),
        ]);
        let engine = DiffEngine::new(&store);
        let writer = crate::merge::MergeWriter::new(&store);

        let report = engine.find_missing("en", Some("fr")).unwrap();
        for (file, missing) in &report.locales.get("fr").unwrap().files {
            writer.apply_missing("fr", file, missing).unwrap();
        }

        let after = engine.find_missing("en", Some("fr")).unwrap();
        expect_that!(after.is_empty(), eq(true));
    }

    #[googletest::test]
    fn unknown_reference_locale_fails_fast() {
        let store = store_with(&[("en", "auth", r#"{"a": "A"}"#)]);

        let result = DiffEngine::new(&store).find_missing("xx", None);

        expect_that!(
            result,
            err(pat!(EngineError::Store(pat!(StoreError::LocaleNotFound(eq("xx"))))))
        );
    }

    #[googletest::test]
    fn diffs_all_locales_when_no_target_given() {
        let store = store_with(&[
            ("en", "auth", r#"{"a": "A"}"#),
            ("fr", "auth", r#"{"a": "Ah"}"#),
            ("de", "auth", r"{}"),
        ]);

        let report = DiffEngine::new(&store).find_missing("en", None).unwrap();

        expect_that!(report.locales.contains_key("de"), eq(true));
        expect_that!(report.locales.contains_key("fr"), eq(false));
        expect_that!(report.locales.contains_key("en"), eq(false));
        expect_that!(report.missing_key_count(), eq(1));
    }

    #[googletest::test]
    fn corrupt_target_file_is_skipped_not_fatal() {
        let store = store_with(&[
            ("en", "auth", r#"{"a": "A"}"#),
            ("en", "validation", r#"{"required": "Required."}"#),
        ]);
        store.put_raw("fr", "auth", "{broken");
        store.save("fr", "validation", &serde_json::from_str(r"{}").unwrap(), None).unwrap();

        let report = DiffEngine::new(&store).find_missing("en", Some("fr")).unwrap();

        let fr = report.locales.get("fr").unwrap();
        expect_that!(fr.skipped, elements_are![pat!(SkippedFile { file: eq("auth"), .. })]);
        expect_that!(fr.files.contains_key("validation"), eq(true));
    }

    #[googletest::test]
    fn corrupt_reference_file_is_skipped_for_every_target() {
        let store = store_with(&[("fr", "auth", r#"{"a": "Ah"}"#)]);
        store.put_raw("en", "auth", "not json at all");

        let report = DiffEngine::new(&store).find_missing("en", Some("fr")).unwrap();

        let fr = report.locales.get("fr").unwrap();
        expect_that!(fr.skipped, elements_are![pat!(SkippedFile { file: eq("auth"), .. })]);
    }
}
