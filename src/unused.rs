//! Defined-but-never-referenced key detection.
//!
//! Compares stored locale content against a [`UsageIndex`] from the scanner.
//! Unlike the diff engine this has no direction to argue about: it is a set
//! difference between what the files define and what the code mentions.

use indexmap::IndexMap;

use crate::codec::{
    KEY_SEPARATOR,
    flatten,
};
use crate::diff::SkippedFile;
use crate::error::EngineError;
use crate::scanner::UsageIndex;
use crate::store::{
    LocaleStore,
    StoreError,
};

/// Per-locale slice of an [`UnusedReport`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnusedFiles {
    /// file name → key paths never referenced, in the file's own order.
    pub files: IndexMap<String, Vec<String>>,
    /// Files whose content could not be inspected.
    pub skipped: Vec<SkippedFile>,
}

/// Result of [`UnusedFinder::find_unused`]. Built fresh per query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnusedReport {
    /// locale → per-file unused keys. Only locales with findings appear.
    pub locales: IndexMap<String, UnusedFiles>,
}

impl UnusedReport {
    /// True when every defined key was found in the usage index.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.locales.is_empty()
    }
}

/// Reports keys that exist in locale files but nowhere in the scanned code.
#[derive(Debug, Clone, Copy)]
pub struct UnusedFinder<'s> {
    store: &'s dyn LocaleStore,
}

impl<'s> UnusedFinder<'s> {
    /// Creates a finder over the given store.
    #[must_use]
    pub fn new(store: &'s dyn LocaleStore) -> Self {
        Self { store }
    }

    /// Lists, per locale and file, every key path absent from `usage`.
    ///
    /// Lookup is by the fully-qualified key call sites actually write: the
    /// file name plus the path inside it, so `login.title` in file `auth`
    /// is used when the index holds `auth.login.title`. Exact match only;
    /// a key is "unused" strictly in the "not found by literal scan" sense.
    ///
    /// # Errors
    /// Storage enumeration and I/O failures propagate. Unparseable files are
    /// skipped and recorded in the report instead.
    pub fn find_unused(&self, usage: &UsageIndex) -> Result<UnusedReport, EngineError> {
        let mut report = UnusedReport::default();

        for locale in self.store.list_locales()? {
            let mut entry = UnusedFiles::default();

            for file in self.store.list_files(&locale)? {
                let flat = match self.store.load(&locale, &file).map(|tree| flatten(&tree)) {
                    Ok(Ok(flat)) => flat,
                    Ok(Err(e)) => {
                        tracing::warn!(locale, file, error = %e, "Skipping unflattenable translation file");
                        entry.skipped.push(SkippedFile { file, reason: e.to_string() });
                        continue;
                    }
                    Err(e @ StoreError::Parse { .. }) => {
                        tracing::warn!(locale, file, error = %e, "Skipping unparseable translation file");
                        entry.skipped.push(SkippedFile { file, reason: e.to_string() });
                        continue;
                    }
                    Err(e) => return Err(e.into()),
                };

                let unused: Vec<String> = flat
                    .keys()
                    .filter(|path| {
                        let qualified = format!("{file}{KEY_SEPARATOR}{path}");
                        !usage.contains(&qualified)
                    })
                    .cloned()
                    .collect();
                if !unused.is_empty() {
                    entry.files.insert(file, unused);
                }
            }

            if !entry.files.is_empty() || !entry.skipped.is_empty() {
                report.locales.insert(locale, entry);
            }
        }

        Ok(report)
    }
}
