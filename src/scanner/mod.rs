//! Source-tree scanning for translation key usage.
//!
//! Walks the configured roots and collects every key passed as a string
//! literal to one of the configured call names. Keys built at runtime are a
//! declared false-negative class: the scanner reports "not found by literal
//! scan", never "provably unused".

mod literal;

use std::collections::BTreeSet;
use std::path::Path;

use globset::{
    Glob,
    GlobSet,
    GlobSetBuilder,
};
use ignore::WalkBuilder;

use crate::config::{
    ConfigError,
    ScanSettings,
};

/// The set of keys found anywhere in the scanned trees. A set, so the order
/// in which files are visited never affects the result.
pub type UsageIndex = BTreeSet<String>;

/// Literal-call scanner over the configured source roots.
#[derive(Debug)]
pub struct UsageScanner {
    settings: ScanSettings,
    exclude_set: GlobSet,
}

impl UsageScanner {
    /// Builds a scanner, validating the settings and compiling the exclude
    /// patterns once.
    ///
    /// # Errors
    /// [`ConfigError::ValidationErrors`] for invalid settings.
    pub fn new(settings: ScanSettings) -> Result<Self, ConfigError> {
        settings.validate().map_err(ConfigError::ValidationErrors)?;

        let mut builder = GlobSetBuilder::new();
        for pattern in &settings.exclude_patterns {
            // validate() already checked each pattern
            if let Ok(glob) = Glob::new(pattern) {
                builder.add(glob);
            }
        }
        let exclude_set = builder.build().map_err(|e| {
            ConfigError::ValidationErrors(vec![crate::config::ValidationError::new(
                "excludePatterns",
                format!("Failed to build exclude patterns: {e}"),
            )])
        })?;

        Ok(Self { settings, exclude_set })
    }

    /// Scans every root and returns the used-key set. Unreadable files and
    /// walk errors are logged and skipped; the scan itself never fails.
    #[must_use]
    pub fn scan(&self) -> UsageIndex {
        let mut index = UsageIndex::new();
        for root in &self.settings.roots {
            self.scan_root(root, &mut index);
        }
        tracing::debug!(keys = index.len(), "Usage scan finished");
        index
    }

    fn scan_root(&self, root: &Path, index: &mut UsageIndex) {
        tracing::debug!(root = %root.display(), "Scanning source root");

        for result in WalkBuilder::new(root)
            .hidden(false)
            .git_ignore(true)
            .git_global(true)
            .git_exclude(true)
            .follow_links(false)
            .build()
        {
            let entry = match result {
                Ok(entry) => entry,
                Err(err) => {
                    tracing::debug!(?err, "Failed to read directory entry");
                    continue;
                }
            };

            if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                continue;
            }

            let path = entry.path();
            let Ok(relative_path) = path.strip_prefix(root) else {
                continue;
            };
            if self.exclude_set.is_match(relative_path) {
                continue;
            }
            if !self.has_allowed_extension(path) {
                continue;
            }

            let content = match std::fs::read_to_string(path) {
                Ok(content) => content,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Failed to read source file");
                    continue;
                }
            };

            for name in &self.settings.call_names {
                literal::extract_literal_keys(&content, name, index);
            }
        }
    }

    fn has_allowed_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| self.settings.extensions.iter().any(|allowed| allowed == ext))
    }
}
