//! Persisted locale data.
//!
//! The engine never touches storage directly; everything goes through
//! [`LocaleStore`] so the hosting application (and tests) can inject the
//! backing implementation. [`fs::DirLocaleStore`] is the directory-tree
//! store used in production, [`memory::MemoryLocaleStore`] the in-memory
//! substitute.

mod fs;
mod memory;

use thiserror::Error;

pub use fs::DirLocaleStore;
pub use memory::MemoryLocaleStore;

use crate::codec::KeyTree;

/// Errors raised by a [`LocaleStore`].
#[derive(Error, Debug)]
pub enum StoreError {
    /// The requested locale does not exist in the store.
    #[error("unknown locale '{0}'")]
    LocaleNotFound(String),

    /// The requested translation file does not exist in the locale.
    #[error("no translation file '{file}' in locale '{locale}'")]
    FileNotFound {
        /// Locale that was queried.
        locale: String,
        /// File name that was queried.
        file: String,
    },

    /// Persisted content could not be interpreted as a key tree.
    #[error("failed to parse '{locale}/{file}': {message}")]
    Parse {
        /// Locale of the offending file.
        locale: String,
        /// Name of the offending file.
        file: String,
        /// Underlying parser message.
        message: String,
    },

    /// The file changed between load and save (optimistic-concurrency check).
    #[error("'{locale}/{file}' was modified concurrently; reload and retry")]
    Conflict {
        /// Locale of the contested file.
        locale: String,
        /// Name of the contested file.
        file: String,
    },

    /// A tree could not be encoded into its persisted form.
    #[error("failed to serialize '{locale}/{file}': {message}")]
    Serialize {
        /// Locale of the file being written.
        locale: String,
        /// Name of the file being written.
        file: String,
        /// Underlying encoder message.
        message: String,
    },

    /// Underlying file-system failure.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Content hash of a persisted translation file, used as the expected-version
/// token for guarded saves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Revision(blake3::Hash);

impl Revision {
    /// Hashes the persisted byte representation of a file.
    #[must_use]
    pub fn of(content: &[u8]) -> Self {
        Self(blake3::hash(content))
    }
}

/// Storage abstraction for per-locale translation files.
///
/// Enumeration order is deterministic and restartable: two calls without an
/// intervening write return the same sequences.
pub trait LocaleStore: std::fmt::Debug {
    /// Lists the locales present in the store.
    ///
    /// # Errors
    /// [`StoreError::Io`] if the backing storage cannot be enumerated.
    fn list_locales(&self) -> Result<Vec<String>, StoreError>;

    /// Lists the translation file names within a locale.
    ///
    /// # Errors
    /// [`StoreError::LocaleNotFound`] for an unknown locale.
    fn list_files(&self, locale: &str) -> Result<Vec<String>, StoreError>;

    /// Loads one translation file's tree.
    ///
    /// # Errors
    /// [`StoreError::FileNotFound`] if absent, [`StoreError::Parse`] if the
    /// persisted content is not a valid key tree.
    fn load(&self, locale: &str, file: &str) -> Result<KeyTree, StoreError>;

    /// Current revision of a file, or `None` if it does not exist.
    ///
    /// # Errors
    /// [`StoreError::Io`] if the content cannot be read.
    fn revision(&self, locale: &str, file: &str) -> Result<Option<Revision>, StoreError>;

    /// Persists a tree, all-or-nothing. With `expected` set, the save is
    /// rejected with [`StoreError::Conflict`] when the file's current
    /// revision differs (`None` meaning "the file must not exist yet").
    ///
    /// # Errors
    /// [`StoreError::Conflict`] on a failed revision check,
    /// [`StoreError::Io`] on write failure.
    fn save(
        &self,
        locale: &str,
        file: &str,
        tree: &KeyTree,
        expected: Option<&Revision>,
    ) -> Result<(), StoreError>;
}

/// Canonical serialized form of a tree: pretty-printed JSON with the tree's
/// own key order and a trailing newline. Deterministic, so repeated
/// load→save cycles without changes are byte-identical.
pub(crate) fn serialize_tree(
    locale: &str,
    file: &str,
    tree: &KeyTree,
) -> Result<String, StoreError> {
    let mut text = serde_json::to_string_pretty(tree).map_err(|e| StoreError::Serialize {
        locale: locale.to_string(),
        file: file.to_string(),
        message: e.to_string(),
    })?;
    text.push('\n');
    Ok(text)
}

pub(crate) fn parse_tree(locale: &str, file: &str, content: &str) -> Result<KeyTree, StoreError> {
    let tree: KeyTree = serde_json::from_str(content).map_err(|e| StoreError::Parse {
        locale: locale.to_string(),
        file: file.to_string(),
        message: e.to_string(),
    })?;
    // A bare string parses as a leaf, which is not a valid file root.
    if matches!(tree, KeyTree::Leaf(_)) {
        return Err(StoreError::Parse {
            locale: locale.to_string(),
            file: file.to_string(),
            message: "the file root must be an object".to_string(),
        });
    }
    Ok(tree)
}
