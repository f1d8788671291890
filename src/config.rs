//! Scanner configuration.
//!
//! The hosting application decides where source lives, which file types to
//! look at, and how a translation lookup is spelled; this module carries
//! those choices and validates them before a scan starts.

use std::path::PathBuf;

use serde::{
    Deserialize,
    Serialize,
};
use thiserror::Error;

/// One problem found while validating settings.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("configuration error in '{field_path}': {message}")]
pub struct ValidationError {
    /// Path to the field (e.g., "excludePatterns[0]").
    pub field_path: String,
    /// What is wrong with it.
    pub message: String,
}

impl ValidationError {
    /// Creates a validation error for a field.
    #[must_use]
    pub fn new(field_path: impl Into<String>, message: impl Into<String>) -> Self {
        Self { field_path: field_path.into(), message: message.into() }
    }
}

/// Errors raised while loading or validating scanner settings.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// One or more fields failed validation.
    #[error("configuration validation failed:\n{}", format_validation_errors(.0))]
    ValidationErrors(Vec<ValidationError>),

    /// The settings document could not be parsed.
    #[error("failed to parse configuration: {0}")]
    ParseError(#[from] serde_json::Error),
}

fn format_validation_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .enumerate()
        .map(|(i, err)| format!("  {}. {} - {}", i + 1, err.field_path, err.message))
        .collect::<Vec<_>>()
        .join("\n")
}

/// What the usage scanner looks at and what it looks for.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScanSettings {
    /// Source-tree roots to walk.
    pub roots: Vec<PathBuf>,

    /// File extensions that are scanned; everything else is skipped.
    pub extensions: Vec<String>,

    /// Spellings of the translation lookup. A usage is the name at a word
    /// boundary followed by `(` and a quoted string literal.
    pub call_names: Vec<String>,

    /// Glob patterns excluded from the walk, relative to each root.
    pub exclude_patterns: Vec<String>,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            roots: vec![PathBuf::from("app"), PathBuf::from("resources/views")],
            extensions: ["php", "html", "js", "vue", "twig"]
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
            call_names: ["__", "trans", "trans_choice", "@lang", "t"]
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
            exclude_patterns: vec!["vendor/**".to_string(), "node_modules/**".to_string()],
        }
    }
}

impl ScanSettings {
    /// Parses settings from a JSON document, applying defaults for absent
    /// fields, and validates the result.
    ///
    /// # Errors
    /// [`ConfigError::ParseError`] or [`ConfigError::ValidationErrors`].
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate().map_err(ConfigError::ValidationErrors)?;
        Ok(settings)
    }

    /// Checks every field, collecting all problems instead of stopping at
    /// the first.
    ///
    /// # Errors
    /// The full list of [`ValidationError`]s.
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if self.roots.is_empty() {
            errors.push(ValidationError::new(
                "roots",
                "At least one source root is required. Example: [\"app\"]",
            ));
        }

        if self.extensions.is_empty() {
            errors.push(ValidationError::new(
                "extensions",
                "At least one extension is required. Example: [\"php\"]",
            ));
        }
        for (index, extension) in self.extensions.iter().enumerate() {
            if extension.is_empty() || extension.starts_with('.') {
                errors.push(ValidationError::new(
                    format!("extensions[{index}]"),
                    format!("Extensions are given without the leading dot, got '{extension}'"),
                ));
            }
        }

        if self.call_names.is_empty() {
            errors.push(ValidationError::new(
                "callNames",
                "At least one call name is required. Example: [\"__\", \"trans\"]",
            ));
        }
        for (index, name) in self.call_names.iter().enumerate() {
            if name.is_empty() || name.contains(char::is_whitespace) || name.contains('(') {
                errors.push(ValidationError::new(
                    format!("callNames[{index}]"),
                    format!(
                        "Call names are bare function names without parentheses, got '{name}'"
                    ),
                ));
            }
        }

        for (index, pattern) in self.exclude_patterns.iter().enumerate() {
            if let Err(e) = globset::Glob::new(pattern) {
                errors.push(ValidationError::new(
                    format!("excludePatterns[{index}]"),
                    format!("Invalid glob pattern '{pattern}': {e}"),
                ));
            }
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}
