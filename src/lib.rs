//! lang-audit
//!
//! Localization key management engine: discovers per-locale translation
//! files, flattens their nested key trees, diffs them against a reference
//! locale, materializes missing-key stubs, and scans application source for
//! keys that are defined but never referenced.
//!
//! The engine is a plain synchronous library; the hosting application owns
//! routing, rendering, and any caching or write serialization around it.

pub mod codec;
pub mod config;
pub mod diff;
pub mod error;
pub mod merge;
pub mod scanner;
pub mod store;
pub mod unused;

pub use codec::{
    FlatKeySet,
    KeyTree,
};
pub use config::ScanSettings;
pub use diff::{
    DiffEngine,
    MissingReport,
};
pub use error::EngineError;
pub use merge::MergeWriter;
pub use scanner::{
    UsageIndex,
    UsageScanner,
};
pub use store::{
    DirLocaleStore,
    LocaleStore,
    MemoryLocaleStore,
};
pub use unused::{
    UnusedFinder,
    UnusedReport,
};
