//! Conversion between nested key trees and flat dot-joined key maps.
//!
//! A translation file is a [`KeyTree`]; editors and the diff engine work on
//! its flattened form, a [`FlatKeySet`] mapping `"login.title"`-style paths to
//! leaf values. Flattening preserves the tree's own child order, so callers
//! that need deterministic output rely on that order instead of re-sorting.

use indexmap::IndexMap;
use indexmap::map::Entry;
use serde::{
    Deserialize,
    Serialize,
};
use thiserror::Error;

/// Separator between path segments in a flattened key.
pub const KEY_SEPARATOR: char = '.';

/// One translation file's content: a leaf value or an ordered group of
/// sub-trees. Serialized as a JSON string / JSON object respectively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KeyTree {
    /// A translated string.
    Leaf(String),
    /// Named children, in insertion order.
    Branch(IndexMap<String, KeyTree>),
}

impl KeyTree {
    /// An empty group, the starting point for files that do not exist yet.
    #[must_use]
    pub fn empty() -> Self {
        Self::Branch(IndexMap::new())
    }

    /// Whether the tree holds no leaves at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Leaf(_) => false,
            Self::Branch(children) => children.values().all(Self::is_empty),
        }
    }
}

/// Flattened view of a [`KeyTree`]: dot-joined path → leaf value, in the
/// tree's own traversal order.
pub type FlatKeySet = IndexMap<String, String>;

/// Errors raised while converting between trees and flat key sets.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// A segment that cannot be represented in a dot-joined path. A segment
    /// containing the separator would be re-split on the way back, so it is
    /// rejected instead of silently producing a wrong path.
    #[error("key segment '{segment}' cannot be flattened: {reason}")]
    KeyFormat {
        /// The offending segment (or joined path for root-level problems).
        segment: String,
        /// Human-readable cause.
        reason: &'static str,
    },
    /// A path that would need one segment to be both a value and a group.
    #[error("key path '{path}' requires segment '{segment}' to be both a value and a group")]
    StructuralConflict {
        /// The full dot-joined path being inserted.
        path: String,
        /// The segment where the collision happened.
        segment: String,
    },
}

/// Flattens a tree into dot-joined (path, value) pairs.
///
/// # Errors
/// [`CodecError::KeyFormat`] if any segment is empty or contains the
/// separator, or if the root itself is a leaf (a file root must be a group).
pub fn flatten(tree: &KeyTree) -> Result<FlatKeySet, CodecError> {
    let KeyTree::Branch(children) = tree else {
        return Err(CodecError::KeyFormat {
            segment: String::new(),
            reason: "the root of a translation file must be a group",
        });
    };

    let mut flat = FlatKeySet::new();
    flatten_into(children, None, &mut flat)?;
    Ok(flat)
}

fn flatten_into(
    children: &IndexMap<String, KeyTree>,
    prefix: Option<&str>,
    out: &mut FlatKeySet,
) -> Result<(), CodecError> {
    for (segment, child) in children {
        if segment.is_empty() {
            return Err(CodecError::KeyFormat {
                segment: segment.clone(),
                reason: "segments must be non-empty",
            });
        }
        if segment.contains(KEY_SEPARATOR) {
            return Err(CodecError::KeyFormat {
                segment: segment.clone(),
                reason: "segments must not contain the '.' separator",
            });
        }

        let path =
            prefix.map_or_else(|| segment.clone(), |p| format!("{p}{KEY_SEPARATOR}{segment}"));
        match child {
            KeyTree::Leaf(value) => {
                out.insert(path, value.clone());
            }
            KeyTree::Branch(grandchildren) => {
                flatten_into(grandchildren, Some(&path), out)?;
            }
        }
    }
    Ok(())
}

/// Rebuilds a tree from dot-joined (path, value) pairs, creating intermediate
/// groups as needed. Insertion order of the flat set becomes child order.
///
/// # Errors
/// [`CodecError::KeyFormat`] for paths with empty segments,
/// [`CodecError::StructuralConflict`] if a path lands on an existing group or
/// traverses an existing leaf.
pub fn unflatten(flat: &FlatKeySet) -> Result<KeyTree, CodecError> {
    let mut root = IndexMap::new();
    for (path, value) in flat {
        insert_path(&mut root, path, value)?;
    }
    Ok(KeyTree::Branch(root))
}

fn insert_path(
    root: &mut IndexMap<String, KeyTree>,
    path: &str,
    value: &str,
) -> Result<(), CodecError> {
    let segments: Vec<&str> = path.split(KEY_SEPARATOR).collect();
    if segments.iter().any(|segment| segment.is_empty()) {
        return Err(CodecError::KeyFormat {
            segment: path.to_string(),
            reason: "segments must be non-empty",
        });
    }
    let Some((last, intermediate)) = segments.split_last() else {
        return Err(CodecError::KeyFormat {
            segment: path.to_string(),
            reason: "segments must be non-empty",
        });
    };

    let mut current = root;
    for segment in intermediate {
        let entry = current
            .entry((*segment).to_string())
            .or_insert_with(|| KeyTree::Branch(IndexMap::new()));
        match entry {
            KeyTree::Branch(children) => current = children,
            KeyTree::Leaf(_) => {
                return Err(CodecError::StructuralConflict {
                    path: path.to_string(),
                    segment: (*segment).to_string(),
                });
            }
        }
    }

    match current.entry((*last).to_string()) {
        Entry::Vacant(slot) => {
            slot.insert(KeyTree::Leaf(value.to_string()));
            Ok(())
        }
        Entry::Occupied(mut slot) => match slot.get_mut() {
            // A flat set maps each path once; re-insertion just updates.
            KeyTree::Leaf(existing) => {
                *existing = value.to_string();
                Ok(())
            }
            KeyTree::Branch(_) => Err(CodecError::StructuralConflict {
                path: path.to_string(),
                segment: (*last).to_string(),
            }),
        },
    }
}
