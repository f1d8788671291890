//! Top-level error type composing the per-module errors.

use thiserror::Error;

use crate::codec::CodecError;
use crate::store::StoreError;

/// Any failure surfaced by an engine operation. Nothing is retried
/// automatically; retries are the hosting application's call.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Locale storage failure.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Key path encoding/decoding failure.
    #[error(transparent)]
    Codec(#[from] CodecError),
}
