//! Error taxonomy for the conversion pipeline.
//!
//! Every fatal condition aborts the whole conversion: the transform is
//! deterministic and pure, so there is no partial output and no retry.

use std::path::PathBuf;

use thiserror::Error;

/// Fatal conversion errors.
#[derive(Debug, Error)]
pub enum PackError {
    /// A permuted tensor's trailing axis cannot be packed into 4-wide groups.
    #[error("tensor at `{path}`: trailing axis of length {len} is not a multiple of 4")]
    ShapeValidation { path: String, len: usize },

    /// Jagged tensor data, an unsupported JSON value, or a flat key that
    /// conflicts with an already-established leaf at the same path.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// JSON parse or serialize failure at the file boundary.
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    /// File read/write failure at the CLI boundary.
    #[error("{}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, PackError>;
