//! Error types for the twirpcpp crate.

use std::path::PathBuf;

/// Errors that can occur while turning a compiler request into bindings.
///
/// Every variant is fatal for the whole run: the plugin never emits a
/// partial artifact set.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The compiler request could not be decoded.
    #[error("malformed compiler request: {0}")]
    Decode(String),

    /// The request bytes are not a valid protobuf message.
    #[error("failed to decode protobuf payload: {0}")]
    Protobuf(#[from] prost::DecodeError),

    /// A captured fixture is not valid base64 text.
    #[error("failed to decode base64 fixture: {0}")]
    Base64(#[from] base64::DecodeError),

    /// The schema lacks structure the generator relies on.
    #[error("schema precondition violated: {0}")]
    Schema(String),

    /// A renderer could not satisfy its template from the context.
    #[error("cannot render {file} (service {service}): {reason}")]
    Template {
        file: String,
        service: String,
        reason: String,
    },

    /// Failed to read an input file from disk.
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to write a generated file.
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Stream I/O error on stdin/stdout.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// Writing into an in-memory buffer failed.
    #[error("formatting error: {0}")]
    Fmt(#[from] std::fmt::Error),

    /// JSON serialization error.
    #[error("failed to serialize JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
