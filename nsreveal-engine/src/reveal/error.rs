//! Error types for the fallible edges of the engine
//!
//! Scanning, rewriting, walking and dispatching are total and never return these. They only
//! surface from HTML serialization and from decoding settings supplied by the outside world.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RevealError {
    #[error("HTML serialization failed: {0}")]
    Serialization(#[from] std::io::Error),

    #[error("serialized HTML is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("invalid settings update: {0}")]
    Settings(#[from] serde_json::Error),

    #[error("unknown mode `{0}` (expected `translate` or `annotate`)")]
    UnknownMode(String),
}
