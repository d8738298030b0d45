//! Error types for the animator library.
//!
//! Content problems in a definition (unknown actor types, unknown easings,
//! dangling property keys) never surface here: they are logged and degraded.
//! Only structural failures reach the caller.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnimatorError {
    /// The rendering adapter could not perform a required operation.
    #[error("Render adapter error: {0}")]
    Render(String),

    /// The rendering adapter was handed a primitive it never created.
    #[error("Unknown primitive handle: {0}")]
    UnknownPrimitive(u64),

    /// The definition document is not valid JSON or has the wrong shape.
    #[error("Failed to parse animation definition: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Terminal setup or teardown failed.
    #[error("Terminal error: {0}")]
    Terminal(String),
}

pub type Result<T> = std::result::Result<T, AnimatorError>;
