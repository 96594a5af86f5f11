use std::io;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoreErrorCode {
    Io,
    Validation,
    Structure,
    UnsupportedOperation,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{code:?}: {message}")]
pub struct CoreError {
    pub code: CoreErrorCode,
    pub message: String,
    /// Set for validation failures: the key of the offending field.
    pub field: Option<String>,
}

impl CoreError {
    pub fn new(code: CoreErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            field: None,
        }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: CoreErrorCode::Validation,
            message: message.into(),
            field: Some(field.into()),
        }
    }

    pub fn io(context: impl AsRef<str>, err: io::Error) -> Self {
        Self::new(CoreErrorCode::Io, format!("{}: {err}", context.as_ref()))
    }
}
