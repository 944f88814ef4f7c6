use std::path::PathBuf;
use thiserror::Error;

/// The error type used for `jnigen`.
///
/// Only genuinely fatal conditions surface here. Unresolved type names,
/// malformed attribute-bag segments and unsupported native return types are
/// all recoverable by design and are reported through `log` or the emitted
/// output instead.
#[derive(Debug, Error)]
pub enum Error {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("failed to read class file {path}: {message}")]
    ClassFile { path: PathBuf, message: String },
}

impl Error {
    pub fn parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Error::Parse { path: path.into(), message: message.into() }
    }

    pub fn class_file(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Error::ClassFile { path: path.into(), message: message.into() }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
