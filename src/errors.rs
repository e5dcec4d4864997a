//! Error kinds shared by the codec, the object codec and the object store
//!
//! Each variant maps to one failure class:
//!
//! - `Io`: filesystem failures, carrying the path and the OS error
//! - `Format`: malformed zlib/DEFLATE framing, checksums, object headers and tree entries
//! - `Unsupported`: valid input this implementation deliberately does not handle
//! - `Validation`: bad user input (digests, flag combinations, type expectations)
//! - `Corruption`: back-references reaching before the start of the output
//!
//! The command layer wraps these in `anyhow` with extra context.

use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unable to {action} {}: {source}", path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("format error: {0}")]
    Format(String),

    #[error("unsupported: {0}")]
    Unsupported(String),

    #[error("invalid input: {0}")]
    Validation(String),

    #[error("corrupt stream: {0}")]
    Corruption(String),
}

impl Error {
    pub fn io(action: &'static str, path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Error::Io {
            action,
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub fn format(reason: impl Into<String>) -> Self {
        Error::Format(reason.into())
    }

    pub fn unsupported(reason: impl Into<String>) -> Self {
        Error::Unsupported(reason.into())
    }

    pub fn validation(reason: impl Into<String>) -> Self {
        Error::Validation(reason.into())
    }

    pub fn corruption(reason: impl Into<String>) -> Self {
        Error::Corruption(reason.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
