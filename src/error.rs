//! Per-file error kinds.
//!
//! Every stage of the per-file pipeline returns a `ConvertError`; the driver
//! records it against the data file and moves on to the next one.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConvertError {
    /// A referenced resource (usually the specification) does not exist.
    #[error("not found: {}: {reason}", path.display())]
    NotFound { path: PathBuf, reason: String },

    /// Specification is malformed or names an unknown datatype.
    #[error("format error in {}: {reason}", path.display())]
    Format { path: PathBuf, reason: String },

    /// A data line does not match the specification.
    #[error("parse error at {}:{line}: {reason}", path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("i/o error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ConvertError {
    pub fn not_found(path: &Path, reason: impl Into<String>) -> Self {
        Self::NotFound {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }

    pub fn format(path: &Path, reason: impl Into<String>) -> Self {
        Self::Format {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }

    pub fn parse(path: &Path, line: usize, reason: impl Into<String>) -> Self {
        Self::Parse {
            path: path.to_path_buf(),
            line,
            reason: reason.into(),
        }
    }

    pub fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Short kind label used in log lines and the batch summary.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not-found",
            Self::Format { .. } => "format",
            Self::Parse { .. } => "parse",
            Self::Io { .. } => "io",
        }
    }
}
