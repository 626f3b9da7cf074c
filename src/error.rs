//! Error taxonomy for the cipher engine.
//!
//! Errors fall into three phases:
//!
//! - **Configuration**: the requested transform cannot be built
//!   (unknown names, incompatible combinations).
//! - **Decoding**: key or IV text is not valid in its declared encoding.
//! - **Execution**: the cipher rejected the material or the data.
//!
//! Messages describe the defect only. Key and IV bytes never appear in them.

use std::path::PathBuf;

use thiserror::Error;

use crate::transform::{Algorithm, Mode, Padding};

/// Result alias used throughout the engine.
pub type Result<T, E = CryptoError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("unsupported mode: {0}")]
    UnsupportedMode(String),

    #[error("unsupported padding: {0}")]
    UnsupportedPadding(String),

    #[error("{padding} cannot be used with {mode} mode")]
    IncompatibleModePadding { mode: Mode, padding: Padding },

    #[error("{mode} mode requires a 16-byte block cipher, {algorithm} uses {block_size}-byte blocks")]
    IncompatibleModeAlgorithm { mode: Mode, algorithm: Algorithm, block_size: usize },

    #[error("unsupported charset: {0}")]
    UnsupportedCharset(String),

    #[error("malformed hex: {0}")]
    MalformedHex(String),

    #[error("malformed base64: {0}")]
    MalformedBase64(String),

    #[error("invalid key length for {algorithm}: got {len} bytes")]
    InvalidKeyLength { algorithm: Algorithm, len: usize },

    #[error("invalid iv length for {mode} mode: got {len} bytes, expected {expected}")]
    InvalidIvLength { mode: Mode, len: usize, expected: String },

    #[error("{}{reason}", .line.map(|l| format!("line {l}: ")).unwrap_or_default())]
    CryptoExecution { line: Option<usize>, reason: String },

    #[error("{}: {reason}", .path.display())]
    FileCrypto { path: PathBuf, reason: String },

    #[error("a job is already running")]
    Busy,

    #[error("job ended without delivering a result")]
    JobLost,
}

impl CryptoError {
    /// Shorthand for an execution failure that is not tied to a line.
    pub fn execution(reason: impl Into<String>) -> Self {
        Self::CryptoExecution { line: None, reason: reason.into() }
    }

    /// Tags an execution failure with the line it came from.
    ///
    /// Errors of other kinds are wrapped so the line index is never lost.
    #[must_use]
    pub fn at_line(self, index: usize) -> Self {
        match self {
            Self::CryptoExecution { reason, .. } => Self::CryptoExecution { line: Some(index), reason },
            other => Self::CryptoExecution { line: Some(index), reason: other.to_string() },
        }
    }

    /// Tags any failure with the file it came from.
    pub fn for_file(self, path: impl Into<PathBuf>) -> Self {
        match self {
            Self::FileCrypto { .. } => self,
            other => Self::FileCrypto { path: path.into(), reason: other.to_string() },
        }
    }
}

impl From<std::io::Error> for CryptoError {
    fn from(err: std::io::Error) -> Self {
        Self::execution(err.to_string())
    }
}
