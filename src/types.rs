//! Common type definitions for the engine.
//!
//! Provides the request/result records exchanged with callers and the chunk
//! records passed between the file pipeline stages.
//!
//! # Overview
//!
//! - [`Direction`]: encryption or decryption
//! - [`Target`]: whether a job works on text or files
//! - [`CryptoJobRequest`] / [`CryptoJobResult`]: one job in, one outcome out
//! - [`Task`] / [`TaskResult`]: a chunk of file data and its processed form

use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

use crate::charset::Charset;
use crate::error::CryptoError;
use crate::material::{IvMaterial, KeyMaterial};
use crate::transform::CipherConfig;

/// Which way data flows through the cipher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Direction {
    #[default]
    Encrypt,

    Decrypt,
}

impl Direction {
    /// Returns a human-readable label for the direction.
    #[inline]
    pub fn label(self) -> &'static str {
        match self {
            Self::Encrypt => "Encrypt",
            Self::Decrypt => "Decrypt",
        }
    }

    /// Progress label used in log lines while the direction runs.
    #[inline]
    pub fn progress_label(self) -> &'static str {
        match self {
            Self::Encrypt => "Encrypting...",
            Self::Decrypt => "Decrypting...",
        }
    }
}

impl Display for Direction {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// What a job operates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Text,
    File,
}

impl Target {
    #[inline]
    pub fn label(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::File => "file",
        }
    }
}

impl Display for Target {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// The payload of a job. Exactly one kind of input per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobInput {
    Text(String),
    Files(Vec<PathBuf>),
}

impl JobInput {
    #[inline]
    pub fn target(&self) -> Target {
        match self {
            Self::Text(_) => Target::Text,
            Self::Files(_) => Target::File,
        }
    }
}

/// Everything needed to run one job.
///
/// Key and IV material is owned by the request and dropped (and wiped) with
/// it once the job finishes.
#[derive(Debug, Clone)]
pub struct CryptoJobRequest {
    pub config: CipherConfig,
    pub key: KeyMaterial,
    pub iv: IvMaterial,
    pub charset: Charset,
    pub direction: Direction,
    pub input: JobInput,

    /// Text jobs only: treat every line as its own message.
    pub per_line: bool,

    /// Caller-side preference carried through untouched.
    pub auto_copy_result: bool,
}

impl CryptoJobRequest {
    /// A text job with the default charset, whole input as one message.
    pub fn text(config: CipherConfig, key: KeyMaterial, iv: IvMaterial, direction: Direction, text: impl Into<String>) -> Self {
        Self::with_input(config, key, iv, direction, JobInput::Text(text.into()))
    }

    /// A file job over `paths`, processed in the given order.
    pub fn files(config: CipherConfig, key: KeyMaterial, iv: IvMaterial, direction: Direction, paths: Vec<PathBuf>) -> Self {
        Self::with_input(config, key, iv, direction, JobInput::Files(paths))
    }

    fn with_input(config: CipherConfig, key: KeyMaterial, iv: IvMaterial, direction: Direction, input: JobInput) -> Self {
        Self { config, key, iv, charset: Charset::default(), direction, input, per_line: false, auto_copy_result: false }
    }

    #[must_use]
    pub fn with_charset(mut self, charset: Charset) -> Self {
        self.charset = charset;
        self
    }

    #[must_use]
    pub fn with_per_line(mut self, per_line: bool) -> Self {
        self.per_line = per_line;
        self
    }

    #[inline]
    pub fn target(&self) -> Target {
        self.input.target()
    }

    /// One-line description of the job, safe to show or log.
    pub fn summary(&self) -> String {
        format!("Cipher: {}   charset: {}  file mode:  {} ", self.config.transform(), self.charset, self.target() == Target::File)
    }
}

/// Output of a text job.
///
/// `text` holds the successful lines in input order, joined with the
/// platform line separator. Lines that failed are left out and reported in
/// `failures`, each tagged with its zero-based line index.
#[derive(Debug, Default)]
pub struct TextOutput {
    pub text: String,
    pub failures: Vec<CryptoError>,
}

/// One successfully written output file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    pub input: PathBuf,
    pub output: PathBuf,
    pub bytes_read: u64,
    pub bytes_written: u64,
}

/// Output of a file job: the files that succeeded, in input order, and a
/// [`CryptoError::FileCrypto`] for every file that did not.
#[derive(Debug, Default)]
pub struct FileOutput {
    pub reports: Vec<FileReport>,
    pub failures: Vec<CryptoError>,
}

impl FileOutput {
    pub fn output_paths(&self) -> Vec<&Path> {
        self.reports.iter().map(|report| report.output.as_path()).collect()
    }
}

/// The terminal outcome of a job that got past configuration.
#[derive(Debug)]
pub enum CryptoJobResult {
    Text(TextOutput),
    Files(FileOutput),
}

impl CryptoJobResult {
    /// Item-level failures that did not stop the job.
    pub fn failures(&self) -> &[CryptoError] {
        match self {
            Self::Text(output) => &output.failures,
            Self::Files(output) => &output.failures,
        }
    }

    #[inline]
    pub fn is_complete(&self) -> bool {
        self.failures().is_empty()
    }
}

/// A chunk of file data travelling from the reader to the executor.
pub struct Task {
    pub data: Vec<u8>,

    /// Sequential position of the chunk within its file.
    pub index: u64,
}

/// Result of processing a [`Task`].
pub struct TaskResult {
    /// Processed bytes (empty if an error occurred).
    pub data: Vec<u8>,

    /// Error message if processing failed, `None` on success.
    pub error: Option<Box<str>>,

    pub index: u64,

    /// Size of the input chunk in bytes.
    pub size: usize,
}

impl TaskResult {
    #[inline]
    pub fn ok(index: u64, data: Vec<u8>, size: usize) -> Self {
        Self { data, error: None, index, size }
    }

    #[inline]
    pub fn err(index: u64, error: &CryptoError) -> Self {
        Self { data: Vec::new(), error: Some(error.to_string().into_boxed_str()), index, size: 0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(input: JobInput) -> CryptoJobRequest {
        let config = CipherConfig::default();
        let key = KeyMaterial::from_bytes(b"0123456789abcdef");
        let iv = IvMaterial::from_bytes(b"abcdef9876543210");
        match input {
            JobInput::Text(text) => CryptoJobRequest::text(config, key, iv, Direction::Encrypt, text),
            JobInput::Files(paths) => CryptoJobRequest::files(config, key, iv, Direction::Encrypt, paths),
        }
    }

    #[test]
    fn test_summary_line() {
        let text = request(JobInput::Text("hi".into()));
        assert_eq!(text.summary(), "Cipher: AES/CBC/PKCS5Padding   charset: UTF-8  file mode:  false ");

        let files = request(JobInput::Files(vec![PathBuf::from("/tmp/a")])).with_charset(Charset::Gbk);
        assert_eq!(files.summary(), "Cipher: AES/CBC/PKCS5Padding   charset: GBK  file mode:  true ");
    }

    #[test]
    fn test_summary_and_debug_hide_material() {
        let request = request(JobInput::Text("hi".into()));
        assert!(!request.summary().contains("0123456789abcdef"));
        assert!(!format!("{request:?}").contains("0123456789abcdef"));
    }

    #[test]
    fn test_target_follows_input() {
        assert_eq!(request(JobInput::Text(String::new())).target(), Target::Text);
        assert_eq!(request(JobInput::Files(Vec::new())).target(), Target::File);
    }

    #[test]
    fn test_direction_labels() {
        assert_eq!(Direction::Encrypt.to_string(), "Encrypt");
        assert_eq!(Direction::Encrypt.progress_label(), "Encrypting...");
        assert_eq!(Direction::Decrypt.progress_label(), "Decrypting...");
    }

    #[test]
    fn test_result_failures() {
        let clean = CryptoJobResult::Text(TextOutput { text: "ab".into(), failures: Vec::new() });
        assert!(clean.is_complete());

        let files = CryptoJobResult::Files(FileOutput { reports: Vec::new(), failures: vec![CryptoError::execution("x").for_file("/tmp/b")] });
        assert_eq!(files.failures().len(), 1);
        assert!(!files.is_complete());
    }
}
