//! File encryption and decryption.
//!
//! Each input file is streamed through the cipher into a sibling output
//! file named after it:
//!
//! - encrypt: `<input>.enc`
//! - decrypt: `<input>` minus one trailing `.enc`, plus `.dec`
//!
//! Output is written to a hidden staging sibling (`.<output>.tmp`) and only
//! renamed into place once the cipher has finished, so authenticated modes
//! never leave unverified plaintext under the final name.
//!
//! Files are processed one at a time in the order given. A file that fails
//! has its staging file removed and is reported with its path; the batch
//! then moves on to the next file.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::cipher::Cipher;
use crate::config::{CHUNK_SIZE, DECRYPTED_SUFFIX, ENCRYPTED_SUFFIX};
use crate::error::{CryptoError, Result};
use crate::types::{CryptoJobRequest, Direction, FileOutput, FileReport, JobInput};
use crate::worker::Worker;

/// An input file and the naming rules around it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct File {
    path: PathBuf,
}

impl File {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns `true` if the name ends with the encrypted suffix.
    pub fn is_encrypted(&self) -> bool {
        self.path.as_os_str().to_string_lossy().ends_with(ENCRYPTED_SUFFIX)
    }

    /// Path of the sibling file produced in `direction`.
    pub fn output_path(&self, direction: Direction) -> PathBuf {
        let name = self.path.as_os_str();
        let mut out = match direction {
            Direction::Encrypt => name.to_os_string(),
            Direction::Decrypt => match name.to_str().and_then(|s| s.strip_suffix(ENCRYPTED_SUFFIX)) {
                Some(stem) => OsString::from(stem),
                None => name.to_os_string(),
            },
        };
        out.push(match direction {
            Direction::Encrypt => ENCRYPTED_SUFFIX,
            Direction::Decrypt => DECRYPTED_SUFFIX,
        });
        PathBuf::from(out)
    }

    /// Hidden sibling of `output` that receives data until the run succeeds.
    pub fn staging_path(output: &Path) -> PathBuf {
        let mut name = OsString::from(".");
        name.push(output.file_name().unwrap_or_default());
        name.push(".tmp");
        output.with_file_name(name)
    }

    /// Checks that the path names an existing regular file and returns its
    /// length.
    pub async fn validate(&self) -> Result<u64> {
        let metadata = tokio::fs::metadata(&self.path).await.map_err(|err| CryptoError::execution(format!("cannot open file: {err}")))?;
        if !metadata.is_file() {
            return Err(CryptoError::execution("not a regular file"));
        }
        Ok(metadata.len())
    }
}

/// Splits a newline-separated path list, skipping blank lines.
pub fn parse_path_list(text: &str) -> Vec<PathBuf> {
    text.lines().map(str::trim).filter(|line| !line.is_empty()).map(PathBuf::from).collect()
}

/// A cipher bound to a direction, ready to process files.
pub struct FilePipeline {
    cipher: Cipher,
    direction: Direction,
    chunk_size: usize,
}

impl FilePipeline {
    #[inline]
    pub fn new(cipher: Cipher, direction: Direction) -> Self {
        Self { cipher, direction, chunk_size: CHUNK_SIZE }
    }

    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Processes one file.
    ///
    /// # Errors
    ///
    /// Always a [`CryptoError::FileCrypto`] naming `path`. Nothing is left
    /// at the output path or the staging path when an error is returned.
    pub async fn process_file(&self, path: &Path) -> Result<FileReport> {
        let file = File::new(path);
        let output = file.output_path(self.direction);
        let staging = File::staging_path(&output);

        let (input, input_len, writer) = Self::open(&file, &staging).await.map_err(|err| err.for_file(path))?;
        if self.direction == Direction::Decrypt && !file.is_encrypted() {
            debug!(path = %path.display(), "decrypting a file without the encrypted suffix");
        }

        let worker = Worker::new(self.cipher.clone(), self.direction, input_len).with_chunk_size(self.chunk_size);
        let result = match worker.process(input, writer).await {
            Ok(throughput) => tokio::fs::rename(&staging, &output)
                .await
                .map(|()| throughput)
                .map_err(|err| CryptoError::execution(format!("cannot move output into place: {err}"))),
            Err(err) => Err(err),
        };

        match result {
            Ok(throughput) => {
                debug!(path = %path.display(), written = throughput.written, "file done");
                Ok(FileReport { input: path.to_path_buf(), output, bytes_read: throughput.consumed, bytes_written: throughput.written })
            }
            Err(err) => {
                if let Err(remove) = tokio::fs::remove_file(&staging).await {
                    warn!(path = %staging.display(), error = %remove, "failed to remove staging output");
                }
                Err(err.for_file(path))
            }
        }
    }

    async fn open(file: &File, staging: &Path) -> Result<(tokio::fs::File, u64, tokio::fs::File)> {
        let len = file.validate().await?;
        let input = tokio::fs::File::open(file.path()).await.map_err(|err| CryptoError::execution(format!("cannot open file: {err}")))?;
        let writer = tokio::fs::File::create(staging).await.map_err(|err| CryptoError::execution(format!("cannot create {}: {err}", staging.display())))?;
        Ok((input, len, writer))
    }

    /// Processes every path in order, isolating failures per file.
    pub async fn run(&self, paths: &[PathBuf]) -> FileOutput {
        let mut output = FileOutput::default();

        for path in paths {
            match self.process_file(path).await {
                Ok(report) => {
                    info!(input = %report.input.display(), output = %report.output.display(), "{}", self.direction.progress_label());
                    output.reports.push(report);
                }
                Err(err) => {
                    warn!(error = %err, "file failed");
                    output.failures.push(err);
                }
            }
        }

        output
    }
}

/// Runs a file job end to end.
///
/// # Errors
///
/// Returns the job-fatal error when the cipher cannot be built from the
/// request, or [`CryptoError::execution`] if the request carries text.
pub async fn run(request: &CryptoJobRequest) -> Result<FileOutput> {
    let JobInput::Files(paths) = &request.input else {
        return Err(CryptoError::execution("file pipeline received a text job"));
    };

    let cipher = Cipher::new(request.config, &request.key, &request.iv)?;
    Ok(FilePipeline::new(cipher, request.direction).run(paths).await)
}
