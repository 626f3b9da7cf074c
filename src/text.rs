//! In-memory text encryption and decryption.
//!
//! Encryption turns charset-encoded text into lowercase hex; decryption
//! takes hex (either case, surrounding whitespace ignored) and returns
//! charset-decoded text.
//!
//! In per-line mode every line is an independent message. Lines run in
//! parallel on the rayon pool and are reassembled in input order; a failing
//! line is reported with its index and never aborts its siblings. Empty
//! lines pass through without touching the cipher; whitespace-only lines
//! are ordinary messages.

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::charset::Charset;
use crate::cipher::Cipher;
use crate::config::LINE_SEPARATOR;
use crate::error::{CryptoError, Result};
use crate::types::{CryptoJobRequest, Direction, JobInput, TextOutput};

/// A cipher bound to a direction and charset, ready to process text.
pub struct TextPipeline {
    cipher: Cipher,
    direction: Direction,
    charset: Charset,
}

impl TextPipeline {
    #[inline]
    pub fn new(cipher: Cipher, direction: Direction, charset: Charset) -> Self {
        Self { cipher, direction, charset }
    }

    /// Processes one message.
    pub fn message(&self, text: &str) -> Result<String> {
        match self.direction {
            Direction::Encrypt => {
                let ciphertext = self.cipher.encrypt(&self.charset.encode(text))?;
                Ok(hex::encode(ciphertext))
            }
            Direction::Decrypt => {
                let ciphertext = hex::decode(text.trim()).map_err(|err| CryptoError::execution(format!("ciphertext is not valid hex: {err}")))?;
                let plaintext = self.cipher.decrypt(&ciphertext)?;
                Ok(self.charset.decode(&plaintext))
            }
        }
    }

    /// Processes `input` as one message, or line by line when `per_line`.
    ///
    /// # Errors
    ///
    /// Without `per_line` a failing message fails the whole call. With it,
    /// failures are collected into [`TextOutput::failures`] instead.
    pub fn run(&self, input: &str, per_line: bool) -> Result<TextOutput> {
        if !per_line {
            let text = self.message(input)?;
            return Ok(TextOutput { text, failures: Vec::new() });
        }

        let outcomes: Vec<(usize, Result<String>)> = input
            .lines()
            .enumerate()
            .collect::<Vec<_>>()
            .into_par_iter()
            .map(|(index, line)| {
                if line.is_empty() {
                    return (index, Ok(String::new()));
                }
                (index, self.message(line).map_err(|err| err.at_line(index)))
            })
            .collect();

        let mut lines = Vec::with_capacity(outcomes.len());
        let mut failures = Vec::new();
        for (index, outcome) in outcomes {
            match outcome {
                Ok(line) => lines.push(line),
                Err(err) => {
                    warn!(line = index, error = %err, "line failed");
                    failures.push(err);
                }
            }
        }

        debug!(lines = lines.len(), failed = failures.len(), "{}", self.direction.progress_label());
        Ok(TextOutput { text: lines.join(LINE_SEPARATOR), failures })
    }
}

/// Runs a text job end to end.
///
/// # Errors
///
/// Returns the job-fatal error when the cipher cannot be built from the
/// request, or [`CryptoError::execution`] if the request carries files.
pub fn run(request: &CryptoJobRequest) -> Result<TextOutput> {
    let JobInput::Text(input) = &request.input else {
        return Err(CryptoError::execution("text pipeline received a file job"));
    };

    let cipher = Cipher::new(request.config, &request.key, &request.iv)?;
    TextPipeline::new(cipher, request.direction, request.charset).run(input, request.per_line)
}
