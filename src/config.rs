//! Engine-wide constants.
//!
//! These values shape the streaming file pipeline and the on-disk naming
//! convention. Output naming is a compatibility contract: files written by
//! one version must be found and decrypted by the next.

/// Suffix appended to every encrypted output file.
///
/// `notes.txt` encrypts to `notes.txt.enc`.
pub const ENCRYPTED_SUFFIX: &str = ".enc";

/// Suffix appended to every decrypted output file.
///
/// One trailing [`ENCRYPTED_SUFFIX`] is stripped first, so
/// `notes.txt.enc` decrypts to `notes.txt.dec`.
pub const DECRYPTED_SUFFIX: &str = ".dec";

/// Size of the chunks the file reader hands to the cipher stage (256 KiB).
///
/// Larger chunks amortize channel overhead; smaller ones bound memory for
/// the non-authenticated modes, which stream chunk by chunk.
pub const CHUNK_SIZE: usize = 256 * 1024;

/// Depth of the bounded channels between the reader, executor and writer.
///
/// Together with [`CHUNK_SIZE`] this caps the bytes in flight per file.
pub const CHANNEL_SIZE: usize = 4;

/// Authentication tag length in bytes for GCM, CCM and OCB.
///
/// EAX tags are one cipher block wide instead.
pub const TAG_SIZE: usize = 16;

/// Separator used to join per-line results.
#[cfg(windows)]
pub const LINE_SEPARATOR: &str = "\r\n";

/// Separator used to join per-line results.
#[cfg(not(windows))]
pub const LINE_SEPARATOR: &str = "\n";
