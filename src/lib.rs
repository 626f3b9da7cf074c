//! symcrypt - a configurable symmetric cipher executor.
//!
//! Runs user-selected `ALGORITHM/MODE/PADDING` transforms over text or
//! files:
//! - 23 block ciphers, from DES and TEA through AES, Camellia and Threefish
//! - ECB, CBC, CFB, OFB and CTR, plus GCM, CCM, EAX and OCB
//! - nine padding schemes and raw, hex or base64 key/IV material
//! - per-line text batches and streamed file batches with per-item failures
//!
//! The engine executes exactly what it is asked to, including legacy and
//! weak options. It does not pick secure defaults.

pub mod charset;
pub mod cipher;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod file;
pub mod material;
pub mod padding;
pub mod secret;
pub mod text;
pub mod transform;
pub mod types;
pub mod worker;

pub use charset::Charset;
pub use cipher::Cipher;
pub use coordinator::{Coordinator, JobHandle};
pub use error::{CryptoError, Result};
pub use material::{IvMaterial, KeyMaterial, MaterialEncoding};
pub use transform::{Algorithm, CipherConfig, Mode, Padding};
pub use types::{CryptoJobRequest, CryptoJobResult, Direction, FileOutput, FileReport, JobInput, Target, TextOutput};
