//! # Cipher Execution
//!
//! Turns a validated [`CipherConfig`] plus key and IV material into an
//! executable [`Cipher`].
//!
//! ## Layers
//!
//! - **Primitive**: a keyed block cipher held in [`backend::Keyed`]. Most
//!   algorithms come from RustCrypto crates; TEA, XTEA, RC5, RC6, Skipjack,
//!   SEED and Kalyna are implemented here on the same `cipher` traits.
//! - **Mode**: ECB, CBC, CFB, OFB, CTR, GCM, CCM, EAX and OCB from the
//!   RustCrypto mode crates, instantiated per concrete primitive.
//! - **Transform**: a streaming [`Transform`] for one direction, used for
//!   both in-memory messages and chunked files.

/// Implements the `cipher` block traits for a primitive with inherent
/// `expand`, `encrypt_bytes` and `decrypt_bytes`.
macro_rules! block_cipher {
    ($name:ident, block: $block:ty, key: $key:ty, key_len: $len:pat) => {
        impl ::cipher::BlockCipher for $name {}

        impl ::cipher::KeySizeUser for $name {
            type KeySize = $key;
        }

        impl ::cipher::KeyInit for $name {
            fn new(key: &::cipher::Key<Self>) -> Self {
                Self::expand(key)
            }

            fn new_from_slice(key: &[u8]) -> Result<Self, ::cipher::InvalidLength> {
                if matches!(key.len(), $len) { Ok(Self::expand(key)) } else { Err(::cipher::InvalidLength) }
            }
        }

        ::cipher::impl_simple_block_encdec!(
            $name, $block, state, block,
            encrypt: {
                let mut bytes = block.clone_in();
                state.encrypt_bytes(&mut bytes);
                *block.get_out() = bytes;
            }
            decrypt: {
                let mut bytes = block.clone_in();
                state.decrypt_bytes(&mut bytes);
                *block.get_out() = bytes;
            }
        );
    };
}

pub(crate) mod backend;
mod kalyna;
pub mod mode;
mod rc5;
mod seed;
mod skipjack;
mod tea;

use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use crate::error::Result;
use crate::material::{IvMaterial, KeyMaterial};
use crate::secret::SecretBytes;
use crate::transform::CipherConfig;
use crate::types::Direction;
use backend::Keyed;

/// Incremental encryption or decryption of one message.
///
/// Output of `update` may lag behind its input (padding, a held-back tag);
/// `finish` flushes the rest and performs final checks.
pub trait Transform: Send {
    fn update(&mut self, input: &[u8]) -> Result<Vec<u8>>;

    fn finish(self: Box<Self>) -> Result<Vec<u8>>;
}

/// A configured cipher: keyed primitive, mode, padding and IV.
///
/// Cheap to clone; clones share the key schedule.
#[derive(Clone)]
pub struct Cipher {
    config: CipherConfig,
    keyed: Arc<Keyed>,
    iv: SecretBytes,
}

impl Cipher {
    /// Keys the primitive and checks the IV against the mode.
    ///
    /// # Errors
    ///
    /// - [`CryptoError::InvalidKeyLength`](crate::error::CryptoError::InvalidKeyLength)
    /// - [`CryptoError::InvalidIvLength`](crate::error::CryptoError::InvalidIvLength)
    pub fn new(config: CipherConfig, key: &KeyMaterial, iv: &IvMaterial) -> Result<Self> {
        let keyed = Keyed::new(config.algorithm(), key.expose())?;

        let mode = config.mode();
        mode::check_iv(mode, keyed.block_size(), iv.len())?;
        let iv = if mode.requires_iv() { SecretBytes::new(iv.expose()) } else { SecretBytes::new(&[]) };

        tracing::debug!(transform = %config, block_size = keyed.block_size(), "cipher ready");
        Ok(Self { config, keyed: Arc::new(keyed), iv })
    }

    #[inline]
    pub fn config(&self) -> CipherConfig {
        self.config
    }

    #[inline]
    pub fn block_size(&self) -> usize {
        self.keyed.block_size()
    }

    /// Starts a streaming transform in `direction` over `input_len` bytes.
    ///
    /// Only CCM needs the length up front; other modes ignore it.
    pub fn transform(&self, direction: Direction, input_len: u64) -> Result<Box<dyn Transform>> {
        let keyed = Keyed::clone(&self.keyed);
        mode::build(keyed, self.config.mode(), self.config.padding(), direction, self.iv.expose_secret(), input_len)
    }

    /// Runs a whole message through a fresh transform.
    pub fn apply(&self, direction: Direction, data: &[u8]) -> Result<Vec<u8>> {
        let mut transform = self.transform(direction, data.len() as u64)?;
        let mut out = transform.update(data)?;
        out.extend(transform.finish()?);
        Ok(out)
    }

    #[inline]
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        self.apply(Direction::Encrypt, plaintext)
    }

    #[inline]
    pub fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>> {
        self.apply(Direction::Decrypt, ciphertext)
    }
}

impl Debug for Cipher {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cipher").field("transform", &self.config.transform()).field("iv", &self.iv).finish_non_exhaustive()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::CryptoError;
    use crate::transform::{Algorithm, Mode, Padding};

    pub(crate) fn aes(key: &[u8]) -> Keyed {
        Keyed::new(Algorithm::Aes, key).unwrap()
    }

    fn cipher(transform: &str, key: &[u8], iv: &[u8]) -> Result<Cipher> {
        Cipher::new(transform.parse()?, &KeyMaterial::from_bytes(key), &IvMaterial::from_bytes(iv))
    }

    fn key_for(algorithm: Algorithm) -> Vec<u8> {
        let len = match algorithm {
            Algorithm::Des => 8,
            Algorithm::DesEde => 24,
            Algorithm::Threefish256 => 32,
            Algorithm::Threefish512 => 64,
            Algorithm::Threefish1024 => 128,
            _ => 16,
        };
        (0..len).map(|i| (i * 13 + 1) as u8).collect()
    }

    fn iv_for(mode: Mode, block_size: usize) -> Vec<u8> {
        let len = match mode {
            Mode::Ecb => 0,
            Mode::Gcm | Mode::Ccm | Mode::Ocb => 12,
            _ => block_size,
        };
        (0..len).map(|i| (i * 5 + 2) as u8).collect()
    }

    #[test]
    fn test_aes_cbc_end_to_end() {
        let cipher = cipher("AES/CBC/PKCS5Padding", b"0123456789abcdef", b"abcdef9876543210").unwrap();
        let ct = cipher.encrypt(b"hello world").unwrap();
        assert_eq!(hex::encode(&ct), "4dc2f2b42aab28100de8f7e16a71291b");
        assert_eq!(cipher.decrypt(&ct).unwrap(), b"hello world");
    }

    #[test]
    fn test_triple_des_known_answer() {
        let cipher = cipher("DESEDE/CBC/PKCS5Padding", b"0123456789abcdefghijklmn", b"abcdefgh").unwrap();
        assert_eq!(hex::encode(cipher.encrypt(b"hello world").unwrap()), "6039ae959572cdc7d8f409b4d78699b1");
    }

    #[test]
    fn test_roundtrip_over_every_configuration() {
        let messages: [&[u8]; 4] = [b"", b"x", b"hello world", &[0x5a; 300]];

        for &algorithm in Algorithm::ALL {
            for &mode in Mode::ALL {
                for &padding in Padding::ALL {
                    let Ok(config) = CipherConfig::new(algorithm, mode, padding) else { continue };
                    let iv = iv_for(mode, algorithm.block_size());
                    let cipher = Cipher::new(config, &KeyMaterial::from_bytes(&key_for(algorithm)), &IvMaterial::from_bytes(&iv)).unwrap();

                    for message in messages {
                        let aligned = message.len().is_multiple_of(algorithm.block_size());
                        if padding == Padding::NoPadding && matches!(mode, Mode::Ecb | Mode::Cbc) && !aligned {
                            assert!(cipher.encrypt(message).is_err(), "{config}");
                            continue;
                        }
                        let ct = cipher.encrypt(message).unwrap();
                        assert_eq!(cipher.decrypt(&ct).unwrap(), message, "{config} / {} bytes", message.len());
                    }
                }
            }
        }
    }

    #[test]
    fn test_streaming_equals_one_shot() {
        let data: Vec<u8> = (0..5000u32).map(|i| (i * 31 % 256) as u8).collect();
        for transform in ["AES/CBC/PKCS7Padding", "Blowfish/CTR/NoPadding", "SEED/OFB/NoPadding", "AES/GCM/NoPadding", "XTEA/EAX/NoPadding"] {
            let config: CipherConfig = transform.parse().unwrap();
            let iv = iv_for(config.mode(), config.algorithm().block_size());
            let cipher = Cipher::new(config, &KeyMaterial::from_bytes(&key_for(config.algorithm())), &IvMaterial::from_bytes(&iv)).unwrap();

            let mut streaming = cipher.transform(Direction::Encrypt, data.len() as u64).unwrap();
            let mut out = Vec::new();
            for chunk in data.chunks(997) {
                out.extend(streaming.update(chunk).unwrap());
            }
            out.extend(streaming.finish().unwrap());

            assert_eq!(out, cipher.encrypt(&data).unwrap(), "{transform}");
        }
    }

    #[test]
    fn test_material_errors() {
        assert!(matches!(cipher("AES/CBC/PKCS5Padding", b"short", b"abcdef9876543210"), Err(CryptoError::InvalidKeyLength { len: 5, .. })));
        assert!(matches!(cipher("AES/CBC/PKCS5Padding", b"0123456789abcdef", b"abc"), Err(CryptoError::InvalidIvLength { len: 3, .. })));
        assert!(matches!(cipher("AES/CBC/PKCS5Padding", b"", b"abcdef9876543210"), Err(CryptoError::InvalidKeyLength { len: 0, .. })));
        assert!(cipher("DSTU7624/CBC/PKCS5Padding", b"0123456789abcdef", b"abcdef9876543210").is_ok());
        assert!(matches!(cipher("DSTU7624/CBC/PKCS5Padding", b"0123456789abcdef01234567", b"abcdef9876543210"), Err(CryptoError::InvalidKeyLength { len: 24, .. })));
    }

    #[test]
    fn test_ecb_ignores_iv() {
        let with_iv = cipher("AES/ECB/PKCS5Padding", b"0123456789abcdef", b"whatever").unwrap();
        let without = cipher("AES/ECB/PKCS5Padding", b"0123456789abcdef", b"").unwrap();
        assert_eq!(with_iv.encrypt(b"hello").unwrap(), without.encrypt(b"hello").unwrap());
    }

    #[test]
    fn test_debug_hides_material() {
        let cipher = cipher("AES/CBC/PKCS5Padding", b"0123456789abcdef", b"abcdef9876543210").unwrap();
        let shown = format!("{cipher:?}");
        assert!(shown.contains("AES/CBC/PKCS5Padding"));
        assert!(!shown.contains("abcdef98"));
    }
}
