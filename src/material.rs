//! Key and IV material decoding.
//!
//! Key and IV text arrive from the caller in one of three encodings and are
//! decoded independently into zeroizing buffers. Decoding is pure: the same
//! text and encoding always yield the same bytes.
//!
//! Length checks are not done here. An empty buffer is a valid decode
//! result; the cipher decides whether it can use it.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use strum::{EnumString, IntoStaticStr};

use crate::charset::Charset;
use crate::error::{CryptoError, Result};
use crate::secret::SecretBytes;

/// Textual representation of key or IV material.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, EnumString, IntoStaticStr)]
#[strum(ascii_case_insensitive, serialize_all = "lowercase")]
pub enum MaterialEncoding {
    /// The text itself, converted with the active charset.
    #[default]
    Raw,
    Hex,
    Base64,
}

impl MaterialEncoding {
    pub const ALL: &'static [Self] = &[Self::Raw, Self::Hex, Self::Base64];

    #[inline]
    pub fn name(self) -> &'static str {
        self.into()
    }
}

impl std::fmt::Display for MaterialEncoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Decodes `text` under `encoding`.
///
/// # Errors
///
/// - [`CryptoError::MalformedHex`] for odd-length input or non-hex digits.
/// - [`CryptoError::MalformedBase64`] for invalid base64.
///
/// Error messages carry positions, never the offending characters.
pub fn decode(text: &str, encoding: MaterialEncoding, charset: Charset) -> Result<SecretBytes> {
    match encoding {
        MaterialEncoding::Raw => Ok(SecretBytes::from_vec(charset.encode(text))),
        MaterialEncoding::Hex => decode_hex(text.trim()).map(SecretBytes::from_vec),
        MaterialEncoding::Base64 => decode_base64(text.trim()).map(SecretBytes::from_vec),
    }
}

fn decode_hex(text: &str) -> Result<Vec<u8>> {
    hex::decode(text).map_err(|e| {
        let reason = match e {
            hex::FromHexError::OddLength => "odd number of digits".to_owned(),
            hex::FromHexError::InvalidHexCharacter { index, .. } => format!("invalid digit at position {index}"),
            hex::FromHexError::InvalidStringLength => "invalid length".to_owned(),
        };
        CryptoError::MalformedHex(reason)
    })
}

fn decode_base64(text: &str) -> Result<Vec<u8>> {
    STANDARD.decode(text).map_err(|e| {
        let reason = match e {
            base64::DecodeError::InvalidByte(offset, _) => format!("invalid character at offset {offset}"),
            base64::DecodeError::InvalidLength(len) => format!("invalid length {len}"),
            base64::DecodeError::InvalidLastSymbol(offset, _) => format!("invalid trailing bits at offset {offset}"),
            base64::DecodeError::InvalidPadding => "invalid padding".to_owned(),
        };
        CryptoError::MalformedBase64(reason)
    })
}

/// Decoded key bytes plus the encoding they came from.
#[derive(Clone, Debug)]
pub struct KeyMaterial {
    bytes: SecretBytes,
    encoding: MaterialEncoding,
}

impl KeyMaterial {
    pub fn decode(text: &str, encoding: MaterialEncoding, charset: Charset) -> Result<Self> {
        Ok(Self { bytes: decode(text, encoding, charset)?, encoding })
    }

    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self { bytes: SecretBytes::new(bytes), encoding: MaterialEncoding::Raw }
    }

    #[inline]
    pub fn expose(&self) -> &[u8] {
        self.bytes.expose_secret()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    #[inline]
    pub fn encoding(&self) -> MaterialEncoding {
        self.encoding
    }
}

/// Decoded IV (or nonce) bytes plus the encoding they came from.
#[derive(Clone, Debug)]
pub struct IvMaterial {
    bytes: SecretBytes,
    encoding: MaterialEncoding,
}

impl IvMaterial {
    pub fn decode(text: &str, encoding: MaterialEncoding, charset: Charset) -> Result<Self> {
        Ok(Self { bytes: decode(text, encoding, charset)?, encoding })
    }

    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self { bytes: SecretBytes::new(bytes), encoding: MaterialEncoding::Raw }
    }

    /// No IV, for ECB.
    pub fn empty() -> Self {
        Self::from_bytes(&[])
    }

    #[inline]
    pub fn expose(&self) -> &[u8] {
        self.bytes.expose_secret()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    #[inline]
    pub fn encoding(&self) -> MaterialEncoding {
        self.encoding
    }
}
