//! Cipher configuration resolution.
//!
//! A transform is the triple `ALGORITHM/MODE/PADDING`. The three parts are
//! closed enumerations; their display names are an external contract and
//! must stay byte-identical (`AES/GCM/NoPadding`, `DES/CBC/PKCS5Padding`).
//!
//! [`CipherConfig`] can only be obtained through validation, so an
//! incompatible triple never reaches a cipher.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use strum::{EnumString, IntoStaticStr};

use crate::error::{CryptoError, Result};

/// Supported block cipher algorithms, in selector order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumString, IntoStaticStr)]
#[strum(ascii_case_insensitive)]
pub enum Algorithm {
    #[strum(serialize = "DES")]
    Des,
    #[strum(serialize = "DESEDE")]
    DesEde,
    #[strum(serialize = "AES")]
    Aes,
    #[strum(serialize = "SM4")]
    Sm4,
    #[strum(serialize = "Blowfish")]
    Blowfish,
    #[strum(serialize = "Twofish")]
    Twofish,
    #[strum(serialize = "Threefish-256")]
    Threefish256,
    #[strum(serialize = "Threefish-512")]
    Threefish512,
    #[strum(serialize = "Threefish-1024")]
    Threefish1024,
    #[strum(serialize = "RC2")]
    Rc2,
    #[strum(serialize = "RC5")]
    Rc5,
    #[strum(serialize = "RC6")]
    Rc6,
    #[strum(serialize = "Camellia")]
    Camellia,
    #[strum(serialize = "CAST5")]
    Cast5,
    #[strum(serialize = "CAST6")]
    Cast6,
    #[strum(serialize = "ARIA")]
    Aria,
    #[strum(serialize = "Skipjack")]
    Skipjack,
    #[strum(serialize = "Serpent")]
    Serpent,
    #[strum(serialize = "DSTU7624")]
    Dstu7624,
    #[strum(serialize = "IDEA")]
    Idea,
    #[strum(serialize = "SEED")]
    Seed,
    #[strum(serialize = "TEA")]
    Tea,
    #[strum(serialize = "XTEA")]
    Xtea,
}

impl Algorithm {
    /// All algorithms in their fixed selector order.
    pub const ALL: &'static [Self] = &[
        Self::Des,
        Self::DesEde,
        Self::Aes,
        Self::Sm4,
        Self::Blowfish,
        Self::Twofish,
        Self::Threefish256,
        Self::Threefish512,
        Self::Threefish1024,
        Self::Rc2,
        Self::Rc5,
        Self::Rc6,
        Self::Camellia,
        Self::Cast5,
        Self::Cast6,
        Self::Aria,
        Self::Skipjack,
        Self::Serpent,
        Self::Dstu7624,
        Self::Idea,
        Self::Seed,
        Self::Tea,
        Self::Xtea,
    ];

    /// The canonical name used in transform strings.
    #[inline]
    pub fn name(self) -> &'static str {
        self.into()
    }

    /// Block size in bytes.
    pub fn block_size(self) -> usize {
        match self {
            Self::Des | Self::DesEde | Self::Blowfish | Self::Rc2 | Self::Rc5 | Self::Cast5 | Self::Skipjack | Self::Idea | Self::Tea | Self::Xtea => 8,
            Self::Threefish256 => 32,
            Self::Threefish512 => 64,
            Self::Threefish1024 => 128,
            Self::Aes | Self::Sm4 | Self::Twofish | Self::Rc6 | Self::Camellia | Self::Cast6 | Self::Aria | Self::Serpent | Self::Dstu7624 | Self::Seed => 16,
        }
    }
}

impl Default for Algorithm {
    fn default() -> Self {
        Self::Aes
    }
}

impl Display for Algorithm {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Supported block cipher modes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, EnumString, IntoStaticStr)]
#[strum(ascii_case_insensitive)]
pub enum Mode {
    #[default]
    #[strum(serialize = "CBC")]
    Cbc,
    #[strum(serialize = "ECB")]
    Ecb,
    #[strum(serialize = "CFB")]
    Cfb,
    #[strum(serialize = "OFB")]
    Ofb,
    #[strum(serialize = "CTR")]
    Ctr,
    #[strum(serialize = "GCM")]
    Gcm,
    #[strum(serialize = "CCM")]
    Ccm,
    #[strum(serialize = "EAX")]
    Eax,
    #[strum(serialize = "OCB")]
    Ocb,
}

impl Mode {
    pub const ALL: &'static [Self] = &[Self::Cbc, Self::Ecb, Self::Cfb, Self::Ofb, Self::Ctr, Self::Gcm, Self::Ccm, Self::Eax, Self::Ocb];

    #[inline]
    pub fn name(self) -> &'static str {
        self.into()
    }

    /// Authenticated modes: a tag is appended and checked.
    #[inline]
    pub fn is_aead(self) -> bool {
        matches!(self, Self::Gcm | Self::Ccm | Self::Eax | Self::Ocb)
    }

    /// Modes that turn the block cipher into a keystream.
    #[inline]
    pub fn is_stream(self) -> bool {
        matches!(self, Self::Cfb | Self::Ofb | Self::Ctr)
    }

    /// Whether the mode consumes an IV or nonce. ECB ignores one if given.
    #[inline]
    pub fn requires_iv(self) -> bool {
        !matches!(self, Self::Ecb)
    }

    /// Modes whose construction is only defined over 128-bit blocks.
    #[inline]
    pub fn requires_128_bit_block(self) -> bool {
        matches!(self, Self::Gcm | Self::Ccm | Self::Ocb)
    }
}

impl Display for Mode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Supported padding schemes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, EnumString, IntoStaticStr)]
#[strum(ascii_case_insensitive)]
pub enum Padding {
    #[default]
    #[strum(serialize = "PKCS5Padding")]
    Pkcs5,
    #[strum(serialize = "PKCS7Padding")]
    Pkcs7,
    #[strum(serialize = "ISO10126Padding")]
    Iso10126,
    #[strum(serialize = "ZeroBytePadding")]
    ZeroByte,
    #[strum(serialize = "NoPadding")]
    NoPadding,
    #[strum(serialize = "TBCPadding")]
    Tbc,
    #[strum(serialize = "X923Padding")]
    X923,
    #[strum(serialize = "ISO7816d4Padding")]
    Iso7816d4,
    #[strum(serialize = "ISO10126d2Padding")]
    Iso10126d2,
}

impl Padding {
    pub const ALL: &'static [Self] =
        &[Self::Pkcs5, Self::Pkcs7, Self::Iso10126, Self::ZeroByte, Self::NoPadding, Self::Tbc, Self::X923, Self::Iso7816d4, Self::Iso10126d2];

    #[inline]
    pub fn name(self) -> &'static str {
        self.into()
    }
}

impl Display for Padding {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A validated algorithm/mode/padding triple.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CipherConfig {
    algorithm: Algorithm,
    mode: Mode,
    padding: Padding,
}

impl CipherConfig {
    /// Validates a typed triple.
    ///
    /// # Errors
    ///
    /// - [`CryptoError::IncompatibleModePadding`] when an AEAD or stream mode
    ///   is paired with anything but `NoPadding`.
    /// - [`CryptoError::IncompatibleModeAlgorithm`] when GCM, CCM or OCB is
    ///   paired with a cipher whose block is not 16 bytes.
    pub fn new(algorithm: Algorithm, mode: Mode, padding: Padding) -> Result<Self> {
        if (mode.is_aead() || mode.is_stream()) && padding != Padding::NoPadding {
            return Err(CryptoError::IncompatibleModePadding { mode, padding });
        }

        let block_size = algorithm.block_size();
        if mode.requires_128_bit_block() && block_size != 16 {
            return Err(CryptoError::IncompatibleModeAlgorithm { mode, algorithm, block_size });
        }

        Ok(Self { algorithm, mode, padding })
    }

    /// Resolves selector names into a validated configuration.
    ///
    /// Names are matched case-insensitively; the canonical casing is
    /// restored in [`CipherConfig::transform`].
    pub fn resolve(algorithm: &str, mode: &str, padding: &str) -> Result<Self> {
        let algorithm = Algorithm::from_str(algorithm.trim()).map_err(|_| CryptoError::UnsupportedAlgorithm(algorithm.to_owned()))?;
        let mode = Mode::from_str(mode.trim()).map_err(|_| CryptoError::UnsupportedMode(mode.to_owned()))?;
        let padding = Padding::from_str(padding.trim()).map_err(|_| CryptoError::UnsupportedPadding(padding.to_owned()))?;

        let config = Self::new(algorithm, mode, padding)?;
        tracing::debug!(transform = %config, "resolved cipher configuration");
        Ok(config)
    }

    #[inline]
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    #[inline]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    #[inline]
    pub fn padding(&self) -> Padding {
        self.padding
    }

    /// The canonical `ALGORITHM/MODE/PADDING` string.
    pub fn transform(&self) -> String {
        self.to_string()
    }
}

impl Default for CipherConfig {
    fn default() -> Self {
        Self { algorithm: Algorithm::default(), mode: Mode::default(), padding: Padding::default() }
    }
}

impl Display for CipherConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.algorithm, self.mode, self.padding)
    }
}

impl FromStr for CipherConfig {
    type Err = CryptoError;

    /// Parses a full transform string such as `AES/CBC/PKCS5Padding`.
    fn from_str(transform: &str) -> Result<Self> {
        let mut parts = transform.splitn(3, '/');
        let algorithm = parts.next().unwrap_or_default();
        let mode = parts.next().ok_or_else(|| CryptoError::UnsupportedMode(String::new()))?;
        let padding = parts.next().ok_or_else(|| CryptoError::UnsupportedPadding(String::new()))?;
        Self::resolve(algorithm, mode, padding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        assert_eq!(CipherConfig::default().transform(), "AES/CBC/PKCS5Padding");
    }

    #[test]
    fn test_canonical_strings() {
        assert_eq!(CipherConfig::resolve("AES", "GCM", "NoPadding").unwrap().transform(), "AES/GCM/NoPadding");
        assert_eq!(CipherConfig::resolve("DES", "CBC", "PKCS5Padding").unwrap().transform(), "DES/CBC/PKCS5Padding");
        assert_eq!(CipherConfig::resolve("threefish-512", "ecb", "iso7816d4padding").unwrap().transform(), "Threefish-512/ECB/ISO7816d4Padding");
    }

    #[test]
    fn test_every_compatible_triple_resolves() {
        let mut resolved = 0;
        for &algorithm in Algorithm::ALL {
            for &mode in Mode::ALL {
                for &padding in Padding::ALL {
                    let padding_ok = !(mode.is_aead() || mode.is_stream()) || padding == Padding::NoPadding;
                    let block_ok = !mode.requires_128_bit_block() || algorithm.block_size() == 16;
                    let result = CipherConfig::resolve(algorithm.name(), mode.name(), padding.name());
                    if padding_ok && block_ok {
                        let config = result.unwrap();
                        assert_eq!(config.transform(), format!("{}/{}/{}", algorithm.name(), mode.name(), padding.name()));
                        resolved += 1;
                    } else {
                        assert!(result.is_err());
                    }
                }
            }
        }
        assert!(resolved > 0);
    }

    #[test]
    fn test_aead_rejects_padding() {
        for mode in [Mode::Gcm, Mode::Ccm, Mode::Eax, Mode::Ocb] {
            for &padding in Padding::ALL.iter().filter(|p| **p != Padding::NoPadding) {
                let err = CipherConfig::new(Algorithm::Aes, mode, padding).unwrap_err();
                assert!(matches!(err, CryptoError::IncompatibleModePadding { .. }), "{mode}/{padding}");
            }
        }
    }

    #[test]
    fn test_stream_modes_reject_padding() {
        let err = CipherConfig::resolve("AES", "CTR", "PKCS7Padding").unwrap_err();
        assert!(matches!(err, CryptoError::IncompatibleModePadding { mode: Mode::Ctr, padding: Padding::Pkcs7 }));
    }

    #[test]
    fn test_block_size_requirement() {
        let err = CipherConfig::resolve("DES", "GCM", "NoPadding").unwrap_err();
        assert!(matches!(err, CryptoError::IncompatibleModeAlgorithm { block_size: 8, .. }));
        assert!(CipherConfig::resolve("DES", "EAX", "NoPadding").is_ok());
    }

    #[test]
    fn test_unknown_names() {
        assert!(matches!(CipherConfig::resolve("ROT13", "CBC", "NoPadding"), Err(CryptoError::UnsupportedAlgorithm(_))));
        assert!(matches!(CipherConfig::resolve("AES", "XTS", "NoPadding"), Err(CryptoError::UnsupportedMode(_))));
        assert!(matches!(CipherConfig::resolve("AES", "CBC", "PKCS1Padding"), Err(CryptoError::UnsupportedPadding(_))));
    }

    #[test]
    fn test_ecb_has_no_iv() {
        assert!(!Mode::Ecb.requires_iv());
        assert!(Mode::ALL.iter().filter(|m| **m != Mode::Ecb).all(|m| m.requires_iv()));
    }

    #[test]
    fn test_parse_transform_string() {
        let config: CipherConfig = "SM4/OFB/NoPadding".parse().unwrap();
        assert_eq!(config.algorithm(), Algorithm::Sm4);
        assert_eq!(config.mode(), Mode::Ofb);
        assert!("AES/CBC".parse::<CipherConfig>().is_err());
    }

    #[test]
    fn test_selector_order() {
        assert_eq!(Algorithm::ALL.len(), 23);
        assert_eq!(Algorithm::ALL[2], Algorithm::Aes);
        assert_eq!(Mode::ALL[0], Mode::Cbc);
        assert_eq!(Padding::ALL[0], Padding::Pkcs5);
    }
}
