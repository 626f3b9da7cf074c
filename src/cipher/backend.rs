//! Maps an [`Algorithm`] and key bytes to a keyed block primitive.
//!
//! Every primitive is a concrete `cipher` 0.4 type, so the mode crates are
//! instantiated per algorithm through [`dispatch!`] instead of going through
//! a trait object. Ciphers with no RustCrypto crate live in sibling modules.

use cipher::{BlockSizeUser, InvalidLength, KeyInit};

use super::kalyna::Kalyna;
use super::rc5::{Rc5, Rc6};
use super::seed::Seed;
use super::skipjack::Skipjack;
use super::tea::{Tea, Xtea};
use crate::error::{CryptoError, Result};
use crate::transform::Algorithm;

/// A keyed primitive, one variant per concrete cipher type.
#[derive(Clone)]
pub enum Keyed {
    Aes128(aes::Aes128),
    Aes192(aes::Aes192),
    Aes256(aes::Aes256),
    Des(des::Des),
    TdesEde2(des::TdesEde2),
    TdesEde3(des::TdesEde3),
    Sm4(sm4::Sm4),
    Blowfish(blowfish::Blowfish),
    Twofish(twofish::Twofish),
    Threefish256(threefish::Threefish256),
    Threefish512(threefish::Threefish512),
    Threefish1024(threefish::Threefish1024),
    Rc2(rc2::Rc2),
    Rc5(Rc5),
    Rc6(Rc6),
    Camellia128(camellia::Camellia128),
    Camellia192(camellia::Camellia192),
    Camellia256(camellia::Camellia256),
    Cast5(cast5::Cast5),
    Cast6(cast6::Cast6),
    Aria128(aria::Aria128),
    Aria192(aria::Aria192),
    Aria256(aria::Aria256),
    Skipjack(Skipjack),
    Serpent(serpent::Serpent),
    Kalyna(Kalyna),
    Idea(idea::Idea),
    Seed(Seed),
    Tea(Tea),
    Xtea(Xtea),
}

/// Runs an expression against the concrete primitive inside a [`Keyed`].
///
/// The short form binds every variant to one body. The long form takes a
/// body per block-width family, for modes whose crates only accept some
/// widths:
///
/// - `narrow`: 64-bit blocks
/// - `block`: 128-bit blocks
/// - `wide`: 256-bit blocks
/// - `widest`: 512 and 1024-bit blocks
macro_rules! dispatch {
    ($keyed:expr, $c:ident => $any:expr) => {
        $crate::cipher::backend::dispatch!($keyed, narrow: $c => $any, block: $c => $any, wide: $c => $any, widest: $c => $any)
    };
    ($keyed:expr, narrow: $n:ident => $narrow:expr, block: $b:ident => $block:expr, wide: $w:ident => $wide:expr, widest: $x:ident => $widest:expr $(,)?) => {
        match $keyed {
            $crate::cipher::backend::Keyed::Des($n) => $narrow,
            $crate::cipher::backend::Keyed::TdesEde2($n) => $narrow,
            $crate::cipher::backend::Keyed::TdesEde3($n) => $narrow,
            $crate::cipher::backend::Keyed::Blowfish($n) => $narrow,
            $crate::cipher::backend::Keyed::Rc2($n) => $narrow,
            $crate::cipher::backend::Keyed::Rc5($n) => $narrow,
            $crate::cipher::backend::Keyed::Cast5($n) => $narrow,
            $crate::cipher::backend::Keyed::Skipjack($n) => $narrow,
            $crate::cipher::backend::Keyed::Idea($n) => $narrow,
            $crate::cipher::backend::Keyed::Tea($n) => $narrow,
            $crate::cipher::backend::Keyed::Xtea($n) => $narrow,
            $crate::cipher::backend::Keyed::Aes128($b) => $block,
            $crate::cipher::backend::Keyed::Aes192($b) => $block,
            $crate::cipher::backend::Keyed::Aes256($b) => $block,
            $crate::cipher::backend::Keyed::Sm4($b) => $block,
            $crate::cipher::backend::Keyed::Twofish($b) => $block,
            $crate::cipher::backend::Keyed::Rc6($b) => $block,
            $crate::cipher::backend::Keyed::Camellia128($b) => $block,
            $crate::cipher::backend::Keyed::Camellia192($b) => $block,
            $crate::cipher::backend::Keyed::Camellia256($b) => $block,
            $crate::cipher::backend::Keyed::Cast6($b) => $block,
            $crate::cipher::backend::Keyed::Aria128($b) => $block,
            $crate::cipher::backend::Keyed::Aria192($b) => $block,
            $crate::cipher::backend::Keyed::Aria256($b) => $block,
            $crate::cipher::backend::Keyed::Serpent($b) => $block,
            $crate::cipher::backend::Keyed::Kalyna($b) => $block,
            $crate::cipher::backend::Keyed::Seed($b) => $block,
            $crate::cipher::backend::Keyed::Threefish256($w) => $wide,
            $crate::cipher::backend::Keyed::Threefish512($x) => $widest,
            $crate::cipher::backend::Keyed::Threefish1024($x) => $widest,
        }
    };
}

pub(crate) use dispatch;

fn keyed<C: KeyInit>(key: &[u8], wrap: fn(C) -> Keyed) -> std::result::Result<Keyed, InvalidLength> {
    C::new_from_slice(key).map(wrap)
}

/// Only lets `key` through if its length is one of `allowed`.
fn sized(key: &[u8], allowed: &[usize]) -> std::result::Result<(), InvalidLength> {
    if allowed.contains(&key.len()) { Ok(()) } else { Err(InvalidLength) }
}

#[inline]
fn width<C: BlockSizeUser>(_: &C) -> usize {
    C::block_size()
}

impl Keyed {
    /// Builds the keyed primitive for `algorithm`.
    ///
    /// # Errors
    ///
    /// [`CryptoError::InvalidKeyLength`] when the key size is not accepted.
    pub fn new(algorithm: Algorithm, key: &[u8]) -> Result<Self> {
        let built = match algorithm {
            Algorithm::Aes => match key.len() {
                16 => keyed(key, Keyed::Aes128),
                24 => keyed(key, Keyed::Aes192),
                32 => keyed(key, Keyed::Aes256),
                _ => Err(InvalidLength),
            },
            Algorithm::Des => keyed(key, Keyed::Des),
            Algorithm::DesEde => match key.len() {
                16 => keyed(key, Keyed::TdesEde2),
                24 => keyed(key, Keyed::TdesEde3),
                _ => Err(InvalidLength),
            },
            Algorithm::Sm4 => keyed(key, Keyed::Sm4),
            Algorithm::Blowfish => keyed(key, Keyed::Blowfish),
            Algorithm::Twofish => sized(key, &[16, 24, 32]).and_then(|()| keyed(key, Keyed::Twofish)),
            Algorithm::Threefish256 => keyed(key, Keyed::Threefish256),
            Algorithm::Threefish512 => keyed(key, Keyed::Threefish512),
            Algorithm::Threefish1024 => keyed(key, Keyed::Threefish1024),
            Algorithm::Rc2 => {
                if key.is_empty() || key.len() > 128 {
                    Err(InvalidLength)
                } else {
                    // Effective key bits follow the key length.
                    Ok(Keyed::Rc2(rc2::Rc2::new_with_eff_key_len(key, key.len() * 8)))
                }
            }
            Algorithm::Rc5 => keyed(key, Keyed::Rc5),
            Algorithm::Rc6 => keyed(key, Keyed::Rc6),
            Algorithm::Camellia => match key.len() {
                16 => keyed(key, Keyed::Camellia128),
                24 => keyed(key, Keyed::Camellia192),
                32 => keyed(key, Keyed::Camellia256),
                _ => Err(InvalidLength),
            },
            Algorithm::Cast5 => keyed(key, Keyed::Cast5),
            Algorithm::Cast6 => sized(key, &[16, 20, 24, 28, 32]).and_then(|()| keyed(key, Keyed::Cast6)),
            Algorithm::Aria => match key.len() {
                16 => keyed(key, Keyed::Aria128),
                24 => keyed(key, Keyed::Aria192),
                32 => keyed(key, Keyed::Aria256),
                _ => Err(InvalidLength),
            },
            Algorithm::Skipjack => keyed(key, Keyed::Skipjack),
            Algorithm::Serpent => sized(key, &[16, 24, 32]).and_then(|()| keyed(key, Keyed::Serpent)),
            Algorithm::Dstu7624 => keyed(key, Keyed::Kalyna),
            Algorithm::Idea => keyed(key, Keyed::Idea),
            Algorithm::Seed => keyed(key, Keyed::Seed),
            Algorithm::Tea => keyed(key, Keyed::Tea),
            Algorithm::Xtea => keyed(key, Keyed::Xtea),
        };

        built.map_err(|_| CryptoError::InvalidKeyLength { algorithm, len: key.len() })
    }

    pub fn block_size(&self) -> usize {
        dispatch!(self, c => width(c))
    }
}
