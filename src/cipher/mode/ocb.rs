use cipher::consts::{U6, U7, U8, U9, U10, U11, U12, U13, U14, U15, U16};
use cipher::{BlockCipher, BlockDecrypt, BlockEncrypt, BlockSizeUser};
use ocb3::{AeadInPlace, GenericArray, Ocb3};

use super::{Aead, Buffered, split_tag};
use crate::cipher::Transform;
use crate::config::TAG_SIZE;
use crate::error::{CryptoError, Result};
use crate::types::Direction;

/// A detached-tag AEAD bound to one nonce, with no associated data.
pub struct Detached<A> {
    aead: A,
    nonce: Vec<u8>,
}

impl<A: AeadInPlace + Send> Aead for Detached<A> {
    fn seal(&self, mut plaintext: Vec<u8>) -> Result<Vec<u8>> {
        if plaintext.len() > ocb3::P_MAX {
            return Err(CryptoError::execution(format!("{} bytes is too long for OCB", plaintext.len())));
        }
        let tag = self
            .aead
            .encrypt_in_place_detached(GenericArray::from_slice(&self.nonce), &[], &mut plaintext)
            .map_err(|_| CryptoError::execution("OCB encryption failed"))?;
        plaintext.extend_from_slice(&tag);
        Ok(plaintext)
    }

    fn open(&self, sealed: Vec<u8>) -> Result<Vec<u8>> {
        let (ciphertext, tag) = split_tag(&sealed, TAG_SIZE)?;
        if ciphertext.len() > ocb3::C_MAX {
            return Err(CryptoError::execution(format!("{} bytes is too long for OCB", ciphertext.len())));
        }
        let mut plaintext = ciphertext.to_vec();
        self.aead
            .decrypt_in_place_detached(GenericArray::from_slice(&self.nonce), &[], &mut plaintext, GenericArray::from_slice(tag))
            .map_err(|_| CryptoError::execution("authentication failed"))?;
        Ok(plaintext)
    }
}

/// OCB3 (RFC 7253) with a 128-bit tag. The nonce length is part of the
/// `Ocb3` type, so each accepted length gets its own instantiation.
pub fn build<C>(cipher: C, nonce: &[u8], direction: Direction) -> Result<Box<dyn Transform>>
where
    C: BlockCipher + BlockSizeUser<BlockSize = U16> + BlockEncrypt + BlockDecrypt + Send + 'static,
{
    macro_rules! sized {
        ($($len:literal => $size:ty),* $(,)?) => {
            match nonce.len() {
                $($len => seal_with(Ocb3::<C, $size>::from(cipher), nonce, direction),)*
                len => Err(CryptoError::execution(format!("OCB takes a 6 to 15-byte nonce, got {len}"))),
            }
        };
    }

    sized!(6 => U6, 7 => U7, 8 => U8, 9 => U9, 10 => U10, 11 => U11, 12 => U12, 13 => U13, 14 => U14, 15 => U15)
}

fn seal_with<A: AeadInPlace + Send + 'static>(aead: A, nonce: &[u8], direction: Direction) -> Result<Box<dyn Transform>> {
    Ok(Box::new(Buffered::new(Detached { aead, nonce: nonce.to_vec() }, direction)))
}
