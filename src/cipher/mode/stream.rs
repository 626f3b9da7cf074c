use cipher::{BlockCipher, BlockEncryptMut, InnerIvInit, StreamCipher};

use super::bad_iv;
use crate::cipher::Transform;
use crate::error::{CryptoError, Result};
use crate::types::Direction;

/// OFB or CTR: a keystream XORed over the data in either direction.
pub struct Keystream<S>(S);

impl<S: StreamCipher + Send> Keystream<S> {
    #[inline]
    pub fn new(stream: S) -> Self {
        Self(stream)
    }
}

impl<S: StreamCipher + Send> Transform for Keystream<S> {
    fn update(&mut self, input: &[u8]) -> Result<Vec<u8>> {
        let mut out = input.to_vec();
        self.0.try_apply_keystream(&mut out).map_err(|_| CryptoError::execution("keystream exhausted"))?;
        Ok(out)
    }

    fn finish(self: Box<Self>) -> Result<Vec<u8>> {
        Ok(Vec::new())
    }
}

/// Full-block CFB. Encryption and decryption feed back different bytes, so
/// each direction has its own state machine.
pub enum Cfb<C>
where
    C: BlockEncryptMut + BlockCipher,
{
    Encrypt(cfb_mode::BufEncryptor<C>),
    Decrypt(cfb_mode::BufDecryptor<C>),
}

impl<C> Cfb<C>
where
    C: BlockEncryptMut + BlockCipher,
{
    pub fn new(cipher: C, iv: &[u8], direction: Direction) -> Result<Self> {
        Ok(match direction {
            Direction::Encrypt => Self::Encrypt(cfb_mode::BufEncryptor::inner_iv_slice_init(cipher, iv).map_err(bad_iv)?),
            Direction::Decrypt => Self::Decrypt(cfb_mode::BufDecryptor::inner_iv_slice_init(cipher, iv).map_err(bad_iv)?),
        })
    }
}

impl<C> Transform for Cfb<C>
where
    C: BlockEncryptMut + BlockCipher + Send,
{
    fn update(&mut self, input: &[u8]) -> Result<Vec<u8>> {
        let mut out = input.to_vec();
        match self {
            Self::Encrypt(cfb) => cfb.encrypt(&mut out),
            Self::Decrypt(cfb) => cfb.decrypt(&mut out),
        }
        Ok(out)
    }

    fn finish(self: Box<Self>) -> Result<Vec<u8>> {
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use crate::cipher::mode::tests::run;
    use crate::transform::{Mode, Padding};
    use crate::types::Direction;

    const KEY: &[u8] = b"0123456789abcdef";
    const IV: &[u8] = b"abcdef9876543210";
    const FOX: &[u8] = b"the quick brown fox jumps over the lazy dog";

    fn keystream(mode: Mode, direction: Direction, data: &[u8], piece: usize) -> Vec<u8> {
        run(KEY, mode, Padding::NoPadding, direction, IV, data, piece).unwrap()
    }

    #[test]
    fn test_known_answers() {
        let vectors = [
            (Mode::Cfb, "891e577297be009a0017d6ae564b82752cb91bb11476130f6a0321ce061a25246284fb70bfe8383b9f731e"),
            (Mode::Ofb, "891e577297be009a0017d6ae564b8275cc542dcc37f0607cc046e5d5b0b94734acd5d55db06fe99194323d"),
            (Mode::Ctr, "891e577297be009a0017d6ae564b8275ab2b9db404575375be63f1860cc8a915d047cf1543ea2d0c09d796"),
        ];

        for (mode, expected) in vectors {
            let ct = keystream(mode, Direction::Encrypt, FOX, FOX.len());
            assert_eq!(hex::encode(&ct), expected, "{mode}");
            assert_eq!(ct.len(), FOX.len());
            assert_eq!(keystream(mode, Direction::Decrypt, &ct, FOX.len()), FOX, "{mode}");
        }
    }

    #[test]
    fn test_byte_granular_updates() {
        for mode in [Mode::Cfb, Mode::Ofb, Mode::Ctr] {
            let whole = keystream(mode, Direction::Encrypt, FOX, FOX.len());
            assert_eq!(keystream(mode, Direction::Encrypt, FOX, 1), whole);
            assert_eq!(keystream(mode, Direction::Decrypt, &whole, 5), FOX);
        }
    }

    #[test]
    fn test_counter_carries_across_bytes() {
        // An all-ones IV rolls the whole counter block over after one block.
        let iv = [0xffu8; 16];
        let data = [0u8; 48];
        let ct = run(KEY, Mode::Ctr, Padding::NoPadding, Direction::Encrypt, &iv, &data, 7).unwrap();
        let zero_iv = run(KEY, Mode::Ctr, Padding::NoPadding, Direction::Encrypt, &[0u8; 16], &data[..32], 32).unwrap();
        assert_eq!(ct[16..], zero_iv[..]);
    }
}
