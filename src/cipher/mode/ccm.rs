use cipher::consts::U16;
use cipher::generic_array::GenericArray;
use cipher::{BlockCipher, BlockEncrypt, BlockEncryptMut, BlockSizeUser, InnerIvInit, IvState, StreamCipher, StreamCipherCore};

use super::{TagTail, verify_tag, xor_in_place};
use crate::cipher::Transform;
use crate::config::TAG_SIZE;
use crate::error::{CryptoError, Result};
use crate::types::Direction;

type Block = GenericArray<u8, U16>;

/// Counter with CBC-MAC (RFC 3610) with a 128-bit tag and no associated
/// data.
///
/// The message length is part of the first MAC block, so it must be known
/// before any data arrives. `finish` fails if the bytes actually fed differ
/// from what was declared.
pub struct Ccm<C>
where
    C: BlockCipher + BlockSizeUser<BlockSize = U16> + BlockEncrypt + Clone,
{
    mac: cbc::Encryptor<C>,
    ctr: ctr::Ctr64BE<C>,
    mask: Block,
    direction: Direction,
    partial: Vec<u8>,
    expected: u64,
    processed: u64,
    tail: TagTail,
}

impl<C> Ccm<C>
where
    C: BlockCipher + BlockSizeUser<BlockSize = U16> + BlockEncrypt + Clone,
{
    /// `input_len` counts everything that will be fed in, which includes the
    /// tag when decrypting.
    pub fn new(cipher: C, nonce: &[u8], direction: Direction, input_len: u64) -> Result<Self> {
        // Width of the length field, 15 - nonce length.
        let width = 15 - nonce.len();
        let expected = match direction {
            Direction::Encrypt => input_len,
            Direction::Decrypt => input_len.saturating_sub(TAG_SIZE as u64),
        };
        if width < 8 && expected >> (8 * width) != 0 {
            return Err(CryptoError::execution(format!("{expected} bytes is too long for CCM with a {}-byte nonce", nonce.len())));
        }

        let mut b0 = Block::default();
        b0[0] = ((((TAG_SIZE - 2) / 2) << 3) | (width - 1)) as u8;
        b0[1..=nonce.len()].copy_from_slice(nonce);
        b0[16 - width..].copy_from_slice(&expected.to_be_bytes()[8 - width..]);

        let mut mac = cbc::Encryptor::inner_iv_init(cipher.clone(), &Block::default());
        mac.encrypt_block_mut(&mut b0);

        let mut a0 = Block::default();
        a0[0] = (width - 1) as u8;
        a0[1..=nonce.len()].copy_from_slice(nonce);

        // S0 masks the tag; the data keystream starts at A1.
        let mut core = ctr::CtrCore::<C, ctr::flavors::Ctr64BE>::inner_iv_init(cipher, &a0);
        let mut mask = Block::default();
        core.write_keystream_block(&mut mask);

        Ok(Self {
            mac,
            ctr: ctr::Ctr64BE::from_core(core),
            mask,
            direction,
            partial: Vec::with_capacity(16),
            expected,
            processed: 0,
            tail: TagTail::new(TAG_SIZE),
        })
    }

    /// Feeds plaintext to the CBC-MAC in whole blocks.
    fn absorb(&mut self, plaintext: &[u8]) {
        self.partial.extend_from_slice(plaintext);
        let full = self.partial.len() / 16 * 16;
        for chunk in self.partial[..full].chunks_exact(16) {
            let mut block = Block::clone_from_slice(chunk);
            self.mac.encrypt_block_mut(&mut block);
        }
        self.partial.drain(..full);
        self.processed += plaintext.len() as u64;
    }

    fn keystream(&mut self, data: &mut [u8]) -> Result<()> {
        self.ctr.try_apply_keystream(data).map_err(|_| CryptoError::execution("message too long for CCM"))
    }

    fn tag(mut self) -> Result<Block> {
        if self.processed != self.expected {
            return Err(CryptoError::execution(format!("expected {} bytes of message, got {}", self.expected, self.processed)));
        }

        if !self.partial.is_empty() {
            let mut last = Block::default();
            last[..self.partial.len()].copy_from_slice(&self.partial);
            self.mac.encrypt_block_mut(&mut last);
        }

        let mut tag = self.mac.iv_state();
        xor_in_place(&mut tag, &self.mask);
        Ok(tag)
    }
}

impl<C> Transform for Ccm<C>
where
    C: BlockCipher + BlockSizeUser<BlockSize = U16> + BlockEncrypt + Clone + Send,
{
    fn update(&mut self, input: &[u8]) -> Result<Vec<u8>> {
        match self.direction {
            Direction::Encrypt => {
                self.absorb(input);
                let mut out = input.to_vec();
                self.keystream(&mut out)?;
                Ok(out)
            }
            Direction::Decrypt => {
                let mut out = self.tail.push(input);
                self.keystream(&mut out)?;
                self.absorb(&out);
                Ok(out)
            }
        }
    }

    fn finish(mut self: Box<Self>) -> Result<Vec<u8>> {
        let tail = std::mem::replace(&mut self.tail, TagTail::new(0));
        match self.direction {
            Direction::Encrypt => Ok(self.tag()?.to_vec()),
            Direction::Decrypt => {
                let received = tail.into_tag()?;
                verify_tag(&self.tag()?, &received)?;
                Ok(Vec::new())
            }
        }
    }
}
