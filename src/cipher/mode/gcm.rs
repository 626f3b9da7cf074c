use cipher::consts::U16;
use cipher::{BlockCipher, BlockEncrypt, BlockSizeUser, InnerIvInit, StreamCipher, StreamCipherCore};
use ghash::GHash;
use ghash::universal_hash::{KeyInit as _, UniversalHash};

use super::{TagTail, verify_tag};
use crate::cipher::Transform;
use crate::config::TAG_SIZE;
use crate::error::{CryptoError, Result};
use crate::types::Direction;

/// Galois/Counter Mode with a 128-bit tag and no associated data.
///
/// GHASH runs over the ciphertext as it streams past, so only a partial
/// GHASH block and, when decrypting, the trailing tag are ever held.
pub struct Gcm<C>
where
    C: BlockCipher + BlockSizeUser<BlockSize = U16> + BlockEncrypt,
{
    ctr: ctr::Ctr32BE<C>,
    ghash: GHash,
    mask: ghash::Block,
    direction: Direction,
    partial: Vec<u8>,
    processed: u64,
    tail: TagTail,
}

impl<C> Gcm<C>
where
    C: BlockCipher + BlockSizeUser<BlockSize = U16> + BlockEncrypt,
{
    pub fn new(cipher: C, nonce: &[u8], direction: Direction) -> Self {
        let mut hash_key = ghash::Key::default();
        cipher.encrypt_block(&mut hash_key);
        let ghash = GHash::new(&hash_key);

        let j0 = if nonce.len() == 12 {
            let mut block = ghash::Block::default();
            block[..12].copy_from_slice(nonce);
            block[15] = 1;
            block
        } else {
            let mut nonce_hash = ghash.clone();
            nonce_hash.update_padded(nonce);
            let mut lengths = ghash::Block::default();
            lengths[8..].copy_from_slice(&(nonce.len() as u64 * 8).to_be_bytes());
            nonce_hash.update(&[lengths]);
            nonce_hash.finalize()
        };

        // E(J0) masks the tag; the data keystream starts at inc32(J0).
        let mut core = ctr::CtrCore::<C, ctr::flavors::Ctr32BE>::inner_iv_init(cipher, &j0);
        let mut mask = ghash::Block::default();
        core.write_keystream_block(&mut mask);

        Self {
            ctr: ctr::Ctr32BE::from_core(core),
            ghash,
            mask,
            direction,
            partial: Vec::with_capacity(16),
            processed: 0,
            tail: TagTail::new(TAG_SIZE),
        }
    }

    /// Feeds ciphertext to GHASH in whole blocks.
    fn absorb(&mut self, ciphertext: &[u8]) {
        self.partial.extend_from_slice(ciphertext);
        let full = self.partial.len() / 16 * 16;
        let blocks: Vec<ghash::Block> = self.partial[..full].chunks_exact(16).map(ghash::Block::clone_from_slice).collect();
        self.ghash.update(&blocks);
        self.partial.drain(..full);
        self.processed += ciphertext.len() as u64;
    }

    fn keystream(&mut self, data: &mut [u8]) -> Result<()> {
        self.ctr.try_apply_keystream(data).map_err(|_| CryptoError::execution("message too long for GCM"))
    }

    fn tag(self) -> ghash::Block {
        let Self { mut ghash, mask, partial, processed, .. } = self;
        ghash.update_padded(&partial);

        let mut lengths = ghash::Block::default();
        lengths[8..].copy_from_slice(&(processed * 8).to_be_bytes());
        ghash.update(&[lengths]);

        let mut tag = ghash.finalize();
        for (t, m) in tag.iter_mut().zip(mask.iter()) {
            *t ^= m;
        }
        tag
    }
}

impl<C> Transform for Gcm<C>
where
    C: BlockCipher + BlockSizeUser<BlockSize = U16> + BlockEncrypt + Send,
{
    fn update(&mut self, input: &[u8]) -> Result<Vec<u8>> {
        match self.direction {
            Direction::Encrypt => {
                let mut out = input.to_vec();
                self.keystream(&mut out)?;
                self.absorb(&out);
                Ok(out)
            }
            Direction::Decrypt => {
                let mut out = self.tail.push(input);
                self.absorb(&out);
                self.keystream(&mut out)?;
                Ok(out)
            }
        }
    }

    fn finish(mut self: Box<Self>) -> Result<Vec<u8>> {
        let tail = std::mem::replace(&mut self.tail, TagTail::new(0));
        match self.direction {
            Direction::Encrypt => Ok(self.tag().to_vec()),
            Direction::Decrypt => {
                let received = tail.into_tag()?;
                verify_tag(&self.tag(), &received)?;
                Ok(Vec::new())
            }
        }
    }
}
