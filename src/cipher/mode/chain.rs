use cipher::crypto_common::InnerInit;
use cipher::generic_array::GenericArray;
use cipher::{BlockCipher, BlockDecryptMut, BlockEncryptMut, InnerIvInit};

use super::bad_iv;
use crate::cipher::Transform;
use crate::error::{CryptoError, Result};
use crate::padding::BlockPadding;
use crate::transform::Padding;
use crate::types::Direction;

/// One block of ECB or CBC in a fixed direction.
pub trait ChainStep: Send {
    fn block_size(&self) -> usize;

    fn step(&mut self, block: &mut [u8]);
}

pub struct Encrypting<M>(M);

pub struct Decrypting<M>(M);

impl<M: BlockEncryptMut + Send> ChainStep for Encrypting<M> {
    #[inline]
    fn block_size(&self) -> usize {
        M::block_size()
    }

    #[inline]
    fn step(&mut self, block: &mut [u8]) {
        self.0.encrypt_block_mut(GenericArray::from_mut_slice(block));
    }
}

impl<M: BlockDecryptMut + Send> ChainStep for Decrypting<M> {
    #[inline]
    fn block_size(&self) -> usize {
        M::block_size()
    }

    #[inline]
    fn step(&mut self, block: &mut [u8]) {
        self.0.decrypt_block_mut(GenericArray::from_mut_slice(block));
    }
}

pub fn ecb<C>(cipher: C, padding: Padding, direction: Direction) -> Result<Box<dyn Transform>>
where
    C: BlockCipher + BlockEncryptMut + BlockDecryptMut + Send + 'static,
{
    Ok(match direction {
        Direction::Encrypt => Box::new(BlockChain::new(Encrypting(ecb::Encryptor::inner_init(cipher)), padding, direction)?),
        Direction::Decrypt => Box::new(BlockChain::new(Decrypting(ecb::Decryptor::inner_init(cipher)), padding, direction)?),
    })
}

pub fn cbc<C>(cipher: C, iv: &[u8], padding: Padding, direction: Direction) -> Result<Box<dyn Transform>>
where
    C: BlockCipher + BlockEncryptMut + BlockDecryptMut + Send + 'static,
{
    Ok(match direction {
        Direction::Encrypt => {
            let mode = cbc::Encryptor::inner_iv_slice_init(cipher, iv).map_err(bad_iv)?;
            Box::new(BlockChain::new(Encrypting(mode), padding, direction)?)
        }
        Direction::Decrypt => {
            let mode = cbc::Decryptor::inner_iv_slice_init(cipher, iv).map_err(bad_iv)?;
            Box::new(BlockChain::new(Decrypting(mode), padding, direction)?)
        }
    })
}

/// ECB or CBC with a padding scheme.
pub struct BlockChain<S> {
    step: S,
    direction: Direction,
    padding: BlockPadding,
    pending: Vec<u8>,
    last_plain: Option<u8>,
}

impl<S: ChainStep> BlockChain<S> {
    pub fn new(step: S, padding: Padding, direction: Direction) -> Result<Self> {
        let padding = BlockPadding::new(padding, step.block_size())?;
        Ok(Self { step, direction, padding, pending: Vec::new(), last_plain: None })
    }

    fn process(&mut self, data: &mut [u8]) {
        let block_size = self.step.block_size();
        for block in data.chunks_exact_mut(block_size) {
            self.step.step(block);
        }
    }
}

impl<S: ChainStep> Transform for BlockChain<S> {
    fn update(&mut self, input: &[u8]) -> Result<Vec<u8>> {
        self.pending.extend_from_slice(input);

        let block_size = self.step.block_size();
        // Decryption keeps the final block back until `finish` can unpad it.
        let ready = match self.direction {
            Direction::Encrypt => self.pending.len() / block_size * block_size,
            Direction::Decrypt => self.pending.len().saturating_sub(1) / block_size * block_size,
        };

        let mut out: Vec<u8> = self.pending.drain(..ready).collect();
        if self.direction == Direction::Encrypt && !out.is_empty() {
            self.last_plain = out.last().copied();
        }
        self.process(&mut out);
        Ok(out)
    }

    fn finish(mut self: Box<Self>) -> Result<Vec<u8>> {
        let block_size = self.step.block_size();
        let pending = std::mem::take(&mut self.pending);

        match self.direction {
            Direction::Encrypt => {
                if self.padding.scheme() == Padding::NoPadding && !pending.len().is_multiple_of(block_size) {
                    return Err(CryptoError::execution(format!("data not block size aligned ({block_size} bytes) and no padding requested")));
                }
                let mut out = self.padding.pad_after(&pending, self.last_plain)?;
                self.process(&mut out);
                Ok(out)
            }
            Direction::Decrypt => {
                if !pending.len().is_multiple_of(block_size) {
                    return Err(CryptoError::execution("last block incomplete in decryption"));
                }
                let mut out = pending;
                self.process(&mut out);
                self.padding.unpad(&out)
            }
        }
    }
}
