use block_padding::{AnsiX923, Iso7816, Iso10126, Padding as _, Pkcs7, ZeroPadding};
use rand::RngCore;

use crate::error::{CryptoError, Result};
use crate::transform::Padding;

/// Block widths the supported primitives use.
const BLOCK_SIZES: [usize; 5] = [8, 16, 32, 64, 128];

/// A padding scheme bound to a cipher block size.
///
/// `pad` always appends at least one byte (a whole block for aligned input)
/// except for `NoPadding`, which returns the data untouched.
pub struct BlockPadding {
    scheme: Padding,
    block_size: usize,
}

impl BlockPadding {
    pub fn new(scheme: Padding, block_size: usize) -> Result<Self> {
        if !BLOCK_SIZES.contains(&block_size) {
            return Err(CryptoError::execution(format!("unsupported block size {block_size}")));
        }
        Ok(Self { scheme, block_size })
    }

    #[inline]
    pub fn scheme(&self) -> Padding {
        self.scheme
    }

    pub fn pad(&self, data: &[u8]) -> Result<Vec<u8>> {
        self.pad_after(data, None)
    }

    /// Pads the final bytes of a message whose earlier bytes, ending in
    /// `preceding`, have already been processed.
    pub fn pad_after(&self, data: &[u8], preceding: Option<u8>) -> Result<Vec<u8>> {
        if self.scheme == Padding::NoPadding {
            return Ok(data.to_vec());
        }

        let full = data.len() - data.len() % self.block_size;
        let (head, tail) = data.split_at(full);

        let mut block = vec![0u8; self.block_size];
        block[..tail.len()].copy_from_slice(tail);
        let pos = tail.len();

        match self.scheme {
            Padding::NoPadding => {}
            Padding::Pkcs5 | Padding::Pkcs7 => Pkcs7::raw_pad(&mut block, pos),
            Padding::Iso10126 | Padding::Iso10126d2 => {
                Iso10126::raw_pad(&mut block, pos);
                // The crate fills with the count; the scheme asks for noise.
                let last = block.len() - 1;
                rand::rng().fill_bytes(&mut block[pos..last]);
            }
            Padding::X923 => AnsiX923::raw_pad(&mut block, pos),
            Padding::Iso7816d4 => Iso7816::raw_pad(&mut block, pos),
            Padding::ZeroByte => ZeroPadding::raw_pad(&mut block, pos),
            Padding::Tbc => tbc_pad(&mut block, pos, data.last().copied().or(preceding)),
        }

        let mut out = Vec::with_capacity(full + self.block_size);
        out.extend_from_slice(head);
        out.extend_from_slice(&block);
        Ok(out)
    }

    pub fn unpad(&self, data: &[u8]) -> Result<Vec<u8>> {
        if data.is_empty() || !data.len().is_multiple_of(self.block_size) {
            if self.scheme == Padding::NoPadding && data.is_empty() {
                return Ok(Vec::new());
            }
            return Err(CryptoError::execution("last block incomplete in decryption"));
        }

        let split = data.len() - self.block_size;
        let last_block = &data[split..];
        let kept = match self.scheme {
            Padding::NoPadding => Ok(last_block),
            Padding::Pkcs5 | Padding::Pkcs7 => Pkcs7::raw_unpad(last_block),
            Padding::Iso10126 | Padding::Iso10126d2 => Iso10126::raw_unpad(last_block),
            Padding::X923 => AnsiX923::raw_unpad(last_block),
            Padding::Iso7816d4 => Iso7816::raw_unpad(last_block),
            Padding::ZeroByte => ZeroPadding::raw_unpad(last_block),
            Padding::Tbc => Ok(tbc_unpad(last_block)),
        }
        .map_err(|_| pad_corrupted())?;

        let mut out = Vec::with_capacity(split + kept.len());
        out.extend_from_slice(&data[..split]);
        out.extend_from_slice(kept);
        Ok(out)
    }
}

/// Trailing-bit-complement fill: the complement of the last data bit.
fn tbc_pad(block: &mut [u8], pos: usize, last: Option<u8>) {
    let code = if last.is_none_or(|b| b & 0x01 == 0) { 0xff } else { 0x00 };
    block[pos..].fill(code);
}

fn tbc_unpad(block: &[u8]) -> &[u8] {
    let code = block[block.len() - 1];
    let fill = block.iter().rev().take_while(|b| **b == code).count();
    &block[..block.len() - fill]
}

fn pad_corrupted() -> CryptoError {
    CryptoError::execution("pad block corrupted")
}
