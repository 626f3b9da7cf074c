use cipher::{Block, BlockCipher, BlockEncrypt, StreamCipher};
use digest::{FixedOutput, Mac, MacMarker, Output, OutputSizeUser, Update};

use super::{TagTail, verify_tag, xor_in_place};
use crate::cipher::Transform;
use crate::error::{CryptoError, Result};
use crate::types::Direction;

/// OMAC with a one-block tweak prefix: MAC([0; n-1] || t || data).
pub fn omac<M: Mac + Clone>(mac: &M, tweak: u8, data: &[u8]) -> Vec<u8> {
    let mut tweaked = mac.clone();
    Mac::update(&mut tweaked, &tweak_block::<M>(tweak));
    Mac::update(&mut tweaked, data);
    tweaked.finalize().into_bytes().to_vec()
}

fn tweak_block<M: OutputSizeUser>(tweak: u8) -> Vec<u8> {
    let mut block = vec![0u8; M::output_size()];
    block[M::output_size() - 1] = tweak;
    block
}

/// EAX over any block width. The tag is one full block.
///
/// `M` is CMAC keyed with the block cipher and `S` is CTR started from the
/// nonce MAC, so both directions stream.
pub struct Eax<M, S> {
    ctr: S,
    mac: M,
    header: Vec<u8>,
    direction: Direction,
    tail: TagTail,
}

impl<M: Mac + Clone, S: StreamCipher> Eax<M, S> {
    /// `nonce_mac` must be `omac(&mac, 0, nonce)`, the value `ctr` starts at.
    pub fn new(mac: M, nonce_mac: &[u8], ctr: S, direction: Direction) -> Self {
        let mut header = nonce_mac.to_vec();
        xor_in_place(&mut header, &omac(&mac, 1, &[]));

        let mut ciphertext_mac = mac;
        Mac::update(&mut ciphertext_mac, &tweak_block::<M>(2));

        Self { ctr, mac: ciphertext_mac, header, direction, tail: TagTail::new(M::output_size()) }
    }

    fn keystream(&mut self, data: &mut [u8]) -> Result<()> {
        self.ctr.try_apply_keystream(data).map_err(|_| CryptoError::execution("message too long for EAX"))
    }
}

impl<M, S> Transform for Eax<M, S>
where
    M: Mac + Clone + Send,
    S: StreamCipher + Send,
{
    fn update(&mut self, input: &[u8]) -> Result<Vec<u8>> {
        match self.direction {
            Direction::Encrypt => {
                let mut out = input.to_vec();
                self.keystream(&mut out)?;
                Mac::update(&mut self.mac, &out);
                Ok(out)
            }
            Direction::Decrypt => {
                let mut out = self.tail.push(input);
                Mac::update(&mut self.mac, &out);
                self.keystream(&mut out)?;
                Ok(out)
            }
        }
    }

    fn finish(self: Box<Self>) -> Result<Vec<u8>> {
        let Self { mac, mut header, direction, tail, .. } = *self;
        xor_in_place(&mut header, &mac.finalize().into_bytes());

        match direction {
            Direction::Encrypt => Ok(header),
            Direction::Decrypt => {
                verify_tag(&header, &tail.into_tag()?)?;
                Ok(Vec::new())
            }
        }
    }
}

/// CMAC for the 512 and 1024-bit Threefish blocks, which the `cmac` crate
/// has no doubling for.
#[derive(Clone)]
pub struct WideCmac<C: BlockCipher + BlockEncrypt + Clone> {
    cipher: C,
    state: Block<C>,
    buffer: Block<C>,
    pos: usize,
}

impl<C: BlockCipher + BlockEncrypt + Clone> WideCmac<C> {
    pub fn new(cipher: C) -> Self {
        Self { cipher, state: Block::<C>::default(), buffer: Block::<C>::default(), pos: 0 }
    }
}

impl<C: BlockCipher + BlockEncrypt + Clone> OutputSizeUser for WideCmac<C> {
    type OutputSize = C::BlockSize;
}

impl<C: BlockCipher + BlockEncrypt + Clone> MacMarker for WideCmac<C> {}

impl<C: BlockCipher + BlockEncrypt + Clone> Update for WideCmac<C> {
    /// The last full block stays buffered until more data proves it is
    /// not the final one.
    fn update(&mut self, mut data: &[u8]) {
        let n = self.buffer.len();
        while !data.is_empty() {
            if self.pos == n {
                xor_in_place(&mut self.state, &self.buffer);
                self.cipher.encrypt_block(&mut self.state);
                self.pos = 0;
            }
            let take = (n - self.pos).min(data.len());
            self.buffer[self.pos..self.pos + take].copy_from_slice(&data[..take]);
            self.pos += take;
            data = &data[take..];
        }
    }
}

impl<C: BlockCipher + BlockEncrypt + Clone> FixedOutput for WideCmac<C> {
    fn finalize_into(mut self, out: &mut Output<Self>) {
        let n = self.buffer.len();

        let mut subkey = Block::<C>::default();
        self.cipher.encrypt_block(&mut subkey);
        dbl(&mut subkey);

        if self.pos == n {
            xor_in_place(&mut self.buffer, &subkey);
        } else {
            self.buffer[self.pos] = 0x80;
            self.buffer[self.pos + 1..].fill(0);
            dbl(&mut subkey);
            xor_in_place(&mut self.buffer, &subkey);
        }

        xor_in_place(&mut self.state, &self.buffer);
        self.cipher.encrypt_block(&mut self.state);
        out.copy_from_slice(&self.state);
    }
}

/// Doubling in GF(2^n) for the block width n.
fn dbl(block: &mut [u8]) {
    let poly: u32 = match block.len() {
        16 => 0x87,
        64 => 0x125,
        _ => 0x8_0043,
    };

    let carry = block[0] >> 7;
    for i in 0..block.len() {
        let next = block.get(i + 1).map_or(0, |b| b >> 7);
        block[i] = (block[i] << 1) | next;
    }

    // Constant-time: the polynomial is masked in rather than branched on.
    let mask = 0u32.wrapping_sub(u32::from(carry));
    let n = block.len();
    xor_in_place(&mut block[n - 4..], &(poly & mask).to_be_bytes());
}
