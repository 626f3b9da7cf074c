//! Modes of operation over a keyed primitive.
//!
//! Every mode is driven through the streaming [`Transform`] interface:
//!
//! - ECB and CBC (`ecb`, `cbc`) emit whole blocks and hold back the tail
//!   for padding.
//! - CFB, OFB and CTR (`cfb-mode`, `ofb`, `ctr`) are byte-granular
//!   keystreams and never buffer.
//! - GCM, CCM and EAX stream in both directions. Decryption holds back a
//!   tag-sized window and only verifies in `finish`, so released plaintext
//!   must be staged until `finish` succeeds.
//! - OCB (`ocb3`) seals or opens the whole buffered message in `finish`.

mod ccm;
mod chain;
mod eax;
mod gcm;
mod ocb;
mod stream;

use cipher::InvalidLength;
use subtle::ConstantTimeEq;

use super::Transform;
use super::backend::{Keyed, dispatch};
use crate::error::{CryptoError, Result};
use crate::transform::{Mode, Padding};
use crate::types::Direction;

pub use ccm::Ccm;
pub use chain::BlockChain;
pub use eax::{Eax, WideCmac};
pub use gcm::Gcm;
pub use ocb::Detached;
pub use stream::{Cfb, Keystream};

/// Checks an IV or nonce length against what `mode` accepts.
pub fn check_iv(mode: Mode, block_size: usize, len: usize) -> Result<()> {
    let (valid, expected) = match mode {
        Mode::Ecb => return Ok(()),
        Mode::Cbc | Mode::Cfb | Mode::Ofb | Mode::Ctr => (len == block_size, format!("{block_size} bytes")),
        Mode::Gcm | Mode::Eax => (len > 0, "at least 1 byte".to_owned()),
        Mode::Ccm => ((7..=13).contains(&len), "7 to 13 bytes".to_owned()),
        Mode::Ocb => ((6..=15).contains(&len), "6 to 15 bytes".to_owned()),
    };

    if valid { Ok(()) } else { Err(CryptoError::InvalidIvLength { mode, len, expected }) }
}

/// Builds the transform for one direction of `mode`.
///
/// `input_len` is the total number of bytes that will be fed to the
/// transform.
pub fn build(keyed: Keyed, mode: Mode, padding: Padding, direction: Direction, iv: &[u8], input_len: u64) -> Result<Box<dyn Transform>> {
    use cipher::InnerIvInit;

    let block_size = keyed.block_size();

    match mode {
        Mode::Ecb => dispatch!(keyed, c => chain::ecb(c, padding, direction)),
        Mode::Cbc => dispatch!(keyed, c => chain::cbc(c, iv, padding, direction)),
        Mode::Cfb => dispatch!(keyed, c => boxed(Cfb::new(c, iv, direction)?)),
        Mode::Ofb => dispatch!(keyed, c => boxed(Keystream::new(ofb::Ofb::<_>::from_core(ofb::OfbCore::inner_iv_slice_init(c, iv).map_err(bad_iv)?)))),
        Mode::Ctr => dispatch!(keyed,
            narrow: c => boxed(Keystream::new(ctr::Ctr64BE::<_>::from_core(ctr::CtrCore::inner_iv_slice_init(c, iv).map_err(bad_iv)?))),
            block: c => boxed(Keystream::new(ctr::Ctr128BE::<_>::from_core(ctr::CtrCore::inner_iv_slice_init(c, iv).map_err(bad_iv)?))),
            wide: c => boxed(Keystream::new(ctr::Ctr128BE::<_>::from_core(ctr::CtrCore::inner_iv_slice_init(c, iv).map_err(bad_iv)?))),
            widest: c => boxed(Keystream::new(ctr::Ctr128BE::<_>::from_core(ctr::CtrCore::inner_iv_slice_init(c, iv).map_err(bad_iv)?))),
        ),
        Mode::Gcm => dispatch!(keyed,
            narrow: _c => narrow_block(mode, block_size),
            block: c => boxed(Gcm::new(c, iv, direction)),
            wide: _c => narrow_block(mode, block_size),
            widest: _c => narrow_block(mode, block_size),
        ),
        Mode::Ccm => dispatch!(keyed,
            narrow: _c => narrow_block(mode, block_size),
            block: c => boxed(Ccm::new(c, iv, direction, input_len)?),
            wide: _c => narrow_block(mode, block_size),
            widest: _c => narrow_block(mode, block_size),
        ),
        Mode::Eax => dispatch!(keyed,
            narrow: c => {
                let mac = cmac::Cmac::<_>::from_core(digest::InnerInit::inner_init(c.clone()));
                let n = eax::omac(&mac, 0, iv);
                boxed(Eax::new(mac, &n, ctr::Ctr64BE::<_>::from_core(ctr::CtrCore::inner_iv_slice_init(c, &n).map_err(bad_iv)?), direction))
            },
            block: c => {
                let mac = cmac::Cmac::<_>::from_core(digest::InnerInit::inner_init(c.clone()));
                let n = eax::omac(&mac, 0, iv);
                boxed(Eax::new(mac, &n, ctr::Ctr128BE::<_>::from_core(ctr::CtrCore::inner_iv_slice_init(c, &n).map_err(bad_iv)?), direction))
            },
            wide: c => {
                let mac = cmac::Cmac::<_>::from_core(digest::InnerInit::inner_init(c.clone()));
                let n = eax::omac(&mac, 0, iv);
                boxed(Eax::new(mac, &n, ctr::Ctr128BE::<_>::from_core(ctr::CtrCore::inner_iv_slice_init(c, &n).map_err(bad_iv)?), direction))
            },
            widest: c => {
                let mac = WideCmac::new(c.clone());
                let n = eax::omac(&mac, 0, iv);
                boxed(Eax::new(mac, &n, ctr::Ctr128BE::<_>::from_core(ctr::CtrCore::inner_iv_slice_init(c, &n).map_err(bad_iv)?), direction))
            },
        ),
        Mode::Ocb => dispatch!(keyed,
            narrow: _c => narrow_block(mode, block_size),
            block: c => ocb::build(c, iv, direction),
            wide: _c => narrow_block(mode, block_size),
            widest: _c => narrow_block(mode, block_size),
        ),
    }
}

#[inline]
fn boxed<T: Transform + 'static>(transform: T) -> Result<Box<dyn Transform>> {
    Ok(Box::new(transform))
}

fn narrow_block(mode: Mode, block_size: usize) -> Result<Box<dyn Transform>> {
    Err(CryptoError::UnsupportedMode(format!("{mode} over {block_size}-byte blocks")))
}

/// IV lengths are checked when the cipher is built, so a rejection here is
/// an internal mismatch rather than bad input.
fn bad_iv(_: InvalidLength) -> CryptoError {
    CryptoError::execution("IV does not fit the cipher block")
}

/// One-shot authenticated encryption without associated data.
///
/// `seal` returns `ciphertext || tag`; `open` expects the same layout.
pub trait Aead: Send {
    fn seal(&self, plaintext: Vec<u8>) -> Result<Vec<u8>>;

    fn open(&self, sealed: Vec<u8>) -> Result<Vec<u8>>;
}

/// Adapts a one-shot [`Aead`] to the streaming interface.
pub struct Buffered<A> {
    aead: A,
    direction: Direction,
    buffer: Vec<u8>,
}

impl<A: Aead> Buffered<A> {
    pub fn new(aead: A, direction: Direction) -> Self {
        Self { aead, direction, buffer: Vec::new() }
    }
}

impl<A: Aead> Transform for Buffered<A> {
    fn update(&mut self, input: &[u8]) -> Result<Vec<u8>> {
        self.buffer.extend_from_slice(input);
        Ok(Vec::new())
    }

    fn finish(self: Box<Self>) -> Result<Vec<u8>> {
        let Self { aead, direction, buffer } = *self;
        match direction {
            Direction::Encrypt => aead.seal(buffer),
            Direction::Decrypt => aead.open(buffer),
        }
    }
}

/// Holds back the last `len` bytes of a stream, which carry the tag.
pub(super) struct TagTail {
    len: usize,
    held: Vec<u8>,
}

impl TagTail {
    pub(super) fn new(len: usize) -> Self {
        Self { len, held: Vec::with_capacity(len) }
    }

    /// Takes `input` and returns whatever can no longer be part of the tag.
    pub(super) fn push(&mut self, input: &[u8]) -> Vec<u8> {
        self.held.extend_from_slice(input);
        let release = self.held.len().saturating_sub(self.len);
        self.held.drain(..release).collect()
    }

    pub(super) fn into_tag(self) -> Result<Vec<u8>> {
        if self.held.len() < self.len {
            return Err(CryptoError::execution("ciphertext shorter than the authentication tag"));
        }
        Ok(self.held)
    }
}

#[inline]
pub(super) fn xor_in_place(dst: &mut [u8], src: &[u8]) {
    for (d, s) in dst.iter_mut().zip(src) {
        *d ^= s;
    }
}

pub(super) fn split_tag(sealed: &[u8], tag_len: usize) -> Result<(&[u8], &[u8])> {
    if sealed.len() < tag_len {
        return Err(CryptoError::execution("ciphertext shorter than the authentication tag"));
    }
    Ok(sealed.split_at(sealed.len() - tag_len))
}

pub(super) fn verify_tag(expected: &[u8], received: &[u8]) -> Result<()> {
    if bool::from(expected.ct_eq(received)) { Ok(()) } else { Err(CryptoError::execution("authentication failed")) }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::cipher::tests::aes;
    use crate::config::TAG_SIZE;

    /// Runs `data` through a fresh AES transform in pieces of `piece` bytes.
    pub(crate) fn run(key: &[u8], mode: Mode, padding: Padding, direction: Direction, iv: &[u8], data: &[u8], piece: usize) -> Result<Vec<u8>> {
        let mut transform = build(aes(key), mode, padding, direction, iv, data.len() as u64)?;
        let mut out = Vec::new();
        for chunk in data.chunks(piece.max(1)) {
            out.extend(transform.update(chunk)?);
        }
        out.extend(transform.finish()?);
        Ok(out)
    }

    #[test]
    fn test_iv_rules() {
        assert!(check_iv(Mode::Ecb, 16, 0).is_ok());
        assert!(check_iv(Mode::Cbc, 16, 16).is_ok());
        assert!(matches!(check_iv(Mode::Cbc, 16, 8), Err(CryptoError::InvalidIvLength { mode: Mode::Cbc, len: 8, .. })));
        assert!(check_iv(Mode::Ctr, 8, 8).is_ok());
        assert!(check_iv(Mode::Gcm, 16, 0).is_err());
        assert!(check_iv(Mode::Gcm, 16, 7).is_ok());
        assert!(check_iv(Mode::Ccm, 16, 6).is_err());
        assert!(check_iv(Mode::Ccm, 16, 13).is_ok());
        assert!(check_iv(Mode::Ocb, 16, 16).is_err());
        assert!(check_iv(Mode::Ocb, 16, 5).is_err());
        assert!(check_iv(Mode::Ocb, 16, 6).is_ok());
        assert!(check_iv(Mode::Eax, 8, 32).is_ok());
    }

    #[test]
    fn test_tag_tail_releases_all_but_the_tag() {
        let mut tail = TagTail::new(4);
        assert!(tail.push(&[1, 2]).is_empty());
        assert_eq!(tail.push(&[3, 4, 5, 6, 7]), [1, 2, 3]);
        assert_eq!(tail.into_tag().unwrap(), [4, 5, 6, 7]);

        let mut short = TagTail::new(4);
        short.push(&[1, 2, 3]);
        assert!(short.into_tag().is_err());
    }

    #[test]
    fn test_tag_checks() {
        assert!(split_tag(&[1, 2, 3], 4).is_err());
        let (body, tag) = split_tag(&[1, 2, 3, 4, 5], 2).unwrap();
        assert_eq!((body, tag), (&[1u8, 2, 3][..], &[4u8, 5][..]));
        assert!(verify_tag(&[1, 2], &[1, 2]).is_ok());
        assert!(verify_tag(&[1, 2], &[1, 3]).is_err());
    }

    #[test]
    fn test_authenticated_streams_hold_back_only_the_tag() {
        let key = b"0123456789abcdef";
        let data: Vec<u8> = (0..4096u32).map(|i| (i % 253) as u8).collect();

        for (mode, iv) in [(Mode::Gcm, &b"abcdef987654"[..]), (Mode::Ccm, b"abcdef987654"), (Mode::Eax, b"abcdef9876543210")] {
            let sealed = run(key, mode, Padding::NoPadding, Direction::Encrypt, iv, &data, 4096).unwrap();
            assert_eq!(sealed.len(), data.len() + TAG_SIZE);

            let mut transform = build(aes(key), mode, Padding::NoPadding, Direction::Decrypt, iv, sealed.len() as u64).unwrap();
            let (mut fed, mut released) = (0usize, 0usize);
            for chunk in sealed.chunks(333) {
                fed += chunk.len();
                released += transform.update(chunk).unwrap().len();
                assert!(fed - released <= TAG_SIZE, "{mode} held {} bytes", fed - released);
            }
            assert_eq!(released, data.len());
            assert!(transform.finish().unwrap().is_empty());
        }
    }

    #[test]
    fn test_narrow_blocks_are_refused_for_block_only_modes() {
        let keyed = Keyed::new(crate::transform::Algorithm::Des, b"01234567").unwrap();
        for mode in [Mode::Gcm, Mode::Ccm, Mode::Ocb] {
            assert!(build(keyed.clone(), mode, Padding::NoPadding, Direction::Encrypt, b"abcdef987654", 0).is_err());
        }
    }
}
