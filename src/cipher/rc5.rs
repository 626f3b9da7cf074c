//! RC5-32/12 and RC6-32/20. Both share the RC5 key expansion and use
//! little-endian words.

use cipher::consts::{U8, U16};

const P32: u32 = 0xB7E1_5163;
const Q32: u32 = 0x9E37_79B9;

const RC5_ROUNDS: usize = 12;
const RC6_ROUNDS: usize = 20;

/// Callers only pass keys of 1 to 255 bytes.
fn expand_key(key: &[u8], words: usize) -> Vec<u32> {
    let c = key.len().div_ceil(4);
    let mut l = vec![0u32; c];
    for (i, &byte) in key.iter().enumerate().rev() {
        l[i / 4] = (l[i / 4] << 8).wrapping_add(u32::from(byte));
    }

    let mut s = Vec::with_capacity(words);
    s.push(P32);
    for i in 1..words {
        s.push(s[i - 1].wrapping_add(Q32));
    }

    let (mut a, mut b, mut i, mut j) = (0u32, 0u32, 0usize, 0usize);
    for _ in 0..3 * words.max(c) {
        s[i] = s[i].wrapping_add(a).wrapping_add(b).rotate_left(3);
        a = s[i];
        l[j] = l[j].wrapping_add(a).wrapping_add(b).rotate_left(a.wrapping_add(b));
        b = l[j];
        i = (i + 1) % words;
        j = (j + 1) % c;
    }

    s
}

#[inline]
fn word(block: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([block[at], block[at + 1], block[at + 2], block[at + 3]])
}

#[derive(Clone)]
pub struct Rc5 {
    s: Vec<u32>,
}

block_cipher!(Rc5, block: U8, key: U16, key_len: 1..=255);

impl Rc5 {
    fn expand(key: &[u8]) -> Self {
        Self { s: expand_key(key, 2 * RC5_ROUNDS + 2) }
    }

    fn encrypt_bytes(&self, block: &mut [u8]) {
        let s = &self.s;
        let mut a = word(block, 0).wrapping_add(s[0]);
        let mut b = word(block, 4).wrapping_add(s[1]);

        for i in 1..=RC5_ROUNDS {
            a = (a ^ b).rotate_left(b).wrapping_add(s[2 * i]);
            b = (b ^ a).rotate_left(a).wrapping_add(s[2 * i + 1]);
        }

        block[..4].copy_from_slice(&a.to_le_bytes());
        block[4..8].copy_from_slice(&b.to_le_bytes());
    }

    fn decrypt_bytes(&self, block: &mut [u8]) {
        let s = &self.s;
        let mut a = word(block, 0);
        let mut b = word(block, 4);

        for i in (1..=RC5_ROUNDS).rev() {
            b = b.wrapping_sub(s[2 * i + 1]).rotate_right(a) ^ a;
            a = a.wrapping_sub(s[2 * i]).rotate_right(b) ^ b;
        }

        block[..4].copy_from_slice(&a.wrapping_sub(s[0]).to_le_bytes());
        block[4..8].copy_from_slice(&b.wrapping_sub(s[1]).to_le_bytes());
    }
}

#[derive(Clone)]
pub struct Rc6 {
    s: Vec<u32>,
}

block_cipher!(Rc6, block: U16, key: U16, key_len: 1..=255);

impl Rc6 {
    fn expand(key: &[u8]) -> Self {
        Self { s: expand_key(key, 2 * RC6_ROUNDS + 4) }
    }

    #[inline]
    fn quad(x: u32) -> u32 {
        x.wrapping_mul(x.wrapping_mul(2).wrapping_add(1)).rotate_left(5)
    }

    fn encrypt_bytes(&self, block: &mut [u8]) {
        let s = &self.s;
        let mut a = word(block, 0);
        let mut b = word(block, 4).wrapping_add(s[0]);
        let mut c = word(block, 8);
        let mut d = word(block, 12).wrapping_add(s[1]);

        for i in 1..=RC6_ROUNDS {
            let t = Self::quad(b);
            let u = Self::quad(d);
            a = (a ^ t).rotate_left(u).wrapping_add(s[2 * i]);
            c = (c ^ u).rotate_left(t).wrapping_add(s[2 * i + 1]);
            (a, b, c, d) = (b, c, d, a);
        }

        a = a.wrapping_add(s[2 * RC6_ROUNDS + 2]);
        c = c.wrapping_add(s[2 * RC6_ROUNDS + 3]);

        for (chunk, w) in block.chunks_exact_mut(4).zip([a, b, c, d]) {
            chunk.copy_from_slice(&w.to_le_bytes());
        }
    }

    fn decrypt_bytes(&self, block: &mut [u8]) {
        let s = &self.s;
        let mut a = word(block, 0);
        let mut b = word(block, 4);
        let mut c = word(block, 8).wrapping_sub(s[2 * RC6_ROUNDS + 3]);
        let mut d = word(block, 12);
        a = a.wrapping_sub(s[2 * RC6_ROUNDS + 2]);

        for i in (1..=RC6_ROUNDS).rev() {
            (a, b, c, d) = (d, a, b, c);
            let u = Self::quad(d);
            let t = Self::quad(b);
            c = c.wrapping_sub(s[2 * i + 1]).rotate_right(t) ^ u;
            a = a.wrapping_sub(s[2 * i]).rotate_right(u) ^ t;
        }

        d = d.wrapping_sub(s[1]);
        b = b.wrapping_sub(s[0]);

        for (chunk, w) in block.chunks_exact_mut(4).zip([a, b, c, d]) {
            chunk.copy_from_slice(&w.to_le_bytes());
        }
    }
}

#[cfg(test)]
mod tests {
    use cipher::generic_array::GenericArray;
    use cipher::{BlockDecrypt, BlockEncrypt, KeyInit};

    use super::*;

    #[test]
    fn test_rc5_known_answer() {
        let rc5 = Rc5::new_from_slice(&[0u8; 16]).unwrap();
        let mut block = GenericArray::from([0u8; 8]);
        rc5.encrypt_block(&mut block);
        assert_eq!(hex::encode(block), "21a5dbee154b8f6d");
        rc5.decrypt_block(&mut block);
        assert_eq!(block.as_slice(), [0u8; 8]);
    }

    #[test]
    fn test_rc6_known_answer() {
        let rc6 = Rc6::new_from_slice(&[0u8; 16]).unwrap();
        let mut block = GenericArray::from([0u8; 16]);
        rc6.encrypt_block(&mut block);
        assert_eq!(hex::encode(block), "8fc3a53656b1f778c129df4e9848a41e");
        rc6.decrypt_block(&mut block);
        assert_eq!(block.as_slice(), [0u8; 16]);
    }

    #[test]
    fn test_odd_key_lengths_roundtrip() {
        for len in [1usize, 5, 7, 33, 255] {
            let key: Vec<u8> = (0..len).map(|i| i as u8).collect();
            let rc6 = Rc6::new_from_slice(&key).unwrap();
            let mut block = GenericArray::from(*b"sixteen byte blk");
            rc6.encrypt_block(&mut block);
            rc6.decrypt_block(&mut block);
            assert_eq!(block.as_slice(), b"sixteen byte blk");
        }
        assert!(Rc5::new_from_slice(&[]).is_err());
        assert!(Rc5::new_from_slice(&[0u8; 256]).is_err());
    }
}
