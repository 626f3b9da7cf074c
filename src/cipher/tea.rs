//! TEA and XTEA, 64-bit blocks with 128-bit keys, big-endian word order.

use cipher::consts::{U8, U16};

const DELTA: u32 = 0x9E37_79B9;
const ROUNDS: u32 = 32;

fn key_words(key: &[u8]) -> [u32; 4] {
    let mut words = [0u32; 4];
    for (word, chunk) in words.iter_mut().zip(key.chunks_exact(4)) {
        *word = u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
    }
    words
}

#[inline]
fn load(block: &[u8]) -> (u32, u32) {
    (u32::from_be_bytes([block[0], block[1], block[2], block[3]]), u32::from_be_bytes([block[4], block[5], block[6], block[7]]))
}

#[inline]
fn store(block: &mut [u8], v0: u32, v1: u32) {
    block[..4].copy_from_slice(&v0.to_be_bytes());
    block[4..8].copy_from_slice(&v1.to_be_bytes());
}

#[derive(Clone)]
pub struct Tea {
    key: [u32; 4],
}

block_cipher!(Tea, block: U8, key: U16, key_len: 16);

impl Tea {
    fn expand(key: &[u8]) -> Self {
        Self { key: key_words(key) }
    }

    fn encrypt_bytes(&self, block: &mut [u8]) {
        let [k0, k1, k2, k3] = self.key;
        let (mut v0, mut v1) = load(block);
        let mut sum = 0u32;

        for _ in 0..ROUNDS {
            sum = sum.wrapping_add(DELTA);
            v0 = v0.wrapping_add((v1 << 4).wrapping_add(k0) ^ v1.wrapping_add(sum) ^ (v1 >> 5).wrapping_add(k1));
            v1 = v1.wrapping_add((v0 << 4).wrapping_add(k2) ^ v0.wrapping_add(sum) ^ (v0 >> 5).wrapping_add(k3));
        }

        store(block, v0, v1);
    }

    fn decrypt_bytes(&self, block: &mut [u8]) {
        let [k0, k1, k2, k3] = self.key;
        let (mut v0, mut v1) = load(block);
        let mut sum = DELTA.wrapping_mul(ROUNDS);

        for _ in 0..ROUNDS {
            v1 = v1.wrapping_sub((v0 << 4).wrapping_add(k2) ^ v0.wrapping_add(sum) ^ (v0 >> 5).wrapping_add(k3));
            v0 = v0.wrapping_sub((v1 << 4).wrapping_add(k0) ^ v1.wrapping_add(sum) ^ (v1 >> 5).wrapping_add(k1));
            sum = sum.wrapping_sub(DELTA);
        }

        store(block, v0, v1);
    }
}

#[derive(Clone)]
pub struct Xtea {
    key: [u32; 4],
}

block_cipher!(Xtea, block: U8, key: U16, key_len: 16);

impl Xtea {
    fn expand(key: &[u8]) -> Self {
        Self { key: key_words(key) }
    }

    #[inline]
    fn mix(v: u32) -> u32 {
        ((v << 4) ^ (v >> 5)).wrapping_add(v)
    }

    fn encrypt_bytes(&self, block: &mut [u8]) {
        let k = &self.key;
        let (mut v0, mut v1) = load(block);
        let mut sum = 0u32;

        for _ in 0..ROUNDS {
            v0 = v0.wrapping_add(Self::mix(v1) ^ sum.wrapping_add(k[(sum & 3) as usize]));
            sum = sum.wrapping_add(DELTA);
            v1 = v1.wrapping_add(Self::mix(v0) ^ sum.wrapping_add(k[((sum >> 11) & 3) as usize]));
        }

        store(block, v0, v1);
    }

    fn decrypt_bytes(&self, block: &mut [u8]) {
        let k = &self.key;
        let (mut v0, mut v1) = load(block);
        let mut sum = DELTA.wrapping_mul(ROUNDS);

        for _ in 0..ROUNDS {
            v1 = v1.wrapping_sub(Self::mix(v0) ^ sum.wrapping_add(k[((sum >> 11) & 3) as usize]));
            sum = sum.wrapping_sub(DELTA);
            v0 = v0.wrapping_sub(Self::mix(v1) ^ sum.wrapping_add(k[(sum & 3) as usize]));
        }

        store(block, v0, v1);
    }
}

#[cfg(test)]
mod tests {
    use cipher::generic_array::GenericArray;
    use cipher::{BlockDecrypt, BlockEncrypt, KeyInit};

    use super::*;

    #[test]
    fn test_tea_known_answer() {
        let tea = Tea::new_from_slice(&[0u8; 16]).unwrap();
        let mut block = GenericArray::from([0u8; 8]);
        tea.encrypt_block(&mut block);
        assert_eq!(hex::encode(block), "41ea3a0a94baa940");
        tea.decrypt_block(&mut block);
        assert_eq!(block.as_slice(), [0u8; 8]);
    }

    #[test]
    fn test_xtea_known_answer() {
        let key: Vec<u8> = (0u8..16).collect();
        let xtea = Xtea::new_from_slice(&key).unwrap();
        let mut block = GenericArray::from(*b"ABCDEFGH");
        xtea.encrypt_block(&mut block);
        assert_eq!(hex::encode(block), "497df3d072612cb5");
        xtea.decrypt_block(&mut block);
        assert_eq!(block.as_slice(), b"ABCDEFGH");
    }

    #[test]
    fn test_key_length() {
        assert!(Tea::new_from_slice(&[0u8; 15]).is_err());
        assert!(Xtea::new_from_slice(&[]).is_err());
    }
}
