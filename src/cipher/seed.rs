//! SEED (RFC 4269): 128-bit block and key, 16-round Feistel network.

use cipher::consts::U16;

const ROUNDS: usize = 16;
const KC0: u32 = 0x9E37_79B9;
const MASKS: [u8; 4] = [0xfc, 0xf3, 0xcf, 0x3f];

const S1: [u8; 256] = [
    0xa9, 0x85, 0xd6, 0xd3, 0x54, 0x1d, 0xac, 0x25, 0x5d, 0x43, 0x18, 0x1e, 0x51, 0xfc, 0xca, 0x63,
    0x28, 0x44, 0x20, 0x9d, 0xe0, 0xe2, 0xc8, 0x17, 0xa5, 0x8f, 0x03, 0x7b, 0xbb, 0x13, 0xd2, 0xee,
    0x70, 0x8c, 0x3f, 0xa8, 0x32, 0xdd, 0xf6, 0x74, 0xec, 0x95, 0x0b, 0x57, 0x5c, 0x5b, 0xbd, 0x01,
    0x24, 0x1c, 0x73, 0x98, 0x10, 0xcc, 0xf2, 0xd9, 0x2c, 0xe7, 0x72, 0x83, 0x9b, 0xd1, 0x86, 0xc9,
    0x60, 0x50, 0xa3, 0xeb, 0x0d, 0xb6, 0x9e, 0x4f, 0xb7, 0x5a, 0xc6, 0x78, 0xa6, 0x12, 0xaf, 0xd5,
    0x61, 0xc3, 0xb4, 0x41, 0x52, 0x7d, 0x8d, 0x08, 0x1f, 0x99, 0x00, 0x19, 0x04, 0x53, 0xf7, 0xe1,
    0xfd, 0x76, 0x2f, 0x27, 0xb0, 0x8b, 0x0e, 0xab, 0xa2, 0x6e, 0x93, 0x4d, 0x69, 0x7c, 0x09, 0x0a,
    0xbf, 0xef, 0xf3, 0xc5, 0x87, 0x14, 0xfe, 0x64, 0xde, 0x2e, 0x4b, 0x1a, 0x06, 0x21, 0x6b, 0x66,
    0x02, 0xf5, 0x92, 0x8a, 0x0c, 0xb3, 0x7e, 0xd0, 0x7a, 0x47, 0x96, 0xe5, 0x26, 0x80, 0xad, 0xdf,
    0xa1, 0x30, 0x37, 0xae, 0x36, 0x15, 0x22, 0x38, 0xf4, 0xa7, 0x45, 0x4c, 0x81, 0xe9, 0x84, 0x97,
    0x35, 0xcb, 0xce, 0x3c, 0x71, 0x11, 0xc7, 0x89, 0x75, 0xfb, 0xda, 0xf8, 0x94, 0x59, 0x82, 0xc4,
    0xff, 0x49, 0x39, 0x67, 0xc0, 0xcf, 0xd7, 0xb8, 0x0f, 0x8e, 0x42, 0x23, 0x91, 0x6c, 0xdb, 0xa4,
    0x34, 0xf1, 0x48, 0xc2, 0x6f, 0x3d, 0x2d, 0x40, 0xbe, 0x3e, 0xbc, 0xc1, 0xaa, 0xba, 0x4e, 0x55,
    0x3b, 0xdc, 0x68, 0x7f, 0x9c, 0xd8, 0x4a, 0x56, 0x77, 0xa0, 0xed, 0x46, 0xb5, 0x2b, 0x65, 0xfa,
    0xe3, 0xb9, 0xb1, 0x9f, 0x5e, 0xf9, 0xe6, 0xb2, 0x31, 0xea, 0x6d, 0x5f, 0xe4, 0xf0, 0xcd, 0x88,
    0x16, 0x3a, 0x58, 0xd4, 0x62, 0x29, 0x07, 0x33, 0xe8, 0x1b, 0x05, 0x79, 0x90, 0x6a, 0x2a, 0x9a,
];

const S2: [u8; 256] = [
    0x38, 0xe8, 0x2d, 0xa6, 0xcf, 0xde, 0xb3, 0xb8, 0xaf, 0x60, 0x55, 0xc7, 0x44, 0x6f, 0x6b, 0x5b,
    0xc3, 0x62, 0x33, 0xb5, 0x29, 0xa0, 0xe2, 0xa7, 0xd3, 0x91, 0x11, 0x06, 0x1c, 0xbc, 0x36, 0x4b,
    0xef, 0x88, 0x6c, 0xa8, 0x17, 0xc4, 0x16, 0xf4, 0xc2, 0x45, 0xe1, 0xd6, 0x3f, 0x3d, 0x8e, 0x98,
    0x28, 0x4e, 0xf6, 0x3e, 0xa5, 0xf9, 0x0d, 0xdf, 0xd8, 0x2b, 0x66, 0x7a, 0x27, 0x2f, 0xf1, 0x72,
    0x42, 0xd4, 0x41, 0xc0, 0x73, 0x67, 0xac, 0x8b, 0xf7, 0xad, 0x80, 0x1f, 0xca, 0x2c, 0xaa, 0x34,
    0xd2, 0x0b, 0xee, 0xe9, 0x5d, 0x94, 0x18, 0xf8, 0x57, 0xae, 0x08, 0xc5, 0x13, 0xcd, 0x86, 0xb9,
    0xff, 0x7d, 0xc1, 0x31, 0xf5, 0x8a, 0x6a, 0xb1, 0xd1, 0x20, 0xd7, 0x02, 0x22, 0x04, 0x68, 0x71,
    0x07, 0xdb, 0x9d, 0x99, 0x61, 0xbe, 0xe6, 0x59, 0xdd, 0x51, 0x90, 0xdc, 0x9a, 0xa3, 0xab, 0xd0,
    0x81, 0x0f, 0x47, 0x1a, 0xe3, 0xec, 0x8d, 0xbf, 0x96, 0x7b, 0x5c, 0xa2, 0xa1, 0x63, 0x23, 0x4d,
    0xc8, 0x9e, 0x9c, 0x3a, 0x0c, 0x2e, 0xba, 0x6e, 0x9f, 0x5a, 0xf2, 0x92, 0xf3, 0x49, 0x78, 0xcc,
    0x15, 0xfb, 0x70, 0x75, 0x7f, 0x35, 0x10, 0x03, 0x64, 0x6d, 0xc6, 0x74, 0xd5, 0xb4, 0xea, 0x09,
    0x76, 0x19, 0xfe, 0x40, 0x12, 0xe0, 0xbd, 0x05, 0xfa, 0x01, 0xf0, 0x2a, 0x5e, 0xa9, 0x56, 0x43,
    0x85, 0x14, 0x89, 0x9b, 0xb0, 0xe5, 0x48, 0x79, 0x97, 0xfc, 0x1e, 0x82, 0x21, 0x8c, 0x1b, 0x5f,
    0x77, 0x54, 0xb2, 0x1d, 0x25, 0x4f, 0x00, 0x46, 0xed, 0x58, 0x52, 0xeb, 0x7e, 0xda, 0xc9, 0xfd,
    0x30, 0x95, 0x65, 0x3c, 0xb6, 0xe4, 0xbb, 0x7c, 0x0e, 0x50, 0x39, 0x26, 0x32, 0x84, 0x69, 0x93,
    0x37, 0xe7, 0x24, 0xa4, 0xcb, 0x53, 0x0a, 0x87, 0xd9, 0x4c, 0x83, 0x8f, 0xce, 0x3b, 0x4a, 0xb7,
];

fn g(y: u32) -> u32 {
    let [y0, y1, y2, y3] = y.to_le_bytes();
    let s = [S1[usize::from(y0)], S2[usize::from(y1)], S1[usize::from(y2)], S2[usize::from(y3)]];

    let mut z = [0u8; 4];
    for (j, out) in z.iter_mut().enumerate() {
        *out = (0..4).fold(0, |acc, i| acc ^ (s[i] & MASKS[(i + j) % 4]));
    }
    u32::from_le_bytes(z)
}

fn f(c: u32, d: u32, k: (u32, u32)) -> (u32, u32) {
    let mut t0 = c ^ k.0;
    let mut t1 = d ^ k.1;
    t1 ^= t0;
    t1 = g(t1);
    t0 = t0.wrapping_add(t1);
    t0 = g(t0);
    t1 = t1.wrapping_add(t0);
    t1 = g(t1);
    t0 = t0.wrapping_add(t1);
    (t0, t1)
}

#[derive(Clone)]
pub struct Seed {
    round_keys: [(u32, u32); ROUNDS],
}

block_cipher!(Seed, block: U16, key: U16, key_len: 16);

impl Seed {
    fn expand(key: &[u8]) -> Self {
        let [mut a, mut b, mut c, mut d] = load(key);
        let mut kc = KC0;
        let mut round_keys = [(0u32, 0u32); ROUNDS];

        for (i, round_key) in round_keys.iter_mut().enumerate() {
            *round_key = (g(a.wrapping_add(c).wrapping_sub(kc)), g(b.wrapping_sub(d).wrapping_add(kc)));
            if i % 2 == 0 {
                let ab = ((u64::from(a) << 32) | u64::from(b)).rotate_right(8);
                (a, b) = ((ab >> 32) as u32, ab as u32);
            } else {
                let cd = ((u64::from(c) << 32) | u64::from(d)).rotate_left(8);
                (c, d) = ((cd >> 32) as u32, cd as u32);
            }
            kc = kc.rotate_left(1);
        }

        Self { round_keys }
    }

    fn encrypt_bytes(&self, block: &mut [u8]) {
        Self::rounds(block, self.round_keys.iter());
    }

    fn decrypt_bytes(&self, block: &mut [u8]) {
        Self::rounds(block, self.round_keys.iter().rev());
    }

    fn rounds<'a>(block: &mut [u8], keys: impl Iterator<Item = &'a (u32, u32)>) {
        let [mut l0, mut l1, mut r0, mut r1] = load(block);

        for (i, &key) in keys.enumerate() {
            let (t0, t1) = f(r0, r1, key);
            l0 ^= t0;
            l1 ^= t1;
            if i < ROUNDS - 1 {
                (l0, l1, r0, r1) = (r0, r1, l0, l1);
            }
        }

        for (chunk, word) in block.chunks_exact_mut(4).zip([l0, l1, r0, r1]) {
            chunk.copy_from_slice(&word.to_be_bytes());
        }
    }
}

fn load(bytes: &[u8]) -> [u32; 4] {
    let mut words = [0u32; 4];
    for (word, chunk) in words.iter_mut().zip(bytes.chunks_exact(4)) {
        *word = u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
    }
    words
}

#[cfg(test)]
mod tests {
    use cipher::generic_array::GenericArray;
    use cipher::{BlockDecrypt, BlockEncrypt, KeyInit};

    use super::*;

    #[test]
    fn test_known_answer() {
        let seed = Seed::new_from_slice(&[0u8; 16]).unwrap();
        let plain: [u8; 16] = core::array::from_fn(|i| i as u8);
        let mut block = GenericArray::from(plain);
        seed.encrypt_block(&mut block);
        assert_eq!(hex::encode(block), "5ebac6e0054e166819aff1cc6d346cdb");
        seed.decrypt_block(&mut block);
        assert_eq!(block.as_slice(), plain);
    }

    #[test]
    fn test_key_length() {
        assert!(Seed::new_from_slice(&[0u8; 24]).is_err());
    }
}
