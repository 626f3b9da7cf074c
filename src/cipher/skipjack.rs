//! Skipjack: 64-bit block, 80-bit key, 32 steps of rules A and B.

use cipher::consts::{U8, U10};

const KEY_SIZE: usize = 10;
const STEPS: u16 = 32;

const F: [u8; 256] = [
    0xa3, 0xd7, 0x09, 0x83, 0xf8, 0x48, 0xf6, 0xf4, 0xb3, 0x21, 0x15, 0x78, 0x99, 0xb1, 0xaf, 0xf9,
    0xe7, 0x2d, 0x4d, 0x8a, 0xce, 0x4c, 0xca, 0x2e, 0x52, 0x95, 0xd9, 0x1e, 0x4e, 0x38, 0x44, 0x28,
    0x0a, 0xdf, 0x02, 0xa0, 0x17, 0xf1, 0x60, 0x68, 0x12, 0xb7, 0x7a, 0xc3, 0xe9, 0xfa, 0x3d, 0x53,
    0x96, 0x84, 0x6b, 0xba, 0xf2, 0x63, 0x9a, 0x19, 0x7c, 0xae, 0xe5, 0xf5, 0xf7, 0x16, 0x6a, 0xa2,
    0x39, 0xb6, 0x7b, 0x0f, 0xc1, 0x93, 0x81, 0x1b, 0xee, 0xb4, 0x1a, 0xea, 0xd0, 0x91, 0x2f, 0xb8,
    0x55, 0xb9, 0xda, 0x85, 0x3f, 0x41, 0xbf, 0xe0, 0x5a, 0x58, 0x80, 0x5f, 0x66, 0x0b, 0xd8, 0x90,
    0x35, 0xd5, 0xc0, 0xa7, 0x33, 0x06, 0x65, 0x69, 0x45, 0x00, 0x94, 0x56, 0x6d, 0x98, 0x9b, 0x76,
    0x97, 0xfc, 0xb2, 0xc2, 0xb0, 0xfe, 0xdb, 0x20, 0xe1, 0xeb, 0xd6, 0xe4, 0xdd, 0x47, 0x4a, 0x1d,
    0x42, 0xed, 0x9e, 0x6e, 0x49, 0x3c, 0xcd, 0x43, 0x27, 0xd2, 0x07, 0xd4, 0xde, 0xc7, 0x67, 0x18,
    0x89, 0xcb, 0x30, 0x1f, 0x8d, 0xc6, 0x8f, 0xaa, 0xc8, 0x74, 0xdc, 0xc9, 0x5d, 0x5c, 0x31, 0xa4,
    0x70, 0x88, 0x61, 0x2c, 0x9f, 0x0d, 0x2b, 0x87, 0x50, 0x82, 0x54, 0x64, 0x26, 0x7d, 0x03, 0x40,
    0x34, 0x4b, 0x1c, 0x73, 0xd1, 0xc4, 0xfd, 0x3b, 0xcc, 0xfb, 0x7f, 0xab, 0xe6, 0x3e, 0x5b, 0xa5,
    0xad, 0x04, 0x23, 0x9c, 0x14, 0x51, 0x22, 0xf0, 0x29, 0x79, 0x71, 0x7e, 0xff, 0x8c, 0x0e, 0xe2,
    0x0c, 0xef, 0xbc, 0x72, 0x75, 0x6f, 0x37, 0xa1, 0xec, 0xd3, 0x8e, 0x62, 0x8b, 0x86, 0x10, 0xe8,
    0x08, 0x77, 0x11, 0xbe, 0x92, 0x4f, 0x24, 0xc5, 0x32, 0x36, 0x9d, 0xcf, 0xf3, 0xa6, 0xbb, 0xac,
    0x5e, 0x6c, 0xa9, 0x13, 0x57, 0x25, 0xb5, 0xe3, 0xbd, 0xa8, 0x3a, 0x01, 0x05, 0x59, 0x2a, 0x46,
];

#[derive(Clone)]
pub struct Skipjack {
    key: [u8; KEY_SIZE],
}

block_cipher!(Skipjack, block: U8, key: U10, key_len: 10..);

impl Skipjack {
    /// Keys longer than 80 bits are truncated to their first ten bytes.
    fn expand(key: &[u8]) -> Self {
        let mut bytes = [0u8; KEY_SIZE];
        bytes.copy_from_slice(&key[..KEY_SIZE]);
        Self { key: bytes }
    }

    #[inline]
    fn subkey(&self, step: u16, offset: usize) -> u8 {
        self.key[(4 * usize::from(step) + offset) % KEY_SIZE]
    }

    fn g(&self, step: u16, w: u16) -> u16 {
        let [g1, g2] = w.to_be_bytes();
        let g3 = F[usize::from(g2 ^ self.subkey(step, 0))] ^ g1;
        let g4 = F[usize::from(g3 ^ self.subkey(step, 1))] ^ g2;
        let g5 = F[usize::from(g4 ^ self.subkey(step, 2))] ^ g3;
        let g6 = F[usize::from(g5 ^ self.subkey(step, 3))] ^ g4;
        u16::from_be_bytes([g5, g6])
    }

    fn g_inv(&self, step: u16, w: u16) -> u16 {
        let [g5, g6] = w.to_be_bytes();
        let g4 = F[usize::from(g5 ^ self.subkey(step, 3))] ^ g6;
        let g3 = F[usize::from(g4 ^ self.subkey(step, 2))] ^ g5;
        let g2 = F[usize::from(g3 ^ self.subkey(step, 1))] ^ g4;
        let g1 = F[usize::from(g2 ^ self.subkey(step, 0))] ^ g3;
        u16::from_be_bytes([g1, g2])
    }

    /// Steps 0..8 and 16..24 use rule A, the rest rule B.
    #[inline]
    fn is_rule_a(step: u16) -> bool {
        (step / 8) % 2 == 0
    }
}

fn load(block: &[u8]) -> [u16; 4] {
    [
        u16::from_be_bytes([block[0], block[1]]),
        u16::from_be_bytes([block[2], block[3]]),
        u16::from_be_bytes([block[4], block[5]]),
        u16::from_be_bytes([block[6], block[7]]),
    ]
}

fn store(block: &mut [u8], w: [u16; 4]) {
    for (chunk, word) in block.chunks_exact_mut(2).zip(w) {
        chunk.copy_from_slice(&word.to_be_bytes());
    }
}

impl Skipjack {
    fn encrypt_bytes(&self, block: &mut [u8]) {
        let mut w = load(block);

        for step in 0..STEPS {
            let counter = step + 1;
            let x = self.g(step, w[0]);
            w = if Self::is_rule_a(step) { [x ^ w[3] ^ counter, x, w[1], w[2]] } else { [w[3], x, w[0] ^ w[1] ^ counter, w[2]] };
        }

        store(block, w);
    }

    fn decrypt_bytes(&self, block: &mut [u8]) {
        let mut w = load(block);

        for step in (0..STEPS).rev() {
            let counter = step + 1;
            let w0 = self.g_inv(step, w[1]);
            w = if Self::is_rule_a(step) { [w0, w[2], w[3], w[0] ^ w[1] ^ counter] } else { [w0, w[2] ^ w0 ^ counter, w[3], w[0]] };
        }

        store(block, w);
    }
}

#[cfg(test)]
mod tests {
    use cipher::generic_array::GenericArray;
    use cipher::{BlockDecrypt, BlockEncrypt, KeyInit};

    use super::*;

    #[test]
    fn test_known_answer() {
        let skipjack = Skipjack::new_from_slice(&hex::decode("00998877665544332211").unwrap()).unwrap();
        let mut block = GenericArray::clone_from_slice(&hex::decode("33221100ddccbbaa").unwrap());
        skipjack.encrypt_block(&mut block);
        assert_eq!(hex::encode(block), "2587cae27a12d300");
        skipjack.decrypt_block(&mut block);
        assert_eq!(hex::encode(block), "33221100ddccbbaa");
    }

    #[test]
    fn test_long_key_truncates() {
        let short = Skipjack::new_from_slice(b"0123456789").unwrap();
        let long = Skipjack::new_from_slice(b"0123456789abcdef").unwrap();
        let (mut a, mut b) = (GenericArray::from([7u8; 8]), GenericArray::from([7u8; 8]));
        short.encrypt_block(&mut a);
        long.encrypt_block(&mut b);
        assert_eq!(a, b);
        assert!(Skipjack::new_from_slice(b"012345678").is_err());
    }
}
