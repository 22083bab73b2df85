// Copyright (c) 2024 Botho Foundation

//! Key schedule and the 16-round Feistel network.

use crate::tables::{h, rs_multiply, MDS_COLUMNS, Q0, Q1};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Key length in bytes.
pub const KEY_LENGTH: usize = 16;

/// Block length in bytes.
pub const BLOCK_LENGTH: usize = 16;

const ROUNDS: usize = 16;
const SUBKEYS: usize = 8 + 2 * ROUNDS;
const RHO: u32 = 0x0101_0101;

/// An expanded 128-bit key: 40 round subkeys plus the key-dependent
/// S-boxes already diffused through the MDS matrix, one table per byte
/// lane.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Twofish128 {
    subkeys: [u32; SUBKEYS],
    sboxes: [[u32; 256]; 4],
}

impl Twofish128 {
    /// Expand `key`.
    pub fn new(key: &[u8; KEY_LENGTH]) -> Self {
        let even = [
            [key[0], key[1], key[2], key[3]],
            [key[8], key[9], key[10], key[11]],
        ];
        let odd = [
            [key[4], key[5], key[6], key[7]],
            [key[12], key[13], key[14], key[15]],
        ];

        let mut subkeys = [0u32; SUBKEYS];
        for (i, pair) in subkeys.chunks_exact_mut(2).enumerate() {
            let i = i as u32;
            let a = h((2 * i).wrapping_mul(RHO), &even[0], &even[1]);
            let b = h((2 * i + 1).wrapping_mul(RHO), &odd[0], &odd[1]).rotate_left(8);
            pair[0] = a.wrapping_add(b);
            pair[1] = a.wrapping_add(b.wrapping_mul(2)).rotate_left(9);
        }

        // The RS vector of the first key half is applied first.
        let mut inner = rs_multiply(&key[..8]);
        let mut outer = rs_multiply(&key[8..]);

        let mut sboxes = [[0u32; 256]; 4];
        for x in 0..256 {
            let y0 = Q1[(Q0[(Q0[x] ^ inner[0]) as usize] ^ outer[0]) as usize];
            let y1 = Q0[(Q0[(Q1[x] ^ inner[1]) as usize] ^ outer[1]) as usize];
            let y2 = Q1[(Q1[(Q0[x] ^ inner[2]) as usize] ^ outer[2]) as usize];
            let y3 = Q0[(Q1[(Q1[x] ^ inner[3]) as usize] ^ outer[3]) as usize];
            sboxes[0][x] = MDS_COLUMNS[0][y0 as usize];
            sboxes[1][x] = MDS_COLUMNS[1][y1 as usize];
            sboxes[2][x] = MDS_COLUMNS[2][y2 as usize];
            sboxes[3][x] = MDS_COLUMNS[3][y3 as usize];
        }
        inner.zeroize();
        outer.zeroize();

        Self { subkeys, sboxes }
    }

    fn g(&self, x: u32) -> u32 {
        let [b0, b1, b2, b3] = x.to_le_bytes();
        self.sboxes[0][b0 as usize]
            ^ self.sboxes[1][b1 as usize]
            ^ self.sboxes[2][b2 as usize]
            ^ self.sboxes[3][b3 as usize]
    }

    fn round_function(&self, r0: u32, r1: u32, round: usize) -> (u32, u32) {
        let t0 = self.g(r0);
        let t1 = self.g(r1.rotate_left(8));
        let k = &self.subkeys[8 + 2 * round..10 + 2 * round];
        (
            t0.wrapping_add(t1).wrapping_add(k[0]),
            t0.wrapping_add(t1.wrapping_mul(2)).wrapping_add(k[1]),
        )
    }

    /// Encrypt one block.
    pub fn encrypt_block(&self, block: &[u8; BLOCK_LENGTH]) -> [u8; BLOCK_LENGTH] {
        let k = &self.subkeys;
        let [mut a, mut b, mut c, mut d] = load(block, [k[0], k[1], k[2], k[3]]);

        for round in 0..ROUNDS {
            let (f0, f1) = self.round_function(a, b, round);
            c = (c ^ f0).rotate_right(1);
            d = d.rotate_left(1) ^ f1;
            (a, b, c, d) = (c, d, a, b);
        }

        store([c ^ k[4], d ^ k[5], a ^ k[6], b ^ k[7]])
    }

    /// Decrypt one block.
    pub fn decrypt_block(&self, block: &[u8; BLOCK_LENGTH]) -> [u8; BLOCK_LENGTH] {
        let k = &self.subkeys;
        let [mut a, mut b, mut c, mut d] = load(block, [k[4], k[5], k[6], k[7]]);

        for round in (0..ROUNDS).rev() {
            let (f0, f1) = self.round_function(a, b, round);
            c = c.rotate_left(1) ^ f0;
            d = (d ^ f1).rotate_right(1);
            (a, b, c, d) = (c, d, a, b);
        }

        store([c ^ k[0], d ^ k[1], a ^ k[2], b ^ k[3]])
    }
}

fn load(block: &[u8; BLOCK_LENGTH], whitening: [u32; 4]) -> [u32; 4] {
    let mut words = [0u32; 4];
    for ((word, chunk), key) in words
        .iter_mut()
        .zip(block.chunks_exact(4))
        .zip(whitening)
    {
        *word = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]) ^ key;
    }
    words
}

fn store(words: [u32; 4]) -> [u8; BLOCK_LENGTH] {
    let mut block = [0u8; BLOCK_LENGTH];
    for (chunk, word) in block.chunks_exact_mut(4).zip(words) {
        chunk.copy_from_slice(&word.to_le_bytes());
    }
    block
}

/// Encrypt a single block under `key`.
pub fn encrypt128(key: &[u8; KEY_LENGTH], block: &[u8; BLOCK_LENGTH]) -> [u8; BLOCK_LENGTH] {
    Twofish128::new(key).encrypt_block(block)
}

/// Decrypt a single block under `key`.
pub fn decrypt128(key: &[u8; KEY_LENGTH], block: &[u8; BLOCK_LENGTH]) -> [u8; BLOCK_LENGTH] {
    Twofish128::new(key).decrypt_block(block)
}
