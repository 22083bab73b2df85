// Copyright (c) 2024 Botho Foundation

//! Fixed Twofish tables, generated at compile time.

use anla_util_polynomial::{multiply, reduce};

/// `x^8 + x^6 + x^5 + x^3 + 1`, the MDS field.
const MDS_MODULUS: u64 = 0b1_0110_1001;

/// `x^8 + x^6 + x^3 + x^2 + 1`, the RS field.
const RS_MODULUS: u64 = 0b1_0100_1101;

const MDS: [[u8; 4]; 4] = [
    [0x01, 0xef, 0x5b, 0x5b],
    [0x5b, 0xef, 0xef, 0x01],
    [0xef, 0x5b, 0x01, 0xef],
    [0xef, 0x01, 0xef, 0x5b],
];

const RS: [[u8; 8]; 4] = [
    [0x01, 0xa4, 0x55, 0x87, 0x5a, 0x58, 0xdb, 0x9e],
    [0xa4, 0x56, 0x82, 0xf3, 0x1e, 0xc6, 0x68, 0xe5],
    [0x02, 0xa1, 0xfc, 0xc1, 0x47, 0xae, 0x3d, 0x19],
    [0xa4, 0x55, 0x87, 0x5a, 0x58, 0xdb, 0x9e, 0x03],
];

/// Nibble permutations `t0..t3` defining `q0`.
const Q0_NIBBLES: [[u8; 16]; 4] = [
    [0x8, 0x1, 0x7, 0xd, 0x6, 0xf, 0x3, 0x2, 0x0, 0xb, 0x5, 0x9, 0xe, 0xc, 0xa, 0x4],
    [0xe, 0xc, 0xb, 0x8, 0x1, 0x2, 0x3, 0x5, 0xf, 0x4, 0xa, 0x6, 0x7, 0x0, 0x9, 0xd],
    [0xb, 0xa, 0x5, 0xe, 0x6, 0xd, 0x9, 0x0, 0xc, 0x8, 0xf, 0x3, 0x2, 0x4, 0x7, 0x1],
    [0xd, 0x7, 0xf, 0x4, 0x1, 0x2, 0x6, 0xe, 0x9, 0xb, 0x3, 0x0, 0x8, 0x5, 0xc, 0xa],
];

/// Nibble permutations `t0..t3` defining `q1`.
const Q1_NIBBLES: [[u8; 16]; 4] = [
    [0x2, 0x8, 0xb, 0xd, 0xf, 0x7, 0x6, 0xe, 0x3, 0x1, 0x9, 0x4, 0x0, 0xa, 0xc, 0x5],
    [0x1, 0xe, 0x2, 0xb, 0x4, 0xc, 0x3, 0x7, 0x6, 0xd, 0xa, 0x5, 0xf, 0x9, 0x0, 0x8],
    [0x4, 0xc, 0x7, 0x5, 0x1, 0x6, 0x9, 0xa, 0x0, 0xe, 0xd, 0x8, 0x2, 0xb, 0x3, 0xf],
    [0xb, 0x9, 0x5, 0x1, 0xc, 0x3, 0xd, 0xe, 0x6, 0x4, 0x7, 0xf, 0x2, 0x0, 0x8, 0xa],
];

/// Fixed byte permutation `q0`.
pub(crate) const Q0: [u8; 256] = permutation(&Q0_NIBBLES);

/// Fixed byte permutation `q1`.
pub(crate) const Q1: [u8; 256] = permutation(&Q1_NIBBLES);

/// `MDS_COLUMNS[j][y]` is column `j` of the MDS matrix scaled by `y`, packed
/// little-endian (row 0 in the low byte).
pub(crate) const MDS_COLUMNS: [[u32; 256]; 4] = mds_columns();

const fn field_multiply(a: u8, b: u8, modulus: u64) -> u8 {
    reduce(multiply(a as u32, b as u32), modulus) as u8
}

const fn rotate_nibble(x: u8) -> u8 {
    ((x >> 1) | (x << 3)) & 0xf
}

const fn permute(nibbles: &[[u8; 16]; 4], x: u8) -> u8 {
    let a0 = x >> 4;
    let b0 = x & 0xf;
    let a1 = a0 ^ b0;
    let b1 = a0 ^ rotate_nibble(b0) ^ ((a0 << 3) & 0xf);
    let a2 = nibbles[0][a1 as usize];
    let b2 = nibbles[1][b1 as usize];
    let a3 = a2 ^ b2;
    let b3 = a2 ^ rotate_nibble(b2) ^ ((a2 << 3) & 0xf);
    let a4 = nibbles[2][a3 as usize];
    let b4 = nibbles[3][b3 as usize];
    (b4 << 4) | a4
}

const fn permutation(nibbles: &[[u8; 16]; 4]) -> [u8; 256] {
    let mut table = [0u8; 256];
    let mut x = 0;
    while x < 256 {
        table[x] = permute(nibbles, x as u8);
        x += 1;
    }
    table
}

const fn mds_columns() -> [[u32; 256]; 4] {
    let mut columns = [[0u32; 256]; 4];
    let mut column = 0;
    while column < 4 {
        let mut y = 0;
        while y < 256 {
            let mut word = 0u32;
            let mut row = 0;
            while row < 4 {
                let z = field_multiply(MDS[row][column], y as u8, MDS_MODULUS);
                word |= (z as u32) << (8 * row);
                row += 1;
            }
            columns[column][y] = word;
            y += 1;
        }
        column += 1;
    }
    columns
}

/// Multiply eight key bytes by the RS matrix.
pub(crate) fn rs_multiply(key_bytes: &[u8]) -> [u8; 4] {
    let mut s = [0u8; 4];
    for (out, row) in s.iter_mut().zip(RS.iter()) {
        for (&coefficient, &byte) in row.iter().zip(key_bytes.iter()) {
            *out ^= field_multiply(coefficient, byte, RS_MODULUS);
        }
    }
    s
}

/// The `h` function for a two-word key list.
///
/// `inner` is applied first, after the first permutation layer; `outer`
/// after the second.
pub(crate) fn h(x: u32, outer: &[u8; 4], inner: &[u8; 4]) -> u32 {
    let [x0, x1, x2, x3] = x.to_le_bytes();
    let y0 = Q1[(Q0[(Q0[x0 as usize] ^ inner[0]) as usize] ^ outer[0]) as usize];
    let y1 = Q0[(Q0[(Q1[x1 as usize] ^ inner[1]) as usize] ^ outer[1]) as usize];
    let y2 = Q1[(Q1[(Q0[x2 as usize] ^ inner[2]) as usize] ^ outer[2]) as usize];
    let y3 = Q0[(Q1[(Q1[x3 as usize] ^ inner[3]) as usize] ^ outer[3]) as usize];

    MDS_COLUMNS[0][y0 as usize]
        ^ MDS_COLUMNS[1][y1 as usize]
        ^ MDS_COLUMNS[2][y2 as usize]
        ^ MDS_COLUMNS[3][y3 as usize]
}
