// Copyright (c) 2024 Botho Foundation

//! Counter-tweaked chain mode.

use crate::cipher::{Twofish128, BLOCK_LENGTH, KEY_LENGTH};
use zeroize::Zeroize;

/// Encrypt whole blocks of `input` into `output`.
///
/// Processes `min(input.len(), output.len()) / 16` blocks and returns the
/// number of bytes written. Bytes past the last whole block are left as
/// they were.
pub fn encrypt128_chain(key: &[u8; KEY_LENGTH], input: &[u8], output: &mut [u8]) -> usize {
    chain(key, input, output, Twofish128::encrypt_block)
}

/// Decrypt whole blocks of `input` into `output`; the mirror of
/// [`encrypt128_chain`].
pub fn decrypt128_chain(key: &[u8; KEY_LENGTH], input: &[u8], output: &mut [u8]) -> usize {
    chain(key, input, output, Twofish128::decrypt_block)
}

fn chain(
    key: &[u8; KEY_LENGTH],
    input: &[u8],
    output: &mut [u8],
    transform: fn(&Twofish128, &[u8; BLOCK_LENGTH]) -> [u8; BLOCK_LENGTH],
) -> usize {
    let mut counter = [0u8; KEY_LENGTH];
    let mut block_key = [0u8; KEY_LENGTH];
    let mut processed = 0;

    for (source, target) in input
        .chunks_exact(BLOCK_LENGTH)
        .zip(output.chunks_exact_mut(BLOCK_LENGTH))
    {
        for ((k, &base), &tweak) in block_key.iter_mut().zip(key.iter()).zip(counter.iter()) {
            *k = base ^ tweak;
        }

        let mut block = [0u8; BLOCK_LENGTH];
        block.copy_from_slice(source);
        target.copy_from_slice(&transform(&Twofish128::new(&block_key), &block));

        increment(&mut counter);
        processed += BLOCK_LENGTH;
    }

    block_key.zeroize();
    processed
}

/// Little-endian increment with carry.
fn increment(counter: &mut [u8; KEY_LENGTH]) {
    for byte in counter.iter_mut() {
        *byte = byte.wrapping_add(1);
        if *byte != 0 {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cipher::{decrypt128, encrypt128};

    fn key() -> [u8; KEY_LENGTH] {
        core::array::from_fn(|i| i as u8)
    }

    #[test]
    fn test_known_chain_output() {
        let plain = [0u8; 48];
        let mut cipher = [0u8; 48];
        assert_eq!(encrypt128_chain(&key(), &plain, &mut cipher), 48);
        assert_eq!(
            hex::encode(cipher),
            "6275e8ca35b36c108ad6d5f84f0cc5a3\
             93591065db01c42e9b5e43d69928ab52\
             276887cc145a98521a416305c192aeb1"
        );
    }

    #[test]
    fn test_first_block_uses_bare_key() {
        let plain = [0x5au8; 32];
        let mut cipher = [0u8; 32];
        encrypt128_chain(&key(), &plain, &mut cipher);

        let first: [u8; 16] = cipher[..16].try_into().unwrap();
        assert_eq!(first, encrypt128(&key(), &[0x5a; 16]));

        let mut second_key = key();
        second_key[0] ^= 1;
        let second: [u8; 16] = cipher[16..].try_into().unwrap();
        assert_eq!(decrypt128(&second_key, &second), [0x5a; 16]);
    }

    #[test]
    fn test_equal_blocks_encrypt_differently() {
        let plain = [0x33u8; 64];
        let mut cipher = [0u8; 64];
        encrypt128_chain(&key(), &plain, &mut cipher);
        assert_ne!(cipher[..16], cipher[16..32]);
        assert_ne!(cipher[16..32], cipher[32..48]);
    }

    #[test]
    fn test_partial_tail_is_untouched() {
        let plain = [0x77u8; 40];
        let mut cipher = [0xeeu8; 40];
        assert_eq!(encrypt128_chain(&key(), &plain, &mut cipher), 32);
        assert_eq!(&cipher[32..], &[0xee; 8]);

        let mut back = [0u8; 40];
        assert_eq!(decrypt128_chain(&key(), &cipher, &mut back), 32);
        assert_eq!(&back[..32], &plain[..32]);
        assert_eq!(&back[32..], &[0u8; 8]);
    }

    #[test]
    fn test_shorter_output_bounds_the_work() {
        let plain = [1u8; 64];
        let mut cipher = [0u8; 20];
        assert_eq!(encrypt128_chain(&key(), &plain, &mut cipher), 16);
        assert_eq!(&cipher[16..], &[0u8; 4]);
    }

    #[test]
    fn test_counter_carries() {
        let mut counter = [0u8; KEY_LENGTH];
        counter[0] = 0xff;
        counter[1] = 0xff;
        increment(&mut counter);
        assert_eq!(&counter[..3], &[0, 0, 1]);

        let mut wrapped = [0xffu8; KEY_LENGTH];
        increment(&mut wrapped);
        assert_eq!(wrapped, [0u8; KEY_LENGTH]);
    }

    #[test]
    fn test_empty_input() {
        let mut out: [u8; 0] = [];
        assert_eq!(encrypt128_chain(&key(), &[], &mut out), 0);
    }
}
