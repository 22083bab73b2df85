// Copyright (c) 2024 Botho Foundation

//! Property tests for the Twofish block cipher and chain mode.

use anla_crypto_twofish::{
    decrypt128, decrypt128_chain, encrypt128, encrypt128_chain, BLOCK_LENGTH,
};
use proptest::prelude::*;

proptest! {
    /// Property: block decryption inverts block encryption.
    #[test]
    fn prop_block_roundtrip(
        key in prop::array::uniform16(any::<u8>()),
        plain in prop::array::uniform16(any::<u8>()),
    ) {
        let cipher = encrypt128(&key, &plain);
        prop_assert_eq!(decrypt128(&key, &cipher), plain);
    }

    /// Property: chain decryption inverts chain encryption for every
    /// whole-block length, each side starting from a fresh counter.
    #[test]
    fn prop_chain_roundtrip(
        key in prop::array::uniform16(any::<u8>()),
        blocks in 0usize..32,
        fill in any::<u8>(),
    ) {
        let plain: Vec<u8> = (0..blocks * BLOCK_LENGTH)
            .map(|i| (i as u8).wrapping_mul(31) ^ fill)
            .collect();

        let mut cipher = vec![0u8; plain.len()];
        prop_assert_eq!(encrypt128_chain(&key, &plain, &mut cipher), plain.len());

        let mut back = vec![0u8; plain.len()];
        prop_assert_eq!(decrypt128_chain(&key, &cipher, &mut back), plain.len());
        prop_assert_eq!(back, plain);
    }

    /// Property: a trailing partial block is never written.
    #[test]
    fn prop_chain_ignores_tail(
        key in prop::array::uniform16(any::<u8>()),
        plain in prop::collection::vec(any::<u8>(), 0..200),
    ) {
        let whole = plain.len() / BLOCK_LENGTH * BLOCK_LENGTH;
        let mut cipher = vec![0xa5u8; plain.len()];
        prop_assert_eq!(encrypt128_chain(&key, &plain, &mut cipher), whole);
        prop_assert!(cipher[whole..].iter().all(|&b| b == 0xa5));
    }
}
