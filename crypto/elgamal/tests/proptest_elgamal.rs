// Copyright (c) 2024 Botho Foundation

//! Property tests for the ElGamal primitive.

use anla_crypto_elgamal::{decrypt, encrypt, public_key, Exponent, KeyPair, KEY_LENGTH};
use proptest::prelude::*;

fn block() -> impl Strategy<Value = [u8; KEY_LENGTH]> {
    prop::collection::vec(any::<u8>(), KEY_LENGTH).prop_map(|bytes| {
        let mut block = [0u8; KEY_LENGTH];
        block.copy_from_slice(&bytes);
        block
    })
}

/// Plaintexts strictly below p: clearing the top bit is sufficient.
fn plaintext() -> impl Strategy<Value = [u8; KEY_LENGTH]> {
    block().prop_map(|mut block| {
        block[KEY_LENGTH - 1] &= 0x7f;
        block
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(12))]

    /// Property: decryption inverts encryption for every keypair and fresh
    /// sender exponent.
    #[test]
    fn prop_roundtrip(
        message in plaintext(),
        recipient in block(),
        sender in block(),
    ) {
        let pair = KeyPair::from_exponent(Exponent::from_bytes(recipient));
        let encrypted = encrypt(&message, pair.public_key(), &Exponent::from_bytes(sender));
        let decrypted = decrypt(&encrypted.ciphertext, &encrypted.sender_key, pair.exponent());
        prop_assert_eq!(decrypted, message);
    }

    /// Property: the sender key is the public key of the sender exponent.
    #[test]
    fn prop_sender_key_is_public_key(message in plaintext(), recipient in block(), sender in block()) {
        let pair = KeyPair::from_exponent(Exponent::from_bytes(recipient));
        let sender = Exponent::from_bytes(sender);
        let encrypted = encrypt(&message, pair.public_key(), &sender);
        prop_assert_eq!(encrypted.sender_key, public_key(&sender));
    }
}
