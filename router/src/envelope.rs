// Copyright (c) 2024 Botho Foundation

//! Wrapping and unwrapping of coordination frames.
//!
//! An announcement is built once as a template: a plaintext header carrying
//! a fresh Twofish key, and the subject's public key chain-encrypted under
//! that key as payload. Each recipient then gets a copy whose header is
//! ElGamal-encrypted to its public key under a fresh sender exponent, so no
//! two copies share a ciphertext. Single-recipient frames such as FORWARD
//! go through [`seal_message`] the same way.

use anla_crypto_elgamal::{decrypt, encrypt, Exponent, PublicKey};
use anla_crypto_twofish::{
    decrypt128_chain, encrypt128_chain, KEY_LENGTH as SYMMETRIC_KEY_LENGTH,
};
use anla_packets::{
    format, parse, Address, CoordinationFrame, CoordinationMessage, MessageBody, PacketResult,
};
use rand_core::RngCore;
use zeroize::Zeroizing;

use crate::store::PeerRecord;

/// A frame whose header and payload are in plaintext.
#[derive(Clone, Debug)]
pub struct OpenedFrame {
    /// Parsed header
    pub message: CoordinationMessage,

    /// The frame, header and payload decrypted
    pub frame: CoordinationFrame,
}

impl OpenedFrame {
    /// Decrypted payload.
    pub fn payload(&self) -> &[u8] {
        self.frame.payload()
    }
}

/// Build the plaintext announcement of `subject`.
pub fn announce_template<R: RngCore + ?Sized>(
    subject: &PeerRecord,
    rng: &mut R,
) -> PacketResult<CoordinationFrame> {
    template(
        MessageBody::AnnouncePeer {
            target: subject.address,
        },
        subject.public_key.as_bytes(),
        rng,
    )
}

/// Build a plaintext header for `body` and chain-encrypt `payload` under a
/// fresh Twofish key carried in that header.
///
/// Only whole 16-byte blocks of `payload` are carried; a trailing partial
/// block arrives as zeros.
pub fn template<R: RngCore + ?Sized>(
    body: MessageBody,
    payload: &[u8],
    rng: &mut R,
) -> PacketResult<CoordinationFrame> {
    let mut key = Zeroizing::new([0u8; SYMMETRIC_KEY_LENGTH]);
    rng.fill_bytes(&mut key[..]);

    let mut message = CoordinationMessage::new(body);
    message.decryption_key = *key;
    message.length_real = u16::try_from(payload.len()).unwrap_or(u16::MAX);

    let mut frame = CoordinationFrame::new(payload.len());
    let (header, _, sealed) = frame.parts_mut();
    format(&message, header)?;
    encrypt128_chain(&key, payload, sealed);
    Ok(frame)
}

/// A single frame for `recipient` carrying `body` and `payload`.
pub fn seal_message<R: RngCore + ?Sized>(
    body: MessageBody,
    payload: &[u8],
    recipient: &PublicKey,
    rng: &mut R,
) -> PacketResult<CoordinationFrame> {
    let template = template(body, payload, rng)?;
    Ok(seal(&template, recipient, rng))
}

/// A frame asking `recipient` to relay `inner` to `target`.
///
/// `inner` is usually itself a sealed frame for the router at `target`,
/// which is how onions are layered.
pub fn forward_frame<R: RngCore + ?Sized>(
    target: Address,
    inner: &[u8],
    recipient: &PublicKey,
    rng: &mut R,
) -> PacketResult<CoordinationFrame> {
    seal_message(MessageBody::Forward { target }, inner, recipient, rng)
}

/// Copy `template` with its header encrypted to `recipient`.
pub fn seal<R: RngCore + ?Sized>(
    template: &CoordinationFrame,
    recipient: &PublicKey,
    rng: &mut R,
) -> CoordinationFrame {
    let sender_exponent = Exponent::random(rng);
    let sealed = encrypt(template.header(), recipient, &sender_exponent);

    let mut frame = template.clone();
    let (header, sender_key, _) = frame.parts_mut();
    header.copy_from_slice(&sealed.ciphertext);
    sender_key.copy_from_slice(sealed.sender_key.as_bytes());
    frame
}

/// Decrypt and parse a received frame with the local exponent.
///
/// Fails when the frame is too short or the decrypted header does not
/// parse, which is also what a frame meant for another key looks like.
/// A trailing partial payload block is not decrypted and comes out zeroed.
pub fn open(bytes: Vec<u8>, exponent: &Exponent) -> PacketResult<OpenedFrame> {
    let mut frame = CoordinationFrame::from_bytes(bytes)?;

    let sender_key = PublicKey::from_bytes(*frame.sender_key());
    let plain = Zeroizing::new(decrypt(frame.header(), &sender_key, exponent));

    let (header, _, payload) = frame.parts_mut();
    header.copy_from_slice(&plain[..]);
    let message = parse(header)?;

    let cipher = payload.to_vec();
    let processed = decrypt128_chain(&message.decryption_key, &cipher, payload);
    payload[processed..].fill(0);

    Ok(OpenedFrame { message, frame })
}
