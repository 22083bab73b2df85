// Copyright (c) 2024 Botho Foundation

//! Header format and parse.
//!
//! Layout (big-endian integers):
//!
//! ```text
//!   0  checksum            2   type               3  target/reply tag
//!   4  telemetry shifts    8   flags (u32)
//!  12  target port        14   reply port
//!  16  target host        32   reply host
//!  48  secret (dec)       64   secret (enc)
//!  80  remainder (dec)    88   remainder (enc)
//!  96  key color change  224   session token
//! 236  length real       238   length next       240  decryption key
//! ```
//!
//! Fields a message type does not use stay zero.

use crate::{
    address::Address,
    checksum::{verify_checksum, write_checksum},
    constants::*,
    message::{CoordinationMessage, Flags, MessageBody, MessageType, Telemetry},
    PacketError, PacketResult,
};
use anla_crypto_multiplexing::{MultiplexingMaterial, REMAINDER_LENGTH, SHARED_SECRET_LENGTH};

/// Write `message` into the first [`HEADER_LENGTH`] bytes of `buffer`.
///
/// The header is cleared first and the checksum is written last.
pub fn format(message: &CoordinationMessage, buffer: &mut [u8]) -> PacketResult<()> {
    let got = buffer.len();
    let header: &mut [u8; HEADER_LENGTH] = buffer
        .get_mut(..HEADER_LENGTH)
        .and_then(|slice| slice.try_into().ok())
        .ok_or(PacketError::TooShort {
            needed: HEADER_LENGTH,
            got,
        })?;

    header.fill(0);
    header[OFFSET_TYPE] = message.message_type() as u8;
    put_u32(header, OFFSET_FLAGS, message.flags.bits());
    put_u16(header, OFFSET_LENGTH_REAL, message.length_real);
    put_u16(header, OFFSET_LENGTH_NEXT, message.length_next);
    put(header, OFFSET_KEY_DECRYPTION, &message.decryption_key);

    match &message.body {
        MessageBody::Forward { target } | MessageBody::AnnouncePeer { target } => {
            write_target(header, target);
        }
        MessageBody::RedirectStatic {
            target,
            reply,
            telemetry,
            decryption,
            encryption,
        } => {
            write_target(header, target);
            write_reply(header, reply);
            write_telemetry(header, telemetry);
            write_material(header, decryption, encryption);
        }
        MessageBody::FasterLinkPlead {
            reply,
            telemetry,
            decryption,
            encryption,
        } => {
            write_reply(header, reply);
            write_telemetry(header, telemetry);
            write_material(header, decryption, encryption);
        }
        MessageBody::FasterLinkGrant {
            target,
            session_token,
            key_color_change,
        } => {
            write_target(header, target);
            put(header, OFFSET_SESSION_TOKEN, session_token);
            put(header, OFFSET_KEY_COLOR_CHANGE, key_color_change);
        }
        MessageBody::FasterLinkTrade {
            session_token,
            key_color_change,
        } => {
            put(header, OFFSET_SESSION_TOKEN, session_token);
            put(header, OFFSET_KEY_COLOR_CHANGE, key_color_change);
        }
        MessageBody::FasterLinkCheck { session_token } => {
            put(header, OFFSET_SESSION_TOKEN, session_token);
        }
    }

    write_checksum(header);
    Ok(())
}

/// Format `message` into a fresh header.
pub fn encode(message: &CoordinationMessage) -> [u8; HEADER_LENGTH] {
    let mut header = [0u8; HEADER_LENGTH];
    // A full-length buffer cannot be too short.
    let _ = format(message, &mut header);
    header
}

/// Decode the header at the start of `buffer`.
///
/// Rejects short buffers, checksum mismatches, unknown message types and
/// unknown tags on the addresses the message type uses.
pub fn parse(buffer: &[u8]) -> PacketResult<CoordinationMessage> {
    let header: &[u8; HEADER_LENGTH] = buffer
        .get(..HEADER_LENGTH)
        .and_then(|slice| slice.try_into().ok())
        .ok_or(PacketError::TooShort {
            needed: HEADER_LENGTH,
            got: buffer.len(),
        })?;

    verify_checksum(header)?;
    let message_type = MessageType::try_from(header[OFFSET_TYPE])?;

    let body = match message_type {
        MessageType::Forward => MessageBody::Forward {
            target: read_target(header)?,
        },
        MessageType::AnnouncePeer => MessageBody::AnnouncePeer {
            target: read_target(header)?,
        },
        MessageType::RedirectStatic => {
            let (decryption, encryption) = read_material(header);
            MessageBody::RedirectStatic {
                target: read_target(header)?,
                reply: read_reply(header)?,
                telemetry: read_telemetry(header),
                decryption,
                encryption,
            }
        }
        MessageType::FasterLinkPlead => {
            let (decryption, encryption) = read_material(header);
            MessageBody::FasterLinkPlead {
                reply: read_reply(header)?,
                telemetry: read_telemetry(header),
                decryption,
                encryption,
            }
        }
        MessageType::FasterLinkGrant => MessageBody::FasterLinkGrant {
            target: read_target(header)?,
            session_token: take(header, OFFSET_SESSION_TOKEN),
            key_color_change: take(header, OFFSET_KEY_COLOR_CHANGE),
        },
        MessageType::FasterLinkTrade => MessageBody::FasterLinkTrade {
            session_token: take(header, OFFSET_SESSION_TOKEN),
            key_color_change: take(header, OFFSET_KEY_COLOR_CHANGE),
        },
        MessageType::FasterLinkCheck => MessageBody::FasterLinkCheck {
            session_token: take(header, OFFSET_SESSION_TOKEN),
        },
    };

    Ok(CoordinationMessage {
        decryption_key: take(header, OFFSET_KEY_DECRYPTION),
        length_real: get_u16(header, OFFSET_LENGTH_REAL),
        length_next: get_u16(header, OFFSET_LENGTH_NEXT),
        flags: Flags::from_bits_retain(get_u32(header, OFFSET_FLAGS)),
        body,
    })
}

fn write_target(header: &mut [u8; HEADER_LENGTH], target: &Address) {
    header[OFFSET_ADDRESS_TYPES] |= target.tag() << 4;
    target.write(header, OFFSET_TARGET_PORT, OFFSET_TARGET_HOST);
}

fn write_reply(header: &mut [u8; HEADER_LENGTH], reply: &Address) {
    header[OFFSET_ADDRESS_TYPES] |= reply.tag();
    reply.write(header, OFFSET_REPLY_PORT, OFFSET_REPLY_HOST);
}

fn read_target(header: &[u8; HEADER_LENGTH]) -> PacketResult<Address> {
    let tag = header[OFFSET_ADDRESS_TYPES] >> 4;
    Address::read(tag, header, OFFSET_TARGET_PORT, OFFSET_TARGET_HOST)
}

fn read_reply(header: &[u8; HEADER_LENGTH]) -> PacketResult<Address> {
    let tag = header[OFFSET_ADDRESS_TYPES] & 0x0f;
    Address::read(tag, header, OFFSET_REPLY_PORT, OFFSET_REPLY_HOST)
}

fn write_telemetry(header: &mut [u8; HEADER_LENGTH], telemetry: &Telemetry) {
    header[OFFSET_SHIFT_TIME_IDLE] = telemetry.shift_time_idle;
    header[OFFSET_SHIFT_TIME_TOTAL] = telemetry.shift_time_total;
    header[OFFSET_SHIFT_DATA_AVERAGE] = telemetry.shift_data_average;
    header[OFFSET_SHIFT_DATA_TOTAL] = telemetry.shift_data_total;
}

fn read_telemetry(header: &[u8; HEADER_LENGTH]) -> Telemetry {
    Telemetry {
        shift_time_idle: header[OFFSET_SHIFT_TIME_IDLE],
        shift_time_total: header[OFFSET_SHIFT_TIME_TOTAL],
        shift_data_average: header[OFFSET_SHIFT_DATA_AVERAGE],
        shift_data_total: header[OFFSET_SHIFT_DATA_TOTAL],
    }
}

fn write_material(
    header: &mut [u8; HEADER_LENGTH],
    decryption: &MultiplexingMaterial,
    encryption: &MultiplexingMaterial,
) {
    put(header, OFFSET_SHARED_SECRET_DECRYPTION, &decryption.shared_secret);
    put(header, OFFSET_SHARED_SECRET_ENCRYPTION, &encryption.shared_secret);
    put(header, OFFSET_REMAINDER_DECRYPTION, &decryption.remainder);
    put(header, OFFSET_REMAINDER_ENCRYPTION, &encryption.remainder);
}

fn read_material(header: &[u8; HEADER_LENGTH]) -> (MultiplexingMaterial, MultiplexingMaterial) {
    let decryption = MultiplexingMaterial::new(
        take::<SHARED_SECRET_LENGTH>(header, OFFSET_SHARED_SECRET_DECRYPTION),
        take::<REMAINDER_LENGTH>(header, OFFSET_REMAINDER_DECRYPTION),
    );
    let encryption = MultiplexingMaterial::new(
        take::<SHARED_SECRET_LENGTH>(header, OFFSET_SHARED_SECRET_ENCRYPTION),
        take::<REMAINDER_LENGTH>(header, OFFSET_REMAINDER_ENCRYPTION),
    );
    (decryption, encryption)
}

fn put(header: &mut [u8], offset: usize, bytes: &[u8]) {
    header[offset..offset + bytes.len()].copy_from_slice(bytes);
}

fn take<const N: usize>(header: &[u8; HEADER_LENGTH], offset: usize) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&header[offset..offset + N]);
    out
}

fn put_u16(header: &mut [u8], offset: usize, value: u16) {
    put(header, offset, &value.to_be_bytes());
}

fn put_u32(header: &mut [u8], offset: usize, value: u32) {
    put(header, offset, &value.to_be_bytes());
}

fn get_u16(header: &[u8; HEADER_LENGTH], offset: usize) -> u16 {
    u16::from_be_bytes(take(header, offset))
}

fn get_u32(header: &[u8; HEADER_LENGTH], offset: usize) -> u32 {
    u32::from_be_bytes(take(header, offset))
}
