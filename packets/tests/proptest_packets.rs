// Copyright (c) 2024 Botho Foundation

//! Property tests for the coordination packet codec.

use anla_crypto_multiplexing::MultiplexingMaterial;
use anla_packets::{
    checksum::verify_checksum, encode, parse, Address, CoordinationMessage, Flags, MessageBody,
    PacketError, Telemetry, TransportKind, HEADER_LENGTH,
};
use proptest::prelude::*;
use std::net::IpAddr;

fn arb_address() -> impl Strategy<Value = Address> {
    let host = prop_oneof![
        any::<[u8; 4]>().prop_map(IpAddr::from),
        any::<[u8; 16]>().prop_map(IpAddr::from),
    ];
    let kind = prop_oneof![Just(TransportKind::WebSocket), Just(TransportKind::Udp)];
    (kind, host, any::<u16>()).prop_map(|(kind, host, port)| Address::new(kind, host, port))
}

fn arb_material() -> impl Strategy<Value = MultiplexingMaterial> {
    (any::<[u8; 16]>(), any::<[u8; 8]>())
        .prop_map(|(secret, remainder)| MultiplexingMaterial::new(secret, remainder))
}

fn arb_telemetry() -> impl Strategy<Value = Telemetry> {
    any::<[u8; 4]>().prop_map(|t| Telemetry {
        shift_time_idle: t[0],
        shift_time_total: t[1],
        shift_data_average: t[2],
        shift_data_total: t[3],
    })
}

fn arb_body() -> impl Strategy<Value = MessageBody> {
    prop_oneof![
        arb_address().prop_map(|target| MessageBody::Forward { target }),
        arb_address().prop_map(|target| MessageBody::AnnouncePeer { target }),
        (
            arb_address(),
            arb_address(),
            arb_telemetry(),
            arb_material(),
            arb_material()
        )
            .prop_map(|(target, reply, telemetry, decryption, encryption)| {
                MessageBody::RedirectStatic {
                    target,
                    reply,
                    telemetry,
                    decryption,
                    encryption,
                }
            }),
        (arb_address(), arb_telemetry(), arb_material(), arb_material()).prop_map(
            |(reply, telemetry, decryption, encryption)| MessageBody::FasterLinkPlead {
                reply,
                telemetry,
                decryption,
                encryption,
            }
        ),
        (arb_address(), any::<[u8; 8]>(), any::<[u8; 16]>()).prop_map(
            |(target, session_token, key_color_change)| MessageBody::FasterLinkGrant {
                target,
                session_token,
                key_color_change,
            }
        ),
        (any::<[u8; 8]>(), any::<[u8; 16]>()).prop_map(|(session_token, key_color_change)| {
            MessageBody::FasterLinkTrade {
                session_token,
                key_color_change,
            }
        }),
        any::<[u8; 8]>().prop_map(|session_token| MessageBody::FasterLinkCheck { session_token }),
    ]
}

fn arb_message() -> impl Strategy<Value = CoordinationMessage> {
    (
        any::<[u8; 16]>(),
        any::<u16>(),
        any::<u16>(),
        any::<u32>(),
        arb_body(),
    )
        .prop_map(|(decryption_key, length_real, length_next, flags, body)| {
            CoordinationMessage {
                decryption_key,
                length_real,
                length_next,
                flags: Flags::from_bits_retain(flags),
                body,
            }
        })
}

proptest! {
    /// Property: parse recovers every formatted message.
    #[test]
    fn prop_format_then_parse(message in arb_message()) {
        let header = encode(&message);
        prop_assert!(verify_checksum(&header).is_ok());
        prop_assert_eq!(parse(&header), Ok(message));
    }

    /// Property: a corrupted header is never accepted.
    #[test]
    fn prop_corruption_is_rejected(
        message in arb_message(),
        index in 2usize..HEADER_LENGTH,
        mask in 1u8..=255,
    ) {
        let mut header = encode(&message);
        header[index] ^= mask;
        let parsed = parse(&header);
        prop_assert!(
            matches!(parsed, Err(PacketError::ChecksumMismatch { .. })),
            "parsed {:?}", parsed
        );
    }

    /// Property: parse never panics on arbitrary input.
    #[test]
    fn prop_parse_arbitrary_bytes(bytes in prop::collection::vec(any::<u8>(), 0..400)) {
        let _ = parse(&bytes);
    }
}
