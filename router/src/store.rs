// Copyright (c) 2024 Botho Foundation

//! In-memory table of known peers.
//!
//! Peers are keyed by a 23-bit fingerprint of their public key. A record is
//! inserted once, only its announce count changes afterwards, and it is
//! removed when the link to the peer closes.

use anla_crypto_elgamal::PublicKey;
use anla_packets::Address;
use anla_util_polynomial::{moduli::MODULUS_PEER_IDENTIFICATION, reduce_bytes};
use parking_lot::RwLock;
use std::{collections::HashMap, sync::Arc};

/// Short digest of a public key used as the peer table key.
pub type Fingerprint = u32;

/// Fingerprint of `public_key`: its bytes reduced modulo the degree-23
/// peer identification polynomial.
pub fn fingerprint(public_key: &PublicKey) -> Fingerprint {
    reduce_bytes(public_key.as_bytes(), MODULUS_PEER_IDENTIFICATION)
}

/// A known peer.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PeerRecord {
    /// The peer's ElGamal public key
    pub public_key: PublicKey,

    /// Where the peer listens
    pub address: Address,

    /// Whether this record describes the local router
    pub is_self: bool,

    /// How many times this peer has been the announce subject
    pub announce_count: u32,
}

impl PeerRecord {
    /// A record that has not been announced yet.
    pub fn new(public_key: PublicKey, address: Address, is_self: bool) -> Self {
        Self {
            public_key,
            address,
            is_self,
            announce_count: 0,
        }
    }

    /// Table key for this record.
    pub fn fingerprint(&self) -> Fingerprint {
        fingerprint(&self.public_key)
    }
}

/// Thread-safe peer table.
#[derive(Debug, Default)]
pub struct PeerTable {
    peers: RwLock<HashMap<Fingerprint, PeerRecord>>,
}

impl PeerTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `record` unless its fingerprint is already known.
    ///
    /// The announce count of a new record starts at zero. Returns `true` if
    /// the record was inserted.
    pub fn insert(&self, mut record: PeerRecord) -> bool {
        let key = record.fingerprint();
        let mut peers = self.peers.write();
        if peers.contains_key(&key) {
            return false;
        }
        record.announce_count = 0;
        peers.insert(key, record);
        true
    }

    /// Get a record by fingerprint.
    pub fn get(&self, key: Fingerprint) -> Option<PeerRecord> {
        self.peers.read().get(&key).cloned()
    }

    /// Check if a fingerprint is known.
    pub fn contains(&self, key: Fingerprint) -> bool {
        self.peers.read().contains_key(&key)
    }

    /// Remove a record, returning it if present.
    pub fn remove(&self, key: Fingerprint) -> Option<PeerRecord> {
        self.peers.write().remove(&key)
    }

    /// Number of known peers, including self.
    pub fn len(&self) -> usize {
        self.peers.read().len()
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.peers.read().is_empty()
    }

    /// Copy of every record, ordered by fingerprint.
    pub fn snapshot(&self) -> Vec<PeerRecord> {
        let mut records: Vec<_> = self.peers.read().values().cloned().collect();
        records.sort_by_key(PeerRecord::fingerprint);
        records
    }

    /// Pick the least announced peer and count one more announcement.
    ///
    /// Ties go to the lowest fingerprint. Returns the record as it was
    /// before the increment.
    pub fn next_announce_subject(&self) -> Option<PeerRecord> {
        let mut peers = self.peers.write();
        let (_, record) = peers
            .iter_mut()
            .min_by_key(|(key, record)| (record.announce_count, **key))?;
        let subject = record.clone();
        record.announce_count = record.announce_count.saturating_add(1);
        Some(subject)
    }
}

/// A shared, reference-counted peer table.
pub type SharedPeerTable = Arc<PeerTable>;

/// Create a new shared peer table.
pub fn new_shared_table() -> SharedPeerTable {
    Arc::new(PeerTable::new())
}
