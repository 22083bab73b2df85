// Copyright (c) 2024 Botho Foundation

//! Handle for controlling a running router.

use crate::{
    error::{RouterError, RouterResult},
    store::PeerRecord,
};
use anla_crypto_elgamal::PublicKey;
use std::net::SocketAddr;
use tokio::sync::mpsc;

/// Events emitted by the router.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouterEvent {
    /// The coordination listener is bound
    Listening(SocketAddr),

    /// The router failed and stopped
    Error(String),
}

/// Commands that can be sent to the router.
#[derive(Debug)]
pub enum RouterCommand {
    /// Learn a peer, dialing it if it is new
    AddPeer(PeerRecord),

    /// Get the bound listener address (response sent via channel)
    GetAddress(mpsc::Sender<Option<SocketAddr>>),

    /// Get the local peer record (response sent via channel)
    GetSelf(mpsc::Sender<Option<PeerRecord>>),

    /// Get every known peer (response sent via channel)
    GetPeers(mpsc::Sender<Vec<PeerRecord>>),

    /// Close links and listener, stop announcing
    Close,
}

/// Handle for controlling a router.
#[derive(Clone, Debug)]
pub struct RouterHandle {
    /// Channel to send commands to the router
    command_tx: mpsc::Sender<RouterCommand>,

    /// The router's public key
    public_key: PublicKey,
}

impl RouterHandle {
    /// Create a new handle.
    pub fn new(command_tx: mpsc::Sender<RouterCommand>, public_key: PublicKey) -> Self {
        Self {
            command_tx,
            public_key,
        }
    }

    /// The router's public key.
    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// Add a peer.
    pub async fn add_peer(&self, record: PeerRecord) -> RouterResult<()> {
        self.command_tx
            .send(RouterCommand::AddPeer(record))
            .await
            .map_err(|_| RouterError::ChannelClosed)
    }

    /// Get the bound listener address, `None` until listening.
    pub async fn address(&self) -> RouterResult<Option<SocketAddr>> {
        let (tx, mut rx) = mpsc::channel(1);
        self.command_tx
            .send(RouterCommand::GetAddress(tx))
            .await
            .map_err(|_| RouterError::ChannelClosed)?;

        rx.recv().await.ok_or(RouterError::ChannelClosed)
    }

    /// Get the local peer record, `None` until listening.
    pub async fn self_record(&self) -> RouterResult<Option<PeerRecord>> {
        let (tx, mut rx) = mpsc::channel(1);
        self.command_tx
            .send(RouterCommand::GetSelf(tx))
            .await
            .map_err(|_| RouterError::ChannelClosed)?;

        rx.recv().await.ok_or(RouterError::ChannelClosed)
    }

    /// Get every known peer, including self.
    pub async fn peers(&self) -> RouterResult<Vec<PeerRecord>> {
        let (tx, mut rx) = mpsc::channel(1);
        self.command_tx
            .send(RouterCommand::GetPeers(tx))
            .await
            .map_err(|_| RouterError::ChannelClosed)?;

        rx.recv().await.ok_or(RouterError::ChannelClosed)
    }

    /// Close the router.
    pub async fn close(&self) -> RouterResult<()> {
        self.command_tx
            .send(RouterCommand::Close)
            .await
            .map_err(|_| RouterError::ChannelClosed)
    }
}
