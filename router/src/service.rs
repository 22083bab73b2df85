// Copyright (c) 2024 Botho Foundation

//! The router task.
//!
//! One task per router owns the link table and serializes every change to
//! it. The task:
//! - registers itself as a peer once the listener is bound
//! - dials each newly learned peer and forgets peers whose link closes
//! - announces the least announced peer to every other linked peer on
//!   every tick
//! - hands inbound frames to worker tasks for decryption and dispatch
//!
//! ElGamal work runs on the blocking pool so the loop never waits on it.
//! At most `max_inflight_frames` inbound frames are decrypted at once;
//! frames arriving beyond that are dropped, which keeps blocking threads
//! free for announcements.

use crate::{
    config::RouterConfig,
    envelope::{self, OpenedFrame},
    error::{RouterError, RouterResult},
    handle::{RouterCommand, RouterEvent, RouterHandle},
    store::{new_shared_table, Fingerprint, PeerRecord, SharedPeerTable},
    transport::{Link, Transport},
};
use anla_crypto_elgamal::{KeyPair, PublicKey, KEY_LENGTH};
use anla_packets::{Address, MessageBody, PacketError};
use anla_util_random::RandomGenerator;
use std::{collections::HashMap, net::SocketAddr, sync::Arc, time::Duration};
use tokio::{
    select,
    sync::{mpsc, Semaphore},
    task,
    time::{interval, timeout, MissedTickBehavior},
};
use tracing::{debug, error, info, trace, warn};

/// Capacity of the event channel.
const EVENT_BUFFER: usize = 16;

/// Entry point for starting routers.
#[derive(Debug)]
pub struct Router;

impl Router {
    /// Start a router on the current Tokio runtime.
    ///
    /// Returns once the router task is spawned. Binding happens in the
    /// task; watch the event channel for [`RouterEvent::Listening`] or
    /// [`RouterEvent::Error`].
    pub fn start(
        config: RouterConfig,
        transport: Arc<dyn Transport>,
    ) -> RouterResult<(RouterHandle, mpsc::Receiver<RouterEvent>)> {
        config.validate()?;
        if config.coordination.kind != transport.kind() {
            return Err(RouterError::UnsupportedTransport(config.coordination.kind));
        }

        let mut rng = RandomGenerator::from_entropy();
        let keys = Arc::new(config.key_pair(&mut rng)?);

        let (command_tx, command_rx) = mpsc::channel(config.command_buffer);
        let (event_tx, event_rx) = mpsc::channel(EVENT_BUFFER);
        let (closed_tx, closed_rx) = mpsc::unbounded_channel();

        let handle = RouterHandle::new(command_tx.clone(), keys.public_key().clone());

        let inflight = Arc::new(Semaphore::new(config.max_inflight_frames));

        let state = RouterState {
            config,
            keys,
            transport,
            rng,
            peers: new_shared_table(),
            links: HashMap::new(),
            next_link_id: 0,
            local_addr: None,
            self_record: None,
            commands: command_tx.downgrade(),
            closed_tx,
            inflight,
        };

        tokio::spawn(state.run(command_rx, closed_rx, event_tx));

        Ok((handle, event_rx))
    }
}

/// An open outbound link.
#[derive(Debug)]
struct ActiveLink {
    /// Distinguishes this link from later links to the same peer
    id: u64,
    frames: mpsc::Sender<Vec<u8>>,
}

struct RouterState {
    config: RouterConfig,
    keys: Arc<KeyPair>,
    transport: Arc<dyn Transport>,
    rng: RandomGenerator,
    peers: SharedPeerTable,
    links: HashMap<Fingerprint, ActiveLink>,
    next_link_id: u64,
    local_addr: Option<SocketAddr>,
    self_record: Option<PeerRecord>,
    /// For workers feeding learned peers back into the loop
    commands: mpsc::WeakSender<RouterCommand>,
    closed_tx: mpsc::UnboundedSender<(Fingerprint, u64)>,
    /// Permits for inbound frames being decrypted
    inflight: Arc<Semaphore>,
}

impl RouterState {
    async fn run(
        mut self,
        mut command_rx: mpsc::Receiver<RouterCommand>,
        mut closed_rx: mpsc::UnboundedReceiver<(Fingerprint, u64)>,
        event_tx: mpsc::Sender<RouterEvent>,
    ) {
        let (inbound_tx, mut inbound_rx) = mpsc::channel(self.config.command_buffer);

        let bind = self.config.coordination.socket_addr();
        let listener = match self.transport.listen(bind, inbound_tx).await {
            Ok(listener) => listener,
            Err(e) => {
                error!(%bind, %e, "Router failed to listen");
                let _ = event_tx.send(RouterEvent::Error(e.to_string())).await;
                return;
            }
        };

        let local_addr = listener.local_addr();
        let record = PeerRecord::new(
            self.keys.public_key().clone(),
            Address::new(self.config.coordination.kind, local_addr.ip(), local_addr.port()),
            true,
        );
        info!(
            %local_addr,
            fingerprint = record.fingerprint(),
            "Router listening"
        );
        self.local_addr = Some(local_addr);
        self.self_record = Some(record.clone());
        self.add_peer(record);
        let _ = event_tx.send(RouterEvent::Listening(local_addr)).await;

        let mut announce_interval = interval(self.config.announce_interval());
        announce_interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            select! {
                command = command_rx.recv() => match command {
                    Some(RouterCommand::Close) | None => break,
                    Some(command) => self.handle_command(command).await,
                },

                Some(frame) = inbound_rx.recv() => self.handle_frame(frame),

                Some((key, id)) = closed_rx.recv() => self.link_closed(key, id),

                _ = announce_interval.tick() => self.announce(),
            }
        }

        info!(%local_addr, links = self.links.len(), "Router closing");
        self.links.clear();
        listener.close();
    }

    async fn handle_command(&mut self, command: RouterCommand) {
        match command {
            RouterCommand::AddPeer(record) => self.add_peer(record),

            RouterCommand::GetAddress(tx) => {
                let _ = tx.send(self.local_addr).await;
            }

            RouterCommand::GetSelf(tx) => {
                let _ = tx.send(self.self_record.clone()).await;
            }

            RouterCommand::GetPeers(tx) => {
                let _ = tx.send(self.peers.snapshot()).await;
            }

            RouterCommand::Close => {}
        }
    }

    /// Record a peer and dial it if it is new and remote.
    fn add_peer(&mut self, record: PeerRecord) {
        let key = record.fingerprint();
        if !self.peers.insert(record.clone()) {
            return;
        }
        debug!(
            fingerprint = key,
            address = %record.address,
            is_self = record.is_self,
            "Peer added"
        );

        if record.is_self || self.links.contains_key(&key) {
            return;
        }
        if record.address.kind != self.transport.kind() {
            debug!(address = %record.address, "No transport for peer address");
            return;
        }

        let Link { frames, closed } = self.transport.dial(&record.address);
        let id = self.next_link_id;
        self.next_link_id += 1;
        self.links.insert(key, ActiveLink { id, frames });

        let closed_tx = self.closed_tx.clone();
        tokio::spawn(async move {
            let _ = closed.await;
            let _ = closed_tx.send((key, id));
        });
    }

    /// Forget a peer whose link ended, unless a newer link replaced it.
    fn link_closed(&mut self, key: Fingerprint, id: u64) {
        if self.links.get(&key).map(|link| link.id) != Some(id) {
            return;
        }
        self.links.remove(&key);
        if let Some(record) = self.peers.remove(key) {
            debug!(fingerprint = key, address = %record.address, "Peer link closed");
        }
    }

    /// Announce the least announced peer to every other linked peer.
    fn announce(&mut self) {
        let Some(subject) = self.peers.next_announce_subject() else {
            return;
        };
        let subject_key = subject.fingerprint();

        let recipients: Vec<(PublicKey, mpsc::Sender<Vec<u8>>)> = self
            .links
            .iter()
            .filter(|(key, _)| **key != subject_key)
            .filter_map(|(key, link)| {
                self.peers
                    .get(*key)
                    .map(|peer| (peer.public_key, link.frames.clone()))
            })
            .collect();
        if recipients.is_empty() {
            return;
        }

        trace!(
            subject = %subject.address,
            recipients = recipients.len(),
            "Announcing peer"
        );

        let mut rng = RandomGenerator::new();
        rng.setup(&mut self.rng);

        tokio::spawn(async move {
            let sealed = task::spawn_blocking(move || {
                let template = envelope::announce_template(&subject, &mut rng)?;
                let frames: Vec<_> = recipients
                    .into_iter()
                    .map(|(key, link)| (envelope::seal(&template, &key, &mut rng), link))
                    .collect();
                Ok::<_, PacketError>(frames)
            })
            .await;

            match sealed {
                Ok(Ok(frames)) => {
                    for (frame, link) in frames {
                        if let Err(e) = link.try_send(frame.into_bytes()) {
                            trace!(%e, "Dropping announcement");
                        }
                    }
                }
                Ok(Err(e)) => warn!(%e, "Failed to build announcement"),
                Err(e) => warn!(%e, "Announce task failed"),
            }
        });
    }

    /// Decrypt and dispatch an inbound frame on a worker task.
    fn handle_frame(&self, bytes: Vec<u8>) {
        if bytes.len() > self.config.max_packet_length {
            trace!(length = bytes.len(), "Dropping oversized frame");
            return;
        }
        let Ok(permit) = Arc::clone(&self.inflight).try_acquire_owned() else {
            trace!(length = bytes.len(), "Dropping frame, too many in flight");
            return;
        };

        let keys = Arc::clone(&self.keys);
        let transport = Arc::clone(&self.transport);
        let commands = self.commands.clone();
        let grace = self.config.forward_grace();

        tokio::spawn(async move {
            let opened = task::spawn_blocking(move || envelope::open(bytes, keys.exponent())).await;
            drop(permit);
            match opened {
                Ok(Ok(opened)) => dispatch(opened, transport, commands, grace).await,
                Ok(Err(e)) => trace!(%e, "Dropping inbound frame"),
                Err(e) => warn!(%e, "Frame task failed"),
            }
        });
    }
}

async fn dispatch(
    opened: OpenedFrame,
    transport: Arc<dyn Transport>,
    commands: mpsc::WeakSender<RouterCommand>,
    grace: Duration,
) {
    match &opened.message.body {
        MessageBody::AnnouncePeer { target } => {
            let public_key = match opened
                .payload()
                .get(..KEY_LENGTH)
                .map(PublicKey::from_slice)
            {
                Some(Ok(public_key)) => public_key,
                _ => {
                    trace!(%target, "Dropping announcement without public key");
                    return;
                }
            };

            let record = PeerRecord::new(public_key, *target, false);
            if let Some(commands) = commands.upgrade() {
                let _ = commands.send(RouterCommand::AddPeer(record)).await;
            }
        }

        MessageBody::Forward { target } | MessageBody::RedirectStatic { target, .. } => {
            forward(transport.as_ref(), target, opened.payload().to_vec(), grace).await;
        }

        other => {
            debug!(message_type = ?other.message_type(), "Ignoring faster-link message");
        }
    }
}

/// Send `frame` to `target` over a fresh link, closing it after `grace`.
async fn forward(transport: &dyn Transport, target: &Address, frame: Vec<u8>, grace: Duration) {
    if frame.is_empty() {
        trace!(%target, "Nothing to forward");
        return;
    }
    if target.kind != transport.kind() {
        debug!(%target, "No transport for forward target");
        return;
    }

    debug!(%target, length = frame.len(), "Forwarding frame");
    let Link { frames, closed } = transport.dial(target);
    if frames.send(frame).await.is_err() {
        return;
    }
    let _ = timeout(grace, closed).await;
    drop(frames);
}
