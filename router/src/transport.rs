// Copyright (c) 2024 Botho Foundation

//! Transports carrying coordination frames between routers.
//!
//! A transport does two things: listen for inbound frames and dial
//! outbound links. Frames are opaque byte strings at this layer.
//!
//! ```text
//!   dial(address) ──► Link { frames ──► remote }
//!                          closed ◄── connection ended
//!
//!   listen(address, inbound) ──► Listener
//!          every received frame ──► inbound
//! ```
//!
//! Dropping a [`Link`]'s sender flushes queued frames and closes the
//! connection. Dropping a [`Listener`] stops accepting and ends every
//! inbound connection.

use crate::error::{RouterError, RouterResult};
use anla_packets::{Address, TransportKind};
use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use std::{fmt::Debug, net::SocketAddr, sync::Arc};
use tokio::{
    net::{TcpListener, TcpStream},
    select,
    sync::{mpsc, oneshot, watch},
};
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, trace, warn};

/// Frames queued on a single outbound link.
pub const LINK_BUFFER: usize = 64;

/// An outbound connection.
#[derive(Debug)]
pub struct Link {
    /// Queue of frames to send
    pub frames: mpsc::Sender<Vec<u8>>,

    /// Resolves once the connection has ended, for any reason
    pub closed: oneshot::Receiver<()>,
}

/// A running listener. Dropping it stops the listener.
#[derive(Debug)]
pub struct Listener {
    local_addr: SocketAddr,
    _shutdown: watch::Sender<()>,
}

impl Listener {
    /// Wrap a listener whose tasks stop when `shutdown` is dropped.
    pub fn new(local_addr: SocketAddr, shutdown: watch::Sender<()>) -> Self {
        Self {
            local_addr,
            _shutdown: shutdown,
        }
    }

    /// The address actually bound.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stop accepting and end every inbound connection.
    pub fn close(self) {}
}

/// Frame transport used by the router.
#[async_trait]
pub trait Transport: Send + Sync + Debug {
    /// Which addresses this transport can reach.
    fn kind(&self) -> TransportKind;

    /// Bind `address` and deliver every received frame to `inbound`.
    async fn listen(
        &self,
        address: SocketAddr,
        inbound: mpsc::Sender<Vec<u8>>,
    ) -> RouterResult<Listener>;

    /// Open a link to `address`. Connection happens in the background;
    /// failures show up as the link closing.
    fn dial(&self, address: &Address) -> Link;
}

/// Pick the transport for `kind`.
pub fn transport_for(kind: TransportKind) -> RouterResult<Arc<dyn Transport>> {
    match kind {
        TransportKind::WebSocket => Ok(Arc::new(WebSocketTransport)),
        TransportKind::Udp => Err(RouterError::UnsupportedTransport(kind)),
    }
}

/// Frames as binary WebSocket messages, one frame per message.
#[derive(Clone, Copy, Debug, Default)]
pub struct WebSocketTransport;

#[async_trait]
impl Transport for WebSocketTransport {
    fn kind(&self) -> TransportKind {
        TransportKind::WebSocket
    }

    async fn listen(
        &self,
        address: SocketAddr,
        inbound: mpsc::Sender<Vec<u8>>,
    ) -> RouterResult<Listener> {
        let listener = TcpListener::bind(address)
            .await
            .map_err(|e| RouterError::Bind {
                address,
                reason: e.to_string(),
            })?;
        let local_addr = listener.local_addr().map_err(|e| RouterError::Bind {
            address,
            reason: e.to_string(),
        })?;

        let (shutdown_tx, shutdown_rx) = watch::channel(());
        tokio::spawn(accept_loop(listener, inbound, shutdown_rx));

        debug!(%local_addr, "WebSocket listener bound");
        Ok(Listener::new(local_addr, shutdown_tx))
    }

    fn dial(&self, address: &Address) -> Link {
        let (frames_tx, frames_rx) = mpsc::channel(LINK_BUFFER);
        let (closed_tx, closed_rx) = oneshot::channel();
        tokio::spawn(run_link(address.url(), frames_rx, closed_tx));
        Link {
            frames: frames_tx,
            closed: closed_rx,
        }
    }
}

async fn accept_loop(
    listener: TcpListener,
    inbound: mpsc::Sender<Vec<u8>>,
    mut shutdown: watch::Receiver<()>,
) {
    loop {
        select! {
            _ = shutdown.changed() => break,

            accepted = listener.accept() => match accepted {
                Ok((stream, remote)) => {
                    trace!(%remote, "Accepted coordination connection");
                    tokio::spawn(serve_connection(
                        stream,
                        remote,
                        inbound.clone(),
                        shutdown.clone(),
                    ));
                }
                Err(e) => warn!(%e, "Failed to accept connection"),
            },
        }
    }
}

async fn serve_connection(
    stream: TcpStream,
    remote: SocketAddr,
    inbound: mpsc::Sender<Vec<u8>>,
    mut shutdown: watch::Receiver<()>,
) {
    let mut ws_stream = match tokio_tungstenite::accept_async(stream).await {
        Ok(ws_stream) => ws_stream,
        Err(e) => {
            debug!(%remote, %e, "WebSocket handshake failed");
            return;
        }
    };

    loop {
        select! {
            _ = shutdown.changed() => {
                let _ = ws_stream.close(None).await;
                break;
            }

            message = ws_stream.next() => match message {
                Some(Ok(Message::Binary(data))) => {
                    if inbound.send(data).await.is_err() {
                        break;
                    }
                }
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    trace!(%remote, %e, "Inbound connection failed");
                    break;
                }
            },
        }
    }
}

async fn run_link(
    url: String,
    mut frames: mpsc::Receiver<Vec<u8>>,
    _closed: oneshot::Sender<()>,
) {
    let ws_stream = match tokio_tungstenite::connect_async(url.as_str()).await {
        Ok((ws_stream, _response)) => ws_stream,
        Err(e) => {
            debug!(%url, %e, "Failed to dial peer");
            return;
        }
    };
    trace!(%url, "Link open");

    let (mut sink, mut source) = ws_stream.split();
    loop {
        select! {
            frame = frames.recv() => match frame {
                Some(frame) => {
                    if let Err(e) = sink.send(Message::Binary(frame)).await {
                        warn!(%url, %e, "Failed to send frame");
                        break;
                    }
                }
                None => {
                    let _ = sink.close().await;
                    break;
                }
            },

            message = source.next() => match message {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => {}
            },
        }
    }
    trace!(%url, "Link closed");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::timeout;

    fn loopback() -> SocketAddr {
        "127.0.0.1:0".parse().unwrap()
    }

    #[tokio::test]
    async fn test_frames_arrive_in_order() {
        let transport = WebSocketTransport;
        let (inbound_tx, mut inbound_rx) = mpsc::channel(16);
        let listener = transport.listen(loopback(), inbound_tx).await.unwrap();

        let link = transport.dial(&Address::from(listener.local_addr()));
        for i in 0..3u8 {
            link.frames.send(vec![i; 600]).await.unwrap();
        }

        for i in 0..3u8 {
            let frame = timeout(Duration::from_secs(5), inbound_rx.recv())
                .await
                .unwrap()
                .unwrap();
            assert_eq!(frame, vec![i; 600]);
        }
    }

    #[tokio::test]
    async fn test_dial_failure_closes_link() {
        let transport = WebSocketTransport;

        // Bind then drop to find a port nobody listens on.
        let port = std::net::TcpListener::bind(loopback())
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let link = transport.dial(&Address::websocket("127.0.0.1".parse().unwrap(), port));

        assert!(timeout(Duration::from_secs(5), link.closed).await.is_ok());
    }

    #[tokio::test]
    async fn test_closing_listener_closes_links() {
        let transport = WebSocketTransport;
        let (inbound_tx, mut inbound_rx) = mpsc::channel(16);
        let listener = transport.listen(loopback(), inbound_tx).await.unwrap();

        let link = transport.dial(&Address::from(listener.local_addr()));
        link.frames.send(vec![1; 8]).await.unwrap();
        timeout(Duration::from_secs(5), inbound_rx.recv())
            .await
            .unwrap()
            .unwrap();

        listener.close();
        assert!(timeout(Duration::from_secs(5), link.closed).await.is_ok());
    }

    #[tokio::test]
    async fn test_bind_conflict() {
        let transport = WebSocketTransport;
        let (inbound_tx, _inbound_rx) = mpsc::channel(16);
        let listener = transport.listen(loopback(), inbound_tx.clone()).await.unwrap();

        let result = transport.listen(listener.local_addr(), inbound_tx).await;
        assert!(matches!(result, Err(RouterError::Bind { .. })));
    }

    #[test]
    fn test_udp_is_unsupported() {
        assert!(matches!(
            transport_for(TransportKind::Udp),
            Err(RouterError::UnsupportedTransport(TransportKind::Udp))
        ));
        assert_eq!(
            transport_for(TransportKind::WebSocket).unwrap().kind(),
            TransportKind::WebSocket
        );
    }
}
