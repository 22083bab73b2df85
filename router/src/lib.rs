// Copyright (c) 2024 Botho Foundation

//! Anla overlay router.
//!
//! A router keeps a table of known peers, links to each of them, and
//! gossips one peer per tick to every other linked peer so that the
//! overlay converges on everyone knowing everyone. Inbound frames are
//! unwrapped one layer and either add a peer or travel on to the next hop.
//!
//! ```ignore
//! use anla_router::{transport_for, Router, RouterConfig, RouterEvent};
//!
//! let config = RouterConfig::default();
//! let transport = transport_for(config.coordination.kind)?;
//! let (handle, mut events) = Router::start(config, transport)?;
//! if let Some(RouterEvent::Listening(addr)) = events.recv().await {
//!     println!("listening on {addr}");
//! }
//! handle.close().await?;
//! ```

#![deny(missing_docs)]

pub mod config;
pub mod envelope;
pub mod error;
pub mod handle;
pub mod service;
pub mod store;
pub mod transport;

pub use config::RouterConfig;
pub use error::{RouterError, RouterResult};
pub use handle::{RouterCommand, RouterEvent, RouterHandle};
pub use service::Router;
pub use store::{fingerprint, Fingerprint, PeerRecord, PeerTable, SharedPeerTable};
pub use transport::{transport_for, Link, Listener, Transport, WebSocketTransport};
