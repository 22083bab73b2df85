// Copyright (c) 2024 Botho Foundation

//! Anla overlay node: a router wrapped in a configuration file and a CLI.

pub mod commands;
pub mod config;

pub use config::{NodeConfig, PeerEntry};
