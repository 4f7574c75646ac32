//! Resilient client for a replicated object-lookup registry.
//!
//! The registry runs as interchangeable replicas reachable over two
//! logical channels: a business channel (register, deregister, lookup,
//! heartbeat) and a separate lightweight ping channel for fast
//! liveness probing. This crate is the client-side resilience layer:
//! sticky round-robin failover across the candidate endpoints of each
//! channel, plus a background monitor that tells "replica gone,
//! re-register elsewhere" apart from "only the heartbeat call failed."

pub mod client;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod failover;
pub mod logging;
pub mod monitor;
pub mod session;

pub use client::{LivenessRpc, RegistryClient};
pub use config::ClientConfig;
pub use endpoint::{Endpoint, EndpointSet};
pub use error::{Error, Result};
pub use failover::{try_all, Invocation};
pub use monitor::LivenessMonitor;
pub use session::{Identity, Session};
