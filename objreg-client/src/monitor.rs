//! Background liveness monitoring and automatic re-registration.
//!
//! A periodic task that keeps our registration alive and recovers it
//! when the bound replica disappears. Each tick runs a two-tier check:
//! a cheap ping first, and a full register only when the ping set is
//! exhausted. That way a replica that is merely slow on the business
//! channel but still answering pings never triggers spurious
//! re-registration.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::interval;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::client::LivenessRpc;
use crate::session::Session;

/// Periodic liveness task over one registration session.
///
/// State machine per tick, driven by `Session::is_alive`:
/// - suspended (after deregister): no RPC at all;
/// - alive, ping ok: one heartbeat; a heartbeat rejection is logged
///   and nothing else changes, the cluster is reachable so this is a
///   transient anomaly rather than a leader change;
/// - alive, ping exhausted: the bound replica is presumed gone, so we
///   register again; failure keeps the session alive and the next
///   tick retries.
pub struct LivenessMonitor<R: LivenessRpc> {
    rpc: Arc<R>,
    session: Arc<Session>,
    tick_interval: Duration,
    cancel_token: CancellationToken,
}

impl<R: LivenessRpc + 'static> LivenessMonitor<R> {
    #[must_use]
    pub fn new(rpc: Arc<R>, session: Arc<Session>, tick_interval: Duration) -> Self {
        Self {
            rpc,
            session,
            tick_interval,
            cancel_token: CancellationToken::new(),
        }
    }

    /// Start the monitoring loop.
    ///
    /// Returns the `JoinHandle` so the caller can detect task
    /// completion. Use `shutdown()` to stop the loop.
    pub fn start(&self) -> tokio::task::JoinHandle<()> {
        let rpc = self.rpc.clone();
        let session = self.session.clone();
        let cancel_token = self.cancel_token.clone();
        let mut timer = interval(self.tick_interval);

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    () = cancel_token.cancelled() => {
                        info!("liveness monitor shutting down");
                        return;
                    }
                    _ = timer.tick() => {
                        Self::tick(&rpc, &session).await;
                    }
                }
            }
        })
    }

    /// One monitor tick. Public to the crate's tests so the state
    /// machine can be driven without timers.
    pub async fn tick(rpc: &R, session: &Session) {
        if !session.is_alive() {
            // Suspended, typically right after an explicit deregister.
            return;
        }

        match rpc.ping().await {
            Ok(()) => {
                debug!("ping ok");
                if let Err(e) = rpc.heartbeat(session.name()).await {
                    warn!(
                        name = %session.name(),
                        error = %e,
                        "heartbeat failed on a reachable cluster; keeping registration"
                    );
                }
            }
            Err(e) => {
                warn!(error = %e, "ping exhausted all endpoints; attempting re-registration");
                match rpc.register(session.identity()).await {
                    Ok(endpoint) => {
                        session.mark_registered(&endpoint);
                        info!(endpoint = %endpoint, "re-registered after ping failure");
                    }
                    Err(e) => {
                        // Not fatal: the session stays alive and the
                        // next tick tries again.
                        warn!(error = %e, "re-registration failed; will retry next tick");
                    }
                }
            }
        }
    }

    /// Stop the monitoring loop.
    pub fn shutdown(&self) {
        self.cancel_token.cancel();
    }
}
