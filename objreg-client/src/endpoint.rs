//! Candidate server endpoints for one logical channel.
//!
//! An [`EndpointSet`] holds the ordered endpoints for either the
//! business channel or the ping channel, together with the sticky
//! index: the position of the last endpoint known to have succeeded.
//! The set owns no retry logic; ordering policy lives in
//! [`crate::failover`].

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tonic::transport::Channel;

use crate::error::{Error, Result};

/// One network-reachable server replica plus its transport handle.
#[derive(Debug, Clone)]
pub struct Endpoint<T> {
    pub address: String,
    pub transport: T,
}

/// Ordered candidate endpoints for one channel.
///
/// Order encodes failover priority (the configured order), not
/// freshness. The sticky index is the only mutable state and is
/// written exclusively by the failover invoker on success.
#[derive(Debug)]
pub struct EndpointSet<T> {
    endpoints: Vec<Endpoint<T>>,
    sticky: AtomicUsize,
    call_timeout: Duration,
}

impl<T> EndpointSet<T> {
    /// Build a set from already-constructed endpoints.
    ///
    /// Fails on an empty list; a registry client without candidate
    /// servers cannot do anything useful.
    pub fn new(endpoints: Vec<Endpoint<T>>, call_timeout: Duration) -> Result<Self> {
        if endpoints.is_empty() {
            return Err(Error::Configuration(
                "endpoint set must contain at least one address".to_string(),
            ));
        }
        Ok(Self {
            endpoints,
            sticky: AtomicUsize::new(0),
            call_timeout,
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    /// Indexed access. Panics on out-of-range indices, which callers
    /// inside this crate never produce (indices are always taken
    /// modulo `len`).
    #[must_use]
    pub(crate) fn get(&self, index: usize) -> &Endpoint<T> {
        &self.endpoints[index]
    }

    /// Address of the current sticky endpoint, for status display.
    #[must_use]
    pub fn sticky_address(&self) -> &str {
        &self.get(self.sticky_index()).address
    }

    pub fn iter(&self) -> impl Iterator<Item = &Endpoint<T>> {
        self.endpoints.iter()
    }

    /// Index of the last endpoint that succeeded (0 before any success).
    #[must_use]
    pub fn sticky_index(&self) -> usize {
        self.sticky.load(Ordering::Acquire)
    }

    pub(crate) fn set_sticky_index(&self, index: usize) {
        debug_assert!(index < self.endpoints.len());
        self.sticky.store(index, Ordering::Release);
    }

    #[must_use]
    pub const fn call_timeout(&self) -> Duration {
        self.call_timeout
    }
}

/// Build a lazily-connecting channel for one address.
///
/// No health check happens here; a dead address fails on first use,
/// which the failover invoker treats like any other attempt failure.
pub fn lazy_channel(
    address: &str,
    connect_timeout: Duration,
    call_timeout: Duration,
) -> Result<Channel> {
    let uri = if address.starts_with("http://") || address.starts_with("https://") {
        address.to_string()
    } else {
        format!("http://{address}")
    };

    let endpoint = tonic::transport::Endpoint::from_shared(uri)
        .map_err(|e| Error::Configuration(format!("invalid endpoint address {address}: {e}")))?
        .connect_timeout(connect_timeout)
        .timeout(call_timeout);

    Ok(endpoint.connect_lazy())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_set_is_rejected() {
        let result: Result<EndpointSet<()>> = EndpointSet::new(vec![], Duration::from_secs(1));
        assert!(matches!(result, Err(Error::Configuration(_))));
    }

    #[test]
    fn sticky_index_starts_at_zero() {
        let set = EndpointSet::new(
            vec![
                Endpoint {
                    address: "a:1".to_string(),
                    transport: (),
                },
                Endpoint {
                    address: "b:2".to_string(),
                    transport: (),
                },
            ],
            Duration::from_millis(1500),
        )
        .expect("non-empty set");

        assert_eq!(set.len(), 2);
        assert_eq!(set.sticky_index(), 0);
        assert_eq!(set.sticky_address(), "a:1");
        assert_eq!(set.get(1).address, "b:2");
    }

    #[test]
    fn lazy_channel_rejects_garbage_address() {
        let result = lazy_channel(
            "not a uri at all",
            Duration::from_secs(1),
            Duration::from_secs(1),
        );
        assert!(matches!(result, Err(Error::Configuration(_))));
    }
}
