//! Sticky round-robin failover across an endpoint set.
//!
//! [`try_all`] starts at the set's sticky index and walks the
//! endpoints in round-robin order, at most one attempt per endpoint
//! per call. The first success wins and becomes the new sticky index,
//! so the next call prefers the endpoint that last responded. If every
//! endpoint fails or times out, the call reports exhaustion and the
//! sticky index is left unchanged.
//!
//! Round-robin-from-sticky rather than fixed-primary avoids re-testing
//! a known-dead primary on every call; deterministic order (rather
//! than random pick) keeps failover behavior reproducible.

use std::future::Future;

use tracing::{debug, warn};

use crate::endpoint::{Endpoint, EndpointSet};
use crate::error::{Error, Result};

/// Outcome of one successful [`try_all`] call. Never persisted.
#[derive(Debug)]
pub struct Invocation<R> {
    pub value: R,
    /// Index of the endpoint that answered; already stored as the
    /// set's sticky index by the time the caller sees this.
    pub endpoint_index: usize,
    /// Endpoints tried, including the successful one.
    pub attempts: usize,
}

/// Try `op` against every endpoint in `set`, starting from the sticky
/// index, until one succeeds.
///
/// Each attempt is bounded by the set's call timeout. `op` receives
/// the endpoint by reference and must clone what it needs into the
/// returned future (stubs are cheap to clone).
pub async fn try_all<T, R, F, Fut>(set: &EndpointSet<T>, mut op: F) -> Result<Invocation<R>>
where
    F: FnMut(&Endpoint<T>) -> Fut,
    Fut: Future<Output = Result<R>>,
{
    let size = set.len();
    let start = set.sticky_index();
    let mut last: Option<Error> = None;

    for attempt in 0..size {
        let index = (start + attempt) % size;
        let endpoint = set.get(index);

        let outcome = tokio::time::timeout(set.call_timeout(), op(endpoint)).await;
        match outcome {
            Ok(Ok(value)) => {
                set.set_sticky_index(index);
                if attempt > 0 {
                    debug!(
                        endpoint = %endpoint.address,
                        index,
                        attempts = attempt + 1,
                        "failed over to new endpoint"
                    );
                }
                return Ok(Invocation {
                    value,
                    endpoint_index: index,
                    attempts: attempt + 1,
                });
            }
            Ok(Err(e)) => {
                if e.is_rejection() {
                    // A live server said no; worth more noise than a
                    // dead one (typically a backup replica refusing writes).
                    warn!(endpoint = %endpoint.address, error = %e, "endpoint rejected request");
                } else {
                    debug!(endpoint = %endpoint.address, error = %e, "endpoint attempt failed");
                }
                last = Some(e);
            }
            Err(_) => {
                let e = Error::Timeout(format!(
                    "{} did not answer within {:?}",
                    endpoint.address,
                    set.call_timeout()
                ));
                debug!(endpoint = %endpoint.address, error = %e, "endpoint attempt timed out");
                last = Some(e);
            }
        }
    }

    Err(Error::Exhausted {
        attempted: size,
        last: Box::new(last.unwrap_or_else(|| Error::Rpc("empty endpoint set".to_string()))),
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use parking_lot::Mutex;

    use super::*;

    /// Per-endpoint scripted behavior for driving the invoker.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Behavior {
        Succeed,
        FailTransport,
        Reject,
        Hang,
    }

    fn scripted_set(behaviors: &[Behavior], timeout: Duration) -> EndpointSet<Behavior> {
        let endpoints = behaviors
            .iter()
            .enumerate()
            .map(|(i, b)| Endpoint {
                address: format!("replica-{i}:50051"),
                transport: *b,
            })
            .collect();
        EndpointSet::new(endpoints, timeout).expect("non-empty set")
    }

    /// Runs `try_all` recording which endpoint indices were attempted.
    async fn run(
        set: &EndpointSet<Behavior>,
    ) -> (Result<Invocation<&'static str>>, Vec<usize>) {
        let attempted: Arc<Mutex<Vec<usize>>> = Arc::new(Mutex::new(Vec::new()));
        let log = attempted.clone();
        let result = try_all(set, |ep| {
            let behavior = ep.transport;
            let address = ep.address.clone();
            let index: usize = address
                .trim_start_matches("replica-")
                .split(':')
                .next()
                .and_then(|s| s.parse().ok())
                .expect("scripted address");
            let log = log.clone();
            async move {
                log.lock().push(index);
                match behavior {
                    Behavior::Succeed => Ok("payload"),
                    Behavior::FailTransport => Err(Error::Rpc(format!("{address} unreachable"))),
                    Behavior::Reject => Err(Error::Rejected {
                        endpoint: address,
                        operation: "test",
                    }),
                    Behavior::Hang => {
                        tokio::time::sleep(Duration::from_secs(3600)).await;
                        Ok("never")
                    }
                }
            }
        })
        .await;
        let attempted = attempted.lock().clone();
        (result, attempted)
    }

    #[tokio::test]
    async fn first_success_wins_and_becomes_sticky() {
        use Behavior::{FailTransport, Succeed};
        let set = scripted_set(&[FailTransport, Succeed, Succeed], Duration::from_secs(1));

        let (result, attempted) = run(&set).await;
        let invocation = result.expect("B succeeds");
        assert_eq!(attempted, vec![0, 1]);
        assert_eq!(invocation.endpoint_index, 1);
        assert_eq!(invocation.attempts, 2);
        assert_eq!(invocation.value, "payload");
        assert_eq!(set.sticky_index(), 1);

        // Second call goes straight to B; A and C are never touched.
        let (result, attempted) = run(&set).await;
        assert!(result.is_ok());
        assert_eq!(attempted, vec![1]);
        assert_eq!(set.sticky_index(), 1);
    }

    #[tokio::test]
    async fn exhaustion_tries_every_endpoint_once_and_keeps_index() {
        use Behavior::FailTransport;
        let set = scripted_set(
            &[FailTransport, FailTransport, FailTransport],
            Duration::from_secs(1),
        );
        set.set_sticky_index(2);

        let (result, attempted) = run(&set).await;
        assert_eq!(attempted, vec![2, 0, 1]);
        match result {
            Err(Error::Exhausted { attempted, .. }) => assert_eq!(attempted, 3),
            other => panic!("expected exhaustion, got {other:?}"),
        }
        assert_eq!(set.sticky_index(), 2);
    }

    #[tokio::test]
    async fn wraps_modulo_set_size_from_sticky_index() {
        use Behavior::{FailTransport, Succeed};
        let set = scripted_set(&[Succeed, FailTransport, FailTransport], Duration::from_secs(1));
        set.set_sticky_index(2);

        let (result, attempted) = run(&set).await;
        let invocation = result.expect("wraps back to index 0");
        assert_eq!(attempted, vec![2, 0]);
        assert_eq!(invocation.endpoint_index, 0);
        assert_eq!(set.sticky_index(), 0);
    }

    #[tokio::test]
    async fn rejection_advances_to_next_endpoint() {
        use Behavior::{Reject, Succeed};
        let set = scripted_set(&[Reject, Succeed], Duration::from_secs(1));

        let (result, attempted) = run(&set).await;
        assert_eq!(attempted, vec![0, 1]);
        assert_eq!(result.expect("second endpoint accepts").endpoint_index, 1);
    }

    #[tokio::test]
    async fn all_rejected_surfaces_rejection_as_last_error() {
        use Behavior::Reject;
        let set = scripted_set(&[Reject, Reject], Duration::from_secs(1));

        let (result, _) = run(&set).await;
        match result {
            Err(Error::Exhausted { last, .. }) => assert!(last.is_rejection()),
            other => panic!("expected exhaustion, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn hung_endpoint_counts_as_failed_attempt() {
        use Behavior::{Hang, Succeed};
        let set = scripted_set(&[Hang, Succeed], Duration::from_millis(1000));

        let (result, attempted) = run(&set).await;
        let invocation = result.expect("falls through to the live endpoint");
        assert_eq!(attempted, vec![0, 1]);
        assert_eq!(invocation.endpoint_index, 1);
        assert_eq!(invocation.attempts, 2);
        assert_eq!(set.sticky_index(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn every_endpoint_hung_reports_timeout_exhaustion() {
        use Behavior::Hang;
        let set = scripted_set(&[Hang, Hang], Duration::from_millis(1000));

        let (result, attempted) = run(&set).await;
        assert_eq!(attempted, vec![0, 1]);
        match result {
            Err(Error::Exhausted { attempted, last }) => {
                assert_eq!(attempted, 2);
                assert!(matches!(*last, Error::Timeout(_)));
            }
            other => panic!("expected exhaustion, got {other:?}"),
        }
        assert_eq!(set.sticky_index(), 0);
    }
}
