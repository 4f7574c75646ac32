//! Registry facade: the public operations over both channels.
//!
//! Every operation is a [`failover::try_all`] over one endpoint set:
//! the business set for register/deregister/lookup/heartbeat/list, the
//! ping set for the liveness probe. The facade is a pure RPC layer; it
//! never touches the session's alive flag (the monitor and the command
//! dispatcher own that).

use std::time::Duration;

use async_trait::async_trait;
use tonic::transport::Channel;
use tracing::{debug, info};

use objreg_proto::{
    DeregisterRequest, GetRequest, HeartbeatPing, HeartbeatServiceClient, ObjectInfo,
    ObjectRepositoryClient, RegisterRequest, UptimeInfo,
};

use crate::config::ClientConfig;
use crate::endpoint::{lazy_channel, Endpoint, EndpointSet};
use crate::error::{Error, Result};
use crate::failover;
use crate::session::Identity;

/// Client for the replicated registry.
///
/// Holds one endpoint set per logical channel, each with its own
/// sticky index. Cheap to share behind an `Arc`; all operations take
/// `&self`.
pub struct RegistryClient {
    business: EndpointSet<ObjectRepositoryClient>,
    ping: EndpointSet<HeartbeatServiceClient>,
}

impl RegistryClient {
    /// Build endpoint sets from the configured address lists.
    ///
    /// Channels are lazy: nothing is dialed here, and a dead address
    /// surfaces as an attempt failure on first use.
    pub fn connect(config: &ClientConfig) -> Result<Self> {
        let business = endpoint_set(
            &config.registry.business_addresses,
            config.registry.connect_timeout(),
            config.registry.business_timeout(),
            ObjectRepositoryClient::new,
        )?;
        let ping = endpoint_set(
            &config.registry.ping_addresses,
            config.registry.connect_timeout(),
            config.registry.ping_timeout(),
            HeartbeatServiceClient::new,
        )?;

        Ok(Self { business, ping })
    }

    /// Register `identity` with whichever replica accepts it.
    ///
    /// Returns the address of the accepting endpoint. The address is
    /// informational; subsequent calls stay sticky via the endpoint
    /// set's own index.
    pub async fn register(&self, identity: &Identity) -> Result<String> {
        let request = RegisterRequest {
            object_name: identity.name.clone(),
            object_address: identity.address.clone(),
            language: identity.language.clone(),
            version: identity.version.clone(),
            region: identity.region.clone(),
            is_replication: false,
        };

        let invocation = failover::try_all(&self.business, |ep| {
            let mut stub = ep.transport.clone();
            let address = ep.address.clone();
            let request = request.clone();
            async move {
                let response = stub.register_object(request).await.map_err(|status| {
                    Error::Rpc(format!("RegisterObject failed for {address}: {status}"))
                })?;
                check_ack(response.into_inner().success, &address, "RegisterObject")?;
                Ok(address)
            }
        })
        .await?;

        info!(
            name = %identity.name,
            endpoint = %invocation.value,
            attempts = invocation.attempts,
            "registered"
        );
        Ok(invocation.value)
    }

    /// Deregister `name`. Safe to call when not currently registered;
    /// the server is authoritative on whether a no-op still counts as
    /// success.
    pub async fn deregister(&self, name: &str) -> Result<()> {
        let request = DeregisterRequest {
            object_name: name.to_string(),
            is_replication: false,
        };

        let invocation = failover::try_all(&self.business, |ep| {
            let mut stub = ep.transport.clone();
            let address = ep.address.clone();
            let request = request.clone();
            async move {
                let response = stub.deregister_object(request).await.map_err(|status| {
                    Error::Rpc(format!("DeregisterObject failed for {address}: {status}"))
                })?;
                check_ack(response.into_inner().success, &address, "DeregisterObject")
            }
        })
        .await?;

        info!(name, attempts = invocation.attempts, "deregistered");
        Ok(())
    }

    /// Look up the address registered under `name`.
    ///
    /// `Ok(None)` means a replica answered and the name is not
    /// registered; `Err` means no replica could be reached at all, a
    /// deliberately distinct outcome ("could not determine").
    pub async fn lookup(&self, name: &str) -> Result<Option<String>> {
        let request = GetRequest {
            object_name: name.to_string(),
        };

        let invocation = failover::try_all(&self.business, |ep| {
            let mut stub = ep.transport.clone();
            let address = ep.address.clone();
            let request = request.clone();
            async move {
                let response = stub.get_object(request).await.map_err(|status| {
                    Error::Rpc(format!("GetObject failed for {address}: {status}"))
                })?;
                Ok(found_address(response.into_inner().object_address))
            }
        })
        .await?;

        debug!(name, found = invocation.value.is_some(), "lookup");
        Ok(invocation.value)
    }

    /// Refresh the server-side TTL for `name`.
    pub async fn heartbeat(&self, name: &str) -> Result<()> {
        let request = HeartbeatPing {
            object_name: name.to_string(),
        };

        failover::try_all(&self.business, |ep| {
            let mut stub = ep.transport.clone();
            let address = ep.address.clone();
            let request = request.clone();
            async move {
                let response = stub.heartbeat(request).await.map_err(|status| {
                    Error::Rpc(format!("Heartbeat failed for {address}: {status}"))
                })?;
                check_ack(response.into_inner().ok, &address, "Heartbeat")
            }
        })
        .await?;

        Ok(())
    }

    /// Liveness probe over the ping channel (its own sticky index).
    pub async fn ping(&self) -> Result<()> {
        failover::try_all(&self.ping, |ep| {
            let mut stub = ep.transport.clone();
            let address = ep.address.clone();
            async move {
                stub.ping(())
                    .await
                    .map_err(|status| Error::Rpc(format!("Ping failed for {address}: {status}")))?;
                Ok(())
            }
        })
        .await?;

        Ok(())
    }

    /// List every registered object.
    pub async fn list(&self) -> Result<Vec<ObjectInfo>> {
        let invocation = failover::try_all(&self.business, |ep| {
            let mut stub = ep.transport.clone();
            let address = ep.address.clone();
            async move {
                let response = stub
                    .list_objects(())
                    .await
                    .map_err(|status| {
                        Error::Rpc(format!("ListObjects failed for {address}: {status}"))
                    })?;
                Ok(response.into_inner().objects)
            }
        })
        .await?;

        Ok(invocation.value)
    }

    /// Per-replica uptime, queried directly against every ping
    /// endpoint (no failover: this is a diagnostic view and a dead
    /// replica is exactly what we want to see).
    pub async fn uptimes(&self) -> Vec<(String, Result<UptimeInfo>)> {
        let timeout = self.ping.call_timeout();
        let queries = self.ping.iter().map(|ep| {
            let mut stub = ep.transport.clone();
            let address = ep.address.clone();
            async move {
                let outcome =
                    tokio::time::timeout(timeout, stub.get_uptime(()))
                        .await;
                let result = match outcome {
                    Ok(Ok(response)) => Ok(response.into_inner()),
                    Ok(Err(status)) => Err(Error::Rpc(format!(
                        "GetUptime failed for {address}: {status}"
                    ))),
                    Err(_) => Err(Error::Timeout(format!(
                        "{address} did not answer within {timeout:?}"
                    ))),
                };
                (address, result)
            }
        });

        futures::future::join_all(queries).await
    }

    /// Sticky indices of both channels, for status display.
    #[must_use]
    pub fn sticky_endpoints(&self) -> (String, String) {
        (
            self.business.sticky_address().to_string(),
            self.ping.sticky_address().to_string(),
        )
    }
}

/// Maps a boolean ack into the error taxonomy: a live server answering
/// `false` is a rejection (typically a backup replica refusing a
/// write), not a transport failure.
fn check_ack(accepted: bool, endpoint: &str, operation: &'static str) -> Result<()> {
    if accepted {
        Ok(())
    } else {
        Err(Error::Rejected {
            endpoint: endpoint.to_string(),
            operation,
        })
    }
}

/// An empty address in a lookup response means the name is not
/// registered, a distinct outcome from not reaching any replica.
fn found_address(object_address: String) -> Option<String> {
    if object_address.is_empty() {
        None
    } else {
        Some(object_address)
    }
}

fn endpoint_set<T>(
    addresses: &[String],
    connect_timeout: Duration,
    call_timeout: Duration,
    make: impl Fn(Channel) -> T,
) -> Result<EndpointSet<T>> {
    let mut endpoints = Vec::with_capacity(addresses.len());
    for address in addresses {
        let channel = lazy_channel(address, connect_timeout, call_timeout)?;
        endpoints.push(Endpoint {
            address: address.clone(),
            transport: make(channel),
        });
    }
    EndpointSet::new(endpoints, call_timeout)
}

/// The slice of the facade the liveness monitor depends on.
///
/// Split out so the monitor's recovery state machine can be exercised
/// against a mock instead of a live cluster.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LivenessRpc: Send + Sync {
    async fn register(&self, identity: &Identity) -> Result<String>;
    async fn heartbeat(&self, name: &str) -> Result<()>;
    async fn ping(&self) -> Result<()>;
}

#[async_trait]
impl LivenessRpc for RegistryClient {
    async fn register(&self, identity: &Identity) -> Result<String> {
        RegistryClient::register(self, identity).await
    }

    async fn heartbeat(&self, name: &str) -> Result<()> {
        RegistryClient::heartbeat(self, name).await
    }

    async fn ping(&self) -> Result<()> {
        RegistryClient::ping(self).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn connect_rejects_empty_address_list() {
        let mut config = ClientConfig::default();
        config.registry.business_addresses.clear();

        let result = RegistryClient::connect(&config);
        assert!(matches!(result, Err(Error::Configuration(_))));
    }

    #[tokio::test]
    async fn connect_rejects_malformed_address() {
        let mut config = ClientConfig::default();
        config.registry.ping_addresses = vec!["not a valid uri".to_string()];

        let result = RegistryClient::connect(&config);
        assert!(matches!(result, Err(Error::Configuration(_))));
    }

    #[tokio::test]
    async fn connect_with_defaults_is_lazy() {
        // Nothing listens on the default addresses; construction must
        // still succeed because channels only dial on first use.
        let config = ClientConfig::default();
        let client = RegistryClient::connect(&config).expect("lazy connect");
        let (business, ping) = client.sticky_endpoints();
        assert_eq!(business, "127.0.0.1:50051");
        assert_eq!(ping, "127.0.0.1:50052");
    }

    #[test]
    fn empty_lookup_address_means_not_found() {
        assert_eq!(found_address(String::new()), None);
        assert_eq!(
            found_address("10.0.0.7:9000".to_string()),
            Some("10.0.0.7:9000".to_string())
        );
    }

    #[test]
    fn false_ack_is_a_rejection_naming_the_endpoint() {
        assert!(check_ack(true, "replica-0:50051", "Heartbeat").is_ok());

        let err = check_ack(false, "replica-1:50051", "RegisterObject")
            .expect_err("false ack must be rejected");
        assert!(err.is_rejection());
        match err {
            Error::Rejected {
                endpoint,
                operation,
            } => {
                assert_eq!(endpoint, "replica-1:50051");
                assert_eq!(operation, "RegisterObject");
            }
            other => panic!("expected rejection, got {other:?}"),
        }
    }
}
