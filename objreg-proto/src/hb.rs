//! `hb` package: the ping channel.
//!
//! Served on a separate port from the business service so liveness
//! probing stays cheap even when the business channel is loaded. Only
//! the primary replica answers `Ping`; backups return UNAVAILABLE.

use http::uri::PathAndQuery;
use tonic::transport::Channel;

#[derive(Clone, PartialEq, prost::Message, serde::Serialize, serde::Deserialize)]
pub struct UptimeInfo {
    #[prost(string, tag = "1")]
    pub node_id: String,
    #[prost(uint64, tag = "2")]
    pub uptime_sec: u64,
}

/// Client stub for `hb.HeartbeatService`.
#[derive(Debug, Clone)]
pub struct HeartbeatServiceClient {
    inner: tonic::client::Grpc<Channel>,
}

impl HeartbeatServiceClient {
    pub fn new(channel: Channel) -> Self {
        Self {
            inner: tonic::client::Grpc::new(channel),
        }
    }

    async fn ready(&mut self) -> Result<(), tonic::Status> {
        self.inner
            .ready()
            .await
            .map_err(|e| tonic::Status::unavailable(format!("connection not ready: {e}")))
    }

    pub async fn ping(
        &mut self,
        request: (),
    ) -> Result<tonic::Response<()>, tonic::Status> {
        self.ready().await?;
        self.inner
            .unary(
                tonic::Request::new(request),
                PathAndQuery::from_static("/hb.HeartbeatService/Ping"),
                tonic_prost::ProstCodec::default(),
            )
            .await
    }

    pub async fn get_uptime(
        &mut self,
        request: (),
    ) -> Result<tonic::Response<UptimeInfo>, tonic::Status> {
        self.ready().await?;
        self.inner
            .unary(
                tonic::Request::new(request),
                PathAndQuery::from_static("/hb.HeartbeatService/GetUptime"),
                tonic_prost::ProstCodec::default(),
            )
            .await
    }
}
