//! `objectrepo` package: the business channel.

use http::uri::PathAndQuery;
use tonic::transport::Channel;

#[derive(Clone, PartialEq, prost::Message, serde::Serialize, serde::Deserialize)]
pub struct RegisterRequest {
    #[prost(string, tag = "1")]
    pub object_name: String,
    #[prost(string, tag = "2")]
    pub object_address: String,
    #[prost(string, tag = "3")]
    pub language: String,
    #[prost(string, tag = "4")]
    pub version: String,
    #[prost(string, tag = "5")]
    pub region: String,
    /// Set by a leader replica when fanning a write out to backups;
    /// clients always send false.
    #[prost(bool, tag = "6")]
    pub is_replication: bool,
}

#[derive(Clone, PartialEq, prost::Message, serde::Serialize, serde::Deserialize)]
pub struct RegisterResponse {
    #[prost(bool, tag = "1")]
    pub success: bool,
}

#[derive(Clone, PartialEq, prost::Message, serde::Serialize, serde::Deserialize)]
pub struct DeregisterRequest {
    #[prost(string, tag = "1")]
    pub object_name: String,
    #[prost(bool, tag = "2")]
    pub is_replication: bool,
}

#[derive(Clone, PartialEq, prost::Message, serde::Serialize, serde::Deserialize)]
pub struct DeregisterResponse {
    #[prost(bool, tag = "1")]
    pub success: bool,
}

#[derive(Clone, PartialEq, prost::Message, serde::Serialize, serde::Deserialize)]
pub struct GetRequest {
    #[prost(string, tag = "1")]
    pub object_name: String,
}

#[derive(Clone, PartialEq, prost::Message, serde::Serialize, serde::Deserialize)]
pub struct GetResponse {
    /// Empty when the object is not registered.
    #[prost(string, tag = "1")]
    pub object_address: String,
}

#[derive(Clone, PartialEq, prost::Message, serde::Serialize, serde::Deserialize)]
pub struct ObjectInfo {
    #[prost(string, tag = "1")]
    pub object_name: String,
    #[prost(string, tag = "2")]
    pub object_address: String,
    #[prost(string, tag = "3")]
    pub language: String,
    #[prost(string, tag = "4")]
    pub version: String,
    #[prost(string, tag = "5")]
    pub region: String,
}

#[derive(Clone, PartialEq, prost::Message, serde::Serialize, serde::Deserialize)]
pub struct ObjectListResponse {
    #[prost(message, repeated, tag = "1")]
    pub objects: Vec<ObjectInfo>,
}

#[derive(Clone, PartialEq, prost::Message, serde::Serialize, serde::Deserialize)]
pub struct HeartbeatPing {
    #[prost(string, tag = "1")]
    pub object_name: String,
}

#[derive(Clone, PartialEq, prost::Message, serde::Serialize, serde::Deserialize)]
pub struct HeartbeatAck {
    #[prost(bool, tag = "1")]
    pub ok: bool,
}

/// Client stub for `objectrepo.ObjectRepository`.
///
/// Concrete over [`Channel`]; cloning is cheap and shares the
/// underlying HTTP/2 connection.
#[derive(Debug, Clone)]
pub struct ObjectRepositoryClient {
    inner: tonic::client::Grpc<Channel>,
}

impl ObjectRepositoryClient {
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

    pub async fn register_object(
        &mut self,
        request: RegisterRequest,
    ) -> Result<tonic::Response<RegisterResponse>, tonic::Status> {
        self.ready().await?;
        self.inner
            .unary(
                tonic::Request::new(request),
                PathAndQuery::from_static("/objectrepo.ObjectRepository/RegisterObject"),
                tonic_prost::ProstCodec::default(),
            )
            .await
    }

    pub async fn deregister_object(
        &mut self,
        request: DeregisterRequest,
    ) -> Result<tonic::Response<DeregisterResponse>, tonic::Status> {
        self.ready().await?;
        self.inner
            .unary(
                tonic::Request::new(request),
                PathAndQuery::from_static("/objectrepo.ObjectRepository/DeregisterObject"),
                tonic_prost::ProstCodec::default(),
            )
            .await
    }

    pub async fn get_object(
        &mut self,
        request: GetRequest,
    ) -> Result<tonic::Response<GetResponse>, tonic::Status> {
        self.ready().await?;
        self.inner
            .unary(
                tonic::Request::new(request),
                PathAndQuery::from_static("/objectrepo.ObjectRepository/GetObject"),
                tonic_prost::ProstCodec::default(),
            )
            .await
    }

    pub async fn list_objects(
        &mut self,
        request: (),
    ) -> Result<tonic::Response<ObjectListResponse>, tonic::Status> {
        self.ready().await?;
        self.inner
            .unary(
                tonic::Request::new(request),
                PathAndQuery::from_static("/objectrepo.ObjectRepository/ListObjects"),
                tonic_prost::ProstCodec::default(),
            )
            .await
    }

    pub async fn heartbeat(
        &mut self,
        request: HeartbeatPing,
    ) -> Result<tonic::Response<HeartbeatAck>, tonic::Status> {
        self.ready().await?;
        self.inner
            .unary(
                tonic::Request::new(request),
                PathAndQuery::from_static("/objectrepo.ObjectRepository/Heartbeat"),
                tonic_prost::ProstCodec::default(),
            )
            .await
    }
}
