//! Wire types for the object registry RPC surface.
//!
//! Message structs and client stubs for the two gRPC services the
//! registry exposes: `objectrepo.ObjectRepository` (the business
//! channel) and `hb.HeartbeatService` (the ping channel). The message
//! layout matches `proto/object_repository.proto` and
//! `proto/heartbeat.proto`; stubs are maintained by hand in the shape
//! `tonic-prost-build` would emit, which keeps `protoc` out of the
//! build.

pub mod hb;
pub mod objectrepo;

pub use hb::{HeartbeatServiceClient, UptimeInfo};
pub use objectrepo::{
    DeregisterRequest, DeregisterResponse, GetRequest, GetResponse, HeartbeatAck, HeartbeatPing,
    ObjectInfo, ObjectListResponse, ObjectRepositoryClient, RegisterRequest, RegisterResponse,
};
