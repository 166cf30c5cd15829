//! Client-facing gRPC API of a node.
mod client;
mod error;
mod server;

pub use client::ClusterStatus;
pub use client::KvClient;
pub use client::KvClientError;
pub use error::KvApiError;
pub use server::KvRpcServer;
