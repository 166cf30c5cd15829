mod action;
mod api;
mod commitlog;
mod config;
mod driver;
mod engine;
mod logging;
mod node;
mod store;
mod transport;
mod grpc {
    include!("../generated/kv.rs");
}
#[cfg(test)]
mod test_utils;

pub use action::Action;
pub use action::ActionDecodeError;
pub use action::ActionEncodeError;
pub use api::ClusterStatus;
pub use api::KvApiError;
pub use api::KvClient;
pub use api::KvClientError;
pub use api::KvRpcServer;
pub use commitlog::InMemoryLog;
pub use commitlog::LogStorage;
pub use commitlog::LogStorageError;
pub use config::ConfigError;
pub use config::NodeConfig;
pub use driver::start_node;
pub use driver::DriverError;
pub use driver::InboundStepper;
pub use driver::NodeOptions;
pub use driver::NodeOptionsError;
pub use driver::NodeOptionsValidated;
pub use driver::ReplicationDriver;
pub use driver::StartNodeConfig;
pub use driver::StartNodeError;
pub use driver::StartedNode;
pub use engine::ConsensusEngine;
pub use engine::EngineConfig;
pub use engine::EngineError;
pub use engine::EngineStatus;
pub use engine::MembershipChange;
pub use engine::RawNodeEngine;
pub use engine::ReadyBatch;
pub use logging::create_root_logger;
pub use logging::create_root_logger_for_file;
pub use logging::create_root_logger_for_stdout;
pub use node::run_node;
pub use node::NodeError;
pub use store::KvStore;
pub use store::KvStoreError;
pub use transport::decode_message;
pub use transport::encode_message;
pub use transport::PeerTable;
pub use transport::PeerTableError;
pub use transport::TcpTransport;
pub use transport::Transport;
pub use transport::TransportError;
pub use transport::TransportOptions;
