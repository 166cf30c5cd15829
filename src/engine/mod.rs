mod consensus;
mod raw_node;

pub use consensus::ConsensusEngine;
pub use consensus::EngineError;
pub use consensus::EngineStatus;
pub use consensus::MembershipChange;
pub use consensus::ReadyBatch;
pub use raw_node::EngineConfig;
pub use raw_node::RawNodeEngine;
