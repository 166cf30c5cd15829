use crate::action::ActionEncodeError;
use crate::engine::EngineError;
use crate::grpc::{proto_kv_error, ProtoKeyNotFound, ProtoKvError, ProtoLeaderRedirect, ProtoNoLeader, ProtoServerFault};

#[derive(Debug, thiserror::Error)]
pub enum KvApiError {
    #[error("not the leader, node {leader_id} is")]
    LeaderRedirect { leader_id: u64 },
    #[error("no leader is currently known")]
    NoLeader,
    #[error("key not found")]
    KeyNotFound,
    #[error("failed to encode action")]
    Encode(#[from] ActionEncodeError),
    #[error("failed to propose action: {0}")]
    Propose(#[from] EngineError),
}

impl From<KvApiError> for ProtoKvError {
    fn from(e: KvApiError) -> Self {
        let err = match e {
            KvApiError::LeaderRedirect { leader_id } => {
                proto_kv_error::Err::LeaderRedirect(ProtoLeaderRedirect { leader_id })
            }
            KvApiError::NoLeader => proto_kv_error::Err::NoLeader(ProtoNoLeader {}),
            KvApiError::KeyNotFound => proto_kv_error::Err::KeyNotFound(ProtoKeyNotFound {}),
            KvApiError::Encode(_) | KvApiError::Propose(_) => proto_kv_error::Err::ServerFault(ProtoServerFault {
                message: e.to_string(),
            }),
        };

        ProtoKvError { err: Some(err) }
    }
}
