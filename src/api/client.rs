use crate::grpc::grpc_kv_client::GrpcKvClient;
use crate::grpc::{
    proto_delete_result, proto_get_result, proto_kv_error, proto_put_result, ProtoDeleteReq, ProtoGetReq,
    ProtoKvError, ProtoPutReq, ProtoStatusReq,
};
use bytes::Bytes;
use std::net::SocketAddr;
use tonic::codegen::http::uri;
use tonic::transport::{Channel, Endpoint};

/// KvClient is a typed client for one node's KV API. It does not follow redirects; callers get
/// `KvClientError::LeaderRedirect` and pick the node to retry against.
pub struct KvClient {
    inner: GrpcKvClient<Channel>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClusterStatus {
    pub id: u64,
    pub leader_id: Option<u64>,
    pub term: u64,
    pub role: String,
    pub commit_index: u64,
    pub applied_index: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum KvClientError {
    #[error("invalid server address")]
    InvalidUri(#[from] uri::InvalidUri),
    #[error("failed to connect")]
    Connect(#[from] tonic::transport::Error),
    #[error("rpc failed: {0}")]
    Rpc(#[from] tonic::Status),
    #[error("node is not the leader, node {leader_id} is")]
    LeaderRedirect { leader_id: u64 },
    #[error("no leader is currently known")]
    NoLeader,
    #[error("key not found")]
    KeyNotFound,
    #[error("server fault: {0}")]
    ServerFault(String),
    #[error("server sent an empty result")]
    EmptyResult,
}

impl KvClient {
    pub async fn connect(addr: SocketAddr) -> Result<Self, KvClientError> {
        let url = format!("http://{}", addr);
        let endpoint = Endpoint::from_shared(url)?;
        let connection = endpoint.connect().await?;

        Ok(KvClient {
            inner: GrpcKvClient::new(connection),
        })
    }

    pub async fn put(&mut self, key: impl Into<String>, value: impl Into<Bytes>) -> Result<(), KvClientError> {
        let request = ProtoPutReq {
            key: key.into(),
            value: value.into().to_vec(),
        };
        let reply = self.inner.put(request).await?.into_inner();

        match reply.result {
            Some(proto_put_result::Result::Ok(_)) => Ok(()),
            Some(proto_put_result::Result::Err(e)) => Err(e.into()),
            None => Err(KvClientError::EmptyResult),
        }
    }

    pub async fn get(&mut self, key: impl Into<String>) -> Result<Bytes, KvClientError> {
        let reply = self.inner.get(ProtoGetReq { key: key.into() }).await?.into_inner();

        match reply.result {
            Some(proto_get_result::Result::Ok(ok)) => Ok(Bytes::from(ok.value)),
            Some(proto_get_result::Result::Err(e)) => Err(e.into()),
            None => Err(KvClientError::EmptyResult),
        }
    }

    pub async fn delete(&mut self, key: impl Into<String>) -> Result<(), KvClientError> {
        let reply = self.inner.delete(ProtoDeleteReq { key: key.into() }).await?.into_inner();

        match reply.result {
            Some(proto_delete_result::Result::Ok(_)) => Ok(()),
            Some(proto_delete_result::Result::Err(e)) => Err(e.into()),
            None => Err(KvClientError::EmptyResult),
        }
    }

    pub async fn status(&mut self) -> Result<ClusterStatus, KvClientError> {
        let reply = self.inner.status(ProtoStatusReq {}).await?.into_inner();

        Ok(ClusterStatus {
            id: reply.id,
            leader_id: if reply.leader_id == 0 { None } else { Some(reply.leader_id) },
            term: reply.term,
            role: reply.role,
            commit_index: reply.commit_index,
            applied_index: reply.applied_index,
        })
    }
}

impl From<ProtoKvError> for KvClientError {
    fn from(e: ProtoKvError) -> Self {
        match e.err {
            Some(proto_kv_error::Err::LeaderRedirect(redirect)) => KvClientError::LeaderRedirect {
                leader_id: redirect.leader_id,
            },
            Some(proto_kv_error::Err::NoLeader(_)) => KvClientError::NoLeader,
            Some(proto_kv_error::Err::KeyNotFound(_)) => KvClientError::KeyNotFound,
            Some(proto_kv_error::Err::ServerFault(fault)) => KvClientError::ServerFault(fault.message),
            None => KvClientError::EmptyResult,
        }
    }
}
