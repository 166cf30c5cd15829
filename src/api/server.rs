use crate::action::Action;
use crate::api::KvApiError;
use crate::engine::{ConsensusEngine, EngineError};
use crate::grpc::grpc_kv_server::{GrpcKv, GrpcKvServer};
use crate::grpc::{
    proto_delete_result, proto_get_result, proto_put_result, ProtoDeleteReq, ProtoDeleteResult, ProtoDeleteSuccess,
    ProtoGetReq, ProtoGetResult, ProtoGetSuccess, ProtoPutReq, ProtoPutResult, ProtoPutSuccess, ProtoStatusReq,
    ProtoStatusResult,
};
use crate::store::{KvStore, KvStoreError};
use bytes::Bytes;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::time::{self, Duration};
use tokio_util::sync::CancellationToken;
use tonic::transport::Server;
use tonic::{Request, Response, Status};

/// KvRpcServer is the type that implements the KV gRPC interface.
///
/// Writes are encoded as actions and proposed to the consensus engine; they are applied to the
/// store later, once committed. A successful reply means the proposal was accepted by the leader.
pub struct KvRpcServer<E> {
    logger: slog::Logger,
    engine: Arc<E>,
    store: Arc<KvStore>,
    propose_timeout: Duration,
}

impl<E: ConsensusEngine> KvRpcServer<E> {
    pub fn new(logger: slog::Logger, engine: Arc<E>, store: Arc<KvStore>, propose_timeout: Duration) -> Self {
        KvRpcServer {
            logger,
            engine,
            store,
            propose_timeout,
        }
    }

    pub async fn run(self, socket_addr: SocketAddr, cancel: CancellationToken) -> Result<(), tonic::transport::Error> {
        let logger = self.logger.clone();
        slog::info!(logger, "Listening on '{:?}'", socket_addr);

        let result = Server::builder()
            .add_service(GrpcKvServer::new(self))
            .serve_with_shutdown(socket_addr, cancel.cancelled())
            .await;

        slog::info!(logger, "Server run() has exited: {:?}", result);
        result
    }

    fn check_leader(&self) -> Result<(), KvApiError> {
        let status = self.engine.status();
        if status.is_leader() {
            return Ok(());
        }

        match status.leader() {
            Some(leader_id) => Err(KvApiError::LeaderRedirect { leader_id }),
            None => Err(KvApiError::NoLeader),
        }
    }

    async fn propose(&self, action: Action) -> Result<(), KvApiError> {
        self.check_leader()?;
        let data = action.encode()?;

        match time::timeout(self.propose_timeout, self.engine.propose(data.to_vec())).await {
            Ok(result) => result?,
            Err(_) => return Err(KvApiError::Propose(EngineError::Timeout)),
        }

        slog::debug!(self.logger, "Proposed {:?}", action);
        Ok(())
    }

    fn read(&self, key: &str) -> Result<Bytes, KvApiError> {
        self.check_leader()?;
        self.store.get(key).map_err(|KvStoreError::KeyNotFound(_)| KvApiError::KeyNotFound)
    }

    fn log_failure(&self, op: &str, key: &str, e: &KvApiError) {
        if let KvApiError::Encode(_) | KvApiError::Propose(_) = e {
            slog::warn!(self.logger, "{} '{}' failed: {}", op, key, e);
        }
    }

    async fn handle_put(&self, rpc_request: ProtoPutReq) -> Result<ProtoPutResult, Status> {
        let key = validate_key(rpc_request.key)?;
        let action = Action::Put {
            key: key.clone(),
            value: Bytes::from(rpc_request.value),
        };

        let result = match self.propose(action).await {
            Ok(()) => proto_put_result::Result::Ok(ProtoPutSuccess {}),
            Err(e) => {
                self.log_failure("Put", &key, &e);
                proto_put_result::Result::Err(e.into())
            }
        };

        Ok(ProtoPutResult { result: Some(result) })
    }

    async fn handle_delete(&self, rpc_request: ProtoDeleteReq) -> Result<ProtoDeleteResult, Status> {
        let key = validate_key(rpc_request.key)?;
        let action = Action::Delete { key: key.clone() };

        let result = match self.propose(action).await {
            Ok(()) => proto_delete_result::Result::Ok(ProtoDeleteSuccess {}),
            Err(e) => {
                self.log_failure("Delete", &key, &e);
                proto_delete_result::Result::Err(e.into())
            }
        };

        Ok(ProtoDeleteResult { result: Some(result) })
    }

    fn handle_get(&self, rpc_request: ProtoGetReq) -> Result<ProtoGetResult, Status> {
        let key = validate_key(rpc_request.key)?;

        let result = match self.read(&key) {
            Ok(value) => proto_get_result::Result::Ok(ProtoGetSuccess {
                key,
                value: value.to_vec(),
            }),
            Err(e) => proto_get_result::Result::Err(e.into()),
        };

        Ok(ProtoGetResult { result: Some(result) })
    }

    fn handle_status(&self) -> ProtoStatusResult {
        let status = self.engine.status();

        ProtoStatusResult {
            id: status.id,
            leader_id: status.leader_id,
            term: status.term,
            role: format!("{:?}", status.role),
            commit_index: status.commit_index,
            applied_index: status.applied_index,
        }
    }
}

fn validate_key(key: String) -> Result<String, Status> {
    if key.is_empty() {
        return Err(Status::invalid_argument("key must not be empty"));
    }

    Ok(key)
}

#[tonic::async_trait]
impl<E: ConsensusEngine> GrpcKv for KvRpcServer<E> {
    async fn put(&self, request: Request<ProtoPutReq>) -> Result<Response<ProtoPutResult>, Status> {
        self.handle_put(request.into_inner()).await.map(Response::new)
    }

    async fn delete(&self, request: Request<ProtoDeleteReq>) -> Result<Response<ProtoDeleteResult>, Status> {
        self.handle_delete(request.into_inner()).await.map(Response::new)
    }

    async fn get(&self, request: Request<ProtoGetReq>) -> Result<Response<ProtoGetResult>, Status> {
        self.handle_get(request.into_inner()).map(Response::new)
    }

    async fn status(&self, _: Request<ProtoStatusReq>) -> Result<Response<ProtoStatusResult>, Status> {
        Ok(Response::new(self.handle_status()))
    }
}
