use crate::transport::wire;
use async_trait::async_trait;
use raft::prelude::Message;
use std::io;
use std::net::SocketAddr;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::time::{self, Duration};
use tokio_util::sync::CancellationToken;

/// Transport carries consensus messages between nodes.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Deliver `message` to the peer listening at `address`. Returns the message back once it has
    /// been fully written, or `None` if delivery failed. Failures are logged, never raised.
    async fn send(&self, message: Message, address: &str) -> Option<Message>;

    /// Accept inbound messages until `cancel` fires. Only a failure to bind is returned.
    async fn listen(&self, cancel: CancellationToken) -> Result<(), TransportError>;
}

#[derive(Clone, Copy, Debug)]
pub struct TransportOptions {
    pub connect_timeout: Duration,
    pub write_timeout: Duration,
    pub read_timeout: Duration,
    pub max_message_size: usize,
}

impl Default for TransportOptions {
    fn default() -> Self {
        TransportOptions {
            connect_timeout: Duration::from_secs(1),
            write_timeout: Duration::from_secs(5),
            read_timeout: Duration::from_secs(5),
            max_message_size: 16 * 1024 * 1024,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("failed to bind peer listener on '{addr}'")]
    Bind { addr: String, source: io::Error },
    #[error("timed out connecting to '{0}'")]
    ConnectTimeout(String),
    #[error("timed out writing to '{0}'")]
    WriteTimeout(String),
    #[error("timed out reading from '{0}'")]
    ReadTimeout(SocketAddr),
    #[error("I/O failure")]
    Io(#[from] io::Error),
    #[error("malformed consensus message")]
    Codec(#[from] protobuf::ProtobufError),
    #[error("inbound message exceeds {limit} bytes")]
    MessageTooLarge { limit: usize },
}

/// TcpTransport delivers each consensus message over its own TCP connection.
///
/// Wire contract: the sender connects, writes one protobuf-encoded message, and shuts down its
/// write half. The receiver reads the connection to EOF and decodes everything it read as exactly
/// one message. There is no other framing, so neither side may put a second message on the same
/// connection.
pub struct TcpTransport {
    logger: slog::Logger,
    listen_addr: String,
    inbound: mpsc::Sender<Message>,
    options: TransportOptions,
}

impl TcpTransport {
    pub fn new(
        logger: slog::Logger,
        listen_addr: String,
        inbound: mpsc::Sender<Message>,
        options: TransportOptions,
    ) -> Self {
        TcpTransport {
            logger,
            listen_addr,
            inbound,
            options,
        }
    }

    pub async fn bind(&self) -> Result<TcpListener, TransportError> {
        TcpListener::bind(&self.listen_addr)
            .await
            .map_err(|source| TransportError::Bind {
                addr: self.listen_addr.clone(),
                source,
            })
    }

    pub async fn serve(&self, listener: TcpListener, cancel: CancellationToken) {
        if let Ok(local_addr) = listener.local_addr() {
            slog::info!(self.logger, "Peer transport listening on '{:?}'", local_addr);
        }

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                accepted = listener.accept() => match accepted {
                    Ok((stream, remote_addr)) => {
                        let connection = InboundConnection {
                            logger: self.logger.clone(),
                            remote_addr,
                            inbound: self.inbound.clone(),
                            options: self.options,
                        };
                        tokio::spawn(connection.run(stream));
                    }
                    Err(e) => slog::warn!(self.logger, "Failed to accept peer connection: {:?}", e),
                },
            }
        }

        slog::info!(self.logger, "Peer transport listener has exited");
    }

    async fn try_send(&self, message: &Message, address: &str) -> Result<(), TransportError> {
        let bytes = wire::encode_message(message)?;

        let mut stream = time::timeout(self.options.connect_timeout, TcpStream::connect(address))
            .await
            .map_err(|_| TransportError::ConnectTimeout(address.to_string()))??;

        time::timeout(self.options.write_timeout, async {
            stream.write_all(&bytes).await?;
            stream.shutdown().await
        })
        .await
        .map_err(|_| TransportError::WriteTimeout(address.to_string()))??;

        Ok(())
    }
}

#[async_trait]
impl Transport for TcpTransport {
    async fn send(&self, message: Message, address: &str) -> Option<Message> {
        match self.try_send(&message, address).await {
            Ok(()) => Some(message),
            Err(e) => {
                slog::warn!(
                    self.logger,
                    "Failed to send {:?} to node {} at '{}': {}",
                    message.get_msg_type(),
                    message.get_to(),
                    address,
                    e
                );
                None
            }
        }
    }

    async fn listen(&self, cancel: CancellationToken) -> Result<(), TransportError> {
        let listener = self.bind().await?;
        self.serve(listener, cancel).await;
        Ok(())
    }
}

struct InboundConnection {
    logger: slog::Logger,
    remote_addr: SocketAddr,
    inbound: mpsc::Sender<Message>,
    options: TransportOptions,
}

impl InboundConnection {
    async fn run(self, stream: TcpStream) {
        match self.read_message(stream).await {
            Ok(Some(message)) => {
                if self.inbound.send(message).await.is_err() {
                    slog::debug!(self.logger, "Inbound queue closed, dropping message from {}", self.remote_addr);
                }
            }
            Ok(None) => {}
            Err(e) => slog::warn!(self.logger, "Dropping inbound message from {}: {}", self.remote_addr, e),
        }
    }

    async fn read_message(&self, stream: TcpStream) -> Result<Option<Message>, TransportError> {
        let limit = self.options.max_message_size;
        let mut buf = Vec::new();

        // Read one byte past the limit so an over-sized stream is detected rather than truncated.
        let mut limited = stream.take(limit as u64 + 1);
        time::timeout(self.options.read_timeout, limited.read_to_end(&mut buf))
            .await
            .map_err(|_| TransportError::ReadTimeout(self.remote_addr))??;

        if buf.len() > limit {
            return Err(TransportError::MessageTooLarge { limit });
        }
        if buf.is_empty() {
            return Ok(None);
        }

        Ok(Some(wire::decode_message(&buf)?))
    }
}
