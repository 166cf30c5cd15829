mod peers;
mod tcp;
mod wire;

pub use peers::PeerTable;
pub use peers::PeerTableError;
pub use tcp::TcpTransport;
pub use tcp::Transport;
pub use tcp::TransportError;
pub use tcp::TransportOptions;
pub use wire::decode_message;
pub use wire::encode_message;
