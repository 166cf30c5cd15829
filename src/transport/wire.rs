use protobuf::Message as ProtobufMessage;
use raft::prelude::Message;

/// Serialize a consensus message in the engine's protobuf wire format.
pub fn encode_message(message: &Message) -> Result<Vec<u8>, protobuf::ProtobufError> {
    message.write_to_bytes()
}

pub fn decode_message(bytes: &[u8]) -> Result<Message, protobuf::ProtobufError> {
    let mut message = Message::default();
    message.merge_from_bytes(bytes)?;
    Ok(message)
}
