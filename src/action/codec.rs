use bytes::{BufMut, Bytes, BytesMut};
use std::convert::TryFrom;
use std::string::FromUtf8Error;

/// Action is a mutation of the key-value state machine. It is encoded when proposed to the
/// replicated log and decoded again when the log entry carrying it is committed.
///
/// Byte representation:
///
/// ```text
/// Put:
/// +-----+-----+----------------+-----------------+------------------+--------------------+
/// | Vrs | Knd | Key len (4 B)  | Key (variable)  | Value len (4 B)  | Value (variable)   |
/// +-----+-----+----------------+-----------------+------------------+--------------------+
///
/// Delete:
/// +-----+-----+----------------+-----------------+
/// | Vrs | Knd | Key len (4 B)  | Key (variable)  |
/// +-----+-----+----------------+-----------------+
/// ```
///
/// * `Vrs` - version of the serialized payload
/// * `Knd` - action kind, `0` for put and `1` for delete
/// * lengths are big-endian `u32`
///
/// Every field is length-prefixed and the payload must be consumed exactly, so a truncated or
/// extended payload never decodes into a different action.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Action {
    Put { key: String, value: Bytes },
    Delete { key: String },
}

const ACTION_FORMAT_VERSION: u8 = 1;
const PUT_KIND: u8 = 0;
const DELETE_KIND: u8 = 1;
const LEN_PREFIX_SIZE: usize = 4;

#[derive(Debug, thiserror::Error)]
pub enum ActionEncodeError {
    #[error("{field} is {len} bytes, which exceeds the encodable maximum of {max} bytes")]
    FieldTooLarge { field: &'static str, len: usize, max: u32 },
}

#[derive(Debug, thiserror::Error)]
pub enum ActionDecodeError {
    #[error("unsupported action format version {0}")]
    UnsupportedVersion(u8),
    #[error("unknown action kind {0}")]
    UnknownKind(u8),
    #[error("payload truncated: needed {needed} bytes, {remaining} remaining")]
    Truncated { needed: usize, remaining: usize },
    #[error("key is not valid UTF-8")]
    InvalidKey(#[from] FromUtf8Error),
    #[error("{0} unexpected trailing bytes after action")]
    TrailingBytes(usize),
}

impl Action {
    pub fn key(&self) -> &str {
        match self {
            Action::Put { key, .. } => key,
            Action::Delete { key } => key,
        }
    }

    pub fn encode(&self) -> Result<Bytes, ActionEncodeError> {
        let mut buf = BytesMut::with_capacity(self.encoded_len());
        buf.put_u8(ACTION_FORMAT_VERSION);

        match self {
            Action::Put { key, value } => {
                buf.put_u8(PUT_KIND);
                put_len_prefixed(&mut buf, "key", key.as_bytes())?;
                put_len_prefixed(&mut buf, "value", value)?;
            }
            Action::Delete { key } => {
                buf.put_u8(DELETE_KIND);
                put_len_prefixed(&mut buf, "key", key.as_bytes())?;
            }
        }

        Ok(buf.freeze())
    }

    pub fn decode(bytes: &[u8]) -> Result<Action, ActionDecodeError> {
        let mut remaining = bytes;

        let version = take_u8(&mut remaining)?;
        if version != ACTION_FORMAT_VERSION {
            return Err(ActionDecodeError::UnsupportedVersion(version));
        }

        let action = match take_u8(&mut remaining)? {
            PUT_KIND => {
                let key = take_key(&mut remaining)?;
                let value = take_len_prefixed(&mut remaining)?;
                Action::Put {
                    key,
                    value: Bytes::copy_from_slice(value),
                }
            }
            DELETE_KIND => Action::Delete {
                key: take_key(&mut remaining)?,
            },
            other => return Err(ActionDecodeError::UnknownKind(other)),
        };

        if !remaining.is_empty() {
            return Err(ActionDecodeError::TrailingBytes(remaining.len()));
        }

        Ok(action)
    }

    fn encoded_len(&self) -> usize {
        match self {
            Action::Put { key, value } => 2 + LEN_PREFIX_SIZE + key.len() + LEN_PREFIX_SIZE + value.len(),
            Action::Delete { key } => 2 + LEN_PREFIX_SIZE + key.len(),
        }
    }
}

impl TryFrom<&[u8]> for Action {
    type Error = ActionDecodeError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        Action::decode(bytes)
    }
}

fn put_len_prefixed(buf: &mut BytesMut, field: &'static str, data: &[u8]) -> Result<(), ActionEncodeError> {
    let len = u32::try_from(data.len()).map_err(|_| ActionEncodeError::FieldTooLarge {
        field,
        len: data.len(),
        max: u32::MAX,
    })?;
    buf.put_u32(len);
    buf.put_slice(data);

    Ok(())
}

fn take<'a>(bytes: &mut &'a [u8], needed: usize) -> Result<&'a [u8], ActionDecodeError> {
    if bytes.len() < needed {
        return Err(ActionDecodeError::Truncated {
            needed,
            remaining: bytes.len(),
        });
    }

    let (head, tail) = bytes.split_at(needed);
    *bytes = tail;
    Ok(head)
}

fn take_u8(bytes: &mut &[u8]) -> Result<u8, ActionDecodeError> {
    Ok(take(bytes, 1)?[0])
}

fn take_len_prefixed<'a>(bytes: &mut &'a [u8]) -> Result<&'a [u8], ActionDecodeError> {
    let prefix = take(bytes, LEN_PREFIX_SIZE)?;
    let len = u32::from_be_bytes([prefix[0], prefix[1], prefix[2], prefix[3]]) as usize;
    take(bytes, len)
}

fn take_key(bytes: &mut &[u8]) -> Result<String, ActionDecodeError> {
    let raw_key = take_len_prefixed(bytes)?;
    Ok(String::from_utf8(raw_key.to_vec())?)
}
