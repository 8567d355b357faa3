//! Map response types
//!
//! Replies use the same envelope as operations: `[tag: u8][payload]`.

use crate::codec::{ensure_consumed, read_entries, read_list, write_entries, write_list};
use crate::error::{ProtocolError, ProtocolResult};
use crate::operation::MapOperation;
use bytes::{BufMut, Bytes, BytesMut};
use cmap_core::codec::{read_u64, read_u8};
use cmap_core::{CodecLimits, Primitive, PrimitiveCodec};
use std::io::{Read, Write};
use tracing::{debug, trace};

/// One-byte wire tag for every response variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ResponseType {
    Value = 0,
    Boolean = 1,
    Size = 2,
    KeySet = 3,
    ValueCollection = 4,
    EntrySet = 5,
}

impl ResponseType {
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for ResponseType {
    type Error = ProtocolError;

    fn try_from(tag: u8) -> Result<Self, Self::Error> {
        match tag {
            0 => Ok(ResponseType::Value),
            1 => Ok(ResponseType::Boolean),
            2 => Ok(ResponseType::Size),
            3 => Ok(ResponseType::KeySet),
            4 => Ok(ResponseType::ValueCollection),
            5 => Ok(ResponseType::EntrySet),
            other => Err(ProtocolError::UnknownResponseType(other)),
        }
    }
}

impl std::fmt::Display for ResponseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResponseType::Value => write!(f, "VALUE"),
            ResponseType::Boolean => write!(f, "BOOLEAN"),
            ResponseType::Size => write!(f, "SIZE"),
            ResponseType::KeySet => write!(f, "KEY_SET"),
            ResponseType::ValueCollection => write!(f, "VALUE_COLLECTION"),
            ResponseType::EntrySet => write!(f, "ENTRY_SET"),
        }
    }
}

/// A replica's answer to a [`MapOperation`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapResponse {
    /// Previous or current value; `Primitive::Null` when there was none
    Value(Primitive),

    /// Outcome of a query or conditional mutation
    Boolean(bool),

    /// [u64 BE]
    Size(u64),

    KeySet(Vec<Primitive>),

    ValueCollection(Vec<Primitive>),

    EntrySet(Vec<(Primitive, Primitive)>),
}

impl MapResponse {
    pub fn value(v: impl Into<Primitive>) -> Self {
        MapResponse::Value(v.into())
    }

    pub fn absent() -> Self {
        MapResponse::Value(Primitive::Null)
    }

    pub fn boolean(b: bool) -> Self {
        MapResponse::Boolean(b)
    }

    pub fn size(n: u64) -> Self {
        MapResponse::Size(n)
    }

    pub fn response_type(&self) -> ResponseType {
        match self {
            MapResponse::Value(_) => ResponseType::Value,
            MapResponse::Boolean(_) => ResponseType::Boolean,
            MapResponse::Size(_) => ResponseType::Size,
            MapResponse::KeySet(_) => ResponseType::KeySet,
            MapResponse::ValueCollection(_) => ResponseType::ValueCollection,
            MapResponse::EntrySet(_) => ResponseType::EntrySet,
        }
    }

    /// Whether this is the kind of reply `op` expects
    pub fn answers(&self, op: &MapOperation) -> bool {
        op.operation_type().response_type() == Some(self.response_type())
    }
}

/// Stateless encoder/decoder for [`MapResponse`]s
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseCodec {
    primitives: PrimitiveCodec,
}

impl ResponseCodec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(limits: CodecLimits) -> Self {
        Self {
            primitives: PrimitiveCodec::with_limits(limits),
        }
    }

    /// Append the envelope for `response` to `buf`; on error `buf` is restored
    pub fn encode_into(&self, response: &MapResponse, buf: &mut BytesMut) -> ProtocolResult<()> {
        let start = buf.len();
        let ty = response.response_type();
        trace!(response = %ty, "encoding response");

        buf.put_u8(ty.as_u8());
        let p = &self.primitives;
        let result = match response {
            MapResponse::Value(v) => p.encode_into(v, buf).map_err(ProtocolError::from),
            MapResponse::Boolean(b) => {
                buf.put_u8(u8::from(*b));
                Ok(())
            }
            MapResponse::Size(n) => {
                buf.put_u64(*n);
                Ok(())
            }
            MapResponse::KeySet(items) | MapResponse::ValueCollection(items) => {
                write_list(p, items, buf)
            }
            MapResponse::EntrySet(entries) => write_entries(p, entries, buf),
        };
        if let Err(e) = result {
            buf.truncate(start);
            debug!(response = %ty, error = %e, "failed to encode response");
            return Err(e);
        }
        Ok(())
    }

    pub fn encode(&self, response: &MapResponse) -> ProtocolResult<Bytes> {
        let mut buf = BytesMut::new();
        self.encode_into(response, &mut buf)?;
        Ok(buf.freeze())
    }

    pub fn write_to<W: Write>(&self, response: &MapResponse, writer: &mut W) -> ProtocolResult<()> {
        let bytes = self.encode(response)?;
        writer.write_all(&bytes)?;
        Ok(())
    }

    /// Decode one response; an unknown tag consumes only the tag byte
    pub fn decode<R: Read>(&self, reader: &mut R) -> ProtocolResult<MapResponse> {
        let tag = read_u8(reader)?;
        let ty = ResponseType::try_from(tag).map_err(|e| {
            debug!(tag, "unknown response tag");
            e
        })?;
        trace!(response = %ty, "decoding response");

        let p = &self.primitives;
        let response = match ty {
            ResponseType::Value => MapResponse::Value(p.decode(reader)?),
            ResponseType::Boolean => match read_u8(reader)? {
                0 => MapResponse::Boolean(false),
                1 => MapResponse::Boolean(true),
                other => {
                    return Err(cmap_core::Error::CorruptData(format!(
                        "invalid boolean byte: {}",
                        other
                    ))
                    .into())
                }
            },
            ResponseType::Size => MapResponse::Size(read_u64(reader)?),
            ResponseType::KeySet => MapResponse::KeySet(read_list(p, reader)?),
            ResponseType::ValueCollection => MapResponse::ValueCollection(read_list(p, reader)?),
            ResponseType::EntrySet => MapResponse::EntrySet(read_entries(p, reader)?),
        };
        Ok(response)
    }

    pub fn decode_slice(&self, mut bytes: &[u8]) -> ProtocolResult<MapResponse> {
        let response = self.decode(&mut bytes)?;
        ensure_consumed(bytes)?;
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_round_trip() {
        let codec = ResponseCodec::new();
        let responses = vec![
            MapResponse::value("Alice"),
            MapResponse::absent(),
            MapResponse::boolean(true),
            MapResponse::size(u64::MAX),
            MapResponse::KeySet(vec![Primitive::from("a"), Primitive::Int(2)]),
            MapResponse::ValueCollection(Vec::new()),
            MapResponse::EntrySet(vec![(Primitive::from("k"), Primitive::Double(1.5))]),
        ];

        for response in responses {
            let bytes = codec.encode(&response).unwrap();
            assert_eq!(codec.decode_slice(&bytes).unwrap(), response);
        }
    }

    #[test]
    fn test_boolean_layout() {
        let codec = ResponseCodec::new();
        assert_eq!(&codec.encode(&MapResponse::boolean(true)).unwrap()[..], &[1, 1]);
        assert!(codec.decode_slice(&[1, 2]).unwrap_err().is_corrupt());
    }

    #[test]
    fn test_unknown_response_tag() {
        let codec = ResponseCodec::new();
        let bytes = [6u8, 1];
        let mut reader = &bytes[..];
        assert!(matches!(
            codec.decode(&mut reader),
            Err(ProtocolError::UnknownResponseType(6))
        ));
        assert_eq!(reader, &[1u8][..]);
    }

    #[test]
    fn test_truncated_size() {
        let codec = ResponseCodec::new();
        assert!(codec.decode_slice(&[2, 0, 0, 0]).unwrap_err().is_corrupt());
    }

    #[test]
    fn test_answers() {
        assert!(MapResponse::boolean(false).answers(&MapOperation::contains_key("k")));
        assert!(!MapResponse::size(1).answers(&MapOperation::contains_key("k")));
        assert!(MapResponse::absent().answers(&MapOperation::get("k")));
        assert!(!MapResponse::absent().answers(&MapOperation::Clear));
    }
}
