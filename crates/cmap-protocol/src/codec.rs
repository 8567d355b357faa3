//! Operation Codec
//!
//! Envelope: `[tag: u8][payload]`. The codec writes the tag; each variant's
//! payload is a fixed sequence of primitives (or a counted list of them).

use crate::error::{ProtocolError, ProtocolResult};
use crate::operation::{MapOperation, OperationType};
use bytes::{BufMut, Bytes, BytesMut};
use cmap_core::codec::{read_u32, read_u8};
use cmap_core::{CodecLimits, Primitive, PrimitiveCodec};
use std::io::{Read, Write};
use tracing::{debug, trace};

/// Stateless encoder/decoder for [`MapOperation`]s
#[derive(Debug, Clone, Copy, Default)]
pub struct OperationCodec {
    primitives: PrimitiveCodec,
}

impl OperationCodec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(limits: CodecLimits) -> Self {
        Self {
            primitives: PrimitiveCodec::with_limits(limits),
        }
    }

    /// Append the envelope for `op` to `buf`; on error `buf` is restored
    pub fn encode_into(&self, op: &MapOperation, buf: &mut BytesMut) -> ProtocolResult<()> {
        let start = buf.len();
        let ty = op.operation_type();
        trace!(op = %ty, "encoding operation");

        buf.put_u8(ty.as_u8());
        if let Err(e) = self.write_payload(op, buf) {
            buf.truncate(start);
            debug!(op = %ty, error = %e, "failed to encode operation");
            return Err(e);
        }
        Ok(())
    }

    /// Encode `op` into a standalone buffer
    pub fn encode(&self, op: &MapOperation) -> ProtocolResult<Bytes> {
        let mut buf = BytesMut::new();
        self.encode_into(op, &mut buf)?;
        Ok(buf.freeze())
    }

    /// Encode `op` and hand it to `writer` in one `write_all`
    pub fn write_to<W: Write>(&self, op: &MapOperation, writer: &mut W) -> ProtocolResult<()> {
        let bytes = self.encode(op)?;
        writer.write_all(&bytes)?;
        Ok(())
    }

    /// Decode one envelope from `reader`.
    ///
    /// An unknown tag fails with [`ProtocolError::UnknownOperationType`]
    /// and nothing past the tag byte is consumed.
    pub fn decode<R: Read>(&self, reader: &mut R) -> ProtocolResult<MapOperation> {
        let tag = read_u8(reader)?;
        let ty = OperationType::try_from(tag).map_err(|e| {
            debug!(tag, "unknown operation tag");
            e
        })?;
        trace!(op = %ty, "decoding operation");
        self.read_payload(ty, reader)
    }

    /// Decode an envelope that must occupy all of `bytes`
    pub fn decode_slice(&self, mut bytes: &[u8]) -> ProtocolResult<MapOperation> {
        let op = self.decode(&mut bytes)?;
        ensure_consumed(bytes)?;
        Ok(op)
    }

    fn write_payload(&self, op: &MapOperation, buf: &mut BytesMut) -> ProtocolResult<()> {
        let p = &self.primitives;
        match op {
            MapOperation::Get { key }
            | MapOperation::Remove { key }
            | MapOperation::ContainsKey { key } => p.encode_into(key, buf)?,
            MapOperation::ContainsValue { value } => p.encode_into(value, buf)?,
            MapOperation::Put { key, value }
            | MapOperation::PutIfAbsent { key, value }
            | MapOperation::PutIfPresent { key, value }
            | MapOperation::ConditionalRemove { key, value } => {
                p.encode_into(key, buf)?;
                p.encode_into(value, buf)?;
            }
            MapOperation::ConditionalReplace {
                key,
                old_value,
                new_value,
            } => {
                p.encode_into(key, buf)?;
                p.encode_into(old_value, buf)?;
                p.encode_into(new_value, buf)?;
            }
            MapOperation::PutAll { entries } => write_entries(p, entries, buf)?,
            MapOperation::Clear
            | MapOperation::KeySet
            | MapOperation::Values
            | MapOperation::EntrySet
            | MapOperation::Size => {}
        }
        Ok(())
    }

    fn read_payload<R: Read>(
        &self,
        ty: OperationType,
        reader: &mut R,
    ) -> ProtocolResult<MapOperation> {
        let p = &self.primitives;
        let op = match ty {
            OperationType::Put => MapOperation::Put {
                key: p.decode(reader)?,
                value: p.decode(reader)?,
            },
            OperationType::Get => MapOperation::Get {
                key: p.decode(reader)?,
            },
            OperationType::Remove => MapOperation::Remove {
                key: p.decode(reader)?,
            },
            OperationType::ContainsKey => MapOperation::ContainsKey {
                key: p.decode(reader)?,
            },
            OperationType::ContainsValue => MapOperation::ContainsValue {
                value: p.decode(reader)?,
            },
            OperationType::Clear => MapOperation::Clear,
            OperationType::PutAll => MapOperation::PutAll {
                entries: read_entries(p, reader)?,
            },
            OperationType::KeySet => MapOperation::KeySet,
            OperationType::Values => MapOperation::Values,
            OperationType::EntrySet => MapOperation::EntrySet,
            OperationType::Size => MapOperation::Size,
            OperationType::PutIfAbsent => MapOperation::PutIfAbsent {
                key: p.decode(reader)?,
                value: p.decode(reader)?,
            },
            OperationType::PutIfPresent => MapOperation::PutIfPresent {
                key: p.decode(reader)?,
                value: p.decode(reader)?,
            },
            OperationType::ConditionalRemove => MapOperation::ConditionalRemove {
                key: p.decode(reader)?,
                value: p.decode(reader)?,
            },
            OperationType::ConditionalReplace => MapOperation::ConditionalReplace {
                key: p.decode(reader)?,
                old_value: p.decode(reader)?,
                new_value: p.decode(reader)?,
            },
        };
        Ok(op)
    }
}

pub(crate) fn ensure_consumed(rest: &[u8]) -> ProtocolResult<()> {
    if !rest.is_empty() {
        return Err(ProtocolError::Core(cmap_core::Error::CorruptData(format!(
            "{} trailing bytes after envelope",
            rest.len()
        ))));
    }
    Ok(())
}

/// `[count: u32][item]...`
pub(crate) fn write_list(
    p: &PrimitiveCodec,
    items: &[Primitive],
    buf: &mut BytesMut,
) -> ProtocolResult<()> {
    p.limits().check_encode(items.len())?;
    buf.put_u32(items.len() as u32);
    for item in items {
        p.encode_into(item, buf)?;
    }
    Ok(())
}

pub(crate) fn read_list<R: Read>(p: &PrimitiveCodec, reader: &mut R) -> ProtocolResult<Vec<Primitive>> {
    let count = read_u32(reader)? as usize;
    p.limits().check_decode(count)?;

    let mut items = Vec::with_capacity(count.min(1024));
    for _ in 0..count {
        items.push(p.decode(reader)?);
    }
    Ok(items)
}

/// `[count: u32]([key][value])...`
pub(crate) fn write_entries(
    p: &PrimitiveCodec,
    entries: &[(Primitive, Primitive)],
    buf: &mut BytesMut,
) -> ProtocolResult<()> {
    p.limits().check_encode(entries.len())?;
    buf.put_u32(entries.len() as u32);
    for (key, value) in entries {
        p.encode_into(key, buf)?;
        p.encode_into(value, buf)?;
    }
    Ok(())
}

pub(crate) fn read_entries<R: Read>(
    p: &PrimitiveCodec,
    reader: &mut R,
) -> ProtocolResult<Vec<(Primitive, Primitive)>> {
    let count = read_u32(reader)? as usize;
    p.limits().check_decode(count)?;

    let mut entries = Vec::with_capacity(count.min(1024));
    for _ in 0..count {
        let key = p.decode(reader)?;
        let value = p.decode(reader)?;
        entries.push((key, value));
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_operations() -> Vec<MapOperation> {
        vec![
            MapOperation::put("k", 1i64),
            MapOperation::get(7i32),
            MapOperation::remove('x'),
            MapOperation::contains_key("user:123"),
            MapOperation::contains_value(vec![1u8, 2, 3]),
            MapOperation::Clear,
            MapOperation::put_all(vec![("a", 1i32), ("b", 2i32)]),
            MapOperation::KeySet,
            MapOperation::Values,
            MapOperation::EntrySet,
            MapOperation::Size,
            MapOperation::put_if_absent("k", true),
            MapOperation::put_if_present("k", 2.5f64),
            MapOperation::conditional_remove("k", Primitive::Null),
            MapOperation::conditional_replace("k", "old", "new"),
        ]
    }

    #[test]
    fn test_every_variant_round_trips() {
        let codec = OperationCodec::new();
        let ops = all_operations();
        assert_eq!(ops.len(), OperationType::ALL.len());

        for op in ops {
            let bytes = codec.encode(&op).unwrap();
            assert_eq!(bytes[0], op.operation_type().as_u8());
            assert_eq!(codec.decode_slice(&bytes).unwrap(), op);
        }
    }

    #[test]
    fn test_contains_key_round_trip() {
        let codec = OperationCodec::new();
        let op = MapOperation::contains_key(42i64);

        let decoded = codec.decode_slice(&codec.encode(&op).unwrap()).unwrap();
        assert_eq!(decoded.operation_type(), OperationType::ContainsKey);
        assert!(matches!(decoded, MapOperation::ContainsKey { key: Primitive::Long(42) }));
    }

    #[test]
    fn test_unknown_tag_consumes_only_tag() {
        let codec = OperationCodec::new();
        let bytes = [0xEEu8, 9, 0, 0, 0, 1, b'x'];
        let mut reader = &bytes[..];

        let err = codec.decode(&mut reader).unwrap_err();
        assert!(matches!(err, ProtocolError::UnknownOperationType(0xEE)));
        assert_eq!(reader.len(), bytes.len() - 1);
    }

    #[test]
    fn test_truncated_payload() {
        let codec = OperationCodec::new();
        let bytes = codec.encode(&MapOperation::put("key", "value")).unwrap();

        let err = codec.decode_slice(&bytes[..bytes.len() - 2]).unwrap_err();
        assert!(err.is_corrupt());

        let err = codec.decode_slice(&[]).unwrap_err();
        assert!(err.is_corrupt());
    }

    #[test]
    fn test_trailing_bytes_rejected() {
        let codec = OperationCodec::new();
        let mut bytes = codec.encode(&MapOperation::Size).unwrap().to_vec();
        bytes.push(0);
        assert!(codec.decode_slice(&bytes).unwrap_err().is_corrupt());
    }

    #[test]
    fn test_failed_encode_restores_buffer() {
        let codec = OperationCodec::with_limits(CodecLimits::new(3));
        let mut buf = BytesMut::new();
        codec.encode_into(&MapOperation::Size, &mut buf).unwrap();
        let before = buf.clone();

        // key fits, value does not
        let err = codec
            .encode_into(&MapOperation::put("abc", "abcdef"), &mut buf)
            .unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::Core(cmap_core::Error::PayloadTooLarge { size: 6, max: 3 })
        ));
        assert_eq!(buf, before);
    }

    #[test]
    fn test_failed_write_to_writes_nothing() {
        let codec = OperationCodec::with_limits(CodecLimits::new(1));
        let mut out = Vec::new();
        assert!(codec
            .write_to(&MapOperation::contains_key("too long"), &mut out)
            .is_err());
        assert!(out.is_empty());
    }

    #[test]
    fn test_stream_of_envelopes() {
        let codec = OperationCodec::new();
        let mut out = Vec::new();
        codec.write_to(&MapOperation::put("a", 1i32), &mut out).unwrap();
        codec.write_to(&MapOperation::contains_key("a"), &mut out).unwrap();

        let mut reader = &out[..];
        assert_eq!(codec.decode(&mut reader).unwrap(), MapOperation::put("a", 1i32));
        assert_eq!(codec.decode(&mut reader).unwrap(), MapOperation::contains_key("a"));
        assert!(reader.is_empty());
    }

    #[test]
    fn test_put_all_count_over_limit() {
        let codec = OperationCodec::with_limits(CodecLimits::new(2));
        let bytes = [OperationType::PutAll.as_u8(), 0, 0, 0, 3];
        assert!(codec.decode_slice(&bytes).unwrap_err().is_corrupt());
    }
}
