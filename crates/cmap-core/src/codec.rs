//! Primitive Codec
//!
//! Layout of an encoded primitive:
//! ```text
//! [kind: u8][payload]
//!
//! null              -> (nothing)
//! boolean           -> 0x00 | 0x01
//! byte/short/int/long, float/double, char
//!                   -> big-endian, 1/2/4/8 bytes
//! string/byte-array -> [len: u32 BE][len bytes]
//! ```

use crate::error::{Error, Result};
use crate::primitive::{Primitive, PrimitiveKind};
use bytes::{BufMut, Bytes, BytesMut};
use serde::Deserialize;
use std::any::Any;
use std::io::{Read, Write};
use tracing::{debug, trace};

/// Default cap for string and byte-array payloads (16MB)
pub const DEFAULT_MAX_PAYLOAD_LEN: usize = 16 * 1024 * 1024;

/// Size limits applied while encoding and decoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CodecLimits {
    /// Maximum length of a string or byte-array payload, and of collection counts
    pub max_payload_len: usize,
}

impl CodecLimits {
    pub fn new(max_payload_len: usize) -> Self {
        Self { max_payload_len }
    }

    /// Effective limit: never beyond what a u32 length prefix can carry
    fn max_len(&self) -> usize {
        self.max_payload_len.min(u32::MAX as usize)
    }

    /// Reject a length before anything is emitted
    pub fn check_encode(&self, size: usize) -> Result<()> {
        if size > self.max_len() {
            return Err(Error::PayloadTooLarge {
                size,
                max: self.max_len(),
            });
        }
        Ok(())
    }

    /// Reject a length read off the wire before allocating for it
    pub fn check_decode(&self, size: usize) -> Result<()> {
        if size > self.max_len() {
            debug!(size, max = self.max_len(), "length field exceeds limit");
            return Err(Error::CorruptData(format!(
                "length {} exceeds limit {}",
                size,
                self.max_len()
            )));
        }
        Ok(())
    }
}

impl Default for CodecLimits {
    fn default() -> Self {
        Self {
            max_payload_len: DEFAULT_MAX_PAYLOAD_LEN,
        }
    }
}

/// Stateless encoder/decoder for [`Primitive`] values
#[derive(Debug, Clone, Copy, Default)]
pub struct PrimitiveCodec {
    limits: CodecLimits,
}

impl PrimitiveCodec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(limits: CodecLimits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> &CodecLimits {
        &self.limits
    }

    /// Append the encoding of `value` to `buf`.
    ///
    /// Validation happens first; on error `buf` is left untouched.
    pub fn encode_into(&self, value: &Primitive, buf: &mut BytesMut) -> Result<()> {
        match value {
            Primitive::String(s) => self.limits.check_encode(s.len())?,
            Primitive::ByteArray(b) => self.limits.check_encode(b.len())?,
            _ => {}
        }

        trace!(kind = %value.kind(), "encoding primitive");
        buf.put_u8(value.kind().as_u8());
        match value {
            Primitive::Null => {}
            Primitive::Boolean(b) => buf.put_u8(u8::from(*b)),
            Primitive::Byte(n) => buf.put_i8(*n),
            Primitive::Short(n) => buf.put_i16(*n),
            Primitive::Char(c) => buf.put_u32(u32::from(*c)),
            Primitive::Int(n) => buf.put_i32(*n),
            Primitive::Long(n) => buf.put_i64(*n),
            Primitive::Float(n) => buf.put_u32(n.to_bits()),
            Primitive::Double(n) => buf.put_u64(n.to_bits()),
            Primitive::String(s) => {
                buf.put_u32(s.len() as u32);
                buf.put_slice(s.as_bytes());
            }
            Primitive::ByteArray(b) => {
                buf.put_u32(b.len() as u32);
                buf.put_slice(b);
            }
        }
        Ok(())
    }

    /// Encode `value` into a standalone buffer
    pub fn encode(&self, value: &Primitive) -> Result<Bytes> {
        let mut buf = BytesMut::new();
        self.encode_into(value, &mut buf)?;
        Ok(buf.freeze())
    }

    /// Encode `value` and write it to `writer` in one `write_all`
    pub fn write_to<W: Write>(&self, value: &Primitive, writer: &mut W) -> Result<()> {
        let bytes = self.encode(value)?;
        writer.write_all(&bytes)?;
        Ok(())
    }

    /// Encode an opaque runtime value.
    ///
    /// Fails with [`Error::UnsupportedType`] without writing anything when
    /// the value is not a representable kind.
    pub fn encode_any<W: Write>(&self, value: &dyn Any, writer: &mut W) -> Result<()> {
        let primitive = Primitive::from_any(value)?;
        self.write_to(&primitive, writer)
    }

    /// Decode one primitive from `reader`
    pub fn decode<R: Read>(&self, reader: &mut R) -> Result<Primitive> {
        let kind = PrimitiveKind::try_from(read_u8(reader)?).map_err(|e| {
            debug!(error = %e, "rejecting primitive");
            e
        })?;
        trace!(%kind, "decoding primitive");

        let value = match kind {
            PrimitiveKind::Null => Primitive::Null,
            PrimitiveKind::Boolean => match read_u8(reader)? {
                0 => Primitive::Boolean(false),
                1 => Primitive::Boolean(true),
                other => {
                    return Err(Error::CorruptData(format!("invalid boolean byte: {}", other)))
                }
            },
            PrimitiveKind::Byte => Primitive::Byte(i8::from_be_bytes(read_array(reader)?)),
            PrimitiveKind::Short => Primitive::Short(i16::from_be_bytes(read_array(reader)?)),
            PrimitiveKind::Char => {
                let scalar = u32::from_be_bytes(read_array(reader)?);
                let c = char::from_u32(scalar).ok_or_else(|| {
                    Error::CorruptData(format!("invalid unicode scalar: {:#x}", scalar))
                })?;
                Primitive::Char(c)
            }
            PrimitiveKind::Int => Primitive::Int(i32::from_be_bytes(read_array(reader)?)),
            PrimitiveKind::Long => Primitive::Long(i64::from_be_bytes(read_array(reader)?)),
            PrimitiveKind::Float => {
                Primitive::Float(f32::from_bits(u32::from_be_bytes(read_array(reader)?)))
            }
            PrimitiveKind::Double => {
                Primitive::Double(f64::from_bits(u64::from_be_bytes(read_array(reader)?)))
            }
            PrimitiveKind::String => {
                let raw = self.read_sized(reader)?;
                let s = String::from_utf8(raw)
                    .map_err(|e| Error::CorruptData(format!("invalid UTF-8: {}", e)))?;
                Primitive::String(s)
            }
            PrimitiveKind::ByteArray => Primitive::ByteArray(self.read_sized(reader)?),
        };
        Ok(value)
    }

    /// Decode a primitive that must occupy all of `bytes`
    pub fn decode_slice(&self, mut bytes: &[u8]) -> Result<Primitive> {
        let value = self.decode(&mut bytes)?;
        if !bytes.is_empty() {
            return Err(Error::CorruptData(format!(
                "{} trailing bytes after primitive",
                bytes.len()
            )));
        }
        Ok(value)
    }

    /// Read a `[len: u32][len bytes]` payload, never past `len`
    fn read_sized<R: Read>(&self, reader: &mut R) -> Result<Vec<u8>> {
        let len = read_u32(reader)? as usize;
        self.limits.check_decode(len)?;

        let mut buf = Vec::with_capacity(len.min(8 * 1024));
        reader
            .by_ref()
            .take(len as u64)
            .read_to_end(&mut buf)
            .map_err(|e| Error::from_read(e, "payload"))?;
        if buf.len() != len {
            return Err(Error::CorruptData(format!(
                "truncated payload: expected {} bytes, got {}",
                len,
                buf.len()
            )));
        }
        Ok(buf)
    }
}

fn read_array<R: Read, const N: usize>(reader: &mut R) -> Result<[u8; N]> {
    let mut buf = [0u8; N];
    reader
        .read_exact(&mut buf)
        .map_err(|e| Error::from_read(e, "fixed-width value"))?;
    Ok(buf)
}

/// Read a single byte, mapping a short read to [`Error::CorruptData`]
pub fn read_u8<R: Read>(reader: &mut R) -> Result<u8> {
    let [b] = read_array::<R, 1>(reader)?;
    Ok(b)
}

/// Read a big-endian u32, mapping a short read to [`Error::CorruptData`]
pub fn read_u32<R: Read>(reader: &mut R) -> Result<u32> {
    Ok(u32::from_be_bytes(read_array(reader)?))
}

/// Read a big-endian u64, mapping a short read to [`Error::CorruptData`]
pub fn read_u64<R: Read>(reader: &mut R) -> Result<u64> {
    Ok(u64::from_be_bytes(read_array(reader)?))
}
