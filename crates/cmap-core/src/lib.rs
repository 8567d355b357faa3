//! cmap Core - Primitive values and their binary codec
//!
//! This crate provides the building blocks shared by every map operation:
//! - A closed set of primitive key/value kinds
//! - A byte-exact, big-endian codec for those kinds
//! - Size limits applied on both sides of the wire

pub mod codec;
pub mod error;
pub mod primitive;

pub use codec::{CodecLimits, PrimitiveCodec, DEFAULT_MAX_PAYLOAD_LEN};
pub use error::{Error, Result};
pub use primitive::{Primitive, PrimitiveKind};
