//! Primitive key/value types carried by map operations

use crate::error::{Error, Result};
use std::any::Any;
use std::hash::{Hash, Hasher};

/// Wire discriminator for each representable primitive kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PrimitiveKind {
    Null = 0,
    Boolean = 1,
    Byte = 2,
    Short = 3,
    Char = 4,
    Int = 5,
    Long = 6,
    Float = 7,
    Double = 8,
    String = 9,
    ByteArray = 10,
}

impl PrimitiveKind {
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Width of the payload for fixed-size kinds, `None` for length-prefixed ones
    pub fn fixed_width(self) -> Option<usize> {
        match self {
            PrimitiveKind::Null => Some(0),
            PrimitiveKind::Boolean | PrimitiveKind::Byte => Some(1),
            PrimitiveKind::Short => Some(2),
            PrimitiveKind::Char | PrimitiveKind::Int | PrimitiveKind::Float => Some(4),
            PrimitiveKind::Long | PrimitiveKind::Double => Some(8),
            PrimitiveKind::String | PrimitiveKind::ByteArray => None,
        }
    }
}

impl TryFrom<u8> for PrimitiveKind {
    type Error = Error;

    fn try_from(b: u8) -> Result<Self> {
        match b {
            0 => Ok(PrimitiveKind::Null),
            1 => Ok(PrimitiveKind::Boolean),
            2 => Ok(PrimitiveKind::Byte),
            3 => Ok(PrimitiveKind::Short),
            4 => Ok(PrimitiveKind::Char),
            5 => Ok(PrimitiveKind::Int),
            6 => Ok(PrimitiveKind::Long),
            7 => Ok(PrimitiveKind::Float),
            8 => Ok(PrimitiveKind::Double),
            9 => Ok(PrimitiveKind::String),
            10 => Ok(PrimitiveKind::ByteArray),
            other => Err(Error::CorruptData(format!("unknown primitive kind: {}", other))),
        }
    }
}

impl std::fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PrimitiveKind::Null => write!(f, "null"),
            PrimitiveKind::Boolean => write!(f, "boolean"),
            PrimitiveKind::Byte => write!(f, "byte"),
            PrimitiveKind::Short => write!(f, "short"),
            PrimitiveKind::Char => write!(f, "char"),
            PrimitiveKind::Int => write!(f, "int"),
            PrimitiveKind::Long => write!(f, "long"),
            PrimitiveKind::Float => write!(f, "float"),
            PrimitiveKind::Double => write!(f, "double"),
            PrimitiveKind::String => write!(f, "string"),
            PrimitiveKind::ByteArray => write!(f, "byte-array"),
        }
    }
}

/// A key or value that can travel inside a map operation
///
/// Equality is domain equality: floating point kinds compare by bit
/// pattern, so `NaN == NaN` and `0.0 != -0.0`.
#[derive(Debug, Clone)]
pub enum Primitive {
    Null,
    Boolean(bool),
    Byte(i8),
    Short(i16),
    Char(char),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
    ByteArray(Vec<u8>),
}

impl Primitive {
    pub fn kind(&self) -> PrimitiveKind {
        match self {
            Primitive::Null => PrimitiveKind::Null,
            Primitive::Boolean(_) => PrimitiveKind::Boolean,
            Primitive::Byte(_) => PrimitiveKind::Byte,
            Primitive::Short(_) => PrimitiveKind::Short,
            Primitive::Char(_) => PrimitiveKind::Char,
            Primitive::Int(_) => PrimitiveKind::Int,
            Primitive::Long(_) => PrimitiveKind::Long,
            Primitive::Float(_) => PrimitiveKind::Float,
            Primitive::Double(_) => PrimitiveKind::Double,
            Primitive::String(_) => PrimitiveKind::String,
            Primitive::ByteArray(_) => PrimitiveKind::ByteArray,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Primitive::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Primitive::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Widen any integral kind to `i64`
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Primitive::Byte(n) => Some(i64::from(*n)),
            Primitive::Short(n) => Some(i64::from(*n)),
            Primitive::Int(n) => Some(i64::from(*n)),
            Primitive::Long(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Primitive::Float(n) => Some(f64::from(*n)),
            Primitive::Double(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Primitive::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Primitive::ByteArray(b) => Some(b),
            _ => None,
        }
    }

    /// Convert an opaque runtime value into a primitive.
    ///
    /// Fails with [`Error::UnsupportedType`] when the concrete type behind
    /// `value` is not one of the representable kinds.
    pub fn from_any(value: &dyn Any) -> Result<Self> {
        if let Some(p) = value.downcast_ref::<Primitive>() {
            return Ok(p.clone());
        }
        if value.is::<()>() {
            return Ok(Primitive::Null);
        }
        if let Some(v) = value.downcast_ref::<bool>() {
            return Ok(Primitive::Boolean(*v));
        }
        if let Some(v) = value.downcast_ref::<i8>() {
            return Ok(Primitive::Byte(*v));
        }
        if let Some(v) = value.downcast_ref::<i16>() {
            return Ok(Primitive::Short(*v));
        }
        if let Some(v) = value.downcast_ref::<char>() {
            return Ok(Primitive::Char(*v));
        }
        if let Some(v) = value.downcast_ref::<i32>() {
            return Ok(Primitive::Int(*v));
        }
        if let Some(v) = value.downcast_ref::<i64>() {
            return Ok(Primitive::Long(*v));
        }
        if let Some(v) = value.downcast_ref::<f32>() {
            return Ok(Primitive::Float(*v));
        }
        if let Some(v) = value.downcast_ref::<f64>() {
            return Ok(Primitive::Double(*v));
        }
        if let Some(v) = value.downcast_ref::<String>() {
            return Ok(Primitive::String(v.clone()));
        }
        if let Some(v) = value.downcast_ref::<&'static str>() {
            return Ok(Primitive::String((*v).to_string()));
        }
        if let Some(v) = value.downcast_ref::<Vec<u8>>() {
            return Ok(Primitive::ByteArray(v.clone()));
        }
        if let Some(v) = value.downcast_ref::<bytes::Bytes>() {
            return Ok(Primitive::ByteArray(v.to_vec()));
        }

        tracing::debug!("rejecting value of unsupported runtime type");
        Err(Error::UnsupportedType(
            "value is not a representable primitive kind".into(),
        ))
    }
}

impl PartialEq for Primitive {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Primitive::Null, Primitive::Null) => true,
            (Primitive::Boolean(a), Primitive::Boolean(b)) => a == b,
            (Primitive::Byte(a), Primitive::Byte(b)) => a == b,
            (Primitive::Short(a), Primitive::Short(b)) => a == b,
            (Primitive::Char(a), Primitive::Char(b)) => a == b,
            (Primitive::Int(a), Primitive::Int(b)) => a == b,
            (Primitive::Long(a), Primitive::Long(b)) => a == b,
            (Primitive::Float(a), Primitive::Float(b)) => a.to_bits() == b.to_bits(),
            (Primitive::Double(a), Primitive::Double(b)) => a.to_bits() == b.to_bits(),
            (Primitive::String(a), Primitive::String(b)) => a == b,
            (Primitive::ByteArray(a), Primitive::ByteArray(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Primitive {}

impl Hash for Primitive {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind().hash(state);
        match self {
            Primitive::Null => {}
            Primitive::Boolean(v) => v.hash(state),
            Primitive::Byte(v) => v.hash(state),
            Primitive::Short(v) => v.hash(state),
            Primitive::Char(v) => v.hash(state),
            Primitive::Int(v) => v.hash(state),
            Primitive::Long(v) => v.hash(state),
            Primitive::Float(v) => v.to_bits().hash(state),
            Primitive::Double(v) => v.to_bits().hash(state),
            Primitive::String(v) => v.hash(state),
            Primitive::ByteArray(v) => v.hash(state),
        }
    }
}

impl Default for Primitive {
    fn default() -> Self {
        Primitive::Null
    }
}

impl From<bool> for Primitive {
    fn from(v: bool) -> Self {
        Primitive::Boolean(v)
    }
}

impl From<i8> for Primitive {
    fn from(v: i8) -> Self {
        Primitive::Byte(v)
    }
}

impl From<i16> for Primitive {
    fn from(v: i16) -> Self {
        Primitive::Short(v)
    }
}

impl From<char> for Primitive {
    fn from(v: char) -> Self {
        Primitive::Char(v)
    }
}

impl From<i32> for Primitive {
    fn from(v: i32) -> Self {
        Primitive::Int(v)
    }
}

impl From<i64> for Primitive {
    fn from(v: i64) -> Self {
        Primitive::Long(v)
    }
}

impl From<f32> for Primitive {
    fn from(v: f32) -> Self {
        Primitive::Float(v)
    }
}

impl From<f64> for Primitive {
    fn from(v: f64) -> Self {
        Primitive::Double(v)
    }
}

impl From<String> for Primitive {
    fn from(v: String) -> Self {
        Primitive::String(v)
    }
}

impl From<&str> for Primitive {
    fn from(v: &str) -> Self {
        Primitive::String(v.to_string())
    }
}

impl From<Vec<u8>> for Primitive {
    fn from(v: Vec<u8>) -> Self {
        Primitive::ByteArray(v)
    }
}

impl From<&[u8]> for Primitive {
    fn from(v: &[u8]) -> Self {
        Primitive::ByteArray(v.to_vec())
    }
}

impl<T: Into<Primitive>> From<Option<T>> for Primitive {
    fn from(v: Option<T>) -> Self {
        v.map_or(Primitive::Null, Into::into)
    }
}

impl TryFrom<serde_json::Value> for Primitive {
    type Error = Error;

    /// Integers map to `Long`, other numbers to `Double`, and arrays of
    /// integers in `0..=255` to `ByteArray`. Objects are never representable.
    fn try_from(json: serde_json::Value) -> Result<Self> {
        match json {
            serde_json::Value::Null => Ok(Primitive::Null),
            serde_json::Value::Bool(b) => Ok(Primitive::Boolean(b)),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(Primitive::Long(i))
                } else if n.is_u64() {
                    Err(Error::UnsupportedType(format!("integer out of range: {}", n)))
                } else if let Some(f) = n.as_f64() {
                    Ok(Primitive::Double(f))
                } else {
                    Err(Error::UnsupportedType(format!("invalid number: {}", n)))
                }
            }
            serde_json::Value::String(s) => Ok(Primitive::String(s)),
            serde_json::Value::Array(arr) => arr
                .iter()
                .map(|v| {
                    v.as_u64()
                        .and_then(|n| u8::try_from(n).ok())
                        .ok_or_else(|| {
                            Error::UnsupportedType("array element is not a byte".into())
                        })
                })
                .collect::<Result<Vec<u8>>>()
                .map(Primitive::ByteArray),
            serde_json::Value::Object(_) => {
                Err(Error::UnsupportedType("object".into()))
            }
        }
    }
}
