//! Map operation types

use crate::error::ProtocolError;
use crate::response::ResponseType;
use cmap_core::Primitive;

/// One-byte wire tag for every operation variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum OperationType {
    Put = 0,
    Get = 1,
    Remove = 2,
    ContainsKey = 3,
    ContainsValue = 4,
    Clear = 5,
    PutAll = 6,
    KeySet = 7,
    Values = 8,
    EntrySet = 9,
    Size = 10,
    PutIfAbsent = 11,
    PutIfPresent = 12,
    ConditionalRemove = 13,
    ConditionalReplace = 14,
}

impl OperationType {
    pub const ALL: [OperationType; 15] = [
        OperationType::Put,
        OperationType::Get,
        OperationType::Remove,
        OperationType::ContainsKey,
        OperationType::ContainsValue,
        OperationType::Clear,
        OperationType::PutAll,
        OperationType::KeySet,
        OperationType::Values,
        OperationType::EntrySet,
        OperationType::Size,
        OperationType::PutIfAbsent,
        OperationType::PutIfPresent,
        OperationType::ConditionalRemove,
        OperationType::ConditionalReplace,
    ];

    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// The reply a replica sends after applying an operation of this type,
    /// `None` for operations acknowledged without a payload
    pub fn response_type(self) -> Option<ResponseType> {
        match self {
            OperationType::Put
            | OperationType::Get
            | OperationType::Remove
            | OperationType::PutIfAbsent
            | OperationType::PutIfPresent => Some(ResponseType::Value),
            OperationType::ContainsKey
            | OperationType::ContainsValue
            | OperationType::ConditionalRemove
            | OperationType::ConditionalReplace => Some(ResponseType::Boolean),
            OperationType::Size => Some(ResponseType::Size),
            OperationType::KeySet => Some(ResponseType::KeySet),
            OperationType::Values => Some(ResponseType::ValueCollection),
            OperationType::EntrySet => Some(ResponseType::EntrySet),
            OperationType::Clear | OperationType::PutAll => None,
        }
    }

    /// Whether applying the operation can change map state
    pub fn is_mutation(self) -> bool {
        matches!(
            self,
            OperationType::Put
                | OperationType::Remove
                | OperationType::Clear
                | OperationType::PutAll
                | OperationType::PutIfAbsent
                | OperationType::PutIfPresent
                | OperationType::ConditionalRemove
                | OperationType::ConditionalReplace
        )
    }
}

impl TryFrom<u8> for OperationType {
    type Error = ProtocolError;

    fn try_from(tag: u8) -> Result<Self, Self::Error> {
        match tag {
            0 => Ok(OperationType::Put),
            1 => Ok(OperationType::Get),
            2 => Ok(OperationType::Remove),
            3 => Ok(OperationType::ContainsKey),
            4 => Ok(OperationType::ContainsValue),
            5 => Ok(OperationType::Clear),
            6 => Ok(OperationType::PutAll),
            7 => Ok(OperationType::KeySet),
            8 => Ok(OperationType::Values),
            9 => Ok(OperationType::EntrySet),
            10 => Ok(OperationType::Size),
            11 => Ok(OperationType::PutIfAbsent),
            12 => Ok(OperationType::PutIfPresent),
            13 => Ok(OperationType::ConditionalRemove),
            14 => Ok(OperationType::ConditionalReplace),
            other => Err(ProtocolError::UnknownOperationType(other)),
        }
    }
}

impl std::fmt::Display for OperationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OperationType::Put => write!(f, "PUT"),
            OperationType::Get => write!(f, "GET"),
            OperationType::Remove => write!(f, "REMOVE"),
            OperationType::ContainsKey => write!(f, "CONTAINS_KEY"),
            OperationType::ContainsValue => write!(f, "CONTAINS_VALUE"),
            OperationType::Clear => write!(f, "CLEAR"),
            OperationType::PutAll => write!(f, "PUT_ALL"),
            OperationType::KeySet => write!(f, "KEY_SET"),
            OperationType::Values => write!(f, "VALUES"),
            OperationType::EntrySet => write!(f, "ENTRY_SET"),
            OperationType::Size => write!(f, "SIZE"),
            OperationType::PutIfAbsent => write!(f, "PUT_IF_ABSENT"),
            OperationType::PutIfPresent => write!(f, "PUT_IF_PRESENT"),
            OperationType::ConditionalRemove => write!(f, "CONDITIONAL_REMOVE"),
            OperationType::ConditionalReplace => write!(f, "CONDITIONAL_REPLACE"),
        }
    }
}

/// A command against the replicated map, as it travels between replicas
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapOperation {
    /// PUT [key][value]
    Put { key: Primitive, value: Primitive },

    /// GET [key]
    Get { key: Primitive },

    /// REMOVE [key]
    Remove { key: Primitive },

    /// CONTAINS_KEY [key]
    ContainsKey { key: Primitive },

    /// CONTAINS_VALUE [value]
    ContainsValue { value: Primitive },

    /// CLEAR
    Clear,

    /// PUT_ALL [count]([key][value])..., applied in order
    PutAll { entries: Vec<(Primitive, Primitive)> },

    /// KEY_SET
    KeySet,

    /// VALUES
    Values,

    /// ENTRY_SET
    EntrySet,

    /// SIZE
    Size,

    /// PUT_IF_ABSENT [key][value]
    PutIfAbsent { key: Primitive, value: Primitive },

    /// PUT_IF_PRESENT [key][value], only when a mapping exists
    PutIfPresent { key: Primitive, value: Primitive },

    /// CONDITIONAL_REMOVE [key][value], only when mapped to `value`
    ConditionalRemove { key: Primitive, value: Primitive },

    /// CONDITIONAL_REPLACE [key][old][new], only when mapped to `old_value`
    ConditionalReplace {
        key: Primitive,
        old_value: Primitive,
        new_value: Primitive,
    },
}

impl MapOperation {
    pub fn operation_type(&self) -> OperationType {
        match self {
            MapOperation::Put { .. } => OperationType::Put,
            MapOperation::Get { .. } => OperationType::Get,
            MapOperation::Remove { .. } => OperationType::Remove,
            MapOperation::ContainsKey { .. } => OperationType::ContainsKey,
            MapOperation::ContainsValue { .. } => OperationType::ContainsValue,
            MapOperation::Clear => OperationType::Clear,
            MapOperation::PutAll { .. } => OperationType::PutAll,
            MapOperation::KeySet => OperationType::KeySet,
            MapOperation::Values => OperationType::Values,
            MapOperation::EntrySet => OperationType::EntrySet,
            MapOperation::Size => OperationType::Size,
            MapOperation::PutIfAbsent { .. } => OperationType::PutIfAbsent,
            MapOperation::PutIfPresent { .. } => OperationType::PutIfPresent,
            MapOperation::ConditionalRemove { .. } => OperationType::ConditionalRemove,
            MapOperation::ConditionalReplace { .. } => OperationType::ConditionalReplace,
        }
    }

    /// The key this operation targets, if it targets a single key
    pub fn key(&self) -> Option<&Primitive> {
        match self {
            MapOperation::Put { key, .. }
            | MapOperation::Get { key }
            | MapOperation::Remove { key }
            | MapOperation::ContainsKey { key }
            | MapOperation::PutIfAbsent { key, .. }
            | MapOperation::PutIfPresent { key, .. }
            | MapOperation::ConditionalRemove { key, .. }
            | MapOperation::ConditionalReplace { key, .. } => Some(key),
            MapOperation::ContainsValue { .. }
            | MapOperation::Clear
            | MapOperation::PutAll { .. }
            | MapOperation::KeySet
            | MapOperation::Values
            | MapOperation::EntrySet
            | MapOperation::Size => None,
        }
    }

    pub fn put(key: impl Into<Primitive>, value: impl Into<Primitive>) -> Self {
        MapOperation::Put {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn get(key: impl Into<Primitive>) -> Self {
        MapOperation::Get { key: key.into() }
    }

    pub fn remove(key: impl Into<Primitive>) -> Self {
        MapOperation::Remove { key: key.into() }
    }

    pub fn contains_key(key: impl Into<Primitive>) -> Self {
        MapOperation::ContainsKey { key: key.into() }
    }

    pub fn contains_value(value: impl Into<Primitive>) -> Self {
        MapOperation::ContainsValue {
            value: value.into(),
        }
    }

    pub fn put_all<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<Primitive>,
        V: Into<Primitive>,
    {
        MapOperation::PutAll {
            entries: entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn put_if_absent(key: impl Into<Primitive>, value: impl Into<Primitive>) -> Self {
        MapOperation::PutIfAbsent {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn put_if_present(key: impl Into<Primitive>, value: impl Into<Primitive>) -> Self {
        MapOperation::PutIfPresent {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn conditional_remove(key: impl Into<Primitive>, value: impl Into<Primitive>) -> Self {
        MapOperation::ConditionalRemove {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn conditional_replace(
        key: impl Into<Primitive>,
        old_value: impl Into<Primitive>,
        new_value: impl Into<Primitive>,
    ) -> Self {
        MapOperation::ConditionalReplace {
            key: key.into(),
            old_value: old_value.into(),
            new_value: new_value.into(),
        }
    }
}
