//! cmap Protocol - binary envelope for replicated map commands
//!
//! Every message is a one-byte tag followed by a tag-specific payload of
//! primitives (see `cmap_core::codec` for the primitive layout).
//!
//! ## Operation Envelope
//! ```text
//! [tag: u8][payload]
//!
//! CONTAINS_KEY (3)   [key]
//! PUT (0)            [key][value]
//! PUT_ALL (6)        [count: u32]([key][value])...
//! SIZE (10)          (empty)
//! ```
//!
//! ## Response Envelope
//! ```text
//! [tag: u8][payload]
//!
//! VALUE (0)          [value]
//! BOOLEAN (1)        [0x00 | 0x01]
//! SIZE (2)           [u64]
//! ```

pub mod codec;
pub mod error;
pub mod operation;
pub mod response;

pub use codec::OperationCodec;
pub use error::{ProtocolError, ProtocolResult};
pub use operation::{MapOperation, OperationType};
pub use response::{MapResponse, ResponseCodec, ResponseType};
