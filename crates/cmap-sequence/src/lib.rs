//! cmap Sequence - ordering numbers for distributed events
//!
//! - [`CyclicRangeCounter`]: lock-free counter wrapping within `[min, max]`
//! - [`FlakeSequenceGenerator`]: per-node event stamps built on the counter

pub mod counter;
pub mod error;
pub mod flake;

pub use counter::{CyclicRangeCounter, RangeConfig};
pub use error::{SequenceError, SequenceResult};
pub use flake::{FlakeSequenceGenerator, Sequence, SystemTimeSource, TimeSource};
