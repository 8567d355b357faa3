//! Event stamps built from a clock, a node id, and a cyclic counter

use crate::counter::{CyclicRangeCounter, RangeConfig};
use crate::error::{SequenceError, SequenceResult};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Length of [`Sequence::to_bytes`]
pub const SEQUENCE_BYTES: usize = 24;

/// Millisecond clock used to stamp sequences
pub trait TimeSource: Send + Sync {
    fn now_millis(&self) -> u64;
}

/// Wall clock, milliseconds since the Unix epoch
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now_millis(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }
}

/// An ordering stamp for one emitted event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Sequence {
    pub timestamp: u64,
    pub node_id: u64,
    pub counter: u64,
}

impl Sequence {
    /// `[timestamp][node_id][counter]`, each u64 big-endian
    pub fn to_bytes(&self) -> [u8; SEQUENCE_BYTES] {
        let mut out = [0u8; SEQUENCE_BYTES];
        out[..8].copy_from_slice(&self.timestamp.to_be_bytes());
        out[8..16].copy_from_slice(&self.node_id.to_be_bytes());
        out[16..].copy_from_slice(&self.counter.to_be_bytes());
        out
    }

    pub fn from_bytes(bytes: &[u8]) -> SequenceResult<Self> {
        if bytes.len() != SEQUENCE_BYTES {
            return Err(SequenceError::InvalidEncoding(format!(
                "expected {} bytes, got {}",
                SEQUENCE_BYTES,
                bytes.len()
            )));
        }
        let word = |i: usize| {
            let mut raw = [0u8; 8];
            raw.copy_from_slice(&bytes[i * 8..(i + 1) * 8]);
            u64::from_be_bytes(raw)
        };
        Ok(Self {
            timestamp: word(0),
            node_id: word(1),
            counter: word(2),
        })
    }

    /// 48 lowercase hex digits, same field order as [`Sequence::to_bytes`]
    pub fn to_hex(&self) -> String {
        format!(
            "{:016x}{:016x}{:016x}",
            self.timestamp, self.node_id, self.counter
        )
    }

    pub fn from_hex(hex: &str) -> SequenceResult<Self> {
        if hex.len() != SEQUENCE_BYTES * 2 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(SequenceError::InvalidEncoding(format!(
                "not a {}-digit hex sequence: {:?}",
                SEQUENCE_BYTES * 2,
                hex
            )));
        }
        let word = |i: usize| {
            u64::from_str_radix(&hex[i * 16..(i + 1) * 16], 16)
                .map_err(|e| SequenceError::InvalidEncoding(e.to_string()))
        };
        Ok(Self {
            timestamp: word(0)?,
            node_id: word(1)?,
            counter: word(2)?,
        })
    }
}

impl std::fmt::Display for Sequence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl std::str::FromStr for Sequence {
    type Err = SequenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Sequence::from_hex(s)
    }
}

/// Stamps events for one node.
///
/// Two stamps from the same generator are distinct as long as the counter
/// does not complete a full cycle within a single millisecond.
pub struct FlakeSequenceGenerator<T: TimeSource = SystemTimeSource> {
    node_id: u64,
    counter: CyclicRangeCounter,
    clock: T,
}

impl FlakeSequenceGenerator<SystemTimeSource> {
    pub fn new(node_id: u64) -> SequenceResult<Self> {
        Self::with_clock(node_id, RangeConfig::default(), SystemTimeSource)
    }
}

impl<T: TimeSource> FlakeSequenceGenerator<T> {
    pub fn with_clock(node_id: u64, range: RangeConfig, clock: T) -> SequenceResult<Self> {
        Ok(Self {
            node_id,
            counter: CyclicRangeCounter::from_config(&range)?,
            clock,
        })
    }

    pub fn node_id(&self) -> u64 {
        self.node_id
    }

    /// Produce the next stamp
    pub fn next_sequence(&self) -> Sequence {
        let counter = self.counter.get_and_increment() as u64;
        Sequence {
            timestamp: self.clock.now_millis(),
            node_id: self.node_id,
            counter,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicU64, Ordering};

    struct FixedClock(AtomicU64);

    impl TimeSource for FixedClock {
        fn now_millis(&self) -> u64 {
            self.0.load(Ordering::Relaxed)
        }
    }

    #[test]
    fn test_stamps_carry_node_and_counter() {
        let generator = FlakeSequenceGenerator::with_clock(
            7,
            RangeConfig::new(0, 3),
            FixedClock(AtomicU64::new(1_000)),
        )
        .unwrap();

        let stamps: Vec<Sequence> = (0..5).map(|_| generator.next_sequence()).collect();
        assert!(stamps.iter().all(|s| s.node_id == 7 && s.timestamp == 1_000));
        let counters: Vec<u64> = stamps.iter().map(|s| s.counter).collect();
        assert_eq!(counters, vec![0, 1, 2, 3, 0]);
    }

    #[test]
    fn test_unique_within_one_cycle() {
        let generator = FlakeSequenceGenerator::with_clock(
            1,
            RangeConfig::new(0, 99),
            FixedClock(AtomicU64::new(42)),
        )
        .unwrap();

        let stamps: HashSet<Sequence> = (0..100).map(|_| generator.next_sequence()).collect();
        assert_eq!(stamps.len(), 100);
    }

    #[test]
    fn test_invalid_range_rejected() {
        let result = FlakeSequenceGenerator::with_clock(
            1,
            RangeConfig::new(3, 3),
            FixedClock(AtomicU64::new(0)),
        );
        assert!(matches!(result, Err(SequenceError::InvalidRange { .. })));
    }

    #[test]
    fn test_binary_and_hex_forms() {
        let seq = Sequence {
            timestamp: 0x0102_0304_0506_0708,
            node_id: 9,
            counter: u64::MAX,
        };

        let bytes = seq.to_bytes();
        assert_eq!(&bytes[..8], &[1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(Sequence::from_bytes(&bytes).unwrap(), seq);

        let hex = seq.to_string();
        assert_eq!(hex.len(), 48);
        assert!(hex.ends_with("ffffffffffffffff"));
        assert_eq!(hex.parse::<Sequence>().unwrap(), seq);
    }

    #[test]
    fn test_malformed_encodings() {
        assert!(Sequence::from_bytes(&[0u8; 23]).is_err());
        assert!(Sequence::from_hex("abc").is_err());
        assert!(Sequence::from_hex(&"+".repeat(48)).is_err());
        assert!(Sequence::from_hex(&"é".repeat(24)).is_err());
    }

    #[test]
    fn test_system_clock_is_after_epoch() {
        let generator = FlakeSequenceGenerator::new(3).unwrap();
        assert!(generator.next_sequence().timestamp > 0);
        assert_eq!(generator.node_id(), 3);
    }
}
