//! Lock-free cyclic range counter
//!
//! Hands out `min, min+1, ..., max, min, ...` to any number of threads.
//! Every update is a compare-and-swap from the observed value; a caller that
//! loses the race re-reads and retries. No locks, no parking.

use crate::error::{SequenceError, SequenceResult};
use serde::Deserialize;
use std::sync::atomic::{AtomicI64, Ordering};
use tracing::{debug, trace};

/// Bounds for a [`CyclicRangeCounter`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RangeConfig {
    /// First value handed out, and the value after `max`
    pub min: i64,
    /// Last value before wrapping (inclusive)
    pub max: i64,
}

impl RangeConfig {
    pub fn new(min: i64, max: i64) -> Self {
        Self { min, max }
    }
}

impl Default for RangeConfig {
    /// 22-bit counter: 4,194,304 stamps before wrapping
    fn default() -> Self {
        Self {
            min: 0,
            max: (1 << 22) - 1,
        }
    }
}

/// Counter cycling through `[min, max]`
#[derive(Debug)]
pub struct CyclicRangeCounter {
    current: AtomicI64,
    min: i64,
    max: i64,
}

impl CyclicRangeCounter {
    /// Create a counter starting at `min`.
    ///
    /// Requires `min >= 0`, `max > 0` and `min < max`.
    pub fn new(min: i64, max: i64) -> SequenceResult<Self> {
        let invalid = |reason: &'static str| SequenceError::InvalidRange { min, max, reason };
        if min >= max {
            return Err(invalid("min >= max"));
        }
        if min < 0 {
            return Err(invalid("min < 0"));
        }
        if max <= 0 {
            return Err(invalid("max <= 0"));
        }

        debug!(min, max, "created cyclic range counter");
        Ok(Self {
            current: AtomicI64::new(min),
            min,
            max,
        })
    }

    pub fn from_config(config: &RangeConfig) -> SequenceResult<Self> {
        Self::new(config.min, config.max)
    }

    /// Return the current value and advance, wrapping from `max` to `min`
    pub fn get_and_increment(&self) -> i64 {
        loop {
            let current = self.current.load(Ordering::Acquire);
            let next = if current == self.max {
                self.min
            } else {
                current + 1
            };

            match self.current.compare_exchange_weak(
                current,
                next,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => {
                    if current == self.max {
                        trace!(min = self.min, max = self.max, "counter wrapped");
                    }
                    return current;
                }
                Err(_) => continue, // Retry
            }
        }
    }

    /// The value the next successful call will return, at the time of reading
    pub fn peek(&self) -> i64 {
        self.current.load(Ordering::Acquire)
    }

    pub fn min(&self) -> i64 {
        self.min
    }

    pub fn max(&self) -> i64 {
        self.max
    }

    /// Number of distinct values per cycle
    pub fn range_size(&self) -> u64 {
        (self.max - self.min) as u64 + 1
    }
}
