use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// Timestamp of a block, set once at creation.
///
/// Combines wall-clock milliseconds with a logical tick so that timestamps
/// are strictly increasing within a chain even when two blocks land in the
/// same millisecond. Ordering: `unix_ms` → `tick` (total order).
#[derive(
    Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct EventTime {
    /// Wall-clock milliseconds since UNIX epoch.
    pub unix_ms: u64,
    /// Logical tick for events at the same physical time.
    pub tick: u32,
}

impl EventTime {
    pub const fn new(unix_ms: u64, tick: u32) -> Self {
        Self { unix_ms, tick }
    }

    /// The current wall-clock time, tick 0.
    pub fn now() -> Self {
        let unix_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64;
        Self { unix_ms, tick: 0 }
    }

    /// The zero timestamp.
    pub const fn zero() -> Self {
        Self {
            unix_ms: 0,
            tick: 0,
        }
    }

    /// A current timestamp guaranteed to be strictly after `prev`.
    ///
    /// Advances the logical tick when the wall clock has not moved past the
    /// previous block's timestamp.
    pub fn next_after(prev: Option<&Self>) -> Self {
        let now = Self::now();
        match prev {
            None => now,
            Some(p) if now.unix_ms > p.unix_ms => now,
            Some(p) => Self {
                unix_ms: p.unix_ms,
                tick: p.tick.saturating_add(1),
            },
        }
    }
}

impl fmt::Debug for EventTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EventTime({}ms.{})", self.unix_ms, self.tick)
    }
}

impl fmt::Display for EventTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.unix_ms, self.tick)
    }
}
