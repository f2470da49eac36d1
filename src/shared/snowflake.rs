//! Snowflake ID Generator
//!
//! Time-ordered 64-bit IDs for every persisted record. IDs are generated by the
//! server, so inserts never depend on backend-specific auto-increment syntax.

use std::sync::Mutex;

use chrono::Utc;

/// Default epoch (2024-01-01T00:00:00.000Z)
pub const DEFAULT_EPOCH_MS: u64 = 1_704_067_200_000;

const MACHINE_BITS: u64 = 10;
const SEQUENCE_BITS: u64 = 12;
const SEQUENCE_MASK: u64 = (1 << SEQUENCE_BITS) - 1;

#[derive(Default)]
struct GeneratorState {
    last_timestamp: u64,
    sequence: u64,
}

/// Snowflake ID generator
pub struct SnowflakeGenerator {
    epoch_ms: u64,
    machine_id: u64,
    state: Mutex<GeneratorState>,
}

impl SnowflakeGenerator {
    /// Create a new snowflake generator
    pub fn new(machine_id: u16, epoch_ms: u64) -> Self {
        Self {
            epoch_ms,
            machine_id: u64::from(machine_id) & ((1 << MACHINE_BITS) - 1),
            state: Mutex::new(GeneratorState::default()),
        }
    }

    /// Generate a new snowflake ID
    pub fn generate(&self) -> i64 {
        let mut state = match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        let mut timestamp = self.current_timestamp().max(state.last_timestamp);
        if timestamp == state.last_timestamp {
            state.sequence = (state.sequence + 1) & SEQUENCE_MASK;
            if state.sequence == 0 {
                // sequence exhausted for this millisecond, borrow the next one
                timestamp += 1;
            }
        } else {
            state.sequence = 0;
        }
        state.last_timestamp = timestamp;

        let id = ((timestamp - self.epoch_ms) << (MACHINE_BITS + SEQUENCE_BITS))
            | (self.machine_id << SEQUENCE_BITS)
            | state.sequence;

        id as i64
    }

    /// Extract the creation timestamp (Unix milliseconds) from an ID
    pub fn timestamp_of(&self, snowflake: i64) -> u64 {
        ((snowflake as u64) >> (MACHINE_BITS + SEQUENCE_BITS)) + self.epoch_ms
    }

    fn current_timestamp(&self) -> u64 {
        (Utc::now().timestamp_millis().max(0) as u64).max(self.epoch_ms)
    }
}

impl Default for SnowflakeGenerator {
    fn default() -> Self {
        Self::new(1, DEFAULT_EPOCH_MS)
    }
}

/// Parse snowflake from its string form (as used in DTOs and paths)
pub fn from_string(s: &str) -> Result<i64, std::num::ParseIntError> {
    s.trim().parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generate_unique() {
        let gen = SnowflakeGenerator::default();
        let ids: HashSet<i64> = (0..10_000).map(|_| gen.generate()).collect();
        assert_eq!(ids.len(), 10_000);
    }

    #[test]
    fn test_ids_are_increasing() {
        let gen = SnowflakeGenerator::default();
        let a = gen.generate();
        let b = gen.generate();
        assert!(b > a);
    }

    #[test]
    fn test_extract_timestamp() {
        let gen = SnowflakeGenerator::new(3, DEFAULT_EPOCH_MS);
        let id = gen.generate();
        let ts = gen.timestamp_of(id);
        let now = Utc::now().timestamp_millis() as u64;
        assert!(ts <= now + 5);
        assert!(ts + 1000 > now);
    }

    #[test]
    fn test_from_string() {
        assert_eq!(from_string(" 42 ").unwrap(), 42);
        assert!(from_string("abc").is_err());
    }
}
