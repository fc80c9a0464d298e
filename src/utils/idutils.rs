//! Distributed unique ids.
//!
//! Ids follow the Sonyflake layout: 39 bits of elapsed time in 10 ms units,
//! 8 bits of sequence within one tick and 16 bits of machine id. The integer
//! id is then turned into a short string with hashids and prefixed with the
//! entity kind (`al-`, `pl-`, ...).

use std::sync::Mutex;
use std::time::Duration;

use chrono::Utc;
use harsh::{Harsh, HarshBuilder};
use once_cell::sync::{Lazy, OnceCell};
use thiserror::Error;

const BIT_LEN_TIME: u32 = 39;
const BIT_LEN_SEQUENCE: u32 = 8;
const BIT_LEN_MACHINE_ID: u32 = 63 - BIT_LEN_TIME - BIT_LEN_SEQUENCE;
const SEQUENCE_MASK: u16 = (1 << BIT_LEN_SEQUENCE) - 1;
const TIME_UNIT_MS: i64 = 10;

/// 2014-09-01T00:00:00Z, the default Sonyflake epoch.
const DEFAULT_EPOCH_MS: i64 = 1_409_529_600_000;

pub const ALPHABET_36: &str = "abcdefghijklmnopqrstuvwxyz1234567890";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum IdError {
    #[error("Elapsed time no longer fits in 39 bits")]
    TimeOverflow,
}

struct GeneratorState {
    elapsed: i64,
    sequence: u16,
}

pub struct IdGenerator {
    /// Epoch in 10 ms units.
    start_time: i64,
    machine_id: u16,
    state: Mutex<GeneratorState>,
}

impl IdGenerator {
    pub fn new(machine_id: u16) -> Self {
        Self::with_epoch_ms(machine_id, DEFAULT_EPOCH_MS)
    }

    fn with_epoch_ms(machine_id: u16, epoch_ms: i64) -> Self {
        Self {
            start_time: epoch_ms / TIME_UNIT_MS,
            machine_id,
            state: Mutex::new(GeneratorState {
                elapsed: 0,
                sequence: SEQUENCE_MASK,
            }),
        }
    }

    /// Returns the next id. Ids from one generator are strictly increasing.
    pub fn next_id(&self) -> Result<u64, IdError> {
        // The state is two integers; a panic elsewhere cannot leave it torn.
        let mut state = self
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let current = self.current_elapsed();
        if state.elapsed < current {
            state.elapsed = current;
            state.sequence = 0;
        } else {
            state.sequence = (state.sequence + 1) & SEQUENCE_MASK;
            if state.sequence == 0 {
                state.elapsed += 1;
                // The tick is exhausted. Waiting for the next one keeps the
                // lock so no caller can draw from it; the wait is under 10 ms.
                let overtime = state.elapsed - current;
                std::thread::sleep(sleep_time(overtime));
            }
        }

        if state.elapsed >= 1 << BIT_LEN_TIME {
            return Err(IdError::TimeOverflow);
        }

        Ok(((state.elapsed as u64) << (BIT_LEN_SEQUENCE + BIT_LEN_MACHINE_ID))
            | ((state.sequence as u64) << BIT_LEN_MACHINE_ID)
            | self.machine_id as u64)
    }

    /// Next id encoded with the lowercase alphanumeric alphabet.
    pub fn next_uuid36(&self, prefix: &str) -> Result<String, IdError> {
        Ok(encode_uuid36(prefix, self.next_id()?))
    }

    fn current_elapsed(&self) -> i64 {
        Utc::now().timestamp_millis() / TIME_UNIT_MS - self.start_time
    }
}

fn sleep_time(overtime: i64) -> Duration {
    let now_ms = Utc::now().timestamp_millis();
    let wait_ms = overtime * TIME_UNIT_MS - now_ms % TIME_UNIT_MS;
    Duration::from_millis(wait_ms.max(0) as u64)
}

static MACHINE_ID: OnceCell<u16> = OnceCell::new();

static GENERATOR: Lazy<IdGenerator> = Lazy::new(|| IdGenerator::new(machine_id()));

static HASHIDS: Lazy<Harsh> = Lazy::new(|| {
    HarshBuilder::new()
        .build()
        .expect("default hashids alphabet is valid")
});

static HASHIDS_36: Lazy<Harsh> = Lazy::new(|| {
    HarshBuilder::new()
        .alphabet(ALPHABET_36)
        .build()
        .expect("36-character hashids alphabet is valid")
});

/// Pins the machine id of the process-wide generator. Must run before the
/// first id is drawn; returns false if the id was already fixed.
pub fn init_machine_id(machine_id: u16) -> bool {
    MACHINE_ID.set(machine_id).is_ok()
}

fn machine_id() -> u16 {
    *MACHINE_ID.get_or_init(|| (std::process::id() & 0xffff) as u16)
}

pub fn get_int_id() -> Result<u64, IdError> {
    GENERATOR.next_id()
}

pub fn encode_uuid(prefix: &str, id: u64) -> String {
    format!("{prefix}{}", HASHIDS.encode(&[id]))
}

pub fn encode_uuid36(prefix: &str, id: u64) -> String {
    format!("{prefix}{}", HASHIDS_36.encode(&[id]))
}

pub fn get_uuid(prefix: &str) -> Result<String, IdError> {
    Ok(encode_uuid(prefix, get_int_id()?))
}

/// Like [`get_uuid`] but restricted to lowercase letters and digits, which keeps
/// the id usable as a Kubernetes label value.
pub fn get_uuid36(prefix: &str) -> Result<String, IdError> {
    GENERATOR.next_uuid36(prefix)
}
