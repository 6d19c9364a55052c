#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SchemaVersion(pub u32);

/// Seconds since the Unix epoch, as reported by the external clock.
/// Day-window arithmetic operates on whole UTC days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UnixTimeSec(pub u64);

pub const SECONDS_PER_DAY: u64 = 86_400;

impl UnixTimeSec {
    /// Start of the UTC calendar day containing this timestamp.
    pub fn day_start(self) -> UnixTimeSec {
        UnixTimeSec(self.0 - self.0 % SECONDS_PER_DAY)
    }

    /// Exclusive end of the UTC calendar day containing this timestamp.
    pub fn day_end(self) -> UnixTimeSec {
        UnixTimeSec(self.day_start().0 + SECONDS_PER_DAY)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ReasonCodeId(pub u32);

#[derive(Debug, Clone, PartialEq)]
pub enum ContractViolation {
    InvalidValue {
        field: &'static str,
        reason: &'static str,
    },
    InvalidRange {
        field: &'static str,
        min: u64,
        max: u64,
        got: u64,
    },
}

pub trait Validate {
    fn validate(&self) -> Result<(), ContractViolation>;
}
