#![forbid(unsafe_code)]

pub mod audit;
pub mod common;
pub mod record;

pub use common::{ContractViolation, ReasonCodeId, SchemaVersion, UnixTimeSec, Validate};
