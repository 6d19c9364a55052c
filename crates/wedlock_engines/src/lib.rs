#![forbid(unsafe_code)]

pub mod certificate;
pub mod clock;
pub mod consent;
pub mod record_key;
