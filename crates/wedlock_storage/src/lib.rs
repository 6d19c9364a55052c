#![forbid(unsafe_code)]

pub mod record_store;

pub use record_store::{RecordStore, StorageError};
