#![forbid(unsafe_code)]

pub mod config;
pub mod divorce;
pub mod engagement;
pub mod error;
pub mod guest_list;
pub mod kernel;
pub mod marriage;

pub use config::WedlockConfig;
pub use divorce::{DivorceOutcome, DivorceVoteSlot};
pub use engagement::EngageOutcome;
pub use error::{reason_codes, RegistryError};
pub use guest_list::{ConfirmGuestListOutcome, VetoOutcome};
pub use kernel::WedlockKernel;
pub use marriage::MarryOutcome;
