//! Core verification logic for rolegate
//!
//! Platform-neutral pieces shared by the HTTP backend and the Discord
//! gateway: the per-session code store and its HTTP client, the
//! verification handshake coordinator, configuration, and the error type.

pub mod codes;
pub mod config;
pub mod error;
pub mod verify;

pub use codes::{CodeClient, CodeResponse, CodeSource, CodeStore};
pub use config::Config;
pub use error::{Error, Result};
pub use verify::{Authority, Coordinator, InitiateError, Initiation, SubmitOutcome};
