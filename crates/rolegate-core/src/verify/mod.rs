//! Verification handshake state
//!
//! A requester becomes PENDING when a session is bound to them, and the
//! binding is consumed only by a fully successful submission. The platform
//! itself stays behind the [`Authority`] trait.

mod coordinator;
mod traits;
mod types;

pub use coordinator::Coordinator;
pub use traits::Authority;
pub use types::{InitiateError, Initiation, SubmitOutcome};
