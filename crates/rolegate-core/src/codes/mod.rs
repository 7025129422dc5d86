//! Verification code issuing and lookup
//!
//! The backend side mints and stores per-session codes; the gateway side
//! reads them back through [`CodeSource`], either directly from a shared
//! store or over HTTP from a separate backend process.

mod client;
mod store;

pub use client::{CodeClient, CodeResponse, CodeSource};
pub use store::{
    generate_code, new_session_id, CodeStore, DEFAULT_CODE_LENGTH, DEFAULT_TTL, SESSION_ID_LENGTH,
};
