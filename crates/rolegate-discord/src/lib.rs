//! rolegate-discord: Discord gateway for rolegate
//!
//! Connects the verification flow to Discord: the panel with its verify
//! button, DM delivery of the verification link, code submissions over DM,
//! and the verified-role grant. Uses Serenity 0.12 for the gateway and
//! REST.

pub mod authority;
pub mod bot;
pub mod counter;
pub mod error;
pub mod handler;
pub mod view;

pub use authority::DiscordAuthority;
pub use bot::VerifyBot;
pub use error::{DiscordError, Result};
