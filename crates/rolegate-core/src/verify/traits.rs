//! Seam to the external messaging platform

use async_trait::async_trait;

use crate::error::Result;

/// Platform operations the verification flow depends on
///
/// Requester ids are opaque strings; the platform adapter decides what they
/// mean. Every method crosses the network, so all of them are fallible.
#[async_trait]
pub trait Authority: Send + Sync {
    /// Whether the requester already holds the verified attribute
    async fn is_verified(&self, requester_id: &str) -> Result<bool>;

    /// Deliver a private message to the requester
    async fn deliver(&self, requester_id: &str, text: &str) -> Result<()>;

    /// Grant the verified attribute to the requester
    async fn grant_verified(&self, requester_id: &str) -> Result<()>;

    /// Number of members currently holding the verified attribute
    async fn verified_count(&self) -> Result<usize>;
}
