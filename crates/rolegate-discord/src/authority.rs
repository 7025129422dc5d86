//! Discord-backed implementation of the platform authority
//!
//! Everything here goes through REST, so the authority can be built before
//! the gateway client exists and shared with the coordinator and the
//! counter task. Verification state is the role itself; nothing is stored
//! on this side.

use async_trait::async_trait;
use serenity::http::Http;
use serenity::model::id::{GuildId, RoleId, UserId};
use std::sync::Arc;
use tracing::debug;

use rolegate_core::error::{Error, Result};
use rolegate_core::Authority;

/// Page size for member listing, the REST maximum
const MEMBER_PAGE_SIZE: u64 = 1000;

/// Role-based authority over a single guild
pub struct DiscordAuthority {
    http: Arc<Http>,
    guild_id: GuildId,
    verified_role_id: RoleId,
}

impl DiscordAuthority {
    /// Create an authority for a guild and its verified role
    pub fn new(http: Arc<Http>, guild_id: u64, verified_role_id: u64) -> Self {
        Self {
            http,
            guild_id: GuildId::new(guild_id),
            verified_role_id: RoleId::new(verified_role_id),
        }
    }

    fn parse_user(requester_id: &str) -> Result<UserId> {
        requester_id
            .parse::<u64>()
            .map(UserId::new)
            .map_err(|_| Error::Authority(format!("invalid requester id: {}", requester_id)))
    }
}

#[async_trait]
impl Authority for DiscordAuthority {
    async fn is_verified(&self, requester_id: &str) -> Result<bool> {
        let user_id = Self::parse_user(requester_id)?;

        let member = self
            .http
            .get_member(self.guild_id, user_id)
            .await
            .map_err(|e| Error::Authority(format!("member lookup failed: {}", e)))?;

        Ok(member.roles.contains(&self.verified_role_id))
    }

    async fn deliver(&self, requester_id: &str, text: &str) -> Result<()> {
        let user_id = Self::parse_user(requester_id)?;

        let channel = user_id
            .create_dm_channel(&self.http)
            .await
            .map_err(|e| Error::Delivery(format!("could not open DM: {}", e)))?;

        channel
            .id
            .say(&self.http, text)
            .await
            .map_err(|e| Error::Delivery(format!("could not send DM: {}", e)))?;

        Ok(())
    }

    async fn grant_verified(&self, requester_id: &str) -> Result<()> {
        let user_id = Self::parse_user(requester_id)?;

        self.http
            .add_member_role(
                self.guild_id,
                user_id,
                self.verified_role_id,
                Some("verification code accepted"),
            )
            .await
            .map_err(|e| Error::Authority(format!("role grant failed: {}", e)))?;

        debug!("Granted verified role to {}", requester_id);
        Ok(())
    }

    async fn verified_count(&self) -> Result<usize> {
        let mut count = 0;
        let mut after: Option<u64> = None;

        loop {
            let page = self
                .http
                .get_guild_members(self.guild_id, Some(MEMBER_PAGE_SIZE), after)
                .await
                .map_err(|e| Error::Authority(format!("member listing failed: {}", e)))?;

            count += page
                .iter()
                .filter(|m| m.roles.contains(&self.verified_role_id))
                .count();

            match page.last() {
                Some(last) if page.len() as u64 == MEMBER_PAGE_SIZE => {
                    after = Some(last.user.id.get())
                }
                _ => break,
            }
        }

        debug!("Counted {} verified members", count);
        Ok(count)
    }
}
