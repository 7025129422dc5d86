//! Discord bot wiring for the verification gateway

use serenity::http::Http;
use serenity::model::gateway::GatewayIntents;
use serenity::prelude::*;
use std::sync::Arc;
use tracing::info;

use rolegate_core::config::{Config, DiscordConfig, MessagesConfig};
use rolegate_core::{Authority, CodeClient, CodeSource, Coordinator};

use crate::authority::DiscordAuthority;
use crate::error::{DiscordError, Result};
use crate::handler::Handler;

/// Discord gateway for the verification flow
pub struct VerifyBot {
    discord: DiscordConfig,
    messages: MessagesConfig,
    coordinator: Arc<Coordinator>,
    authority: Arc<dyn Authority>,
}

impl VerifyBot {
    /// Wire the bot from configuration, reaching the backend over HTTP
    pub fn new(config: &Config) -> Result<Self> {
        let codes = Arc::new(CodeClient::new(config.api.backend_url.clone())?);
        Self::with_code_source(config, codes)
    }

    /// Wire the bot over a shared code source
    ///
    /// Used when the backend runs in the same process, so the coordinator
    /// can read the store directly. The REST-side pieces are built up
    /// front; the gateway connection itself waits for [`start`].
    ///
    /// [`start`]: VerifyBot::start
    pub fn with_code_source(config: &Config, codes: Arc<dyn CodeSource>) -> Result<Self> {
        let discord = config.discord.clone().ok_or(DiscordError::TokenNotSet)?;

        if discord.token.is_empty() {
            return Err(DiscordError::TokenNotSet);
        }
        if discord.guild_id == 0 || discord.verified_role_id == 0 || discord.channel_id == 0 {
            return Err(DiscordError::Config(
                "guild_id, verified_role_id and channel_id must all be set".to_string(),
            ));
        }

        let http = Arc::new(Http::new(&discord.token));
        let authority: Arc<dyn Authority> = Arc::new(DiscordAuthority::new(
            http,
            discord.guild_id,
            discord.verified_role_id,
        ));

        let coordinator = Arc::new(Coordinator::new(
            Arc::clone(&authority),
            codes,
            config.verification.clone(),
            config.messages.clone(),
        ));

        Ok(Self {
            discord,
            messages: config.messages.clone(),
            coordinator,
            authority,
        })
    }

    /// Connect to the gateway and run until the connection ends
    pub async fn start(&self) -> Result<()> {
        // - GUILD_MESSAGES: traffic in the panel's home guild
        // - DIRECT_MESSAGES: receive code submissions
        // - MESSAGE_CONTENT: read the submitted codes (privileged intent)
        let intents = GatewayIntents::GUILD_MESSAGES
            | GatewayIntents::DIRECT_MESSAGES
            | GatewayIntents::MESSAGE_CONTENT;

        info!("Starting Discord gateway...");

        let handler = Handler::new(
            Arc::clone(&self.coordinator),
            Arc::clone(&self.authority),
            self.discord.clone(),
            self.messages.clone(),
        );

        let mut client = Client::builder(&self.discord.token, intents)
            .event_handler(handler)
            .await?;

        client.start().await?;

        Ok(())
    }
}
