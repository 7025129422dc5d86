//! Discord event handler for the verification flow
//!
//! Three gateway events matter here: `ready` posts the panel, button
//! clicks start handshakes, and direct messages carry code submissions.

use serenity::async_trait;
use serenity::builder::{CreateInteractionResponse, CreateInteractionResponseMessage};
use serenity::model::application::{ComponentInteraction, Interaction};
use serenity::model::channel::Message;
use serenity::model::gateway::Ready;
use serenity::model::id::ChannelId;
use serenity::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use rolegate_core::config::{DiscordConfig, MessagesConfig};
use rolegate_core::{Authority, Coordinator, InitiateError, SubmitOutcome};

use crate::counter::spawn_counter_refresh;
use crate::view::{panel_message, VERIFY_BUTTON_ID};

/// Event handler wiring gateway events into the coordinator
pub struct Handler {
    coordinator: Arc<Coordinator>,
    authority: Arc<dyn Authority>,
    discord: DiscordConfig,
    messages: MessagesConfig,
    panel_posted: AtomicBool,
}

impl Handler {
    /// Create a handler over shared verification components
    pub fn new(
        coordinator: Arc<Coordinator>,
        authority: Arc<dyn Authority>,
        discord: DiscordConfig,
        messages: MessagesConfig,
    ) -> Self {
        Self {
            coordinator,
            authority,
            discord,
            messages,
            panel_posted: AtomicBool::new(false),
        }
    }

    /// Post the verification panel and start the counter task
    async fn post_panel(&self, ctx: &Context) {
        let count = match self.authority.verified_count().await {
            Ok(count) => count,
            Err(e) => {
                warn!("Could not count verified members: {}", e);
                0
            }
        };

        let channel_id = ChannelId::new(self.discord.channel_id);
        let message = panel_message(&self.discord, &self.messages, count);

        match channel_id.send_message(&ctx.http, message).await {
            Ok(posted) => {
                info!("Verification panel posted to channel {}", channel_id);
                spawn_counter_refresh(
                    ctx.http.clone(),
                    Arc::clone(&self.authority),
                    self.messages.clone(),
                    channel_id,
                    posted.id,
                );
            }
            Err(e) => error!("Could not post verification panel: {}", e),
        }
    }

    /// Verify-button click: start a handshake and answer ephemerally
    async fn handle_verify_click(&self, ctx: &Context, component: &ComponentInteraction) {
        let requester_id = component.user.id.to_string();
        debug!("Verify button clicked by {}", requester_id);

        let reply = match self.coordinator.initiate(&requester_id).await {
            Ok(_) => self.messages.check_your_dm.clone(),
            Err(InitiateError::AlreadyVerified) => self.messages.already_verified.clone(),
            Err(InitiateError::Delivery(e)) => {
                warn!("Prompt delivery to {} failed: {}", requester_id, e);
                self.messages.delivery_failed.clone()
            }
        };

        let response = CreateInteractionResponse::Message(
            CreateInteractionResponseMessage::new()
                .content(reply)
                .ephemeral(true),
        );

        if let Err(e) = component.create_response(&ctx.http, response).await {
            warn!("Could not answer button click: {}", e);
        }
    }
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!("{} is connected", ready.user.name);

        // a gateway reconnect must not repost the panel
        if !self.panel_posted.swap(true, Ordering::SeqCst) {
            self.post_panel(&ctx).await;
        }
    }

    async fn message(&self, ctx: Context, msg: Message) {
        // only direct messages from humans are code submissions
        if msg.author.bot || msg.guild_id.is_some() {
            return;
        }

        let requester_id = msg.author.id.to_string();

        let reply = match self.coordinator.submit(&requester_id, &msg.content).await {
            SubmitOutcome::Success => &self.messages.verified_success,
            SubmitOutcome::GrantFailed => &self.messages.verified_fail,
            SubmitOutcome::WrongCode => &self.messages.wrong_code,
            // DMs from users with no open handshake are ignored
            SubmitOutcome::NoActiveSession => return,
        };

        if let Err(e) = msg.channel_id.say(&ctx.http, reply.as_str()).await {
            warn!("Could not reply in DM to {}: {}", requester_id, e);
        }
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        if let Interaction::Component(component) = interaction {
            if component.data.custom_id == VERIFY_BUTTON_ID {
                self.handle_verify_click(&ctx, &component).await;
            }
        }
    }
}
