//! Periodic refresh of the verified-member counter

use serenity::builder::EditMessage;
use serenity::http::Http;
use serenity::model::id::{ChannelId, MessageId};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use rolegate_core::config::MessagesConfig;
use rolegate_core::Authority;

use crate::view::panel_components;

/// How often the counter label is refreshed
pub const REFRESH_INTERVAL: Duration = Duration::from_secs(60);

/// Spawn the background task that keeps the panel counter current
///
/// Each tick re-counts role holders through the authority and pushes the
/// new label with a message edit. The task talks only to the authority and
/// the panel message; it takes no part in any handshake and holds none of
/// its state.
pub fn spawn_counter_refresh(
    http: Arc<Http>,
    authority: Arc<dyn Authority>,
    messages: MessagesConfig,
    channel_id: ChannelId,
    message_id: MessageId,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(REFRESH_INTERVAL);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        // the panel was just posted with a fresh count
        interval.tick().await;

        loop {
            interval.tick().await;

            let count = match authority.verified_count().await {
                Ok(count) => count,
                Err(e) => {
                    warn!("Verified count refresh failed: {}", e);
                    continue;
                }
            };

            let edit = EditMessage::new().components(panel_components(&messages, count));
            if let Err(e) = channel_id.edit_message(&http, message_id, edit).await {
                warn!("Could not update counter label: {}", e);
                continue;
            }

            debug!("Counter refreshed to {}", count);
        }
    })
}
