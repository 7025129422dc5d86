//! Builders for the verification panel
//!
//! Pure presentation: the embed, the verify button, and the disabled
//! counter button. The handshake logic never touches these types.

use serenity::builder::{CreateActionRow, CreateButton, CreateEmbed, CreateMessage};
use serenity::model::application::ButtonStyle;
use serenity::model::Colour;

use rolegate_core::config::{DiscordConfig, MessagesConfig};

/// Custom id of the verify button
pub const VERIFY_BUTTON_ID: &str = "rolegate_verify";

/// Custom id of the counter button (never clickable)
pub const COUNTER_BUTTON_ID: &str = "rolegate_count";

/// Map a configured style name onto a button style
///
/// Unknown names fall back to secondary.
pub fn parse_button_style(name: &str) -> ButtonStyle {
    match name.to_ascii_lowercase().as_str() {
        "primary" => ButtonStyle::Primary,
        "success" => ButtonStyle::Success,
        "danger" => ButtonStyle::Danger,
        _ => ButtonStyle::Secondary,
    }
}

/// Action row holding the verify button and the counter
pub fn panel_components(messages: &MessagesConfig, verified_count: usize) -> Vec<CreateActionRow> {
    let verify = CreateButton::new(VERIFY_BUTTON_ID)
        .label(messages.verify_button_label.clone())
        .style(parse_button_style(&messages.verify_button_style));

    let counter = CreateButton::new(COUNTER_BUTTON_ID)
        .label(messages.render_counter_label(verified_count))
        .style(parse_button_style(&messages.counter_style))
        .disabled(true);

    vec![CreateActionRow::Buttons(vec![verify, counter])]
}

/// The full verification panel message
pub fn panel_message(
    discord: &DiscordConfig,
    messages: &MessagesConfig,
    verified_count: usize,
) -> CreateMessage {
    let mut embed = CreateEmbed::new()
        .description(messages.render_embed_description(discord.bot_id))
        .colour(Colour::PURPLE);

    if let Some(thumbnail) = &discord.thumbnail {
        embed = embed.thumbnail(thumbnail.clone());
    }

    CreateMessage::new()
        .embed(embed)
        .components(panel_components(messages, verified_count))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_style_names() {
        assert_eq!(parse_button_style("primary"), ButtonStyle::Primary);
        assert_eq!(parse_button_style("success"), ButtonStyle::Success);
        assert_eq!(parse_button_style("danger"), ButtonStyle::Danger);
        assert_eq!(parse_button_style("secondary"), ButtonStyle::Secondary);
    }

    #[test]
    fn test_style_names_are_case_insensitive() {
        assert_eq!(parse_button_style("Primary"), ButtonStyle::Primary);
        assert_eq!(parse_button_style("SUCCESS"), ButtonStyle::Success);
    }

    #[test]
    fn test_unknown_style_falls_back_to_secondary() {
        assert_eq!(parse_button_style("sparkly"), ButtonStyle::Secondary);
        assert_eq!(parse_button_style(""), ButtonStyle::Secondary);
    }

    #[test]
    fn test_panel_has_one_button_row() {
        let rows = panel_components(&MessagesConfig::default(), 3);
        assert_eq!(rows.len(), 1);
    }
}
