use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::models::RenderedEmbed;
use crate::traits::ChatClient;

/// Applies a rendered embed to an existing status message.
///
/// Status messages start life as plain text (`Initial message`). After the
/// embed edit, any leftover text is cleared with a second edit, so every
/// message ends up embed-only after at most two calls. Either failure aborts
/// the publish; nothing is retried.
pub async fn publish<C>(
    chat: &C,
    channel_id: &str,
    message_id: &str,
    embed: &RenderedEmbed,
) -> Result<()>
where
    C: ChatClient + ?Sized,
{
    let message = chat
        .edit_embed(channel_id, message_id, embed)
        .await
        .with_context(|| format!("Failed to edit embed of message {message_id}"))?;
    debug!("Edited message {message_id}");

    if !message.content.is_empty() {
        debug!("Clear message content");
        chat.edit_text(&message.channel_id, &message.id, "")
            .await
            .with_context(|| format!("Failed to clear content of message {message_id}"))?;
        debug!("Message content cleared");
    }

    info!("Published status to message {message_id}");
    Ok(())
}
