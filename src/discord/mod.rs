//! # Discord Bot Integration
//!
//! This module talks to the Discord REST API on behalf of the status bot. The
//! bot owns a single message per game server and rewrites it in place on every
//! run, so the channel always shows the latest snapshot without piling up
//! messages.
//!
//! ## Endpoints
//!
//! - `PATCH /channels/{channel}/messages/{message}` with `{"embeds": [...]}` to
//!   replace the status embed
//! - `PATCH /channels/{channel}/messages/{message}` with `{"content": ""}` to
//!   clear the placeholder text the message was created with
//! - `POST /channels/{channel}/messages` to create the placeholder message in
//!   the first place
//!
//! ## Authentication
//!
//! Requests carry `Authorization: Bot <token>`. The bot needs the *Send
//! Messages* permission in the status channel; editing only works on messages
//! the bot itself authored.
//!
//! ## Rate Limits
//!
//! A run issues at most two edits per configured server, far below Discord's
//! per-channel limits, so no client-side throttling is applied.

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use tracing::debug;

use crate::models::{ChatMessage, DiscordContent, DiscordEmbed, DiscordEmbedEdit, RenderedEmbed};
use crate::traits::ChatClient;

pub const DEFAULT_API_BASE: &str = "https://discord.com/api/v10";

/// Discord REST client authenticated as a bot user.
///
/// ## Fields
///
/// - `client`: Reusable HTTP client shared by every request of a run
/// - `token`: Bot token from the Discord developer portal
/// - `api_base`: API root, [`DEFAULT_API_BASE`] outside of tests
#[derive(Clone)]
pub struct DiscordClient {
    client: Client,
    token: String,
    api_base: String,
}

impl DiscordClient {
    /// Creates a client for the public Discord API.
    ///
    /// ## Example
    ///
    /// ```rust,ignore
    /// let discord = DiscordClient::new("MTA...".to_string())?;
    /// let message = discord.send_message("123456789", "Initial message").await?;
    /// println!("{}", message.id);
    /// ```
    pub fn new(token: String) -> Result<Self> {
        Self::with_api_base(token, DEFAULT_API_BASE.to_string())
    }

    pub fn with_api_base(token: String, api_base: String) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!(
                "DiscordBot (",
                env!("CARGO_PKG_NAME"),
                ", ",
                env!("CARGO_PKG_VERSION"),
                ")"
            ))
            .build()?;

        Ok(Self {
            client,
            token,
            api_base: api_base.trim_end_matches('/').to_string(),
        })
    }

    fn message_url(&self, channel_id: &str, message_id: &str) -> String {
        format!(
            "{}/channels/{channel_id}/messages/{message_id}",
            self.api_base
        )
    }

    /// Sends an authenticated request and decodes the returned message.
    ///
    /// Any non-2xx status is turned into an error carrying the status and the
    /// response body, which is where Discord explains what went wrong (missing
    /// permissions, unknown message, invalid embed).
    async fn execute(&self, request: RequestBuilder) -> Result<ChatMessage> {
        let response = request
            .header("Authorization", format!("Bot {}", self.token))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("Discord API request failed: {status} {body}"));
        }

        Ok(response.json::<ChatMessage>().await?)
    }
}

#[async_trait]
impl ChatClient for DiscordClient {
    async fn edit_embed(
        &self,
        channel_id: &str,
        message_id: &str,
        embed: &RenderedEmbed,
    ) -> Result<ChatMessage> {
        let payload = DiscordEmbedEdit {
            embeds: vec![DiscordEmbed::from(embed)],
        };

        debug!("Editing embed of message {message_id} in channel {channel_id}");
        self.execute(
            self.client
                .patch(self.message_url(channel_id, message_id))
                .json(&payload),
        )
        .await
    }

    async fn edit_text(
        &self,
        channel_id: &str,
        message_id: &str,
        text: &str,
    ) -> Result<ChatMessage> {
        let payload = DiscordContent {
            content: text.to_string(),
        };

        debug!("Editing content of message {message_id} in channel {channel_id}");
        self.execute(
            self.client
                .patch(self.message_url(channel_id, message_id))
                .json(&payload),
        )
        .await
    }

    async fn send_message(&self, channel_id: &str, text: &str) -> Result<ChatMessage> {
        let payload = DiscordContent {
            content: text.to_string(),
        };

        self.execute(
            self.client
                .post(format!("{}/channels/{channel_id}/messages", self.api_base))
                .json(&payload),
        )
        .await
    }
}
