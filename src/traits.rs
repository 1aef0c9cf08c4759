//! Capability seams between the status pipeline and the outside world

use anyhow::Result;
use async_trait::async_trait;
use std::path::Path;

use crate::models::{ChatMessage, LocalStatusSnapshot, RemoteServerFact, RenderedEmbed, VersionInfo};

/// Where server status data comes from
#[async_trait]
pub trait StatusSource: Send + Sync {
    /// Look a server up by name in the account's remote listing.
    ///
    /// `Ok(None)` means the server is not listed, i.e. offline; an `Err` means
    /// the listing or the server's own entry could not be read.
    async fn fetch_server(&self, name: &str) -> Result<Option<RemoteServerFact>>;

    /// Read the status file written by the game server
    async fn read_local_status(&self, path: &Path) -> Result<LocalStatusSnapshot>;

    /// Read branch and version from the game's install directory
    async fn read_version(&self, install_dir: &Path) -> Result<VersionInfo>;
}

/// The chat operations the bot performs
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Replace the embed of an existing message
    async fn edit_embed(
        &self,
        channel_id: &str,
        message_id: &str,
        embed: &RenderedEmbed,
    ) -> Result<ChatMessage>;

    /// Replace the plain-text content of an existing message
    async fn edit_text(&self, channel_id: &str, message_id: &str, text: &str)
    -> Result<ChatMessage>;

    /// Post a new plain-text message
    async fn send_message(&self, channel_id: &str, text: &str) -> Result<ChatMessage>;
}
