//! Data models for server status snapshots and Discord message payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Presentation variant used when rendering a server's embed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbedStyle {
    /// Online/offline accent colors.
    #[default]
    Status,
    /// Accent color follows the current sky condition.
    Weather,
}

/// A configured game server and where its status message lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerIdentity {
    pub name: String,
    pub channel_id: String,
    pub message_id: String,
    /// Public address shown instead of the listing's `ip:port`
    pub address: Option<String>,
    pub thumbnail: Option<String>,
    pub status_file: Option<PathBuf>,
    pub install_dir: Option<PathBuf>,
    pub style: EmbedStyle,
}

/// One server entry from the remote listing API
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteServerFact {
    pub name: String,
    pub ip: String,
    pub port: String,
    pub mission_name: String,
    /// Player count as reported upstream, including the listing's own connection
    pub raw_player_count: u32,
    pub max_players: Option<u32>,
    pub password_protected: bool,
}

/// Status file written by the game server's export script
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalStatusSnapshot {
    pub players: HashMap<String, Player>,
    #[serde(default)]
    pub missions_names: Vec<String>,
    #[serde(default)]
    pub mission_time_elapsed: Option<u64>,
    #[serde(default)]
    pub mission_time_left: Option<u64>,
    #[serde(default)]
    pub weather: Option<Weather>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub name: String,
    pub role: String,
    /// Seconds since the player joined
    #[serde(default)]
    pub online_time: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Weather {
    pub clouds: Clouds,
    pub wind: Wind,
    /// Ambient temperature in °C
    pub temperature: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Clouds {
    /// 0 (clear) to 10 (fully covered)
    pub density: i32,
    /// 0 none, 1 rain, 2 thunderstorm
    pub iprecptns: i32,
    /// Cloud base in metres
    pub base: i32,
    /// Cloud layer thickness in metres
    pub thickness: i32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wind {
    pub at_ground: WindLayer,
    pub at2000: WindLayer,
    pub at8000: WindLayer,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct WindLayer {
    /// Metres per second
    pub speed: f64,
    /// Degrees
    pub dir: f64,
}

/// Game version read from the install directory's `autoupdate.cfg`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VersionInfo {
    pub branch: String,
    pub version: String,
}

/// Everything known about one server for a single run
#[derive(Debug, Clone, PartialEq)]
pub struct ServerState {
    pub identity: ServerIdentity,
    pub online: bool,
    pub remote: Option<RemoteServerFact>,
    pub local: Option<LocalStatusSnapshot>,
    pub version: Option<VersionInfo>,
}

impl ServerState {
    pub fn offline(identity: ServerIdentity) -> Self {
        Self {
            identity,
            online: false,
            remote: None,
            local: None,
            version: None,
        }
    }
}

/// Platform-neutral embed produced by the renderer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedEmbed {
    pub title: String,
    pub color: u32,
    pub sections: Vec<String>,
    pub thumbnail: Option<String>,
    pub timestamp: String,
    pub footer: String,
}

impl RenderedEmbed {
    /// Sections joined the way they appear in the embed description.
    pub fn description(&self) -> String {
        self.sections.join("\n\n")
    }
}

/// Subset of a Discord message the bot cares about
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub channel_id: String,
    #[serde(default)]
    pub content: String,
}

/// Discord embed structure for rich status messages
#[derive(Debug, Serialize)]
pub struct DiscordEmbed {
    pub title: String,
    pub description: String,
    pub color: u32,
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<DiscordThumbnail>,
    pub footer: DiscordFooter,
}

/// Small thumbnail image for Discord embeds
#[derive(Debug, Serialize)]
pub struct DiscordThumbnail {
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct DiscordFooter {
    pub text: String,
}

impl From<&RenderedEmbed> for DiscordEmbed {
    fn from(embed: &RenderedEmbed) -> Self {
        Self {
            title: embed.title.clone(),
            description: embed.description(),
            color: embed.color,
            timestamp: embed.timestamp.clone(),
            thumbnail: embed
                .thumbnail
                .as_ref()
                .map(|url| DiscordThumbnail { url: url.clone() }),
            footer: DiscordFooter {
                text: embed.footer.clone(),
            },
        }
    }
}

/// Discord message edit payload carrying embeds
#[derive(Debug, Serialize)]
pub struct DiscordEmbedEdit {
    pub embeds: Vec<DiscordEmbed>,
}

/// Discord message payload carrying plain text
#[derive(Debug, Serialize)]
pub struct DiscordContent {
    pub content: String,
}

/// Timestamp format used for the embed footer time
pub fn format_timestamp(now: DateTime<Utc>) -> String {
    now.format("%Y-%m-%dT%H:%M:%S%z").to_string()
}
