//! Configuration from `config.json`, environment variables and command-line flags
//!
//! Flags (and their environment variables) override the file. The file keeps
//! the layout of the single-server bot it grew out of, with an optional
//! `servers` list for reporting several servers from one run:
//!
//! ```json
//! {
//!   "discord": { "token": "...", "channel": "123", "serverStatusMessageId": "456" },
//!   "dcs": { "serverName": "My Server", "account": { "username": "...", "password": "..." } },
//!   "servers": [
//!     { "name": "My Server", "messageId": "456", "statusFile": "C:/DCS/status.json", "style": "weather" }
//!   ],
//!   "onError": "isolate"
//! }
//! ```

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::models::{EmbedStyle, ServerIdentity};
use crate::status_bot::FailurePolicy;

pub const DEFAULT_CONFIG_PATH: &str = "./config.json";

pub const DEFAULT_THUMBNAIL: &str =
    "https://upload.wikimedia.org/wikipedia/commons/thumb/f/ff/F16_drawing.svg/320px-F16_drawing.svg.png";

#[derive(Parser, Debug)]
#[command(
    name = "dcs-status-bot",
    version,
    about = "Publish the status of DCS World servers into a Discord message."
)]
pub struct Args {
    /// Configuration file
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,
    /// Discord bot token
    #[arg(long, env = "DISCORD_TOKEN", hide_env_values = true)]
    pub token: Option<String>,
    /// Channel holding the status messages
    #[arg(long, env = "DISCORD_CHANNEL")]
    pub channel: Option<String>,
    /// Status message to edit (single-server mode)
    #[arg(long)]
    pub server_status_message_id: Option<String>,
    /// DCS website account
    #[arg(long, env = "DCS_USERNAME")]
    pub username: Option<String>,
    #[arg(long, env = "DCS_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
    /// Server name as listed on the DCS website (single-server mode)
    #[arg(long)]
    pub server_name: Option<String>,
    /// Status file written by the server (single-server mode)
    #[arg(long)]
    pub status_file: Option<PathBuf>,
    /// DCS install directory, for the version line (single-server mode)
    #[arg(long)]
    pub install_dir: Option<PathBuf>,
    /// Post placeholder messages and print their ids instead of updating
    #[arg(long)]
    pub create_message: bool,
    /// Number of placeholder messages to create
    #[arg(long, default_value_t = 1)]
    pub count: usize,
    /// Log every pipeline step
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileConfig {
    #[serde(default)]
    pub discord: DiscordSection,
    #[serde(default)]
    pub dcs: DcsSection,
    #[serde(default)]
    pub servers: Vec<ServerEntry>,
    #[serde(default)]
    pub on_error: FailurePolicy,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscordSection {
    pub token: Option<String>,
    pub channel: Option<String>,
    pub server_status_message_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DcsSection {
    pub server_name: Option<String>,
    #[serde(default)]
    pub account: AccountSection,
}

#[derive(Debug, Default, Deserialize)]
pub struct AccountSection {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerEntry {
    pub name: String,
    pub message_id: String,
    /// Falls back to `discord.channel`
    pub channel: Option<String>,
    pub address: Option<String>,
    #[serde(default = "default_thumbnail")]
    pub thumbnail: Option<String>,
    pub status_file: Option<PathBuf>,
    pub install_dir: Option<PathBuf>,
    #[serde(default)]
    pub style: EmbedStyle,
}

fn default_thumbnail() -> Option<String> {
    Some(DEFAULT_THUMBNAIL.to_string())
}

/// Settings for a status update run
#[derive(Debug)]
pub struct RunConfig {
    pub token: String,
    pub username: String,
    pub password: String,
    pub servers: Vec<ServerIdentity>,
    pub policy: FailurePolicy,
}

/// Settings for creating placeholder messages
#[derive(Debug)]
pub struct CreateConfig {
    pub token: String,
    pub channel: String,
    pub count: usize,
}

#[derive(Debug)]
pub enum Mode {
    Run(RunConfig),
    CreateMessages(CreateConfig),
}

/// Read the configuration file.
///
/// A missing file at the default location is fine; everything may come from
/// flags and the environment.
pub fn load_file(path: &Path) -> Result<FileConfig> {
    if !path.exists() && path == Path::new(DEFAULT_CONFIG_PATH) {
        debug!("No {} found, using flags only", DEFAULT_CONFIG_PATH);
        return Ok(FileConfig::default());
    }

    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse config file {}", path.display()))
}

fn required(value: Option<String>, name: &str) -> Result<String> {
    value
        .filter(|v| !v.is_empty())
        .ok_or_else(|| anyhow!("Missing parameter: {name}"))
}

pub fn resolve(args: Args, file: FileConfig) -> Result<Mode> {
    let token = required(args.token.or(file.discord.token), "token")?;
    let channel = args.channel.or(file.discord.channel);

    if args.create_message {
        return Ok(Mode::CreateMessages(CreateConfig {
            token,
            channel: required(channel, "channel")?,
            count: args.count.max(1),
        }));
    }

    let username = required(args.username.or(file.dcs.account.username), "username")?;
    let password = required(args.password.or(file.dcs.account.password), "password")?;

    let servers = if args.server_name.is_none() && !file.servers.is_empty() {
        file.servers
            .into_iter()
            .map(|entry| {
                Ok(ServerIdentity {
                    channel_id: required(entry.channel.or_else(|| channel.clone()), "channel")?,
                    name: required(Some(entry.name), "servers[].name")?,
                    message_id: required(Some(entry.message_id), "servers[].messageId")?,
                    address: entry.address,
                    thumbnail: entry.thumbnail,
                    status_file: entry.status_file,
                    install_dir: entry.install_dir,
                    style: entry.style,
                })
            })
            .collect::<Result<Vec<_>>>()?
    } else {
        vec![ServerIdentity {
            name: required(args.server_name.or(file.dcs.server_name), "serverName")?,
            channel_id: required(channel, "channel")?,
            message_id: required(
                args.server_status_message_id
                    .or(file.discord.server_status_message_id),
                "serverStatusMessageId",
            )?,
            address: None,
            thumbnail: default_thumbnail(),
            status_file: args.status_file,
            install_dir: args.install_dir,
            style: EmbedStyle::default(),
        }]
    };

    Ok(Mode::Run(RunConfig {
        token,
        username,
        password,
        servers,
        policy: file.on_error,
    }))
}
