//! # Status Embed Rendering
//!
//! Turns a reconciled [`ServerState`] into the embed shown in the status
//! channel. Rendering is pure: the same state and clock always produce the
//! same embed, and nothing here performs I/O.
//!
//! ## Layout
//!
//! - **Offline**: a single `**Offline**` section in the offline accent color
//! - **Online**: a status section (address, mission, player count and, when
//!   available, version and mission clock), then the player roster and the
//!   weather block when the server wrote a local status file
//!
//! The player count comes from the status file whenever one was read. The
//! listing's own count includes the connection used to query it, so without a
//! status file one is subtracted from it.

mod roster;
mod weather;

pub use roster::render_roster;
pub use weather::{classify, render_weather};

use chrono::{DateTime, Utc};

use crate::models::{
    EmbedStyle, LocalStatusSnapshot, RemoteServerFact, RenderedEmbed, ServerState,
    format_timestamp,
};

pub const TITLE: &str = "Server Status";
pub const FOOTER: &str = "Last update:";

/// Embed accent colors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accent {
    Online,
    Offline,
    Sunny,
    PartialOvercast,
    Overcast,
}

impl Accent {
    pub const fn color(self) -> u32 {
        match self {
            Self::Online => 0x0033_b531,
            Self::Offline => 0x00b5_4031,
            Self::Sunny => 0x00f1_c40f,
            Self::PartialOvercast => 0x0095_a5a6,
            Self::Overcast => 0x0060_7d8b,
        }
    }
}

/// Format seconds as zero-padded `HH:MM:SS`.
pub fn format_duration(secs: u64) -> String {
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}

pub fn render(state: &ServerState) -> RenderedEmbed {
    render_at(state, Utc::now())
}

pub fn render_at(state: &ServerState, now: DateTime<Utc>) -> RenderedEmbed {
    let (accent, sections) = match (&state.remote, state.online) {
        (Some(remote), true) => (online_accent(state), online_sections(state, remote)),
        _ => (Accent::Offline, vec!["**Offline**".to_string()]),
    };

    RenderedEmbed {
        title: TITLE.to_string(),
        color: accent.color(),
        sections,
        thumbnail: state.identity.thumbnail.clone(),
        timestamp: format_timestamp(now),
        footer: FOOTER.to_string(),
    }
}

fn online_accent(state: &ServerState) -> Accent {
    let weather = state.local.as_ref().and_then(|l| l.weather.as_ref());

    match (state.identity.style, weather) {
        (EmbedStyle::Weather, Some(weather)) => {
            classify(weather.clouds.density, weather.clouds.iprecptns)
                .tier
                .accent()
        }
        _ => Accent::Online,
    }
}

/// Players currently connected; the status file wins over the listing.
pub fn player_count(remote: &RemoteServerFact, local: Option<&LocalStatusSnapshot>) -> usize {
    match local {
        Some(snapshot) => snapshot.players.len(),
        None => remote.raw_player_count.saturating_sub(1) as usize,
    }
}

fn online_sections(state: &ServerState, remote: &RemoteServerFact) -> Vec<String> {
    let local = state.local.as_ref();
    let address = state
        .identity
        .address
        .clone()
        .unwrap_or_else(|| format!("{}:{}", remote.ip, remote.port));

    let mut status = vec![
        "**Online**".to_string(),
        format!("Server: **{}**", state.identity.name),
        format!("IP address: **{address}**"),
        format!("Mission: **{}**", remote.mission_name),
        format!("Players online: **{}**", player_count(remote, local)),
    ];

    if let Some(max) = remote.max_players {
        status.push(format!("Max players: **{max}**"));
    }
    if let Some(version) = &state.version {
        status.push(format!(
            "Version: **{} - {}**",
            version.version, version.branch
        ));
    }
    if let Some(elapsed) = local.and_then(|l| l.mission_time_elapsed) {
        status.push(format!("Mission time: **{}**", format_duration(elapsed)));
    }
    if let Some(left) = local.and_then(|l| l.mission_time_left) {
        status.push(format!("Next mission in: **{}**", format_duration(left)));
    }
    if remote.password_protected {
        status.push("Password protected: **Yes**".to_string());
    }

    let mut sections = vec![status.join("\n")];

    if let Some(snapshot) = local {
        if let Some(roster) = render_roster(&snapshot.players) {
            sections.push(roster);
        }
        if let Some(weather) = &snapshot.weather {
            sections.push(render_weather(weather));
        }
    }

    sections
}
