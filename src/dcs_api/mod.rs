//! # DCS Server Listing API
//!
//! Fetches the "my servers" listing from the DCS World website. The endpoint
//! is authenticated with the account's basic credentials and answers with a
//! JSON document, sometimes preceded by stray markup, describing every server
//! registered to the account.
//!
//! A server that is not running simply does not appear in `MY_SERVERS`, so
//! callers look the configured name up in the returned list rather than
//! treating its absence as an error. Only the matching entry is converted;
//! other servers on the account cannot break the lookup.

use anyhow::{Context, Result, anyhow};
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info};

use crate::models::RemoteServerFact;

pub const LISTING_URL: &str = "https://www.digitalcombatsimulator.com/en/personal/server/";

#[derive(Debug, Deserialize)]
struct ServerListing {
    #[serde(rename = "MY_SERVERS", default)]
    my_servers: Vec<ListedServer>,
}

#[derive(Debug, Deserialize)]
struct ListedServer {
    #[serde(rename = "NAME")]
    name: String,
    #[serde(rename = "IP_ADDRESS", default)]
    ip_address: String,
    #[serde(rename = "PORT", default)]
    port: String,
    #[serde(rename = "MISSION_NAME", default)]
    mission_name: String,
    #[serde(rename = "PLAYERS", default)]
    players: String,
    #[serde(rename = "PLAYERS_MAX", default)]
    players_max: Option<String>,
    #[serde(rename = "PASSWORD", default)]
    password: Option<String>,
}

impl TryFrom<ListedServer> for RemoteServerFact {
    type Error = anyhow::Error;

    fn try_from(server: ListedServer) -> Result<Self> {
        let raw_player_count = server.players.trim().parse().with_context(|| {
            format!(
                "Invalid player count '{}' for server {}",
                server.players, server.name
            )
        })?;

        Ok(Self {
            raw_player_count,
            max_players: server
                .players_max
                .and_then(|max| max.trim().parse().ok()),
            password_protected: server
                .password
                .is_some_and(|p| p.eq_ignore_ascii_case("yes")),
            name: server.name,
            ip: server.ip_address,
            port: server.port,
            mission_name: server.mission_name,
        })
    }
}

fn parse_listing(body: &str) -> Result<ServerListing> {
    if body.trim().is_empty() {
        return Err(anyhow!("Server listing response was empty"));
    }

    let json_start = body
        .find('{')
        .ok_or_else(|| anyhow!("Server listing response contained no JSON object"))?;

    serde_json::from_str(&body[json_start..]).context("Failed to parse server listing JSON")
}

/// Look a server up by name in a listing response body.
///
/// Anything before the first `{` is discarded. `Ok(None)` means the server
/// is not listed; a malformed entry is an error only when it is the one asked
/// for.
pub fn find_server(body: &str, name: &str) -> Result<Option<RemoteServerFact>> {
    parse_listing(body)?
        .my_servers
        .into_iter()
        .find(|server| server.name == name)
        .map(RemoteServerFact::try_from)
        .transpose()
}

/// Authenticated client for the server listing endpoint
#[derive(Clone)]
pub struct DcsApiClient {
    client: Client,
    username: String,
    password: String,
    listing_url: String,
}

impl DcsApiClient {
    pub fn new(username: String, password: String) -> Result<Self> {
        Self::with_listing_url(username, password, LISTING_URL.to_string())
    }

    pub fn with_listing_url(username: String, password: String, listing_url: String) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            username,
            password,
            listing_url,
        })
    }

    pub async fn fetch_server(&self, name: &str) -> Result<Option<RemoteServerFact>> {
        info!("Fetching server listing for account {}", self.username);

        // Cache buster
        let response = self
            .client
            .get(&self.listing_url)
            .query(&[("ajax", "y".to_string()), ("_", Utc::now().timestamp().to_string())])
            .basic_auth(&self.username, Some(&self.password))
            .send()
            .await
            .context("Failed to request server listing")?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "Failed to fetch server listing: {}",
                response.status()
            ));
        }

        let body = response.text().await?;
        let server = find_server(&body, name)?;

        debug!(
            "Server {} {} in listing",
            name,
            if server.is_some() { "found" } else { "not found" }
        );
        Ok(server)
    }
}
