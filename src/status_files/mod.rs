use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::Path;
use tracing::debug;

use crate::dcs_api::DcsApiClient;
use crate::models::{LocalStatusSnapshot, RemoteServerFact, VersionInfo};
use crate::traits::StatusSource;

/// Name of the version file inside a DCS install directory
pub const VERSION_FILE: &str = "autoupdate.cfg";

pub async fn read_local_status(path: &Path) -> Result<LocalStatusSnapshot> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read status file {}", path.display()))?;

    let snapshot: LocalStatusSnapshot = serde_json::from_slice(&bytes)
        .with_context(|| format!("Failed to parse status file {}", path.display()))?;

    debug!(
        "Read status file {} with {} players",
        path.display(),
        snapshot.players.len()
    );
    Ok(snapshot)
}

pub async fn read_version(install_dir: &Path) -> Result<VersionInfo> {
    let path = install_dir.join(VERSION_FILE);
    let bytes = tokio::fs::read(&path)
        .await
        .with_context(|| format!("Failed to read version file {}", path.display()))?;

    serde_json::from_slice(&bytes)
        .with_context(|| format!("Failed to parse version file {}", path.display()))
}

/// Production status source: the listing API plus files on this host
#[derive(Clone)]
pub struct LocalSource {
    api: DcsApiClient,
}

impl LocalSource {
    pub fn new(api: DcsApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl StatusSource for LocalSource {
    async fn fetch_server(&self, name: &str) -> Result<Option<RemoteServerFact>> {
        self.api.fetch_server(name).await
    }

    async fn read_local_status(&self, path: &Path) -> Result<LocalStatusSnapshot> {
        read_local_status(path).await
    }

    async fn read_version(&self, install_dir: &Path) -> Result<VersionInfo> {
        read_version(install_dir).await
    }
}
