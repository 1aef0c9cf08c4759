//! Merges the remote listing and the local status files into one `ServerState`
//!
//! The listing decides whether a server is online. Once it is, every file the
//! server is configured with must be readable: a broken status or version file
//! aborts that server instead of publishing a half-filled embed.

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::models::{ServerIdentity, ServerState};
use crate::traits::StatusSource;

pub async fn reconcile<S>(identity: &ServerIdentity, source: &S) -> Result<ServerState>
where
    S: StatusSource + ?Sized,
{
    let remote = source
        .fetch_server(&identity.name)
        .await
        .with_context(|| format!("Failed to fetch server listing for {}", identity.name))?;

    let Some(remote) = remote else {
        info!("Server {} not in listing, reporting offline", identity.name);
        return Ok(ServerState::offline(identity.clone()));
    };
    debug!("Returned server status for {}", identity.name);

    let local = match &identity.status_file {
        Some(path) => Some(
            source
                .read_local_status(path)
                .await
                .with_context(|| format!("Failed to read local status for {}", identity.name))?,
        ),
        None => None,
    };

    let version = match &identity.install_dir {
        Some(dir) => Some(
            source
                .read_version(dir)
                .await
                .with_context(|| format!("Failed to read version for {}", identity.name))?,
        ),
        None => None,
    };

    info!(
        "Server {} online ({} local status, {} version)",
        identity.name,
        if local.is_some() { "with" } else { "without" },
        if version.is_some() { "with" } else { "without" },
    );

    Ok(ServerState {
        identity: identity.clone(),
        online: true,
        remote: Some(remote),
        local,
        version,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dcs_api::DcsApiClient;
    use crate::status_files::LocalSource;
    use crate::testing::{FakeSource, identity, remote_fact, serve_once, snapshot};
    use std::path::PathBuf;

    fn listing_source(url: String) -> LocalSource {
        LocalSource::new(
            DcsApiClient::with_listing_url("pilot".to_string(), "secret".to_string(), url).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_absent_server_is_offline() {
        let source = FakeSource::with_servers(vec![remote_fact("Other", 3)]);
        let mut alpha = identity("Alpha");
        alpha.status_file = Some(PathBuf::from("/srv/dcs/status.json"));

        let state = reconcile(&alpha, &source).await.unwrap();

        assert!(!state.online);
        assert!(state.remote.is_none());
        assert!(state.local.is_none());
        // Offline servers never touch the local files
        assert_eq!(source.local_reads(), 0);
    }

    #[tokio::test]
    async fn test_empty_listing_is_offline() {
        let source = FakeSource::with_servers(vec![]);
        let state = reconcile(&identity("Alpha"), &source).await.unwrap();
        assert!(!state.online);
    }

    #[tokio::test]
    async fn test_fetch_failure_is_fatal() {
        let source = FakeSource::failing_fetch();
        let err = reconcile(&identity("Alpha"), &source).await.unwrap_err();
        assert!(err.to_string().contains("Failed to fetch server listing for Alpha"));
    }

    #[tokio::test]
    async fn test_online_without_files() {
        let source = FakeSource::with_servers(vec![remote_fact("Bravo", 5)]);

        let state = reconcile(&identity("Bravo"), &source).await.unwrap();

        assert!(state.online);
        assert_eq!(state.remote.unwrap().raw_player_count, 5);
        assert!(state.local.is_none());
        assert!(state.version.is_none());
        assert_eq!(source.local_reads(), 0);
    }

    #[tokio::test]
    async fn test_online_with_local_and_version() {
        let source = FakeSource::with_servers(vec![remote_fact("Bravo", 5)])
            .local(snapshot(&[("1", "Ghost", "A-10C_2")]))
            .version("openbeta", "2.9.3");
        let mut bravo = identity("Bravo");
        bravo.status_file = Some(PathBuf::from("/srv/dcs/status.json"));
        bravo.install_dir = Some(PathBuf::from("/opt/dcs"));

        let state = reconcile(&bravo, &source).await.unwrap();

        assert!(state.online);
        assert_eq!(state.local.unwrap().players.len(), 1);
        assert_eq!(state.version.unwrap().branch, "openbeta");
    }

    #[tokio::test]
    async fn test_local_read_failure_is_fatal() {
        let source = FakeSource::with_servers(vec![remote_fact("Bravo", 5)]);
        let mut bravo = identity("Bravo");
        bravo.status_file = Some(PathBuf::from("/srv/dcs/status.json"));

        let err = reconcile(&bravo, &source).await.unwrap_err();
        assert!(err.to_string().contains("Failed to read local status for Bravo"));
    }

    #[tokio::test]
    async fn test_version_read_failure_is_fatal() {
        let source = FakeSource::with_servers(vec![remote_fact("Bravo", 5)]);
        let mut bravo = identity("Bravo");
        bravo.install_dir = Some(PathBuf::from("/opt/dcs"));

        let err = reconcile(&bravo, &source).await.unwrap_err();
        assert!(err.to_string().contains("Failed to read version for Bravo"));
    }

    #[tokio::test]
    async fn test_malformed_sibling_in_listing_keeps_target_online() {
        let body = r#"{"MY_SERVERS": [
            {"NAME": "Alpha", "IP_ADDRESS": "203.0.113.7", "PORT": "10308", "MISSION_NAME": "CAS", "PLAYERS": "5"},
            {"NAME": "Other", "IP_ADDRESS": "203.0.113.8", "PORT": "10308", "MISSION_NAME": "CAP", "PLAYERS": ""}
        ]}"#;
        let source = listing_source(serve_once("200 OK", body).await);

        let state = reconcile(&identity("Alpha"), &source).await.unwrap();

        assert!(state.online);
        assert_eq!(state.remote.unwrap().raw_player_count, 5);
    }

    #[tokio::test]
    async fn test_malformed_target_in_listing_is_fatal() {
        let body = r#"{"MY_SERVERS": [{"NAME": "Alpha", "PLAYERS": "lots"}]}"#;
        let source = listing_source(serve_once("200 OK", body).await);

        let err = reconcile(&identity("Alpha"), &source).await.unwrap_err();
        assert!(err.to_string().contains("Failed to fetch server listing for Alpha"));
    }
}
