use anyhow::{Result, anyhow};
use serde::Deserialize;
use tracing::{error, info};

use crate::models::ServerIdentity;
use crate::publisher::publish;
use crate::reconciler::reconcile;
use crate::render::render;
use crate::traits::{ChatClient, StatusSource};

/// Text of a freshly created status message, replaced by the first run
pub const INITIAL_MESSAGE: &str = "Initial message";

/// What a run does when one server's pipeline fails
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FailurePolicy {
    /// Stop at the first failing server
    #[default]
    AbortOnFirst,
    /// Keep going and report every failed server at the end
    Isolate,
}

pub struct StatusBot<S, C> {
    source: S,
    chat: C,
    servers: Vec<ServerIdentity>,
    policy: FailurePolicy,
}

impl<S, C> StatusBot<S, C>
where
    S: StatusSource,
    C: ChatClient,
{
    pub fn new(source: S, chat: C, servers: Vec<ServerIdentity>, policy: FailurePolicy) -> Self {
        Self {
            source,
            chat,
            servers,
            policy,
        }
    }

    pub async fn update_server(&self, identity: &ServerIdentity) -> Result<()> {
        let state = reconcile(identity, &self.source).await?;
        let embed = render(&state);
        publish(&self.chat, &identity.channel_id, &identity.message_id, &embed).await
    }

    pub async fn run(&self) -> Result<()> {
        let mut failed = Vec::new();

        for identity in &self.servers {
            info!("Updating status of {}", identity.name);

            if let Err(e) = self.update_server(identity).await {
                match self.policy {
                    FailurePolicy::AbortOnFirst => {
                        error!("Failed to update {}: {:#}", identity.name, e);
                        return Err(e);
                    }
                    FailurePolicy::Isolate => {
                        error!("Failed to update {}: {:#}", identity.name, e);
                        failed.push(identity.name.as_str());
                    }
                }
            }
        }

        if !failed.is_empty() {
            return Err(anyhow!(
                "Failed to update {} of {} servers: {}",
                failed.len(),
                self.servers.len(),
                failed.join(", ")
            ));
        }

        info!("Server status update finished");
        Ok(())
    }
}

/// Post placeholder messages for the bot to take over, returning their ids.
pub async fn create_messages<C>(chat: &C, channel_id: &str, count: usize) -> Result<Vec<String>>
where
    C: ChatClient + ?Sized,
{
    let mut ids = Vec::with_capacity(count);
    for _ in 0..count {
        let message = chat.send_message(channel_id, INITIAL_MESSAGE).await?;
        info!("Created status message {}", message.id);
        ids.push(message.id);
    }
    Ok(ids)
}
