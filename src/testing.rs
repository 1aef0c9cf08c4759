//! In-memory fakes and a one-shot HTTP responder shared by the tests

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use crate::models::{
    ChatMessage, EmbedStyle, LocalStatusSnapshot, Player, RemoteServerFact, RenderedEmbed,
    ServerIdentity, VersionInfo,
};
use crate::traits::{ChatClient, StatusSource};

pub fn identity(name: &str) -> ServerIdentity {
    ServerIdentity {
        name: name.to_string(),
        channel_id: "channel-1".to_string(),
        message_id: format!("message-{name}"),
        address: None,
        thumbnail: None,
        status_file: None,
        install_dir: None,
        style: EmbedStyle::Status,
    }
}

pub fn remote_fact(name: &str, players: u32) -> RemoteServerFact {
    RemoteServerFact {
        name: name.to_string(),
        ip: "203.0.113.7".to_string(),
        port: "10308".to_string(),
        mission_name: "Caucasus CAS".to_string(),
        raw_player_count: players,
        max_players: None,
        password_protected: false,
    }
}

pub fn snapshot(players: &[(&str, &str, &str)]) -> LocalStatusSnapshot {
    LocalStatusSnapshot {
        players: players
            .iter()
            .map(|(id, name, role)| {
                (
                    (*id).to_string(),
                    Player {
                        name: (*name).to_string(),
                        role: (*role).to_string(),
                        online_time: None,
                    },
                )
            })
            .collect(),
        ..LocalStatusSnapshot::default()
    }
}

/// Status source whose missing pieces fail like an unreadable file would
pub struct FakeSource {
    servers: Option<Vec<RemoteServerFact>>,
    local: Option<LocalStatusSnapshot>,
    version: Option<VersionInfo>,
    local_reads: AtomicUsize,
}

impl FakeSource {
    pub fn with_servers(servers: Vec<RemoteServerFact>) -> Self {
        Self {
            servers: Some(servers),
            local: None,
            version: None,
            local_reads: AtomicUsize::new(0),
        }
    }

    pub fn failing_fetch() -> Self {
        Self {
            servers: None,
            ..Self::with_servers(Vec::new())
        }
    }

    pub fn local(mut self, snapshot: LocalStatusSnapshot) -> Self {
        self.local = Some(snapshot);
        self
    }

    pub fn version(mut self, branch: &str, version: &str) -> Self {
        self.version = Some(VersionInfo {
            branch: branch.to_string(),
            version: version.to_string(),
        });
        self
    }

    pub fn local_reads(&self) -> usize {
        self.local_reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StatusSource for FakeSource {
    async fn fetch_server(&self, name: &str) -> Result<Option<RemoteServerFact>> {
        let servers = self
            .servers
            .as_ref()
            .ok_or_else(|| anyhow!("connection refused"))?;
        Ok(servers.iter().find(|s| s.name == name).cloned())
    }

    async fn read_local_status(&self, path: &Path) -> Result<LocalStatusSnapshot> {
        self.local_reads.fetch_add(1, Ordering::SeqCst);
        self.local
            .clone()
            .ok_or_else(|| anyhow!("No such file: {}", path.display()))
    }

    async fn read_version(&self, install_dir: &Path) -> Result<VersionInfo> {
        self.version
            .clone()
            .ok_or_else(|| anyhow!("No version file in {}", install_dir.display()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCall {
    EditEmbed { message_id: String, title: String },
    EditText { message_id: String, text: String },
    Send { channel_id: String, text: String },
}

/// Chat backend that keeps message text in memory and records every call
#[derive(Default)]
pub struct FakeChat {
    contents: Mutex<HashMap<String, String>>,
    embeds: Mutex<HashMap<String, RenderedEmbed>>,
    calls: Mutex<Vec<ChatCall>>,
    fail_embed_edits: bool,
    fail_text_edits: bool,
}

impl FakeChat {
    pub fn with_message(message_id: &str, content: &str) -> Self {
        let chat = Self::default();
        chat.contents
            .lock()
            .unwrap()
            .insert(message_id.to_string(), content.to_string());
        chat
    }

    pub fn failing_embed_edits(mut self) -> Self {
        self.fail_embed_edits = true;
        self
    }

    pub fn failing_text_edits(mut self) -> Self {
        self.fail_text_edits = true;
        self
    }

    pub fn calls(&self) -> Vec<ChatCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn content(&self, message_id: &str) -> Option<String> {
        self.contents.lock().unwrap().get(message_id).cloned()
    }

    pub fn embed(&self, message_id: &str) -> Option<RenderedEmbed> {
        self.embeds.lock().unwrap().get(message_id).cloned()
    }

    fn message(&self, channel_id: &str, message_id: &str) -> ChatMessage {
        ChatMessage {
            id: message_id.to_string(),
            channel_id: channel_id.to_string(),
            content: self.content(message_id).unwrap_or_default(),
        }
    }
}

#[async_trait]
impl ChatClient for FakeChat {
    async fn edit_embed(
        &self,
        channel_id: &str,
        message_id: &str,
        embed: &RenderedEmbed,
    ) -> Result<ChatMessage> {
        self.calls.lock().unwrap().push(ChatCall::EditEmbed {
            message_id: message_id.to_string(),
            title: embed.title.clone(),
        });
        if self.fail_embed_edits {
            return Err(anyhow!("403 Forbidden"));
        }

        self.embeds
            .lock()
            .unwrap()
            .insert(message_id.to_string(), embed.clone());
        Ok(self.message(channel_id, message_id))
    }

    async fn edit_text(
        &self,
        channel_id: &str,
        message_id: &str,
        text: &str,
    ) -> Result<ChatMessage> {
        self.calls.lock().unwrap().push(ChatCall::EditText {
            message_id: message_id.to_string(),
            text: text.to_string(),
        });
        if self.fail_text_edits {
            return Err(anyhow!("403 Forbidden"));
        }

        self.contents
            .lock()
            .unwrap()
            .insert(message_id.to_string(), text.to_string());
        Ok(self.message(channel_id, message_id))
    }

    async fn send_message(&self, channel_id: &str, text: &str) -> Result<ChatMessage> {
        self.calls.lock().unwrap().push(ChatCall::Send {
            channel_id: channel_id.to_string(),
            text: text.to_string(),
        });

        let message_id = "1000".to_string();
        self.contents
            .lock()
            .unwrap()
            .insert(message_id.clone(), text.to_string());
        Ok(self.message(channel_id, &message_id))
    }
}

/// Answer one HTTP request on a local port with a canned response.
///
/// Returns the base URL to point a client at.
pub async fn serve_once(status: &str, body: &str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let response = format!(
        "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();

        // Drain the request (headers plus declared body) before answering
        let mut request = Vec::new();
        let mut buf = [0u8; 4096];
        loop {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);

            if let Some(end) = request.windows(4).position(|w| w == b"\r\n\r\n") {
                let headers = String::from_utf8_lossy(&request[..end]).to_lowercase();
                let content_length = headers
                    .lines()
                    .find_map(|line| line.strip_prefix("content-length:"))
                    .and_then(|value| value.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if request.len() >= end + 4 + content_length {
                    break;
                }
            }
        }

        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();
    });

    format!("http://{addr}")
}
