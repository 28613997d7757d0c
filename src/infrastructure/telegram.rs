//! Telegram Bot API client - notification delivery and update polling

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use crate::shared::errors::TelegramError;
use crate::shared::types::OwnerId;

/// Outbound message delivery. Fire-and-forget from the core's perspective:
/// a user who blocked the bot is the collaborator's problem, not a retry
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, chat_id: OwnerId, text: &str);
}

/// An inbound update from `getUpdates` long polling
#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub chat: Chat,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

/// Thin client over the Bot HTTP API
pub struct TelegramApi {
    client: reqwest::Client,
    base_url: String,
}

impl TelegramApi {
    pub fn new(token: &str) -> Result<Self, reqwest::Error> {
        // long poll timeout + margin
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(40))
            .build()?;
        Ok(Self {
            client,
            base_url: format!("https://api.telegram.org/bot{token}"),
        })
    }

    async fn call<T: serde::de::DeserializeOwned>(
        &self,
        method: &str,
        payload: serde_json::Value,
    ) -> Result<T, TelegramError> {
        let response = self
            .client
            .post(format!("{}/{}", self.base_url, method))
            .json(&payload)
            .send()
            .await?;

        let parsed: ApiResponse<T> = response.json().await?;
        match (parsed.ok, parsed.result) {
            (true, Some(result)) => Ok(result),
            _ => Err(TelegramError::Api(
                parsed
                    .description
                    .unwrap_or_else(|| format!("{method} returned no result")),
            )),
        }
    }

    pub async fn send_message(&self, chat_id: OwnerId, text: &str) -> Result<(), TelegramError> {
        let _: Message = self
            .call(
                "sendMessage",
                json!({ "chat_id": chat_id, "text": text }),
            )
            .await?;
        debug!(chat_id, "message sent");
        Ok(())
    }

    /// Long-poll for updates past `offset`; blocks up to `timeout_secs`
    pub async fn get_updates(
        &self,
        offset: i64,
        timeout_secs: u64,
    ) -> Result<Vec<Update>, TelegramError> {
        self.call(
            "getUpdates",
            json!({
                "offset": offset,
                "timeout": timeout_secs,
                "allowed_updates": ["message"],
            }),
        )
        .await
    }
}

#[async_trait]
impl Notifier for TelegramApi {
    async fn notify(&self, chat_id: OwnerId, text: &str) {
        if let Err(err) = self.send_message(chat_id, text).await {
            warn!(chat_id, error = %err, "failed to deliver notification");
        }
    }
}
