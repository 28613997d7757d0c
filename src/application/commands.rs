//! Structured bot commands and their handlers

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{error, info, warn};

use crate::application::messages;
use crate::domain::registry::ProductRegistry;
use crate::infrastructure::telegram::TelegramApi;
use crate::shared::errors::RegistryError;
use crate::shared::types::OwnerId;

const GENERIC_ERROR_REPLY: &str = "Sorry, something went wrong. Please try again.";
const UPDATE_POLL_TIMEOUT_SECS: u64 = 30;

/// A parsed user command; produced by the Telegram update loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    Add(String),
    List,
    Remove(String),
    Status,
}

impl Command {
    /// Parse a message text into a command. Returns None for ordinary chat
    /// messages; a bare Zalando URL is treated as `/add`.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let mut parts = text.split_whitespace();
        let head = parts.next()?;
        let arg = parts.next().map(str::to_string);

        match head {
            "/start" => Some(Self::Start),
            "/help" => Some(Self::Help),
            "/list" => Some(Self::List),
            "/status" => Some(Self::Status),
            "/add" => Some(Self::Add(arg.unwrap_or_default())),
            "/remove" => Some(Self::Remove(arg.unwrap_or_default())),
            _ if head.starts_with("https://www.zalando.nl/") => Some(Self::Add(head.to_string())),
            _ => None,
        }
    }
}

/// Maps structured commands to registry calls and reply texts
pub struct CommandHandler {
    registry: Arc<ProductRegistry>,
    check_interval_secs: u64,
}

impl CommandHandler {
    pub fn new(registry: Arc<ProductRegistry>, check_interval: Duration) -> Self {
        Self {
            registry,
            check_interval_secs: check_interval.as_secs(),
        }
    }

    pub async fn handle(&self, owner: OwnerId, command: Command) -> String {
        match command {
            Command::Start | Command::Help => messages::help_text(),
            Command::Add(url) if url.is_empty() => {
                "Please provide a Zalando.nl product URL\n\
                 Example: /add https://www.zalando.nl/product-url"
                    .to_string()
            }
            Command::Add(url) => self.add(owner, &url).await,
            Command::Remove(url) if url.is_empty() => {
                "Please provide the URL to remove\n\
                 Example: /remove https://www.zalando.nl/product-url"
                    .to_string()
            }
            Command::Remove(url) => self.remove(owner, &url).await,
            Command::List => self.list(owner).await,
            Command::Status => self.status(owner).await,
        }
    }

    async fn add(&self, owner: OwnerId, url: &str) -> String {
        match self.registry.add(owner, url).await {
            Ok(product) => messages::added_text(&product, self.check_interval_secs),
            Err(
                err @ (RegistryError::InvalidUrl(_)
                | RegistryError::Duplicate(_)
                | RegistryError::QuotaExceeded { .. }),
            ) => err.to_string(),
            Err(err) => {
                error!(owner, error = %err, "add failed");
                GENERIC_ERROR_REPLY.to_string()
            }
        }
    }

    async fn remove(&self, owner: OwnerId, url: &str) -> String {
        match self.registry.remove(owner, url).await {
            Ok(product) => messages::removed_text(&product),
            Err(err @ RegistryError::NotFound(_)) => err.to_string(),
            Err(err) => {
                error!(owner, error = %err, "remove failed");
                GENERIC_ERROR_REPLY.to_string()
            }
        }
    }

    async fn list(&self, owner: OwnerId) -> String {
        match self.registry.list(owner).await {
            Ok(products) => messages::list_text(&products),
            Err(err) => {
                error!(owner, error = %err, "list failed");
                GENERIC_ERROR_REPLY.to_string()
            }
        }
    }

    async fn status(&self, owner: OwnerId) -> String {
        match self.registry.count(owner).await {
            Ok(tracked) => messages::status_text(self.check_interval_secs, tracked),
            Err(err) => {
                error!(owner, error = %err, "status failed");
                GENERIC_ERROR_REPLY.to_string()
            }
        }
    }
}

/// Long-poll Telegram updates and dispatch commands until shutdown.
/// Runs beside the scheduler; both share the store through the registry.
pub async fn run_command_loop(
    api: Arc<TelegramApi>,
    handler: CommandHandler,
    mut shutdown: watch::Receiver<bool>,
) {
    info!("💬 command loop started");
    let mut offset = 0i64;

    loop {
        let updates = tokio::select! {
            result = api.get_updates(offset, UPDATE_POLL_TIMEOUT_SECS) => result,
            _ = shutdown.changed() => break,
        };

        let updates = match updates {
            Ok(updates) => updates,
            Err(err) => {
                warn!(error = %err, "update poll failed, backing off");
                tokio::select! {
                    _ = tokio::time::sleep(Duration::from_secs(5)) => continue,
                    _ = shutdown.changed() => break,
                }
            }
        };

        for update in updates {
            offset = offset.max(update.update_id + 1);
            let Some(message) = update.message else { continue };
            let Some(text) = message.text else { continue };
            let Some(command) = Command::parse(&text) else { continue };

            info!(chat_id = message.chat.id, ?command, "handling command");
            let reply = handler.handle(message.chat.id, command).await;
            if let Err(err) = api.send_message(message.chat.id, &reply).await {
                warn!(chat_id = message.chat.id, error = %err, "failed to send reply");
            }
        }
    }

    info!("💬 command loop stopped");
}
