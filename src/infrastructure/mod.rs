//! Infrastructure layer - durable store, Zalando fetcher, Telegram API

pub mod fetcher;
pub mod store;
pub mod telegram;

pub use fetcher::{ProductFetcher, ZalandoFetcher};
pub use store::JsonFileStore;
pub use telegram::{Notifier, TelegramApi};
