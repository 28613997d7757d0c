//! Tracked-product data model

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::shared::types::OwnerId;

/// A product registered for monitoring by one Telegram user.
///
/// (owner_id, url) is unique across the registry. `last_known_price` stays
/// `None` until the first successful fetch establishes a baseline; a fetch
/// failure never touches it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedProduct {
    pub owner_id: OwnerId,
    pub url: String,
    pub title: String,
    pub last_known_price: Option<Decimal>,
    #[serde(default)]
    pub available: bool,
    pub last_checked_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub consecutive_failures: u32,
    pub added_at: DateTime<Utc>,
}

impl TrackedProduct {
    /// Create a never-fetched product; the next scheduler cycle fills it in
    pub fn new(owner_id: OwnerId, url: String, title: String) -> Self {
        Self {
            owner_id,
            url,
            title,
            last_known_price: None,
            available: false,
            last_checked_at: None,
            consecutive_failures: 0,
            added_at: Utc::now(),
        }
    }
}

/// One fetch's extracted product data; folded into the TrackedProduct
/// and never persisted on its own
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSnapshot {
    pub price: Decimal,
    pub title: String,
    pub available: bool,
    pub fetched_at: DateTime<Utc>,
}

impl PriceSnapshot {
    pub fn new(price: Decimal, title: String, available: bool) -> Self {
        Self {
            price,
            title,
            available,
            fetched_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_product_has_no_baseline() {
        let product = TrackedProduct::new(42, "https://www.zalando.nl/x".into(), "X".into());
        assert_eq!(product.last_known_price, None);
        assert_eq!(product.last_checked_at, None);
        assert_eq!(product.consecutive_failures, 0);
        assert!(!product.available);
    }

    #[test]
    fn survives_serde_round_trip_with_missing_new_fields() {
        // records written before availability tracking existed
        let json = r#"{
            "owner_id": 1,
            "url": "https://www.zalando.nl/a",
            "title": "A",
            "last_known_price": "38.99",
            "last_checked_at": null,
            "added_at": "2024-01-01T00:00:00Z"
        }"#;
        let product: TrackedProduct = serde_json::from_str(json).unwrap();
        assert_eq!(product.last_known_price, Some("38.99".parse().unwrap()));
        assert_eq!(product.consecutive_failures, 0);
        assert!(!product.available);
    }
}
