//! Diff engine - turns (stored product, fresh snapshot) into change events

use rust_decimal::Decimal;

use crate::domain::product::{PriceSnapshot, TrackedProduct};
use crate::shared::types::OwnerId;

/// How a tracked product changed between two successful fetches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Increase,
    Decrease,
    BackInStock,
    OutOfStock,
}

/// A single user-visible change; consumed by notification delivery,
/// never persisted
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeEvent {
    pub owner_id: OwnerId,
    pub url: String,
    pub title: String,
    pub previous_price: Decimal,
    pub new_price: Decimal,
    pub kind: ChangeKind,
}

/// Applies snapshot state transitions and classifies changes.
///
/// Price comparison is exact decimal ordering; a price event and an
/// availability event may co-occur, so one fetch yields zero, one or two
/// events.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiffEngine;

impl DiffEngine {
    pub fn new() -> Self {
        Self
    }

    /// Fold a successful fetch into the product and return the resulting
    /// change events.
    ///
    /// The first successful fetch establishes the baseline and never emits
    /// an event. Every successful fetch resets the failure counter and
    /// refreshes price, title, availability and last_checked_at atomically.
    pub fn apply(&self, product: &mut TrackedProduct, snapshot: &PriceSnapshot) -> Vec<ChangeEvent> {
        let events = self.classify(product, snapshot);

        product.last_known_price = Some(snapshot.price);
        product.title = snapshot.title.clone();
        product.available = snapshot.available;
        product.last_checked_at = Some(snapshot.fetched_at);
        product.consecutive_failures = 0;

        events
    }

    /// Record a failed fetch: only the failure counter moves, the stored
    /// price is never corrupted by a failure. Returns the new counter value.
    pub fn record_failure(&self, product: &mut TrackedProduct) -> u32 {
        product.consecutive_failures += 1;
        product.consecutive_failures
    }

    fn classify(&self, product: &TrackedProduct, snapshot: &PriceSnapshot) -> Vec<ChangeEvent> {
        // no baseline yet
        let Some(previous_price) = product.last_known_price else {
            return Vec::new();
        };

        let mut events = Vec::new();
        let mut push = |kind| {
            events.push(ChangeEvent {
                owner_id: product.owner_id,
                url: product.url.clone(),
                title: snapshot.title.clone(),
                previous_price,
                new_price: snapshot.price,
                kind,
            });
        };

        if snapshot.price < previous_price {
            push(ChangeKind::Decrease);
        } else if snapshot.price > previous_price {
            push(ChangeKind::Increase);
        }

        if !product.available && snapshot.available {
            push(ChangeKind::BackInStock);
        } else if product.available && !snapshot.available {
            push(ChangeKind::OutOfStock);
        }

        events
    }
}
