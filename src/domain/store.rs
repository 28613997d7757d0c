//! State-store interface consumed by the registry and the scheduler

use async_trait::async_trait;

use crate::domain::product::TrackedProduct;
use crate::shared::errors::StoreError;
use crate::shared::types::OwnerId;

/// Durable mapping keyed by (owner, url), safe for concurrent access from
/// the command path and the scheduler. Implementations must preserve
/// insertion order within an owner.
#[async_trait]
pub trait ProductStore: Send + Sync {
    async fn get(&self, owner: OwnerId, url: &str) -> Result<Option<TrackedProduct>, StoreError>;

    /// Insert a new record; the caller guarantees (owner, url) is not present
    async fn insert(&self, product: TrackedProduct) -> Result<(), StoreError>;

    /// Overwrite an existing record in place. Returns false without writing
    /// when the record is gone, so a diff result for a product removed
    /// during its in-flight fetch is silently discarded.
    async fn update_if_present(&self, product: &TrackedProduct) -> Result<bool, StoreError>;

    async fn remove(&self, owner: OwnerId, url: &str)
        -> Result<Option<TrackedProduct>, StoreError>;

    /// Products of one owner, in insertion order
    async fn list_owner(&self, owner: OwnerId) -> Result<Vec<TrackedProduct>, StoreError>;

    /// Every tracked product, in global insertion order
    async fn list_all(&self) -> Result<Vec<TrackedProduct>, StoreError>;

    async fn count_all(&self) -> Result<usize, StoreError>;
}
