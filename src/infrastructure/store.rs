//! JSON-file backed product store

use std::fs;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::domain::product::TrackedProduct;
use crate::domain::store::ProductStore;
use crate::shared::errors::StoreError;
use crate::shared::types::OwnerId;

/// Durable store holding every tracked product in a single JSON file
/// (default `data/products.json`).
///
/// The whole state lives in memory behind an RwLock; every mutation is
/// written back through a temp file + rename so a crash mid-write never
/// truncates the previous state. Records keep global insertion order.
pub struct JsonFileStore {
    path: PathBuf,
    products: RwLock<Vec<TrackedProduct>>,
}

impl JsonFileStore {
    /// Load existing state from `path`, creating the data directory and an
    /// empty store when the file does not exist yet
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let products = if path.exists() {
            let raw = fs::read_to_string(&path)?;
            serde_json::from_str(&raw)?
        } else {
            Vec::new()
        };

        info!(path = %path.display(), products = products.len(), "💾 product store loaded");
        Ok(Self {
            path,
            products: RwLock::new(products),
        })
    }

    /// Blocking file I/O goes to the blocking pool so a slow disk never
    /// stalls the runtime, even though the write guard stays held
    async fn persist(&self, products: &[TrackedProduct]) -> Result<(), StoreError> {
        let raw = serde_json::to_string_pretty(products)?;
        let path = self.path.clone();
        let tmp = path.with_extension("json.tmp");

        let written = tokio::task::spawn_blocking(move || {
            fs::write(&tmp, raw)?;
            fs::rename(&tmp, &path)
        })
        .await
        .map_err(|err| std::io::Error::new(std::io::ErrorKind::Other, err))?;
        written?;

        debug!(path = %self.path.display(), "store persisted");
        Ok(())
    }
}

fn position(products: &[TrackedProduct], owner: OwnerId, url: &str) -> Option<usize> {
    products
        .iter()
        .position(|p| p.owner_id == owner && p.url == url)
}

#[async_trait]
impl ProductStore for JsonFileStore {
    async fn get(&self, owner: OwnerId, url: &str) -> Result<Option<TrackedProduct>, StoreError> {
        let products = self.products.read().await;
        Ok(position(&products, owner, url).map(|i| products[i].clone()))
    }

    async fn insert(&self, product: TrackedProduct) -> Result<(), StoreError> {
        let mut products = self.products.write().await;
        products.push(product);
        self.persist(&products).await
    }

    async fn update_if_present(&self, product: &TrackedProduct) -> Result<bool, StoreError> {
        let mut products = self.products.write().await;
        match position(&products, product.owner_id, &product.url) {
            Some(i) => {
                products[i] = product.clone();
                self.persist(&products).await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn remove(
        &self,
        owner: OwnerId,
        url: &str,
    ) -> Result<Option<TrackedProduct>, StoreError> {
        let mut products = self.products.write().await;
        match position(&products, owner, url) {
            Some(i) => {
                let removed = products.remove(i);
                self.persist(&products).await?;
                Ok(Some(removed))
            }
            None => Ok(None),
        }
    }

    async fn list_owner(&self, owner: OwnerId) -> Result<Vec<TrackedProduct>, StoreError> {
        let products = self.products.read().await;
        Ok(products
            .iter()
            .filter(|p| p.owner_id == owner)
            .cloned()
            .collect())
    }

    async fn list_all(&self) -> Result<Vec<TrackedProduct>, StoreError> {
        Ok(self.products.read().await.clone())
    }

    async fn count_all(&self) -> Result<usize, StoreError> {
        Ok(self.products.read().await.len())
    }
}
