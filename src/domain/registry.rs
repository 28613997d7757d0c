//! Product registry - add/remove/list lifecycle and validation gate

use std::sync::Arc;

use tracing::info;
use url::Url;

use crate::domain::product::TrackedProduct;
use crate::domain::store::ProductStore;
use crate::shared::errors::{RegistryError, StoreError};
use crate::shared::types::OwnerId;

const PRODUCT_HOST: &str = "www.zalando.nl";

/// Owns creation and deletion of tracked products. The scheduler only ever
/// updates existing records through the store.
pub struct ProductRegistry {
    store: Arc<dyn ProductStore>,
    /// 0 = unlimited
    max_per_owner: usize,
}

impl ProductRegistry {
    pub fn new(store: Arc<dyn ProductStore>, max_per_owner: usize) -> Self {
        Self {
            store,
            max_per_owner,
        }
    }

    /// Register a product for monitoring. Deliberately does not fetch; the
    /// next scheduler cycle establishes the price baseline, keeping the
    /// command path non-blocking.
    pub async fn add(&self, owner: OwnerId, url: &str) -> Result<TrackedProduct, RegistryError> {
        let url = validate_product_url(url)?;

        if self.store.get(owner, &url).await?.is_some() {
            return Err(RegistryError::Duplicate(url));
        }

        if self.max_per_owner > 0 {
            let tracked = self.store.list_owner(owner).await?.len();
            if tracked >= self.max_per_owner {
                return Err(RegistryError::QuotaExceeded {
                    limit: self.max_per_owner,
                });
            }
        }

        let product = TrackedProduct::new(owner, url.clone(), title_from_url(&url));
        self.store.insert(product.clone()).await?;
        info!(owner, url = %url, "📦 product added to monitoring");
        Ok(product)
    }

    pub async fn remove(&self, owner: OwnerId, url: &str) -> Result<TrackedProduct, RegistryError> {
        // match against the normalized form that `add` stored, so the exact
        // spelling the user typed works in both directions
        let url = validate_product_url(url).unwrap_or_else(|_| url.to_string());
        let url = url.as_str();
        match self.store.remove(owner, url).await? {
            Some(product) => {
                info!(owner, url, "🗑️ product removed from monitoring");
                Ok(product)
            }
            None => Err(RegistryError::NotFound(url.to_string())),
        }
    }

    /// Read-only view of one owner's products, in the order they were added
    pub async fn list(&self, owner: OwnerId) -> Result<Vec<TrackedProduct>, StoreError> {
        self.store.list_owner(owner).await
    }

    pub async fn count(&self, owner: OwnerId) -> Result<usize, StoreError> {
        Ok(self.store.list_owner(owner).await?.len())
    }

    pub async fn count_all(&self) -> Result<usize, StoreError> {
        self.store.count_all().await
    }
}

/// Accept only product pages on the target shop, normalised to the parsed
/// form so duplicates can't hide behind trivial spelling differences
fn validate_product_url(raw: &str) -> Result<String, RegistryError> {
    let parsed = Url::parse(raw).map_err(|_| RegistryError::InvalidUrl(raw.to_string()))?;

    let https = matches!(parsed.scheme(), "http" | "https");
    let right_host = parsed.host_str() == Some(PRODUCT_HOST);
    if !https || !right_host {
        return Err(RegistryError::InvalidUrl(raw.to_string()));
    }

    Ok(parsed.to_string())
}

/// Placeholder title shown until the first fetch brings the real one
fn title_from_url(url: &str) -> String {
    let slug = url
        .rsplit('/')
        .next()
        .unwrap_or(url)
        .trim_end_matches(".html");
    let pretty = slug.replace('-', " ").trim().to_string();
    if pretty.is_empty() {
        url.to_string()
    } else {
        pretty
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::store::JsonFileStore;

    fn registry(max_per_owner: usize) -> (ProductRegistry, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path().join("products.json")).unwrap();
        (
            ProductRegistry::new(Arc::new(store), max_per_owner),
            dir,
        )
    }

    const URL_A: &str = "https://www.zalando.nl/nike-air-max-90-sneakers-ni112o0bt-a11.html";
    const URL_B: &str = "https://www.zalando.nl/adidas-samba-og-sneakers-ad115o0g4-a11.html";

    #[tokio::test]
    async fn add_creates_product_without_baseline() {
        let (registry, _dir) = registry(0);
        let product = registry.add(1, URL_A).await.unwrap();
        assert_eq!(product.last_known_price, None);
        assert_eq!(product.title, "nike air max 90 sneakers ni112o0bt a11");
    }

    #[tokio::test]
    async fn add_rejects_foreign_and_malformed_urls() {
        let (registry, _dir) = registry(0);
        for bad in [
            "https://www.amazon.nl/some-product",
            "https://zalando.nl/missing-www.html",
            "not a url",
            "ftp://www.zalando.nl/x.html",
        ] {
            assert!(matches!(
                registry.add(1, bad).await,
                Err(RegistryError::InvalidUrl(_))
            ));
        }
    }

    #[tokio::test]
    async fn add_twice_is_a_duplicate() {
        let (registry, _dir) = registry(0);
        registry.add(1, URL_A).await.unwrap();
        assert!(matches!(
            registry.add(1, URL_A).await,
            Err(RegistryError::Duplicate(_))
        ));
        // a different owner may track the same url
        registry.add(2, URL_A).await.unwrap();
    }

    #[tokio::test]
    async fn quota_caps_products_per_owner() {
        let (registry, _dir) = registry(1);
        registry.add(1, URL_A).await.unwrap();
        assert!(matches!(
            registry.add(1, URL_B).await,
            Err(RegistryError::QuotaExceeded { limit: 1 })
        ));
    }

    #[tokio::test]
    async fn remove_then_list_no_longer_includes_product() {
        let (registry, _dir) = registry(0);
        registry.add(1, URL_A).await.unwrap();
        registry.add(1, URL_B).await.unwrap();

        registry.remove(1, URL_A).await.unwrap();
        let urls: Vec<_> = registry
            .list(1)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.url)
            .collect();
        assert_eq!(urls, vec![URL_B.to_string()]);

        assert!(matches!(
            registry.remove(1, URL_A).await,
            Err(RegistryError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn remove_accepts_the_same_spelling_used_to_add() {
        let (registry, _dir) = registry(0);
        // parses to a different string: default port dropped, host lowercased
        let spelled = "https://WWW.ZALANDO.NL:443/nike-air-max-90-ni112o0bt-a11.html";

        registry.add(1, spelled).await.unwrap();
        registry.remove(1, spelled).await.unwrap();
        assert!(registry.list(1).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn list_preserves_insertion_order() {
        let (registry, _dir) = registry(0);
        registry.add(1, URL_B).await.unwrap();
        registry.add(1, URL_A).await.unwrap();

        let urls: Vec<_> = registry
            .list(1)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.url)
            .collect();
        assert_eq!(urls, vec![URL_B.to_string(), URL_A.to_string()]);
    }
}
