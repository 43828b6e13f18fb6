//! Ephemeral projects for guest checkout.
//!
//! A guest checkout parks its cards here between creating the payment intent
//! and confirming it. Entries expire on their own; nothing is persisted.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use moka::future::Cache;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::document::Card;
use crate::layout::CardsPerPage;
use crate::payment::Plan;

pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);
const DEFAULT_CAPACITY: u64 = 10_000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TempProject {
    pub email: Option<String>,
    pub plan: Plan,
    pub template: String,
    pub cards_per_page: CardsPerPage,
    pub signer_names: Option<String>,
    pub cards: Vec<Card>,
    pub created_at: DateTime<Utc>,
}

#[async_trait]
pub trait TempProjectStore: Send + Sync {
    async fn put(&self, key: String, project: TempProject);

    async fn get(&self, key: &str) -> Option<TempProject>;

    async fn delete(&self, key: &str);

    /// Remove and return the entry; a second call yields `None`.
    async fn take(&self, key: &str) -> Option<TempProject>;
}

#[derive(Clone)]
pub struct MokaTempProjectStore {
    cache: Cache<String, TempProject>,
}

impl MokaTempProjectStore {
    pub fn new(ttl: Duration) -> Self {
        Self::with_capacity(ttl, DEFAULT_CAPACITY)
    }

    pub fn with_capacity(ttl: Duration, max_capacity: u64) -> Self {
        let cache = Cache::builder()
            .time_to_live(ttl)
            .max_capacity(max_capacity)
            .build();
        Self { cache }
    }
}

impl Default for MokaTempProjectStore {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

#[async_trait]
impl TempProjectStore for MokaTempProjectStore {
    async fn put(&self, key: String, project: TempProject) {
        log::debug!("Storing temp project {} ({} cards)", key, project.cards.len());
        self.cache.insert(key, project).await;
    }

    async fn get(&self, key: &str) -> Option<TempProject> {
        self.cache.get(key).await
    }

    async fn delete(&self, key: &str) {
        self.cache.invalidate(key).await;
    }

    async fn take(&self, key: &str) -> Option<TempProject> {
        self.cache.remove(key).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project() -> TempProject {
        TempProject {
            email: Some("guest@example.com".into()),
            plan: Plan::Starter,
            template: "classic".into(),
            cards_per_page: CardsPerPage::Four,
            signer_names: None,
            cards: vec![Card::new("Ann", Some("Vase"), "Thanks!")],
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_take_returns_once() {
        let store = MokaTempProjectStore::default();
        store.put("pi_1".into(), project()).await;

        assert!(store.take("pi_1").await.is_some());
        assert!(store.take("pi_1").await.is_none());
    }

    #[tokio::test]
    async fn test_get_does_not_consume() {
        let store = MokaTempProjectStore::default();
        store.put("pi_2".into(), project()).await;

        assert!(store.get("pi_2").await.is_some());
        assert!(store.get("pi_2").await.is_some());
        store.delete("pi_2").await;
        assert!(store.get("pi_2").await.is_none());
    }

    #[tokio::test]
    async fn test_entries_expire() {
        let store = MokaTempProjectStore::new(Duration::from_millis(50));
        store.put("pi_3".into(), project()).await;
        tokio::time::sleep(Duration::from_millis(150)).await;

        assert!(store.get("pi_3").await.is_none());
    }
}
