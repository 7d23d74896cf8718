//! In-process [`DocumentStore`] backed by `tokio::sync::RwLock<HashMap>`.
//!
//! Used when no `DATABASE_URL` is configured and as the test backend.
//! Every write takes the collection map's write lock, which makes each
//! single-document update atomic.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use collab_core::types::{DocId, Timestamp};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{apply_updates, Body, Document, DocumentStore, FieldUpdate, Filter, Query, StoreError};

#[derive(Default)]
struct Inner {
    collections: HashMap<String, HashMap<DocId, Document>>,
    /// Last assigned `created_at`; later inserts are strictly newer.
    last_created_at: Option<Timestamp>,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents in `collection`.
    pub async fn count(&self, collection: &str) -> usize {
        self.inner
            .read()
            .await
            .collections
            .get(collection)
            .map_or(0, HashMap::len)
    }
}

impl Inner {
    fn next_created_at(&mut self) -> Timestamp {
        let now = Utc::now();
        let ts = match self.last_created_at {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        self.last_created_at = Some(ts);
        ts
    }
}

fn not_found(collection: &str, id: &str) -> StoreError {
    StoreError::NotFound {
        collection: collection.to_string(),
        id: id.to_string(),
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn insert(&self, collection: &str, body: Body) -> Result<Document, StoreError> {
        let mut inner = self.inner.write().await;
        let doc = Document {
            id: Uuid::now_v7().to_string(),
            created_at: inner.next_created_at(),
            body,
        };
        inner
            .collections
            .entry(collection.to_string())
            .or_default()
            .insert(doc.id.clone(), doc.clone());
        Ok(doc)
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .collections
            .get(collection)
            .and_then(|docs| docs.get(id))
            .cloned())
    }

    async fn query(&self, collection: &str, query: &Query) -> Result<Vec<Document>, StoreError> {
        let inner = self.inner.read().await;
        let mut docs: Vec<Document> = inner
            .collections
            .get(collection)
            .map(|docs| docs.values().filter(|d| query.matches(d)).cloned().collect())
            .unwrap_or_default();
        query.finish(&mut docs);
        Ok(docs)
    }

    async fn update_where(
        &self,
        collection: &str,
        id: &str,
        conditions: &[Filter],
        updates: &[FieldUpdate],
    ) -> Result<bool, StoreError> {
        let mut inner = self.inner.write().await;
        let doc = inner
            .collections
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(id))
            .ok_or_else(|| not_found(collection, id))?;

        if !conditions.iter().all(|c| c.matches(&doc.body)) {
            return Ok(false);
        }
        apply_updates(&mut doc.body, updates, Utc::now());
        Ok(true)
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        if let Some(docs) = inner.collections.get_mut(collection) {
            docs.remove(id);
        }
        Ok(())
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
