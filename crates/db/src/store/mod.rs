//! Document store abstraction.
//!
//! A [`DocumentStore`] holds JSON documents grouped into named collections.
//! Every document gets a store-assigned id and an immutable `created_at`.
//! Updates are expressed as [`FieldUpdate`] lists that the backend applies
//! atomically to a single document; array union/remove are the only safe
//! way to change a shared membership list.

pub mod memory;
pub mod postgres;

use std::cmp::Ordering;

use async_trait::async_trait;
use collab_core::error::CoreError;
use collab_core::types::{DocId, Timestamp};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

pub use memory::MemoryStore;
pub use postgres::PgDocumentStore;

/// JSON object body of a document.
pub type Body = Map<String, Value>;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Document not found: {collection}/{id}")]
    NotFound { collection: String, id: DocId },

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                Self::Unavailable(err.to_string())
            }
            other => Self::Database(other),
        }
    }
}

impl From<StoreError> for CoreError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { collection, id } => CoreError::NotFound {
                entity: entity_name(&collection),
                id,
            },
            StoreError::Unavailable(msg) => CoreError::Unavailable(msg),
            StoreError::Serialization(e) => CoreError::Internal(e.to_string()),
            StoreError::Database(e) => CoreError::Internal(e.to_string()),
        }
    }
}

fn entity_name(collection: &str) -> &'static str {
    match collection {
        crate::collections::NOTIFICATIONS => "Notification",
        crate::collections::PROJECTS => "Project",
        _ => "Document",
    }
}

// ---------------------------------------------------------------------------
// Documents
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: DocId,
    pub created_at: Timestamp,
    pub body: Body,
}

impl Document {
    /// Deserialize the body into a record type.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, StoreError> {
        Ok(serde_json::from_value(Value::Object(self.body.clone()))?)
    }
}

/// Serialize a record into a document body.
pub fn encode<T: serde::Serialize>(record: &T) -> Result<Body, StoreError> {
    match serde_json::to_value(record)? {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::Serialization(serde::ser::Error::custom(
            format!("expected a JSON object, got {other}"),
        ))),
    }
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// A predicate on a top-level body field.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// `body[field] == value`
    Eq(String, Value),
    /// `body[field]` is an array containing `value`.
    ArrayContains(String, Value),
}

impl Filter {
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Eq(field.into(), value.into())
    }

    pub fn array_contains(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::ArrayContains(field.into(), value.into())
    }

    pub fn matches(&self, body: &Body) -> bool {
        match self {
            Self::Eq(field, value) => body.get(field).unwrap_or(&Value::Null) == value,
            Self::ArrayContains(field, value) => body
                .get(field)
                .and_then(Value::as_array)
                .is_some_and(|items| items.contains(value)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderKey {
    CreatedAt,
    Field(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub key: OrderKey,
    pub direction: Direction,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub filters: Vec<Filter>,
    pub order: Option<Order>,
    pub limit: Option<usize>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn order_by(mut self, key: OrderKey, direction: Direction) -> Self {
        self.order = Some(Order { key, direction });
        self
    }

    pub fn newest_first(self) -> Self {
        self.order_by(OrderKey::CreatedAt, Direction::Desc)
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn matches(&self, doc: &Document) -> bool {
        self.filters.iter().all(|f| f.matches(&doc.body))
    }

    /// Sort and truncate an already-filtered result set in place.
    ///
    /// Ties are broken by id so results are deterministic.
    pub fn finish(&self, docs: &mut Vec<Document>) {
        if let Some(order) = &self.order {
            docs.sort_by(|a, b| {
                let ord = match &order.key {
                    OrderKey::CreatedAt => a.created_at.cmp(&b.created_at),
                    OrderKey::Field(f) => compare_values(a.body.get(f), b.body.get(f)),
                }
                .then_with(|| a.id.cmp(&b.id));
                match order.direction {
                    Direction::Asc => ord,
                    Direction::Desc => ord.reverse(),
                }
            });
        }
        if let Some(limit) = self.limit {
            docs.truncate(limit);
        }
    }
}

/// Orders missing < null < bool < number < string; other types compare equal.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    fn rank(v: Option<&Value>) -> u8 {
        match v {
            None => 0,
            Some(Value::Null) => 1,
            Some(Value::Bool(_)) => 2,
            Some(Value::Number(_)) => 3,
            Some(Value::String(_)) => 4,
            Some(_) => 5,
        }
    }
    match (a, b) {
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}

// ---------------------------------------------------------------------------
// Updates
// ---------------------------------------------------------------------------

/// One field-level change applied as part of an atomic document update.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldUpdate {
    Set(String, Value),
    /// Append each value not already present. Never creates duplicates.
    ArrayUnion(String, Vec<Value>),
    /// Remove every occurrence of each value.
    ArrayRemove(String, Vec<Value>),
    /// Set the field to the store's current time (RFC 3339).
    ServerTimestamp(String),
}

impl FieldUpdate {
    pub fn set(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Set(field.into(), value.into())
    }

    pub fn array_union(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::ArrayUnion(field.into(), vec![value.into()])
    }

    pub fn array_remove(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::ArrayRemove(field.into(), vec![value.into()])
    }

    pub fn server_timestamp(field: impl Into<String>) -> Self {
        Self::ServerTimestamp(field.into())
    }
}

/// Apply `updates` to `body` in order. Backends call this while holding
/// whatever lock makes the document update atomic.
pub fn apply_updates(body: &mut Body, updates: &[FieldUpdate], now: Timestamp) {
    for update in updates {
        match update {
            FieldUpdate::Set(field, value) => {
                body.insert(field.clone(), value.clone());
            }
            FieldUpdate::ArrayUnion(field, values) => {
                let mut items = take_array(body, field);
                for value in values {
                    if !items.contains(value) {
                        items.push(value.clone());
                    }
                }
                body.insert(field.clone(), Value::Array(items));
            }
            FieldUpdate::ArrayRemove(field, values) => {
                let mut items = take_array(body, field);
                items.retain(|item| !values.contains(item));
                body.insert(field.clone(), Value::Array(items));
            }
            FieldUpdate::ServerTimestamp(field) => {
                body.insert(field.clone(), Value::String(now.to_rfc3339()));
            }
        }
    }
}

/// Remove the array stored at `field`; any non-array value counts as empty.
fn take_array(body: &mut Body, field: &str) -> Vec<Value> {
    match body.remove(field) {
        Some(Value::Array(items)) => items,
        _ => Vec::new(),
    }
}

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// Multi-collection JSON document store.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert a new document, returning it with its assigned id and timestamp.
    async fn insert(&self, collection: &str, body: Body) -> Result<Document, StoreError>;

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError>;

    async fn query(&self, collection: &str, query: &Query) -> Result<Vec<Document>, StoreError>;

    /// Atomically apply `updates` if every filter in `conditions` matches
    /// the current body.
    ///
    /// Returns `Ok(false)` when a condition does not hold (nothing is
    /// written) and [`StoreError::NotFound`] when the document is missing.
    async fn update_where(
        &self,
        collection: &str,
        id: &str,
        conditions: &[Filter],
        updates: &[FieldUpdate],
    ) -> Result<bool, StoreError>;

    /// Atomically apply `updates`. Fails with [`StoreError::NotFound`] if
    /// the document is missing.
    async fn update(
        &self,
        collection: &str,
        id: &str,
        updates: &[FieldUpdate],
    ) -> Result<(), StoreError> {
        self.update_where(collection, id, &[], updates).await?;
        Ok(())
    }

    /// Delete a document. Deleting a missing document is not an error.
    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError>;

    async fn health_check(&self) -> Result<(), StoreError>;
}
