//! PostgreSQL [`DocumentStore`] over a single JSONB `documents` table.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use uuid::Uuid;

use super::{
    apply_updates, Body, Direction, Document, DocumentStore, FieldUpdate, Filter, OrderKey, Query,
    StoreError,
};

/// Column list for `documents` queries.
const COLUMNS: &str = "id, created_at, body";

pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn row_to_document(row: &sqlx::postgres::PgRow) -> Result<Document, StoreError> {
    let Json(body): Json<Value> = row.try_get("body")?;
    let body = match body {
        Value::Object(map) => map,
        _ => Body::new(),
    };
    Ok(Document {
        id: row.try_get("id")?,
        created_at: row.try_get("created_at")?,
        body,
    })
}

fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &Filter) {
    match filter {
        Filter::Eq(field, value) => {
            // A missing key matches a null comparison, as in the in-memory store.
            builder.push(" AND COALESCE(body -> ");
            builder.push_bind(field.clone());
            builder.push(", 'null'::jsonb) = ");
            builder.push_bind(Json(value.clone()));
        }
        Filter::ArrayContains(field, value) => {
            builder.push(" AND jsonb_typeof(body -> ");
            builder.push_bind(field.clone());
            builder.push(") = 'array' AND body -> ");
            builder.push_bind(field.clone());
            builder.push(" @> ");
            builder.push_bind(Json(Value::Array(vec![value.clone()])));
        }
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn insert(&self, collection: &str, body: Body) -> Result<Document, StoreError> {
        let row = sqlx::query(
            "INSERT INTO documents (collection, id, body) \
             VALUES ($1, $2, $3) \
             RETURNING id, created_at, body",
        )
        .bind(collection)
        .bind(Uuid::now_v7().to_string())
        .bind(Json(Value::Object(body)))
        .fetch_one(&self.pool)
        .await?;
        row_to_document(&row)
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        let query = format!("SELECT {COLUMNS} FROM documents WHERE collection = $1 AND id = $2");
        let row = sqlx::query(&query)
            .bind(collection)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_document).transpose()
    }

    async fn query(&self, collection: &str, query: &Query) -> Result<Vec<Document>, StoreError> {
        let mut builder = QueryBuilder::<Postgres>::new(format!(
            "SELECT {COLUMNS} FROM documents WHERE collection = "
        ));
        builder.push_bind(collection.to_string());

        for filter in &query.filters {
            push_filter(&mut builder, filter);
        }

        if let Some(order) = &query.order {
            let direction = match order.direction {
                Direction::Asc => " ASC",
                Direction::Desc => " DESC",
            };
            match &order.key {
                OrderKey::CreatedAt => {
                    builder.push(" ORDER BY created_at");
                }
                OrderKey::Field(field) => {
                    builder.push(" ORDER BY body -> ");
                    builder.push_bind(field.clone());
                }
            }
            builder.push(direction);
            builder.push(", id");
            builder.push(direction);
        }

        if let Some(limit) = query.limit {
            builder.push(" LIMIT ");
            builder.push_bind(i64::try_from(limit).unwrap_or(i64::MAX));
        }

        let rows = builder.build().fetch_all(&self.pool).await?;
        rows.iter().map(row_to_document).collect()
    }

    async fn update_where(
        &self,
        collection: &str,
        id: &str,
        conditions: &[Filter],
        updates: &[FieldUpdate],
    ) -> Result<bool, StoreError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(
            "SELECT body FROM documents WHERE collection = $1 AND id = $2 FOR UPDATE",
        )
        .bind(collection)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| StoreError::NotFound {
            collection: collection.to_string(),
            id: id.to_string(),
        })?;

        let Json(body): Json<Value> = row.try_get("body")?;
        let mut body = match body {
            Value::Object(map) => map,
            _ => Body::new(),
        };

        if !conditions.iter().all(|c| c.matches(&body)) {
            tx.rollback().await?;
            return Ok(false);
        }

        apply_updates(&mut body, updates, Utc::now());

        sqlx::query(
            "UPDATE documents SET body = $3, updated_at = NOW() \
             WHERE collection = $1 AND id = $2",
        )
        .bind(collection)
        .bind(id)
        .bind(Json(Value::Object(body)))
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(true)
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
            .bind(collection)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        crate::health_check(&self.pool).await?;
        Ok(())
    }
}
