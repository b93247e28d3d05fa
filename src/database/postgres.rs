use async_trait::async_trait;
use serde_json::Value;
use sqlx::{postgres::PgPoolOptions, PgPool, Row};
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

use super::filter::Filter;
use super::schema;
use super::store::{Collection, Document, DocumentStore, StoreError};
use crate::config::DatabaseConfig;

/// Postgres-backed document store: one JSONB table per collection.
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StoreError> {
        let url = config
            .url
            .as_deref()
            .ok_or_else(|| StoreError::Unavailable("DATABASE_URL is not set".to_string()))?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(url)
            .await
            .map_err(classify)?;

        info!("Connected to {}", redacted_url(url));
        Ok(Self { pool })
    }

    /// Create collections and indexes if they do not exist yet.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        for statement in schema::statements() {
            sqlx::query(&statement).execute(&self.pool).await.map_err(classify)?;
        }
        info!("Document store schema is up to date");
        Ok(())
    }

    fn bind_all<'q>(
        mut query: sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments>,
        params: &'q [String],
    ) -> sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments> {
        for param in params {
            query = query.bind(param);
        }
        query
    }
}

/// Log-safe form of a connection string (password removed).
fn redacted_url(url: &str) -> String {
    match url::Url::parse(url) {
        Ok(mut parsed) => {
            if parsed.password().is_some() {
                let _ = parsed.set_password(Some("****"));
            }
            parsed.to_string()
        }
        Err(_) => "<unparseable database url>".to_string(),
    }
}

fn classify(err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) | sqlx::Error::Tls(_) => {
            StoreError::Unavailable(err.to_string())
        }
        other => StoreError::Sqlx(other),
    }
}

fn classify_write(collection: Collection, err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            let field = db_err
                .constraint()
                .and_then(|index| schema::field_for_unique_index(collection, index))
                .unwrap_or("id");
            return StoreError::Conflict {
                collection,
                field: field.to_string(),
            };
        }
    }
    classify(err)
}

fn into_document(value: Value) -> Result<Document, StoreError> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::InvalidDocument(format!("expected object body, found {}", other))),
    }
}

fn row_document(row: &sqlx::postgres::PgRow) -> Result<Document, StoreError> {
    let body: Value = row.try_get("body")?;
    into_document(body)
}

#[async_trait]
impl DocumentStore for PgStore {
    async fn insert(&self, collection: Collection, doc: Document) -> Result<Document, StoreError> {
        let id = doc
            .get("id")
            .and_then(Value::as_str)
            .and_then(|s| Uuid::parse_str(s).ok())
            .ok_or_else(|| StoreError::InvalidDocument("document 'id' must be a UUID".to_string()))?;

        let sql = format!(
            "INSERT INTO \"{}\" (id, body, created_at, updated_at) VALUES ($1, $2, now(), now()) RETURNING body",
            collection.name()
        );
        let row = sqlx::query(&sql)
            .bind(id)
            .bind(Value::Object(doc))
            .fetch_one(&self.pool)
            .await
            .map_err(|e| classify_write(collection, e))?;
        row_document(&row)
    }

    async fn find(&self, collection: Collection, filter: &Filter) -> Result<Vec<Document>, StoreError> {
        let sql = filter.to_select_sql(collection.name())?;
        let rows = Self::bind_all(sqlx::query(&sql.query), &sql.params)
            .fetch_all(&self.pool)
            .await
            .map_err(classify)?;
        rows.iter().map(row_document).collect()
    }

    async fn count(&self, collection: Collection, filter: &Filter) -> Result<u64, StoreError> {
        let sql = filter.to_count_sql(collection.name())?;
        let row = Self::bind_all(sqlx::query(&sql.query), &sql.params)
            .fetch_one(&self.pool)
            .await
            .map_err(classify)?;
        let count: i64 = row.try_get("count")?;
        Ok(count.max(0) as u64)
    }

    async fn update_one(
        &self,
        collection: Collection,
        filter: &Filter,
        mut changes: Document,
    ) -> Result<Option<Document>, StoreError> {
        changes.remove("id");
        let table = collection.name();
        let where_sql = filter.to_where_sql(2)?;
        let sql = format!(
            "UPDATE \"{table}\" SET body = body || $1, updated_at = now() \
             WHERE id = (SELECT id FROM \"{table}\" WHERE {} ORDER BY created_at ASC, id ASC LIMIT 1) \
             RETURNING body",
            where_sql.query
        );
        let row = Self::bind_all(sqlx::query(&sql).bind(Value::Object(changes)), &where_sql.params)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| classify_write(collection, e))?;
        row.as_ref().map(row_document).transpose()
    }

    async fn delete_one(&self, collection: Collection, filter: &Filter) -> Result<Option<Document>, StoreError> {
        let table = collection.name();
        let where_sql = filter.to_where_sql(1)?;
        let sql = format!(
            "DELETE FROM \"{table}\" \
             WHERE id = (SELECT id FROM \"{table}\" WHERE {} ORDER BY created_at ASC, id ASC LIMIT 1) \
             RETURNING body",
            where_sql.query
        );
        let row = Self::bind_all(sqlx::query(&sql), &where_sql.params)
            .fetch_optional(&self.pool)
            .await
            .map_err(classify)?;
        row.as_ref().map(row_document).transpose()
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await.map_err(classify)?;
        Ok(())
    }

    async fn close(&self) {
        self.pool.close().await;
        info!("Closed database pool");
    }
}
