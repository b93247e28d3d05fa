use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

use super::filter::Filter;

/// A JSON document as persisted by a [`DocumentStore`].
pub type Document = Map<String, Value>;

/// The named collections of the CRM document store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Tenants,
    Users,
    Customers,
    Leads,
    Tasks,
}

impl Collection {
    pub const ALL: [Collection; 5] = [
        Collection::Tenants,
        Collection::Users,
        Collection::Customers,
        Collection::Leads,
        Collection::Tasks,
    ];

    /// Table / collection name.
    pub fn name(&self) -> &'static str {
        match self {
            Collection::Tenants => "tenants",
            Collection::Users => "users",
            Collection::Customers => "customers",
            Collection::Leads => "leads",
            Collection::Tasks => "tasks",
        }
    }

    /// Document fields whose values must be unique across the collection.
    /// Missing and null values do not participate.
    pub fn unique_fields(&self) -> &'static [&'static str] {
        match self {
            Collection::Tenants => &["email", "domain"],
            Collection::Users => &["email"],
            _ => &[],
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("duplicate value for unique field '{field}' in {collection}")]
    Conflict {
        collection: Collection,
        field: String,
    },

    #[error("invalid document: {0}")]
    InvalidDocument(String),

    #[error("invalid filter: {0}")]
    InvalidFilter(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Minimal document store: equality-filtered CRUD over JSON documents.
///
/// Every document carries a string `id`. Implementations enforce
/// [`Collection::unique_fields`] on insert and update, order results by
/// creation time then id, and never partially apply a write.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert a new document. The document must already carry its `id`.
    async fn insert(&self, collection: Collection, doc: Document) -> Result<Document, StoreError>;

    /// Documents matching `filter`, honoring its limit and offset.
    async fn find(&self, collection: Collection, filter: &Filter) -> Result<Vec<Document>, StoreError>;

    /// Number of documents matching `filter`, ignoring limit and offset.
    async fn count(&self, collection: Collection, filter: &Filter) -> Result<u64, StoreError>;

    /// Merge `changes` into the first document matching `filter` and return it.
    async fn update_one(
        &self,
        collection: Collection,
        filter: &Filter,
        changes: Document,
    ) -> Result<Option<Document>, StoreError>;

    /// Remove the first document matching `filter` and return it.
    async fn delete_one(&self, collection: Collection, filter: &Filter) -> Result<Option<Document>, StoreError>;

    async fn find_one(&self, collection: Collection, filter: &Filter) -> Result<Option<Document>, StoreError> {
        let filter = filter.clone().limit(1, 0);
        Ok(self.find(collection, &filter).await?.into_iter().next())
    }

    /// Cheap connectivity probe used by `/health`.
    async fn health_check(&self) -> Result<(), StoreError>;

    /// Release connections. The store must not be used afterwards.
    async fn close(&self);
}
