use chrono::Utc;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::marker::PhantomData;
use std::sync::Arc;
use uuid::Uuid;

use super::filter::Filter;
use super::store::{Collection, Document, DocumentStore, StoreError};

/// A typed document kind stored in one collection.
pub trait Model: Serialize + DeserializeOwned + Send + Sync + 'static {
    const COLLECTION: Collection;
}

/// Models that belong to a tenant through their `tenantId` field.
pub trait TenantOwned: Model {}

pub const TENANT_FIELD: &str = "tenantId";

/// Requested window of a paginated listing (1-based page).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub limit: u64,
}

impl PageRequest {
    pub fn offset(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub data: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub total_pages: u64,
}

impl<T> Page<T> {
    pub fn new(data: Vec<T>, total: u64, request: PageRequest) -> Self {
        let total_pages = if request.limit == 0 { 0 } else { total.div_ceil(request.limit) };
        Self {
            data,
            total,
            page: request.page,
            limit: request.limit,
            total_pages,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            data: self.data.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            limit: self.limit,
            total_pages: self.total_pages,
        }
    }
}

fn to_document<S: Serialize>(value: &S) -> Result<Document, StoreError> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::InvalidDocument(format!("expected an object, found {}", other))),
    }
}

fn from_document<T: DeserializeOwned>(doc: Document) -> Result<T, StoreError> {
    Ok(serde_json::from_value(Value::Object(doc))?)
}

/// Typed access to one collection of the document store.
pub struct Repository<T> {
    store: Arc<dyn DocumentStore>,
    _phantom: PhantomData<fn() -> T>,
}

impl<T> Clone for Repository<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            _phantom: PhantomData,
        }
    }
}

impl<T: Model> Repository<T> {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            _phantom: PhantomData,
        }
    }

    pub async fn insert(&self, record: &T) -> Result<T, StoreError> {
        self.insert_document(to_document(record)?).await
    }

    async fn insert_document(&self, doc: Document) -> Result<T, StoreError> {
        let stored = self.store.insert(T::COLLECTION, doc).await?;
        from_document(stored)
    }

    pub async fn find(&self, filter: &Filter) -> Result<Vec<T>, StoreError> {
        self.store
            .find(T::COLLECTION, filter)
            .await?
            .into_iter()
            .map(from_document)
            .collect()
    }

    pub async fn find_one(&self, filter: &Filter) -> Result<Option<T>, StoreError> {
        self.store
            .find_one(T::COLLECTION, filter)
            .await?
            .map(from_document)
            .transpose()
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<T>, StoreError> {
        self.find_one(&Filter::by_id(id.to_string())).await
    }

    pub async fn count(&self, filter: &Filter) -> Result<u64, StoreError> {
        self.store.count(T::COLLECTION, filter).await
    }

    pub async fn exists(&self, filter: &Filter) -> Result<bool, StoreError> {
        Ok(self.store.find_one(T::COLLECTION, filter).await?.is_some())
    }

    /// Merge the serialized `patch` into the first match and bump `updatedAt`.
    pub async fn update_one<P: Serialize>(&self, filter: &Filter, patch: &P) -> Result<Option<T>, StoreError> {
        let mut changes = to_document(patch)?;
        changes.insert("updatedAt".to_string(), serde_json::to_value(Utc::now())?);
        self.store
            .update_one(T::COLLECTION, filter, changes)
            .await?
            .map(from_document)
            .transpose()
    }

    pub async fn delete_one(&self, filter: &Filter) -> Result<Option<T>, StoreError> {
        self.store
            .delete_one(T::COLLECTION, filter)
            .await?
            .map(from_document)
            .transpose()
    }

    /// One page of matches plus the total count, fetched concurrently.
    pub async fn page(&self, filter: &Filter, request: PageRequest) -> Result<Page<T>, StoreError> {
        let window = filter.clone().limit(request.limit, request.offset());
        let (data, total) = futures::try_join!(self.find(&window), self.count(filter))?;
        Ok(Page::new(data, total, request))
    }
}

impl<T: TenantOwned> Repository<T> {
    pub fn scoped(&self, tenant_id: Uuid) -> ScopedRepository<T> {
        ScopedRepository {
            inner: self.clone(),
            tenant_id,
        }
    }
}

/// Tenant-bound view of a repository. Every filter gets `tenantId = scope`
/// as its first condition and every insert is stamped with the scope, so a
/// caller cannot reach another tenant's documents through it.
pub struct ScopedRepository<T> {
    inner: Repository<T>,
    tenant_id: Uuid,
}

impl<T: TenantOwned> ScopedRepository<T> {
    fn scope(&self, filter: Filter) -> Filter {
        filter.prepend(TENANT_FIELD, self.tenant_id.to_string())
    }

    pub async fn insert(&self, record: &T) -> Result<T, StoreError> {
        let mut doc = to_document(record)?;
        doc.insert(TENANT_FIELD.to_string(), Value::String(self.tenant_id.to_string()));
        self.inner.insert_document(doc).await
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<T>, StoreError> {
        self.inner.find_one(&self.scope(Filter::by_id(id.to_string()))).await
    }

    pub async fn exists(&self, id: Uuid) -> Result<bool, StoreError> {
        self.inner.exists(&self.scope(Filter::by_id(id.to_string()))).await
    }

    pub async fn page(&self, filter: Filter, request: PageRequest) -> Result<Page<T>, StoreError> {
        self.inner.page(&self.scope(filter), request).await
    }

    pub async fn update_by_id<P: Serialize>(&self, id: Uuid, patch: &P) -> Result<Option<T>, StoreError> {
        self.inner
            .update_one(&self.scope(Filter::by_id(id.to_string())), patch)
            .await
    }

    pub async fn delete_by_id(&self, id: Uuid) -> Result<Option<T>, StoreError> {
        self.inner.delete_one(&self.scope(Filter::by_id(id.to_string()))).await
    }
}
