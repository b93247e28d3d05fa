use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::filter::Filter;
use super::store::{Collection, Document, DocumentStore, StoreError};

/// In-process document store used by tests and by development runs without
/// `DATABASE_URL`. Documents are kept in insertion order per collection.
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<Collection, Vec<Document>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn check_unique(
        collection: Collection,
        docs: &[Document],
        candidate: &Document,
        skip_index: Option<usize>,
    ) -> Result<(), StoreError> {
        for field in collection.unique_fields() {
            let value = match candidate.get(*field) {
                None | Some(Value::Null) => continue,
                Some(v) => v,
            };
            let taken = docs
                .iter()
                .enumerate()
                .filter(|(i, _)| Some(*i) != skip_index)
                .any(|(_, doc)| doc.get(*field) == Some(value));
            if taken {
                return Err(StoreError::Conflict {
                    collection,
                    field: field.to_string(),
                });
            }
        }
        Ok(())
    }
}

fn document_id(doc: &Document) -> Result<&str, StoreError> {
    doc.get("id")
        .and_then(Value::as_str)
        .ok_or_else(|| StoreError::InvalidDocument("document is missing a string 'id'".to_string()))
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn insert(&self, collection: Collection, doc: Document) -> Result<Document, StoreError> {
        let id = document_id(&doc)?.to_string();
        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection).or_default();

        if docs.iter().any(|d| d.get("id").and_then(Value::as_str) == Some(id.as_str())) {
            return Err(StoreError::Conflict {
                collection,
                field: "id".to_string(),
            });
        }
        Self::check_unique(collection, docs, &doc, None)?;

        docs.push(doc.clone());
        Ok(doc)
    }

    async fn find(&self, collection: Collection, filter: &Filter) -> Result<Vec<Document>, StoreError> {
        filter.validate()?;
        let collections = self.collections.read().await;
        let Some(docs) = collections.get(&collection) else {
            return Ok(vec![]);
        };

        let matching = docs
            .iter()
            .filter(|doc| filter.matches(doc))
            .skip(filter.offset_value() as usize);
        let found = match filter.limit_value() {
            Some(limit) => matching.take(limit as usize).cloned().collect(),
            None => matching.cloned().collect(),
        };
        Ok(found)
    }

    async fn count(&self, collection: Collection, filter: &Filter) -> Result<u64, StoreError> {
        filter.validate()?;
        let collections = self.collections.read().await;
        let count = collections
            .get(&collection)
            .map(|docs| docs.iter().filter(|doc| filter.matches(doc)).count())
            .unwrap_or(0);
        Ok(count as u64)
    }

    async fn update_one(
        &self,
        collection: Collection,
        filter: &Filter,
        changes: Document,
    ) -> Result<Option<Document>, StoreError> {
        filter.validate()?;
        let mut collections = self.collections.write().await;
        let Some(docs) = collections.get_mut(&collection) else {
            return Ok(None);
        };
        let Some(index) = docs.iter().position(|doc| filter.matches(doc)) else {
            return Ok(None);
        };

        let mut updated = docs[index].clone();
        for (key, value) in changes {
            if key == "id" {
                continue;
            }
            updated.insert(key, value);
        }
        Self::check_unique(collection, docs, &updated, Some(index))?;

        docs[index] = updated.clone();
        Ok(Some(updated))
    }

    async fn delete_one(&self, collection: Collection, filter: &Filter) -> Result<Option<Document>, StoreError> {
        filter.validate()?;
        let mut collections = self.collections.write().await;
        let Some(docs) = collections.get_mut(&collection) else {
            return Ok(None);
        };
        Ok(docs
            .iter()
            .position(|doc| filter.matches(doc))
            .map(|index| docs.remove(index)))
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn close(&self) {
        self.collections.write().await.clear();
    }
}
