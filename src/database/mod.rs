pub mod filter;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod schema;
pub mod store;

use std::sync::Arc;
use tracing::{info, warn};

pub use filter::Filter;
pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use repository::{Model, Page, PageRequest, Repository, ScopedRepository, TenantOwned};
pub use store::{Collection, Document, DocumentStore, StoreError};

use crate::config::AppConfig;

/// Open the store the server runs against.
///
/// Postgres is used whenever `DATABASE_URL` is configured, unless the memory
/// store is forced. Without a URL only development falls back to memory.
pub async fn open_store(config: &AppConfig, force_memory: bool) -> Result<Arc<dyn DocumentStore>, StoreError> {
    if force_memory {
        info!("Using in-memory document store");
        return Ok(Arc::new(MemoryStore::new()));
    }

    match config.database.url {
        Some(_) => {
            let store = PgStore::connect(&config.database).await?;
            store.migrate().await?;
            Ok(Arc::new(store))
        }
        None if config.is_development() => {
            warn!("DATABASE_URL is not set, falling back to the in-memory document store");
            Ok(Arc::new(MemoryStore::new()))
        }
        None => Err(StoreError::Unavailable(format!(
            "DATABASE_URL is required in {:?}",
            config.environment
        ))),
    }
}
