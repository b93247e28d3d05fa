//! Runs against a real database only when `DATABASE_URL` is set.

use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

use tenant_crm::database::models::NewTenant;
use tenant_crm::database::{Collection, DocumentStore, Filter, PgStore};
use tenant_crm::services::{ServiceError, TenantService};
use tenant_crm::AppConfig;

async fn connect() -> anyhow::Result<Option<PgStore>> {
    let Ok(url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set, skipping postgres tests");
        return Ok(None);
    };
    let mut config = AppConfig::development().database;
    config.url = Some(url);
    let store = PgStore::connect(&config).await?;
    store.migrate().await?;
    Ok(Some(store))
}

#[tokio::test]
async fn tenant_registration_round_trips() -> anyhow::Result<()> {
    let Some(store) = connect().await? else {
        return Ok(());
    };
    let store: Arc<dyn DocumentStore> = Arc::new(store);
    let service = TenantService::new(store.clone());
    let slug = Uuid::new_v4().simple().to_string();

    let input: NewTenant = serde_json::from_value(json!({
        "name": "Postgres Tenant",
        "email": format!("ops@{}.io", slug),
        "domain": format!("{}.io", slug),
    }))?;
    let tenant = service.create(input.clone()).await?;
    assert_eq!(service.get(tenant.id).await?.email, tenant.email);

    let duplicate = service.create(input).await;
    assert!(matches!(duplicate, Err(ServiceError::Conflict(_))));

    let removed = store
        .delete_one(Collection::Tenants, &Filter::new().eq("id", tenant.id.to_string()))
        .await?;
    assert!(removed.is_some());
    store.close().await;
    Ok(())
}

#[tokio::test]
async fn health_check_reaches_the_database() -> anyhow::Result<()> {
    let Some(store) = connect().await? else {
        return Ok(());
    };
    store.health_check().await?;
    store.close().await;
    Ok(())
}
