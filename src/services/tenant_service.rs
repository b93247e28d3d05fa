use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use super::ServiceError;
use crate::database::models::{NewTenant, Tenant};
use crate::database::{DocumentStore, Filter, Repository, StoreError};

const TENANT_CONFLICT: &str = "Email or domain already in use";

#[derive(Clone)]
pub struct TenantService {
    tenants: Repository<Tenant>,
}

impl TenantService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            tenants: Repository::new(store),
        }
    }

    /// Register a new tenant. Email and domain must both be unused.
    pub async fn create(&self, input: NewTenant) -> Result<Tenant, ServiceError> {
        let tenant = Tenant::new(input);

        if self.is_taken(&tenant).await? {
            return Err(ServiceError::Conflict(TENANT_CONFLICT));
        }

        // The store's unique indexes catch a concurrent registration
        let created = match self.tenants.insert(&tenant).await {
            Ok(created) => created,
            Err(StoreError::Conflict { .. }) => return Err(ServiceError::Conflict(TENANT_CONFLICT)),
            Err(e) => return Err(e.into()),
        };

        info!(tenant_id = %created.id, name = %created.name, plan = ?created.plan, "Created tenant");
        Ok(created)
    }

    pub async fn get(&self, id: Uuid) -> Result<Tenant, ServiceError> {
        self.tenants
            .find_by_id(id)
            .await?
            .ok_or(ServiceError::NotFound("Tenant"))
    }

    pub async fn exists(&self, id: Uuid) -> Result<bool, ServiceError> {
        Ok(self.tenants.exists(&Filter::by_id(id.to_string())).await?)
    }

    async fn is_taken(&self, tenant: &Tenant) -> Result<bool, ServiceError> {
        if self.tenants.exists(&Filter::new().eq("email", tenant.email.as_str())).await? {
            return Ok(true);
        }
        match &tenant.domain {
            Some(domain) => Ok(self.tenants.exists(&Filter::new().eq("domain", domain.as_str())).await?),
            None => Ok(false),
        }
    }
}
