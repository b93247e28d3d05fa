use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use super::{ensure_reference, required, ServiceError};
use crate::database::models::{Customer, Lead, LeadPatch, LeadStatus, NewLead, User};
use crate::database::{DocumentStore, Filter, Page, PageRequest, Repository};
use crate::middleware::AuthContext;

/// Optional listing filters, applied on top of the tenant scope.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LeadFilter {
    pub status: Option<LeadStatus>,
    pub assigned_to: Option<Uuid>,
}

impl LeadFilter {
    fn to_filter(self) -> Filter {
        let mut filter = Filter::new();
        if let Some(status) = self.status {
            filter = filter.eq("status", status.as_str());
        }
        if let Some(assigned_to) = self.assigned_to {
            filter = filter.eq("assignedTo", assigned_to.to_string());
        }
        filter
    }
}

#[derive(Clone)]
pub struct LeadService {
    leads: Repository<Lead>,
    customers: Repository<Customer>,
    users: Repository<User>,
}

impl LeadService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            leads: Repository::new(store.clone()),
            customers: Repository::new(store.clone()),
            users: Repository::new(store),
        }
    }

    async fn check_references(
        &self,
        auth: &AuthContext,
        customer_id: Option<Uuid>,
        assigned_to: Option<Uuid>,
    ) -> Result<(), ServiceError> {
        if let Some(id) = customer_id {
            ensure_reference(&self.customers.scoped(auth.tenant_id), "customerId", id, "Customer").await?;
        }
        if let Some(id) = assigned_to {
            ensure_reference(&self.users.scoped(auth.tenant_id), "assignedTo", id, "User").await?;
        }
        Ok(())
    }

    pub async fn create(&self, auth: &AuthContext, input: NewLead) -> Result<Lead, ServiceError> {
        let customer_id = required("customerId", input.customer_id)?;
        let assigned_to = required("assignedTo", input.assigned_to)?;
        let status = match input.status.as_deref() {
            None => LeadStatus::default(),
            Some(raw) => LeadStatus::parse(raw).ok_or_else(|| ServiceError::invalid_field("status", "Invalid Lead status"))?,
        };
        self.check_references(auth, Some(customer_id), Some(assigned_to)).await?;

        let now = chrono::Utc::now();
        let lead = Lead {
            id: Uuid::new_v4(),
            tenant_id: auth.tenant_id,
            customer_id,
            status,
            assigned_to,
            notes: input.notes,
            created_at: now,
            updated_at: now,
        };
        let lead = self.leads.scoped(auth.tenant_id).insert(&lead).await?;

        info!(lead_id = %lead.id, tenant_id = %auth.tenant_id, status = lead.status.as_str(), "Created lead");
        Ok(lead)
    }

    pub async fn list(
        &self,
        auth: &AuthContext,
        filter: LeadFilter,
        request: PageRequest,
    ) -> Result<Page<Lead>, ServiceError> {
        Ok(self.leads.scoped(auth.tenant_id).page(filter.to_filter(), request).await?)
    }

    /// Apply a patch. An unknown status is dropped, the other fields still apply.
    pub async fn update(&self, auth: &AuthContext, id: Uuid, patch: LeadPatch) -> Result<Lead, ServiceError> {
        let changes = patch.into_changes();
        self.check_references(auth, changes.customer_id, changes.assigned_to).await?;

        self.leads
            .scoped(auth.tenant_id)
            .update_by_id(id, &changes)
            .await?
            .ok_or(ServiceError::NotFound("Lead"))
    }

    pub async fn delete(&self, auth: &AuthContext, id: Uuid) -> Result<Lead, ServiceError> {
        let removed = self
            .leads
            .scoped(auth.tenant_id)
            .delete_by_id(id)
            .await?
            .ok_or(ServiceError::NotFound("Lead"))?;

        info!(lead_id = %id, tenant_id = %auth.tenant_id, "Deleted lead");
        Ok(removed)
    }
}
