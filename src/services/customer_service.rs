use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use super::{ensure_reference, ServiceError};
use crate::database::models::{Customer, CustomerPatch, NewCustomer, User};
use crate::database::{DocumentStore, Filter, Page, PageRequest, Repository};
use crate::middleware::AuthContext;

#[derive(Clone)]
pub struct CustomerService {
    customers: Repository<Customer>,
    users: Repository<User>,
}

impl CustomerService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            customers: Repository::new(store.clone()),
            users: Repository::new(store),
        }
    }

    async fn check_assignee(&self, auth: &AuthContext, assigned_to: Option<Uuid>) -> Result<(), ServiceError> {
        match assigned_to {
            Some(user_id) => ensure_reference(&self.users.scoped(auth.tenant_id), "assignedTo", user_id, "User").await,
            None => Ok(()),
        }
    }

    pub async fn create(&self, auth: &AuthContext, input: NewCustomer) -> Result<Customer, ServiceError> {
        self.check_assignee(auth, input.assigned_to).await?;

        let customer = self
            .customers
            .scoped(auth.tenant_id)
            .insert(&Customer::new(auth.tenant_id, input))
            .await?;

        info!(customer_id = %customer.id, tenant_id = %auth.tenant_id, "Created customer");
        Ok(customer)
    }

    pub async fn list(&self, auth: &AuthContext, request: PageRequest) -> Result<Page<Customer>, ServiceError> {
        Ok(self.customers.scoped(auth.tenant_id).page(Filter::new(), request).await?)
    }

    pub async fn update(&self, auth: &AuthContext, id: Uuid, patch: CustomerPatch) -> Result<Customer, ServiceError> {
        self.check_assignee(auth, patch.assigned_to).await?;

        self.customers
            .scoped(auth.tenant_id)
            .update_by_id(id, &patch.normalized())
            .await?
            .ok_or(ServiceError::NotFound("Customer"))
    }

    pub async fn delete(&self, auth: &AuthContext, id: Uuid) -> Result<Customer, ServiceError> {
        let removed = self
            .customers
            .scoped(auth.tenant_id)
            .delete_by_id(id)
            .await?
            .ok_or(ServiceError::NotFound("Customer"))?;

        info!(customer_id = %id, tenant_id = %auth.tenant_id, "Deleted customer");
        Ok(removed)
    }
}
