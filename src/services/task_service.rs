use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use super::{ensure_reference, required, ServiceError};
use crate::database::models::{Customer, NewTask, Task, TaskPatch, User};
use crate::database::{DocumentStore, Filter, Page, PageRequest, Repository};
use crate::middleware::AuthContext;

#[derive(Clone)]
pub struct TaskService {
    tasks: Repository<Task>,
    customers: Repository<Customer>,
    users: Repository<User>,
}

impl TaskService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            tasks: Repository::new(store.clone()),
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

    pub async fn create(&self, auth: &AuthContext, input: NewTask) -> Result<Task, ServiceError> {
        let due_date = input
            .due_date
            .ok_or_else(|| ServiceError::invalid_field("dueDate", "dueDate is required"))?;
        let assigned_to = required("assignedTo", input.assigned_to)?;
        let customer_id = required("customerId", input.customer_id)?;
        self.check_references(auth, Some(customer_id), Some(assigned_to)).await?;

        let now = chrono::Utc::now();
        let task = Task {
            id: Uuid::new_v4(),
            tenant_id: auth.tenant_id,
            title: input.title,
            due_date,
            assigned_to,
            customer_id,
            status: input.status,
            created_at: now,
            updated_at: now,
        };
        let task = self.tasks.scoped(auth.tenant_id).insert(&task).await?;

        info!(task_id = %task.id, tenant_id = %auth.tenant_id, "Created task");
        Ok(task)
    }

    pub async fn list(&self, auth: &AuthContext, request: PageRequest) -> Result<Page<Task>, ServiceError> {
        Ok(self.tasks.scoped(auth.tenant_id).page(Filter::new(), request).await?)
    }

    pub async fn get(&self, auth: &AuthContext, id: Uuid) -> Result<Task, ServiceError> {
        self.tasks
            .scoped(auth.tenant_id)
            .find_by_id(id)
            .await?
            .ok_or(ServiceError::NotFound("Task"))
    }

    pub async fn update(&self, auth: &AuthContext, id: Uuid, patch: TaskPatch) -> Result<Task, ServiceError> {
        self.check_references(auth, patch.customer_id, patch.assigned_to).await?;

        self.tasks
            .scoped(auth.tenant_id)
            .update_by_id(id, &patch)
            .await?
            .ok_or(ServiceError::NotFound("Task"))
    }

    pub async fn delete(&self, auth: &AuthContext, id: Uuid) -> Result<Task, ServiceError> {
        let removed = self
            .tasks
            .scoped(auth.tenant_id)
            .delete_by_id(id)
            .await?
            .ok_or(ServiceError::NotFound("Task"))?;

        info!(task_id = %id, tenant_id = %auth.tenant_id, "Deleted task");
        Ok(removed)
    }
}
