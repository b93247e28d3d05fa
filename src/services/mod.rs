pub mod customer_service;
pub mod lead_service;
pub mod task_service;
pub mod tenant_service;
pub mod user_service;

use thiserror::Error;
use uuid::Uuid;

pub use customer_service::CustomerService;
pub use lead_service::{LeadFilter, LeadService};
pub use task_service::TaskService;
pub use tenant_service::TenantService;
pub use user_service::{LoginOutcome, UserService};

use crate::auth::AuthError;
use crate::database::{ScopedRepository, StoreError, TenantOwned};
use crate::error::ApiError;

pub const INVALID_CREDENTIALS: &str = "Invalid email or password";

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Conflict(&'static str),

    #[error("{field}: {message}")]
    InvalidField { field: &'static str, message: String },

    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("user is suspended or inactive")]
    Inactive,

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Auth(#[from] AuthError),
}

impl ServiceError {
    pub fn invalid_field(field: &'static str, message: impl Into<String>) -> Self {
        ServiceError::InvalidField {
            field,
            message: message.into(),
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::NotFound(what) => ApiError::not_found(format!("{} not found", what)),
            ServiceError::Conflict(message) => ApiError::conflict(message),
            ServiceError::InvalidField { field, message } => ApiError::invalid_field(field, message),
            ServiceError::InvalidCredentials => ApiError::unauthorized(INVALID_CREDENTIALS),
            ServiceError::Inactive => ApiError::forbidden("User is suspended or inactive"),
            ServiceError::Store(e) => e.into(),
            ServiceError::Auth(e) => e.into(),
        }
    }
}

/// A required id that the body left out.
pub(crate) fn required(field: &'static str, value: Option<Uuid>) -> Result<Uuid, ServiceError> {
    value.ok_or_else(|| ServiceError::invalid_field(field, format!("{} is required", field)))
}

/// Reject references to records outside the caller's tenant.
pub(crate) async fn ensure_reference<T: TenantOwned>(
    repo: &ScopedRepository<T>,
    field: &'static str,
    id: Uuid,
    what: &str,
) -> Result<(), ServiceError> {
    if repo.exists(id).await? {
        Ok(())
    } else {
        Err(ServiceError::invalid_field(field, format!("{} not found in this tenant", what)))
    }
}
