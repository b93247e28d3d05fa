use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::{trimmed, trimmed_opt};
use crate::database::repository::Model;
use crate::database::store::Collection;

/// Subscription plan of a tenant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    #[default]
    Free,
    Pro,
    Enterprise,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tenant {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub plan: Plan,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Model for Tenant {
    const COLLECTION: Collection = Collection::Tenants;
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewTenant {
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(length(min = 2, max = 200, message = "Name must be at least 2 characters"))]
    pub name: String,
    #[serde(default)]
    #[validate(email(message = "Invalid email"))]
    pub email: String,
    #[serde(default, deserialize_with = "trimmed_opt")]
    #[validate(length(min = 3, max = 253, message = "Domain must be between 3 and 253 characters"))]
    pub domain: Option<String>,
    #[serde(default)]
    pub plan: Plan,
}

impl Tenant {
    pub fn new(input: NewTenant) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: input.name,
            email: normalize_email(&input.email),
            domain: input
                .domain
                .map(|d| d.to_ascii_lowercase())
                .filter(|d| !d.is_empty()),
            plan: input.plan,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Emails are compared case-insensitively by storing them lowercased.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
