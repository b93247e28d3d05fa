use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::tenant::normalize_email;
use super::{trimmed, trimmed_opt};
use crate::database::repository::{Model, TenantOwned};
use crate::database::store::Collection;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub company: String,
    #[serde(default)]
    pub assigned_to: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Model for Customer {
    const COLLECTION: Collection = Collection::Customers;
}

impl TenantOwned for Customer {}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewCustomer {
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(length(min = 1, max = 200, message = "Name is required"))]
    pub name: String,
    #[serde(default)]
    #[validate(email(message = "Invalid email"))]
    pub email: String,
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(length(min = 1, max = 50, message = "Phone is required"))]
    pub phone: String,
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(length(min = 1, max = 200, message = "Company is required"))]
    pub company: String,
    pub assigned_to: Option<Uuid>,
}

impl Customer {
    /// The tenant is stamped by the scoped repository on insert.
    pub fn new(tenant_id: Uuid, input: NewCustomer) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            tenant_id,
            name: input.name,
            email: normalize_email(&input.email),
            phone: input.phone,
            company: input.company,
            assigned_to: input.assigned_to,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CustomerPatch {
    #[serde(default, deserialize_with = "trimmed_opt", skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 200, message = "Name cannot be empty"))]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(email(message = "Invalid email"))]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "trimmed_opt", skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 50, message = "Phone cannot be empty"))]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "trimmed_opt", skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 200, message = "Company cannot be empty"))]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<Uuid>,
}

impl CustomerPatch {
    pub fn normalized(mut self) -> Self {
        self.email = self.email.map(|e| normalize_email(&e));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_fields_surface_as_field_errors() {
        let input: NewCustomer = serde_json::from_value(json!({"name": "Ada"})).unwrap();
        let errors = input.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("phone"));
        assert!(fields.contains_key("company"));
        assert!(!fields.contains_key("name"));
    }

    #[test]
    fn patch_serializes_only_present_fields() {
        let patch: CustomerPatch = serde_json::from_value(json!({"phone": "555-0100"})).unwrap();
        let value = serde_json::to_value(&patch).unwrap();
        assert_eq!(value, json!({"phone": "555-0100"}));
    }

    #[test]
    fn patch_ignores_tenant_and_id() {
        let patch: CustomerPatch =
            serde_json::from_value(json!({"tenantId": Uuid::new_v4(), "id": "x", "company": "Initech"})).unwrap();
        assert_eq!(serde_json::to_value(&patch).unwrap(), json!({"company": "Initech"}));
    }
}
