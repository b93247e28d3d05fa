pub mod customer;
pub mod lead;
pub mod task;
pub mod tenant;
pub mod user;

pub use customer::{Customer, CustomerPatch, NewCustomer};
pub use lead::{Lead, LeadChanges, LeadPatch, LeadStatus, NewLead};
pub use task::{NewTask, Task, TaskPatch, TaskStatus};
pub use tenant::{NewTenant, Plan, Tenant};
pub use user::{LoginRequest, NewUser, RegisterUser, Role, StatusChange, User, UserProfile, UserStatus};

use serde::{Deserialize, Deserializer};

/// Trim surrounding whitespace while deserializing, so length checks see the stored value.
pub(crate) fn trimmed<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(String::deserialize(deserializer)?.trim().to_string())
}

pub(crate) fn trimmed_opt<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.map(|s| s.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use validator::Validate;

    #[test]
    fn blank_required_fields_fail_validation() {
        let tenant: NewTenant = serde_json::from_value(json!({"name": "   ", "email": "ops@acme.io"})).unwrap();
        assert_eq!(tenant.name, "");
        assert!(tenant.validate().unwrap_err().field_errors().contains_key("name"));

        let patch: CustomerPatch = serde_json::from_value(json!({"company": "  "})).unwrap();
        assert_eq!(patch.company.as_deref(), Some(""));
        assert!(patch.validate().is_err());
    }
}
