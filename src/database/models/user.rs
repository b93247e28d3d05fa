use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::tenant::normalize_email;
use super::trimmed;
use crate::auth::password::validate_password_strength;
use crate::database::repository::{Model, TenantOwned};
use crate::database::store::Collection;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    Sales,
    Manager,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Sales => "sales",
            Role::Manager => "manager",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "sales" => Ok(Role::Sales),
            "manager" => Ok(Role::Manager),
            other => Err(format!("unknown role '{}' (expected admin, sales or manager)", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    #[default]
    Active,
    Suspended,
    Inactive,
}

/// Stored user document. Carries the bcrypt hash, so it is never returned to
/// clients directly; see [`UserProfile`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub status: UserStatus,
    #[serde(default)]
    pub last_login_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_login_ip: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Model for User {
    const COLLECTION: Collection = Collection::Users;
}

impl TenantOwned for User {}

impl User {
    pub fn new(tenant_id: Uuid, input: NewUser, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            tenant_id,
            name: input.name,
            email: normalize_email(&input.email),
            password: password_hash,
            role: input.role,
            status: input.status.unwrap_or_default(),
            last_login_at: None,
            last_login_ip: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == UserStatus::Active
    }
}

/// Client-facing view of a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub status: UserStatus,
    pub last_login_at: Option<DateTime<Utc>>,
    pub last_login_ip: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            tenant_id: user.tenant_id,
            name: user.name,
            email: user.email,
            role: user.role,
            status: user.status,
            last_login_at: user.last_login_at,
            last_login_ip: user.last_login_ip,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Body of `POST /users/add`; the tenant comes from the caller's token.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(length(min = 2, max = 200, message = "Name must be at least 2 characters"))]
    pub name: String,
    #[serde(default)]
    #[validate(email(message = "Invalid email"))]
    pub email: String,
    #[serde(default)]
    #[validate(custom(function = "validate_password_strength"))]
    pub password: String,
    #[serde(default)]
    pub role: Role,
    pub status: Option<UserStatus>,
}

/// Body of the public `POST /users/register`.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUser {
    pub tenant_id: Uuid,
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(length(min = 2, max = 200, message = "Name must be at least 2 characters"))]
    pub name: String,
    #[serde(default)]
    #[validate(email(message = "Invalid email"))]
    pub email: String,
    #[serde(default)]
    #[validate(custom(function = "validate_password_strength"))]
    pub password: String,
    #[serde(default)]
    pub role: Role,
    pub status: Option<UserStatus>,
}

impl RegisterUser {
    pub fn into_parts(self) -> (Uuid, NewUser) {
        (
            self.tenant_id,
            NewUser {
                name: self.name,
                email: self.email,
                password: self.password,
                role: self.role,
                status: self.status,
            },
        )
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[serde(default)]
    #[validate(email(message = "Invalid email"))]
    pub email: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct StatusChange {
    pub status: UserStatus,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_user() -> User {
        let input: NewUser = serde_json::from_value(json!({
            "name": "Dana",
            "email": "Dana@Example.com",
            "password": "Secret123"
        }))
        .unwrap();
        User::new(Uuid::new_v4(), input, "$2b$04$hash".to_string())
    }

    #[test]
    fn defaults_role_and_status() {
        let user = sample_user();
        assert_eq!(user.role, Role::Sales);
        assert_eq!(user.status, UserStatus::Active);
        assert_eq!(user.email, "dana@example.com");
    }

    #[test]
    fn profile_never_carries_password() {
        let profile = UserProfile::from(sample_user());
        let value = serde_json::to_value(&profile).unwrap();
        assert!(value.get("password").is_none());
        assert!(value.get("tenantId").is_some());
    }

    #[test]
    fn register_body_requires_strong_password() {
        let body: RegisterUser = serde_json::from_value(json!({
            "tenantId": Uuid::new_v4(),
            "name": "Dana",
            "email": "dana@example.com",
            "password": "weakpass"
        }))
        .unwrap();
        let errors = body.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("password"));
    }

    #[test]
    fn parses_roles() {
        assert_eq!("manager".parse::<Role>().unwrap(), Role::Manager);
        assert!("owner".parse::<Role>().is_err());
    }
}
