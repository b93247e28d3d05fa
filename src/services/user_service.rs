use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use super::{ServiceError, TenantService};
use crate::auth::{PasswordHasher, TokenKeys};
use crate::database::models::{tenant::normalize_email, NewUser, Tenant, User, UserProfile, UserStatus};
use crate::database::{DocumentStore, Filter, Page, PageRequest, Repository, ScopedRepository, StoreError};
use crate::middleware::AuthContext;

const EMAIL_CONFLICT: &str = "Email already in use";

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub token: String,
    pub user: User,
    pub tenant: Tenant,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LoginStamp {
    last_login_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_login_ip: Option<String>,
}

#[derive(Clone)]
pub struct UserService {
    users: Repository<User>,
    tenants: TenantService,
    passwords: PasswordHasher,
    tokens: Arc<TokenKeys>,
}

impl UserService {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        tenants: TenantService,
        passwords: PasswordHasher,
        tokens: Arc<TokenKeys>,
    ) -> Self {
        Self {
            users: Repository::new(store),
            tenants,
            passwords,
            tokens,
        }
    }

    pub fn scoped(&self, tenant_id: Uuid) -> ScopedRepository<User> {
        self.users.scoped(tenant_id)
    }

    /// Create a user inside `tenant_id`. Emails are unique across all tenants.
    pub async fn register(&self, tenant_id: Uuid, input: NewUser) -> Result<UserProfile, ServiceError> {
        if !self.tenants.exists(tenant_id).await? {
            return Err(ServiceError::NotFound("Tenant"));
        }

        let email = normalize_email(&input.email);
        if self.users.exists(&Filter::new().eq("email", email.as_str())).await? {
            return Err(ServiceError::Conflict(EMAIL_CONFLICT));
        }

        let hash = self.passwords.hash(&input.password).await?;
        let user = User::new(tenant_id, input, hash);
        let created = match self.users.scoped(tenant_id).insert(&user).await {
            Ok(created) => created,
            Err(StoreError::Conflict { .. }) => return Err(ServiceError::Conflict(EMAIL_CONFLICT)),
            Err(e) => return Err(e.into()),
        };

        info!(user_id = %created.id, tenant_id = %tenant_id, role = %created.role, "Registered user");
        Ok(created.into())
    }

    /// Check credentials and issue a token.
    ///
    /// Unknown emails still pay for one bcrypt verification so the two
    /// failure paths cannot be told apart by status, message or timing.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        client_ip: Option<String>,
    ) -> Result<LoginOutcome, ServiceError> {
        let email = normalize_email(email);
        let Some(user) = self.users.find_one(&Filter::new().eq("email", email.as_str())).await? else {
            self.passwords.verify_dummy(password).await?;
            warn!("Login failed: unknown email");
            return Err(ServiceError::InvalidCredentials);
        };

        if !self.passwords.verify(password, &user.password).await? {
            warn!(user_id = %user.id, "Login failed: wrong password");
            return Err(ServiceError::InvalidCredentials);
        }

        if !user.is_active() {
            warn!(user_id = %user.id, status = ?user.status, "Login refused for inactive user");
            return Err(ServiceError::Inactive);
        }

        let tenant = self.tenants.get(user.tenant_id).await?;

        let stamp = LoginStamp {
            last_login_at: Utc::now(),
            last_login_ip: client_ip,
        };
        let user = self
            .users
            .scoped(user.tenant_id)
            .update_by_id(user.id, &stamp)
            .await?
            .ok_or(ServiceError::NotFound("User"))?;

        let token = self.tokens.issue(user.id, user.tenant_id, user.role)?;
        info!(user_id = %user.id, tenant_id = %user.tenant_id, "User logged in");

        Ok(LoginOutcome { token, user, tenant })
    }

    pub async fn list(&self, auth: &AuthContext, request: PageRequest) -> Result<Page<UserProfile>, ServiceError> {
        let page = self.scoped(auth.tenant_id).page(Filter::new(), request).await?;
        Ok(page.map(UserProfile::from))
    }

    pub async fn me(&self, auth: &AuthContext) -> Result<UserProfile, ServiceError> {
        self.scoped(auth.tenant_id)
            .find_by_id(auth.user_id)
            .await?
            .map(UserProfile::from)
            .ok_or(ServiceError::NotFound("User"))
    }

    pub async fn set_status(
        &self,
        auth: &AuthContext,
        id: Uuid,
        status: UserStatus,
    ) -> Result<UserProfile, ServiceError> {
        let user = self
            .scoped(auth.tenant_id)
            .update_by_id(id, &json!({ "status": status }))
            .await?
            .ok_or(ServiceError::NotFound("User"))?;

        info!(user_id = %id, status = ?status, changed_by = %auth.user_id, "Changed user status");
        Ok(user.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::Role;
    use crate::database::MemoryStore;

    struct Fixture {
        service: UserService,
        tenant_id: Uuid,
    }

    async fn fixture() -> Fixture {
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
        let tenants = TenantService::new(store.clone());
        let tenant = tenants
            .create(serde_json::from_value(json!({"name": "Acme", "email": "ops@acme.io"})).unwrap())
            .await
            .unwrap();
        let service = UserService::new(
            store,
            tenants,
            PasswordHasher::new(4).unwrap(),
            Arc::new(TokenKeys::new("unit-test-secret-unit-test-secret-0001", 24).unwrap()),
        );
        Fixture {
            service,
            tenant_id: tenant.id,
        }
    }

    fn new_user(email: &str) -> NewUser {
        serde_json::from_value(json!({"name": "Dana", "email": email, "password": "Secret123"})).unwrap()
    }

    #[tokio::test]
    async fn register_then_login() {
        let f = fixture().await;
        let profile = f.service.register(f.tenant_id, new_user("dana@acme.io")).await.unwrap();
        assert_eq!(profile.role, Role::Sales);

        let outcome = f
            .service
            .login("Dana@Acme.io", "Secret123", Some("10.0.0.7".to_string()))
            .await
            .unwrap();
        assert_eq!(outcome.user.id, profile.id);
        assert_eq!(outcome.tenant.name, "Acme");
        assert_eq!(outcome.user.last_login_ip.as_deref(), Some("10.0.0.7"));
        assert!(outcome.user.last_login_at.is_some());
    }

    #[tokio::test]
    async fn unknown_email_and_wrong_password_look_the_same() {
        let f = fixture().await;
        f.service.register(f.tenant_id, new_user("dana@acme.io")).await.unwrap();

        let wrong = f.service.login("dana@acme.io", "Wrong1234", None).await.unwrap_err();
        let unknown = f.service.login("nobody@acme.io", "Secret123", None).await.unwrap_err();
        assert_eq!(wrong.to_string(), unknown.to_string());
        assert!(matches!(wrong, ServiceError::InvalidCredentials));
        assert!(matches!(unknown, ServiceError::InvalidCredentials));
    }

    #[tokio::test]
    async fn duplicate_email_is_a_conflict() {
        let f = fixture().await;
        f.service.register(f.tenant_id, new_user("dana@acme.io")).await.unwrap();
        let err = f.service.register(f.tenant_id, new_user("DANA@acme.io")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(EMAIL_CONFLICT)));
    }

    #[tokio::test]
    async fn unknown_tenant_is_rejected() {
        let f = fixture().await;
        let err = f.service.register(Uuid::new_v4(), new_user("dana@acme.io")).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound("Tenant")));
    }

    #[tokio::test]
    async fn suspended_users_cannot_log_in() {
        let f = fixture().await;
        let profile = f.service.register(f.tenant_id, new_user("dana@acme.io")).await.unwrap();
        let admin = AuthContext {
            user_id: Uuid::new_v4(),
            tenant_id: f.tenant_id,
            role: Role::Admin,
        };
        f.service.set_status(&admin, profile.id, UserStatus::Suspended).await.unwrap();

        let err = f.service.login("dana@acme.io", "Secret123", None).await.unwrap_err();
        assert!(matches!(err, ServiceError::Inactive));
    }
}
