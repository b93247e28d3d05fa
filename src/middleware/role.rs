use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tracing::warn;

use super::auth::AuthContext;
use crate::database::models::Role;
use crate::error::ApiError;

/// Set of roles allowed through a route.
#[derive(Clone, Copy, Debug)]
pub struct RoleGate {
    allowed: &'static [Role],
}

impl RoleGate {
    pub const fn new(allowed: &'static [Role]) -> Self {
        Self { allowed }
    }

    pub fn permits(&self, role: Role) -> bool {
        self.allowed.contains(&role)
    }
}

pub const ADMIN_ONLY: RoleGate = RoleGate::new(&[Role::Admin]);
pub const ADMIN_OR_MANAGER: RoleGate = RoleGate::new(&[Role::Admin, Role::Manager]);

/// Must run inside [`super::jwt_auth_middleware`].
pub async fn require_role(
    State(gate): State<RoleGate>,
    auth: AuthContext,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if !gate.permits(auth.role) {
        warn!(user_id = %auth.user_id, role = %auth.role, path = %request.uri().path(), "Role not permitted");
        return Err(ApiError::forbidden("Forbidden"));
    }
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permits_listed_roles_only() {
        assert!(ADMIN_ONLY.permits(Role::Admin));
        assert!(!ADMIN_ONLY.permits(Role::Manager));
        assert!(ADMIN_OR_MANAGER.permits(Role::Manager));
        assert!(!ADMIN_OR_MANAGER.permits(Role::Sales));
        assert!(!RoleGate::new(&[]).permits(Role::Admin));
    }
}
