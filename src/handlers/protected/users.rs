// handlers/protected/users.rs - /api/v1/users/* (authenticated)

use axum::extract::State;
use uuid::Uuid;

use crate::api::{ApiPath, ApiQuery, PageQuery, ValidatedJson};
use crate::app::AppState;
use crate::database::models::{NewUser, StatusChange};
use crate::middleware::{ApiResponse, ApiResult, AuthContext};

/// GET /api/v1/users/ (admin, manager)
pub async fn list_get(State(state): State<AppState>, auth: AuthContext, ApiQuery(query): ApiQuery<PageQuery>) -> ApiResult {
    let request = query.resolve(&state.config.api)?;
    let page = state.users.list(&auth, request).await?;
    Ok(ApiResponse::paginated("Users retrieved successfully", page))
}

/// GET /api/v1/users/me
pub async fn me_get(State(state): State<AppState>, auth: AuthContext) -> ApiResult {
    let user = state.users.me(&auth).await?;
    Ok(ApiResponse::ok("User retrieved successfully").with("user", user))
}

/// POST /api/v1/users/add (admin). The new user joins the caller's tenant.
pub async fn add_post(
    State(state): State<AppState>,
    auth: AuthContext,
    ValidatedJson(body): ValidatedJson<NewUser>,
) -> ApiResult {
    let user = state.users.register(auth.tenant_id, body).await?;
    Ok(ApiResponse::created("User added successfully").with("user", user))
}

/// PUT /api/v1/users/status/:id (admin)
pub async fn status_put(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiPath(id): ApiPath<Uuid>,
    ValidatedJson(body): ValidatedJson<StatusChange>,
) -> ApiResult {
    let user = state.users.set_status(&auth, id, body.status).await?;
    Ok(ApiResponse::ok("User status updated successfully").with("user", user))
}
