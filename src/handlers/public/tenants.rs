// handlers/public/tenants.rs - POST /api/v1/tenants/register

use axum::extract::State;

use crate::api::ValidatedJson;
use crate::app::AppState;
use crate::database::models::NewTenant;
use crate::middleware::{ApiResponse, ApiResult};

pub async fn register_post(State(state): State<AppState>, ValidatedJson(body): ValidatedJson<NewTenant>) -> ApiResult {
    let tenant = state.tenants.create(body).await?;
    Ok(ApiResponse::created("Tenant created successfully").with("tenant", tenant))
}
