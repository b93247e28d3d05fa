// handlers/protected/leads.rs - /api/v1/lead/leads/*

use axum::extract::State;
use uuid::Uuid;

use crate::api::{ApiPath, ApiQuery, LeadQuery, ValidatedJson};
use crate::app::AppState;
use crate::database::models::{LeadPatch, NewLead};
use crate::middleware::{ApiResponse, ApiResult, AuthContext};

pub async fn create_post(
    State(state): State<AppState>,
    auth: AuthContext,
    ValidatedJson(body): ValidatedJson<NewLead>,
) -> ApiResult {
    let lead = state.leads.create(&auth, body).await?;
    Ok(ApiResponse::created("Lead created successfully").with("lead", lead))
}

/// Supports `status` and `assignedTo` filters next to `page` / `limit`.
pub async fn list_get(State(state): State<AppState>, auth: AuthContext, ApiQuery(query): ApiQuery<LeadQuery>) -> ApiResult {
    let request = query.page_query().resolve(&state.config.api)?;
    let filter = query.filter()?;
    let page = state.leads.list(&auth, filter, request).await?;
    Ok(ApiResponse::paginated("Leads retrieved successfully", page))
}

pub async fn update_put(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiPath(id): ApiPath<Uuid>,
    ValidatedJson(body): ValidatedJson<LeadPatch>,
) -> ApiResult {
    let lead = state.leads.update(&auth, id, body).await?;
    Ok(ApiResponse::ok("Lead updated successfully").with("lead", lead))
}

pub async fn delete(State(state): State<AppState>, auth: AuthContext, ApiPath(id): ApiPath<Uuid>) -> ApiResult {
    state.leads.delete(&auth, id).await?;
    Ok(ApiResponse::ok("Lead deleted successfully"))
}
