// handlers/protected/customers.rs - /api/v1/customer/*

use axum::extract::State;
use uuid::Uuid;

use crate::api::{ApiPath, ApiQuery, PageQuery, ValidatedJson};
use crate::app::AppState;
use crate::database::models::{CustomerPatch, NewCustomer};
use crate::middleware::{ApiResponse, ApiResult, AuthContext};

pub async fn add_post(
    State(state): State<AppState>,
    auth: AuthContext,
    ValidatedJson(body): ValidatedJson<NewCustomer>,
) -> ApiResult {
    let customer = state.customers.create(&auth, body).await?;
    Ok(ApiResponse::created("Customer created successfully").with("customer", customer))
}

pub async fn list_get(State(state): State<AppState>, auth: AuthContext, ApiQuery(query): ApiQuery<PageQuery>) -> ApiResult {
    let request = query.resolve(&state.config.api)?;
    let page = state.customers.list(&auth, request).await?;
    Ok(ApiResponse::paginated("Customers retrieved successfully", page))
}

pub async fn update_put(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiPath(id): ApiPath<Uuid>,
    ValidatedJson(body): ValidatedJson<CustomerPatch>,
) -> ApiResult {
    let customer = state.customers.update(&auth, id, body).await?;
    Ok(ApiResponse::ok("Customer updated successfully").with("customer", customer))
}

pub async fn delete(State(state): State<AppState>, auth: AuthContext, ApiPath(id): ApiPath<Uuid>) -> ApiResult {
    state.customers.delete(&auth, id).await?;
    Ok(ApiResponse::ok("Customer deleted successfully"))
}
