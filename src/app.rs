use axum::{
    http::{header, HeaderValue, StatusCode},
    middleware::{from_fn_with_state, map_response},
    response::{IntoResponse, Json, Response},
    routing::{delete, get, post, put},
    Router,
};
use serde_json::json;
use std::any::Any;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowOrigin, Any as AnyOrigin, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};
use tracing::{error, warn};

use crate::auth::{AuthError, PasswordHasher, TokenKeys};
use crate::config::AppConfig;
use crate::database::DocumentStore;
use crate::error::ApiError;
use crate::handlers::{protected, public};
use crate::middleware::role::{ADMIN_ONLY, ADMIN_OR_MANAGER};
use crate::middleware::{jwt_auth_middleware, require_role};
use crate::services::{CustomerService, LeadService, TaskService, TenantService, UserService};

/// Everything a request handler needs, built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn DocumentStore>,
    pub tokens: Arc<TokenKeys>,
    pub tenants: TenantService,
    pub users: UserService,
    pub customers: CustomerService,
    pub leads: LeadService,
    pub tasks: TaskService,
}

impl AppState {
    pub fn new(config: AppConfig, store: Arc<dyn DocumentStore>) -> Result<Self, AuthError> {
        let tokens = Arc::new(TokenKeys::from_config(&config.security)?);
        let passwords = PasswordHasher::new(config.security.bcrypt_cost)?;
        let tenants = TenantService::new(store.clone());
        let users = UserService::new(store.clone(), tenants.clone(), passwords, tokens.clone());

        Ok(Self {
            config: Arc::new(config),
            tokens,
            tenants,
            users,
            customers: CustomerService::new(store.clone()),
            leads: LeadService::new(store.clone()),
            tasks: TaskService::new(store.clone()),
            store,
        })
    }
}

pub fn app(state: AppState) -> Router {
    let config = state.config.clone();

    let mut router = Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .merge(public_routes())
        // Protected API
        .merge(user_routes(&state))
        .merge(customer_routes(&state))
        .merge(lead_routes(&state))
        .merge(task_routes(&state))
        .with_state(state)
        // Global middleware
        .layer(RequestBodyLimitLayer::new(config.api.max_request_size_bytes))
        .layer(
            ServiceBuilder::new()
                .layer(CatchPanicLayer::custom(panic_response))
                .layer(map_response(body_limit_response)),
        );

    if config.security.enable_cors {
        router = router.layer(cors_layer(&config.security.cors_origins));
    }
    if config.api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }
    router
}

fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/api/v1/tenants/register", post(public::tenants::register_post))
        .route("/api/v1/users/register", post(public::users::register_post))
        .route("/api/v1/users/login", post(public::users::login_post))
}

/// Wrap authenticated routes: the JWT check runs first, then the handler.
fn authenticated(state: &AppState, routes: Router<AppState>) -> Router<AppState> {
    routes.route_layer(from_fn_with_state(state.clone(), jwt_auth_middleware))
}

fn user_routes(state: &AppState) -> Router<AppState> {
    use protected::users;

    let listing = Router::new()
        .route("/api/v1/users", get(users::list_get))
        .route("/api/v1/users/", get(users::list_get))
        .route_layer(from_fn_with_state(ADMIN_OR_MANAGER, require_role));

    let admin = Router::new()
        .route("/api/v1/users/add", post(users::add_post))
        .route("/api/v1/users/status/:id", put(users::status_put))
        .route_layer(from_fn_with_state(ADMIN_ONLY, require_role));

    let own = Router::new().route("/api/v1/users/me", get(users::me_get));

    authenticated(state, listing.merge(admin).merge(own))
}

fn customer_routes(state: &AppState) -> Router<AppState> {
    use protected::customers;

    authenticated(
        state,
        Router::new()
            .route("/api/v1/customer/add", post(customers::add_post))
            .route("/api/v1/customer", get(customers::list_get))
            .route("/api/v1/customer/", get(customers::list_get))
            .route("/api/v1/customer/update/:id", put(customers::update_put))
            .route("/api/v1/customer/delete/:id", delete(customers::delete)),
    )
}

fn lead_routes(state: &AppState) -> Router<AppState> {
    use protected::leads;

    authenticated(
        state,
        Router::new()
            .route("/api/v1/lead/leads/create", post(leads::create_post))
            .route("/api/v1/lead/leads/get", get(leads::list_get))
            .route("/api/v1/lead/leads/update/:id", put(leads::update_put))
            .route("/api/v1/lead/leads/delete/:id", delete(leads::delete)),
    )
}

fn task_routes(state: &AppState) -> Router<AppState> {
    use protected::tasks;

    authenticated(
        state,
        Router::new()
            .route("/api/v1/task/task/create", post(tasks::create_post))
            .route("/api/v1/task/task/get", get(tasks::list_get))
            .route("/api/v1/task/task/get/:id", get(tasks::get))
            .route("/api/v1/task/task/update/:id", put(tasks::update_put))
            .route("/api/v1/task/task/delete/:id", delete(tasks::delete)),
    )
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(AnyOrigin).allow_headers(AnyOrigin);

    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return layer.allow_origin(AnyOrigin);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(allowed))
}

/// The body limit layer answers oversized requests in plain text; keep the JSON error shape.
async fn body_limit_response(response: Response) -> Response {
    let is_json = response
        .headers()
        .get(header::CONTENT_TYPE)
        .is_some_and(|value| value.as_bytes().starts_with(b"application/json"));
    if response.status() == StatusCode::PAYLOAD_TOO_LARGE && !is_json {
        return ApiError::payload_too_large().into_response();
    }
    response
}

fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    error!("Handler panicked: {}", detail);
    ApiError::internal_server_error("Internal server error").into_response()
}

async fn root() -> Json<serde_json::Value> {
    Json(json!({
        "message": "Tenant CRM API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "health": "/health (public)",
            "tenants": "/api/v1/tenants/register (public)",
            "users": "/api/v1/users/* (register and login public, rest protected)",
            "customers": "/api/v1/customer/* (protected)",
            "leads": "/api/v1/lead/leads/* (protected)",
            "tasks": "/api/v1/task/task/* (protected)",
        }
    }))
}

async fn health(axum::extract::State(state): axum::extract::State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.store.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "timestamp": now,
                "database": "ok"
            })),
        ),
        Err(e) => {
            error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "degraded",
                    "timestamp": now,
                    "database": "unavailable"
                })),
            )
        }
    }
}
