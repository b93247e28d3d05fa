#![allow(dead_code)]

use anyhow::{Context, Result};
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use tenant_crm::database::MemoryStore;
use tenant_crm::{app, AppConfig, AppState};

pub const TEST_SECRET: &str = "integration-test-secret-integration-0001";
pub const PASSWORD: &str = "Secret123";

pub fn test_config() -> AppConfig {
    let mut config = AppConfig::development();
    config.security.jwt_secret = TEST_SECRET.to_string();
    config.security.bcrypt_cost = 4;
    config.api.enable_request_logging = false;
    config
}

/// In-process application over a fresh memory store.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
}

/// A tenant plus one logged-in user of the given role.
pub struct Session {
    pub tenant_id: String,
    pub user_id: String,
    pub token: String,
}

pub struct Reply {
    pub status: StatusCode,
    pub body: Value,
}

impl Reply {
    pub fn message(&self) -> &str {
        self.body["message"].as_str().unwrap_or_default()
    }
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: AppConfig) -> Self {
        let state = AppState::new(config, Arc::new(MemoryStore::new())).expect("state");
        Self {
            router: app(state.clone()),
            state,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Result<Reply> {
        let response = self.router.clone().oneshot(request).await.context("router call")?;
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await?;
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        Ok(Reply { status, body })
    }

    pub async fn call(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Result<Reply> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))?,
            None => builder.body(Body::empty())?,
        };
        self.send(request).await
    }

    pub async fn get(&self, uri: &str, token: &str) -> Result<Reply> {
        self.call(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> Result<Reply> {
        self.call(Method::POST, uri, Some(token), Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: &str, body: Value) -> Result<Reply> {
        self.call(Method::PUT, uri, Some(token), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> Result<Reply> {
        self.call(Method::DELETE, uri, Some(token), None).await
    }

    pub async fn public_post(&self, uri: &str, body: Value) -> Result<Reply> {
        self.call(Method::POST, uri, None, Some(body)).await
    }

    pub async fn create_tenant(&self, slug: &str) -> Result<String> {
        let reply = self
            .public_post(
                "/api/v1/tenants/register",
                json!({"name": format!("{} Inc", slug), "email": format!("ops@{}.io", slug)}),
            )
            .await?;
        anyhow::ensure!(reply.status == StatusCode::CREATED, "tenant register failed: {}", reply.body);
        Ok(reply.body["tenant"]["id"].as_str().context("tenant id")?.to_string())
    }

    pub async fn register_user(&self, tenant_id: &str, email: &str, role: &str) -> Result<String> {
        let reply = self
            .public_post(
                "/api/v1/users/register",
                json!({
                    "tenantId": tenant_id,
                    "name": "Test User",
                    "email": email,
                    "password": PASSWORD,
                    "role": role
                }),
            )
            .await?;
        anyhow::ensure!(reply.status == StatusCode::CREATED, "user register failed: {}", reply.body);
        Ok(reply.body["user"]["id"].as_str().context("user id")?.to_string())
    }

    pub async fn login(&self, email: &str) -> Result<String> {
        let reply = self
            .public_post("/api/v1/users/login", json!({"email": email, "password": PASSWORD}))
            .await?;
        anyhow::ensure!(reply.status == StatusCode::OK, "login failed: {}", reply.body);
        Ok(reply.body["token"].as_str().context("token")?.to_string())
    }

    /// New tenant named `slug` with a user `<role>@<slug>.io`, logged in.
    pub async fn session(&self, slug: &str, role: &str) -> Result<Session> {
        let tenant_id = self.create_tenant(slug).await?;
        self.join(&tenant_id, slug, role).await
    }

    /// Another logged-in user inside an existing tenant.
    pub async fn join(&self, tenant_id: &str, slug: &str, role: &str) -> Result<Session> {
        let email = format!("{}@{}.io", role, slug);
        let user_id = self.register_user(tenant_id, &email, role).await?;
        let token = self.login(&email).await?;
        Ok(Session {
            tenant_id: tenant_id.to_string(),
            user_id,
            token,
        })
    }

    pub async fn create_customer(&self, session: &Session, name: &str) -> Result<String> {
        let reply = self
            .post(
                "/api/v1/customer/add",
                &session.token,
                json!({
                    "name": name,
                    "email": format!("{}@client.io", name.to_lowercase().replace(' ', ".")),
                    "phone": "555-0100",
                    "company": "Initech"
                }),
            )
            .await?;
        anyhow::ensure!(reply.status == StatusCode::CREATED, "customer create failed: {}", reply.body);
        Ok(reply.body["customer"]["id"].as_str().context("customer id")?.to_string())
    }
}
