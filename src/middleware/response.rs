use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::database::Page;
use crate::error::ApiError;

pub type ApiResult = Result<ApiResponse, ApiError>;

/// Success body: `{message, ...}` with the resource under a named key or the
/// pagination envelope flattened alongside the message.
#[derive(Debug)]
pub struct ApiResponse {
    status: StatusCode,
    body: Map<String, Value>,
    failure: Option<serde_json::Error>,
}

impl ApiResponse {
    pub fn with_status(status: StatusCode, message: impl Into<String>) -> Self {
        let mut body = Map::new();
        body.insert("message".to_string(), Value::String(message.into()));
        Self {
            status,
            body,
            failure: None,
        }
    }

    /// 200 OK
    pub fn ok(message: impl Into<String>) -> Self {
        Self::with_status(StatusCode::OK, message)
    }

    /// 201 Created
    pub fn created(message: impl Into<String>) -> Self {
        Self::with_status(StatusCode::CREATED, message)
    }

    /// Attach a serializable value under `key`.
    pub fn with(mut self, key: &str, value: impl Serialize) -> Self {
        match serde_json::to_value(value) {
            Ok(value) => {
                self.body.insert(key.to_string(), value);
            }
            Err(e) => self.failure = Some(e),
        }
        self
    }

    pub fn paginated<T: Serialize>(message: impl Into<String>, page: Page<T>) -> Self {
        let mut response = Self::ok(message);
        match serde_json::to_value(page) {
            Ok(Value::Object(envelope)) => response.body.extend(envelope),
            Ok(_) => {}
            Err(e) => response.failure = Some(e),
        }
        response
    }
}

impl IntoResponse for ApiResponse {
    fn into_response(self) -> Response {
        if let Some(e) = self.failure {
            tracing::error!("Failed to serialize response data: {}", e);
            return ApiError::internal_server_error("Failed to format response").into_response();
        }
        (self.status, Json(Value::Object(self.body))).into_response()
    }
}
