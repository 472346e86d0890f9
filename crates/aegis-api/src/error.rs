//! API errors and the response envelope

use aegis_core::ValidationError;
use aegis_integrations::GatewayError;
use aegis_storage::StoreError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// JSON envelope every endpoint answers with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            code: None,
        }
    }
}

impl ApiResponse<()> {
    pub fn failure(code: &str, message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
            code: Some(code.to_string()),
        }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::InvalidInput(err.to_string())
    }
}

impl ApiError {
    /// Stable machine-readable code
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::InvalidInput(_) => "invalid_input",
            ApiError::NotFound(_) => "not_found",
            ApiError::Store(err) => match err {
                StoreError::NotFound { .. } => "not_found",
                StoreError::AlreadyExists { .. } => "already_exists",
                StoreError::NotIndexed(_) | StoreError::EmptyId(_) => "invalid_input",
                StoreError::Backend(_) | StoreError::Serialization(_) => "storage_error",
            },
            ApiError::Gateway(err) => match err {
                GatewayError::NotConfigured { .. } => "not_configured",
                GatewayError::MissingCredentials { .. } => "missing_credentials",
                GatewayError::Upstream { .. } => "upstream_error",
                GatewayError::Transport { .. } => "upstream_unreachable",
                GatewayError::InvalidBody { .. } => "invalid_upstream_body",
            },
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self.error_code() {
            "invalid_input" | "not_configured" | "missing_credentials" => StatusCode::BAD_REQUEST,
            "not_found" => StatusCode::NOT_FOUND,
            "already_exists" => StatusCode::CONFLICT,
            "upstream_error" | "upstream_unreachable" | "invalid_upstream_body" => {
                StatusCode::BAD_GATEWAY
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.error_code();
        if status.is_server_error() {
            tracing::error!(code, error = %self, "Request failed");
        } else {
            tracing::debug!(code, error = %self, "Request rejected");
        }
        (status, Json(ApiResponse::failure(code, self.to_string()))).into_response()
    }
}
