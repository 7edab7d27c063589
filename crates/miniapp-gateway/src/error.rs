//! Error types for the gateway.

use crate::init_data::InitDataError;
use crate::registration::{BodyError, ValidationError};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use leadteh_client::LeadtehError;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Gateway error types.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Carries the single method the route allows.
    #[error("Method Not Allowed")]
    MethodNotAllowed(&'static str),

    #[error(transparent)]
    InvalidBody(#[from] BodyError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Invalid Telegram initData signature")]
    InvalidSignature(#[from] InitDataError),

    #[error("Leadteh webhook error")]
    Upstream { status: u16, body: Value },

    #[error("Rate limit exceeded")]
    RateLimited,

    #[error("Unhandled server error")]
    Internal(String),
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ErrorResponse {
    fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            status: None,
            body: None,
            message: None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::InvalidBody(_) | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::InvalidSignature(_) => StatusCode::FORBIDDEN,
            ApiError::Upstream { .. } => StatusCode::BAD_GATEWAY,
            ApiError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let mut body = ErrorResponse::new(self.to_string());

        match self {
            ApiError::MethodNotAllowed(allow) => {
                return (status, [(header::ALLOW, allow)], Json(body)).into_response();
            }
            ApiError::Upstream {
                status: upstream_status,
                body: upstream_body,
            } => {
                body.status = Some(upstream_status);
                body.body = Some(upstream_body);
            }
            ApiError::Internal(message) => {
                body.message = Some(message);
            }
            _ => {}
        }

        (status, Json(body)).into_response()
    }
}

impl From<LeadtehError> for ApiError {
    fn from(e: LeadtehError) -> Self {
        match e {
            LeadtehError::Webhook { status, body } => ApiError::Upstream { status, body },
            other => ApiError::Internal(other.to_string()),
        }
    }
}
