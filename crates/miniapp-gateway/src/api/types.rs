//! API request and response types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Query string of `GET /api/contact`.
#[derive(Debug, Deserialize)]
pub struct ContactQuery {
    pub telegram_id: Option<String>,
}

/// Response after a registration was accepted by the CRM.
#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub ok: bool,
    /// Webhook response body, `null` when it was empty or not JSON
    pub leadteh: Value,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// Whether a Leadteh read token is configured
    pub lookup_enabled: bool,
    /// Whether submissions must carry signed initData
    pub signature_required: bool,
}
