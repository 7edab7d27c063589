//! HTTP request handlers.

use super::types::{ContactQuery, HealthResponse, SubmitResponse};
use super::AppState;
use crate::contact::{ContactLookup, NormalizedContact};
use crate::error::ApiError;
use crate::init_data::verify_init_data;
use crate::registration::RegistrationRequest;
use axum::{
    body::Bytes,
    extract::{Query, State},
    Json,
};
use chrono::Utc;
use leadteh_client::{find_contact, LeadtehError};
use tracing::{debug, error, info, warn};

/// Health check endpoint.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        lookup_enabled: state.credentials.leadteh_api_token().is_some(),
        signature_required: state.credentials.telegram_bot_token().is_some(),
    })
}

/// Prefill lookup: find a CRM contact by Telegram id.
///
/// Every failure degrades to `{found: false}` so the form stays usable.
pub async fn lookup_contact(
    State(state): State<AppState>,
    query: Option<Query<ContactQuery>>,
) -> Json<ContactLookup> {
    let telegram_id = query
        .and_then(|Query(q)| q.telegram_id)
        .filter(|id| !id.is_empty());

    let Some(telegram_id) = telegram_id else {
        debug!("Contact lookup without telegram_id");
        return Json(ContactLookup::not_found());
    };

    // Soft-fail hides a missing token from callers; make it loud in the logs.
    let Some(api_token) = state.credentials.leadteh_api_token() else {
        warn!("LEADTEH_API_TOKEN is not configured, contact prefill is disabled");
        return Json(ContactLookup::not_found());
    };

    let contacts = match state.leadteh.get_contacts(api_token).await {
        Ok(contacts) => contacts,
        Err(e) => {
            warn!(error = %e, "Contact lookup failed");
            return Json(ContactLookup::not_found());
        }
    };

    match find_contact(&contacts, &telegram_id) {
        Some(contact) => {
            info!(telegram_id = %telegram_id, "Contact found");
            Json(ContactLookup::found(NormalizedContact::from_crm(contact)))
        }
        None => {
            debug!(telegram_id = %telegram_id, scanned = contacts.len(), "Contact not found");
            Json(ContactLookup::not_found())
        }
    }
}

/// Accept a registration and forward it to the CRM webhook.
pub async fn submit_registration(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<SubmitResponse>, ApiError> {
    let request = RegistrationRequest::from_body(&body)?;

    if let Some(bot_token) = state.credentials.telegram_bot_token() {
        let init_data = verify_init_data(request.init_data(), bot_token).map_err(|e| {
            warn!(error = %e, "Rejected registration with invalid initData");
            ApiError::from(e)
        })?;
        debug!(auth_date = ?init_data.get("auth_date"), "initData verified");
    }

    let registration = request.validate().map_err(|e| {
        debug!(error = %e, "Registration failed validation");
        ApiError::from(e)
    })?;

    let envelope = registration.to_envelope(Utc::now());
    let reply = state
        .leadteh
        .send_webhook(&envelope)
        .await
        .map_err(|e| {
            if !matches!(e, LeadtehError::Webhook { .. }) {
                error!(error = %e, "Leadteh webhook call failed");
            }
            ApiError::from(e)
        })?;

    info!(
        search = %envelope.search,
        status = reply.status,
        "Registration forwarded to Leadteh"
    );

    Ok(Json(SubmitResponse {
        ok: true,
        leadteh: reply.body,
    }))
}

/// Fallback for non-GET requests to the lookup route.
pub async fn contact_method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed("GET")
}

/// Fallback for non-POST requests to the submission route.
pub async fn submit_method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed("POST")
}
