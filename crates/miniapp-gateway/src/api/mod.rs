//! HTTP API for the gateway.

mod handlers;
mod middleware;
mod types;

pub use handlers::*;
pub use middleware::{logging_middleware, panic_response, rate_limit_middleware, RateLimitState};
pub use types::*;

use crate::config::{Config, Credentials};
use anyhow::{Context, Result};
use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use leadteh_client::LeadtehClient;
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use url::Url;

/// Shared application state.
///
/// Read-only after start-up; requests share nothing else.
#[derive(Clone)]
pub struct AppState {
    /// Leadteh CRM client
    pub leadteh: Arc<LeadtehClient>,
    /// Configured secrets
    pub credentials: Arc<Credentials>,
}

impl AppState {
    /// Create new application state.
    pub fn new(leadteh: LeadtehClient, credentials: Credentials) -> Self {
        Self {
            leadteh: Arc::new(leadteh),
            credentials: Arc::new(credentials),
        }
    }

    /// Build state from loaded configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        let leadteh = LeadtehClient::new(
            &config.leadteh.api_url,
            &config.leadteh.webhook_url,
            config.leadteh.bot_id,
            config.leadteh.page_size,
            config.leadteh.timeout,
        )
        .context("Failed to create Leadteh client")?;

        // The webhook path is a bearer credential; log the host only.
        let webhook_host = Url::parse(leadteh.webhook_url())
            .context("Invalid Leadteh webhook URL")?
            .host_str()
            .unwrap_or_default()
            .to_string();
        info!(bot_id = leadteh.bot_id(), %webhook_host, "Leadteh client configured");

        Ok(Self::new(leadteh, config.credentials()))
    }
}

/// Create the API router with custom rate limiting.
///
/// Only submissions are limited; lookups always answer 200.
pub fn create_router_with_rate_limit(state: AppState, rate_limit: RateLimitState) -> Router {
    let submit = Router::new()
        .route(
            "/api/submit",
            post(handlers::submit_registration).fallback(handlers::submit_method_not_allowed),
        )
        .layer(axum_middleware::from_fn_with_state(
            rate_limit,
            rate_limit_middleware,
        ));

    Router::new()
        // Health check (no rate limiting)
        .route("/health", get(handlers::health))
        // `get` would also answer HEAD
        .route(
            "/api/contact",
            get(handlers::lookup_contact)
                .head(handlers::contact_method_not_allowed)
                .fallback(handlers::contact_method_not_allowed),
        )
        .merge(submit)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(axum_middleware::from_fn(logging_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Full application: router plus the configured CORS policy.
pub fn create_app(state: AppState, config: &Config) -> Router {
    let router = create_router_with_rate_limit(
        state,
        RateLimitState::new(config.rate_limit.per_minute),
    );

    if config.server.cors {
        router.layer(CorsLayer::permissive())
    } else {
        router
    }
}
