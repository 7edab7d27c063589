//! Rate limiting, logging and panic handling.

use crate::error::ApiError;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use std::{any::Any, num::NonZeroU32, sync::Arc};
use tracing::{debug, error, warn};

/// Global rate limiter (not keyed by IP).
pub type GlobalLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Rate limiter state shared across requests.
#[derive(Clone)]
pub struct RateLimitState {
    /// Global rate limiter, `None` when limiting is disabled
    pub global: Option<Arc<GlobalLimiter>>,
}

impl RateLimitState {
    /// Create a limiter allowing `requests_per_minute`; zero disables it.
    pub fn new(requests_per_minute: u32) -> Self {
        let global = NonZeroU32::new(requests_per_minute)
            .map(|rpm| Arc::new(RateLimiter::direct(Quota::per_minute(rpm))));

        Self { global }
    }

    /// A limiter that never rejects.
    pub fn disabled() -> Self {
        Self { global: None }
    }

    fn check(&self) -> bool {
        self.global
            .as_ref()
            .map_or(true, |limiter| limiter.check().is_ok())
    }
}

/// Rate limiting middleware.
///
/// Checks the global rate limit and returns 429 Too Many Requests if exceeded.
pub async fn rate_limit_middleware(
    State(rate_limit): State<RateLimitState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if !rate_limit.check() {
        warn!("Global rate limit exceeded");
        return Err(ApiError::RateLimited);
    }

    debug!("Rate limit check passed");
    Ok(next.run(request).await)
}

/// Logging middleware for requests.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = std::time::Instant::now();

    debug!(%method, %uri, "Request started");

    let response = next.run(request).await;

    let duration = start.elapsed();
    let status = response.status();

    if status.is_success() {
        debug!(%method, %uri, %status, ?duration, "Request completed");
    } else {
        warn!(%method, %uri, %status, ?duration, "Request failed");
    }

    response
}

/// Turn a handler panic into the standard 500 body.
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown".to_string()
    };

    error!(%message, "Handler panicked");
    ApiError::Internal(message).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_rate_limit_state_creation() {
        let state = RateLimitState::new(10);
        // Should allow first request
        assert!(state.check());
    }

    #[test]
    fn test_rate_limit_exhaustion() {
        let state = RateLimitState::new(1);

        assert!(state.check());
        assert!(!state.check());
    }

    #[test]
    fn test_zero_disables_limiter() {
        let state = RateLimitState::new(0);
        assert!(state.global.is_none());
        for _ in 0..1000 {
            assert!(state.check());
        }
    }

    #[test]
    fn test_disabled_rate_limit() {
        let state = RateLimitState::disabled();
        for _ in 0..100 {
            assert!(state.check());
        }
    }

    #[test]
    fn test_panic_response_extracts_message() {
        let response = panic_response(Box::new("boom"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let response = panic_response(Box::new(String::from("owned boom")));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
