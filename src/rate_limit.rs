/// Rate limiting
///
/// Two direct (unkeyed) limiters: a strict quota for the
/// unauthenticated sign-in endpoints and a looser one for the rest of
/// the API.
use crate::{
    config::RateLimitConfig,
    context::AppContext,
    error::{AppError, AppResult},
};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter as GovernorLimiter,
};
use std::{num::NonZeroU32, sync::Arc};

/// Rate limiter manager
#[derive(Clone)]
pub struct RateLimiter {
    auth: Arc<GovernorLimiter<NotKeyed, InMemoryState, DefaultClock>>,
    general: Arc<GovernorLimiter<NotKeyed, InMemoryState, DefaultClock>>,
}

impl RateLimiter {
    pub fn new(config: &RateLimitConfig) -> Self {
        let auth_quota = Quota::per_minute(
            NonZeroU32::new(config.auth_requests_per_minute).unwrap_or(NonZeroU32::new(30).unwrap()),
        );
        let general_quota = Quota::per_minute(
            NonZeroU32::new(config.general_requests_per_minute)
                .unwrap_or(NonZeroU32::new(600).unwrap()),
        );

        Self {
            auth: Arc::new(GovernorLimiter::direct(auth_quota)),
            general: Arc::new(GovernorLimiter::direct(general_quota)),
        }
    }

    /// Check quota for the sign-in endpoints
    pub fn check_auth(&self) -> AppResult<()> {
        self.auth.check().map_err(|_| AppError::RateLimitExceeded)
    }

    /// Check quota for everything else
    pub fn check_general(&self) -> AppResult<()> {
        self.general.check().map_err(|_| AppError::RateLimitExceeded)
    }
}

/// Axum middleware applying the limiter by path class
pub async fn rate_limit_middleware(
    State(ctx): State<AppContext>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if ctx.config.rate_limit.enabled {
        if request.uri().path().starts_with("/api/auth") {
            ctx.rate_limiter.check_auth()?;
        } else {
            ctx.rate_limiter.check_general()?;
        }
    }

    Ok(next.run(request).await)
}
