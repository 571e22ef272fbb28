/// Sign-in API endpoints
use crate::{
    context::AppContext,
    error::{AppError, AppResult},
    session::SessionBoundary,
};
use axum::{
    extract::{Query, State},
    http::{header, HeaderMap},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

/// Build sign-in routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/api/auth/request", post(request_sign_in))
        .route("/api/auth/verify", get(verify_sign_in))
}

#[derive(Debug, Deserialize)]
pub struct RequestSignInBody {
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct RequestSignInResponse {
    pub ok: bool,
}

/// POST /api/auth/request
///
/// Issues a sign-in token for the email and dispatches the sign-in URL
/// by email. The token stays persisted and valid even when delivery
/// fails; the user can always request a fresh link.
pub async fn request_sign_in(
    State(ctx): State<AppContext>,
    headers: HeaderMap,
    Json(body): Json<RequestSignInBody>,
) -> AppResult<Json<RequestSignInResponse>> {
    let base_url = derive_base_url(&headers, &ctx.config.fallback_base_url());

    let issued = ctx.auth.issue_token(&body.email, &base_url).await?;
    ctx.mailer
        .send_sign_in_email(&issued.email, &issued.login_url)
        .await?;

    Ok(Json(RequestSignInResponse { ok: true }))
}

#[derive(Debug, Deserialize)]
pub struct VerifyParams {
    #[serde(default)]
    pub token: Option<String>,
}

/// GET /api/auth/verify?token=...
///
/// Verifies and consumes a sign-in token, returning the client-held
/// session. Unknown, consumed, and expired tokens all map to the same
/// client response.
pub async fn verify_sign_in(
    State(ctx): State<AppContext>,
    Query(params): Query<VerifyParams>,
) -> AppResult<Json<SessionBoundary>> {
    let token = params
        .token
        .ok_or_else(|| AppError::Validation("Token is required".to_string()))?;

    let session = ctx.auth.verify_token(token.trim()).await?;
    Ok(Json(session))
}

/// Scheme and host for sign-in URLs, honoring reverse-proxy forwarding
/// headers, then the request's own host, then the configured fallback.
fn derive_base_url(headers: &HeaderMap, fallback: &str) -> String {
    let proto = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("https");

    let host = headers
        .get("x-forwarded-host")
        .or_else(|| headers.get(header::HOST))
        .and_then(|v| v.to_str().ok());

    match host {
        Some(host) => format!("{}://{}", proto, host),
        None => fallback.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    const FALLBACK: &str = "http://localhost:8080";

    #[test]
    fn test_forwarded_headers_win_over_host() {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static("internal:8080"));
        headers.insert("x-forwarded-host", HeaderValue::from_static("log.example.com"));
        headers.insert("x-forwarded-proto", HeaderValue::from_static("https"));

        assert_eq!(derive_base_url(&headers, FALLBACK), "https://log.example.com");
    }

    #[test]
    fn test_host_header_fallback_assumes_https() {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static("log.example.com"));

        assert_eq!(derive_base_url(&headers, FALLBACK), "https://log.example.com");
    }

    #[test]
    fn test_no_host_falls_back_to_configured_url() {
        assert_eq!(derive_base_url(&HeaderMap::new(), FALLBACK), FALLBACK);
    }
}
