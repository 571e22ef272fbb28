/// API routes and handlers
pub mod auth;
pub mod entries;

use crate::context::AppContext;
use axum::Router;

/// Build API routes
pub fn routes() -> Router<AppContext> {
    Router::new().merge(auth::routes()).merge(entries::routes())
}
