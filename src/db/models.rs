/// Database models for accounts and sign-in tokens
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Account record in the database
///
/// Created on the first sign-in request for an email; the id is stable
/// and never reassigned.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    /// Stored normalized: trimmed and lowercased
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// Single-use sign-in token record
///
/// Valid while `used` is false and the expiry instant has not passed.
/// `used` flips false to true exactly once and is never reversed; the
/// record itself is never deleted.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct MagicToken {
    pub token: String,
    pub account_id: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub used: bool,
}
