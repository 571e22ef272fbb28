/// Sign-in token lifecycle

use crate::{
    db::models::{Account, MagicToken},
    error::{AppError, AppResult, TokenRejection},
    session::SessionBoundary,
};
use chrono::{DateTime, Duration, Utc};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

/// How long an issued sign-in token stays valid
pub const TOKEN_TTL_MINUTES: i64 = 15;

/// Result of issuing a sign-in token
///
/// The raw token appears here and in the sign-in URL, nowhere else.
/// Callers must not log either field.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub login_url: String,
    pub account_id: String,
    pub email: String,
}

/// Sign-in token manager
///
/// The durable store is the single authority for whether a token has
/// been consumed; no in-process state is kept between requests.
pub struct AuthManager {
    db: SqlitePool,
}

impl AuthManager {
    /// Create a new auth manager
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Issue a sign-in token for an email address
    ///
    /// Resolves or creates the account for the normalized email, then
    /// persists a fresh token expiring in [`TOKEN_TTL_MINUTES`].
    /// Outstanding tokens for the same account stay valid; each token
    /// is independent.
    pub async fn issue_token(&self, email: &str, base_url: &str) -> AppResult<IssuedToken> {
        let email = normalize_email(email);
        if !is_valid_email(&email) {
            return Err(AppError::Validation(
                "A valid email address is required".to_string(),
            ));
        }

        let account = self.resolve_or_create_account(&email).await?;

        let now = Utc::now();
        let record = MagicToken {
            token: Uuid::new_v4().to_string(),
            account_id: account.id.clone(),
            created_at: now,
            expires_at: now + Duration::minutes(TOKEN_TTL_MINUTES),
            used: false,
        };

        sqlx::query(
            "INSERT INTO magic_token (token, account_id, created_at, expires_at, used)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(&record.token)
        .bind(&record.account_id)
        .bind(record.created_at)
        .bind(record.expires_at)
        .bind(record.used)
        .execute(&self.db)
        .await
        .map_err(AppError::Database)?;

        let login_url = format!("{}/?token={}", base_url.trim_end_matches('/'), record.token);

        Ok(IssuedToken {
            token: record.token,
            login_url,
            account_id: account.id,
            email: account.email,
        })
    }

    /// Verify and consume a sign-in token
    ///
    /// Consumption is check-and-set: the flip to `used` is conditioned
    /// on the token still being unconsumed, so of two racing
    /// verifications exactly one succeeds.
    pub async fn verify_token(&self, token: &str) -> AppResult<SessionBoundary> {
        if token.is_empty() {
            return Err(AppError::Validation("Token is required".to_string()));
        }

        let row = sqlx::query(
            "SELECT mt.account_id, mt.expires_at, mt.used, a.email
             FROM magic_token mt
             JOIN account a ON a.id = mt.account_id
             WHERE mt.token = ?1",
        )
        .bind(token)
        .fetch_optional(&self.db)
        .await
        .map_err(AppError::Database)?
        .ok_or_else(|| self.reject(TokenRejection::Unknown))?;

        if row.get::<bool, _>("used") {
            return Err(self.reject(TokenRejection::AlreadyUsed));
        }

        let expires_at: DateTime<Utc> = row.get("expires_at");
        if Utc::now() >= expires_at {
            return Err(self.reject(TokenRejection::Expired));
        }

        let result = sqlx::query(
            "UPDATE magic_token SET used = TRUE WHERE token = ?1 AND used = FALSE",
        )
        .bind(token)
        .execute(&self.db)
        .await
        .map_err(AppError::Database)?;

        // Zero rows means a concurrent verification consumed it first
        if result.rows_affected() == 0 {
            return Err(self.reject(TokenRejection::AlreadyUsed));
        }

        Ok(SessionBoundary::establish(
            row.get::<String, _>("account_id"),
            row.get::<String, _>("email"),
        ))
    }

    /// Record a rejection internally; the token value itself is never logged
    fn reject(&self, reason: TokenRejection) -> AppError {
        tracing::info!(reason = %reason, "sign-in token rejected");
        AppError::TokenRejected(reason)
    }

    /// Resolve the account for a normalized email, creating it on first
    /// contact. Idempotent: the same email always yields the same id,
    /// including under concurrent first-time requests.
    async fn resolve_or_create_account(&self, email: &str) -> AppResult<Account> {
        if let Some(account) = self.get_account_by_email(email).await? {
            return Ok(account);
        }

        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        // A concurrent request may insert first; the unique email index
        // plus re-select makes the winner's id authoritative.
        sqlx::query(
            "INSERT INTO account (id, email, created_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(email) DO NOTHING",
        )
        .bind(&id)
        .bind(email)
        .bind(now)
        .execute(&self.db)
        .await
        .map_err(AppError::Database)?;

        self.get_account_by_email(email)
            .await?
            .ok_or_else(|| AppError::Internal("Account lookup failed after insert".to_string()))
    }

    /// Get account by normalized email
    async fn get_account_by_email(&self, email: &str) -> AppResult<Option<Account>> {
        sqlx::query_as::<_, Account>("SELECT id, email, created_at FROM account WHERE email = ?1")
            .bind(email)
            .fetch_optional(&self.db)
            .await
            .map_err(AppError::Database)
    }
}

/// Trim and lowercase so identity resolution is case- and
/// whitespace-insensitive
fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Structural local@domain.tld check
fn is_valid_email(email: &str) -> bool {
    if email.contains(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn create_test_manager() -> AuthManager {
        // One connection so every query sees the same in-memory database
        let db = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(":memory:")
            .await
            .unwrap();

        sqlx::query(
            r#"
            CREATE TABLE account (
                id TEXT PRIMARY KEY,
                email TEXT NOT NULL UNIQUE,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&db)
        .await
        .unwrap();

        sqlx::query(
            r#"
            CREATE TABLE magic_token (
                token TEXT PRIMARY KEY,
                account_id TEXT NOT NULL REFERENCES account(id),
                created_at TEXT NOT NULL,
                expires_at TEXT NOT NULL,
                used INTEGER NOT NULL DEFAULT 0
            )
            "#,
        )
        .execute(&db)
        .await
        .unwrap();

        AuthManager::new(db)
    }

    const BASE_URL: &str = "https://log.example.com";

    #[tokio::test]
    async fn test_issue_resolves_same_account_for_same_email() {
        let manager = create_test_manager().await;

        let first = manager
            .issue_token("  Runner@Example.COM ", BASE_URL)
            .await
            .unwrap();
        let second = manager
            .issue_token("runner@example.com", BASE_URL)
            .await
            .unwrap();

        assert_eq!(first.account_id, second.account_id);
        assert_eq!(first.email, "runner@example.com");
        assert_ne!(first.token, second.token);
    }

    #[tokio::test]
    async fn test_issue_rejects_malformed_email() {
        let manager = create_test_manager().await;

        for bad in ["", "   ", "runner", "runner@", "@example.com", "runner@example", "a b@c.d", "a@b@c.d"] {
            let result = manager.issue_token(bad, BASE_URL).await;
            assert!(
                matches!(result, Err(AppError::Validation(_))),
                "expected rejection for {:?}",
                bad
            );
        }
    }

    #[tokio::test]
    async fn test_login_url_embeds_token_once() {
        let manager = create_test_manager().await;

        let issued = manager.issue_token("a@b.com", BASE_URL).await.unwrap();
        assert_eq!(
            issued.login_url,
            format!("{}/?token={}", BASE_URL, issued.token)
        );
    }

    #[tokio::test]
    async fn test_verify_consumes_token_exactly_once() {
        let manager = create_test_manager().await;

        let issued = manager.issue_token("a@b.com", BASE_URL).await.unwrap();

        let session = manager.verify_token(&issued.token).await.unwrap();
        assert_eq!(session.user_id, issued.account_id);
        assert_eq!(session.email, "a@b.com");

        let replay = manager.verify_token(&issued.token).await;
        assert!(matches!(
            replay,
            Err(AppError::TokenRejected(TokenRejection::AlreadyUsed))
        ));
    }

    #[tokio::test]
    async fn test_concurrent_verify_single_success() {
        let manager = create_test_manager().await;
        let issued = manager.issue_token("a@b.com", BASE_URL).await.unwrap();

        let (first, second) = tokio::join!(
            manager.verify_token(&issued.token),
            manager.verify_token(&issued.token)
        );

        let successes = [&first, &second].iter().filter(|r| r.is_ok()).count();
        assert_eq!(successes, 1);
    }

    #[tokio::test]
    async fn test_verify_unknown_token() {
        let manager = create_test_manager().await;

        let result = manager.verify_token("no-such-token").await;
        assert!(matches!(
            result,
            Err(AppError::TokenRejected(TokenRejection::Unknown))
        ));
    }

    #[tokio::test]
    async fn test_verify_empty_token() {
        let manager = create_test_manager().await;

        let result = manager.verify_token("").await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_verify_expired_token() {
        let manager = create_test_manager().await;
        let issued = manager.issue_token("a@b.com", BASE_URL).await.unwrap();

        sqlx::query("UPDATE magic_token SET expires_at = ?1 WHERE token = ?2")
            .bind(Utc::now() - Duration::minutes(1))
            .bind(&issued.token)
            .execute(&manager.db)
            .await
            .unwrap();

        let result = manager.verify_token(&issued.token).await;
        assert!(matches!(
            result,
            Err(AppError::TokenRejected(TokenRejection::Expired))
        ));
    }

    #[tokio::test]
    async fn test_issuing_leaves_older_tokens_valid() {
        let manager = create_test_manager().await;

        let first = manager.issue_token("a@b.com", BASE_URL).await.unwrap();
        let second = manager.issue_token("a@b.com", BASE_URL).await.unwrap();

        // Consuming the newer token does not touch the older one
        manager.verify_token(&second.token).await.unwrap();
        let session = manager.verify_token(&first.token).await.unwrap();
        assert_eq!(session.user_id, first.account_id);
    }

    #[test]
    fn test_email_shape_check() {
        assert!(is_valid_email("a@b.com"));
        assert!(is_valid_email("first.last@sub.example.co"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("a@.com"));
        assert!(!is_valid_email("a@b.com."));
    }
}
