/// Application context and dependency injection
use crate::{
    auth::AuthManager,
    config::ServerConfig,
    db,
    entries::EntryStore,
    error::AppResult,
    mailer::Mailer,
    rate_limit::RateLimiter,
};
use sqlx::SqlitePool;
use std::sync::Arc;

/// Application context holding all shared services
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<ServerConfig>,
    pub db: SqlitePool,
    pub auth: Arc<AuthManager>,
    pub entries: Arc<EntryStore>,
    pub mailer: Arc<Mailer>,
    pub rate_limiter: Arc<RateLimiter>,
}

impl AppContext {
    /// Create a new application context from configuration
    pub async fn new(config: ServerConfig) -> AppResult<Self> {
        config.validate()?;

        tokio::fs::create_dir_all(&config.storage.data_directory).await?;

        let pool = db::create_pool(&config.storage.database).await?;
        db::run_migrations(&pool).await?;
        db::test_connection(&pool).await?;

        let auth = Arc::new(AuthManager::new(pool.clone()));
        let entries = Arc::new(EntryStore::new(pool.clone()));
        let mailer = Arc::new(Mailer::new(config.email.clone())?);
        let rate_limiter = Arc::new(RateLimiter::new(&config.rate_limit));

        if !mailer.is_configured() {
            tracing::warn!("No SMTP configuration; sign-in emails will be skipped");
        }

        Ok(Self {
            config: Arc::new(config),
            db: pool,
            auth,
            entries,
            mailer,
            rate_limiter,
        })
    }

    /// Get service URL
    pub fn service_url(&self) -> String {
        self.config.fallback_base_url()
    }
}
