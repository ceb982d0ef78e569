use crate::config::AppConfig;
use crate::users::{PgUserRepository, UserRepository, UserService};
use anyhow::Context;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub users: UserService,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let db = sqlx::postgres::PgPoolOptions::new()
            .max_connections(config.database.max_connections)
            .connect(&config.database.url)
            .await
            .context("connect to database")?;

        if let Err(e) = sqlx::migrate!("./migrations").run(&db).await {
            tracing::warn!(error = %e, "migration failed; continuing");
        }

        let repo = Arc::new(PgUserRepository::new(db)) as Arc<dyn UserRepository>;
        Ok(Self::from_parts(repo, config))
    }

    pub fn from_parts(repo: Arc<dyn UserRepository>, config: Arc<AppConfig>) -> Self {
        Self {
            users: UserService::new(repo),
            config,
        }
    }
}
