use std::sync::Arc;

use tracing::{info, warn};

use crate::{
    artworks::repo::{ArtworkRepo, MemoryArtworks, PgArtworks},
    auth::jwt::TokenService,
    comments::repo::{CommentRepo, MemoryComments, PgComments},
    config::AppConfig,
    db,
    users::repo::{MemoryUsers, PgUsers, UserRepo},
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub tokens: TokenService,
    pub users: Arc<dyn UserRepo>,
    pub artworks: Arc<dyn ArtworkRepo>,
    pub comments: Arc<dyn CommentRepo>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = AppConfig::from_env()?;

        let state = match config.database_url.clone() {
            Some(url) => {
                let pool = db::connect(&url).await?;
                info!("using postgres store");
                Self::from_parts(
                    config,
                    Arc::new(PgUsers::new(pool.clone())),
                    Arc::new(PgArtworks::new(pool.clone())),
                    Arc::new(PgComments::new(pool)),
                )
            }
            None => {
                warn!("DATABASE_URL not set; data lives in memory and is lost on restart");
                Self::in_memory(config)
            }
        };
        Ok(state)
    }

    pub fn from_parts(
        config: AppConfig,
        users: Arc<dyn UserRepo>,
        artworks: Arc<dyn ArtworkRepo>,
        comments: Arc<dyn CommentRepo>,
    ) -> Self {
        Self {
            tokens: TokenService::from_config(&config.jwt),
            config: Arc::new(config),
            users,
            artworks,
            comments,
        }
    }

    pub fn in_memory(config: AppConfig) -> Self {
        Self::from_parts(
            config,
            Arc::new(MemoryUsers::default()),
            Arc::new(MemoryArtworks::default()),
            Arc::new(MemoryComments::default()),
        )
    }

    #[cfg(test)]
    pub fn fake() -> Self {
        Self::in_memory(test_config())
    }
}

#[cfg(test)]
pub fn test_config() -> AppConfig {
    AppConfig {
        database_url: None,
        jwt: crate::config::JwtConfig {
            secret: "test-secret".into(),
            ttl_minutes: 60,
        },
        default_avatar_url: crate::config::DEFAULT_AVATAR_URL.into(),
        secure_cookies: false,
    }
}
