use sqlx::PgPool;
use std::sync::Arc;

use crate::config::AppConfig;

/// Shared application state, cloned per request. The config (including the
/// token signing secret) is injected here at startup rather than read from
/// globals.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(pool: PgPool, config: AppConfig) -> Self {
        Self {
            pool,
            config: Arc::new(config),
        }
    }
}
