use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub port: u16,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Test,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

/// Token signing and password hashing settings.
///
/// Constructed once at startup and injected through application state; the
/// signing secret is never read from ambient globals by the auth code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
    pub bcrypt_cost: u32,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("test") => Environment::Test,
            _ => Environment::Development,
        };

        match environment {
            Environment::Production => Self::production(),
            Environment::Test => Self::test(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        if let Ok(v) = env::var("PORT") {
            self.port = v.parse().unwrap_or(self.port);
        }
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = v;
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("JWT_SECRET") {
            self.auth.jwt_secret = v;
        }
        if let Ok(v) = env::var("JWT_EXPIRY_HOURS") {
            self.auth.jwt_expiry_hours = v.parse().unwrap_or(self.auth.jwt_expiry_hours);
        }
        if let Ok(v) = env::var("BCRYPT_COST") {
            self.auth.bcrypt_cost = v.parse().unwrap_or(self.auth.bcrypt_cost);
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            port: 3001,
            database: DatabaseConfig {
                url: "postgres://localhost/jobboard".to_string(),
                max_connections: 10,
            },
            auth: AuthConfig {
                jwt_secret: "dev-secret".to_string(),
                jwt_expiry_hours: 24 * 7,
                bcrypt_cost: 12,
            },
        }
    }

    fn test() -> Self {
        Self {
            environment: Environment::Test,
            port: 3001,
            database: DatabaseConfig {
                url: "postgres://localhost/jobboard_test".to_string(),
                max_connections: 5,
            },
            auth: AuthConfig {
                jwt_secret: "test-secret".to_string(),
                jwt_expiry_hours: 1,
                // Minimum-ish cost keeps test fixtures fast
                bcrypt_cost: 4,
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            port: 3001,
            database: DatabaseConfig {
                url: "postgres://localhost/jobboard".to_string(),
                max_connections: 50,
            },
            auth: AuthConfig {
                // Must be overridden via JWT_SECRET in production
                jwt_secret: String::new(),
                jwt_expiry_hours: 24,
                bcrypt_cost: 12,
            },
        }
    }
}
