use axum::body::Body;
use axum::http::{Request, Response};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::Value;

use jobboard_api::auth::Claims;
use jobboard_api::config::{AppConfig, AuthConfig, DatabaseConfig, Environment};
use jobboard_api::routes;
use jobboard_api::state::AppState;

pub const TEST_SECRET: &str = "integration-test-secret";

/// Build the app against a lazy pool: no connection is attempted until a
/// handler actually queries, so tests covering gates and validation run
/// without a database.
pub fn test_app() -> axum::Router {
    let config = AppConfig {
        environment: Environment::Test,
        port: 0,
        database: DatabaseConfig {
            url: "postgres://localhost/jobboard_test".to_string(),
            max_connections: 1,
        },
        auth: AuthConfig {
            jwt_secret: TEST_SECRET.to_string(),
            jwt_expiry_hours: 1,
            bcrypt_cost: 4,
        },
    };

    let pool = sqlx::postgres::PgPoolOptions::new()
        .connect_lazy(&config.database.url)
        .expect("lazy pool");

    routes::app(AppState::new(pool, config))
}

/// Sign a token the way the server would
pub fn token_for(username: &str, is_admin: bool) -> String {
    let claims = Claims::new(username.to_string(), is_admin, 1);
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .unwrap()
}

pub fn request(
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);

    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }

    match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub async fn body_json(resp: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
