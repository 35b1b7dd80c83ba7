use axum::{extract::State, http::StatusCode, response::Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::generate_token;
use crate::error::ApiError;
use crate::models::user::{User, UserRegister};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TokenRequest {
    pub username: String,
    pub password: String,
}

/// POST /auth/token - exchange credentials for a bearer token
pub async fn token(
    State(state): State<AppState>,
    Json(data): Json<TokenRequest>,
) -> Result<Json<Value>, ApiError> {
    let user = User::authenticate(&state.pool, &data.username, &data.password).await?;
    let token = generate_token(&user.username, user.is_admin, &state.config.auth)?;

    Ok(Json(json!({ "token": token })))
}

/// POST /auth/register - self-service signup, returns a token for the new
/// (never admin) user
pub async fn register(
    State(state): State<AppState>,
    Json(data): Json<UserRegister>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let user = User::register(&state.pool, &data, state.config.auth.bcrypt_cost).await?;
    let token = generate_token(&user.username, user.is_admin, &state.config.auth)?;

    Ok((StatusCode::CREATED, Json(json!({ "token": token }))))
}
