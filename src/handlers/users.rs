use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    Extension,
};
use serde_json::{json, Map, Value};

use crate::auth::{generate_token, require_admin, require_self_or_admin, AuthUser};
use crate::error::ApiError;
use crate::handlers::{identity, validate_patch, FieldType};
use crate::models::user::{User, UserNew};
use crate::state::AppState;

const PATCH_FIELDS: &[(&str, FieldType)] = &[
    ("firstName", FieldType::Str),
    ("lastName", FieldType::Str),
    ("password", FieldType::Str),
    ("email", FieldType::Str),
];

/// POST /users - admin only. Unlike /auth/register, this may grant admin;
/// the response includes a token so the admin can hand off credentials.
pub async fn create(
    State(state): State<AppState>,
    auth: Option<Extension<AuthUser>>,
    Json(data): Json<UserNew>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    require_admin(identity(&auth))?;

    let user = User::create(&state.pool, &data, state.config.auth.bcrypt_cost).await?;
    let token = generate_token(&user.username, user.is_admin, &state.config.auth)?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "user": user, "token": token })),
    ))
}

/// GET /users - admin only
pub async fn list(
    State(state): State<AppState>,
    auth: Option<Extension<AuthUser>>,
) -> Result<Json<Value>, ApiError> {
    require_admin(identity(&auth))?;

    let users = User::find_all(&state.pool).await?;
    Ok(Json(json!({ "users": users })))
}

/// GET /users/:username - that user or an admin
pub async fn get(
    State(state): State<AppState>,
    Path(username): Path<String>,
    auth: Option<Extension<AuthUser>>,
) -> Result<Json<Value>, ApiError> {
    require_self_or_admin(identity(&auth), &username)?;

    let user = User::get(&state.pool, &username).await?;
    Ok(Json(json!({ "user": user })))
}

/// PATCH /users/:username - that user or an admin; partial update
pub async fn update(
    State(state): State<AppState>,
    Path(username): Path<String>,
    auth: Option<Extension<AuthUser>>,
    Json(data): Json<Map<String, Value>>,
) -> Result<Json<Value>, ApiError> {
    require_self_or_admin(identity(&auth), &username)?;
    validate_patch(&data, PATCH_FIELDS)?;

    let user = User::update(&state.pool, &username, &data, state.config.auth.bcrypt_cost).await?;
    Ok(Json(json!({ "user": user })))
}

/// DELETE /users/:username - that user or an admin
pub async fn remove(
    State(state): State<AppState>,
    Path(username): Path<String>,
    auth: Option<Extension<AuthUser>>,
) -> Result<Json<Value>, ApiError> {
    require_self_or_admin(identity(&auth), &username)?;

    User::remove(&state.pool, &username).await?;
    Ok(Json(json!({ "deleted": username })))
}

/// POST /users/:username/jobs/:id - apply to a job; that user or an admin
pub async fn apply(
    State(state): State<AppState>,
    Path((username, job_id)): Path<(String, i32)>,
    auth: Option<Extension<AuthUser>>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    require_self_or_admin(identity(&auth), &username)?;

    User::apply_to_job(&state.pool, &username, job_id).await?;
    Ok((StatusCode::CREATED, Json(json!({ "applied": job_id }))))
}
