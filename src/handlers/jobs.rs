use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    Extension,
};
use serde_json::{json, Map, Value};

use crate::auth::{require_admin, AuthUser};
use crate::error::ApiError;
use crate::handlers::{identity, validate_patch, FieldType};
use crate::models::job::{validate_equity, validate_salary, Job, JobFilters, JobNew};
use crate::state::AppState;

const PATCH_FIELDS: &[(&str, FieldType)] = &[
    ("title", FieldType::Str),
    ("salary", FieldType::Int),
    ("equity", FieldType::Num),
];

/// POST /jobs - admin only
pub async fn create(
    State(state): State<AppState>,
    auth: Option<Extension<AuthUser>>,
    Json(data): Json<JobNew>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    require_admin(identity(&auth))?;
    data.validate()?;

    let job = Job::create(&state.pool, &data).await?;
    Ok((StatusCode::CREATED, Json(json!({ "job": job }))))
}

/// GET /jobs - public, with optional title/salary/equity filters
pub async fn list(
    State(state): State<AppState>,
    Query(filters): Query<JobFilters>,
) -> Result<Json<Value>, ApiError> {
    let jobs = Job::find_all(&state.pool, &filters).await?;
    Ok(Json(json!({ "jobs": jobs })))
}

/// GET /jobs/:id - public
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Value>, ApiError> {
    let job = Job::get(&state.pool, id).await?;
    Ok(Json(json!({ "job": job })))
}

/// PATCH /jobs/:id - admin only, partial update of title/salary/equity
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    auth: Option<Extension<AuthUser>>,
    Json(data): Json<Map<String, Value>>,
) -> Result<Json<Value>, ApiError> {
    require_admin(identity(&auth))?;
    validate_patch(&data, PATCH_FIELDS)?;
    validate_salary(data.get("salary").and_then(Value::as_i64))?;
    validate_equity(data.get("equity").and_then(Value::as_f64))?;

    let job = Job::update(&state.pool, id, &data).await?;
    Ok(Json(json!({ "job": job })))
}

/// DELETE /jobs/:id - admin only
pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    auth: Option<Extension<AuthUser>>,
) -> Result<Json<Value>, ApiError> {
    require_admin(identity(&auth))?;

    Job::remove(&state.pool, id).await?;
    Ok(Json(json!({ "deleted": id })))
}
