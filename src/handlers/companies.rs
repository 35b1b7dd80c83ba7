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
use crate::models::company::{validate_num_employees, Company, CompanyFilters, CompanyNew};
use crate::state::AppState;

const PATCH_FIELDS: &[(&str, FieldType)] = &[
    ("name", FieldType::Str),
    ("description", FieldType::Str),
    ("numEmployees", FieldType::Int),
    ("logoUrl", FieldType::Str),
];

/// POST /companies - admin only
pub async fn create(
    State(state): State<AppState>,
    auth: Option<Extension<AuthUser>>,
    Json(data): Json<CompanyNew>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    require_admin(identity(&auth))?;
    data.validate()?;

    let company = Company::create(&state.pool, &data).await?;
    Ok((StatusCode::CREATED, Json(json!({ "company": company }))))
}

/// GET /companies - public, with optional name/employee-count filters
pub async fn list(
    State(state): State<AppState>,
    Query(filters): Query<CompanyFilters>,
) -> Result<Json<Value>, ApiError> {
    filters.validate()?;

    let companies = Company::find_all(&state.pool, &filters).await?;
    Ok(Json(json!({ "companies": companies })))
}

/// GET /companies/:handle - public
pub async fn get(
    State(state): State<AppState>,
    Path(handle): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let company = Company::get(&state.pool, &handle).await?;
    Ok(Json(json!({ "company": company })))
}

/// PATCH /companies/:handle - admin only, partial update
pub async fn update(
    State(state): State<AppState>,
    Path(handle): Path<String>,
    auth: Option<Extension<AuthUser>>,
    Json(data): Json<Map<String, Value>>,
) -> Result<Json<Value>, ApiError> {
    require_admin(identity(&auth))?;
    validate_patch(&data, PATCH_FIELDS)?;
    validate_num_employees(data.get("numEmployees").and_then(Value::as_i64))?;

    let company = Company::update(&state.pool, &handle, &data).await?;
    Ok(Json(json!({ "company": company })))
}

/// DELETE /companies/:handle - admin only
pub async fn remove(
    State(state): State<AppState>,
    Path(handle): Path<String>,
    auth: Option<Extension<AuthUser>>,
) -> Result<Json<Value>, ApiError> {
    require_admin(identity(&auth))?;

    Company::remove(&state.pool, &handle).await?;
    Ok(Json(json!({ "deleted": handle })))
}
