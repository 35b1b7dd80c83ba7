use axum::{
    extract::State,
    middleware,
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::handlers::{auth, companies, jobs, users};
use crate::middleware::identity_middleware;
use crate::state::AppState;

pub fn app(state: AppState) -> Router {
    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        // Token acquisition
        .route("/auth/token", post(auth::token))
        .route("/auth/register", post(auth::register))
        // Companies
        .route("/companies", get(companies::list).post(companies::create))
        .route(
            "/companies/:handle",
            get(companies::get)
                .patch(companies::update)
                .delete(companies::remove),
        )
        // Jobs
        .route("/jobs", get(jobs::list).post(jobs::create))
        .route(
            "/jobs/:id",
            get(jobs::get).patch(jobs::update).delete(jobs::remove),
        )
        // Users
        .route("/users", get(users::list).post(users::create))
        .route(
            "/users/:username",
            get(users::get).patch(users::update).delete(users::remove),
        )
        .route("/users/:username/jobs/:id", post(users::apply))
        // Global middleware
        .layer(middleware::from_fn_with_state(
            state.clone(),
            identity_middleware,
        ))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "name": "Job Board API",
        "version": version,
        "endpoints": {
            "auth": "/auth/token, /auth/register (public - token acquisition)",
            "companies": "/companies[/:handle] (GET public; mutations admin)",
            "jobs": "/jobs[/:id] (GET public; mutations admin)",
            "users": "/users[/:username] (admin, or the user themselves)",
            "applications": "/users/:username/jobs/:id (POST)",
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match crate::database::health_check(&state.pool).await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            axum::response::Json(json!({
                "status": "ok",
                "timestamp": now,
                "database": "ok"
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            axum::response::Json(json!({
                "status": "degraded",
                "timestamp": now,
                "database_error": e.to_string()
            })),
        ),
    }
}
