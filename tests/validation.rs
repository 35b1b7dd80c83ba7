mod common;

use axum::http::StatusCode;
use serde_json::json;
use tower::ServiceExt;

use common::{body_json, request, test_app, token_for};

#[tokio::test]
async fn company_filter_range_must_be_ordered() {
    let app = test_app();
    let resp = app
        .oneshot(request(
            "GET",
            "/companies?minEmployees=10&maxEmployees=1",
            None,
            None,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert_eq!(
        body["error"]["message"],
        "minEmployees cannot be greater than maxEmployees"
    );
}

#[tokio::test]
async fn unknown_company_filter_is_rejected() {
    let app = test_app();
    let resp = app
        .oneshot(request("GET", "/companies?favoriteColor=red", None, None))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn patch_company_rejects_unknown_field() {
    let app = test_app();
    let token = token_for("root", true);
    let resp = app
        .oneshot(request(
            "PATCH",
            "/companies/acme",
            Some(&token),
            Some(json!({"handle": "new-handle"})),
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert_eq!(body["error"]["message"], "Field is not allowed: handle");
}

#[tokio::test]
async fn patch_company_rejects_empty_body() {
    let app = test_app();
    let token = token_for("root", true);
    let resp = app
        .oneshot(request(
            "PATCH",
            "/companies/acme",
            Some(&token),
            Some(json!({})),
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert_eq!(body["error"]["message"], "No data to update");
}

#[tokio::test]
async fn patch_job_rejects_out_of_range_equity() {
    let app = test_app();
    let token = token_for("root", true);
    let resp = app
        .oneshot(request(
            "PATCH",
            "/jobs/1",
            Some(&token),
            Some(json!({"equity": 1.5})),
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert_eq!(body["error"]["message"], "equity must be between 0 and 1");
}

#[tokio::test]
async fn patch_job_rejects_negative_salary() {
    let app = test_app();
    let token = token_for("root", true);
    let resp = app
        .oneshot(request(
            "PATCH",
            "/jobs/1",
            Some(&token),
            Some(json!({"salary": -5})),
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert_eq!(body["error"]["message"], "salary cannot be negative");
}

#[tokio::test]
async fn patch_company_rejects_negative_num_employees() {
    let app = test_app();
    let token = token_for("root", true);
    let resp = app
        .oneshot(request(
            "PATCH",
            "/companies/acme",
            Some(&token),
            Some(json!({"numEmployees": -3})),
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert_eq!(body["error"]["message"], "numEmployees cannot be negative");
}

#[tokio::test]
async fn create_company_rejects_negative_num_employees() {
    let app = test_app();
    let token = token_for("root", true);
    let resp = app
        .oneshot(request(
            "POST",
            "/companies",
            Some(&token),
            Some(json!({
                "handle": "acme",
                "name": "Acme",
                "description": "...",
                "numEmployees": -1
            })),
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert_eq!(body["error"]["message"], "numEmployees cannot be negative");
}

#[tokio::test]
async fn post_job_rejects_negative_salary() {
    let app = test_app();
    let token = token_for("root", true);
    let resp = app
        .oneshot(request(
            "POST",
            "/jobs",
            Some(&token),
            Some(json!({"title": "Engineer", "salary": -5, "companyHandle": "acme"})),
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn patch_user_rejects_wrong_typed_value() {
    let app = test_app();
    let token = token_for("aliya", false);
    let resp = app
        .oneshot(request(
            "PATCH",
            "/users/aliya",
            Some(&token),
            Some(json!({"firstName": 42})),
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert_eq!(body["error"]["message"], "Invalid value for field: firstName");
}

#[tokio::test]
async fn patch_user_rejects_admin_flag_escalation() {
    let app = test_app();
    let token = token_for("aliya", false);
    let resp = app
        .oneshot(request(
            "PATCH",
            "/users/aliya",
            Some(&token),
            Some(json!({"isAdmin": true})),
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert_eq!(body["error"]["message"], "Field is not allowed: isAdmin");
}

#[tokio::test]
async fn create_company_rejects_extra_fields() {
    let app = test_app();
    let token = token_for("root", true);
    let resp = app
        .oneshot(request(
            "POST",
            "/companies",
            Some(&token),
            Some(json!({
                "handle": "acme",
                "name": "Acme",
                "description": "...",
                "surprise": true
            })),
        ))
        .await
        .unwrap();

    // Typed body with deny_unknown_fields: axum surfaces this as 422
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}
