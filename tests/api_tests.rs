
use actix_web::{http::StatusCode, test};
use serde_json::{json, Value};
use test_utils::*;

#[actix_rt::test]
async fn home_returns_banner() {
    let app = init_app(test_state()).await;

    let req = test::TestRequest::get().uri("/").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["status"], "Ok");
    assert_eq!(body["endpoints"]["alumni"], "/api/alumni");
}

#[actix_rt::test]
async fn liveness_probe_is_public() {
    let app = init_app(test_state()).await;

    let req = test::TestRequest::get().uri("/api/health").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_rt::test]
async fn filters_are_public_and_built_from_csv() {
    let app = init_app(test_state()).await;

    let req = test::TestRequest::get().uri("/api/filters/").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], true);
    assert!(body["filters"]["companies"].as_array().is_some_and(|c| !c.is_empty()));
}

#[actix_rt::test]
async fn invalid_sort_key_is_bad_request() {
    let app = init_app(test_state()).await;

    let req = test::TestRequest::get()
        .uri("/api/alumni?sort_by=salary")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
}

#[actix_rt::test]
async fn protected_routes_require_token() {
    let app = init_app(test_state()).await;

    for uri in ["/api/profile", "/auth/session", "/api/chat/history"] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "{}", uri);
    }
}

#[actix_rt::test]
async fn garbage_token_is_rejected() {
    let app = init_app(test_state()).await;

    let req = test::TestRequest::get()
        .uri("/api/profile")
        .insert_header(bearer("not-a-jwt"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
}

#[actix_rt::test]
async fn logout_without_body_succeeds() {
    let app = init_app(test_state()).await;

    let req = test::TestRequest::post()
        .uri("/auth/logout")
        .insert_header(bearer(&access_token(false)))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], true);
}

#[actix_rt::test]
async fn logout_rejects_foreign_refresh_token() {
    let app = init_app(test_state()).await;

    let req = test::TestRequest::post()
        .uri("/auth/logout")
        .insert_header(bearer(&access_token(false)))
        .set_json(json!({ "refresh_token": foreign_refresh_token() }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[actix_rt::test]
async fn members_cannot_reach_admin_console() {
    let app = init_app(test_state()).await;

    let req = test::TestRequest::get()
        .uri("/admin/settings")
        .insert_header(bearer(&access_token(false)))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[actix_rt::test]
async fn director_path_ids_are_validated() {
    let app = init_app(test_state()).await;

    let req = test::TestRequest::post()
        .uri("/admin/promote-director/not-a-uuid")
        .insert_header(bearer(&access_token(true)))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_rt::test]
async fn malformed_json_uses_error_envelope() {
    let app = init_app(test_state()).await;

    let req = test::TestRequest::post()
        .uri("/auth/signup")
        .insert_header(("Content-Type", "application/json"))
        .set_payload("{\"email\": ")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
}

#[actix_rt::test]
async fn signup_validation_runs_before_database() {
    let app = init_app(test_state()).await;

    let req = test::TestRequest::post()
        .uri("/auth/signup")
        .set_json(json!({
            "email": "not-an-email",
            "password": "short",
            "referral_code": "THINK2025",
            "full_name": "Jordan Kim"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Validation failed");
}

#[actix_rt::test]
async fn email_draft_requires_recipient() {
    let app = init_app(test_state()).await;

    let req = test::TestRequest::post()
        .uri("/api/generate-email")
        .insert_header(bearer(&access_token(false)))
        .set_json(json!({}))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Alumni data required");
}

#[actix_rt::test]
async fn resume_upload_rejects_non_pdf() {
    let app = init_app(test_state()).await;

    let req = resume_upload("resume.txt", b"Jordan Kim".to_vec());
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Only PDF files are allowed");
}

#[actix_rt::test]
async fn resume_upload_accepts_files_above_default_memory_limit() {
    let app = init_app(test_state()).await;

    // 3 MiB is under the 5 MB resume limit, so the body reaches the PDF check.
    let req = resume_upload("cv.pdf", vec![0u8; 3 * 1024 * 1024]);
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "File is not a valid PDF");
}

#[actix_rt::test]
async fn resume_upload_over_limit_is_payload_too_large() {
    let app = init_app(test_state()).await;

    let req = resume_upload("cv.pdf", vec![0u8; 7 * 1024 * 1024]);
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
}
