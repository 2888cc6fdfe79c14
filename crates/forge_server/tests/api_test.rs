//! End-to-end API behaviour through the in-process router.

mod test_utils;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use forge_core::RecordStatus;
use serde_json::json;
use test_utils::{TestApp, authed, generate_request, json_body};

#[tokio::test]
async fn health_is_public_at_root_and_api() {
    let app = TestApp::builder(0).build();

    for uri in ["/health", "/api/health"] {
        let response = app
            .send(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await;
        assert_eq!(response.status(), StatusCode::OK, "{uri}");
        assert_eq!(json_body(response).await, json!({ "status": "ok" }));
    }
}

#[tokio::test]
async fn credits_require_a_bearer_token() {
    let app = TestApp::builder(5).build();

    let response = app
        .send(Request::builder().uri("/user/credits").body(Body::empty()).unwrap())
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(response).await["error"], "unauthorized");

    let response = app
        .send(
            Request::builder()
                .uri("/user/credits")
                .header(header::AUTHORIZATION, "Bearer wrong")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn credits_report_the_balance() {
    let app = TestApp::builder(5).build();

    let response = app
        .send(authed("GET", "/api/user/credits").body(Body::empty()).unwrap())
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, json!({ "credits": 5 }));
}

#[tokio::test]
async fn generate_delivers_and_charges_once() {
    let app = TestApp::builder(5).build();

    let response = app
        .send(generate_request(json!({
            "prompt": "Fractions for beginners",
            "mode": "lesson",
            "includeImages": false
        })))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    let file = body["file"].as_str().expect("file location");
    assert!(file.ends_with(".md"), "{file}");

    assert_eq!(app.balance().await, 4);
    assert_eq!(app.stored_files(), 1);
    let records = app.records.snapshot();
    assert_eq!(records.len(), 1);
    assert_eq!(*records[0].status(), RecordStatus::Completed);
}

#[tokio::test]
async fn ppt_alias_is_priced_as_slides_with_images() {
    let app = TestApp::builder(5).build();

    let response = app
        .send(generate_request(json!({
            "prompt": "Weather words",
            "mode": "ppt",
            "includeImages": true
        })))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(app.balance().await, 3);
}

#[tokio::test]
async fn empty_balance_gets_402_and_stays_empty() {
    let app = TestApp::builder(0).build();

    let response = app
        .send(generate_request(json!({ "prompt": "Verbs", "mode": "lesson" })))
        .await;
    assert_eq!(response.status(), StatusCode::PAYMENT_REQUIRED);
    assert_eq!(json_body(response).await["error"], "insufficient_credits");
    assert_eq!(app.balance().await, 0);
    assert_eq!(app.stored_files(), 0);
}

#[tokio::test]
async fn render_failure_refunds_and_reports_5xx() {
    let app = TestApp::builder(5).failing_renderer().build();

    let response = app
        .send(generate_request(json!({
            "prompt": "Planets",
            "mode": "slides",
            "includeImages": true
        })))
        .await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert_eq!(body["error"], "render_failed");
    assert!(!body["message"].as_str().unwrap().contains("font"));

    assert_eq!(app.balance().await, 5);
    assert_eq!(app.stored_files(), 0);
    assert!(
        app.records
            .snapshot()
            .iter()
            .all(|record| *record.status() != RecordStatus::Completed)
    );
}

#[tokio::test]
async fn malformed_bodies_are_400() {
    let app = TestApp::builder(5).build();

    let response = app
        .send(
            authed("POST", "/generate")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .send(generate_request(json!({ "prompt": "x", "mode": "poster" })))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .send(generate_request(json!({ "prompt": "   ", "mode": "lesson" })))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"], "invalid_request");

    assert_eq!(app.balance().await, 5);
}

#[tokio::test]
async fn history_is_newest_first_and_limited() {
    let app = TestApp::builder(5).build();

    for prompt in ["first", "second"] {
        let response = app
            .send(generate_request(json!({ "prompt": prompt, "mode": "lesson" })))
            .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app
        .send(authed("GET", "/user/generations").body(Body::empty()).unwrap())
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    let generations = body["generations"].as_array().unwrap();
    assert_eq!(generations.len(), 2);
    assert_eq!(generations[0]["prompt"], "second");
    assert_eq!(generations[0]["status"], "completed");

    let response = app
        .send(
            authed("GET", "/user/generations?limit=1")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    let body = json_body(response).await;
    assert_eq!(body["generations"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn over_limit_clients_get_429() {
    let app = TestApp::builder(5).max_requests(2).build();

    for _ in 0..2 {
        let response = app
            .send(authed("GET", "/user/credits").body(Body::empty()).unwrap())
            .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app
        .send(authed("GET", "/user/credits").body(Body::empty()).unwrap())
        .await;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(json_body(response).await["error"], "rate_limited");

    let response = app
        .send(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn cors_preflight_is_answered() {
    let app = TestApp::builder(5).build();

    let response = app
        .send(
            Request::builder()
                .method("OPTIONS")
                .uri("/api/generate")
                .header(header::ORIGIN, "https://app.example.com")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "authorization,content-type")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "*"
    );
}
