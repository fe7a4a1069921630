//! End-to-end session lifecycle over HTTP

mod common;

use actix_web::{http::StatusCode, test};
use serde_json::json;

use common::{get_me, login, refresh, register, TestContext};

#[actix_web::test]
async fn test_stale_access_token_recovers_through_refresh() {
    let ctx = TestContext::new();
    let app = test::init_service(ctx.app()).await;
    assert_eq!(register(&app, "a@x.com", "secret1").await, StatusCode::CREATED);

    let tokens = login(&app, "a@x.com", "secret1").await;
    assert_eq!(tokens["expiresIn"], 900);

    // Stand-in for the original access token after its fifteen minutes ran out
    let stale = ctx.expired_access_token("a@x.com").await;
    let resp = get_me(&app, &stale).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "TOKEN_EXPIRED");

    let resp = refresh(&app, json!({ "refreshToken": tokens["refreshToken"] })).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let renewed: serde_json::Value = test::read_body_json(resp).await;
    let fresh = renewed["accessToken"].as_str().unwrap();
    assert_ne!(fresh, stale);

    let resp = get_me(&app, fresh).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let profile: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(profile["email"], "a@x.com");
}

#[actix_web::test]
async fn test_logout_keeps_access_token_until_expiry() {
    let ctx = TestContext::new();
    let app = test::init_service(ctx.app()).await;
    register(&app, "a@x.com", "secret1").await;
    let tokens = login(&app, "a@x.com", "secret1").await;
    let access = tokens["accessToken"].as_str().unwrap();

    let req = test::TestRequest::post()
        .uri("/auth/logout")
        .insert_header(("Authorization", format!("Bearer {}", access)))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NO_CONTENT);

    assert_eq!(get_me(&app, access).await.status(), StatusCode::OK);
    let resp = refresh(&app, json!({ "refreshToken": tokens["refreshToken"] })).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}
