//! Route-level tests driving the router with `tower::ServiceExt::oneshot`.

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use dwar::{DeliveryChannel, Dwar, JwtConfig, NewAccount, Role};
use dwar_axum::CookieConfig;
use dwar_core::{error::DeliveryError, services::OtpDelivery};
use dwar_storage_memory::MemoryRepositoryProvider;
use http_body_util::BodyExt;
use tokio::sync::Mutex;
use tower::ServiceExt;

const TEST_SECRET: &[u8] = b"integration_test_secret_key_not_for_production";

#[derive(Clone, Default)]
struct RecordingDelivery {
    sent: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl OtpDelivery for RecordingDelivery {
    async fn send_code(
        &self,
        _channel: DeliveryChannel,
        _to: &str,
        code: &str,
    ) -> Result<(), DeliveryError> {
        self.sent.lock().await.push(code.to_string());
        Ok(())
    }
}

async fn setup() -> (Router, RecordingDelivery) {
    let repositories = Arc::new(MemoryRepositoryProvider::new());
    let delivery = RecordingDelivery::default();
    let dwar = Arc::new(Dwar::new(
        repositories,
        Box::new(delivery.clone()),
        JwtConfig::new_hs256(TEST_SECRET.to_vec()),
    ));

    dwar.register_account(NewAccount::new("asha", "asha@example.com"), "p1secret")
        .await
        .unwrap();
    dwar.register_account(
        NewAccount::new("ward-admin", "admin@example.com").with_role(Role::WardAdmin),
        "adminsecret",
    )
    .await
    .unwrap();

    let router = dwar_axum::routes(dwar)
        .with_cookie_config(CookieConfig::development())
        .build();

    (router, delivery)
}

fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn set_cookies(response: &axum::response::Response) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect()
}

fn cookie_header(cookies: &[String]) -> String {
    cookies
        .iter()
        .map(|c| c.split(';').next().unwrap().to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

#[tokio::test]
async fn test_full_login_flow_over_http() {
    let (router, delivery) = setup().await;

    // Step one: credentials buy a challenge handle
    let response = router
        .clone()
        .oneshot(post_json(
            "/send-otp",
            serde_json::json!({
                "email": "asha@example.com",
                "password": "p1secret",
                "channel": "email"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["success"], true);
    let handle = body["data"]["handle"].as_str().unwrap().to_string();
    assert!(handle.starts_with("chl_"));

    let code = delivery.sent.lock().await.last().unwrap().clone();

    // Step two: the code buys a session pair in cookies
    let response = router
        .clone()
        .oneshot(post_json(
            "/verify-otp",
            serde_json::json!({
                "handle": handle,
                "code": code,
                "channel": "email",
                "rememberMe": false
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let cookies = set_cookies(&response);
    assert_eq!(cookies.len(), 2);
    let access_cookie = cookies.iter().find(|c| c.starts_with("accessToken=")).unwrap();
    let refresh_cookie = cookies.iter().find(|c| c.starts_with("refreshToken=")).unwrap();
    for cookie in [access_cookie, refresh_cookie] {
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(cookie.contains("Max-Age=86400"));
    }

    let cookie_line = cookie_header(&cookies);
    let body = json_body(response).await;
    assert_eq!(body["data"]["email"], "asha@example.com");
    assert!(body["accessToken"].is_string());

    // Cookie authenticates /me
    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/me")
                .header(header::COOKIE, cookie_line.clone())
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["data"]["username"], "asha");

    // Refresh mints a new access cookie
    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/refresh-token")
                .header(header::COOKIE, cookie_line.clone())
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert!(body["accessToken"].is_string());

    // Logout clears both cookies with SameSite=Strict
    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/logout")
                .header(header::COOKIE, cookie_line)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let cookies = set_cookies(&response);
    assert_eq!(cookies.len(), 2);
    for cookie in &cookies {
        assert!(cookie.contains("Max-Age=0"));
        assert!(cookie.contains("SameSite=Strict"));
    }
}

#[tokio::test]
async fn test_remember_me_extends_cookie_lifetime() {
    let (router, delivery) = setup().await;

    let response = router
        .clone()
        .oneshot(post_json(
            "/send-otp",
            serde_json::json!({
                "email": "asha@example.com",
                "password": "p1secret",
                "channel": "email"
            }),
        ))
        .await
        .unwrap();
    let body = json_body(response).await;
    let handle = body["data"]["handle"].as_str().unwrap().to_string();
    let code = delivery.sent.lock().await.last().unwrap().clone();

    let response = router
        .oneshot(post_json(
            "/verify-otp",
            serde_json::json!({
                "handle": handle,
                "code": code,
                "channel": "email",
                "rememberMe": true
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // 30 days
    for cookie in set_cookies(&response) {
        assert!(cookie.contains("Max-Age=2592000"));
    }
}

#[tokio::test]
async fn test_error_payload_shape() {
    let (router, _) = setup().await;

    let response = router
        .clone()
        .oneshot(post_json(
            "/send-otp",
            serde_json::json!({
                "email": "asha@example.com",
                "password": "wrong",
                "channel": "email"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["statusCode"], 400);
    assert!(body["message"].is_string());

    // Unknown channel
    let response = router
        .clone()
        .oneshot(post_json(
            "/send-otp",
            serde_json::json!({
                "email": "asha@example.com",
                "password": "p1secret",
                "channel": "pigeon"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Unknown account renders 400, not 404, on issuance
    let response = router
        .oneshot(post_json(
            "/send-otp",
            serde_json::json!({
                "email": "nobody@example.com",
                "password": "p1secret",
                "channel": "email"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_admin_routes_gate_on_role() {
    let (router, delivery) = setup().await;

    let response = router
        .clone()
        .oneshot(post_json(
            "/admin/send-otp",
            serde_json::json!({
                "email": "asha@example.com",
                "password": "p1secret",
                "channel": "email"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = json_body(response).await;
    assert_eq!(body["statusCode"], 403);

    let response = router
        .clone()
        .oneshot(post_json(
            "/admin/send-otp",
            serde_json::json!({
                "email": "admin@example.com",
                "password": "adminsecret",
                "channel": "email"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    let handle = body["data"]["handle"].as_str().unwrap().to_string();
    let code = delivery.sent.lock().await.last().unwrap().clone();

    let response = router
        .oneshot(post_json(
            "/admin/verify-otp",
            serde_json::json!({
                "handle": handle,
                "code": code,
                "channel": "email"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["data"]["role"], "ward_admin");
}

#[tokio::test]
async fn test_logout_without_cookie_is_rejected() {
    let (router, _) = setup().await;

    let response = router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/logout")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["statusCode"], 400);
}

#[tokio::test]
async fn test_me_requires_access_token() {
    let (router, _) = setup().await;

    let response = router
        .clone()
        .oneshot(Request::builder().uri("/me").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = router
        .oneshot(
            Request::builder()
                .uri("/me")
                .header(header::COOKIE, "accessToken=garbage")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
