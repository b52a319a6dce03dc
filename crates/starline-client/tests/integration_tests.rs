//! Integration tests for starline-client
//!
//! These tests serve a fake StarLine API from a local axum router and drive
//! the client through the real reqwest transport, so request encoding
//! (query strings, form bodies, JSON bodies, headers, cookies) is checked
//! end to end.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, Query};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use serde_json::{json, Value};
use starline_client::digest;
use starline_client::testing::{MemoryLogger, TestServer};
use starline_client::{
    Config, DeviceCommand, DeviceSummary, LoginParams, ReqwestTransport, StarlineClient,
    StarlineError, TransportOptions,
};

// =============================================================================
// Fake StarLine API
// =============================================================================

const LOGIN: &str = "driver@example.com";
const PASSWORD: &str = "hunter2";
const APP_ID: &str = "4242";
const SECRET: &str = "s3cr3t";

const CODE: &str = "C1";
const APP_TOKEN: &str = "T1";
const USER_TOKEN: &str = "UT1";
const SLNET: &str = "SN1";
const USER_ID: &str = "42";
const DEVICE_ID: &str = "864326031234567";

fn test_config() -> Config {
    Config::new()
        .with_login(LOGIN)
        .with_password(PASSWORD)
        .with_app_id(APP_ID)
        .with_secret(SECRET)
}

async fn get_code(Query(query): Query<HashMap<String, String>>) -> Json<Value> {
    let ok = query.get("appId").map(String::as_str) == Some(APP_ID)
        && query.get("secret") == Some(&digest::app_code_secret(SECRET));
    if ok {
        Json(json!({"state": 1, "desc": {"code": CODE}}))
    } else {
        Json(json!({"state": 0, "desc": {"message": "Invalid application secret"}}))
    }
}

async fn get_token(Query(query): Query<HashMap<String, String>>) -> Json<Value> {
    let ok = query.get("appId").map(String::as_str) == Some(APP_ID)
        && query.get("secret") == Some(&digest::app_token_secret(SECRET, CODE));
    if ok {
        Json(json!({"state": 1, "desc": {"token": APP_TOKEN}}))
    } else {
        Json(json!({"state": 0, "desc": {"message": "Invalid code"}}))
    }
}

async fn user_login(headers: HeaderMap, Form(form): Form<HashMap<String, String>>) -> Json<Value> {
    let token_ok = headers.get("token").and_then(|v| v.to_str().ok()) == Some(APP_TOKEN);
    let creds_ok = form.get("login").map(String::as_str) == Some(LOGIN)
        && form.get("pass") == Some(&digest::password_digest(PASSWORD));

    if !token_ok || !creds_ok {
        return Json(json!({"state": 0, "desc": {"message": "Wrong login or password"}}));
    }
    if form.get("captchaCode").map(String::as_str) == Some("wrong") {
        return Json(json!({"state": 2, "desc": {"message": "Captcha required"}}));
    }
    Json(json!({"state": 1, "desc": {"user_token": USER_TOKEN, "id": USER_ID}}))
}

async fn slnet_auth(Json(body): Json<Value>) -> Response {
    if body["slid_token"] != USER_TOKEN {
        return Json(json!({"code": 400, "codestring": "Bad Request"})).into_response();
    }
    let mut response =
        Json(json!({"code": 200, "codestring": "OK", "user_id": USER_ID})).into_response();
    let headers = response.headers_mut();
    headers.append(
        header::SET_COOKIE,
        HeaderValue::from_static("slnet=SN1; path=/; HttpOnly"),
    );
    headers.append(header::SET_COOKIE, HeaderValue::from_static("lang=ru; path=/"));
    response
}

fn has_session(headers: &HeaderMap) -> bool {
    headers.get(header::COOKIE).and_then(|v| v.to_str().ok()) == Some("slnet=SN1")
}

async fn user_data(Path(user_id): Path<String>, headers: HeaderMap) -> Response {
    if !has_session(&headers) {
        return (StatusCode::UNAUTHORIZED, Json(json!({"code": 401}))).into_response();
    }
    if user_id != USER_ID {
        return Json(json!({"codestring": "User not found"})).into_response();
    }
    Json(json!({
        "code": 200,
        "codestring": "OK",
        "user_data": {
            "devices": [
                {"device_id": DEVICE_ID, "alias": "Family car", "status": 1},
                {"device_id": "864326039999999", "alias": "Trailer", "status": 2}
            ]
        }
    }))
    .into_response()
}

async fn set_param(
    Path(device_id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !has_session(&headers) {
        return (StatusCode::UNAUTHORIZED, Json(json!({"code": 401}))).into_response();
    }
    if device_id != DEVICE_ID {
        return Json(json!({"codestring": "Device not found"})).into_response();
    }
    Json(json!({
        "code": 200,
        "codestring": "OK",
        "type": body["type"],
        "arm": body["arm"]
    }))
    .into_response()
}

fn fake_starline() -> Router {
    Router::new()
        .route("/apiV3/application/getCode", get(get_code))
        .route("/apiV3/application/getToken", get(get_token))
        .route("/apiV3/user/login", post(user_login))
        .route("/json/v2/auth.slid", post(slnet_auth))
        .route("/json/v3/user/{user_id}/data", get(user_data))
        .route("/json/v1/device/{device_id}/set_param", post(set_param))
}

// =============================================================================
// Tests
// =============================================================================

#[tokio::test]
async fn test_full_chain() {
    let server = TestServer::start(fake_starline(), test_config())
        .await
        .unwrap();
    let client = server.client();

    let code = client.fetch_code().await.unwrap();
    assert_eq!(code, CODE);

    let token = client.fetch_token(&code).await.unwrap();
    assert_eq!(token, APP_TOKEN);

    let extra = LoginParams::new().user_ip("192.0.2.10");
    let user_token = client.fetch_user_token(&token, &extra).await.unwrap();
    assert_eq!(user_token, USER_TOKEN);

    let session = client
        .fetch_slnet_token(&user_token)
        .await
        .unwrap()
        .expect("SLNET session");
    assert_eq!(session.slnet_token, SLNET);
    assert_eq!(session.user_id, USER_ID);

    let info = client
        .fetch_devices_info(&session.slnet_token, &user_token, session.numeric_user_id())
        .await
        .unwrap();
    assert_eq!(info["code"], 200);
    let devices = DeviceSummary::from_devices_info(&info);
    assert_eq!(devices.len(), 2);
    assert_eq!(devices[0].device_id, DEVICE_ID);
    assert_eq!(devices[0].alias, "Family car");
    // Fields the client does not model are kept
    assert_eq!(info["user_data"]["devices"][0]["status"], 1);

    let result = client
        .run_query(
            &session.slnet_token,
            &devices[0].device_id,
            &DeviceCommand::arm(true).into_value(),
        )
        .await
        .unwrap();
    assert_eq!(result["codestring"], "OK");
    assert_eq!(result["type"], "arm");
    assert_eq!(result["arm"], 1);

    server.shutdown().await;
}

#[tokio::test]
async fn test_wrong_secret_stops_chain() {
    let logger = Arc::new(MemoryLogger::new());
    let server = TestServer::start(fake_starline(), test_config().with_secret("wrong"))
        .await
        .unwrap();
    let client = server.client().clone().with_logger(logger.clone());

    let code = client.fetch_code().await.unwrap();
    assert_eq!(code, "");
    assert_eq!(logger.messages(), vec!["Code not found in response."]);

    // The empty code short-circuits the next step
    assert_eq!(client.fetch_token(&code).await.unwrap(), "");
    assert_eq!(logger.entries().len(), 1);
}

#[tokio::test]
async fn test_wrong_password_returns_empty_user_token() {
    let logger = Arc::new(MemoryLogger::new());
    let server = TestServer::start(fake_starline(), test_config().with_password("nope"))
        .await
        .unwrap();
    let client = server.client().clone().with_logger(logger.clone());

    let user_token = client
        .fetch_user_token(APP_TOKEN, &LoginParams::new())
        .await
        .unwrap();
    assert_eq!(user_token, "");
    assert_eq!(logger.messages(), vec!["User login error response"]);
}

#[tokio::test]
async fn test_captcha_state_is_not_success() {
    let server = TestServer::start(fake_starline(), test_config())
        .await
        .unwrap();

    let extra = LoginParams::new().captcha("sid-1", "wrong");
    let user_token = server
        .client()
        .fetch_user_token(APP_TOKEN, &extra)
        .await
        .unwrap();
    assert_eq!(user_token, "");
}

#[tokio::test]
async fn test_session_cookie_is_required_for_devices() {
    let logger = Arc::new(MemoryLogger::new());
    let server = TestServer::start(fake_starline(), test_config())
        .await
        .unwrap();
    let client = server.client().clone().with_logger(logger.clone());

    let info = client
        .fetch_devices_info("expired", USER_TOKEN, 42)
        .await
        .unwrap();
    assert!(info.is_empty());
    assert_eq!(logger.messages(), vec!["Respond status code: 401"]);
}

#[tokio::test]
async fn test_unknown_device_returns_empty_map() {
    let logger = Arc::new(MemoryLogger::new());
    let server = TestServer::start(fake_starline(), test_config())
        .await
        .unwrap();
    let client = server.client().clone().with_logger(logger.clone());

    let result = client
        .run_query(SLNET, "000", &DeviceCommand::arm(false).into_value())
        .await
        .unwrap();
    assert!(result.is_empty());
    assert_eq!(logger.messages(), vec!["Error response"]);
}

#[tokio::test]
async fn test_wrong_user_token_for_slnet() {
    let logger = Arc::new(MemoryLogger::new());
    let server = TestServer::start(fake_starline(), test_config())
        .await
        .unwrap();
    let client = server.client().clone().with_logger(logger.clone());

    assert_eq!(client.fetch_slnet_token("stale").await.unwrap(), None);
    assert_eq!(logger.messages(), vec!["Error response"]);
}

#[tokio::test]
async fn test_unreachable_host_is_an_error() {
    let options = TransportOptions {
        timeout: Duration::from_secs(2),
        accept_invalid_certs: false,
    };
    let client =
        StarlineClient::with_transport(test_config(), Arc::new(ReqwestTransport::new(options)))
            .unwrap()
            .with_base_urls("http://127.0.0.1:1", "http://127.0.0.1:1")
            .unwrap();

    let err = client.fetch_code().await.unwrap_err();
    assert!(matches!(err, StarlineError::HttpError(_)));
}
