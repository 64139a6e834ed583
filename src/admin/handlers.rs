use axum::{
    extract::State,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use subtle::ConstantTimeEq;

use crate::auth::session::{cleared_cookie, session_cookie, AdminSession};
use crate::http::server::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct LoginResponse {
    pub ok: bool,
    pub token: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct SystemStatus {
    pub version: String,
    pub status: String,
    pub backend_url: String,
}

fn with_cookie(mut response: Response, cookie: String) -> Response {
    match HeaderValue::from_str(&cookie) {
        Ok(value) => {
            response.headers_mut().insert(header::SET_COOKIE, value);
            response
        }
        Err(e) => {
            tracing::error!(error = %e, "Session cookie is not a valid header value");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

pub async fn login(State(state): State<AppState>, Json(body): Json<LoginRequest>) -> Response {
    let config = state.config.load();
    let admin = &config.admin;

    let accepted: bool = match admin.password.as_deref() {
        Some(password) => {
            let username_ok = body.username.as_bytes().ct_eq(admin.username.as_bytes());
            let password_ok = body.password.as_bytes().ct_eq(password.as_bytes());
            (username_ok & password_ok).into()
        }
        None => {
            tracing::warn!("Admin login attempted but no admin password is configured");
            false
        }
    };
    if !accepted {
        tracing::info!(username = %body.username, "Admin login rejected");
        return (StatusCode::UNAUTHORIZED, Json(json!({ "error": "Invalid credentials" }))).into_response();
    }

    let token = match state.tokens.sign(&AdminSession::admin(&admin.username)) {
        Ok(token) => token,
        Err(e) => {
            tracing::error!(error = %e, "Failed to sign admin token");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    tracing::info!(username = %admin.username, "Admin logged in");
    let cookie = session_cookie(
        &admin.cookie_name,
        &token,
        state.tokens.ttl_secs(),
        config.auth.environment.is_production(),
    );
    with_cookie(Json(LoginResponse { ok: true, token }).into_response(), cookie)
}

pub async fn logout(State(state): State<AppState>) -> Response {
    let config = state.config.load();
    let cookie = cleared_cookie(&config.admin.cookie_name, config.auth.environment.is_production());
    with_cookie(Json(json!({ "ok": true })).into_response(), cookie)
}

pub async fn get_session(Extension(session): Extension<AdminSession>) -> Json<AdminSession> {
    Json(session)
}

pub async fn get_status(State(state): State<AppState>) -> Json<SystemStatus> {
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION").to_string(),
        status: "operational".to_string(),
        backend_url: state.backend_url.backend_url(),
    })
}
