use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::auth::session::{session_token, AdminSession};
use crate::http::server::AppState;

fn unauthorized() -> Response {
    (StatusCode::UNAUTHORIZED, Json(json!({ "error": "Unauthorized" }))).into_response()
}

/// Admit requests carrying a valid admin token and expose the session to
/// handlers through request extensions.
pub async fn admin_session_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let cookie_name = state.config.load().admin.cookie_name.clone();

    let Some(token) = session_token(request.headers(), &cookie_name) else {
        return unauthorized();
    };

    let verified = state.tokens.verify::<AdminSession>(token);
    match verified {
        Ok(session) if session.is_admin() => {
            request.extensions_mut().insert(session);
            next.run(request).await
        }
        Ok(session) => {
            tracing::warn!(username = %session.username, role = %session.role, "Token without admin role");
            unauthorized()
        }
        Err(e) => {
            tracing::debug!(error = %e, "Rejected admin token");
            unauthorized()
        }
    }
}
