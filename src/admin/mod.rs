pub mod auth;
pub mod handlers;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use self::auth::admin_session_middleware;
use self::handlers::*;
use crate::http::server::AppState;

/// `/admin` routes. Login and logout are public; the rest need a session.
pub fn setup_admin_router(state: AppState) -> Router<AppState> {
    let guarded = Router::new()
        .route("/admin/session", get(get_session))
        .route("/admin/status", get(get_status))
        .layer(middleware::from_fn_with_state(state, admin_session_middleware));

    Router::new()
        .route("/admin/login", post(login))
        .route("/admin/logout", post(logout))
        .merge(guarded)
}
