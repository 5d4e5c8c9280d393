//! Authentication HTTP handlers.

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Extension, Json,
};

use crate::error::ApiResult;
use crate::AppState;

use super::{
    build_auth_cookie,
    types::{ProvidersResponse, Session, SessionUser},
};

/// Session for the current request, enriched from the user directory.
pub async fn auth_session(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<Session>> {
    let session = state.auth.current_user(&headers).await?;
    Ok(Json(session))
}

/// Registered identity providers and the sign-in page theme.
pub async fn auth_providers(State(state): State<AppState>) -> Json<ProvidersResponse> {
    Json(ProvidersResponse {
        providers: state.auth.providers(),
        theme: state.auth.theme().into(),
    })
}

/// Sign out - clear auth cookie.
pub async fn auth_signout(State(state): State<AppState>) -> impl IntoResponse {
    let cookie = build_auth_cookie(&state.auth.config().cookie_name, "", 0);

    (
        StatusCode::SEE_OTHER,
        [(header::LOCATION, "/".to_string()), (header::SET_COOKIE, cookie)],
    )
}

/// Current user, for routes behind `require_session`.
pub async fn auth_me(Extension(session): Extension<Session>) -> Json<SessionUser> {
    Json(session.user)
}
