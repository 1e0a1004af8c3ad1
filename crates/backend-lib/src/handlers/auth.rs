// ============================
// crates/backend-lib/src/handlers/auth.rs
// ============================
//! Signup, login, logout and session info handlers.
use crate::auth::Session;
use crate::config::SessionSettings;
use crate::error::AppError;
use crate::middleware::session_token;
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header::SET_COOKIE, HeaderValue, StatusCode},
    response::IntoResponse,
    Extension, Json,
};
use axum_extra::{headers, TypedHeader};
use chrono::{DateTime, Utc};
use sessionauth_common::{
    LoginRequest, LoginResponse, MessageResponse, SessionInfo, SignupRequest, SignupResponse,
};
use std::sync::Arc;
use tracing::debug;

/// `Expires` attribute format (IMF-fixdate)
const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload.map(|Json(body)| body).map_err(|rejection| {
        debug!(error = %rejection, "rejected request body");
        AppError::InvalidInput("Invalid request body".to_string())
    })
}

fn cookie_attributes(settings: &SessionSettings) -> &'static str {
    if settings.secure_cookie {
        "HttpOnly; Secure; Path=/; SameSite=Lax"
    } else {
        "HttpOnly; Path=/; SameSite=Lax"
    }
}

/// `Set-Cookie` value binding `token` to the client until `expires_at`
pub fn session_cookie(
    settings: &SessionSettings,
    token: &str,
    expires_at: DateTime<Utc>,
) -> Result<HeaderValue, AppError> {
    let cookie = format!(
        "{}={}; {}; Expires={}",
        settings.cookie_name,
        token,
        cookie_attributes(settings),
        expires_at.format(HTTP_DATE_FORMAT)
    );
    HeaderValue::from_str(&cookie)
        .map_err(|e| AppError::Internal(format!("invalid session cookie: {e}")))
}

/// `Set-Cookie` value that makes the client drop its session cookie
pub fn clear_session_cookie(settings: &SessionSettings) -> Result<HeaderValue, AppError> {
    let cookie = format!(
        "{}=; {}; Max-Age=0; Expires=Thu, 01 Jan 1970 00:00:00 GMT",
        settings.cookie_name,
        cookie_attributes(settings)
    );
    HeaderValue::from_str(&cookie)
        .map_err(|e| AppError::Internal(format!("invalid session cookie: {e}")))
}

/// `POST /api/signup`
pub async fn signup(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let request = json_body(payload)?;
    let user_id = state.auth.signup(request).await?;

    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            message: "User created successfully".to_string(),
            user_id,
        }),
    ))
}

/// `POST /api/login`
pub async fn login(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let request = json_body(payload)?;
    let outcome = state.auth.login(request).await?;
    let cookie = session_cookie(&state.settings.session, &outcome.token, outcome.expires_at)?;

    Ok((
        [(SET_COOKIE, cookie)],
        Json(LoginResponse {
            message: "Login successful".to_string(),
            user_id: outcome.user_id,
            username: outcome.username,
            expires_at: outcome.expires_at,
        }),
    ))
}

/// `POST /api/logout`
pub async fn logout(
    State(state): State<Arc<AppState>>,
    cookies: Option<TypedHeader<headers::Cookie>>,
) -> Result<impl IntoResponse, AppError> {
    if let Some(TypedHeader(cookies)) = &cookies {
        if let Some(token) = session_token(cookies, &state.settings.session.cookie_name) {
            state.auth.logout(token);
        }
    }
    let cookie = clear_session_cookie(&state.settings.session)?;

    Ok((
        [(SET_COOKIE, cookie)],
        Json(MessageResponse {
            message: "Logged out".to_string(),
        }),
    ))
}

/// `GET /api/me`, behind [`require_session`](crate::middleware::require_session)
pub async fn me(Extension(session): Extension<Session>) -> Json<SessionInfo> {
    Json(SessionInfo {
        user_id: session.user_id,
        expires_at: session.expires_at,
    })
}

/// `GET /health`
pub async fn health() -> &'static str {
    "ok"
}
