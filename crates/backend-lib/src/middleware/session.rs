//! Session cookie guard.
use crate::error::AppError;
use crate::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::{headers, TypedHeader};
use std::sync::Arc;

/// Read the session token named by `cookie_name`, if the request carries one
pub fn session_token<'a>(cookies: &'a headers::Cookie, cookie_name: &str) -> Option<&'a str> {
    cookies.get(cookie_name).filter(|token| !token.is_empty())
}

/// Reject requests without a live session; otherwise make the
/// [`Session`](crate::auth::Session) available as a request extension.
pub async fn require_session(
    State(state): State<Arc<AppState>>,
    cookies: Option<TypedHeader<headers::Cookie>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = cookies
        .as_ref()
        .and_then(|TypedHeader(cookies)| session_token(cookies, &state.settings.session.cookie_name))
        .ok_or_else(|| AppError::NotFound("session".to_string()))?;

    let session = state.auth.authenticate(token)?;
    request.extensions_mut().insert(session);
    Ok(next.run(request).await)
}
