// ================
// common/src/lib.rs
// ================
//! Request and response bodies exchanged between the session-auth server
//! and its HTTP clients.
//!
//! Field names are camelCase on the wire.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier assigned to a user record by the user store
pub type UserId = i64;

/// Body of `POST /api/signup`
#[derive(Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Body of `POST /api/login`
#[derive(Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub username: String,
    /// A missing password is a failed login, not a malformed request
    #[serde(default)]
    pub password: String,
}

// Passwords never show up in logs, even at debug level.
impl fmt::Debug for SignupRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignupRequest")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Response to a successful signup
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SignupResponse {
    pub message: String,
    pub user_id: UserId,
}

/// Response to a successful login. The token itself travels in the
/// `Set-Cookie` header, not in the body.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub message: String,
    pub user_id: UserId,
    pub username: String,
    pub expires_at: DateTime<Utc>,
}

/// Response of the protected `GET /api/me` route
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    pub user_id: UserId,
    pub expires_at: DateTime<Utc>,
}

/// Plain acknowledgement
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MessageResponse {
    pub message: String,
}

/// Error envelope: `{"error": {"code": "...", "message": "..."}}`
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_password() {
        let req = LoginRequest {
            username: "alice".to_string(),
            password: "Secret123".to_string(),
        };
        let printed = format!("{req:?}");
        assert!(printed.contains("alice"));
        assert!(!printed.contains("Secret123"));

        let req = SignupRequest {
            username: "alice".to_string(),
            email: "a@x.com".to_string(),
            password: "Secret123".to_string(),
        };
        assert!(!format!("{req:?}").contains("Secret123"));
    }

    #[test]
    fn test_camel_case_wire_names() {
        let resp = SignupResponse {
            message: "User created successfully".to_string(),
            user_id: 7,
        };
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["userId"], 7);

        let req: SignupRequest = serde_json::from_str(
            r#"{"username":"alice","email":"a@x.com","password":"Secret123"}"#,
        )
        .unwrap();
        assert_eq!(req.email, "a@x.com");
    }

    #[test]
    fn test_login_password_defaults_to_empty() {
        let req: LoginRequest = serde_json::from_str(r#"{"username":"bob"}"#).unwrap();
        assert_eq!(req.username, "bob");
        assert!(req.password.is_empty());
    }
}
