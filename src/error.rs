//! Error types and Axum response conversions.
//!
//! Every error leaving a handler becomes a `{ "success": false, "message" }`
//! JSON body; nothing here is fatal to the process.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("All fields are required")]
    MissingField,

    #[error("Invalid email")]
    InvalidEmail,

    #[error("User already exists")]
    Conflict,

    #[error("User does not exist")]
    NotFound,

    #[error("Invalid credentials")]
    InvalidCredential,

    #[error("Invalid OTP")]
    InvalidCode,

    #[error("OTP expired")]
    Expired,

    #[error("Account already verified")]
    AlreadyVerified,

    #[error("Not authorized. Login again")]
    Unauthorized,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AuthError::MissingField
            | AuthError::InvalidEmail
            | AuthError::NotFound
            | AuthError::InvalidCode
            | AuthError::Expired
            | AuthError::AlreadyVerified => (StatusCode::BAD_REQUEST, self.to_string()),
            AuthError::Conflict => (StatusCode::CONFLICT, self.to_string()),
            AuthError::InvalidCredential | AuthError::Unauthorized => {
                (StatusCode::UNAUTHORIZED, self.to_string())
            }
            AuthError::Internal(msg) => {
                // Log detailed error server-side, return generic message to client
                tracing::error!(error = %msg, "internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "success": false,
            "message": message,
        }));

        (status, body).into_response()
    }
}

impl From<sqlx::Error> for AuthError {
    fn from(err: sqlx::Error) -> Self {
        // The unique constraint on users.email closes the check-then-create
        // race; surface the violation as a duplicate-user conflict.
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.code().as_deref() == Some("23505") {
                return AuthError::Conflict;
            }
        }
        AuthError::Internal(format!("database error: {}", err))
    }
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        AuthError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    /// Extract status code and JSON body from an AuthError response.
    async fn error_response(err: AuthError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        (status, serde_json::from_slice(&bytes).expect("json body"))
    }

    #[tokio::test]
    async fn missing_field_is_bad_request_with_success_false() {
        let (status, body) = error_response(AuthError::MissingField).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "All fields are required");
    }

    #[tokio::test]
    async fn conflict_reports_user_already_exists() {
        let (status, body) = error_response(AuthError::Conflict).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["message"], "User already exists");
    }

    #[tokio::test]
    async fn invalid_credential_is_unauthorized() {
        let (status, _) = error_response(AuthError::InvalidCredential).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn internal_hides_details_from_client() {
        let (status, body) = error_response(AuthError::Internal("db exploded".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "Internal server error");
    }
}
