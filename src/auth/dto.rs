use serde::{Deserialize, Serialize};

/// Request body for user registration.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Request body for email verification.
#[derive(Debug, Deserialize)]
pub struct VerifyEmailRequest {
    pub otp: String,
}

/// Request body for requesting a password-reset OTP.
#[derive(Debug, Deserialize)]
pub struct SendResetOtpRequest {
    pub email: String,
}

/// Request body for resetting the password with an OTP.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub email: String,
    pub otp: String,
    pub new_password: String,
}

/// Standard `{success, message}` response body.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

/// Response returned after registration; carries the session token in the
/// body as well as in the cookie.
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub success: bool,
    pub message: String,
    pub token: String,
}

/// Public part of the user returned to the client.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserData {
    pub name: String,
    pub email: String,
    pub is_account_verified: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDataResponse {
    pub success: bool,
    pub user_data: UserData,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_data_serializes_camel_case() {
        let response = UserDataResponse {
            success: true,
            user_data: UserData {
                name: "A".into(),
                email: "a@x.com".into(),
                is_account_verified: false,
            },
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("userData"));
        assert!(json.contains("isAccountVerified"));
        assert!(json.contains("a@x.com"));
    }

    #[test]
    fn reset_password_request_uses_camel_case_field() {
        let body = r#"{"email":"a@x.com","otp":"123456","newPassword":"pw2"}"#;
        let req: ResetPasswordRequest = serde_json::from_str(body).unwrap();
        assert_eq!(req.new_password, "pw2");
    }

    #[test]
    fn message_response_shape() {
        let json = serde_json::to_string(&MessageResponse::ok("Login successful")).unwrap();
        assert!(json.contains(r#""success":true"#));
        assert!(json.contains("Login successful"));
    }
}
