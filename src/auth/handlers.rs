use axum::{
    extract::{FromRef, State},
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{error, info, instrument, warn};

use crate::{
    auth::{
        cookie::{clear_session_cookie, session_cookie},
        dto::{
            LoginRequest, MessageResponse, RegisterRequest, RegisterResponse, ResetPasswordRequest,
            SendResetOtpRequest, UserData, UserDataResponse, VerifyEmailRequest,
        },
        extractors::AuthUser,
        jwt::JwtKeys,
        otp::{self, OtpPurpose},
        password::{hash_password, verify_password},
        repo_types::User,
    },
    error::AuthError,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/auth/send-verify-otp", post(send_verify_otp))
        .route("/auth/verify-email", post(verify_email))
        .route("/auth/is-authenticated", get(is_authenticated))
        .route("/auth/send-reset-otp", post(send_reset_otp))
        .route("/auth/reset-password", post(reset_password))
}

pub fn user_routes() -> Router<AppState> {
    Router::new().route("/user/data", get(get_user_data))
}

fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

fn cookie_headers(value: axum::http::HeaderValue) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(SET_COOKIE, value);
    headers
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(mut payload): Json<RegisterRequest>,
) -> Result<(StatusCode, HeaderMap, Json<RegisterResponse>), AuthError> {
    payload.email = payload.email.trim().to_lowercase();

    if payload.name.trim().is_empty() || payload.email.is_empty() || payload.password.is_empty() {
        warn!("register with missing fields");
        return Err(AuthError::MissingField);
    }
    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(AuthError::InvalidEmail);
    }

    // Ensure email is not taken. The unique constraint still backstops the
    // window between this check and the insert.
    if User::find_by_email(&state.db, &payload.email).await?.is_some() {
        warn!(email = %payload.email, "email already registered");
        return Err(AuthError::Conflict);
    }

    let hash = hash_password(&payload.password).map_err(|e| {
        error!(error = %e, "hash_password failed");
        AuthError::Internal(e.to_string())
    })?;

    let user = User::create(&state.db, payload.name.trim(), &payload.email, &hash).await?;

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(user.id).map_err(|e| {
        error!(error = %e, "jwt sign failed");
        AuthError::Internal(e.to_string())
    })?;
    let cookie = session_cookie(&token, state.config.production)
        .map_err(|e| AuthError::Internal(e.to_string()))?;

    state
        .mailer
        .send(
            &user.email,
            "Welcome",
            &format!(
                "Welcome {}! Your account has been created with email {}.",
                user.name, user.email
            ),
        )
        .await
        .map_err(|e| {
            error!(error = %e, "welcome mail failed");
            AuthError::Internal(e.to_string())
        })?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok((
        StatusCode::CREATED,
        cookie_headers(cookie),
        Json(RegisterResponse {
            success: true,
            message: "User registered successfully".into(),
            token,
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(mut payload): Json<LoginRequest>,
) -> Result<(HeaderMap, Json<MessageResponse>), AuthError> {
    payload.email = payload.email.trim().to_lowercase();

    if payload.email.is_empty() || payload.password.is_empty() {
        warn!("login with missing fields");
        return Err(AuthError::MissingField);
    }

    let user = match User::find_by_email(&state.db, &payload.email).await? {
        Some(u) => u,
        None => {
            warn!(email = %payload.email, "login unknown email");
            return Err(AuthError::NotFound);
        }
    };

    let ok = verify_password(&payload.password, &user.password_hash).map_err(|e| {
        error!(error = %e, "verify_password failed");
        AuthError::Internal(e.to_string())
    })?;
    if !ok {
        warn!(email = %payload.email, user_id = %user.id, "login invalid password");
        return Err(AuthError::InvalidCredential);
    }

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(user.id).map_err(|e| {
        error!(error = %e, "jwt sign failed");
        AuthError::Internal(e.to_string())
    })?;
    let cookie = session_cookie(&token, state.config.production)
        .map_err(|e| AuthError::Internal(e.to_string()))?;

    info!(user_id = %user.id, email = %user.email, "user logged in");
    Ok((
        cookie_headers(cookie),
        Json(MessageResponse::ok("Login successful")),
    ))
}

#[instrument(skip(state))]
pub async fn logout(
    State(state): State<AppState>,
) -> Result<(HeaderMap, Json<MessageResponse>), AuthError> {
    let cookie = clear_session_cookie(state.config.production)
        .map_err(|e| AuthError::Internal(e.to_string()))?;
    Ok((cookie_headers(cookie), Json(MessageResponse::ok("Logged out"))))
}

#[instrument(skip(state))]
pub async fn send_verify_otp(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<MessageResponse>, AuthError> {
    let user = User::find_by_id(&state.db, user_id)
        .await?
        .ok_or(AuthError::NotFound)?;

    if user.is_account_verified {
        warn!(user_id = %user.id, "account already verified");
        return Err(AuthError::AlreadyVerified);
    }

    let code = otp::issue(&state.db, user.id, OtpPurpose::Verify).await?;
    state
        .mailer
        .send(
            &user.email,
            "Account verification OTP",
            &format!("Your OTP is {code}. Verify your account using this OTP."),
        )
        .await
        .map_err(|e| {
            error!(error = %e, "verify otp mail failed");
            AuthError::Internal(e.to_string())
        })?;

    info!(user_id = %user.id, "verification otp sent");
    Ok(Json(MessageResponse::ok("Verification OTP sent on email")))
}

#[instrument(skip(state, payload))]
pub async fn verify_email(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<VerifyEmailRequest>,
) -> Result<Json<MessageResponse>, AuthError> {
    if payload.otp.trim().is_empty() {
        return Err(AuthError::MissingField);
    }

    otp::validate(&state.db, user_id, OtpPurpose::Verify, payload.otp.trim()).await?;

    info!(user_id = %user_id, "email verified");
    Ok(Json(MessageResponse::ok("Email verified successfully")))
}

#[instrument]
pub async fn is_authenticated(
    AuthUser(user_id): AuthUser,
) -> Result<Json<MessageResponse>, AuthError> {
    info!(user_id = %user_id, "session valid");
    Ok(Json(MessageResponse::ok("Authenticated")))
}

#[instrument(skip(state, payload))]
pub async fn send_reset_otp(
    State(state): State<AppState>,
    Json(mut payload): Json<SendResetOtpRequest>,
) -> Result<Json<MessageResponse>, AuthError> {
    payload.email = payload.email.trim().to_lowercase();
    if payload.email.is_empty() {
        return Err(AuthError::MissingField);
    }

    let user = User::find_by_email(&state.db, &payload.email)
        .await?
        .ok_or(AuthError::NotFound)?;

    let code = otp::issue(&state.db, user.id, OtpPurpose::Reset).await?;
    state
        .mailer
        .send(
            &user.email,
            "Password reset OTP",
            &format!("Your OTP for resetting your password is {code}."),
        )
        .await
        .map_err(|e| {
            error!(error = %e, "reset otp mail failed");
            AuthError::Internal(e.to_string())
        })?;

    info!(user_id = %user.id, "reset otp sent");
    Ok(Json(MessageResponse::ok("OTP sent to your email")))
}

#[instrument(skip(state, payload))]
pub async fn reset_password(
    State(state): State<AppState>,
    Json(mut payload): Json<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>, AuthError> {
    payload.email = payload.email.trim().to_lowercase();
    if payload.email.is_empty() || payload.otp.trim().is_empty() || payload.new_password.is_empty()
    {
        return Err(AuthError::MissingField);
    }

    let mut user = User::find_by_email(&state.db, &payload.email)
        .await?
        .ok_or(AuthError::NotFound)?;

    otp::validate(&state.db, user.id, OtpPurpose::Reset, payload.otp.trim()).await?;

    user.password_hash = hash_password(&payload.new_password).map_err(|e| {
        error!(error = %e, "hash_password failed");
        AuthError::Internal(e.to_string())
    })?;
    // The OTP columns were already cleared by validate; keep the in-memory
    // record consistent before the whole-row save.
    user.reset_otp.clear();
    user.reset_otp_expires_at = None;
    user.save(&state.db).await?;

    info!(user_id = %user.id, "password reset");
    Ok(Json(MessageResponse::ok(
        "Password has been reset successfully",
    )))
}

#[instrument(skip(state))]
pub async fn get_user_data(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<UserDataResponse>, AuthError> {
    let user = User::find_by_id(&state.db, user_id)
        .await?
        .ok_or(AuthError::NotFound)?;

    Ok(Json(UserDataResponse {
        success: true,
        user_data: UserData {
            name: user.name,
            email: user.email,
            is_account_verified: user.is_account_verified,
        },
    }))
}
