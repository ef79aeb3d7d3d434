//! Handlers for the `/auth` resource (OTP issuance, registration, login).

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use learnlabs_core::error::CoreError;
use learnlabs_core::otp;
use learnlabs_core::roles::role_for;
use learnlabs_db::models::user::{CreateUser, UserResponse};
use learnlabs_db::repositories::{OtpRepo, UserRepo};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::jwt::generate_access_token;
use crate::auth::password::{
    hash_password, validate_password_strength, verify_password, MIN_PASSWORD_LENGTH,
};
use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Message used for every OTP mismatch.
const INVALID_OTP: &str = "Invalid or expired OTP";

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/send-otp`.
#[derive(Debug, Deserialize, Validate)]
pub struct SendOtpRequest {
    #[validate(email(message = "email must be a valid address"))]
    pub email: String,
}

/// Request body for `POST /auth/register`.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 50, message = "username must be 3-50 characters"))]
    pub username: String,
    #[validate(email(message = "email must be a valid address"))]
    pub email: String,
    pub otp: String,
    pub password: String,
    #[validate(length(max = 200))]
    pub full_name: Option<String>,
}

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Username or email address.
    pub identifier: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Successful login response.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    /// Always `"bearer"`.
    pub token_type: &'static str,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    pub user: UserResponse,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /auth/send-otp
///
/// Issue a fresh six-digit code for `email`, replacing any earlier codes,
/// and deliver it through the configured mailer.
pub async fn send_otp(
    State(state): State<AppState>,
    AppJson(input): AppJson<SendOtpRequest>,
) -> AppResult<Json<MessageResponse>> {
    input.validate()?;
    let email = input.email.trim().to_lowercase();

    if UserRepo::find_by_email(&state.pool, &email).await?.is_some() {
        return Err(AppError::Core(CoreError::Conflict(
            "Email is already registered".into(),
        )));
    }

    let code = otp::generate_code();
    OtpRepo::delete_for_email(&state.pool, &email).await?;
    OtpRepo::create(&state.pool, &email, &code, otp::expires_at(Utc::now())).await?;

    state
        .mailer
        .send_otp(&email, &code)
        .await
        .map_err(|e| AppError::InternalError(format!("Failed to deliver OTP: {e}")))?;

    Ok(Json(MessageResponse {
        message: "OTP sent successfully".into(),
    }))
}

/// POST /auth/register
///
/// Create an account after verifying the emailed OTP. The OTP is consumed
/// on success.
pub async fn register(
    State(state): State<AppState>,
    AppJson(input): AppJson<RegisterRequest>,
) -> AppResult<(StatusCode, Json<UserResponse>)> {
    input.validate()?;
    let email = input.email.trim().to_lowercase();
    let username = input.username.trim().to_string();

    validate_password_strength(&input.password, MIN_PASSWORD_LENGTH)
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;

    if !otp::is_well_formed(&input.otp) {
        return Err(AppError::BadRequest(INVALID_OTP.into()));
    }
    let now = Utc::now();
    if OtpRepo::find_valid(&state.pool, &email, &input.otp, now)
        .await?
        .is_none()
    {
        if OtpRepo::record_failed_attempt(&state.pool, &email, now).await? > 0 {
            tracing::warn!(email = %email, "Wrong OTP submitted");
        }
        return Err(AppError::BadRequest(INVALID_OTP.into()));
    }

    if UserRepo::find_by_username(&state.pool, &username)
        .await?
        .is_some()
    {
        return Err(AppError::Core(CoreError::Conflict(
            "Username is already taken".into(),
        )));
    }
    if UserRepo::find_by_email(&state.pool, &email).await?.is_some() {
        return Err(AppError::Core(CoreError::Conflict(
            "Email is already registered".into(),
        )));
    }

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            username,
            email: email.clone(),
            password_hash,
            full_name: input.full_name,
        },
    )
    .await?;

    OtpRepo::delete_for_email(&state.pool, &email).await?;

    tracing::info!(user_id = user.id, username = %user.username, "User registered");

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// POST /auth/login
///
/// Authenticate with username or email plus password. Returns a bearer token.
pub async fn login(
    State(state): State<AppState>,
    AppJson(input): AppJson<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let invalid =
        || AppError::Core(CoreError::Unauthorized("Invalid credentials".into()));

    let user = UserRepo::find_by_identifier(&state.pool, input.identifier.trim())
        .await?
        .ok_or_else(invalid)?;

    let password_valid = verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !password_valid {
        return Err(invalid());
    }

    if !user.is_active {
        return Err(AppError::Core(CoreError::Forbidden(
            "Account is deactivated".into(),
        )));
    }

    let access_token = generate_access_token(user.id, role_for(user.is_admin), &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    tracing::info!(user_id = user.id, "User logged in");

    Ok(Json(LoginResponse {
        access_token,
        token_type: "bearer",
        expires_in: state.config.jwt.access_token_expiry_mins * 60,
        user: UserResponse::from(user),
    }))
}

/// GET /auth/me
pub async fn me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<UserResponse>> {
    let user = UserRepo::find_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("User", auth.user_id)))?;
    Ok(Json(UserResponse::from(user)))
}
