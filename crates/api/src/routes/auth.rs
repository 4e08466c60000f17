use axum::{extract::State, http::StatusCode, Json};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use infra::models::UserRow;
use infra::repos::{AuthTokenRepo, CreateUser, RefreshTokenRepo, UserRepo};

use crate::auth::PasswordService;
use crate::error::AppError;
use crate::state::AppState;

const KIND_EMAIL_VERIFICATION: &str = "email_verification";
const KIND_PASSWORD_RESET: &str = "password_reset";

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: Uuid,
}

#[derive(Deserialize)]
pub struct VerifyEmailRequest {
    pub token: Uuid,
}

#[derive(Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Deserialize)]
pub struct ResetPasswordRequest {
    pub token: Uuid,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub refresh_token: Uuid,
    pub user: UserRow,
}

async fn issue_tokens(state: &AppState, user: UserRow) -> Result<AuthResponse, AppError> {
    let token =
        state
            .jwt_service()
            .create_token(user.id, user.email.clone(), user.role.clone())?;

    let expires_at = Utc::now() + Duration::days(state.auth_config().refresh_token_ttl_days);
    let refresh = RefreshTokenRepo::new(state.db.clone())
        .create(user.id, expires_at)
        .await?;

    Ok(AuthResponse {
        token,
        refresh_token: refresh.token,
        user,
    })
}

pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    PasswordService::validate_password_strength(&body.password)?;
    let password_hash = PasswordService::hash_password(&body.password)?;

    let user = UserRepo::new(state.db.clone())
        .create(CreateUser {
            email: body.email,
            first_name: body.first_name,
            last_name: body.last_name,
            password_hash,
            role: "student".to_string(),
        })
        .await
        .map_err(|e| AppError::conflict_on_unique(e, "An account with this email already exists"))?;

    let expires_at = Utc::now() + Duration::hours(state.auth_config().one_time_token_ttl_hours);
    let verification = AuthTokenRepo::new(state.db.clone())
        .create(user.id, KIND_EMAIL_VERIFICATION, expires_at)
        .await?;

    state.mailer().send(
        &user.email,
        "Verify your email",
        &format!("Your verification token is {}", verification.token),
    )?;

    let payload = issue_tokens(&state, user).await?;
    Ok((StatusCode::CREATED, Json(payload)))
}

pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let user = UserRepo::new(state.db.clone())
        .get_by_email(&body.email)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid email or password".to_string()))?;

    if !PasswordService::verify_password(&body.password, &user.password_hash)? {
        return Err(AppError::Unauthorized("Invalid email or password".to_string()));
    }
    if !user.is_active {
        return Err(AppError::Forbidden("This account is deactivated".to_string()));
    }

    let payload = issue_tokens(&state, user).await?;
    Ok(Json(payload))
}

/// Rotate the refresh token: the presented row is revoked and a fresh row
/// plus a fresh access token are returned.
pub async fn refresh(
    State(state): State<AppState>,
    Json(body): Json<RefreshRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let repo = RefreshTokenRepo::new(state.db.clone());

    let row = repo
        .get(body.refresh_token)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Unknown refresh token".to_string()))?;

    if row.revoked || row.expires_at <= Utc::now() {
        return Err(AppError::Unauthorized("Refresh token is no longer valid".to_string()));
    }

    let user = UserRepo::new(state.db.clone())
        .get_by_id(row.user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Unknown refresh token".to_string()))?;

    if !user.is_active {
        return Err(AppError::Forbidden("This account is deactivated".to_string()));
    }

    repo.revoke(row.token).await?;
    let payload = issue_tokens(&state, user).await?;
    Ok(Json(payload))
}

pub async fn logout(
    State(state): State<AppState>,
    Json(body): Json<RefreshRequest>,
) -> Result<StatusCode, AppError> {
    RefreshTokenRepo::new(state.db.clone())
        .revoke(body.refresh_token)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn verify_email(
    State(state): State<AppState>,
    Json(body): Json<VerifyEmailRequest>,
) -> Result<StatusCode, AppError> {
    let token = AuthTokenRepo::new(state.db.clone())
        .consume(body.token, KIND_EMAIL_VERIFICATION)
        .await?
        .ok_or_else(|| AppError::Validation("Invalid or expired verification token".to_string()))?;

    UserRepo::new(state.db.clone())
        .mark_email_verified(token.user_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Always answers 200 so the endpoint cannot be used to probe which emails
/// have accounts.
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(body): Json<ForgotPasswordRequest>,
) -> Result<StatusCode, AppError> {
    if let Some(user) = UserRepo::new(state.db.clone()).get_by_email(&body.email).await? {
        let expires_at = Utc::now() + Duration::hours(state.auth_config().one_time_token_ttl_hours);
        let reset = AuthTokenRepo::new(state.db.clone())
            .create(user.id, KIND_PASSWORD_RESET, expires_at)
            .await?;

        state.mailer().send(
            &user.email,
            "Reset your password",
            &format!("Your password reset token is {}", reset.token),
        )?;
    }

    Ok(StatusCode::OK)
}

pub async fn reset_password(
    State(state): State<AppState>,
    Json(body): Json<ResetPasswordRequest>,
) -> Result<StatusCode, AppError> {
    PasswordService::validate_password_strength(&body.password)?;

    let token = AuthTokenRepo::new(state.db.clone())
        .consume(body.token, KIND_PASSWORD_RESET)
        .await?
        .ok_or_else(|| AppError::Validation("Invalid or expired reset token".to_string()))?;

    let password_hash = PasswordService::hash_password(&body.password)?;
    UserRepo::new(state.db.clone())
        .update_password_hash(token.user_id, &password_hash)
        .await?;

    // Every open session has to log in again with the new password.
    RefreshTokenRepo::new(state.db.clone())
        .revoke_all_for_user(token.user_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
