//! Auth API Endpoints
//!
//! Embedded authentication endpoints:
//! - POST /auth/register - Create an account (STUDENT by default)
//! - POST /auth/login - Password-based login, returns a token pair
//! - POST /auth/refresh - Exchange a refresh token for a new pair
//! - POST /auth/forgot-password - Email a password-reset link
//! - POST /auth/change-password - Rotate the password (authenticated)
//! - GET /auth/me - Current principal info

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::api::common::{CreatedResponse, SuccessResponse};
use crate::api::middleware::Authenticated;
use crate::domain::{Principal, User};
use crate::error::PlatformError;
use crate::service::account;
use crate::service::auth::AuthService;
use crate::service::password::PasswordService;
use crate::service::reset::PasswordResetService;
use crate::store::UserStore;

/// Registration request
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    /// Email address (unique, case-insensitive)
    pub email: String,

    /// Password (min 8 characters)
    pub password: String,

    /// Display name
    pub name: String,
}

/// Login request
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    /// Email address
    pub email: String,

    /// Password
    pub password: String,
}

/// Token pair response
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    /// Access token
    pub access_token: String,

    /// Refresh token
    pub refresh_token: String,

    /// Token type (always "Bearer")
    pub token_type: String,

    /// Access token expiration time in seconds
    pub expires_in: i64,
}

/// Refresh token request
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenRequest {
    /// The refresh token
    pub refresh_token: String,
}

/// Forgot password request
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ForgotPasswordRequest {
    /// Email address of the account to reset
    pub email: String,
}

/// Change password request
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    /// Current password
    pub old_password: String,

    /// New password (min 8 characters)
    pub new_password: String,
}

/// Current user info response
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUserResponse {
    /// Principal ID
    pub id: String,

    /// Email address
    pub email: String,

    /// Role as embedded in the presented token
    pub role: String,
}

/// Auth service state
#[derive(Clone)]
pub struct AuthState {
    pub auth_service: Arc<AuthService>,
    pub user_store: Arc<dyn UserStore>,
    pub password_service: Arc<PasswordService>,
    pub reset_service: Arc<PasswordResetService>,
}

impl AuthState {
    pub fn new(
        auth_service: Arc<AuthService>,
        user_store: Arc<dyn UserStore>,
        password_service: Arc<PasswordService>,
        reset_service: Arc<PasswordResetService>,
    ) -> Self {
        Self {
            auth_service,
            user_store,
            password_service,
            reset_service,
        }
    }

    fn token_pair(&self, principal: &Principal) -> Result<LoginResponse, PlatformError> {
        Ok(LoginResponse {
            access_token: self.auth_service.issue_access(principal)?,
            refresh_token: self.auth_service.issue_refresh(principal)?,
            token_type: "Bearer".to_string(),
            expires_in: self.auth_service.access_token_ttl_secs(),
        })
    }
}

fn validate_password(password: &str) -> Result<(), PlatformError> {
    if password.len() < 8 {
        return Err(PlatformError::validation(
            "Password must be at least 8 characters",
        ));
    }
    Ok(())
}

/// Register a new account
///
/// New accounts are created ACTIVE with the STUDENT role.
#[utoipa::path(
    post,
    path = "/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = CreatedResponse),
        (status = 400, description = "Validation error"),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn register(
    State(state): State<AuthState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<CreatedResponse>), PlatformError> {
    if !req.email.contains('@') {
        return Err(PlatformError::validation("Invalid email address"));
    }
    if req.name.trim().is_empty() {
        return Err(PlatformError::validation("Name must not be empty"));
    }
    validate_password(&req.password)?;

    let password_hash = state.password_service.hash_async(req.password).await?;
    let user = User::new(req.email, password_hash, req.name.trim());

    let id = user.id.clone();
    state.user_store.insert(&user).await?;

    Ok((StatusCode::CREATED, Json(CreatedResponse::new(id))))
}

/// Login with email and password
///
/// Authenticates a user with email and password credentials and returns an
/// access/refresh token pair. Unknown emails and wrong passwords are not
/// distinguishable from the outside.
#[utoipa::path(
    post,
    path = "/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 401, description = "Invalid credentials or inactive account")
    )
)]
pub async fn login(
    State(state): State<AuthState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, PlatformError> {
    let user = state
        .user_store
        .find_by_email(&req.email)
        .await?
        .ok_or(PlatformError::InvalidCredentials)?;

    let password_valid = state
        .password_service
        .verify_async(req.password, user.password_hash.clone())
        .await?;
    if !password_valid {
        return Err(PlatformError::InvalidCredentials);
    }

    account::ensure_active(&user)?;

    let response = state.token_pair(&Principal::from(&user))?;
    Ok(Json(response))
}

/// Refresh access token
///
/// Exchange a refresh token for a new token pair. The user is re-resolved
/// and the status policy re-applied before reissue, so a blocked account
/// cannot refresh its way back in; the new tokens carry the role currently
/// on record.
#[utoipa::path(
    post,
    path = "/refresh",
    tag = "auth",
    request_body = RefreshTokenRequest,
    responses(
        (status = 200, description = "Token refreshed", body = LoginResponse),
        (status = 401, description = "Invalid refresh token or inactive account")
    )
)]
pub async fn refresh_token(
    State(state): State<AuthState>,
    Json(req): Json<RefreshTokenRequest>,
) -> Result<Json<LoginResponse>, PlatformError> {
    let claims = state.auth_service.verify_refresh(&req.refresh_token)?;

    let user = state
        .user_store
        .find_by_email(&claims.email)
        .await?
        .ok_or(PlatformError::InvalidToken)?;
    account::ensure_active(&user)?;

    // Fresh principal from the store: this is where role changes land.
    let response = state.token_pair(&Principal::from(&user))?;
    Ok(Json(response))
}

/// Request a password reset email
#[utoipa::path(
    post,
    path = "/forgot-password",
    tag = "auth",
    request_body = ForgotPasswordRequest,
    responses(
        (status = 200, description = "Reset email sent", body = SuccessResponse),
        (status = 401, description = "Unknown email or inactive account")
    )
)]
pub async fn forgot_password(
    State(state): State<AuthState>,
    Json(req): Json<ForgotPasswordRequest>,
) -> Result<Json<SuccessResponse>, PlatformError> {
    state.reset_service.request_reset(&req.email).await?;
    Ok(Json(SuccessResponse::with_message(
        "Password reset email sent",
    )))
}

/// Change the current user's password
///
/// Requires an access token (the emailed reset token never grants API
/// access by itself) and the current password.
#[utoipa::path(
    post,
    path = "/change-password",
    tag = "auth",
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed", body = SuccessResponse),
        (status = 401, description = "Wrong current password")
    ),
    security(("bearer_auth" = []))
)]
pub async fn change_password(
    State(state): State<AuthState>,
    auth: Authenticated,
    Json(req): Json<ChangePasswordRequest>,
) -> Result<Json<SuccessResponse>, PlatformError> {
    validate_password(&req.new_password)?;

    let user = state
        .user_store
        .find_by_id(&auth.0.id)
        .await?
        .ok_or(PlatformError::UserNotFound)?;

    let old_valid = state
        .password_service
        .verify_async(req.old_password, user.password_hash.clone())
        .await?;
    if !old_valid {
        return Err(PlatformError::InvalidCredentials);
    }

    let new_hash = state.password_service.hash_async(req.new_password).await?;
    state.user_store.update_password(&user.id, &new_hash).await?;

    Ok(Json(SuccessResponse::ok()))
}

/// Get current user info
#[utoipa::path(
    get,
    path = "/me",
    tag = "auth",
    responses(
        (status = 200, description = "Current user info", body = CurrentUserResponse),
        (status = 401, description = "Not authenticated")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_current_user(
    auth: Authenticated,
) -> Result<Json<CurrentUserResponse>, PlatformError> {
    let principal = &auth.0;

    Ok(Json(CurrentUserResponse {
        id: principal.id.clone(),
        email: principal.email.clone(),
        role: principal.role.as_str().to_string(),
    }))
}

/// Create the auth router
pub fn auth_router(state: AuthState) -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/refresh", post(refresh_token))
        .route("/forgot-password", post(forgot_password))
        .route("/change-password", post(change_password))
        .route("/me", get(get_current_user))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_request_deserialization() {
        let json = r#"{"email":"user@example.com","password":"password123"}"#;
        let req: LoginRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.email, "user@example.com");
        assert_eq!(req.password, "password123");
    }

    #[test]
    fn test_login_response_serialization() {
        let response = LoginResponse {
            access_token: "token123".to_string(),
            refresh_token: "token456".to_string(),
            token_type: "Bearer".to_string(),
            expires_in: 3600,
        };

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("accessToken"));
        assert!(json.contains("refreshToken"));
        assert!(json.contains("tokenType"));
        assert!(json.contains("expiresIn"));
    }

    #[test]
    fn test_change_password_request_uses_camel_case() {
        let json = r#"{"oldPassword":"old-secret","newPassword":"new-secret"}"#;
        let req: ChangePasswordRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.old_password, "old-secret");
        assert_eq!(req.new_password, "new-secret");
    }

    #[test]
    fn test_password_validation() {
        assert!(validate_password("short").is_err());
        assert!(validate_password("longenough").is_ok());
    }
}
