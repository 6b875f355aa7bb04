use argon2::{Argon2, PasswordHash, PasswordVerifier};
use axum::{extract::State, routing::post, Json, Router};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use rahhal_core::user::User;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::error::AppError;
use crate::middleware::auth::{
    Claims, PERM_MANAGE_BOOKINGS, PERM_MANAGE_PACKAGES, PERM_VIEW_ANALYTICS,
};
use crate::response::ApiResponse;
use crate::state::{AppState, AuthConfig};
use crate::validation;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    #[validate(length(min = 1, message = "Refresh token is required"))]
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub user: UserProfile,
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub access_token: String,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/refresh", post(refresh))
}

// ============================================================================
// Token Issuance
// ============================================================================

fn permission_names(user: &User) -> Vec<String> {
    let mut names = Vec::new();
    if user.permissions.can_manage_bookings {
        names.push(PERM_MANAGE_BOOKINGS.to_string());
    }
    if user.permissions.can_manage_packages {
        names.push(PERM_MANAGE_PACKAGES.to_string());
    }
    if user.permissions.can_view_analytics {
        names.push(PERM_VIEW_ANALYTICS.to_string());
    }
    names
}

pub fn issue_token(
    user: &User,
    auth: &AuthConfig,
    token_use: &str,
    ttl_seconds: u64,
) -> Result<String, AppError> {
    let claims = Claims {
        sub: user.id.to_string(),
        email: user.email.clone(),
        role: user.role.to_string(),
        permissions: permission_names(user),
        token_use: token_use.to_string(),
        exp: (Utc::now() + Duration::seconds(ttl_seconds as i64)).timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(auth.secret.as_bytes()),
    )
    .map_err(|e| AppError::InternalServerError(format!("Token encoding failed: {}", e)))
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/auth/login
/// Verify credentials and issue an access/refresh token pair.
async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, AppError> {
    validation::check(&req)?;

    // 1. Resolve the account. Unknown emails get the same answer as bad
    // passwords.
    let user = state
        .users
        .find_by_email(&req.email)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?
        .ok_or_else(|| AppError::AuthenticationError("Invalid email or password".to_string()))?;

    if !user.is_active {
        return Err(AppError::AuthorizationError(
            "Account is disabled".to_string(),
        ));
    }

    let now = Utc::now();
    if user.is_locked(now) {
        return Err(AppError::AuthorizationError(
            "Account temporarily locked after repeated failed logins".to_string(),
        ));
    }

    // 2. Verify the password hash
    let parsed_hash = PasswordHash::new(&user.password_hash)
        .map_err(|e| AppError::InternalServerError(format!("Corrupt password hash: {}", e)))?;

    if Argon2::default()
        .verify_password(req.password.as_bytes(), &parsed_hash)
        .is_err()
    {
        // 3. Count the failure and lock the account past the threshold
        let attempts = user.failed_login_attempts + 1;
        let locked_until = if attempts >= state.auth.max_login_attempts {
            Some(now + Duration::minutes(state.auth.lockout_minutes))
        } else {
            None
        };
        state
            .users
            .record_login_failure(user.id, attempts, locked_until)
            .await
            .map_err(|e| AppError::InternalServerError(e.to_string()))?;

        return Err(AppError::AuthenticationError(
            "Invalid email or password".to_string(),
        ));
    }

    // 4. Reset counters and issue the token pair
    state
        .users
        .record_login_success(user.id)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    let access_token = issue_token(&user, &state.auth, "access", state.auth.access_expiration)?;
    let refresh_token = issue_token(&user, &state.auth, "refresh", state.auth.refresh_expiration)?;

    info!(user_id = %user.id, "login succeeded");

    Ok(ApiResponse::success(LoginResponse {
        user: UserProfile {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role.to_string(),
        },
        access_token,
        refresh_token,
    }))
}

/// POST /api/auth/refresh
/// Rotate the access token from a still-valid refresh token.
async fn refresh(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> Result<Json<ApiResponse<RefreshResponse>>, AppError> {
    validation::check(&req)?;

    let token_data = jsonwebtoken::decode::<Claims>(
        &req.refresh_token,
        &jsonwebtoken::DecodingKey::from_secret(state.auth.secret.as_bytes()),
        &jsonwebtoken::Validation::default(),
    )
    .map_err(|_| AppError::AuthenticationError("Invalid refresh token".to_string()))?;

    if token_data.claims.token_use != "refresh" {
        return Err(AppError::AuthenticationError(
            "Invalid refresh token".to_string(),
        ));
    }

    let user_id = Uuid::parse_str(&token_data.claims.sub)
        .map_err(|_| AppError::AuthenticationError("Invalid refresh token".to_string()))?;

    // Re-check the account so a disabled user cannot keep minting access
    // tokens from an old refresh token.
    let user = state
        .users
        .find_by_id(user_id)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?
        .ok_or_else(|| AppError::AuthenticationError("Invalid refresh token".to_string()))?;

    if !user.is_active {
        return Err(AppError::AuthorizationError(
            "Account is disabled".to_string(),
        ));
    }

    let access_token = issue_token(&user, &state.auth, "access", state.auth.access_expiration)?;

    Ok(ApiResponse::success(RefreshResponse { access_token }))
}
