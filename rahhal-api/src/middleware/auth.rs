use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::state::AppState;

pub const PERM_MANAGE_BOOKINGS: &str = "canManageBookings";
pub const PERM_MANAGE_PACKAGES: &str = "canManagePackages";
pub const PERM_VIEW_ANALYTICS: &str = "canViewAnalytics";

// ============================================================================
// JWT Claims
// ============================================================================

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub role: String,
    pub permissions: Vec<String>,
    pub token_use: String,
    pub exp: usize,
}

fn decode_access_claims(req: &Request, secret: &str) -> Result<Claims, StatusCode> {
    // 1. Extract token from Authorization header
    let auth_header = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(StatusCode::UNAUTHORIZED)?;

    // 2. Decode and validate JWT
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| StatusCode::UNAUTHORIZED)?;

    // 3. Refresh tokens never grant API access
    if token_data.claims.token_use != "access" {
        return Err(StatusCode::UNAUTHORIZED);
    }

    Ok(token_data.claims)
}

// ============================================================================
// Authentication Middleware
// ============================================================================

/// Any active account: used by the public booking-creation endpoint.
pub async fn user_auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let claims = decode_access_claims(&req, &state.auth.secret)?;
    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

/// Staff or admin: the booking-management surface.
pub async fn staff_auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let claims = decode_access_claims(&req, &state.auth.secret)?;

    if claims.role != "staff" && claims.role != "admin" {
        return Err(StatusCode::FORBIDDEN);
    }

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

/// Admin only: package management, deletes, and the dashboard.
pub async fn admin_auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let claims = decode_access_claims(&req, &state.auth.secret)?;

    if claims.role != "admin" {
        return Err(StatusCode::FORBIDDEN);
    }

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

// ============================================================================
// Permission Check Helper
// ============================================================================

/// Admins carry every permission implicitly; staff need the explicit flag.
pub fn has_permission(claims: &Claims, permission: &str) -> bool {
    claims.role == "admin" || claims.permissions.iter().any(|p| p == permission)
}
