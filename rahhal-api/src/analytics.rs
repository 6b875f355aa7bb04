use axum::{
    extract::{Query, State},
    middleware::from_fn_with_state,
    routing::get,
    Extension, Json, Router,
};
use chrono::Utc;
use rahhal_core::analytics::{OverviewStats, PopularPackage, TrailingPeriod};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::middleware::auth::{
    has_permission, staff_auth_middleware, Claims, PERM_VIEW_ANALYTICS,
};
use crate::response::ApiResponse;
use crate::state::AppState;

const POPULAR_PACKAGES_LIMIT: i64 = 5;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct PeriodQuery {
    pub period: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverviewResponse {
    pub period: String,
    #[serde(flatten)]
    pub stats: OverviewStats,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PopularPackagesResponse {
    pub period: String,
    pub packages: Vec<PopularPackage>,
}

pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/api/bookings/analytics/overview", get(overview))
        .route(
            "/api/bookings/analytics/popular-packages",
            get(popular_packages),
        )
        .route_layer(from_fn_with_state(state, staff_auth_middleware))
}

fn resolve_period(query: &PeriodQuery) -> (TrailingPeriod, String) {
    let raw = query.period.as_deref().unwrap_or("6months");
    let period = TrailingPeriod::parse(raw);
    (period, raw.to_string())
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/bookings/analytics/overview
/// Revenue, status, and service-type aggregates over a trailing window.
async fn overview(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<PeriodQuery>,
) -> Result<Json<ApiResponse<OverviewResponse>>, AppError> {
    if !has_permission(&claims, PERM_VIEW_ANALYTICS) {
        return Err(AppError::AuthorizationError(
            "Missing analytics permission".to_string(),
        ));
    }

    let (period, label) = resolve_period(&query);
    let window_start = period.window_start(Utc::now());

    let stats = state
        .analytics
        .overview(window_start)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    Ok(ApiResponse::success(OverviewResponse {
        period: label,
        stats,
    }))
}

/// GET /api/bookings/analytics/popular-packages
/// Top packages by booking count inside the window.
async fn popular_packages(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<PeriodQuery>,
) -> Result<Json<ApiResponse<PopularPackagesResponse>>, AppError> {
    if !has_permission(&claims, PERM_VIEW_ANALYTICS) {
        return Err(AppError::AuthorizationError(
            "Missing analytics permission".to_string(),
        ));
    }

    let (period, label) = resolve_period(&query);
    let window_start = period.window_start(Utc::now());

    let packages = state
        .analytics
        .popular_packages(window_start, POPULAR_PACKAGES_LIMIT)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    Ok(ApiResponse::success(PopularPackagesResponse {
        period: label,
        packages,
    }))
}
