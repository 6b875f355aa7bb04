use axum::{
    extract::State, middleware::from_fn_with_state, routing::get, Json, Router,
};
use rahhal_booking::models::BookingView;
use rahhal_core::analytics::DashboardStats;
use rahhal_core::repository::BookingFilter;
use rahhal_shared::PageRequest;
use serde::Serialize;

use crate::error::AppError;
use crate::middleware::auth::admin_auth_middleware;
use crate::response::ApiResponse;
use crate::state::AppState;

const RECENT_BOOKINGS: u32 = 5;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    #[serde(flatten)]
    pub stats: DashboardStats,
    pub recent_bookings: Vec<BookingView>,
}

pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/api/admin/dashboard", get(dashboard))
        .route_layer(from_fn_with_state(state, admin_auth_middleware))
}

/// GET /api/admin/dashboard
/// Combined overview: lifetime counters plus the newest bookings.
async fn dashboard(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<DashboardResponse>>, AppError> {
    let stats = state
        .analytics
        .dashboard()
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    let (recent_bookings, _) = state
        .bookings
        .list_bookings(
            &BookingFilter::default(),
            PageRequest::new(Some(1), Some(RECENT_BOOKINGS)),
        )
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    Ok(ApiResponse::success(DashboardResponse {
        stats,
        recent_bookings,
    }))
}
