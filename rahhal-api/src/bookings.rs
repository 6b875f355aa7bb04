use axum::{
    extract::{Path, Query, State},
    middleware::from_fn_with_state,
    routing::{delete, get, post, put},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use rahhal_booking::lifecycle::{check_payment_transition, check_status_transition};
use rahhal_booking::models::{
    AdditionalService, BookingStatus, BookingView, PaymentMethod, PaymentStatus, PersonalInfo,
    RoomType, TravelDetails,
};
use rahhal_booking::pricing::quote;
use rahhal_catalog::ServiceType;
use rahhal_core::repository::{BookingFilter, NewBooking};
use rahhal_shared::{Masked, PageMeta, PageRequest};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, FieldViolation};
use crate::middleware::auth::{
    admin_auth_middleware, has_permission, staff_auth_middleware, user_auth_middleware, Claims,
    PERM_MANAGE_BOOKINGS,
};
use crate::response::ApiResponse;
use crate::state::AppState;
use crate::validation;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PersonalInfoRequest {
    #[validate(length(min = 1, message = "First name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, message = "Last name is required"))]
    pub last_name: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 5, message = "Phone number is required"))]
    pub phone: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TravelDetailsRequest {
    #[validate(length(min = 1, message = "Departure city is required"))]
    pub departure_city: String,
    pub preferred_departure_date: DateTime<Utc>,
    pub return_date: DateTime<Utc>,
    #[validate(range(min = 1, message = "At least one traveler is required"))]
    pub number_of_travelers: u32,
    pub room_type: String,
    #[serde(default)]
    pub special_requests: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AdditionalServiceRequest {
    #[validate(length(min = 1, message = "Service name is required"))]
    pub service: String,
    #[validate(range(min = 0.0, message = "Service price must not be negative"))]
    pub price: f64,
    #[serde(default = "default_quantity")]
    #[validate(range(min = 1, message = "Quantity must be at least one"))]
    pub quantity: u32,
}

fn default_quantity() -> u32 {
    1
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    pub service_type: String,
    pub package_id: Uuid,
    #[validate(nested)]
    pub personal_info: PersonalInfoRequest,
    #[validate(nested)]
    pub travel_details: TravelDetailsRequest,
    #[serde(default)]
    #[validate(nested)]
    pub additional_services: Vec<AdditionalServiceRequest>,
    #[serde(default)]
    pub payment_method: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListBookingsQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub status: Option<String>,
    pub service_type: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePaymentRequest {
    pub payment_status: String,
    #[serde(default)]
    pub payment_method: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingListResponse {
    pub bookings: Vec<BookingView>,
    pub pagination: PageMeta,
}

pub fn routes(state: AppState) -> Router<AppState> {
    let create = Router::new()
        .route("/api/bookings", post(create_booking))
        .route_layer(from_fn_with_state(state.clone(), user_auth_middleware));

    let staff = Router::new()
        .route("/api/bookings", get(list_bookings))
        .route("/api/bookings/{id}", get(get_booking))
        .route("/api/bookings/{id}/status", put(update_status))
        .route("/api/bookings/{id}/payment", put(update_payment))
        .route_layer(from_fn_with_state(state.clone(), staff_auth_middleware));

    let admin = Router::new()
        .route("/api/bookings/{id}", delete(delete_booking))
        .route_layer(from_fn_with_state(state, admin_auth_middleware));

    create.merge(staff).merge(admin)
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/bookings
/// Create a booking: validates the payload, claims a capacity slot on the
/// package, and persists with server-computed pricing.
async fn create_booking(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateBookingRequest>,
) -> Result<Json<ApiResponse<BookingView>>, AppError> {
    // 1. Declarative field checks plus enum parsing, reported together
    let mut violations = match validation::check(&req) {
        Ok(()) => Vec::new(),
        Err(AppError::ValidationError(v)) => v,
        Err(e) => return Err(e),
    };

    let service_type = match req.service_type.parse::<ServiceType>() {
        Ok(st) => Some(st),
        Err(e) => {
            violations.push(FieldViolation::new("serviceType", e.to_string()));
            None
        }
    };
    let room_type = match req.travel_details.room_type.parse::<RoomType>() {
        Ok(rt) => Some(rt),
        Err(e) => {
            violations.push(FieldViolation::new("travelDetails.roomType", e.to_string()));
            None
        }
    };
    let payment_method = match req.payment_method.as_deref() {
        Some(raw) => match raw.parse::<PaymentMethod>() {
            Ok(m) => Some(m),
            Err(e) => {
                violations.push(FieldViolation::new("paymentMethod", e.to_string()));
                None
            }
        },
        None => None,
    };

    let (service_type, room_type) = match (service_type, room_type) {
        (Some(st), Some(rt)) if violations.is_empty() => (st, rt),
        _ => return Err(AppError::ValidationError(violations)),
    };

    let user_id = Uuid::parse_str(&claims.sub)
        .map_err(|_| AppError::AuthenticationError("Invalid token subject".to_string()))?;

    // 2. Resolve the package and cross-check the service type
    let package = state
        .packages
        .get_package(req.package_id)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?
        .filter(|p| p.is_active)
        .ok_or_else(|| AppError::NotFoundError("Package not found".to_string()))?;

    if package.service_type != service_type {
        return Err(AppError::invalid_field(
            "serviceType",
            format!(
                "Service type does not match the package ({})",
                package.service_type
            ),
        ));
    }

    // 3. Claim a capacity slot; a conditional update, so a full or closed
    // package rejects here without touching anything else
    let now = Utc::now();
    let reserved = state
        .packages
        .reserve_slot(package.id, now)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;
    if !reserved {
        return Err(AppError::ConflictError(
            "Package is fully booked or not currently open for booking".to_string(),
        ));
    }

    // 4. Server-side pricing from the package record
    let additional_services: Vec<AdditionalService> = req
        .additional_services
        .iter()
        .map(|s| AdditionalService {
            service: s.service.clone(),
            price: s.price,
            quantity: s.quantity,
        })
        .collect();
    let pricing = quote(
        &package,
        req.travel_details.number_of_travelers,
        &additional_services,
    );

    let new_booking = NewBooking {
        user_id,
        package_id: package.id,
        service_type,
        personal_info: PersonalInfo {
            first_name: req.personal_info.first_name,
            last_name: req.personal_info.last_name,
            email: Masked(req.personal_info.email),
            phone: Masked(req.personal_info.phone),
        },
        travel_details: TravelDetails {
            departure_city: req.travel_details.departure_city,
            preferred_departure_date: req.travel_details.preferred_departure_date,
            return_date: req.travel_details.return_date,
            number_of_travelers: req.travel_details.number_of_travelers,
            room_type,
            special_requests: req.travel_details.special_requests,
        },
        additional_services,
        pricing,
        payment_method,
        notes: req.notes,
    };

    // 5. Persist; give the slot back if the insert itself fails
    let view = match state.bookings.create_booking(&new_booking).await {
        Ok(view) => view,
        Err(e) => {
            let _ = state.packages.release_slot(package.id).await;
            return Err(AppError::InternalServerError(e.to_string()));
        }
    };

    info!(booking = %view.booking.booking_id, package_id = %package.id, "booking created");

    Ok(ApiResponse::with_message(
        "Booking created successfully",
        view,
    ))
}

/// GET /api/bookings
/// List bookings with filters and pagination.
async fn list_bookings(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<ListBookingsQuery>,
) -> Result<Json<ApiResponse<BookingListResponse>>, AppError> {
    if !has_permission(&claims, PERM_MANAGE_BOOKINGS) {
        return Err(AppError::AuthorizationError(
            "Missing booking management permission".to_string(),
        ));
    }

    let status = query
        .status
        .as_deref()
        .map(|s| s.parse::<BookingStatus>())
        .transpose()
        .map_err(|e| AppError::invalid_field("status", e.to_string()))?;
    let service_type = query
        .service_type
        .as_deref()
        .map(|s| s.parse::<ServiceType>())
        .transpose()
        .map_err(|e| AppError::invalid_field("serviceType", e.to_string()))?;

    let filter = BookingFilter {
        status,
        service_type,
        user_id: None,
    };
    let page = PageRequest::new(query.page, query.limit);

    let (bookings, total) = state
        .bookings
        .list_bookings(&filter, page)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    Ok(ApiResponse::success(BookingListResponse {
        bookings,
        pagination: PageMeta::new(page, total),
    }))
}

/// GET /api/bookings/{id}
async fn get_booking(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<BookingView>>, AppError> {
    let view = state
        .bookings
        .get_booking(id)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?
        .ok_or_else(|| AppError::NotFoundError("Booking not found".to_string()))?;

    Ok(ApiResponse::success(view))
}

/// PUT /api/bookings/{id}/status
/// Transition the fulfillment status through the lifecycle table.
async fn update_status(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<ApiResponse<BookingView>>, AppError> {
    if !has_permission(&claims, PERM_MANAGE_BOOKINGS) {
        return Err(AppError::AuthorizationError(
            "Missing booking management permission".to_string(),
        ));
    }

    // 1. The requested value must be a known status at all
    let next = req
        .status
        .parse::<BookingStatus>()
        .map_err(|e| AppError::invalid_field("status", e.to_string()))?;

    // 2. And reachable from the current one
    let current_view = state
        .bookings
        .get_booking(id)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?
        .ok_or_else(|| AppError::NotFoundError("Booking not found".to_string()))?;
    let current = current_view.booking.status;

    check_status_transition(current, next)
        .map_err(|e| AppError::invalid_field("status", e.to_string()))?;

    // 3. Guarded write: only applies if nobody else moved the booking since
    let updated = state
        .bookings
        .update_booking_status(id, current, next, req.notes.as_deref())
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?
        .ok_or_else(|| {
            AppError::ConflictError("Booking was modified concurrently, retry".to_string())
        })?;

    // 4. Cancelling a live booking frees its capacity slot
    if current.holds_slot() && next == BookingStatus::Cancelled {
        state
            .packages
            .release_slot(updated.booking.package_id)
            .await
            .map_err(|e| AppError::InternalServerError(e.to_string()))?;
    }

    info!(booking = %updated.booking.booking_id, from = %current, to = %next, "status updated");

    Ok(ApiResponse::with_message("Booking status updated", updated))
}

/// PUT /api/bookings/{id}/payment
/// Transition the payment status; optionally records the method used.
async fn update_payment(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdatePaymentRequest>,
) -> Result<Json<ApiResponse<BookingView>>, AppError> {
    if !has_permission(&claims, PERM_MANAGE_BOOKINGS) {
        return Err(AppError::AuthorizationError(
            "Missing booking management permission".to_string(),
        ));
    }

    let next = req
        .payment_status
        .parse::<PaymentStatus>()
        .map_err(|e| AppError::invalid_field("paymentStatus", e.to_string()))?;
    let method = req
        .payment_method
        .as_deref()
        .map(|m| m.parse::<PaymentMethod>())
        .transpose()
        .map_err(|e| AppError::invalid_field("paymentMethod", e.to_string()))?;

    let current_view = state
        .bookings
        .get_booking(id)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?
        .ok_or_else(|| AppError::NotFoundError("Booking not found".to_string()))?;
    let current = current_view.booking.payment_status;

    check_payment_transition(current, next)
        .map_err(|e| AppError::invalid_field("paymentStatus", e.to_string()))?;

    let updated = state
        .bookings
        .update_payment_status(id, current, next, method)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?
        .ok_or_else(|| {
            AppError::ConflictError("Booking was modified concurrently, retry".to_string())
        })?;

    info!(booking = %updated.booking.booking_id, from = %current, to = %next, "payment status updated");

    Ok(ApiResponse::with_message(
        "Payment status updated",
        updated,
    ))
}

/// DELETE /api/bookings/{id}
/// Hard delete; a live booking's capacity slot goes back to the package.
async fn delete_booking(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let view = state
        .bookings
        .get_booking(id)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?
        .ok_or_else(|| AppError::NotFoundError("Booking not found".to_string()))?;

    let deleted = state
        .bookings
        .delete_booking(id)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;
    if !deleted {
        return Err(AppError::NotFoundError("Booking not found".to_string()));
    }

    if view.booking.status.holds_slot() {
        state
            .packages
            .release_slot(view.booking.package_id)
            .await
            .map_err(|e| AppError::InternalServerError(e.to_string()))?;
    }

    info!(booking = %view.booking.booking_id, "booking deleted");
    Ok(ApiResponse::message_only("Booking deleted successfully"))
}
