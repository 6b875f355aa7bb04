use axum::{
    extract::{Path, Query, State},
    middleware::from_fn_with_state,
    routing::{get, post, put},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use rahhal_catalog::{
    Coordinates, Currency, Destination, ItineraryDay, Package, PriceBreakdown, Requirements,
    ServiceType,
};
use rahhal_core::repository::{PackageDraft, PackageFilter};
use rahhal_shared::{PageMeta, PageRequest};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, FieldViolation};
use crate::middleware::auth::{
    admin_auth_middleware, has_permission, Claims, PERM_MANAGE_PACKAGES,
};
use crate::response::ApiResponse;
use crate::state::AppState;
use crate::validation;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPackagesQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub service_type: Option<String>,
    pub is_active: Option<bool>,
    pub featured: Option<bool>,
    pub search: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityRequest {
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    #[validate(range(min = 1, message = "Capacity must allow at least one booking"))]
    pub max_bookings: u32,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PackageRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub service_type: String,
    #[validate(range(min = 0.0, message = "Price must not be negative"))]
    pub price: f64,
    pub currency: String,
    #[validate(range(min = 1, message = "Duration must be at least one day"))]
    pub duration: u32,
    #[validate(range(min = 1, message = "At least one traveler must be allowed"))]
    pub max_travelers: u32,
    #[serde(default)]
    pub inclusions: Vec<String>,
    #[serde(default)]
    pub exclusions: Vec<String>,
    #[serde(default)]
    pub itinerary: Vec<ItineraryDay>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub features: Vec<String>,
    #[validate(nested)]
    pub destination: DestinationRequest,
    #[serde(default)]
    pub requirements: Requirements,
    #[validate(nested)]
    pub availability: AvailabilityRequest,
    #[serde(default)]
    pub price_breakdown: PriceBreakdown,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default)]
    pub tags: Vec<String>,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DestinationRequest {
    #[validate(length(min = 1, message = "Country is required"))]
    pub country: String,
    #[validate(length(min = 1, message = "City is required"))]
    pub city: String,
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetStatusRequest {
    pub is_active: bool,
}

/// Package plus its derived availability fields.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageResponse {
    #[serde(flatten)]
    pub package: Package,
    pub is_available: bool,
    pub remaining_spots: u32,
}

impl PackageResponse {
    fn from_package(package: Package, now: DateTime<Utc>) -> Self {
        let is_available = package.is_available(now);
        let remaining_spots = package.remaining_spots();
        Self {
            package,
            is_available,
            remaining_spots,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageListResponse {
    pub packages: Vec<PackageResponse>,
    pub pagination: PageMeta,
}

pub fn routes(state: AppState) -> Router<AppState> {
    let admin = Router::new()
        .route("/api/packages", post(create_package))
        .route(
            "/api/packages/{id}",
            put(update_package).delete(delete_package),
        )
        .route("/api/packages/{id}/status", put(set_package_status))
        .route_layer(from_fn_with_state(state, admin_auth_middleware));

    Router::new()
        .route("/api/packages", get(list_packages))
        .route("/api/packages/{id}", get(get_package))
        .merge(admin)
}

// ============================================================================
// Shared Parsing
// ============================================================================

impl PackageRequest {
    /// Field checks plus enum parsing, reported together.
    fn into_draft(self) -> Result<PackageDraft, AppError> {
        let mut violations = match validation::check(&self) {
            Ok(()) => Vec::new(),
            Err(AppError::ValidationError(v)) => v,
            Err(e) => return Err(e),
        };

        let service_type = match self.service_type.parse::<ServiceType>() {
            Ok(st) => Some(st),
            Err(e) => {
                violations.push(FieldViolation::new("serviceType", e.to_string()));
                None
            }
        };
        let currency = match self.currency.parse::<Currency>() {
            Ok(c) => Some(c),
            Err(e) => {
                violations.push(FieldViolation::new("currency", e.to_string()));
                None
            }
        };
        if self.availability.end_date <= self.availability.start_date {
            violations.push(FieldViolation::new(
                "availability.endDate",
                "End date must be after the start date",
            ));
        }

        let (service_type, currency) = match (service_type, currency) {
            (Some(st), Some(c)) if violations.is_empty() => (st, c),
            _ => return Err(AppError::ValidationError(violations)),
        };

        Ok(PackageDraft {
            name: self.name,
            description: self.description,
            service_type,
            price: self.price,
            currency,
            duration: self.duration,
            max_travelers: self.max_travelers,
            inclusions: self.inclusions,
            exclusions: self.exclusions,
            itinerary: self.itinerary,
            images: self.images,
            features: self.features,
            destination: Destination {
                country: self.destination.country,
                city: self.destination.city,
                coordinates: self.destination.coordinates,
            },
            requirements: self.requirements,
            start_date: self.availability.start_date,
            end_date: self.availability.end_date,
            max_bookings: self.availability.max_bookings,
            price_breakdown: self.price_breakdown,
            is_active: self.is_active,
            is_featured: self.is_featured,
            tags: self.tags,
        })
    }
}

fn parse_filter(query: &ListPackagesQuery) -> Result<PackageFilter, AppError> {
    let service_type = query
        .service_type
        .as_deref()
        .map(|s| s.parse::<ServiceType>())
        .transpose()
        .map_err(|e| AppError::invalid_field("serviceType", e.to_string()))?;

    Ok(PackageFilter {
        service_type,
        // The public catalog shows active packages unless asked otherwise
        is_active: Some(query.is_active.unwrap_or(true)),
        is_featured: query.featured,
        search: query.search.clone(),
        min_price: query.min_price,
        max_price: query.max_price,
    })
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/packages
/// List, filter, and paginate the catalog.
async fn list_packages(
    State(state): State<AppState>,
    Query(query): Query<ListPackagesQuery>,
) -> Result<Json<ApiResponse<PackageListResponse>>, AppError> {
    let filter = parse_filter(&query)?;
    let page = PageRequest::new(query.page, query.limit);

    let (packages, total) = state
        .packages
        .list_packages(&filter, page)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    let now = Utc::now();
    Ok(ApiResponse::success(PackageListResponse {
        packages: packages
            .into_iter()
            .map(|p| PackageResponse::from_package(p, now))
            .collect(),
        pagination: PageMeta::new(page, total),
    }))
}

/// GET /api/packages/{id}
/// Fetch one active package.
async fn get_package(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<PackageResponse>>, AppError> {
    let package = state
        .packages
        .get_package(id)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?
        .filter(|p| p.is_active)
        .ok_or_else(|| AppError::NotFoundError("Package not found".to_string()))?;

    Ok(ApiResponse::success(PackageResponse::from_package(
        package,
        Utc::now(),
    )))
}

/// POST /api/packages
async fn create_package(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<PackageRequest>,
) -> Result<Json<ApiResponse<PackageResponse>>, AppError> {
    if !has_permission(&claims, PERM_MANAGE_PACKAGES) {
        return Err(AppError::AuthorizationError(
            "Missing package management permission".to_string(),
        ));
    }

    let draft = req.into_draft()?;
    let package = state
        .packages
        .create_package(&draft)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    info!(package_id = %package.id, "package created");

    Ok(ApiResponse::with_message(
        "Package created successfully",
        PackageResponse::from_package(package, Utc::now()),
    ))
}

/// PUT /api/packages/{id}
async fn update_package(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(req): Json<PackageRequest>,
) -> Result<Json<ApiResponse<PackageResponse>>, AppError> {
    if !has_permission(&claims, PERM_MANAGE_PACKAGES) {
        return Err(AppError::AuthorizationError(
            "Missing package management permission".to_string(),
        ));
    }

    let draft = req.into_draft()?;
    let package = state
        .packages
        .update_package(id, &draft)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?
        .ok_or_else(|| AppError::NotFoundError("Package not found".to_string()))?;

    Ok(ApiResponse::with_message(
        "Package updated successfully",
        PackageResponse::from_package(package, Utc::now()),
    ))
}

/// PUT /api/packages/{id}/status
/// Toggle a package's soft-retire flag.
async fn set_package_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<SetStatusRequest>,
) -> Result<Json<ApiResponse<PackageResponse>>, AppError> {
    let package = state
        .packages
        .set_package_active(id, req.is_active)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?
        .ok_or_else(|| AppError::NotFoundError("Package not found".to_string()))?;

    info!(package_id = %id, is_active = req.is_active, "package status changed");

    Ok(ApiResponse::with_message(
        "Package status updated",
        PackageResponse::from_package(package, Utc::now()),
    ))
}

/// DELETE /api/packages/{id}
async fn delete_package(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let deleted = state
        .packages
        .delete_package(id)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    if !deleted {
        return Err(AppError::NotFoundError("Package not found".to_string()));
    }

    info!(package_id = %id, "package deleted");
    Ok(ApiResponse::message_only("Package deleted successfully"))
}
