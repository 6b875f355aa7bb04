use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rahhal_booking::models::{
    AdditionalService, BookingStatus, BookingView, PaymentMethod, PaymentStatus, PersonalInfo,
    Pricing, TravelDetails,
};
use rahhal_catalog::{
    Currency, Destination, ItineraryDay, Package, PriceBreakdown, Requirements, ServiceType,
};
use rahhal_shared::PageRequest;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::analytics::{DashboardStats, OverviewStats, PopularPackage};
use crate::user::User;

pub type RepoResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Write model for package create/update. Identity, timestamps, and the
/// live booking counter are owned by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageDraft {
    pub name: String,
    pub description: String,
    pub service_type: ServiceType,
    pub price: f64,
    pub currency: Currency,
    pub duration: u32,
    pub max_travelers: u32,
    pub inclusions: Vec<String>,
    pub exclusions: Vec<String>,
    pub itinerary: Vec<ItineraryDay>,
    pub images: Vec<String>,
    pub features: Vec<String>,
    pub destination: Destination,
    pub requirements: Requirements,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub max_bookings: u32,
    pub price_breakdown: PriceBreakdown,
    pub is_active: bool,
    pub is_featured: bool,
    pub tags: Vec<String>,
}

/// Equality/search filters for package listings.
#[derive(Debug, Clone, Default)]
pub struct PackageFilter {
    pub service_type: Option<ServiceType>,
    pub is_active: Option<bool>,
    pub is_featured: Option<bool>,
    /// Case-insensitive substring over name, description, and destination.
    pub search: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
}

/// Write model for booking creation. The store assigns the id, the booking
/// reference, and timestamps; pricing arrives already computed.
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub user_id: Uuid,
    pub package_id: Uuid,
    pub service_type: ServiceType,
    pub personal_info: PersonalInfo,
    pub travel_details: TravelDetails,
    pub additional_services: Vec<AdditionalService>,
    pub pricing: Pricing,
    pub payment_method: Option<PaymentMethod>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct BookingFilter {
    pub status: Option<BookingStatus>,
    pub service_type: Option<ServiceType>,
    pub user_id: Option<Uuid>,
}

/// Repository trait for package catalog access
#[async_trait]
pub trait PackageRepository: Send + Sync {
    async fn create_package(&self, draft: &PackageDraft) -> RepoResult<Package>;

    async fn get_package(&self, id: Uuid) -> RepoResult<Option<Package>>;

    async fn update_package(&self, id: Uuid, draft: &PackageDraft) -> RepoResult<Option<Package>>;

    async fn set_package_active(&self, id: Uuid, is_active: bool) -> RepoResult<Option<Package>>;

    async fn delete_package(&self, id: Uuid) -> RepoResult<bool>;

    /// Returns the page of packages plus the total match count.
    async fn list_packages(
        &self,
        filter: &PackageFilter,
        page: PageRequest,
    ) -> RepoResult<(Vec<Package>, u64)>;

    /// Atomically claim one booking slot: succeeds only while the package is
    /// active, inside its availability window, and under capacity.
    async fn reserve_slot(&self, id: Uuid, now: DateTime<Utc>) -> RepoResult<bool>;

    /// Return a previously claimed slot, flooring at zero.
    async fn release_slot(&self, id: Uuid) -> RepoResult<()>;
}

/// Repository trait for booking data access
#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Persist a new booking, assigning its reference. Reference collisions
    /// are retried internally against the uniqueness constraint.
    async fn create_booking(&self, new_booking: &NewBooking) -> RepoResult<BookingView>;

    async fn get_booking(&self, id: Uuid) -> RepoResult<Option<BookingView>>;

    async fn list_bookings(
        &self,
        filter: &BookingFilter,
        page: PageRequest,
    ) -> RepoResult<(Vec<BookingView>, u64)>;

    /// Guarded single-row update: applies only while the stored status still
    /// equals `expected`. Returns the updated view, or None when no row
    /// matched (missing id or a concurrent transition).
    async fn update_booking_status(
        &self,
        id: Uuid,
        expected: BookingStatus,
        next: BookingStatus,
        notes: Option<&str>,
    ) -> RepoResult<Option<BookingView>>;

    /// Same guard on the payment axis.
    async fn update_payment_status(
        &self,
        id: Uuid,
        expected: PaymentStatus,
        next: PaymentStatus,
        payment_method: Option<PaymentMethod>,
    ) -> RepoResult<Option<BookingView>>;

    async fn delete_booking(&self, id: Uuid) -> RepoResult<bool>;
}

/// Repository trait for account lookups backing login and ownership checks
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>>;

    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<User>>;

    async fn record_login_failure(
        &self,
        id: Uuid,
        attempts: i32,
        locked_until: Option<DateTime<Utc>>,
    ) -> RepoResult<()>;

    /// Reset the failure counter and lock window after a successful login.
    async fn record_login_success(&self, id: Uuid) -> RepoResult<()>;
}

/// Repository trait for the read-only dashboard aggregations. Everything is
/// recomputed from the booking rows on each call.
#[async_trait]
pub trait AnalyticsRepository: Send + Sync {
    async fn overview(&self, window_start: DateTime<Utc>) -> RepoResult<OverviewStats>;

    async fn popular_packages(
        &self,
        window_start: DateTime<Utc>,
        limit: i64,
    ) -> RepoResult<Vec<PopularPackage>>;

    async fn dashboard(&self) -> RepoResult<DashboardStats>;
}
