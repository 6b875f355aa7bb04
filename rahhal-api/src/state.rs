use rahhal_core::repository::{
    AnalyticsRepository, BookingRepository, PackageRepository, UserRepository,
};
use std::sync::Arc;

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
    pub access_expiration: u64,
    pub refresh_expiration: u64,
    pub max_login_attempts: i32,
    pub lockout_minutes: i64,
}

#[derive(Clone)]
pub struct AppState {
    pub packages: Arc<dyn PackageRepository>,
    pub bookings: Arc<dyn BookingRepository>,
    pub users: Arc<dyn UserRepository>,
    pub analytics: Arc<dyn AnalyticsRepository>,
    pub auth: AuthConfig,
}
