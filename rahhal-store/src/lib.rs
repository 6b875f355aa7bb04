pub mod analytics_repo;
pub mod app_config;
pub mod booking_repo;
pub mod database;
pub mod package_repo;
pub mod user_repo;

pub use analytics_repo::StoreAnalyticsRepository;
pub use booking_repo::StoreBookingRepository;
pub use database::DbClient;
pub use package_repo::StorePackageRepository;
pub use user_repo::StoreUserRepository;
