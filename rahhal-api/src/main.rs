use rahhal_api::{
    app,
    state::{AppState, AuthConfig},
};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rahhal_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = rahhal_store::app_config::Config::load().expect("Failed to load config");
    tracing::info!("Starting Rahhal API on port {}", config.server.port);

    // Postgres Connection
    let db = rahhal_store::DbClient::new(&config.database.url)
        .await
        .expect("Failed to connect to Postgres");
    db.migrate().await.expect("Failed to run migrations");

    let app_state = AppState {
        packages: Arc::new(rahhal_store::StorePackageRepository::new(db.pool.clone())),
        bookings: Arc::new(rahhal_store::StoreBookingRepository::new(db.pool.clone())),
        users: Arc::new(rahhal_store::StoreUserRepository::new(db.pool.clone())),
        analytics: Arc::new(rahhal_store::StoreAnalyticsRepository::new(db.pool.clone())),
        auth: AuthConfig {
            secret: config.auth.jwt_secret.clone(),
            access_expiration: config.auth.access_token_seconds,
            refresh_expiration: config.auth.refresh_token_seconds,
            max_login_attempts: config.auth.max_login_attempts,
            lockout_minutes: config.auth.lockout_minutes,
        },
    };

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
