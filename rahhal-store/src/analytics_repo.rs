use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rahhal_booking::models::BookingStatus;
use rahhal_core::analytics::{
    DashboardStats, MonthlyRevenue, OverviewStats, PopularPackage, ServiceSlice, StatusSlice,
};
use rahhal_core::repository::{AnalyticsRepository, RepoResult};
use sqlx::PgPool;
use uuid::Uuid;

/// Read-only dashboard aggregations, recomputed from the booking rows on
/// every call. Revenue figures count confirmed bookings only.
pub struct StoreAnalyticsRepository {
    pool: PgPool,
}

impl StoreAnalyticsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct CountRow {
    key: String,
    count: i64,
}

#[derive(sqlx::FromRow)]
struct MonthRow {
    year: i32,
    month: i32,
    revenue: f64,
    bookings: i64,
}

#[derive(sqlx::FromRow)]
struct PopularRow {
    package_id: Uuid,
    name: String,
    service_type: String,
    bookings: i64,
    revenue: f64,
}

#[async_trait]
impl AnalyticsRepository for StoreAnalyticsRepository {
    async fn overview(&self, window_start: DateTime<Utc>) -> RepoResult<OverviewStats> {
        let total_bookings: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM bookings WHERE created_at >= $1")
                .bind(window_start)
                .fetch_one(&self.pool)
                .await?;

        let total_revenue: f64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(total_amount), 0) FROM bookings \
             WHERE status = $1 AND created_at >= $2",
        )
        .bind(BookingStatus::Confirmed.as_str())
        .bind(window_start)
        .fetch_one(&self.pool)
        .await?;

        let status_rows: Vec<CountRow> = sqlx::query_as(
            "SELECT status AS key, COUNT(*) AS count FROM bookings \
             WHERE created_at >= $1 GROUP BY status",
        )
        .bind(window_start)
        .fetch_all(&self.pool)
        .await?;

        let service_rows: Vec<CountRow> = sqlx::query_as(
            "SELECT service_type AS key, COUNT(*) AS count FROM bookings \
             WHERE created_at >= $1 GROUP BY service_type",
        )
        .bind(window_start)
        .fetch_all(&self.pool)
        .await?;

        let month_rows: Vec<MonthRow> = sqlx::query_as(
            "SELECT CAST(EXTRACT(YEAR FROM created_at) AS INT) AS year, \
             CAST(EXTRACT(MONTH FROM created_at) AS INT) AS month, \
             COALESCE(SUM(total_amount), 0) AS revenue, COUNT(*) AS bookings \
             FROM bookings WHERE status = $1 AND created_at >= $2 \
             GROUP BY 1, 2 ORDER BY 1, 2",
        )
        .bind(BookingStatus::Confirmed.as_str())
        .bind(window_start)
        .fetch_all(&self.pool)
        .await?;

        Ok(OverviewStats {
            total_bookings: total_bookings.max(0) as u64,
            total_revenue,
            status_distribution: status_rows
                .into_iter()
                .map(|r| StatusSlice {
                    status: r.key,
                    count: r.count.max(0) as u64,
                })
                .collect(),
            service_distribution: service_rows
                .into_iter()
                .map(|r| ServiceSlice {
                    service_type: r.key,
                    count: r.count.max(0) as u64,
                })
                .collect(),
            monthly_trend: month_rows
                .into_iter()
                .map(|r| MonthlyRevenue {
                    year: r.year,
                    month: r.month.max(1) as u32,
                    revenue: r.revenue,
                    bookings: r.bookings.max(0) as u64,
                })
                .collect(),
        })
    }

    async fn popular_packages(
        &self,
        window_start: DateTime<Utc>,
        limit: i64,
    ) -> RepoResult<Vec<PopularPackage>> {
        let rows: Vec<PopularRow> = sqlx::query_as(
            "SELECT p.id AS package_id, p.name, p.service_type, \
             COUNT(b.id) AS bookings, COALESCE(SUM(b.total_amount), 0) AS revenue \
             FROM bookings b JOIN packages p ON p.id = b.package_id \
             WHERE b.created_at >= $1 \
             GROUP BY p.id, p.name, p.service_type \
             ORDER BY bookings DESC, revenue DESC LIMIT $2",
        )
        .bind(window_start)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| PopularPackage {
                package_id: r.package_id,
                name: r.name,
                service_type: r.service_type,
                bookings: r.bookings.max(0) as u64,
                revenue: r.revenue,
            })
            .collect())
    }

    async fn dashboard(&self) -> RepoResult<DashboardStats> {
        let total_users: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        let total_packages: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM packages")
            .fetch_one(&self.pool)
            .await?;
        let total_bookings: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM bookings")
            .fetch_one(&self.pool)
            .await?;
        let pending_bookings: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM bookings WHERE status = $1")
                .bind(BookingStatus::Pending.as_str())
                .fetch_one(&self.pool)
                .await?;
        let total_revenue: f64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(total_amount), 0) FROM bookings WHERE status = $1",
        )
        .bind(BookingStatus::Confirmed.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(DashboardStats {
            total_users: total_users.max(0) as u64,
            total_packages: total_packages.max(0) as u64,
            total_bookings: total_bookings.max(0) as u64,
            total_revenue,
            pending_bookings: pending_bookings.max(0) as u64,
        })
    }
}
