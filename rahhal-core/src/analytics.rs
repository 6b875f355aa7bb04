use chrono::{DateTime, Months, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Trailing window over booking creation time for dashboard aggregates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrailingPeriod {
    OneMonth,
    ThreeMonths,
    SixMonths,
    OneYear,
}

impl TrailingPeriod {
    /// Parse the query keyword; anything unrecognized falls back to six
    /// months rather than erroring.
    pub fn parse(keyword: &str) -> Self {
        match keyword {
            "1month" => TrailingPeriod::OneMonth,
            "3months" => TrailingPeriod::ThreeMonths,
            "6months" => TrailingPeriod::SixMonths,
            "1year" => TrailingPeriod::OneYear,
            _ => TrailingPeriod::SixMonths,
        }
    }

    pub fn months(&self) -> u32 {
        match self {
            TrailingPeriod::OneMonth => 1,
            TrailingPeriod::ThreeMonths => 3,
            TrailingPeriod::SixMonths => 6,
            TrailingPeriod::OneYear => 12,
        }
    }

    pub fn window_start(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now.checked_sub_months(Months::new(self.months()))
            .unwrap_or(now)
    }
}

impl Default for TrailingPeriod {
    fn default() -> Self {
        TrailingPeriod::SixMonths
    }
}

/// Booking count per status value inside the window.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusSlice {
    pub status: String,
    pub count: u64,
}

/// Booking count per service type inside the window.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceSlice {
    pub service_type: String,
    pub count: u64,
}

/// Revenue and booking count for one calendar month, confirmed-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyRevenue {
    pub year: i32,
    pub month: u32,
    pub revenue: f64,
    pub bookings: u64,
}

/// Window aggregates for the analytics overview endpoint. Revenue counts
/// confirmed bookings only.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverviewStats {
    pub total_bookings: u64,
    pub total_revenue: f64,
    pub status_distribution: Vec<StatusSlice>,
    pub service_distribution: Vec<ServiceSlice>,
    pub monthly_trend: Vec<MonthlyRevenue>,
}

/// Top packages by booking count inside the window.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PopularPackage {
    pub package_id: Uuid,
    pub name: String,
    pub service_type: String,
    pub bookings: u64,
    pub revenue: f64,
}

/// Combined counters for the admin dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_users: u64,
    pub total_packages: u64,
    pub total_bookings: u64,
    pub total_revenue: f64,
    pub pending_bookings: u64,
}
