use chrono::{DateTime, Utc};
use rahhal_catalog::{Currency, ServiceType};
use rahhal_shared::Masked;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::lifecycle::LifecycleError;

/// Fulfillment state of a booking
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Completed => "completed",
        }
    }

    /// A pending or confirmed booking holds a capacity slot on its package.
    pub fn holds_slot(&self) -> bool {
        matches!(self, BookingStatus::Pending | BookingStatus::Confirmed)
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = LifecycleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(BookingStatus::Pending),
            "confirmed" => Ok(BookingStatus::Confirmed),
            "cancelled" => Ok(BookingStatus::Cancelled),
            "completed" => Ok(BookingStatus::Completed),
            other => Err(LifecycleError::UnknownStatus(other.to_string())),
        }
    }
}

/// Payment state, independent of fulfillment
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Refunded,
    Failed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Refunded => "refunded",
            PaymentStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = LifecycleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(PaymentStatus::Pending),
            "paid" => Ok(PaymentStatus::Paid),
            "refunded" => Ok(PaymentStatus::Refunded),
            "failed" => Ok(PaymentStatus::Failed),
            other => Err(LifecycleError::UnknownPaymentStatus(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum PaymentMethod {
    CreditCard,
    DebitCard,
    BankTransfer,
    Installments,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::CreditCard => "credit-card",
            PaymentMethod::DebitCard => "debit-card",
            PaymentMethod::BankTransfer => "bank-transfer",
            PaymentMethod::Installments => "installments",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = LifecycleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "credit-card" => Ok(PaymentMethod::CreditCard),
            "debit-card" => Ok(PaymentMethod::DebitCard),
            "bank-transfer" => Ok(PaymentMethod::BankTransfer),
            "installments" => Ok(PaymentMethod::Installments),
            other => Err(LifecycleError::UnknownPaymentMethod(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RoomType {
    Single,
    Double,
    Triple,
    Quad,
}

impl RoomType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoomType::Single => "single",
            RoomType::Double => "double",
            RoomType::Triple => "triple",
            RoomType::Quad => "quad",
        }
    }
}

impl FromStr for RoomType {
    type Err = LifecycleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "single" => Ok(RoomType::Single),
            "double" => Ok(RoomType::Double),
            "triple" => Ok(RoomType::Triple),
            "quad" => Ok(RoomType::Quad),
            other => Err(LifecycleError::UnknownRoomType(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PersonalInfo {
    pub first_name: String,
    pub last_name: String,
    pub email: Masked<String>,
    pub phone: Masked<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TravelDetails {
    pub departure_city: String,
    pub preferred_departure_date: DateTime<Utc>,
    pub return_date: DateTime<Utc>,
    pub number_of_travelers: u32,
    pub room_type: RoomType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special_requests: Option<String>,
}

impl TravelDetails {
    /// Trip length in whole days, rounded up.
    pub fn duration_days(&self) -> i64 {
        let span = (self.return_date - self.preferred_departure_date)
            .num_seconds()
            .abs();
        const DAY: i64 = 86_400;
        // span is non-negative (abs above), so this equals span.div_ceil(DAY)
        // without relying on the unstable `int_roundings` feature.
        (span + DAY - 1) / DAY
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AdditionalService {
    pub service: String,
    pub price: f64,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

fn default_quantity() -> u32 {
    1
}

/// Authoritative price card, computed server-side at creation time
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Pricing {
    pub base_price: f64,
    pub additional_services_total: f64,
    pub total_amount: f64,
    pub currency: Currency,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TravelDocument {
    pub name: String,
    pub url: String,
    #[serde(rename = "type")]
    pub doc_type: String,
    pub uploaded_at: DateTime<Utc>,
}

/// A single customer's reservation against one travel package
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: Uuid,
    /// Human-readable reference, unique and immutable once assigned
    pub booking_id: String,
    pub user_id: Uuid,
    pub package_id: Uuid,
    pub service_type: ServiceType,
    pub personal_info: PersonalInfo,
    pub travel_details: TravelDetails,
    #[serde(default)]
    pub additional_services: Vec<AdditionalService>,
    pub pricing: Pricing,
    pub status: BookingStatus,
    pub payment_status: PaymentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<PaymentMethod>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    pub documents: Vec<TravelDocument>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    pub fn duration_days(&self) -> i64 {
        self.travel_details.duration_days()
    }
}

/// Owning-user summary joined onto booking reads
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: Uuid,
    pub name: String,
    pub email: Masked<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<Masked<String>>,
}

/// Package summary joined onto booking reads
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageSummary {
    pub id: Uuid,
    pub name: String,
    pub price: f64,
    pub service_type: ServiceType,
    pub description: String,
}

/// Booking with its joined user/package summaries, the read shape returned
/// by every fetch and listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingView {
    #[serde(flatten)]
    pub booking: Booking,
    /// Trip length in whole days, derived from the travel dates
    #[serde(default)]
    pub duration: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package: Option<PackageSummary>,
}

impl BookingView {
    pub fn new(
        booking: Booking,
        user: Option<UserSummary>,
        package: Option<PackageSummary>,
    ) -> Self {
        let duration = booking.duration_days();
        Self {
            booking,
            duration,
            user,
            package,
        }
    }
}
