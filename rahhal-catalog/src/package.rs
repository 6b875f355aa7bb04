use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Top-level product category
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum ServiceType {
    Hajj,
    Umrah,
    GlobalTourism,
}

impl ServiceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceType::Hajj => "hajj",
            ServiceType::Umrah => "umrah",
            ServiceType::GlobalTourism => "global-tourism",
        }
    }

    pub const ALL: [ServiceType; 3] = [
        ServiceType::Hajj,
        ServiceType::Umrah,
        ServiceType::GlobalTourism,
    ];
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServiceType {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hajj" => Ok(ServiceType::Hajj),
            "umrah" => Ok(ServiceType::Umrah),
            "global-tourism" => Ok(ServiceType::GlobalTourism),
            other => Err(CatalogError::UnknownServiceType(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Currency {
    #[serde(rename = "USD")]
    Usd,
    #[serde(rename = "SAR")]
    Sar,
    #[serde(rename = "EUR")]
    Eur,
    #[serde(rename = "GBP")]
    Gbp,
}

impl Currency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Sar => "SAR",
            Currency::Eur => "EUR",
            Currency::Gbp => "GBP",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Currency {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "USD" => Ok(Currency::Usd),
            "SAR" => Ok(Currency::Sar),
            "EUR" => Ok(Currency::Eur),
            "GBP" => Ok(Currency::Gbp),
            other => Err(CatalogError::UnknownCurrency(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Destination {
    pub country: String,
    pub city: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// One day of a package itinerary
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ItineraryDay {
    pub day: u32,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub activities: Vec<String>,
    #[serde(default)]
    pub meals: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accommodation: Option<String>,
}

/// Traveler eligibility requirements
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Requirements {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_age: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_age: Option<u32>,
    #[serde(default)]
    pub visa_required: bool,
    #[serde(default)]
    pub passport_required: bool,
    #[serde(default)]
    pub vaccination_required: bool,
}

/// Booking window and capacity for a departure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Availability {
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub max_bookings: u32,
    pub current_bookings: u32,
}

/// Published price components; the headline `price` stays authoritative
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PriceBreakdown {
    #[serde(default)]
    pub base_price: f64,
    #[serde(default)]
    pub taxes: f64,
    #[serde(default)]
    pub fees: f64,
    #[serde(default)]
    pub discount: f64,
}

/// A sellable travel itinerary with price, capacity, and schedule
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Package {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub service_type: ServiceType,
    pub price: f64,
    pub currency: Currency,
    pub duration: u32,
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
    pub destination: Destination,
    #[serde(default)]
    pub requirements: Requirements,
    pub availability: Availability,
    #[serde(default)]
    pub price_breakdown: PriceBreakdown,
    pub is_active: bool,
    pub is_featured: bool,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Package {
    /// A package is bookable while it is active, inside its availability
    /// window, and not sold out.
    pub fn is_available(&self, now: DateTime<Utc>) -> bool {
        self.is_active
            && now >= self.availability.start_date
            && now <= self.availability.end_date
            && self.availability.current_bookings < self.availability.max_bookings
    }

    pub fn remaining_spots(&self) -> u32 {
        self.availability
            .max_bookings
            .saturating_sub(self.availability.current_bookings)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Unknown service type: {0}")]
    UnknownServiceType(String),

    #[error("Unknown currency: {0}")]
    UnknownCurrency(String),

    #[error("Package not found: {0}")]
    NotFound(String),

    #[error("Package is not available: {0}")]
    NotAvailable(String),
}
