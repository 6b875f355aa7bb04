pub mod package;

pub use package::{
    Availability, Coordinates, Currency, Destination, ItineraryDay, Package, PriceBreakdown,
    Requirements, ServiceType,
};
