use rahhal_catalog::Package;

use crate::models::{AdditionalService, Pricing};

/// Compute the authoritative price card for a booking.
///
/// The server owns pricing: the base is the package price multiplied by the
/// traveler count, add-ons are summed at their catalog price times quantity,
/// and the currency is the package's. Caller-supplied totals are ignored.
pub fn quote(package: &Package, travelers: u32, services: &[AdditionalService]) -> Pricing {
    let base_price = package.price * travelers as f64;
    let additional_services_total: f64 = services
        .iter()
        .map(|s| s.price * s.quantity as f64)
        .sum();

    Pricing {
        base_price,
        additional_services_total,
        total_amount: base_price + additional_services_total,
        currency: package.currency,
    }
}
