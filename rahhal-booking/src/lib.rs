pub mod lifecycle;
pub mod models;
pub mod pricing;
pub mod reference;

pub use lifecycle::LifecycleError;
pub use models::{
    AdditionalService, Booking, BookingStatus, BookingView, PaymentMethod, PaymentStatus,
    PersonalInfo, Pricing, RoomType, TravelDetails,
};
pub use pricing::quote;
pub use reference::generate_reference;
