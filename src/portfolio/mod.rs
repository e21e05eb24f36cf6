mod agency;
pub mod domain;
mod owner;
mod property;
mod registry;
pub mod views;

pub use agency::{
    Agency, CommissionSchedule, PriceSuggestion, GARAGE_BONUS, PRICE_PER_AREA_UNIT,
    RENTAL_COMMISSION_RATE, SALE_COMMISSION_RATE,
};
pub use domain::{OwnerId, PropertyId, PropertyStatus, ValidationError, ValidationKind};
pub use owner::Owner;
pub use property::{
    Apartment, CountryHouse, Features, FeaturesMut, House, Property, PropertyKind, PropertySpec,
    Venue,
};
pub use registry::Registry;
pub use views::{OwnerView, PortfolioSummary, PropertyView, StatusCount};
