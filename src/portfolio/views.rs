use serde::Serialize;

use super::domain::{OwnerId, PropertyId, PropertyStatus};
use super::owner::Owner;
use super::property::{Features, Property, PropertyKind};

#[derive(Debug, Clone, Serialize)]
pub struct PropertyView {
    pub id: PropertyId,
    pub kind_label: &'static str,
    pub address: String,
    pub covered_area: f64,
    pub rooms: u32,
    pub status: PropertyStatus,
    pub status_label: &'static str,
    pub has_garage: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant: Option<String>,
    pub price: f64,
    pub owner_id: OwnerId,
    pub owner_name: String,
    pub features: PropertyKind,
}

impl PropertyView {
    pub fn new(property: &Property, owner: &Owner) -> Self {
        Self {
            id: property.id(),
            kind_label: property.kind().label(),
            address: property.address().to_string(),
            covered_area: property.covered_area(),
            rooms: property.rooms(),
            status: property.status(),
            status_label: property.status().label(),
            has_garage: property.has_garage(),
            tenant: property.tenant().map(str::to_string),
            price: property.price(),
            owner_id: owner.id(),
            owner_name: owner.full_name().to_string(),
            features: property.kind().clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OwnerView {
    pub id: OwnerId,
    pub full_name: String,
    pub national_id: u64,
    pub properties: Vec<PropertyId>,
}

impl From<&Owner> for OwnerView {
    fn from(owner: &Owner) -> Self {
        Self {
            id: owner.id(),
            full_name: owner.full_name().to_string(),
            national_id: owner.national_id(),
            properties: owner.properties().to_vec(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusCount {
    pub status: PropertyStatus,
    pub status_label: &'static str,
    pub count: usize,
}

/// Serializable snapshot of an agency's portfolio.
#[derive(Debug, Clone, Serialize)]
pub struct PortfolioSummary {
    pub managed: usize,
    pub earnings: f64,
    pub status_counts: Vec<StatusCount>,
    pub properties: Vec<PropertyView>,
}
