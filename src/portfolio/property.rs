use serde::Serialize;

use super::domain::{
    ensure_non_negative, ensure_positive, ensure_text, OwnerId, PropertyId, PropertyStatus,
    ValidationError,
};
use super::owner::Owner;

const SEPARATOR: &str = "==========";

/// Variant-specific behavior shared by every property kind.
pub trait Features {
    /// Human-readable kind name used in descriptions.
    fn label(&self) -> &'static str;

    /// Kinds without rooms keep `rooms` pinned at zero.
    fn fixed_rooms(&self) -> bool {
        false
    }

    fn validate(&self) -> Result<(), ValidationError> {
        Ok(())
    }

    /// Lines appended to the base description.
    fn feature_lines(&self) -> Vec<String>;
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct House {
    yard_area: f64,
}

impl House {
    pub fn new(yard_area: f64) -> Self {
        Self { yard_area }
    }

    pub fn yard_area(&self) -> f64 {
        self.yard_area
    }

    pub fn set_yard_area(&mut self, yard_area: f64) -> Result<(), ValidationError> {
        ensure_non_negative("yard_area", yard_area)?;
        self.yard_area = yard_area;
        Ok(())
    }
}

impl Features for House {
    fn label(&self) -> &'static str {
        "House"
    }

    fn validate(&self) -> Result<(), ValidationError> {
        ensure_non_negative("yard_area", self.yard_area)
    }

    fn feature_lines(&self) -> Vec<String> {
        vec![format!("Yard area: {}", self.yard_area)]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Apartment {
    common_expenses: f64,
    unit_number: u32,
}

impl Apartment {
    pub fn new(common_expenses: f64, unit_number: u32) -> Self {
        Self {
            common_expenses,
            unit_number,
        }
    }

    pub fn common_expenses(&self) -> f64 {
        self.common_expenses
    }

    pub fn unit_number(&self) -> u32 {
        self.unit_number
    }

    pub fn set_common_expenses(&mut self, common_expenses: f64) -> Result<(), ValidationError> {
        ensure_non_negative("common_expenses", common_expenses)?;
        self.common_expenses = common_expenses;
        Ok(())
    }

    pub fn set_unit_number(&mut self, unit_number: u32) -> Result<(), ValidationError> {
        ensure_unit_number(unit_number)?;
        self.unit_number = unit_number;
        Ok(())
    }
}

fn ensure_unit_number(unit_number: u32) -> Result<(), ValidationError> {
    if unit_number == 0 {
        return Err(ValidationError::value("unit_number", "unit numbers start at 1"));
    }
    Ok(())
}

impl Features for Apartment {
    fn label(&self) -> &'static str {
        "Apartment"
    }

    fn validate(&self) -> Result<(), ValidationError> {
        ensure_non_negative("common_expenses", self.common_expenses)?;
        ensure_unit_number(self.unit_number)
    }

    fn feature_lines(&self) -> Vec<String> {
        vec![
            format!("Common expenses: {}", self.common_expenses),
            format!("Unit number: {}", self.unit_number),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Venue {
    capacity: u32,
}

impl Venue {
    pub fn new(capacity: u32) -> Self {
        Self { capacity }
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn set_capacity(&mut self, capacity: u32) {
        self.capacity = capacity;
    }
}

impl Features for Venue {
    fn label(&self) -> &'static str {
        "Venue"
    }

    fn fixed_rooms(&self) -> bool {
        true
    }

    fn feature_lines(&self) -> Vec<String> {
        vec![format!("Capacity: {}", self.capacity)]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountryHouse {
    has_pool: bool,
    has_barbecue_area: bool,
}

impl CountryHouse {
    pub fn new(has_pool: bool, has_barbecue_area: bool) -> Self {
        Self {
            has_pool,
            has_barbecue_area,
        }
    }

    pub fn has_pool(&self) -> bool {
        self.has_pool
    }

    pub fn has_barbecue_area(&self) -> bool {
        self.has_barbecue_area
    }

    pub fn set_has_pool(&mut self, has_pool: bool) {
        self.has_pool = has_pool;
    }

    pub fn set_has_barbecue_area(&mut self, has_barbecue_area: bool) {
        self.has_barbecue_area = has_barbecue_area;
    }
}

impl Default for CountryHouse {
    fn default() -> Self {
        Self::new(true, true)
    }
}

impl Features for CountryHouse {
    fn label(&self) -> &'static str {
        "Country house"
    }

    fn fixed_rooms(&self) -> bool {
        true
    }

    fn feature_lines(&self) -> Vec<String> {
        let pool = if self.has_pool { "With pool" } else { "No pool" };
        let barbecue = if self.has_barbecue_area {
            "With barbecue area"
        } else {
            "No barbecue area"
        };
        vec![pool.to_string(), barbecue.to_string()]
    }
}

/// Closed set of property kinds.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PropertyKind {
    House(House),
    Apartment(Apartment),
    Venue(Venue),
    CountryHouse(CountryHouse),
}

impl PropertyKind {
    fn features(&self) -> &dyn Features {
        match self {
            PropertyKind::House(house) => house,
            PropertyKind::Apartment(apartment) => apartment,
            PropertyKind::Venue(venue) => venue,
            PropertyKind::CountryHouse(country_house) => country_house,
        }
    }
}

impl Features for PropertyKind {
    fn label(&self) -> &'static str {
        self.features().label()
    }

    fn fixed_rooms(&self) -> bool {
        self.features().fixed_rooms()
    }

    fn validate(&self) -> Result<(), ValidationError> {
        self.features().validate()
    }

    fn feature_lines(&self) -> Vec<String> {
        self.features().feature_lines()
    }
}

/// Construction input for a property. Validated as a whole by the registry.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertySpec {
    pub covered_area: f64,
    pub address: String,
    pub rooms: u32,
    pub status: PropertyStatus,
    pub has_garage: bool,
    pub kind: PropertyKind,
}

impl PropertySpec {
    fn base(covered_area: f64, address: impl Into<String>, rooms: u32, kind: PropertyKind) -> Self {
        Self {
            covered_area,
            address: address.into(),
            rooms,
            status: PropertyStatus::default(),
            has_garage: false,
            kind,
        }
    }

    pub fn house(
        covered_area: f64,
        address: impl Into<String>,
        rooms: u32,
        yard_area: f64,
    ) -> Self {
        Self::base(
            covered_area,
            address,
            rooms,
            PropertyKind::House(House::new(yard_area)),
        )
    }

    pub fn apartment(
        covered_area: f64,
        address: impl Into<String>,
        rooms: u32,
        common_expenses: f64,
        unit_number: u32,
    ) -> Self {
        Self::base(
            covered_area,
            address,
            rooms,
            PropertyKind::Apartment(Apartment::new(common_expenses, unit_number)),
        )
    }

    pub fn venue(covered_area: f64, address: impl Into<String>, capacity: u32) -> Self {
        Self::base(
            covered_area,
            address,
            0,
            PropertyKind::Venue(Venue::new(capacity)),
        )
    }

    pub fn country_house(
        covered_area: f64,
        address: impl Into<String>,
        has_pool: bool,
        has_barbecue_area: bool,
    ) -> Self {
        Self::base(
            covered_area,
            address,
            0,
            PropertyKind::CountryHouse(CountryHouse::new(has_pool, has_barbecue_area)),
        )
    }

    pub fn with_status(mut self, status: PropertyStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_garage(mut self, has_garage: bool) -> Self {
        self.has_garage = has_garage;
        self
    }

    pub(crate) fn validate(&self) -> Result<(), ValidationError> {
        ensure_positive("covered_area", self.covered_area)?;
        ensure_text("address", &self.address)?;
        ensure_rooms(&self.kind, self.rooms)?;
        self.kind.validate()
    }
}

fn ensure_rooms(kind: &PropertyKind, rooms: u32) -> Result<(), ValidationError> {
    if kind.fixed_rooms() && rooms != 0 {
        return Err(ValidationError::value(
            "rooms",
            format!("a {} has no rooms, got {rooms}", kind.label().to_lowercase()),
        ));
    }
    Ok(())
}

/// A real-estate unit. Created only through the registry so that it is always
/// held by exactly one owner.
#[derive(Debug, Clone)]
pub struct Property {
    id: PropertyId,
    covered_area: f64,
    address: String,
    rooms: u32,
    owner: OwnerId,
    status: PropertyStatus,
    has_garage: bool,
    tenant: Option<String>,
    price: f64,
    kind: PropertyKind,
}

impl Property {
    /// `spec` must already be validated.
    pub(crate) fn from_spec(id: PropertyId, owner: OwnerId, spec: PropertySpec) -> Self {
        Self {
            id,
            covered_area: spec.covered_area,
            address: spec.address,
            rooms: spec.rooms,
            owner,
            status: spec.status,
            has_garage: spec.has_garage,
            tenant: None,
            price: 0.0,
            kind: spec.kind,
        }
    }

    pub fn id(&self) -> PropertyId {
        self.id
    }

    pub fn covered_area(&self) -> f64 {
        self.covered_area
    }

    pub fn set_covered_area(&mut self, covered_area: f64) -> Result<(), ValidationError> {
        ensure_positive("covered_area", covered_area)?;
        self.covered_area = covered_area;
        Ok(())
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn set_address(&mut self, address: impl Into<String>) -> Result<(), ValidationError> {
        let address = address.into();
        ensure_text("address", &address)?;
        self.address = address;
        Ok(())
    }

    pub fn rooms(&self) -> u32 {
        self.rooms
    }

    pub fn set_rooms(&mut self, rooms: u32) -> Result<(), ValidationError> {
        ensure_rooms(&self.kind, rooms)?;
        self.rooms = rooms;
        Ok(())
    }

    pub fn owner(&self) -> OwnerId {
        self.owner
    }

    pub(crate) fn set_owner(&mut self, owner: OwnerId) {
        self.owner = owner;
    }

    pub fn status(&self) -> PropertyStatus {
        self.status
    }

    pub fn set_status(&mut self, status: PropertyStatus) {
        self.status = status;
    }

    /// Parse and apply a textual status such as `"for-rent"`.
    pub fn set_status_label(&mut self, label: &str) -> Result<(), ValidationError> {
        self.status = label.parse()?;
        Ok(())
    }

    pub fn has_garage(&self) -> bool {
        self.has_garage
    }

    pub fn set_has_garage(&mut self, has_garage: bool) {
        self.has_garage = has_garage;
    }

    pub fn tenant(&self) -> Option<&str> {
        self.tenant.as_deref()
    }

    pub(crate) fn set_tenant(&mut self, tenant: impl Into<String>) {
        self.tenant = Some(tenant.into());
    }

    /// Asking price; `0.0` means not priced.
    pub fn price(&self) -> f64 {
        self.price
    }

    pub fn set_price(&mut self, price: f64) -> Result<(), ValidationError> {
        ensure_non_negative("price", price)?;
        self.price = price;
        Ok(())
    }

    pub fn kind(&self) -> &PropertyKind {
        &self.kind
    }

    /// Mutable access to the variant fields. The variant itself cannot change.
    pub fn features_mut(&mut self) -> FeaturesMut<'_> {
        match &mut self.kind {
            PropertyKind::House(house) => FeaturesMut::House(house),
            PropertyKind::Apartment(apartment) => FeaturesMut::Apartment(apartment),
            PropertyKind::Venue(venue) => FeaturesMut::Venue(venue),
            PropertyKind::CountryHouse(country_house) => FeaturesMut::CountryHouse(country_house),
        }
    }

    /// Multi-line summary of the property. Callers pass the current holder;
    /// the public entry point is [`Registry::describe_property`](super::Registry::describe_property).
    pub(crate) fn describe(&self, owner: &Owner) -> String {
        let garage = if self.has_garage {
            "With garage"
        } else {
            "No garage"
        };

        let mut lines = vec![
            self.kind.label().to_string(),
            format!("Property code: {}", self.id),
            format!("Covered area: {}", self.covered_area),
            format!("Address: {}", self.address),
            format!("Rooms: {}", self.rooms),
            format!(
                "Owner: {} (national ID {})",
                owner.full_name(),
                owner.national_id()
            ),
            format!("Status: {}", self.status),
            garage.to_string(),
        ];

        if let Some(tenant) = &self.tenant {
            lines.push(format!("Tenant: {tenant}"));
        }
        if self.price > 0.0 {
            lines.push(format!("Price: {}", self.price));
        }
        lines.extend(self.kind.feature_lines());

        format!("\n{SEPARATOR}\n {}", lines.join("\n "))
    }
}

/// Borrowed view over a property's variant, handed out by
/// [`Property::features_mut`].
#[derive(Debug)]
pub enum FeaturesMut<'a> {
    House(&'a mut House),
    Apartment(&'a mut Apartment),
    Venue(&'a mut Venue),
    CountryHouse(&'a mut CountryHouse),
}
