use std::collections::HashMap;
use std::fmt;

use serde::Serialize;
use tracing::{debug, info};

use super::domain::{
    ensure_non_negative, OwnerId, PropertyId, PropertyStatus, ValidationError,
};
use super::owner::Owner;
use super::property::Property;
use super::registry::Registry;
use super::views::{PortfolioSummary, PropertyView, StatusCount};

pub const RENTAL_COMMISSION_RATE: f64 = 0.10;
pub const SALE_COMMISSION_RATE: f64 = 0.20;
pub const PRICE_PER_AREA_UNIT: f64 = 500.0;
pub const GARAGE_BONUS: f64 = 500.0;

/// Commission rates and pricing dials applied by an [`Agency`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CommissionSchedule {
    pub rental_rate: f64,
    pub sale_rate: f64,
    pub price_per_area_unit: f64,
    pub garage_bonus: f64,
}

impl CommissionSchedule {
    pub const fn standard() -> Self {
        Self {
            rental_rate: RENTAL_COMMISSION_RATE,
            sale_rate: SALE_COMMISSION_RATE,
            price_per_area_unit: PRICE_PER_AREA_UNIT,
            garage_bonus: GARAGE_BONUS,
        }
    }

    /// Area-based price plus garage bonus, with the sale commission on top.
    pub fn suggest(&self, covered_area: f64, has_garage: bool) -> PriceSuggestion {
        let mut base = covered_area * self.price_per_area_unit;
        if has_garage {
            base += self.garage_bonus;
        }
        let commission = base * self.sale_rate;

        PriceSuggestion {
            base,
            commission,
            total: base + commission,
        }
    }
}

impl Default for CommissionSchedule {
    fn default() -> Self {
        Self::standard()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriceSuggestion {
    pub base: f64,
    pub commission: f64,
    pub total: f64,
}

impl fmt::Display for PriceSuggestion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Suggested price including administrative costs: {}", self.total)
    }
}

/// The business managing a subset of the registry's properties.
///
/// Transitions that break a business rule (property not managed, wrong
/// status) return `false`; only malformed input is an `Err`.
#[derive(Debug, Default)]
pub struct Agency {
    portfolio: Vec<PropertyId>,
    earnings: f64,
    schedule: CommissionSchedule,
}

impl Agency {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_schedule(schedule: CommissionSchedule) -> Self {
        Self {
            schedule,
            ..Self::default()
        }
    }

    pub fn schedule(&self) -> &CommissionSchedule {
        &self.schedule
    }

    pub fn earnings(&self) -> f64 {
        self.earnings
    }

    pub fn portfolio(&self) -> &[PropertyId] {
        &self.portfolio
    }

    pub fn contains(&self, id: PropertyId) -> bool {
        self.portfolio.contains(&id)
    }

    /// Take `id` under management at the given asking price.
    pub fn add_to_portfolio(
        &mut self,
        registry: &mut Registry,
        id: PropertyId,
        price: f64,
    ) -> Result<bool, ValidationError> {
        let property = registry
            .property_mut(id)
            .ok_or(ValidationError::UnknownProperty(id))?;
        ensure_non_negative("price", price)?;

        if self.contains(id) {
            debug!(property = %id, "property already in portfolio");
            return Ok(false);
        }

        property.set_price(price)?;
        self.portfolio.push(id);
        info!(property = %id, price, "property added to portfolio");
        Ok(true)
    }

    /// Drop every portfolio entry for `id`. The property itself is untouched.
    pub fn remove_from_portfolio(&mut self, id: PropertyId) -> bool {
        let before = self.portfolio.len();
        self.portfolio.retain(|managed| *managed != id);
        let removed = self.portfolio.len() != before;
        if removed {
            info!(property = %id, "property removed from portfolio");
        }
        removed
    }

    pub fn list_for_rent(&mut self, registry: &mut Registry, id: PropertyId) -> bool {
        self.relist(registry, id, PropertyStatus::ForRent)
    }

    pub fn list_for_sale(&mut self, registry: &mut Registry, id: PropertyId) -> bool {
        self.relist(registry, id, PropertyStatus::ForSale)
    }

    // Overwrites any other status, rented and sold included.
    fn relist(&self, registry: &mut Registry, id: PropertyId, target: PropertyStatus) -> bool {
        let Some(property) = self.managed_mut(registry, id) else {
            debug!(property = %id, status = %target, "relist rejected: not in portfolio");
            return false;
        };
        if property.status() == target {
            debug!(property = %id, status = %target, "relist rejected: already listed");
            return false;
        }

        let previous = property.status();
        property.set_status(target);
        info!(property = %id, from = %previous, to = %target, "property relisted");
        true
    }

    /// Rent a managed property to `tenant`, charging the rental commission.
    pub fn rent_out(
        &mut self,
        registry: &mut Registry,
        id: PropertyId,
        tenant: &str,
    ) -> Result<bool, ValidationError> {
        let Some(property) = self.managed_mut(registry, id) else {
            debug!(property = %id, "rental rejected: not in portfolio");
            return Ok(false);
        };
        if !property.status().accepts_tenant() {
            debug!(property = %id, status = %property.status(), "rental rejected: not for rent");
            return Ok(false);
        }

        property.set_tenant(tenant);
        property.set_status(PropertyStatus::Rented);
        let commission = property.price() * self.schedule.rental_rate;
        self.earnings += commission;

        info!(property = %id, tenant, commission, "property rented");
        Ok(true)
    }

    /// Sell a managed property to `new_owner`, charging the sale commission.
    ///
    /// The tenant of a previously rented property is kept as-is.
    pub fn sell(
        &mut self,
        registry: &mut Registry,
        id: PropertyId,
        new_owner: OwnerId,
    ) -> Result<bool, ValidationError> {
        if registry.owner(new_owner).is_none() {
            return Err(ValidationError::UnknownOwner(new_owner));
        }

        let Some(property) = self.managed(registry, id) else {
            debug!(property = %id, "sale rejected: not in portfolio");
            return Ok(false);
        };
        if !property.status().accepts_buyer() {
            debug!(property = %id, status = %property.status(), "sale rejected: not for sale");
            return Ok(false);
        }
        let price = property.price();
        let previous_owner = property.owner();

        registry.transfer(id, new_owner)?;
        let property = registry
            .property_mut(id)
            .ok_or(ValidationError::UnknownProperty(id))?;
        property.set_status(PropertyStatus::Sold);
        let commission = price * self.schedule.sale_rate;
        self.earnings += commission;
        property.set_price(0.0)?;

        info!(
            property = %id,
            from = %previous_owner,
            to = %new_owner,
            commission,
            "property sold"
        );
        Ok(true)
    }

    /// Suggested asking price for `property` under this agency's schedule.
    pub fn suggest_price(&self, property: &Property) -> PriceSuggestion {
        self.schedule.suggest(property.covered_area(), property.has_garage())
    }

    /// Count line followed by every managed description; `None` when empty.
    pub fn describe_portfolio(&self, registry: &Registry) -> Option<String> {
        if self.portfolio.is_empty() {
            return None;
        }

        let mut description = format!("Properties under management: {}", self.portfolio.len());
        for id in &self.portfolio {
            if let Some(text) = registry.describe_property(*id) {
                description.push_str(&text);
                description.push_str("\n==========\n");
            }
        }
        Some(description)
    }

    /// Holder of each managed entry, in portfolio order.
    pub fn portfolio_owners<'r>(&self, registry: &'r Registry) -> Vec<&'r Owner> {
        self.portfolio
            .iter()
            .filter_map(|id| registry.property(*id))
            .filter_map(|property| registry.owner(property.owner()))
            .collect()
    }

    pub fn summary(&self, registry: &Registry) -> PortfolioSummary {
        let mut counts: HashMap<PropertyStatus, usize> = HashMap::new();
        let mut properties = Vec::with_capacity(self.portfolio.len());

        for id in &self.portfolio {
            let Some(property) = registry.property(*id) else {
                continue;
            };
            *counts.entry(property.status()).or_default() += 1;
            if let Some(owner) = registry.owner(property.owner()) {
                properties.push(PropertyView::new(property, owner));
            }
        }

        let status_counts = PropertyStatus::ordered()
            .into_iter()
            .filter_map(|status| {
                counts.get(&status).map(|count| StatusCount {
                    status,
                    status_label: status.label(),
                    count: *count,
                })
            })
            .collect();

        PortfolioSummary {
            managed: self.portfolio.len(),
            earnings: self.earnings,
            status_counts,
            properties,
        }
    }

    fn managed<'r>(&self, registry: &'r Registry, id: PropertyId) -> Option<&'r Property> {
        if self.contains(id) {
            registry.property(id)
        } else {
            None
        }
    }

    fn managed_mut<'r>(
        &self,
        registry: &'r mut Registry,
        id: PropertyId,
    ) -> Option<&'r mut Property> {
        if self.contains(id) {
            registry.property_mut(id)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::portfolio::domain::ValidationKind;
    use crate::portfolio::property::PropertySpec;

    struct Fixture {
        registry: Registry,
        agency: Agency,
        seller: OwnerId,
        buyer: OwnerId,
        house: PropertyId,
    }

    fn fixture() -> Fixture {
        let mut registry = Registry::new();
        let seller = registry
            .register_owner("Ana Gomez", 30111222)
            .expect("seller registers");
        let buyer = registry
            .register_owner("Carla Ruiz", 27444555)
            .expect("buyer registers");
        let house = registry
            .register_property(seller, PropertySpec::house(80.0, "Calle 1", 3, 20.0))
            .expect("house registers");

        let mut agency = Agency::new();
        assert!(agency
            .add_to_portfolio(&mut registry, house, 100_000.0)
            .expect("house added"));

        Fixture {
            registry,
            agency,
            seller,
            buyer,
            house,
        }
    }

    #[test]
    fn add_to_portfolio_validates_before_deduplicating() {
        let Fixture {
            mut registry,
            mut agency,
            house,
            ..
        } = fixture();

        assert!(!agency
            .add_to_portfolio(&mut registry, house, 90_000.0)
            .expect("duplicate is a soft failure"));
        assert_eq!(
            registry.property(house).map(Property::price),
            Some(100_000.0)
        );

        let err = agency
            .add_to_portfolio(&mut registry, house, f64::NAN)
            .expect_err("non-finite price rejected");
        assert_eq!(err.kind(), ValidationKind::Value);

        let err = agency
            .add_to_portfolio(&mut registry, PropertyId(99), 1.0)
            .expect_err("unknown property rejected");
        assert_eq!(err.kind(), ValidationKind::Type);
        assert_eq!(agency.portfolio(), &[house]);
    }

    #[test]
    fn sell_transfers_ownership_and_charges_commission() {
        let Fixture {
            mut registry,
            mut agency,
            seller,
            buyer,
            house,
        } = fixture();

        assert!(agency
            .sell(&mut registry, house, buyer)
            .expect("sale succeeds"));

        let property = registry.property(house).expect("house still exists");
        assert_eq!(property.owner(), buyer);
        assert_eq!(property.status(), PropertyStatus::Sold);
        assert_eq!(property.price(), 0.0);
        assert!(!registry.owner(seller).expect("seller").holds(house));
        assert!(registry.owner(buyer).expect("buyer").holds(house));
        assert!((agency.earnings() - 20_000.0).abs() < 1e-9);
    }

    #[test]
    fn sell_requires_a_sale_listing() {
        let Fixture {
            mut registry,
            mut agency,
            seller,
            buyer,
            house,
        } = fixture();

        assert!(agency.list_for_rent(&mut registry, house));
        assert!(!agency
            .sell(&mut registry, house, buyer)
            .expect("soft failure"));
        assert_eq!(registry.property(house).map(Property::owner), Some(seller));
        assert_eq!(agency.earnings(), 0.0);

        assert!(!agency
            .sell(&mut registry, PropertyId(404), buyer)
            .expect("unmanaged property is a soft failure"));

        let err = agency
            .sell(&mut registry, house, OwnerId(77))
            .expect_err("unknown buyer rejected");
        assert_eq!(err, ValidationError::UnknownOwner(OwnerId(77)));
    }

    #[test]
    fn rent_out_charges_once() {
        let Fixture {
            mut registry,
            mut agency,
            house,
            ..
        } = fixture();

        assert!(!agency
            .rent_out(&mut registry, house, "Luis Perez")
            .expect("for-sale property cannot be rented"));

        assert!(agency.list_for_rent(&mut registry, house));
        assert!(agency
            .rent_out(&mut registry, house, "Luis Perez")
            .expect("rental succeeds"));
        assert!(!agency
            .rent_out(&mut registry, house, "Marta Sosa")
            .expect("already rented"));

        let property = registry.property(house).expect("house exists");
        assert_eq!(property.status(), PropertyStatus::Rented);
        assert_eq!(property.tenant(), Some("Luis Perez"));
        assert!((agency.earnings() - 10_000.0).abs() < 1e-9);
    }

    #[test]
    fn blank_tenant_is_stored_as_given() {
        let Fixture {
            mut registry,
            mut agency,
            house,
            ..
        } = fixture();

        assert!(agency.list_for_rent(&mut registry, house));
        assert!(agency
            .rent_out(&mut registry, house, "")
            .expect("any tenant text is accepted"));

        let property = registry.property(house).expect("house exists");
        assert_eq!(property.status(), PropertyStatus::Rented);
        assert_eq!(property.tenant(), Some(""));
        assert!((agency.earnings() - 10_000.0).abs() < 1e-9);
    }

    #[test]
    fn relisting_overwrites_any_other_status() {
        let Fixture {
            mut registry,
            mut agency,
            buyer,
            house,
            ..
        } = fixture();

        assert!(!agency.list_for_sale(&mut registry, house));
        assert!(agency
            .sell(&mut registry, house, buyer)
            .expect("sale succeeds"));
        assert!(agency.list_for_rent(&mut registry, house));
        assert!(!agency.list_for_rent(&mut registry, house));
        assert!(agency.list_for_sale(&mut registry, house));
        assert_eq!(
            registry.property(house).map(Property::status),
            Some(PropertyStatus::ForSale)
        );
    }

    #[test]
    fn dual_listing_accepts_either_transition() {
        let Fixture {
            mut registry,
            mut agency,
            buyer,
            house,
            ..
        } = fixture();

        registry
            .property_mut(house)
            .expect("house exists")
            .set_status(PropertyStatus::ForRentOrSale);
        assert!(agency
            .rent_out(&mut registry, house, "Luis Perez")
            .expect("rental succeeds"));

        registry
            .property_mut(house)
            .expect("house exists")
            .set_status(PropertyStatus::ForRentOrSale);
        assert!(agency
            .sell(&mut registry, house, buyer)
            .expect("sale succeeds"));

        let property = registry.property(house).expect("house exists");
        assert_eq!(property.tenant(), Some("Luis Perez"));
        assert!((agency.earnings() - 30_000.0).abs() < 1e-9);
    }

    #[test]
    fn remove_from_portfolio_keeps_the_property() {
        let Fixture {
            mut registry,
            mut agency,
            seller,
            house,
            ..
        } = fixture();

        assert!(agency.remove_from_portfolio(house));
        assert!(!agency.remove_from_portfolio(house));
        assert!(!agency.list_for_rent(&mut registry, house));
        assert!(registry.owner(seller).expect("seller").holds(house));
        assert!(agency.describe_portfolio(&registry).is_none());
    }

    #[test]
    fn suggest_price_adds_garage_bonus_and_commission() {
        let Fixture {
            mut registry,
            agency,
            house,
            ..
        } = fixture();

        let plain = agency.suggest_price(registry.property(house).expect("house"));
        assert_eq!(plain.base, 40_000.0);
        assert!((plain.total - 48_000.0).abs() < 1e-9);

        registry
            .property_mut(house)
            .expect("house")
            .set_has_garage(true);
        let with_garage = agency.suggest_price(registry.property(house).expect("house"));
        assert_eq!(with_garage.base, 40_500.0);
        assert!((with_garage.total - 48_600.0).abs() < 1e-9);
        assert!(with_garage
            .to_string()
            .starts_with("Suggested price including administrative costs:"));
    }

    #[test]
    fn summary_counts_statuses_in_fixed_order() {
        let Fixture {
            mut registry,
            mut agency,
            seller,
            house,
            ..
        } = fixture();
        let flat = registry
            .register_property(
                seller,
                PropertySpec::apartment(50.0, "Av. Libertador 100", 2, 800.0, 4)
                    .with_status(PropertyStatus::ForRent),
            )
            .expect("apartment registers");
        agency
            .add_to_portfolio(&mut registry, flat, 60_000.0)
            .expect("apartment added");

        let summary = agency.summary(&registry);
        assert_eq!(summary.managed, 2);
        assert_eq!(summary.status_counts.len(), 2);
        assert_eq!(summary.status_counts[0].status, PropertyStatus::ForRent);
        assert_eq!(summary.status_counts[1].status_label, "for-sale");
        assert_eq!(summary.properties[0].id, house);
        assert_eq!(summary.properties[1].owner_name, "Ana Gomez");

        let owners = agency.portfolio_owners(&registry);
        assert_eq!(owners.len(), 2);
        assert!(owners.iter().all(|owner| owner.id() == seller));
    }
}
