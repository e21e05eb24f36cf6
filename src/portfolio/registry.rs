use std::collections::BTreeMap;

use tracing::{debug, warn};

use super::domain::{OwnerId, PropertyId, ValidationError};
use super::owner::Owner;
use super::property::{Property, PropertySpec};

/// Arena owning every owner and property, and the id sequences for both.
///
/// A property records its holder as an [`OwnerId`]; an owner records its
/// holdings as [`PropertyId`]s. The registry is the only place where either
/// side changes, so the two always agree.
#[derive(Debug, Default)]
pub struct Registry {
    owners: BTreeMap<OwnerId, Owner>,
    properties: BTreeMap<PropertyId, Property>,
    last_owner_id: u64,
    last_property_id: u64,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_owner(
        &mut self,
        full_name: impl Into<String>,
        national_id: u64,
    ) -> Result<OwnerId, ValidationError> {
        let id = OwnerId(self.last_owner_id + 1);
        let owner = Owner::new(id, full_name, national_id).inspect_err(|err| {
            warn!(national_id, error = %err, "owner registration rejected");
        })?;

        self.last_owner_id = id.0;
        self.owners.insert(id, owner);
        debug!(owner = %id, national_id, "owner registered");
        Ok(id)
    }

    /// Validate `spec` and create the property under `owner`.
    ///
    /// Nothing is recorded when validation fails: no id is consumed and the
    /// owner's holdings are unchanged.
    pub fn register_property(
        &mut self,
        owner: OwnerId,
        spec: PropertySpec,
    ) -> Result<PropertyId, ValidationError> {
        if !self.owners.contains_key(&owner) {
            return Err(ValidationError::UnknownOwner(owner));
        }
        spec.validate().inspect_err(|err| {
            warn!(owner = %owner, error = %err, "property registration rejected");
        })?;

        let id = PropertyId(self.last_property_id + 1);
        self.last_property_id = id.0;
        self.properties.insert(id, Property::from_spec(id, owner, spec));
        if let Some(holder) = self.owners.get_mut(&owner) {
            holder.add_properties(&[id]);
        }

        debug!(property = %id, owner = %owner, "property registered");
        Ok(id)
    }

    pub fn owner(&self, id: OwnerId) -> Option<&Owner> {
        self.owners.get(&id)
    }

    /// Name edits only; holdings and national IDs change through the registry.
    pub fn owner_mut(&mut self, id: OwnerId) -> Option<&mut Owner> {
        self.owners.get_mut(&id)
    }

    /// Change an owner's national ID, refusing one already held by another owner.
    pub fn set_national_id(
        &mut self,
        owner: OwnerId,
        national_id: u64,
    ) -> Result<(), ValidationError> {
        if let Some(other) = self
            .owners
            .values()
            .find(|other| other.id() != owner && other.national_id() == national_id)
        {
            return Err(ValidationError::value(
                "national_id",
                format!("{national_id} already belongs to owner {}", other.id()),
            ));
        }

        let holder = self
            .owners
            .get_mut(&owner)
            .ok_or(ValidationError::UnknownOwner(owner))?;
        holder.set_national_id(national_id);
        Ok(())
    }

    /// First registered owner with `national_id`. Registration does not dedupe,
    /// so two owners registered with the same ID resolve to the earlier one.
    pub fn owner_by_national_id(&self, national_id: u64) -> Option<&Owner> {
        self.owners
            .values()
            .find(|owner| owner.national_id() == national_id)
    }

    pub fn owners(&self) -> impl Iterator<Item = &Owner> {
        self.owners.values()
    }

    pub fn property(&self, id: PropertyId) -> Option<&Property> {
        self.properties.get(&id)
    }

    pub fn property_mut(&mut self, id: PropertyId) -> Option<&mut Property> {
        self.properties.get_mut(&id)
    }

    pub fn properties(&self) -> impl Iterator<Item = &Property> {
        self.properties.values()
    }

    /// Properties held by `owner`, in acquisition order.
    pub fn holdings(&self, owner: OwnerId) -> Result<Vec<&Property>, ValidationError> {
        let holder = self
            .owners
            .get(&owner)
            .ok_or(ValidationError::UnknownOwner(owner))?;

        Ok(holder
            .properties()
            .iter()
            .filter_map(|id| self.properties.get(id))
            .collect())
    }

    /// Place each property under `owner`, taking it from its previous holder.
    ///
    /// Every id is checked before anything moves. Returns whether at least one
    /// property was not already held by `owner`.
    pub fn assign(&mut self, owner: OwnerId, ids: &[PropertyId]) -> Result<bool, ValidationError> {
        if !self.owners.contains_key(&owner) {
            return Err(ValidationError::UnknownOwner(owner));
        }
        if let Some(missing) = ids.iter().find(|id| !self.properties.contains_key(*id)) {
            return Err(ValidationError::UnknownProperty(*missing));
        }

        let mut added = false;
        for id in ids {
            added |= self.move_property(*id, owner);
        }
        Ok(added)
    }

    /// Move a property to `new_owner`. Both must be registered.
    pub(crate) fn transfer(
        &mut self,
        id: PropertyId,
        new_owner: OwnerId,
    ) -> Result<(), ValidationError> {
        if !self.owners.contains_key(&new_owner) {
            return Err(ValidationError::UnknownOwner(new_owner));
        }
        if !self.properties.contains_key(&id) {
            return Err(ValidationError::UnknownProperty(id));
        }

        self.move_property(id, new_owner);
        Ok(())
    }

    /// Callers have checked that both ids exist.
    fn move_property(&mut self, id: PropertyId, new_owner: OwnerId) -> bool {
        let Some(property) = self.properties.get_mut(&id) else {
            return false;
        };
        let previous = property.owner();
        if previous == new_owner {
            return false;
        }
        property.set_owner(new_owner);

        if let Some(holder) = self.owners.get_mut(&previous) {
            holder.remove_property(id);
        }
        self.owners
            .get_mut(&new_owner)
            .map(|holder| holder.add_properties(&[id]))
            .unwrap_or(false)
    }

    pub fn describe_property(&self, id: PropertyId) -> Option<String> {
        let property = self.properties.get(&id)?;
        let owner = self.owners.get(&property.owner())?;
        Some(property.describe(owner))
    }

    /// Every description held by `owner`, or a note that it holds nothing.
    pub fn describe_properties(&self, owner: OwnerId) -> Result<String, ValidationError> {
        let holder = self
            .owners
            .get(&owner)
            .ok_or(ValidationError::UnknownOwner(owner))?;

        if holder.properties().is_empty() {
            return Ok(format!("Owner {} holds no properties.", holder.full_name()));
        }

        let count = holder.properties().len();
        let noun = if count == 1 { "property" } else { "properties" };
        let mut description = format!(
            "\n==========\nOwner {} holds {count} {noun}\n",
            holder.full_name()
        );
        for property in self.holdings(owner)? {
            description.push_str(&property.describe(holder));
            description.push_str("\n==========\n");
        }
        Ok(description)
    }
}
