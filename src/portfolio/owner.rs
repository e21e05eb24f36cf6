use super::domain::{ensure_text, OwnerId, PropertyId, ValidationError};

/// A person holding title to properties.
///
/// The holdings list is bookkeeping maintained by the
/// [`Registry`](super::Registry); it only changes through registry operations
/// so that every property is held by exactly one owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Owner {
    id: OwnerId,
    full_name: String,
    national_id: u64,
    properties: Vec<PropertyId>,
}

impl Owner {
    pub(crate) fn new(
        id: OwnerId,
        full_name: impl Into<String>,
        national_id: u64,
    ) -> Result<Self, ValidationError> {
        let full_name = full_name.into();
        ensure_text("full_name", &full_name)?;

        Ok(Self {
            id,
            full_name,
            national_id,
            properties: Vec::new(),
        })
    }

    pub fn id(&self) -> OwnerId {
        self.id
    }

    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    pub fn set_full_name(&mut self, full_name: impl Into<String>) -> Result<(), ValidationError> {
        let full_name = full_name.into();
        ensure_text("full_name", &full_name)?;
        self.full_name = full_name;
        Ok(())
    }

    pub fn national_id(&self) -> u64 {
        self.national_id
    }

    /// Uniqueness is checked by [`Registry::set_national_id`](super::Registry::set_national_id).
    pub(crate) fn set_national_id(&mut self, national_id: u64) {
        self.national_id = national_id;
    }

    /// Held property ids in the order they were acquired.
    pub fn properties(&self) -> &[PropertyId] {
        &self.properties
    }

    pub fn holds(&self, id: PropertyId) -> bool {
        self.properties.contains(&id)
    }

    /// Returns whether at least one id was not held before.
    pub(crate) fn add_properties(&mut self, ids: &[PropertyId]) -> bool {
        let mut added = false;
        for id in ids {
            if !self.holds(*id) {
                self.properties.push(*id);
                added = true;
            }
        }
        added
    }

    pub(crate) fn remove_property(&mut self, id: PropertyId) -> bool {
        match self.properties.iter().position(|held| *held == id) {
            Some(index) => {
                self.properties.remove(index);
                true
            }
            None => false,
        }
    }
}
