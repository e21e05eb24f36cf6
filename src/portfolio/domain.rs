use std::fmt;
use std::str::FromStr;

use serde::Serialize;

/// Identifier issued by a [`Registry`](super::Registry) for each property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct PropertyId(pub u64);

impl fmt::Display for PropertyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier issued by a [`Registry`](super::Registry) for each owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct OwnerId(pub u64);

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Listing state of a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PropertyStatus {
    ForRent,
    Rented,
    #[default]
    ForSale,
    Sold,
    ForRentOrSale,
}

impl PropertyStatus {
    pub const fn ordered() -> [Self; 5] {
        [
            Self::ForRent,
            Self::Rented,
            Self::ForSale,
            Self::Sold,
            Self::ForRentOrSale,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::ForRent => "for-rent",
            Self::Rented => "rented",
            Self::ForSale => "for-sale",
            Self::Sold => "sold",
            Self::ForRentOrSale => "for-rent-or-sale",
        }
    }

    /// Whether a tenant can move in from this state.
    pub const fn accepts_tenant(self) -> bool {
        matches!(self, Self::ForRent | Self::ForRentOrSale)
    }

    /// Whether a buyer can close from this state.
    pub const fn accepts_buyer(self) -> bool {
        matches!(self, Self::ForSale | Self::ForRentOrSale)
    }
}

impl fmt::Display for PropertyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for PropertyStatus {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase().replace(['_', ' '], "-");
        Self::ordered()
            .into_iter()
            .find(|status| status.label() == normalized)
            .ok_or_else(|| ValidationError::Value {
                field: "status",
                reason: format!("'{value}' is not one of the recognized listing states"),
            })
    }
}

/// Coarse classification of a [`ValidationError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationKind {
    /// The argument is not of the expected type.
    Type,
    /// The argument has the right type but a disallowed value.
    Value,
}

/// Malformed input rejected before any state is touched.
///
/// Business-rule outcomes (property not managed, wrong status for a
/// transition) are not errors; agency operations report those as `false`.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} must be {expected}, found '{found}'")]
    Type {
        field: &'static str,
        expected: &'static str,
        found: String,
    },
    #[error("invalid {field}: {reason}")]
    Value { field: &'static str, reason: String },
    #[error("property {0} is not registered")]
    UnknownProperty(PropertyId),
    #[error("owner {0} is not registered")]
    UnknownOwner(OwnerId),
}

impl ValidationError {
    pub fn kind(&self) -> ValidationKind {
        match self {
            ValidationError::Type { .. }
            | ValidationError::UnknownProperty(_)
            | ValidationError::UnknownOwner(_) => ValidationKind::Type,
            ValidationError::Value { .. } => ValidationKind::Value,
        }
    }

    pub(crate) fn value(field: &'static str, reason: impl Into<String>) -> Self {
        ValidationError::Value {
            field,
            reason: reason.into(),
        }
    }
}

pub(crate) fn ensure_positive(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ValidationError::value(
            field,
            format!("expected a positive amount, got {value}"),
        ))
    }
}

pub(crate) fn ensure_non_negative(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ValidationError::value(
            field,
            format!("expected zero or a positive amount, got {value}"),
        ))
    }
}

pub(crate) fn ensure_text(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::value(field, "must not be empty"))
    } else {
        Ok(())
    }
}
