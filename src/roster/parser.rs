use serde::{Deserialize, Deserializer};
use std::io::Read;

use crate::portfolio::{PropertySpec, PropertyStatus, ValidationError};

/// A typed roster row, not yet validated against the domain rules.
#[derive(Debug)]
pub(crate) struct RosterEntry {
    pub(crate) line: u64,
    pub(crate) owner_name: String,
    pub(crate) owner_national_id: u64,
    pub(crate) spec: PropertySpec,
    pub(crate) price: Option<f64>,
}

/// Raw rows paired with their line numbers.
pub(crate) fn parse_rows<R: Read>(reader: R) -> Result<Vec<(u64, RosterRow)>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = csv_reader.headers()?.clone();
    let mut rows = Vec::new();

    for record in csv_reader.records() {
        let record = record?;
        let line = record.position().map(|position| position.line()).unwrap_or(0);
        let row: RosterRow = record.deserialize(Some(&headers))?;
        rows.push((line, row));
    }

    Ok(rows)
}

#[derive(Debug, Deserialize)]
pub(crate) struct RosterRow {
    owner_name: String,
    owner_national_id: String,
    kind: String,
    covered_area: String,
    address: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    rooms: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    has_garage: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    status: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    price: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    yard_area: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    common_expenses: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    unit_number: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    capacity: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    has_pool: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    has_barbecue_area: Option<String>,
}

impl RosterRow {
    pub(crate) fn into_entry(self, line: u64) -> Result<RosterEntry, ValidationError> {
        let owner_national_id = parse_identifier("owner_national_id", &self.owner_national_id)?;
        let covered_area = parse_number("covered_area", &self.covered_area)?;
        let rooms = self
            .rooms
            .as_deref()
            .map(|raw| parse_count("rooms", raw))
            .transpose()?
            .unwrap_or(0);

        let mut spec = match normalize_kind(&self.kind).as_str() {
            "house" => {
                let yard_area = required(&self.yard_area, "yard_area", "house")?;
                PropertySpec::house(
                    covered_area,
                    self.address,
                    rooms,
                    parse_number("yard_area", yard_area)?,
                )
            }
            "apartment" => {
                let expenses = required(&self.common_expenses, "common_expenses", "apartment")?;
                let unit = required(&self.unit_number, "unit_number", "apartment")?;
                PropertySpec::apartment(
                    covered_area,
                    self.address,
                    rooms,
                    parse_number("common_expenses", expenses)?,
                    parse_count("unit_number", unit)?,
                )
            }
            "venue" => {
                let capacity = optional(&self.capacity, "capacity", parse_count)?.unwrap_or(0);
                let mut spec = PropertySpec::venue(covered_area, self.address, capacity);
                spec.rooms = rooms;
                spec
            }
            "country-house" => {
                let has_pool = optional(&self.has_pool, "has_pool", parse_flag)?.unwrap_or(true);
                let has_barbecue_area =
                    optional(&self.has_barbecue_area, "has_barbecue_area", parse_flag)?
                        .unwrap_or(true);
                let mut spec = PropertySpec::country_house(
                    covered_area,
                    self.address,
                    has_pool,
                    has_barbecue_area,
                );
                spec.rooms = rooms;
                spec
            }
            _ => {
                return Err(ValidationError::Value {
                    field: "kind",
                    reason: format!(
                        "'{}' is not one of house, apartment, venue, country_house",
                        self.kind
                    ),
                })
            }
        };

        if let Some(has_garage) = optional(&self.has_garage, "has_garage", parse_flag)? {
            spec.has_garage = has_garage;
        }
        if let Some(status) = self.status.as_deref() {
            spec.status = status.parse::<PropertyStatus>()?;
        }
        let price = optional(&self.price, "price", parse_number)?;

        Ok(RosterEntry {
            line,
            owner_name: self.owner_name,
            owner_national_id,
            spec,
            price,
        })
    }
}

fn normalize_kind(raw: &str) -> String {
    raw.trim().to_ascii_lowercase().replace(['_', ' '], "-")
}

fn required<'a>(
    value: &'a Option<String>,
    field: &'static str,
    kind: &str,
) -> Result<&'a str, ValidationError> {
    value.as_deref().ok_or_else(|| ValidationError::Value {
        field,
        reason: format!("required for a {kind}"),
    })
}

fn optional<T>(
    value: &Option<String>,
    field: &'static str,
    parse: fn(&'static str, &str) -> Result<T, ValidationError>,
) -> Result<Option<T>, ValidationError> {
    value.as_deref().map(|raw| parse(field, raw)).transpose()
}

fn parse_number(field: &'static str, raw: &str) -> Result<f64, ValidationError> {
    raw.parse::<f64>().map_err(|_| ValidationError::Type {
        field,
        expected: "a number",
        found: raw.to_string(),
    })
}

fn parse_integer(field: &'static str, raw: &str) -> Result<i64, ValidationError> {
    raw.parse::<i64>().map_err(|_| ValidationError::Type {
        field,
        expected: "an integer",
        found: raw.to_string(),
    })
}

fn parse_count(field: &'static str, raw: &str) -> Result<u32, ValidationError> {
    let value = parse_integer(field, raw)?;
    u32::try_from(value).map_err(|_| ValidationError::Value {
        field,
        reason: format!("expected a count between 0 and {}, got {value}", u32::MAX),
    })
}

fn parse_identifier(field: &'static str, raw: &str) -> Result<u64, ValidationError> {
    let value = parse_integer(field, raw)?;
    u64::try_from(value).map_err(|_| ValidationError::Value {
        field,
        reason: format!("identifiers cannot be negative, got {value}"),
    })
}

fn parse_flag(field: &'static str, raw: &str) -> Result<bool, ValidationError> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "yes" | "y" | "1" => Ok(true),
        "false" | "no" | "n" | "0" => Ok(false),
        _ => Err(ValidationError::Type {
            field,
            expected: "a boolean",
            found: raw.to_string(),
        }),
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
