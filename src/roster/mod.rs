mod parser;

use serde::Serialize;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

use crate::portfolio::domain::{ensure_non_negative, ensure_text};
use crate::portfolio::{Agency, Owner, OwnerId, PropertyId, Registry, ValidationError};

use parser::RosterEntry;

#[derive(Debug)]
pub enum RosterImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    Invalid { line: u64, source: ValidationError },
}

impl std::fmt::Display for RosterImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RosterImportError::Io(err) => write!(f, "failed to read roster: {}", err),
            RosterImportError::Csv(err) => write!(f, "invalid roster CSV data: {}", err),
            RosterImportError::Invalid { line, source } => {
                write!(f, "roster line {}: {}", line, source)
            }
        }
    }
}

impl std::error::Error for RosterImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RosterImportError::Io(err) => Some(err),
            RosterImportError::Csv(err) => Some(err),
            RosterImportError::Invalid { source, .. } => Some(source),
        }
    }
}

impl From<std::io::Error> for RosterImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for RosterImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

/// What an import added to the registry and the agency portfolio.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RosterOutcome {
    pub owners: Vec<OwnerId>,
    pub owners_created: usize,
    pub properties: Vec<PropertyId>,
    pub listed: usize,
}

pub struct RosterImporter;

impl RosterImporter {
    pub fn from_path<P: AsRef<Path>>(
        path: P,
        registry: &mut Registry,
        agency: &mut Agency,
    ) -> Result<RosterOutcome, RosterImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file, registry, agency)
    }

    /// Import every row, or nothing if any row fails to parse or validate.
    pub fn from_reader<R: Read>(
        reader: R,
        registry: &mut Registry,
        agency: &mut Agency,
    ) -> Result<RosterOutcome, RosterImportError> {
        let mut entries = Vec::new();
        for (line, row) in parser::parse_rows(reader)? {
            let entry = row
                .into_entry(line)
                .and_then(|entry| validate_entry(&entry).map(|()| entry))
                .map_err(|source| RosterImportError::Invalid { line, source })?;
            entries.push(entry);
        }
        debug!(rows = entries.len(), "roster validated");

        let mut outcome = RosterOutcome::default();
        for entry in entries {
            apply_entry(entry, registry, agency, &mut outcome)?;
        }

        info!(
            owners = outcome.owners.len(),
            owners_created = outcome.owners_created,
            properties = outcome.properties.len(),
            listed = outcome.listed,
            "roster imported"
        );
        Ok(outcome)
    }
}

fn validate_entry(entry: &RosterEntry) -> Result<(), ValidationError> {
    ensure_text("owner_name", &entry.owner_name)?;
    entry.spec.validate()?;
    if let Some(price) = entry.price {
        ensure_non_negative("price", price)?;
    }
    Ok(())
}

fn apply_entry(
    entry: RosterEntry,
    registry: &mut Registry,
    agency: &mut Agency,
    outcome: &mut RosterOutcome,
) -> Result<(), RosterImportError> {
    let RosterEntry {
        line,
        owner_name,
        owner_national_id,
        spec,
        price,
    } = entry;
    let invalid = |source| RosterImportError::Invalid { line, source };

    let owner = match registry
        .owner_by_national_id(owner_national_id)
        .map(Owner::id)
    {
        Some(existing) => existing,
        None => {
            let created = registry
                .register_owner(owner_name, owner_national_id)
                .map_err(invalid)?;
            outcome.owners_created += 1;
            created
        }
    };
    if !outcome.owners.contains(&owner) {
        outcome.owners.push(owner);
    }

    let property = registry.register_property(owner, spec).map_err(invalid)?;
    outcome.properties.push(property);

    if let Some(price) = price {
        if agency
            .add_to_portfolio(registry, property, price)
            .map_err(invalid)?
        {
            outcome.listed += 1;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::portfolio::{PropertyStatus, ValidationKind};
    use std::io::Cursor;

    const HEADER: &str = "owner_name,owner_national_id,kind,covered_area,address,rooms,has_garage,status,price,yard_area,common_expenses,unit_number,capacity,has_pool,has_barbecue_area\n";

    fn import(rows: &str) -> (Registry, Agency, Result<RosterOutcome, RosterImportError>) {
        let mut registry = Registry::new();
        let mut agency = Agency::new();
        let csv = format!("{HEADER}{rows}");
        let result = RosterImporter::from_reader(Cursor::new(csv), &mut registry, &mut agency);
        (registry, agency, result)
    }

    #[test]
    fn owners_are_shared_across_rows_by_national_id() {
        let (registry, agency, result) = import(
            "Ana Gomez,30111222,house,80,Calle 1,3,no,,100000,20,,,,,\n\
Ana Gomez,30111222,apartment,45,Calle 3,1,,for-rent,,,300,12,,,\n\
Bruno Diaz,28999111,venue,250,Calle 2,,yes,for-rent-or-sale,50000,,,,120,,\n",
        );
        let outcome = result.expect("import succeeds");

        assert_eq!(outcome.owners_created, 2);
        assert_eq!(outcome.properties.len(), 3);
        assert_eq!(outcome.listed, 2);

        let ana = registry.owner_by_national_id(30111222).expect("ana");
        assert_eq!(ana.properties().len(), 2);
        let flat = registry.property(outcome.properties[1]).expect("flat");
        assert_eq!(flat.status(), PropertyStatus::ForRent);
        assert!(!agency.contains(flat.id()));
        assert!(agency.contains(outcome.properties[2]));
    }

    #[test]
    fn existing_owners_are_reused() {
        let mut registry = Registry::new();
        let mut agency = Agency::new();
        let ana = registry
            .register_owner("Ana Gomez", 30111222)
            .expect("owner registers");

        let csv = format!("{HEADER}Ana G.,30111222,house,80,Calle 1,3,,,,20,,,,,\n");
        let outcome = RosterImporter::from_reader(Cursor::new(csv), &mut registry, &mut agency)
            .expect("import succeeds");

        assert_eq!(outcome.owners, vec![ana]);
        assert_eq!(outcome.owners_created, 0);
        assert_eq!(registry.owner(ana).map(Owner::full_name), Some("Ana Gomez"));
    }

    #[test]
    fn one_bad_row_aborts_the_whole_import() {
        let (registry, agency, result) = import(
            "Ana Gomez,30111222,house,80,Calle 1,3,,,100000,20,,,,,\n\
Bruno Diaz,28999111,house,grande,Calle 2,2,,,,10,,,,,\n",
        );

        match result.expect_err("second row rejected") {
            RosterImportError::Invalid { line, source } => {
                assert_eq!(line, 3);
                assert_eq!(source.kind(), ValidationKind::Type);
            }
            other => panic!("expected invalid row, got {other:?}"),
        }
        assert_eq!(registry.owners().count(), 0);
        assert_eq!(registry.properties().count(), 0);
        assert!(agency.portfolio().is_empty());
    }

    #[test]
    fn domain_rules_are_checked_before_registration() {
        let (registry, _, result) = import(
            "Ana Gomez,30111222,house,80,Calle 1,3,,,,20,,,,,\n\
Ana Gomez,30111222,venue,200,Calle 9,4,,,,,,,100,,\n",
        );

        match result.expect_err("venue with rooms rejected") {
            RosterImportError::Invalid { line, source } => {
                assert_eq!(line, 3);
                assert!(matches!(source, ValidationError::Value { field: "rooms", .. }));
            }
            other => panic!("expected invalid row, got {other:?}"),
        }
        assert_eq!(registry.properties().count(), 0);
    }

    #[test]
    fn negative_price_is_rejected_up_front() {
        let (_, agency, result) = import("Ana Gomez,30111222,house,80,Calle 1,3,,,-5,20,,,,,\n");
        assert!(matches!(
            result,
            Err(RosterImportError::Invalid {
                source: ValidationError::Value { field: "price", .. },
                ..
            })
        ));
        assert!(agency.portfolio().is_empty());
    }

    #[test]
    fn missing_required_column_is_a_csv_error() {
        let mut registry = Registry::new();
        let mut agency = Agency::new();
        let csv = "owner_name,kind\nAna Gomez,house\n";
        let result = RosterImporter::from_reader(Cursor::new(csv), &mut registry, &mut agency);
        assert!(matches!(result, Err(RosterImportError::Csv(_))));
    }
}
