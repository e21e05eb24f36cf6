use clap::{Args, Parser, Subcommand};
use estate_agency::config::AppConfig;
use estate_agency::error::AppError;
use estate_agency::portfolio::{
    Agency, CommissionSchedule, OwnerId, OwnerView, PortfolioSummary, PropertySpec,
    PropertyStatus, Registry, ValidationError,
};
use estate_agency::roster::{RosterImporter, RosterOutcome};
use estate_agency::telemetry;
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "Estate Agency",
    about = "Model an agency portfolio of owners, listings, rentals and sales",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the reference listing, rental and sale scenario (default command)
    Demo(DemoArgs),
    /// Import a CSV roster of owners and properties and report the portfolio
    Roster(RosterArgs),
    /// Suggest an asking price from the configured schedule
    Quote(QuoteArgs),
}

#[derive(Args, Debug, Default)]
struct DemoArgs {
    /// Print the portfolio summary as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct RosterArgs {
    /// Roster CSV to import
    #[arg(long)]
    path: PathBuf,
    /// Print the report as JSON
    #[arg(long)]
    json: bool,
    /// Include every owner's holdings
    #[arg(long)]
    owners: bool,
}

#[derive(Args, Debug)]
struct QuoteArgs {
    /// Covered area of the property
    #[arg(long, value_parser = parse_area)]
    covered_area: f64,
    /// The property has a garage
    #[arg(long)]
    garage: bool,
}

#[derive(Debug, Serialize)]
struct RosterReport {
    imported: RosterOutcome,
    summary: PortfolioSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    owners: Option<Vec<OwnerView>>,
}

fn main() {
    if let Err(err) = run_cli() {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

fn run_cli() -> Result<(), AppError> {
    let cli = Cli::parse();
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;
    info!(?config.environment, "estate agency driver starting");

    let schedule = config.agency.schedule;
    let command = cli
        .command
        .unwrap_or_else(|| Command::Demo(DemoArgs::default()));

    match command {
        Command::Demo(args) => run_demo(args, schedule),
        Command::Roster(args) => run_roster(args, schedule),
        Command::Quote(args) => run_quote(args, schedule),
    }
}

fn parse_area(raw: &str) -> Result<f64, String> {
    let area = raw
        .trim()
        .parse::<f64>()
        .map_err(|err| format!("failed to parse '{raw}' as a number ({err})"))?;
    if !area.is_finite() || area <= 0.0 {
        return Err(format!("covered area must be positive, got {area}"));
    }
    Ok(area)
}

struct DemoOutcome {
    registry: Registry,
    agency: Agency,
    seller: OwnerId,
    buyer: OwnerId,
}

/// Ana lists a house for sale and an apartment for rent; the agency sells the
/// house to Carla and rents the apartment to Bruno.
fn demo_scenario(schedule: CommissionSchedule) -> Result<DemoOutcome, ValidationError> {
    let mut registry = Registry::new();
    let mut agency = Agency::with_schedule(schedule);

    let seller = registry.register_owner("Ana Gomez", 30111222)?;
    let buyer = registry.register_owner("Carla Ruiz", 27444555)?;

    let house = registry.register_property(seller, PropertySpec::house(80.0, "Calle 1", 3, 20.0))?;
    let apartment = registry.register_property(
        seller,
        PropertySpec::apartment(45.0, "Avenida 9 de Julio 1200", 2, 350.0, 4)
            .with_status(PropertyStatus::ForRent)
            .with_garage(true),
    )?;

    agency.add_to_portfolio(&mut registry, house, 100_000.0)?;
    agency.add_to_portfolio(&mut registry, apartment, 80_000.0)?;
    agency.sell(&mut registry, house, buyer)?;
    agency.rent_out(&mut registry, apartment, "Bruno Diaz")?;

    Ok(DemoOutcome {
        registry,
        agency,
        seller,
        buyer,
    })
}

fn run_demo(args: DemoArgs, schedule: CommissionSchedule) -> Result<(), AppError> {
    let DemoOutcome {
        registry,
        agency,
        seller,
        buyer,
    } = demo_scenario(schedule)?;

    if args.json {
        print_json(&agency.summary(&registry))?;
        return Ok(());
    }

    println!("Estate agency demo");
    if let Some(portfolio) = agency.describe_portfolio(&registry) {
        println!("{portfolio}");
    }
    println!("{}", registry.describe_properties(seller)?);
    println!("{}", registry.describe_properties(buyer)?);
    println!("Agency earnings: {}", agency.earnings());
    Ok(())
}

fn run_roster(args: RosterArgs, schedule: CommissionSchedule) -> Result<(), AppError> {
    let RosterArgs { path, json, owners } = args;

    let mut registry = Registry::new();
    let mut agency = Agency::with_schedule(schedule);
    let imported = RosterImporter::from_path(&path, &mut registry, &mut agency)?;

    if json {
        let report = RosterReport {
            summary: agency.summary(&registry),
            owners: owners.then(|| registry.owners().map(OwnerView::from).collect()),
            imported,
        };
        print_json(&report)?;
        return Ok(());
    }

    println!("Roster import: {}", path.display());
    println!(
        "Owners: {} ({} new), properties: {}, listed: {}",
        imported.owners.len(),
        imported.owners_created,
        imported.properties.len(),
        imported.listed
    );

    let summary = agency.summary(&registry);
    println!("\nStatus breakdown");
    for entry in &summary.status_counts {
        println!("- {}: {}", entry.status_label, entry.count);
    }

    match agency.describe_portfolio(&registry) {
        Some(portfolio) => println!("\n{portfolio}"),
        None => println!("\nProperties under management: none"),
    }

    if owners {
        for owner in registry.owners() {
            println!("{}", registry.describe_properties(owner.id())?);
        }
    }
    Ok(())
}

fn run_quote(args: QuoteArgs, schedule: CommissionSchedule) -> Result<(), AppError> {
    let suggestion = schedule.suggest(args.covered_area, args.garage);
    println!("Base price: {}", suggestion.base);
    println!("Commission: {}", suggestion.commission);
    println!("{suggestion}");
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<(), AppError> {
    let rendered = serde_json::to_string_pretty(value).map_err(std::io::Error::from)?;
    println!("{rendered}");
    Ok(())
}
