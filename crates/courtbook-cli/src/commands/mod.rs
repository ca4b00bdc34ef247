//! CLI command definitions and dispatch.

pub mod availability;
pub mod booking;
pub mod catalog;
pub mod migrate;
pub mod quote;
pub mod reconcile;
pub mod seed;

use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use tracing::debug;

use crate::output::OutputFormat;
use courtbook_core::config::AppConfig;
use courtbook_core::error::AppError;
use courtbook_core::types::id::{CoachId, CourtId, EquipmentId};
use courtbook_database::DatabasePool;
use courtbook_entity::booking::EquipmentLine;
use courtbook_service::BookingEngine;

/// Courtbook: court, equipment, and coach bookings
#[derive(Debug, Parser)]
#[command(name = "courtbook", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Database migration management
    Migrate(migrate::MigrateArgs),
    /// Load the sample catalog
    Seed(seed::SeedArgs),
    /// Browse courts, equipment, coaches, and pricing rules
    Catalog(catalog::CatalogArgs),
    /// Check whether a court, equipment, and coach are free
    Check(availability::CheckArgs),
    /// Show a court's slots for a day
    Slots(availability::SlotsArgs),
    /// Quote the price of a prospective booking
    Quote(quote::QuoteArgs),
    /// Create, inspect, reschedule, and cancel bookings
    Booking(booking::BookingArgs),
    /// Reconcile equipment stock counters against the ledger
    Reconcile(reconcile::ReconcileArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        match &self.command {
            Commands::Migrate(args) => migrate::execute(args, &self.config).await,
            Commands::Seed(args) => seed::execute(args, &self.config, self.format).await,
            Commands::Catalog(args) => catalog::execute(args, &self.config, self.format).await,
            Commands::Check(args) => availability::check(args, &self.config, self.format).await,
            Commands::Slots(args) => availability::slots(args, &self.config, self.format).await,
            Commands::Quote(args) => quote::execute(args, &self.config, self.format).await,
            Commands::Booking(args) => booking::execute(args, &self.config, self.format).await,
            Commands::Reconcile(args) => {
                reconcile::execute(args, &self.config, self.format).await
            }
        }
    }
}

/// The court, window, and add-ons of a prospective booking
#[derive(Debug, Args)]
pub struct ResourceArgs {
    /// Court ID
    #[arg(long)]
    pub court: CourtId,
    /// Start time (RFC 3339, e.g. 2025-03-01T18:00:00Z)
    #[arg(long)]
    pub start: DateTime<Utc>,
    /// End time (RFC 3339)
    #[arg(long)]
    pub end: DateTime<Utc>,
    /// Equipment as ID:QUANTITY, repeatable
    #[arg(long = "equipment", value_parser = parse_equipment_line)]
    pub equipment: Vec<EquipmentLine>,
    /// Coach ID
    #[arg(long)]
    pub coach: Option<CoachId>,
}

/// Helper: load configuration from file
pub fn load_config(config_path: &str) -> Result<AppConfig, AppError> {
    AppConfig::load(config_path)
}

/// Helper: connect to the database and build an engine over it
pub async fn connect_engine(
    config_path: &str,
) -> Result<(AppConfig, DatabasePool, BookingEngine), AppError> {
    let config = load_config(config_path)?;
    let db = DatabasePool::connect(&config.database).await?;
    let engine = BookingEngine::postgres(&db, config.booking.clone());
    debug!(
        config = %config_path,
        utc_offset_minutes = config.booking.utc_offset_minutes,
        "Booking engine ready"
    );
    Ok((config, db, engine))
}

/// Parse an `EQUIPMENT_ID:QUANTITY` argument. The quantity defaults to 1.
pub fn parse_equipment_line(value: &str) -> Result<EquipmentLine, String> {
    let (id, quantity) = match value.split_once(':') {
        Some((id, quantity)) => {
            let quantity = quantity
                .trim()
                .parse::<u32>()
                .map_err(|e| format!("invalid quantity '{}': {}", quantity, e))?;
            (id, quantity)
        }
        None => (value, 1),
    };
    let equipment_id = id
        .trim()
        .parse::<EquipmentId>()
        .map_err(|e| format!("invalid equipment id '{}': {}", id, e))?;
    Ok(EquipmentLine::new(equipment_id, quantity))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_equipment_line() {
        let id = EquipmentId::new();
        let line = parse_equipment_line(&format!("{}:3", id)).unwrap();
        assert_eq!(line, EquipmentLine::new(id, 3));

        let line = parse_equipment_line(&id.to_string()).unwrap();
        assert_eq!(line.quantity, 1);

        assert!(parse_equipment_line("not-a-uuid:2").is_err());
        assert!(parse_equipment_line(&format!("{}:many", id)).is_err());
    }

    #[test]
    fn test_parse_booking_create() {
        let court = CourtId::new();
        let item = EquipmentId::new();
        let cli = Cli::try_parse_from([
            "courtbook",
            "--format",
            "json",
            "booking",
            "create",
            "--court",
            &court.to_string(),
            "--start",
            "2025-03-01T18:00:00Z",
            "--end",
            "2025-03-01T19:00:00Z",
            "--name",
            "Ada",
            "--email",
            "ada@example.com",
            "--phone",
            "+1-555-0001",
            "--equipment",
            &format!("{}:2", item),
        ])
        .unwrap();
        assert_eq!(cli.format, OutputFormat::Json);
        assert_eq!(cli.config, "config/default.toml");
        match cli.command {
            Commands::Booking(args) => match args.command {
                booking::BookingCommand::Create(create) => {
                    assert_eq!(create.resources.court, court);
                    assert_eq!(
                        create.resources.equipment,
                        vec![EquipmentLine::new(item, 2)]
                    );
                    assert!(create.resources.coach.is_none());
                    assert_eq!(create.name, "Ada");
                }
                other => panic!("unexpected booking command: {:?}", other),
            },
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_rejects_malformed_time() {
        let result = Cli::try_parse_from([
            "courtbook",
            "quote",
            "--court",
            &CourtId::new().to_string(),
            "--start",
            "tomorrow",
            "--end",
            "2025-03-01T19:00:00Z",
        ]);
        assert!(result.is_err());
    }
}
