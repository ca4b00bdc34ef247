//! Availability checks and slot listings.

use chrono::NaiveDate;
use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use super::ResourceArgs;
use crate::output::{self, OutputFormat};
use courtbook_core::error::AppError;
use courtbook_core::types::availability::AvailabilityResult;
use courtbook_core::types::id::CourtId;

/// Arguments for the check command
#[derive(Debug, Args)]
pub struct CheckArgs {
    /// Resources and window to check
    #[command(flatten)]
    pub resources: ResourceArgs,
}

/// Arguments for the slots command
#[derive(Debug, Args)]
pub struct SlotsArgs {
    /// Court ID
    #[arg(long)]
    pub court: CourtId,
    /// Facility-local date (YYYY-MM-DD)
    #[arg(long)]
    pub date: NaiveDate,
    /// Only list free slots
    #[arg(long)]
    pub free: bool,
}

/// Equipment availability row
#[derive(Debug, Serialize, Tabled)]
struct EquipmentRow {
    equipment: String,
    requested: u32,
    remaining: u32,
    available: String,
    message: String,
}

/// Slot display row
#[derive(Debug, Serialize, Tabled)]
struct SlotRow {
    slot: String,
    start: String,
    end: String,
    available: String,
}

/// Execute the check command
pub async fn check(
    args: &CheckArgs,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    let (_, db, engine) = super::connect_engine(config_path).await?;
    let r = &args.resources;

    let result = engine
        .check_availability(r.court, r.start, r.end, &r.equipment, r.coach)
        .await?;
    print_availability(&result, format);

    db.close().await;
    Ok(())
}

/// Execute the slots command
pub async fn slots(
    args: &SlotsArgs,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    let (_, db, engine) = super::connect_engine(config_path).await?;

    let rows: Vec<SlotRow> = engine
        .available_slots(args.court, args.date)
        .await?
        .into_iter()
        .filter(|slot| !args.free || slot.is_available)
        .map(|slot| SlotRow {
            slot: slot.label,
            start: slot.start_time.to_rfc3339(),
            end: slot.end_time.to_rfc3339(),
            available: output::flag(slot.is_available),
        })
        .collect();
    output::print_list(&rows, format);

    db.close().await;
    Ok(())
}

/// Print an itemized availability result
pub fn print_availability(result: &AvailabilityResult, format: OutputFormat) {
    if format == OutputFormat::Json {
        output::print_json(result);
        return;
    }

    output::print_kv("Court", &output::flag(result.court));
    output::print_kv("Coach", &output::flag(result.coach));
    output::print_kv("All available", &output::flag(result.all_available));

    if !result.equipment.is_empty() {
        let rows: Vec<EquipmentRow> = result
            .equipment
            .iter()
            .map(|e| EquipmentRow {
                equipment: e
                    .equipment_name
                    .clone()
                    .unwrap_or_else(|| e.equipment_id.to_string()),
                requested: e.requested,
                remaining: e.available_stock,
                available: output::flag(e.available),
                message: e.message.clone(),
            })
            .collect();
        output::print_list(&rows, format);
    }

    if !result.all_available {
        output::print_warning(&format!(
            "Unavailable: {}",
            result.unavailable_resources().join(", ")
        ));
    }
}
