//! Booking management commands.

use chrono::{DateTime, NaiveDate, Utc};
use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use super::ResourceArgs;
use super::availability::print_availability;
use super::quote::print_breakdown;
use crate::output::{self, OutputFormat};
use courtbook_core::error::{AppError, ErrorKind};
use courtbook_core::types::id::{BookingId, CoachId, CourtId};
use courtbook_core::types::pagination::PageRequest;
use courtbook_entity::booking::{Booking, BookingStatus, ContactInfo, EquipmentLine};
use courtbook_service::BookingQuery;
use courtbook_service::booking::{BookingPatch, BookingRequest};

/// Arguments for booking commands
#[derive(Debug, Args)]
pub struct BookingArgs {
    /// Booking subcommand
    #[command(subcommand)]
    pub command: BookingCommand,
}

/// Booking subcommands
#[derive(Debug, Subcommand)]
pub enum BookingCommand {
    /// Create a booking
    Create(CreateArgs),
    /// List bookings by start time
    List {
        /// Only bookings with this status (confirmed, cancelled, waitlist)
        #[arg(long)]
        status: Option<BookingStatus>,
        /// Only bookings on this court
        #[arg(long)]
        court: Option<CourtId>,
        /// Only bookings starting on this facility-local date
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Page number
        #[arg(long, default_value_t = 1)]
        page: u64,
        /// Page size
        #[arg(long, default_value_t = 25)]
        page_size: u64,
    },
    /// Show a booking
    Show {
        /// Booking ID
        id: BookingId,
    },
    /// Move a booking or change its add-ons
    Update(UpdateArgs),
    /// Cancel a booking
    Cancel {
        /// Booking ID
        id: BookingId,
        /// Skip confirmation
        #[arg(long)]
        force: bool,
    },
}

/// Arguments for creating a booking
#[derive(Debug, Args)]
pub struct CreateArgs {
    /// Court, window, and add-ons
    #[command(flatten)]
    pub resources: ResourceArgs,
    /// Contact name
    #[arg(long)]
    pub name: String,
    /// Contact email
    #[arg(long)]
    pub email: String,
    /// Contact phone
    #[arg(long)]
    pub phone: String,
    /// Free-form notes
    #[arg(long)]
    pub notes: Option<String>,
}

/// Arguments for updating a booking
#[derive(Debug, Args)]
pub struct UpdateArgs {
    /// Booking ID
    pub id: BookingId,
    /// Move to another court
    #[arg(long)]
    pub court: Option<CourtId>,
    /// New start time (RFC 3339)
    #[arg(long)]
    pub start: Option<DateTime<Utc>>,
    /// New end time (RFC 3339)
    #[arg(long)]
    pub end: Option<DateTime<Utc>>,
    /// Replace the equipment lines (ID:QUANTITY, repeatable)
    #[arg(long = "equipment", value_parser = super::parse_equipment_line)]
    pub equipment: Vec<EquipmentLine>,
    /// Drop all equipment
    #[arg(long, conflicts_with = "equipment")]
    pub no_equipment: bool,
    /// Assign a coach
    #[arg(long)]
    pub coach: Option<CoachId>,
    /// Remove the coach
    #[arg(long, conflicts_with = "coach")]
    pub no_coach: bool,
    /// Replace the notes
    #[arg(long)]
    pub notes: Option<String>,
}

impl UpdateArgs {
    fn patch(&self) -> BookingPatch {
        let equipment = if self.no_equipment {
            Some(Vec::new())
        } else if self.equipment.is_empty() {
            None
        } else {
            Some(self.equipment.clone())
        };
        let coach_id = if self.no_coach {
            Some(None)
        } else {
            self.coach.map(Some)
        };

        BookingPatch {
            court_id: self.court,
            start_time: self.start,
            end_time: self.end,
            equipment,
            coach_id,
            notes: self.notes.clone().map(Some),
            ..Default::default()
        }
    }
}

/// Booking list row
#[derive(Debug, Serialize, Tabled)]
struct BookingRow {
    id: String,
    court: String,
    start: String,
    end: String,
    contact: String,
    status: String,
    total: String,
}

impl From<&Booking> for BookingRow {
    fn from(b: &Booking) -> Self {
        Self {
            id: b.id.to_string(),
            court: b.court_id.to_string(),
            start: b.start_time.format("%Y-%m-%d %H:%M").to_string(),
            end: b.end_time.format("%H:%M").to_string(),
            contact: b.user.name.clone(),
            status: b.status.to_string(),
            total: output::money(b.pricing_breakdown.total),
        }
    }
}

/// Execute booking commands
pub async fn execute(
    args: &BookingArgs,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    let (_, db, engine) = super::connect_engine(config_path).await?;

    match &args.command {
        BookingCommand::Create(create) => {
            let r = &create.resources;
            let request = BookingRequest {
                user: ContactInfo::new(&create.name, &create.email, &create.phone),
                court_id: r.court,
                start_time: r.start,
                end_time: r.end,
                equipment: r.equipment.clone(),
                coach_id: r.coach,
                notes: create.notes.clone(),
            };

            let booking = engine.create_booking(request).await.inspect_err(|e| {
                if let Some(availability) = e.availability.as_deref() {
                    print_availability(availability, format);
                }
            })?;
            output::print_success(&format!("Booking {} confirmed", booking.id));
            print_booking(&booking, format);
        }
        BookingCommand::List {
            status,
            court,
            date,
            page,
            page_size,
        } => {
            let query = BookingQuery {
                status: *status,
                court_id: *court,
                date: *date,
            };
            let result = engine
                .list_bookings(&query, &PageRequest::new(*page, *page_size))
                .await?;

            match format {
                OutputFormat::Json => output::print_json(&result),
                OutputFormat::Table => {
                    let rows: Vec<BookingRow> =
                        result.items.iter().map(BookingRow::from).collect();
                    output::print_list(&rows, format);
                    println!(
                        "Page {} of {} ({} bookings)",
                        result.page, result.total_pages, result.total_items
                    );
                }
            }
        }
        BookingCommand::Show { id } => {
            let booking = engine.get_booking(*id).await?;
            print_booking(&booking, format);
        }
        BookingCommand::Update(update) => {
            let booking = engine
                .update_booking(update.id, update.patch())
                .await
                .inspect_err(|e| {
                    if let Some(availability) = e.availability.as_deref() {
                        print_availability(availability, format);
                    }
                })?;
            output::print_success(&format!("Booking {} updated", booking.id));
            print_booking(&booking, format);
        }
        BookingCommand::Cancel { id, force } => {
            if !force {
                let confirm = dialoguer::Confirm::new()
                    .with_prompt(format!("Cancel booking {}?", id))
                    .default(false)
                    .interact()
                    .map_err(|e| AppError::internal(format!("Input error: {}", e)))?;

                if !confirm {
                    println!("Cancelled.");
                    return Ok(());
                }
            }

            match engine.cancel_booking(*id).await {
                Ok(booking) => {
                    output::print_success(&format!("Booking {} cancelled", booking.id));
                }
                Err(e) if e.kind == ErrorKind::AlreadyCancelled => {
                    output::print_warning(&e.message);
                }
                Err(e) => return Err(e),
            }
        }
    }

    db.close().await;
    Ok(())
}

fn print_booking(booking: &Booking, format: OutputFormat) {
    if format == OutputFormat::Json {
        output::print_json(booking);
        return;
    }

    output::print_kv("ID", &booking.id.to_string());
    output::print_kv("Status", booking.status.as_str());
    output::print_kv("Court", &booking.court_id.to_string());
    output::print_kv("Start", &booking.start_time.to_rfc3339());
    output::print_kv("End", &booking.end_time.to_rfc3339());
    output::print_kv(
        "Contact",
        &format!(
            "{} <{}> {}",
            booking.user.name, booking.user.email, booking.user.phone
        ),
    );
    output::print_kv("Coach", &output::or_dash(booking.resources.coach));
    for line in &booking.resources.equipment {
        output::print_kv(
            "Equipment",
            &format!("{} x{}", line.equipment_id, line.quantity),
        );
    }
    output::print_kv("Notes", &output::or_dash(booking.notes.as_deref()));
    print_breakdown(&booking.pricing_breakdown, format);
}
