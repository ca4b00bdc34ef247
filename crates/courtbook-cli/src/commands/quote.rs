//! Price quotes.

use clap::Args;

use super::ResourceArgs;
use crate::output::{self, OutputFormat};
use courtbook_core::error::AppError;
use courtbook_entity::pricing::PricingBreakdown;

/// Arguments for the quote command
#[derive(Debug, Args)]
pub struct QuoteArgs {
    /// Resources and window to price
    #[command(flatten)]
    pub resources: ResourceArgs,
}

/// Execute the quote command
pub async fn execute(
    args: &QuoteArgs,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    let (_, db, engine) = super::connect_engine(config_path).await?;
    let r = &args.resources;

    let quote = engine
        .calculate_price(r.court, r.start, r.end, &r.equipment, r.coach)
        .await?;
    print_breakdown(&quote, format);

    db.close().await;
    Ok(())
}

/// Print a price breakdown
pub fn print_breakdown(breakdown: &PricingBreakdown, format: OutputFormat) {
    if format == OutputFormat::Json {
        output::print_json(breakdown);
        return;
    }

    output::print_kv("Base price", &output::money(breakdown.base_price));
    output::print_kv("Peak hour fee", &output::money(breakdown.peak_hour_fee));
    output::print_kv("Weekend fee", &output::money(breakdown.weekend_fee));
    let other = breakdown.unitemized();
    if other.abs() > f64::EPSILON {
        output::print_kv("Other rule fees", &output::money(other));
    }
    output::print_kv("Equipment fee", &output::money(breakdown.equipment_fee));
    output::print_kv("Coach fee", &output::money(breakdown.coach_fee));
    output::print_kv("Total", &output::money(breakdown.total));
}
