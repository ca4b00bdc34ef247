//! Sample catalog seeding.

use clap::Args;

use crate::output::{self, OutputFormat};
use courtbook_core::error::AppError;

/// Arguments for the seed command
#[derive(Debug, Args)]
pub struct SeedArgs {
    /// Re-seed even if courts already exist, skipping the prompt
    #[arg(long)]
    pub force: bool,
}

/// Execute the seed command
pub async fn execute(
    args: &SeedArgs,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    let (_, db, engine) = super::connect_engine(config_path).await?;

    let mut force = args.force;
    if !force && !engine.courts().await?.is_empty() {
        let confirm = dialoguer::Confirm::new()
            .with_prompt("The catalog already has courts. Refresh the sample entries?")
            .default(false)
            .interact()
            .map_err(|e| AppError::internal(format!("Input error: {}", e)))?;

        if !confirm {
            println!("Cancelled.");
            return Ok(());
        }
        force = true;
    }

    let report = engine.seed(force).await?;

    match format {
        OutputFormat::Json => output::print_json(&report),
        OutputFormat::Table if report.skipped => {
            output::print_warning("Catalog already populated; nothing seeded.");
        }
        OutputFormat::Table => {
            output::print_success("Sample catalog loaded.");
            output::print_kv("Courts", &report.courts.to_string());
            output::print_kv("Coaches", &report.coaches.to_string());
            output::print_kv("Equipment", &report.equipment.to_string());
            output::print_kv("Pricing rules", &report.rules.to_string());
        }
    }

    db.close().await;
    Ok(())
}
