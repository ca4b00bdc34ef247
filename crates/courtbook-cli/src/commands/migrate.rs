//! Database migration management commands.

use clap::{Args, Subcommand};

use crate::output;
use courtbook_core::error::AppError;
use courtbook_database::DatabasePool;
use courtbook_database::migration::run_migrations;

/// Arguments for the migrate command
#[derive(Debug, Args)]
pub struct MigrateArgs {
    /// Migration subcommand
    #[command(subcommand)]
    pub command: MigrateCommand,
}

/// Migration subcommands
#[derive(Debug, Subcommand)]
pub enum MigrateCommand {
    /// Run all pending migrations
    Run,
    /// Check that the database is reachable
    Ping,
}

/// Execute migration commands
pub async fn execute(args: &MigrateArgs, config_path: &str) -> Result<(), AppError> {
    let config = super::load_config(config_path)?;
    let db = DatabasePool::connect(&config.database).await?;

    match &args.command {
        MigrateCommand::Run => {
            println!("Running database migrations...");
            run_migrations(db.pool()).await?;
            output::print_success("All migrations applied successfully.");
        }
        MigrateCommand::Ping => {
            if db.health_check().await? {
                output::print_success("Database is reachable.");
            } else {
                output::print_warning("Database did not answer the health check.");
            }
        }
    }

    db.close().await;
    Ok(())
}
