//! Stock reconciliation commands.

use std::time::Duration;

use clap::Args;
use serde::Serialize;
use tabled::Tabled;
use tokio::sync::watch;

use crate::output::{self, OutputFormat};
use courtbook_core::error::AppError;
use courtbook_service::reconcile::ReconcileReport;

/// Arguments for the reconcile command
#[derive(Debug, Args)]
pub struct ReconcileArgs {
    /// Keep reconciling periodically until Ctrl-C
    #[arg(long)]
    pub watch: bool,
    /// Seconds between passes, overriding the configured interval
    #[arg(long)]
    pub every: Option<u64>,
}

/// Corrected counter row
#[derive(Debug, Serialize, Tabled)]
struct DriftRow {
    equipment: String,
    id: String,
    counter: u32,
    expected: u32,
}

/// Execute the reconcile command
pub async fn execute(
    args: &ReconcileArgs,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    let (config, db, engine) = super::connect_engine(config_path).await?;
    let reconciler = engine.reconciler().clone();

    if !args.watch {
        let report = reconciler.reconcile().await?;
        print_report(&report, format);
        db.close().await;
        return Ok(());
    }

    let report = reconciler.startup_recovery().await?;
    print_report(&report, format);

    let every = Duration::from_secs(
        args.every
            .unwrap_or(config.booking.reconcile_interval_seconds)
            .max(1),
    );
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let handle = tokio::spawn(async move { reconciler.run(every, shutdown_rx).await });

    println!(
        "Reconciling every {}s. Press Ctrl-C to stop.",
        every.as_secs()
    );
    tokio::signal::ctrl_c()
        .await
        .map_err(|e| AppError::internal(format!("Failed to listen for Ctrl-C: {}", e)))?;

    let _ = shutdown_tx.send(true);
    handle
        .await
        .map_err(|e| AppError::internal(format!("Reconciler task failed: {}", e)))?;

    db.close().await;
    output::print_success("Reconciler stopped.");
    Ok(())
}

fn print_report(report: &ReconcileReport, format: OutputFormat) {
    if format == OutputFormat::Json {
        output::print_json(report);
        return;
    }

    if !report.drift_detected() {
        output::print_success(&format!(
            "{} equipment counters match the ledger.",
            report.checked
        ));
        return;
    }

    output::print_warning(&format!(
        "Corrected {} of {} equipment counters:",
        report.corrections.len(),
        report.checked
    ));
    let rows: Vec<DriftRow> = report
        .corrections
        .iter()
        .map(|d| DriftRow {
            equipment: d.name.clone(),
            id: d.equipment_id.to_string(),
            counter: d.counter,
            expected: d.expected,
        })
        .collect();
    output::print_list(&rows, format);
}
