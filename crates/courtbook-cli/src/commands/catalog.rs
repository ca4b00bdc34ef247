//! Catalog browsing and pricing rule management.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use courtbook_core::error::AppError;
use courtbook_core::types::id::PricingRuleId;
use courtbook_database::RuleFilter;
use courtbook_entity::pricing::{PricingRule, RuleCondition, RuleType};

/// Arguments for catalog commands
#[derive(Debug, Args)]
pub struct CatalogArgs {
    /// Catalog subcommand
    #[command(subcommand)]
    pub command: CatalogCommand,
}

/// Catalog subcommands
#[derive(Debug, Subcommand)]
pub enum CatalogCommand {
    /// List courts
    Courts,
    /// List equipment with stock counters
    Equipment,
    /// List coaches
    Coaches,
    /// List pricing rules
    Rules {
        /// Only rules of this type (peak_hour, weekend, court_type, ...)
        #[arg(long = "type")]
        rule_type: Option<RuleType>,
        /// Only active (true) or inactive (false) rules
        #[arg(long)]
        active: Option<bool>,
    },
    /// Add a pricing rule
    AddRule {
        /// Rule name
        #[arg(long)]
        name: String,
        /// Condition as JSON, e.g. '{"type":"weekend","days_of_week":[0,6]}'
        #[arg(long)]
        condition: String,
        /// Evaluation order, ascending
        #[arg(long, default_value_t = 1)]
        priority: u32,
        /// Fee as a multiple of the base price
        #[arg(long, default_value_t = 1.0)]
        multiplier: f64,
        /// Flat fee, used when the multiplier is 1
        #[arg(long, default_value_t = 0.0)]
        surcharge: f64,
        /// Store the rule inactive
        #[arg(long)]
        inactive: bool,
    },
    /// Delete a pricing rule
    DeleteRule {
        /// Rule ID
        id: PricingRuleId,
    },
}

/// Court display row
#[derive(Debug, Serialize, Tabled)]
struct CourtRow {
    id: String,
    name: String,
    #[tabled(rename = "type")]
    court_type: String,
    sport: String,
    base_price: String,
    active: String,
}

/// Equipment display row
#[derive(Debug, Serialize, Tabled)]
struct EquipmentRow {
    id: String,
    name: String,
    kind: String,
    available: u32,
    total: u32,
    price: String,
    condition: String,
    active: String,
}

/// Coach display row
#[derive(Debug, Serialize, Tabled)]
struct CoachRow {
    id: String,
    name: String,
    email: String,
    sports: String,
    hourly_rate: String,
    active: String,
}

/// Pricing rule display row
#[derive(Debug, Serialize, Tabled)]
struct RuleRow {
    id: String,
    name: String,
    #[tabled(rename = "type")]
    rule_type: String,
    priority: u32,
    multiplier: f64,
    surcharge: String,
    active: String,
}

/// Execute catalog commands
pub async fn execute(
    args: &CatalogArgs,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    let (_, db, engine) = super::connect_engine(config_path).await?;

    match &args.command {
        CatalogCommand::Courts => {
            let rows: Vec<CourtRow> = engine
                .courts()
                .await?
                .into_iter()
                .map(|c| CourtRow {
                    id: c.id.to_string(),
                    name: c.name,
                    court_type: c.court_type.to_string(),
                    sport: c.sport.to_string(),
                    base_price: output::money(c.base_price),
                    active: output::flag(c.is_active),
                })
                .collect();
            output::print_list(&rows, format);
        }
        CatalogCommand::Equipment => {
            let rows: Vec<EquipmentRow> = engine
                .equipment()
                .await?
                .into_iter()
                .map(|e| EquipmentRow {
                    id: e.id.to_string(),
                    name: e.name,
                    kind: e.kind.to_string(),
                    available: e.available_stock,
                    total: e.total_stock,
                    price: output::money(e.rental_price),
                    condition: e.condition.to_string(),
                    active: output::flag(e.is_active),
                })
                .collect();
            output::print_list(&rows, format);
        }
        CatalogCommand::Coaches => {
            let rows: Vec<CoachRow> = engine
                .coaches()
                .await?
                .into_iter()
                .map(|c| CoachRow {
                    id: c.id.to_string(),
                    name: c.name,
                    email: c.email,
                    sports: c
                        .specializations
                        .iter()
                        .map(|s| s.as_str())
                        .collect::<Vec<_>>()
                        .join(", "),
                    hourly_rate: output::money(c.hourly_rate),
                    active: output::flag(c.is_active),
                })
                .collect();
            output::print_list(&rows, format);
        }
        CatalogCommand::Rules { rule_type, active } => {
            let filter = RuleFilter {
                is_active: *active,
                rule_type: *rule_type,
            };
            let rows: Vec<RuleRow> = engine
                .pricing_rules(&filter)
                .await?
                .into_iter()
                .map(|r| RuleRow {
                    id: r.id.to_string(),
                    rule_type: r.rule_type().to_string(),
                    name: r.name,
                    priority: r.priority,
                    multiplier: r.multiplier,
                    surcharge: output::money(r.surcharge),
                    active: output::flag(r.is_active),
                })
                .collect();
            output::print_list(&rows, format);
        }
        CatalogCommand::AddRule {
            name,
            condition,
            priority,
            multiplier,
            surcharge,
            inactive,
        } => {
            let condition: RuleCondition = serde_json::from_str(condition)
                .map_err(|e| AppError::validation(format!("Invalid condition JSON: {}", e)))?;
            let mut rule = PricingRule::new(name.clone(), condition, *priority)
                .with_multiplier(*multiplier)
                .with_surcharge(*surcharge);
            rule.is_active = !inactive;
            rule.validate()?;

            let saved = engine.save_pricing_rule(&rule).await?;
            match format {
                OutputFormat::Json => output::print_json(&saved),
                OutputFormat::Table => {
                    output::print_success(&format!("Pricing rule '{}' saved", saved.name));
                    output::print_kv("ID", &saved.id.to_string());
                }
            }
        }
        CatalogCommand::DeleteRule { id } => {
            if engine.delete_pricing_rule(*id).await? {
                output::print_success(&format!("Pricing rule {} deleted", id));
            } else {
                return Err(AppError::not_found(format!("Pricing rule {} not found", id)));
            }
        }
    }

    db.close().await;
    Ok(())
}
