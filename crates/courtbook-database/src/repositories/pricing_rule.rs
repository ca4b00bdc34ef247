//! Pricing rule repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;

use courtbook_core::error::{AppError, ErrorKind};
use courtbook_core::result::AppResult;
use courtbook_core::types::id::PricingRuleId;
use courtbook_entity::pricing::PricingRule;

use super::rows::{PricingRuleRow, to_column};
use crate::store::{PricingRuleStore, RuleFilter};

/// Repository for pricing rules. The kind-specific predicate is stored as
/// JSONB next to a flat `rule_type` column used for filtering.
#[derive(Debug, Clone)]
pub struct PricingRuleRepository {
    pool: PgPool,
}

impl PricingRuleRepository {
    /// Create a new pricing rule repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PricingRuleStore for PricingRuleRepository {
    async fn find_active(&self) -> AppResult<Vec<PricingRule>> {
        sqlx::query_as::<_, PricingRuleRow>(
            "SELECT * FROM pricing_rules WHERE is_active = TRUE \
             ORDER BY priority ASC, created_at ASC, id ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load active rules", e))?
        .into_iter()
        .map(PricingRule::try_from)
        .collect()
    }

    async fn list_rules(&self, filter: &RuleFilter) -> AppResult<Vec<PricingRule>> {
        sqlx::query_as::<_, PricingRuleRow>(
            "SELECT * FROM pricing_rules \
             WHERE ($1::boolean IS NULL OR is_active = $1) \
             AND ($2::text IS NULL OR rule_type = $2) \
             ORDER BY priority ASC, name ASC",
        )
        .bind(filter.is_active)
        .bind(filter.rule_type.map(|t| t.as_str()))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list rules", e))?
        .into_iter()
        .map(PricingRule::try_from)
        .collect()
    }

    async fn upsert_rule(&self, rule: &PricingRule) -> AppResult<PricingRule> {
        rule.validate()?;
        let condition = serde_json::to_value(&rule.condition)?;
        let row = sqlx::query_as::<_, PricingRuleRow>(
            "INSERT INTO pricing_rules (id, name, rule_type, condition, multiplier, surcharge, \
             priority, is_active, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             ON CONFLICT (id) DO UPDATE SET name = EXCLUDED.name, rule_type = EXCLUDED.rule_type, \
             condition = EXCLUDED.condition, multiplier = EXCLUDED.multiplier, \
             surcharge = EXCLUDED.surcharge, priority = EXCLUDED.priority, \
             is_active = EXCLUDED.is_active \
             RETURNING *",
        )
        .bind(rule.id.into_uuid())
        .bind(&rule.name)
        .bind(rule.rule_type().as_str())
        .bind(condition)
        .bind(rule.multiplier)
        .bind(rule.surcharge)
        .bind(to_column(rule.priority, "priority")?)
        .bind(rule.is_active)
        .bind(rule.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to save rule", e))?;
        row.try_into()
    }

    async fn delete_rule(&self, id: PricingRuleId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM pricing_rules WHERE id = $1")
            .bind(id.into_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete rule", e))?;
        Ok(result.rows_affected() > 0)
    }
}
