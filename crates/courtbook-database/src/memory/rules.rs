use async_trait::async_trait;

use courtbook_core::result::AppResult;
use courtbook_core::types::id::PricingRuleId;
use courtbook_entity::pricing::PricingRule;

use super::MemoryStore;
use crate::store::{PricingRuleStore, RuleFilter};

#[async_trait]
impl PricingRuleStore for MemoryStore {
    async fn find_active(&self) -> AppResult<Vec<PricingRule>> {
        let inner = self.inner.read().await;
        let mut rules: Vec<PricingRule> =
            inner.rules.iter().filter(|r| r.is_active).cloned().collect();
        // Stable: equal priorities keep insertion order.
        rules.sort_by_key(|r| r.priority);
        Ok(rules)
    }

    async fn list_rules(&self, filter: &RuleFilter) -> AppResult<Vec<PricingRule>> {
        let inner = self.inner.read().await;
        let mut rules: Vec<PricingRule> = inner
            .rules
            .iter()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();
        rules.sort_by(|a, b| a.priority.cmp(&b.priority).then_with(|| a.name.cmp(&b.name)));
        Ok(rules)
    }

    async fn upsert_rule(&self, rule: &PricingRule) -> AppResult<PricingRule> {
        rule.validate()?;
        let mut inner = self.inner.write().await;
        match inner.rules.iter().position(|r| r.id == rule.id) {
            Some(index) => inner.rules[index] = rule.clone(),
            None => inner.rules.push(rule.clone()),
        }
        Ok(rule.clone())
    }

    async fn delete_rule(&self, id: PricingRuleId) -> AppResult<bool> {
        let mut inner = self.inner.write().await;
        let before = inner.rules.len();
        inner.rules.retain(|r| r.id != id);
        Ok(inner.rules.len() != before)
    }
}
