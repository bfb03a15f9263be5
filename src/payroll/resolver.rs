use chrono::NaiveDate;

use crate::model::payroll_config::PayrollConfig;
use crate::payroll::error::{PayrollError, PayrollResult};
use crate::payroll::store::ConfigStore;

/// Which configuration a computation should run against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigLookup {
    /// The currently active config (batch generation).
    Active,
    /// The config whose effective window contains the date.
    AsOf(NaiveDate),
}

/// Orders candidates by `effective_from`, then `id`, so ties are deterministic.
fn latest<'a>(candidates: impl Iterator<Item = &'a PayrollConfig>) -> Option<&'a PayrollConfig> {
    candidates.max_by(|a, b| {
        a.effective_from
            .cmp(&b.effective_from)
            .then_with(|| a.id.cmp(&b.id))
    })
}

pub fn select_active(configs: &[PayrollConfig]) -> Option<&PayrollConfig> {
    latest(configs.iter().filter(|c| c.is_active))
}

pub fn select_as_of(configs: &[PayrollConfig], date: NaiveDate) -> Option<&PayrollConfig> {
    latest(configs.iter().filter(|c| c.is_effective_on(date)))
}

pub fn select(configs: &[PayrollConfig], lookup: ConfigLookup) -> Option<&PayrollConfig> {
    match lookup {
        ConfigLookup::Active => select_active(configs),
        ConfigLookup::AsOf(date) => select_as_of(configs, date),
    }
}

/// Resolve a config through the store. A missing config is a hard stop;
/// there is no built-in fallback ruleset.
pub async fn resolve(store: &dyn ConfigStore, lookup: ConfigLookup) -> PayrollResult<PayrollConfig> {
    let found = match lookup {
        ConfigLookup::Active => store.get_active_config().await?,
        ConfigLookup::AsOf(date) => store.get_config_as_of(date).await?,
    };
    found.ok_or(PayrollError::ConfigNotFound)
}
