use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use log::debug;

use super::Pattern;
use crate::config::PatternConfig;
use crate::error::CatalogError;

pub const PRIORITY_MIN: u8 = 1;
pub const PRIORITY_MAX: u8 = 10;

/// Registry of patterns keyed by id.
///
/// Patterns are shared, immutable values. Configuration lives in side tables
/// next to them, so a catalog can be re-configured (or cloned with a different
/// configuration) without touching any pattern.
#[derive(Clone, Default)]
pub struct PatternCatalog {
    patterns: Arc<BTreeMap<String, Arc<dyn Pattern>>>,
    priority_overrides: BTreeMap<String, u8>,
    disabled: BTreeSet<String>,
    custom_settings: BTreeMap<String, serde_json::Value>,
}

impl PatternCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, pattern: Arc<dyn Pattern>) -> Result<(), CatalogError> {
        let meta = pattern.meta();
        if !(PRIORITY_MIN..=PRIORITY_MAX).contains(&meta.priority) {
            return Err(CatalogError::InvalidPriority {
                id: meta.id.clone(),
                priority: meta.priority,
            });
        }
        if self.patterns.contains_key(&meta.id) {
            return Err(CatalogError::DuplicatePattern(meta.id.clone()));
        }
        let id = meta.id.clone();
        Arc::make_mut(&mut self.patterns).insert(id, pattern);
        Ok(())
    }

    /// Replace the side tables with the ones described by `config`.
    /// Priority overrides outside 1..=10 are dropped.
    pub fn apply_config(&mut self, config: &PatternConfig) {
        self.disabled = config.disabled.iter().cloned().collect();

        self.priority_overrides.clear();
        for (id, raw) in &config.priority_overrides {
            match raw.as_i64() {
                Some(p) if (PRIORITY_MIN as i64..=PRIORITY_MAX as i64).contains(&p) => {
                    self.priority_overrides.insert(id.clone(), p as u8);
                }
                _ => debug!("ignoring priority override {raw} for pattern '{id}'"),
            }
        }

        self.custom_settings = config.custom_settings.clone();
    }

    /// A snapshot sharing this catalog's patterns under a different configuration.
    pub fn with_config(&self, config: &PatternConfig) -> Self {
        let mut snapshot = Self {
            patterns: Arc::clone(&self.patterns),
            ..Self::default()
        };
        snapshot.apply_config(config);
        snapshot
    }

    pub fn effective_priority(&self, pattern: &dyn Pattern) -> u8 {
        self.priority_overrides
            .get(pattern.id())
            .copied()
            .unwrap_or(pattern.meta().priority)
    }

    pub fn is_pattern_disabled(&self, id: &str) -> bool {
        self.disabled.contains(id)
    }

    pub fn settings_for(&self, id: &str) -> Option<&serde_json::Value> {
        self.custom_settings.get(id)
    }

    pub fn get(&self, id: &str) -> Option<&Arc<dyn Pattern>> {
        self.patterns.get(id)
    }

    /// Patterns in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Pattern>> {
        self.patterns.values()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

impl fmt::Debug for PatternCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PatternCatalog")
            .field("patterns", &self.patterns.keys().collect::<Vec<_>>())
            .field("priority_overrides", &self.priority_overrides)
            .field("disabled", &self.disabled)
            .finish()
    }
}
