use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use rowforge_core::Backend;

use crate::faker_rs::LocaleKey;
use crate::planner::ClassificationFailure;

pub const DEFAULT_TIMEZONE: &str = "Asia/Kolkata";

/// Options for the generation engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerateOptions {
    /// Fixed RNG seed. A fresh seed is drawn when unset.
    pub seed: Option<u64>,
    /// First id handed out. Defaults to the backend's base.
    pub id_start: Option<i64>,
    /// Locale of fake-data text.
    pub locale: LocaleKey,
    /// IANA zone used for zoned timestamps.
    pub timezone: String,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            seed: None,
            id_start: None,
            locale: LocaleKey::default(),
            timezone: DEFAULT_TIMEZONE.to_string(),
        }
    }
}

/// Report for a generation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationReport {
    pub backend: Backend,
    pub seed: u64,
    pub rows_generated: u64,
    pub failures: Vec<ClassificationFailure>,
    pub generator_usage: BTreeMap<String, u64>,
    pub recoverable_errors: u64,
}

impl GenerationReport {
    pub fn new(backend: Backend, seed: u64) -> Self {
        Self {
            backend,
            seed,
            rows_generated: 0,
            failures: Vec::new(),
            generator_usage: BTreeMap::new(),
            recoverable_errors: 0,
        }
    }

    pub fn record_generator_usage(&mut self, id: &str) {
        *self.generator_usage.entry(id.to_string()).or_insert(0) += 1;
    }

    pub fn errors_occurred(&self) -> bool {
        !self.failures.is_empty() || self.recoverable_errors > 0
    }
}
