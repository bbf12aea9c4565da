//! Column classification and synthetic value generation for rowforge.
//!
//! Column names are classified into semantic tags (or a fake-data capability)
//! once per run, then a [`GenerationEngine`] turns the resulting
//! [`ColumnPlan`] into rows.

pub mod classifier;
pub mod engine;
pub mod errors;
pub mod faker_rs;
pub mod generators;
pub mod model;
pub mod output;
pub mod planner;

pub use classifier::{Classification, Classifier, RULES_VERSION};
pub use engine::{GenerationEngine, Rows};
pub use errors::GenerationError;
pub use faker_rs::{FakerCatalog, LocaleKey};
pub use generators::{GeneratedValue, Row, SemanticTag};
pub use model::{GenerateOptions, GenerationReport};
pub use planner::{ClassificationFailure, ColumnGenerator, ColumnPlan, PlannedColumn};
