use chrono_tz::Tz;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{info, warn};

use rowforge_core::Backend;

use crate::errors::GenerationError;
use crate::faker_rs::{Capability, FakerCatalog};
use crate::generators::{self, GeneratorContext, Row, SemanticTag, primitives};
use crate::model::{GenerateOptions, GenerationReport};
use crate::planner::{ColumnGenerator, ColumnPlan};

enum Resolved {
    Generator(ColumnGenerator),
    Capability(&'static Capability),
}

struct EngineColumn {
    name: String,
    usage_id: String,
    resolved: Resolved,
}

/// Record assembler: turns a [`ColumnPlan`] into rows.
///
/// Holds the run's RNG and id counter; every row consumes exactly one id.
/// Once the counter passes `i64::MAX` it is exhausted and id columns fail
/// instead of wrapping.
pub struct GenerationEngine {
    backend: Backend,
    columns: Vec<EngineColumn>,
    catalog: FakerCatalog,
    timezone: Tz,
    rng: ChaCha8Rng,
    next_id: Option<i64>,
    report: GenerationReport,
}

impl GenerationEngine {
    pub fn new(plan: &ColumnPlan, options: &GenerateOptions) -> Result<Self, GenerationError> {
        let timezone: Tz = options.timezone.parse().map_err(|_| {
            GenerationError::InvalidOptions(format!("unknown time zone '{}'", options.timezone))
        })?;
        let catalog = FakerCatalog::new(options.locale);

        let columns = plan
            .columns
            .iter()
            .map(|column| {
                let resolved = match column.generator {
                    ColumnGenerator::Capability(name) => Resolved::Capability(
                        catalog
                            .get(name)
                            .ok_or_else(|| GenerationError::UnknownCapability(name.to_string()))?,
                    ),
                    other => Resolved::Generator(other),
                };
                Ok(EngineColumn {
                    name: column.name.clone(),
                    usage_id: column.generator.id(),
                    resolved,
                })
            })
            .collect::<Result<Vec<_>, GenerationError>>()?;

        let seed = options.seed.unwrap_or_else(|| rand::rng().random());
        let next_id = Some(
            options
                .id_start
                .unwrap_or_else(|| plan.backend.default_id_base()),
        );

        let mut report = GenerationReport::new(plan.backend, seed);
        report.failures = plan.failures.clone();

        info!(
            event = "generation_started",
            backend = %plan.backend,
            seed,
            seeded = options.seed.is_some(),
            columns = columns.len(),
            failed_columns = plan.failures.len(),
            locale = %options.locale
        );

        Ok(Self {
            backend: plan.backend,
            columns,
            catalog,
            timezone,
            rng: ChaCha8Rng::seed_from_u64(seed),
            next_id,
            report,
        })
    }

    pub fn seed(&self) -> u64 {
        self.report.seed
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|column| column.name.clone()).collect()
    }

    /// Assemble the next row and advance the id counter.
    pub fn next_row(&mut self) -> Row {
        let ctx = GeneratorContext {
            backend: self.backend,
            catalog: &self.catalog,
            timezone: self.timezone,
            row_id: self.next_id.unwrap_or(i64::MAX),
        };
        let mut row = Row::with_capacity(self.columns.len());

        for column in &self.columns {
            let value = match &column.resolved {
                Resolved::Capability(capability) => {
                    Ok(capability.produce(self.catalog.locale(), &mut self.rng))
                }
                Resolved::Generator(ColumnGenerator::Bits(width)) => {
                    Ok(primitives::bits(*width, &mut self.rng))
                }
                Resolved::Generator(ColumnGenerator::Tag(SemanticTag::Id))
                    if self.next_id.is_none() =>
                {
                    Err(GenerationError::InvalidOptions(
                        "id counter exhausted".to_string(),
                    ))
                }
                Resolved::Generator(ColumnGenerator::Tag(tag)) => {
                    generators::generate(*tag, &ctx, &mut self.rng)
                }
                Resolved::Generator(ColumnGenerator::Capability(name)) => {
                    Err(GenerationError::UnknownCapability(name.to_string()))
                }
            };
            match value {
                Ok(value) => {
                    self.report.record_generator_usage(&column.usage_id);
                    row.push(column.name.clone(), value);
                }
                Err(err) => {
                    warn!(
                        event = "value_generation_failed",
                        column = %column.name,
                        error = %err
                    );
                    self.report.recoverable_errors += 1;
                }
            }
        }

        self.next_id = self.next_id.and_then(|id| id.checked_add(1));
        self.report.rows_generated += 1;
        row
    }

    /// Fail when the id counter cannot hand out `count` more ids.
    ///
    /// Plans without an id column never run out.
    pub fn ensure_ids_for(&self, count: u64) -> Result<(), GenerationError> {
        let has_id = self.columns.iter().any(|column| {
            matches!(
                column.resolved,
                Resolved::Generator(ColumnGenerator::Tag(SemanticTag::Id))
            )
        });
        if !has_id || count == 0 {
            return Ok(());
        }
        let last = self.next_id.and_then(|start| {
            i64::try_from(count - 1)
                .ok()
                .and_then(|offset| start.checked_add(offset))
        });
        match last {
            Some(_) => Ok(()),
            None => Err(GenerationError::InvalidOptions(format!(
                "id counter starting at {} cannot cover {count} rows",
                self.next_id
                    .map_or_else(|| "exhausted".to_string(), |id| id.to_string())
            ))),
        }
    }

    /// Lazy iterator over exactly `count` rows.
    pub fn rows(&mut self, count: u64) -> Rows<'_> {
        Rows {
            engine: self,
            remaining: count,
        }
    }

    /// Note a recoverable failure that happened outside generation.
    pub fn record_error(&mut self) {
        self.report.recoverable_errors += 1;
    }

    pub fn errors_occurred(&self) -> bool {
        self.report.errors_occurred()
    }

    pub fn report(&self) -> &GenerationReport {
        &self.report
    }

    pub fn into_report(self) -> GenerationReport {
        self.report
    }
}

/// Iterator returned by [`GenerationEngine::rows`].
pub struct Rows<'a> {
    engine: &'a mut GenerationEngine,
    remaining: u64,
}

impl Iterator for Rows<'_> {
    type Item = Row;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        Some(self.engine.next_row())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = usize::try_from(self.remaining).unwrap_or(usize::MAX);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Rows<'_> {}
