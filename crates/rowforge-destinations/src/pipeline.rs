use std::time::Duration;

use serde::Serialize;
use tracing::{error, info};

use rowforge_core::{Backend, ColumnDescriptor, TableRef};
use rowforge_generate::{
    Classifier, ColumnPlan, FakerCatalog, GenerateOptions, GenerationEngine, GenerationReport,
};

use crate::adapter::Destination;
use crate::errors::{DestinationError, Result};
use crate::sink::{BatchSink, SinkOutcome, StreamingSink};

/// How generated rows reach the destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SinkMode {
    #[default]
    Batch,
    Streaming { delay: Duration },
}

/// Everything one destination run needs besides the destination itself.
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub table: TableRef,
    pub record_count: u64,
    pub generation: GenerateOptions,
    /// Table definition run before generation.
    pub ddl: Option<String>,
    /// Schema change applied after truncating the table.
    pub schema_update: Option<String>,
    pub mode: SinkMode,
}

impl RunSettings {
    pub fn new(table: TableRef, record_count: u64) -> Self {
        Self {
            table,
            record_count,
            generation: GenerateOptions::default(),
            ddl: None,
            schema_update: None,
            mode: SinkMode::Batch,
        }
    }
}

/// Outcome of a run that was not aborted.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub destination: &'static str,
    pub backend: Backend,
    pub table: String,
    pub sink: SinkOutcome,
    pub generation: GenerationReport,
}

impl RunReport {
    /// True when a column was dropped or a streamed row failed.
    pub fn errors_occurred(&self) -> bool {
        self.generation.errors_occurred() || self.sink.failed > 0
    }
}

/// Provision, classify, generate and write for one destination.
///
/// `Err` means the run was aborted; recoverable failures land in the report.
pub async fn run<D: Destination + ?Sized>(
    destination: &D,
    settings: &RunSettings,
) -> Result<RunReport> {
    let table = &settings.table;
    table.validate()?;
    if matches!(settings.mode, SinkMode::Streaming { .. }) && !destination.supports_streaming() {
        return Err(DestinationError::Config(format!(
            "{} does not support streaming inserts",
            destination.kind()
        )));
    }

    let backend = destination.backend();
    info!(
        event = "run_started",
        destination = destination.kind(),
        backend = %backend,
        table = %table,
        records = settings.record_count
    );

    provision(destination, settings).await?;

    let names = destination.column_names(table).await?;
    if names.is_empty() {
        return Err(DestinationError::TableNotFound(table.to_string()));
    }

    let catalog = FakerCatalog::new(settings.generation.locale);
    let columns = describe_columns(destination, table, backend, &catalog, names).await?;
    let plan = ColumnPlan::build(backend, &columns, &catalog)?;
    for failure in &plan.failures {
        error!(
            event = "classification_failed",
            table = %table,
            column = %failure.column,
            reason = %failure.reason
        );
    }
    info!(
        event = "columns_classified",
        table = %table,
        planned = plan.columns.len(),
        failed = plan.failures.len()
    );

    let mut engine = GenerationEngine::new(&plan, &settings.generation)?;
    engine.ensure_ids_for(settings.record_count)?;
    let sink = match settings.mode {
        SinkMode::Batch => {
            BatchSink
                .write(destination, table, &mut engine, settings.record_count)
                .await?
        }
        SinkMode::Streaming { delay } => {
            StreamingSink::new(delay)
                .write(destination, table, &mut engine, settings.record_count)
                .await?
        }
    };

    let report = RunReport {
        destination: destination.kind(),
        backend,
        table: table.to_string(),
        sink,
        generation: engine.into_report(),
    };
    info!(
        event = "run_finished",
        destination = report.destination,
        table = %table,
        seed = report.generation.seed,
        written = report.sink.written,
        errors_occurred = report.errors_occurred()
    );
    Ok(report)
}

async fn provision<D: Destination + ?Sized>(destination: &D, settings: &RunSettings) -> Result<()> {
    let table = &settings.table;
    if let Some(ddl) = settings.ddl.as_deref() {
        destination
            .prepare_table(table, Some(ddl))
            .await
            .map_err(|err| DestinationError::Provisioning(format!("table definition: {err}")))?;
        info!(event = "table_provisioned", table = %table, step = "ddl");
    }
    if let Some(alter) = settings.schema_update.as_deref() {
        destination
            .truncate_and_alter(table, alter)
            .await
            .map_err(|err| DestinationError::Provisioning(format!("schema update: {err}")))?;
        info!(event = "table_provisioned", table = %table, step = "schema_update");
    }
    Ok(())
}

/// Build descriptors, fetching declared widths only for bit columns.
///
/// A destination that cannot report a width leaves it unset; the plan then
/// records the column as a failure.
async fn describe_columns<D: Destination + ?Sized>(
    destination: &D,
    table: &TableRef,
    backend: Backend,
    catalog: &FakerCatalog,
    names: Vec<String>,
) -> Result<Vec<ColumnDescriptor>> {
    let classifier = Classifier::new(backend, catalog)?;
    let mut columns = Vec::with_capacity(names.len());
    for name in names {
        let needs_width = classifier
            .classify(&name)
            .map(|classification| classification.needs_bit_width())
            .unwrap_or(false);
        let mut column = ColumnDescriptor::new(name);
        if needs_width {
            match destination.bit_width(table, &column.name).await {
                Ok(width) => column.bit_width = Some(width),
                Err(DestinationError::Unsupported(_)) => {}
                Err(err) => return Err(err),
            }
        }
        columns.push(column);
    }
    Ok(columns)
}
