use std::time::Duration;

use serde::Serialize;
use tracing::{error, info};

use rowforge_core::TableRef;
use rowforge_generate::GenerationEngine;

use crate::adapter::DestinationWriter;
use crate::errors::Result;

/// Counts reported by a sink after draining the engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SinkOutcome {
    pub attempted: u64,
    pub written: u64,
    pub failed: u64,
}

/// Buffers every row, then writes them in one bulk append. Failure is fatal.
#[derive(Debug, Clone, Copy, Default)]
pub struct BatchSink;

impl BatchSink {
    pub async fn write<W: DestinationWriter + ?Sized>(
        &self,
        writer: &W,
        table: &TableRef,
        engine: &mut GenerationEngine,
        count: u64,
    ) -> Result<SinkOutcome> {
        let columns = engine.column_names();
        let rows: Vec<_> = engine.rows(count).collect();
        let written = writer.append_planned_rows(table, &columns, &rows).await?;
        info!(event = "batch_written", table = %table, rows = rows.len(), written);
        Ok(SinkOutcome {
            attempted: rows.len() as u64,
            written,
            failed: 0,
        })
    }
}

/// One insert per row followed by a fixed pause.
///
/// A failed insert is logged and counted; the run goes on and the pause still applies.
#[derive(Debug, Clone, Copy)]
pub struct StreamingSink {
    pub delay: Duration,
}

impl StreamingSink {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub async fn write<W: DestinationWriter + ?Sized>(
        &self,
        writer: &W,
        table: &TableRef,
        engine: &mut GenerationEngine,
        count: u64,
    ) -> Result<SinkOutcome> {
        let mut outcome = SinkOutcome::default();
        for index in 0..count {
            let row = engine.next_row();
            outcome.attempted += 1;
            match writer.insert_row(table, &row).await {
                Ok(()) => outcome.written += 1,
                Err(err) => {
                    error!(event = "row_stream_failed", table = %table, row = index, error = %err);
                    engine.record_error();
                    outcome.failed += 1;
                }
            }
            tokio::time::sleep(self.delay).await;
        }
        info!(
            event = "stream_finished",
            table = %table,
            written = outcome.written,
            failed = outcome.failed
        );
        Ok(outcome)
    }
}
