use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use rowforge_core::{Backend, TableRef};
use rowforge_destinations::{
    DdlExecutor, Destination, DestinationError, DestinationWriter, Result, RunSettings,
    SchemaSource, SinkMode, run,
};
use rowforge_generate::{GenerateOptions, GeneratedValue, Row};

#[derive(Default)]
struct Recorded {
    scripts: Vec<String>,
    truncated: Vec<String>,
    batches: Vec<Vec<Row>>,
    inserts: u64,
    width_lookups: Vec<String>,
}

/// In-memory destination with scripted failures.
struct FakeDestination {
    backend: Backend,
    streaming: bool,
    columns: Vec<String>,
    bit_widths: BTreeMap<String, u32>,
    failing_inserts: BTreeSet<u64>,
    fail_ddl: bool,
    recorded: Mutex<Recorded>,
}

impl FakeDestination {
    fn new(backend: Backend, columns: &[&str]) -> Self {
        Self {
            backend,
            streaming: backend.supports_streaming(),
            columns: columns.iter().map(|name| name.to_string()).collect(),
            bit_widths: BTreeMap::new(),
            failing_inserts: BTreeSet::new(),
            fail_ddl: false,
            recorded: Mutex::new(Recorded::default()),
        }
    }

    fn recorded<T>(&self, read: impl FnOnce(&Recorded) -> T) -> T {
        read(&self.recorded.lock().expect("lock"))
    }
}

#[async_trait]
impl SchemaSource for FakeDestination {
    async fn column_names(&self, _table: &TableRef) -> Result<Vec<String>> {
        Ok(self.columns.clone())
    }

    async fn bit_width(&self, _table: &TableRef, column: &str) -> Result<u32> {
        self.recorded.lock().expect("lock").width_lookups.push(column.to_string());
        self.bit_widths
            .get(column)
            .copied()
            .ok_or_else(|| DestinationError::Unsupported(column.to_string()))
    }
}

#[async_trait]
impl DdlExecutor for FakeDestination {
    async fn execute_script(&self, script: &str) -> Result<()> {
        if self.fail_ddl {
            return Err(DestinationError::Provisioning("syntax error".to_string()));
        }
        self.recorded.lock().expect("lock").scripts.push(script.to_string());
        Ok(())
    }

    async fn truncate_and_alter(&self, table: &TableRef, alter: &str) -> Result<()> {
        let mut recorded = self.recorded.lock().expect("lock");
        recorded.truncated.push(table.to_string());
        recorded.scripts.push(alter.to_string());
        Ok(())
    }
}

#[async_trait]
impl DestinationWriter for FakeDestination {
    async fn append_rows(&self, _table: &TableRef, rows: &[Row]) -> Result<u64> {
        self.recorded.lock().expect("lock").batches.push(rows.to_vec());
        Ok(rows.len() as u64)
    }

    async fn insert_row(&self, _table: &TableRef, _row: &Row) -> Result<()> {
        let mut recorded = self.recorded.lock().expect("lock");
        let attempt = recorded.inserts;
        recorded.inserts += 1;
        if self.failing_inserts.contains(&attempt) {
            return Err(DestinationError::Api {
                status: 500,
                message: "backend unavailable".to_string(),
            });
        }
        Ok(())
    }
}

impl Destination for FakeDestination {
    fn kind(&self) -> &'static str {
        "fake"
    }

    fn backend(&self) -> Backend {
        self.backend
    }

    fn supports_streaming(&self) -> bool {
        self.streaming
    }
}

fn settings(count: u64) -> RunSettings {
    let mut settings = RunSettings::new(TableRef::qualified("analytics", "users"), count);
    settings.generation = GenerateOptions {
        seed: Some(42),
        ..GenerateOptions::default()
    };
    settings
}

#[tokio::test]
async fn batch_writes_every_row_in_one_append() {
    let destination = FakeDestination::new(
        Backend::Mysql,
        &["id", "user_name", "created_timestamp", "is_active"],
    );
    let report = run(&destination, &settings(25)).await.expect("run");

    assert!(!report.errors_occurred());
    assert_eq!(report.sink.written, 25);
    destination.recorded(|recorded| {
        assert_eq!(recorded.batches.len(), 1);
        let rows = &recorded.batches[0];
        assert_eq!(rows.len(), 25);
        assert_eq!(rows[0].get("id"), Some(&GeneratedValue::Int(1)));
        assert_eq!(rows[24].get("id"), Some(&GeneratedValue::Int(25)));
    });
}

#[tokio::test]
async fn streaming_attempts_every_row_despite_failures() {
    let mut destination = FakeDestination::new(Backend::Bigquery, &["id", "phone"]);
    destination.failing_inserts = [1, 3].into_iter().collect();
    let mut settings = settings(6);
    settings.mode = SinkMode::Streaming {
        delay: Duration::from_millis(1),
    };

    let started = Instant::now();
    let report = run(&destination, &settings).await.expect("run");

    assert!(started.elapsed() >= Duration::from_millis(6));
    assert_eq!(report.sink.attempted, 6);
    assert_eq!(report.sink.written, 4);
    assert_eq!(report.sink.failed, 2);
    assert!(report.errors_occurred());
    destination.recorded(|recorded| {
        assert_eq!(recorded.inserts, 6);
        assert!(recorded.batches.is_empty());
    });
}

#[tokio::test]
async fn streaming_count_ignores_failed_columns() {
    let destination = FakeDestination::new(Backend::Bigquery, &["id", "xyzzy_unmappable"]);
    let mut settings = settings(3);
    settings.mode = SinkMode::Streaming {
        delay: Duration::from_millis(1),
    };
    let report = run(&destination, &settings).await.expect("run");

    assert_eq!(report.sink.attempted, 3);
    assert!(report.errors_occurred());
    assert_eq!(report.generation.failures[0].column, "xyzzy_unmappable");
}

#[tokio::test]
async fn streaming_is_rejected_for_row_stores() {
    let destination = FakeDestination::new(Backend::Postgresql, &["id"]);
    let mut settings = settings(3);
    settings.mode = SinkMode::Streaming {
        delay: Duration::from_millis(1),
    };
    let err = run(&destination, &settings).await.expect_err("no streaming");
    assert!(matches!(err, DestinationError::Config(_)));
    destination.recorded(|recorded| assert_eq!(recorded.inserts, 0));
}

#[tokio::test]
async fn missing_table_aborts_the_run() {
    let destination = FakeDestination::new(Backend::Mysql, &[]);
    let err = run(&destination, &settings(3)).await.expect_err("no columns");
    assert!(matches!(err, DestinationError::TableNotFound(table) if table == "analytics.users"));
    destination.recorded(|recorded| assert!(recorded.batches.is_empty()));
}

#[tokio::test]
async fn ddl_failure_aborts_before_writing() {
    let mut destination = FakeDestination::new(Backend::Postgresql, &["id"]);
    destination.fail_ddl = true;
    let mut settings = settings(3);
    settings.ddl = Some("create table users (id int)".to_string());

    let err = run(&destination, &settings).await.expect_err("ddl fails");
    assert!(matches!(err, DestinationError::Provisioning(_)));
    destination.recorded(|recorded| assert!(recorded.batches.is_empty()));
}

#[tokio::test]
async fn provisioning_runs_ddl_then_schema_update() {
    let destination = FakeDestination::new(Backend::Postgresql, &["id"]);
    let mut settings = settings(2);
    settings.ddl = Some("create table users (id int)".to_string());
    settings.schema_update = Some("alter table users add column note text".to_string());

    run(&destination, &settings).await.expect("run");
    destination.recorded(|recorded| {
        assert_eq!(
            recorded.scripts,
            vec![
                "create table users (id int)".to_string(),
                "alter table users add column note text".to_string(),
            ]
        );
        assert_eq!(recorded.truncated, vec!["analytics.users".to_string()]);
    });
}

#[tokio::test]
async fn bit_widths_are_fetched_only_for_bit_columns() {
    let mut destination = FakeDestination::new(Backend::Postgresql, &["id", "bit_flag", "is_active"]);
    destination.bit_widths.insert("bit_flag".to_string(), 8);

    let report = run(&destination, &settings(4)).await.expect("run");
    assert!(!report.errors_occurred());
    destination.recorded(|recorded| {
        assert_eq!(recorded.width_lookups, vec!["bit_flag".to_string()]);
        for row in &recorded.batches[0] {
            let bits = row.get("bit_flag").and_then(GeneratedValue::as_str).expect("bits");
            assert_eq!(bits.len(), 8);
        }
    });
}

#[tokio::test]
async fn unknown_bit_width_drops_the_column() {
    let destination = FakeDestination::new(Backend::Postgresql, &["id", "bit_flag"]);
    let report = run(&destination, &settings(2)).await.expect("run");

    assert!(report.errors_occurred());
    destination.recorded(|recorded| {
        assert!(recorded.batches[0].iter().all(|row| row.get("bit_flag").is_none()));
    });
}

#[tokio::test]
async fn invalid_table_names_are_rejected() {
    let destination = FakeDestination::new(Backend::Mysql, &["id"]);
    let settings = RunSettings::new(TableRef::new("users; drop table x"), 1);
    let err = run(&destination, &settings).await.expect_err("invalid identifier");
    assert!(matches!(err, DestinationError::Core(_)));
}

#[tokio::test]
async fn id_overflow_aborts_before_writing() {
    let destination = FakeDestination::new(Backend::Bigquery, &["id", "user_name"]);
    let mut settings = settings(3);
    settings.generation.id_start = Some(i64::MAX - 1);

    let err = run(&destination, &settings).await.expect_err("ids overflow");
    assert!(matches!(
        err,
        DestinationError::Generation(rowforge_generate::GenerationError::InvalidOptions(_))
    ));
    destination.recorded(|recorded| assert!(recorded.batches.is_empty()));
}

fn csv_path(name: &str) -> std::path::PathBuf {
    std::env::temp_dir()
        .join(format!("rowforge-csv-{}", std::process::id()))
        .join(name)
}

#[tokio::test]
async fn csv_header_uses_planned_columns_without_rows() {
    let path = csv_path("empty.csv");
    let columns = ["id", "xyzzy_unmappable", "user_name"].map(str::to_string).to_vec();
    let destination = rowforge_destinations::CsvDestination::new(&path, columns, Backend::Postgresql);

    let report = run(&destination, &settings(0)).await.expect("run");
    assert_eq!(report.sink.written, 0);
    let contents = std::fs::read_to_string(&path).expect("csv written");
    assert_eq!(contents.lines().collect::<Vec<_>>(), vec!["id,user_name"]);
    let _ = std::fs::remove_file(&path);
}

#[tokio::test]
async fn csv_header_skips_unplanned_columns_with_rows() {
    let path = csv_path("rows.csv");
    let columns = ["id", "xyzzy_unmappable", "user_name"].map(str::to_string).to_vec();
    let destination = rowforge_destinations::CsvDestination::new(&path, columns, Backend::Postgresql);

    let report = run(&destination, &settings(2)).await.expect("run");
    assert_eq!(report.sink.written, 2);
    let contents = std::fs::read_to_string(&path).expect("csv written");
    let lines: Vec<_> = contents.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "id,user_name");
    assert!(lines[1].starts_with("1,"));
    let _ = std::fs::remove_file(&path);
}
