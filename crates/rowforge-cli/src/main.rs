mod config;
mod logging;
mod status;

use std::path::PathBuf;
use std::process::ExitCode;

use chrono::Local;
use clap::{Args, Parser, Subcommand, ValueEnum};
use thiserror::Error;

use config::{ACCESS_TOKEN_ENV, Config, ConfigError};
use rowforge_core::{Backend, redact_connection_string, redact_secret};
use rowforge_destinations::{
    BigQueryDestination, BigQueryOptions, CsvDestination, Destination, DestinationError,
    MySqlDestination, PostgresDestination, RunReport, RunSettings,
};
use rowforge_generate::{Classifier, FakerCatalog, GenerationError, LocaleKey};
use status::RunStatus;

#[derive(Debug, Error)]
enum CliError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("destination error: {0}")]
    Destination(#[from] DestinationError),
    #[error("generation error: {0}")]
    Generation(#[from] GenerationError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("logging error: {0}")]
    Logging(String),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

#[derive(Parser, Debug)]
#[command(name = "rowforge", version, about = "Synthetic row generator for SQL destinations")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate rows for every configured destination.
    Run(RunArgs),
    /// Show how column names would be classified.
    Classify(ClassifyArgs),
    /// List the fake-data capabilities used as fallbacks.
    Capabilities(CapabilitiesArgs),
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Path to the TOML configuration.
    #[arg(long, default_value = "rowforge.toml")]
    config: PathBuf,
    /// Run only these destinations.
    #[arg(long, value_enum, value_delimiter = ',')]
    only: Vec<Target>,
    /// Print each run report as JSON on stdout.
    #[arg(long, default_value_t = false)]
    json: bool,
}

#[derive(Args, Debug)]
struct ClassifyArgs {
    /// Backend whose rules apply.
    #[arg(long)]
    backend: Backend,
    /// Column names to classify.
    #[arg(required = true)]
    columns: Vec<String>,
}

#[derive(Args, Debug)]
struct CapabilitiesArgs {
    /// Locale used for the sample values.
    #[arg(long, default_value = "en_US")]
    locale: LocaleKey,
    /// Also print one sample value per capability.
    #[arg(long, default_value_t = false)]
    samples: bool,
}

/// Destinations in the order a run visits them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Target {
    Bigquery,
    Mysql,
    Postgresql,
    Csv,
}

impl Target {
    const ORDER: [Target; 4] = [
        Target::Bigquery,
        Target::Mysql,
        Target::Postgresql,
        Target::Csv,
    ];

    fn name(self) -> &'static str {
        match self {
            Target::Bigquery => "bigquery",
            Target::Mysql => "mysql",
            Target::Postgresql => "postgresql",
            Target::Csv => "csv",
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Run(args) => run_all(args).await,
        Command::Classify(args) => classify(args).map(|()| RunStatus::Success),
        Command::Capabilities(args) => capabilities(args).map(|()| RunStatus::Success),
    };

    let status = match result {
        Ok(status) => status,
        Err(err) => {
            tracing::error!(event = "run_aborted", error = %err);
            eprintln!("error: {err}");
            RunStatus::Aborted
        }
    };
    ExitCode::from(status.exit_code())
}

async fn run_all(args: RunArgs) -> Result<RunStatus, CliError> {
    let result = run_configured(args).await;
    let status = match &result {
        Ok(status) => *status,
        Err(_) => RunStatus::Aborted,
    };
    tracing::info!(event = "cli_finished", exit_code = status.exit_code());
    println!("{}", status.line(Local::now()));
    result
}

async fn run_configured(args: RunArgs) -> Result<RunStatus, CliError> {
    let RunArgs { config, only, json } = args;
    let config = Config::load(&config)?;
    let log_path = logging::init_run_logging(&config.logging)?;
    tracing::info!(event = "cli_started", log = %log_path.display());
    run_destinations(&config, &only, json).await
}

async fn run_destinations(
    config: &Config,
    only: &[Target],
    json: bool,
) -> Result<RunStatus, CliError> {
    if config.is_empty() {
        return Err(CliError::InvalidConfig(
            "no destination section is configured".to_string(),
        ));
    }

    let mut errors_occurred = false;
    for target in Target::ORDER {
        if !only.is_empty() && !only.contains(&target) {
            continue;
        }
        let Some((destination, settings)) = open_destination(config, target).await? else {
            continue;
        };
        let report = rowforge_destinations::run(destination.as_ref(), &settings)
            .await
            .map_err(|err| {
                tracing::error!(
                    event = "destination_failed",
                    destination = target.name(),
                    error = %err
                );
                err
            })?;
        errors_occurred |= report.errors_occurred();
        print_report(&report, json)?;
    }

    Ok(RunStatus::from_errors(errors_occurred))
}

/// Connect to a configured destination. `None` when its section is absent.
async fn open_destination(
    config: &Config,
    target: Target,
) -> Result<Option<(Box<dyn Destination>, RunSettings)>, CliError> {
    let opened: (Box<dyn Destination>, RunSettings) = match target {
        Target::Bigquery => {
            let Some(section) = &config.bigquery else {
                return Ok(None);
            };
            let access_token =
                section.resolve_access_token(std::env::var(ACCESS_TOKEN_ENV).ok())?;
            tracing::info!(
                event = "destination_opened",
                destination = target.name(),
                project = %section.project,
                token = %redact_secret(&access_token),
                streaming = section.streaming
            );
            let destination = BigQueryDestination::new(BigQueryOptions {
                project: section.project.clone(),
                access_token,
                api_base: section.api_base.clone(),
            });
            (Box::new(destination), section.run_settings())
        }
        Target::Mysql => {
            let Some(section) = &config.mysql else {
                return Ok(None);
            };
            tracing::info!(
                event = "destination_opened",
                destination = target.name(),
                url = %redact_connection_string(&section.url)
            );
            let destination = MySqlDestination::connect(&section.url).await?;
            (Box::new(destination), section.run_settings())
        }
        Target::Postgresql => {
            let Some(section) = &config.postgresql else {
                return Ok(None);
            };
            tracing::info!(
                event = "destination_opened",
                destination = target.name(),
                url = %redact_connection_string(&section.url)
            );
            let destination = PostgresDestination::connect(&section.url).await?;
            (Box::new(destination), section.run_settings())
        }
        Target::Csv => {
            let Some(section) = &config.csv else {
                return Ok(None);
            };
            tracing::info!(
                event = "destination_opened",
                destination = target.name(),
                path = %section.path.display(),
                profile = %section.profile
            );
            let destination =
                CsvDestination::new(&section.path, section.columns.clone(), section.profile)
                    .with_bit_widths(section.bit_widths.clone());
            (Box::new(destination), section.run_settings())
        }
    };
    Ok(Some(opened))
}

fn print_report(report: &RunReport, json: bool) -> Result<(), CliError> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }
    println!(
        "{} {}: {} of {} rows written (seed {})",
        report.destination,
        report.table,
        report.sink.written,
        report.sink.attempted,
        report.generation.seed
    );
    for failure in &report.generation.failures {
        println!("  skipped column {}: {}", failure.column, failure.reason);
    }
    Ok(())
}

fn classify(args: ClassifyArgs) -> Result<(), CliError> {
    let catalog = FakerCatalog::default();
    let classifier = Classifier::new(args.backend, &catalog)?;
    for column in &args.columns {
        match classifier.classify(column) {
            Ok(classification) => println!("{column}\t{}", classification.label()),
            Err(err) => println!("{column}\t-\t{err}"),
        }
    }
    Ok(())
}

fn capabilities(args: CapabilitiesArgs) -> Result<(), CliError> {
    let catalog = FakerCatalog::new(args.locale);
    if !args.samples {
        for name in catalog.names() {
            println!("{name}");
        }
        return Ok(());
    }

    let mut rng = rand::rng();
    for name in catalog.names() {
        let value = catalog.produce(name, &mut rng)?;
        println!("{name}\t{}", value.to_csv());
    }
    Ok(())
}
