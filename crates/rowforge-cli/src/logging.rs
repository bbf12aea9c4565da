use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::prelude::*;

use crate::CliError;
use crate::config::LoggingConfig;

pub const LOG_FILE_NAME: &str = "rowforge.log";

/// Start run logging: JSON lines into `<dir>/rowforge.log`, warnings on stderr.
///
/// The log file is truncated so it only holds the latest run. `RUST_LOG`
/// overrides the configured level.
pub fn init_run_logging(config: &LoggingConfig) -> Result<PathBuf, CliError> {
    fs::create_dir_all(&config.dir)?;
    let path = config.dir.join(LOG_FILE_NAME);
    let file = open_truncated(&path)?;
    let file = Arc::new(Mutex::new(file));

    let make_writer = BoxMakeWriter::new(move || SharedWriter {
        file: Arc::clone(&file),
    });

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|err| CliError::InvalidConfig(format!("logging.level: {err}")))?;

    let file_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_timer(UtcTime::rfc_3339())
        .with_writer(make_writer)
        .with_filter(filter);

    let console_layer = tracing_subscriber::fmt::layer()
        .compact()
        .with_target(false)
        .with_writer(io::stderr)
        .with_filter(LevelFilter::WARN);

    tracing_subscriber::registry()
        .with(file_layer)
        .with(console_layer)
        .try_init()
        .map_err(|err| CliError::Logging(err.to_string()))?;

    Ok(path)
}

fn open_truncated(path: &Path) -> io::Result<fs::File> {
    OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)
}

struct SharedWriter {
    file: Arc<Mutex<fs::File>>,
}

impl Write for SharedWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut file = self
            .file
            .lock()
            .map_err(|_| io::Error::other("failed to lock log file"))?;
        file.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut file = self
            .file
            .lock()
            .map_err(|_| io::Error::other("failed to lock log file"))?;
        file.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn previous_run_is_discarded() {
        let dir = std::env::temp_dir().join(format!("rowforge-log-{}", std::process::id()));
        fs::create_dir_all(&dir).expect("dir");
        let path = dir.join(LOG_FILE_NAME);
        fs::write(&path, "old run\n").expect("seed");

        let mut file = open_truncated(&path).expect("open");
        file.write_all(b"new run\n").expect("write");
        drop(file);

        assert_eq!(fs::read_to_string(&path).expect("read"), "new run\n");
        fs::remove_dir_all(&dir).ok();
    }
}
