use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Destination backends with their own classification rules and value ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    /// Columnar warehouse (Google BigQuery).
    Bigquery,
    /// Row-store OLTP database (MySQL).
    Mysql,
    /// Row-store OLTP database with a richer type system (PostgreSQL).
    Postgresql,
}

impl Backend {
    pub const ALL: [Backend; 3] = [Backend::Bigquery, Backend::Mysql, Backend::Postgresql];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bigquery => "bigquery",
            Self::Mysql => "mysql",
            Self::Postgresql => "postgresql",
        }
    }

    /// First value handed to `id`-tagged columns when the run does not override it.
    ///
    /// The warehouse numbers rows from zero; both row stores start at one so
    /// generated ids line up with their serial/auto-increment conventions.
    pub fn default_id_base(self) -> i64 {
        match self {
            Self::Bigquery => 0,
            Self::Mysql | Self::Postgresql => 1,
        }
    }

    /// Whether rows can be pushed one at a time with an inter-row delay.
    pub fn supports_streaming(self) -> bool {
        matches!(self, Self::Bigquery)
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Backend {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "bigquery" | "bq" | "google bigquery" => Ok(Self::Bigquery),
            "mysql" => Ok(Self::Mysql),
            "postgresql" | "postgres" | "pg" => Ok(Self::Postgresql),
            other => Err(Error::UnsupportedBackend(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_aliases() {
        assert_eq!("BQ".parse::<Backend>().ok(), Some(Backend::Bigquery));
        assert_eq!("postgres".parse::<Backend>().ok(), Some(Backend::Postgresql));
        assert_eq!("MySQL".parse::<Backend>().ok(), Some(Backend::Mysql));
        assert!(matches!(
            "oracle".parse::<Backend>(),
            Err(Error::UnsupportedBackend(name)) if name == "oracle"
        ));
    }

    #[test]
    fn id_bases_differ_between_warehouse_and_row_stores() {
        assert_eq!(Backend::Bigquery.default_id_base(), 0);
        assert_eq!(Backend::Mysql.default_id_base(), 1);
        assert_eq!(Backend::Postgresql.default_id_base(), 1);
    }

    #[test]
    fn only_the_warehouse_streams() {
        let streaming: Vec<_> = Backend::ALL
            .into_iter()
            .filter(|backend| backend.supports_streaming())
            .collect();
        assert_eq!(streaming, vec![Backend::Bigquery]);
    }

    #[test]
    fn serializes_snake_case() {
        let encoded = serde_json::to_string(&Backend::Postgresql).expect("encode");
        assert_eq!(encoded, "\"postgresql\"");
    }
}
