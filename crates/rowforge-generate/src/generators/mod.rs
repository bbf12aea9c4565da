use std::fmt;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use chrono_tz::Tz;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use rowforge_core::Backend;

use crate::errors::GenerationError;
use crate::faker_rs::FakerCatalog;

pub mod primitives;
pub mod semantic;

/// Generated value for a column.
#[derive(Debug, Clone, PartialEq)]
pub enum GeneratedValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
    Date(NaiveDate),
    Time(NaiveTime),
    Timestamp(NaiveDateTime),
    TimestampTz(DateTime<FixedOffset>),
}

impl GeneratedValue {
    pub fn to_csv(&self) -> String {
        match self {
            GeneratedValue::Bool(value) => value.to_string(),
            GeneratedValue::Int(value) => value.to_string(),
            GeneratedValue::Float(value) => value.to_string(),
            GeneratedValue::Text(value) => value.clone(),
            GeneratedValue::Bytes(value) => BASE64.encode(value),
            GeneratedValue::Date(value) => value.format("%Y-%m-%d").to_string(),
            GeneratedValue::Time(value) => value.format("%H:%M:%S").to_string(),
            GeneratedValue::Timestamp(value) => value.format("%Y-%m-%dT%H:%M:%S").to_string(),
            GeneratedValue::TimestampTz(value) => value.to_rfc3339(),
        }
    }

    /// JSON form used by the HTTP and `jsonb` writers. Bytes are base64 encoded.
    pub fn to_json(&self) -> Value {
        match self {
            GeneratedValue::Bool(value) => Value::Bool(*value),
            GeneratedValue::Int(value) => Value::from(*value),
            GeneratedValue::Float(value) => serde_json::Number::from_f64(*value)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            other => Value::String(other.to_csv()),
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            GeneratedValue::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            GeneratedValue::Int(value) => Some(*value as f64),
            GeneratedValue::Float(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            GeneratedValue::Text(value) => Some(value.as_str()),
            _ => None,
        }
    }
}

/// One generated record: `(column, value)` pairs in schema order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    values: Vec<(String, GeneratedValue)>,
}

impl Row {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            values: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, column: impl Into<String>, value: GeneratedValue) {
        self.values.push((column.into(), value));
    }

    pub fn get(&self, column: &str) -> Option<&GeneratedValue> {
        self.values
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &GeneratedValue)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn to_json_map(&self) -> Map<String, Value> {
        self.values
            .iter()
            .map(|(name, value)| (name.clone(), value.to_json()))
            .collect()
    }
}

/// Semantic category assigned to a column by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SemanticTag {
    Id,
    Latitude,
    Longitude,
    Point,
    BigNumeric,
    #[serde(rename = "bigint")]
    BigInt,
    Integer,
    Numeric,
    Float,
    Bit,
    Inet,
    Timestamp,
    TimestampWithZone,
    Time,
    Boolean,
    Text,
    Bytes,
    Phone,
}

impl SemanticTag {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Latitude => "latitude",
            Self::Longitude => "longitude",
            Self::Point => "point",
            Self::BigNumeric => "big_numeric",
            Self::BigInt => "bigint",
            Self::Integer => "integer",
            Self::Numeric => "numeric",
            Self::Float => "float",
            Self::Bit => "bit",
            Self::Inet => "inet",
            Self::Timestamp => "timestamp",
            Self::TimestampWithZone => "timestamp_with_zone",
            Self::Time => "time",
            Self::Boolean => "boolean",
            Self::Text => "text",
            Self::Bytes => "bytes",
            Self::Phone => "phone",
        }
    }
}

impl fmt::Display for SemanticTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Run-scoped inputs shared by every generator call.
#[derive(Debug, Clone, Copy)]
pub struct GeneratorContext<'a> {
    pub backend: Backend,
    pub catalog: &'a FakerCatalog,
    pub timezone: Tz,
    /// Counter value for the row being assembled.
    pub row_id: i64,
}

/// Produce one value for `tag`.
///
/// `Bit` needs a declared width and goes through [`primitives::bits`] instead.
pub fn generate(
    tag: SemanticTag,
    ctx: &GeneratorContext<'_>,
    rng: &mut dyn RngCore,
) -> Result<GeneratedValue, GenerationError> {
    let value = match tag {
        SemanticTag::Id => GeneratedValue::Int(ctx.row_id),
        SemanticTag::Latitude => semantic::latitude(ctx, rng),
        SemanticTag::Longitude => semantic::longitude(ctx, rng),
        SemanticTag::Point => semantic::point(ctx, rng),
        SemanticTag::BigNumeric => primitives::big_numeric(rng),
        SemanticTag::BigInt => primitives::bigint(rng),
        SemanticTag::Integer => primitives::integer(ctx.backend, rng),
        SemanticTag::Numeric => primitives::numeric(ctx.backend, rng),
        SemanticTag::Float => primitives::unit_float(rng),
        SemanticTag::Bit => {
            return Err(GenerationError::InvalidOptions(
                "bit values need a declared width".to_string(),
            ));
        }
        SemanticTag::Inet => semantic::inet(ctx, rng),
        SemanticTag::Timestamp => semantic::timestamp(ctx, rng),
        SemanticTag::TimestampWithZone => semantic::timestamp_with_zone(ctx, rng),
        SemanticTag::Time => semantic::time(ctx, rng),
        SemanticTag::Boolean => primitives::boolean(rng),
        SemanticTag::Text => semantic::text(ctx, rng),
        SemanticTag::Bytes => primitives::bytes(ctx.backend, rng),
        SemanticTag::Phone => semantic::phone(ctx, rng),
    };
    Ok(value)
}
