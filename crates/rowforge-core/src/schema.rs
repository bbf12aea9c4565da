use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A destination table, optionally qualified by a schema or dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRef {
    /// Postgres schema or BigQuery dataset. MySQL uses the connection database.
    pub schema: Option<String>,
    pub name: String,
}

impl TableRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            schema: None,
            name: name.into(),
        }
    }

    pub fn qualified(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            schema: Some(schema.into()),
            name: name.into(),
        }
    }

    /// Reject identifiers that would need escaping beyond plain quoting.
    pub fn validate(&self) -> Result<()> {
        if let Some(schema) = &self.schema {
            validate_identifier(schema)?;
        }
        validate_identifier(&self.name)
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.schema {
            Some(schema) => write!(f, "{schema}.{}", self.name),
            None => f.write_str(&self.name),
        }
    }
}

/// Column metadata handed to the classifier.
///
/// Only the name drives classification. `bit_width` is filled in for columns
/// the classifier tags as fixed-width bit strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bit_width: Option<u32>,
}

impl ColumnDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bit_width: None,
        }
    }

    pub fn with_bit_width(mut self, width: u32) -> Self {
        self.bit_width = Some(width);
        self
    }
}

pub fn validate_identifier(value: &str) -> Result<()> {
    let valid = !value.is_empty()
        && value
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '_' | '$' | '-'));
    if valid {
        Ok(())
    } else {
        Err(Error::InvalidIdentifier(value.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displays_qualified_names() {
        assert_eq!(TableRef::qualified("public", "users").to_string(), "public.users");
        assert_eq!(TableRef::new("users").to_string(), "users");
    }

    #[test]
    fn rejects_quotes_in_identifiers() {
        assert!(TableRef::new("users").validate().is_ok());
        assert!(TableRef::qualified("my-dataset", "events_2024").validate().is_ok());
        assert!(TableRef::new("users\"; drop").validate().is_err());
        assert!(TableRef::qualified("", "users").validate().is_err());
    }

    #[test]
    fn descriptor_width_is_optional() {
        let plain = ColumnDescriptor::new("bit_flag");
        assert_eq!(plain.bit_width, None);
        assert_eq!(plain.with_bit_width(8).bit_width, Some(8));
    }
}
