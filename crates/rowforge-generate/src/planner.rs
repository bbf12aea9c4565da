use serde::{Deserialize, Serialize};

use rowforge_core::{Backend, ColumnDescriptor};

use crate::classifier::{Classification, Classifier};
use crate::errors::GenerationError;
use crate::faker_rs::FakerCatalog;
use crate::generators::SemanticTag;

/// Generator chosen for a column, fixed for the whole run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ColumnGenerator {
    Tag(SemanticTag),
    /// Fixed-width bit string.
    Bits(u32),
    Capability(&'static str),
}

impl ColumnGenerator {
    pub fn id(&self) -> String {
        match self {
            ColumnGenerator::Tag(tag) => tag.as_str().to_string(),
            ColumnGenerator::Bits(width) => format!("bit({width})"),
            ColumnGenerator::Capability(name) => format!("faker.{name}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlannedColumn {
    pub name: String,
    pub generator: ColumnGenerator,
}

/// A column excluded from generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationFailure {
    pub column: String,
    pub reason: String,
}

impl From<GenerationError> for ClassificationFailure {
    fn from(err: GenerationError) -> Self {
        Self {
            column: err.column().unwrap_or_default().to_string(),
            reason: err.to_string(),
        }
    }
}

/// Per-run mapping from columns to generators, in schema order.
#[derive(Debug, Clone, Serialize)]
pub struct ColumnPlan {
    pub backend: Backend,
    pub columns: Vec<PlannedColumn>,
    pub failures: Vec<ClassificationFailure>,
}

impl ColumnPlan {
    /// Classify every column once. Unclassifiable columns land in `failures`.
    ///
    /// Bit columns must carry their declared width in the descriptor.
    pub fn build(
        backend: Backend,
        columns: &[ColumnDescriptor],
        catalog: &FakerCatalog,
    ) -> Result<Self, GenerationError> {
        let classifier = Classifier::new(backend, catalog)?;
        let mut plan = Self {
            backend,
            columns: Vec::with_capacity(columns.len()),
            failures: Vec::new(),
        };

        for column in columns {
            match plan_column(&classifier, column) {
                Ok(generator) => plan.columns.push(PlannedColumn {
                    name: column.name.clone(),
                    generator,
                }),
                Err(err) => plan.failures.push(err.into()),
            }
        }

        Ok(plan)
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|column| column.name.as_str())
    }
}

fn plan_column(
    classifier: &Classifier<'_>,
    column: &ColumnDescriptor,
) -> Result<ColumnGenerator, GenerationError> {
    match classifier.classify(&column.name)? {
        Classification::Tag(SemanticTag::Bit) => column
            .bit_width
            .map(ColumnGenerator::Bits)
            .ok_or_else(|| GenerationError::MissingBitWidth {
                column: column.name.clone(),
            }),
        Classification::Tag(tag) => Ok(ColumnGenerator::Tag(tag)),
        Classification::Fallback(name) => Ok(ColumnGenerator::Capability(name)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failures_do_not_shift_other_columns() {
        let catalog = FakerCatalog::default();
        let columns = [
            ColumnDescriptor::new("id"),
            ColumnDescriptor::new("xyzzy_unmappable"),
            ColumnDescriptor::new("phone"),
        ];
        let plan = ColumnPlan::build(Backend::Mysql, &columns, &catalog).expect("plan");

        assert_eq!(plan.column_names().collect::<Vec<_>>(), vec!["id", "phone"]);
        assert_eq!(plan.failures.len(), 1);
        assert_eq!(plan.failures[0].column, "xyzzy_unmappable");
    }

    #[test]
    fn bit_columns_without_width_fail() {
        let catalog = FakerCatalog::default();
        let plan = ColumnPlan::build(
            Backend::Postgresql,
            &[ColumnDescriptor::new("bit_flag")],
            &catalog,
        )
        .expect("plan");
        assert!(plan.columns.is_empty());
        assert!(plan.failures[0].reason.contains("width"));
    }

    #[test]
    fn generator_ids_are_readable() {
        assert_eq!(ColumnGenerator::Bits(8).id(), "bit(8)");
        assert_eq!(ColumnGenerator::Capability("city").id(), "faker.city");
        assert_eq!(ColumnGenerator::Tag(SemanticTag::Id).id(), "id");
    }
}
