//! Name-based column classification.
//!
//! Each backend owns an ordered rule table; the first rule whose matcher fires
//! decides the column's [`SemanticTag`]. Names no rule claims fall back to the
//! first fake-data capability whose name occurs in the column name.

use regex::Regex;
use serde::Serialize;

use rowforge_core::Backend;

use crate::errors::GenerationError;
use crate::faker_rs::FakerCatalog;
use crate::generators::SemanticTag;

/// Bumped whenever a rule table changes order or predicates.
pub const RULES_VERSION: u32 = 3;

/// Predicate over a lower-cased column name.
#[derive(Debug, Clone, Copy)]
pub enum Matcher {
    Contains(&'static [&'static str]),
    ContainsExcluding {
        any: &'static [&'static str],
        not: &'static str,
    },
    /// Anchored regular expression, compiled when the classifier is built.
    Pattern(&'static str),
    Prefix(&'static [&'static str]),
}

/// One entry of a backend rule table.
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    pub name: &'static str,
    pub matchers: &'static [Matcher],
    pub tag: SemanticTag,
}

const fn rule(name: &'static str, matchers: &'static [Matcher], tag: SemanticTag) -> Rule {
    Rule {
        name,
        matchers,
        tag,
    }
}

const ID: Rule = rule("id", &[Matcher::Contains(&["id"])], SemanticTag::Id);
const LATITUDE: Rule = rule(
    "latitude",
    &[Matcher::Contains(&["latitude"])],
    SemanticTag::Latitude,
);
const LONGITUDE: Rule = rule(
    "longitude",
    &[Matcher::Contains(&["longitude"])],
    SemanticTag::Longitude,
);
const POINT: Rule = rule(
    "point",
    &[Matcher::Contains(&["geography", "geometry", "point"])],
    SemanticTag::Point,
);
const INTEGER: Rule = rule("integer", &[Matcher::Contains(&["int"])], SemanticTag::Integer);
const NUMERIC: Rule = rule(
    "numeric",
    &[Matcher::Contains(&["numeric", "decimal"])],
    SemanticTag::Numeric,
);
const FLOAT: Rule = rule("float", &[Matcher::Contains(&["float"])], SemanticTag::Float);
const TIMESTAMP: Rule = rule(
    "timestamp",
    &[Matcher::Pattern(r"^\w*(?:date_*time|time_*stamp)")],
    SemanticTag::Timestamp,
);
const TIME: Rule = rule(
    "time",
    &[Matcher::ContainsExcluding {
        any: &["time"],
        not: "timestamp",
    }],
    SemanticTag::Time,
);
const BOOLEAN: Rule = rule(
    "boolean",
    &[
        Matcher::Contains(&["bool"]),
        Matcher::Prefix(&["is_", "has_"]),
    ],
    SemanticTag::Boolean,
);
const TEXT: Rule = rule("text", &[Matcher::Contains(&["string", "text"])], SemanticTag::Text);
const BYTES: Rule = rule("bytes", &[Matcher::Contains(&["bytes"])], SemanticTag::Bytes);
const PHONE: Rule = rule("phone", &[Matcher::Contains(&["mobile", "phone"])], SemanticTag::Phone);

pub static BIGQUERY_RULES: &[Rule] = &[
    ID,
    LATITUDE,
    LONGITUDE,
    POINT,
    rule(
        "big_numeric",
        &[Matcher::Pattern(r"^\w*big_*(?:numeric|decimal)")],
        SemanticTag::BigNumeric,
    ),
    INTEGER,
    NUMERIC,
    FLOAT,
    TIMESTAMP,
    TIME,
    BOOLEAN,
    TEXT,
    BYTES,
    PHONE,
];

pub static MYSQL_RULES: &[Rule] = &[
    ID,
    LATITUDE,
    LONGITUDE,
    POINT,
    rule("blob", &[Matcher::Contains(&["blob"])], SemanticTag::Bytes),
    rule(
        "bigint",
        &[Matcher::Pattern(r"^\w*big_*(?:int|num)")],
        SemanticTag::BigInt,
    ),
    INTEGER,
    NUMERIC,
    FLOAT,
    TIMESTAMP,
    TIME,
    BOOLEAN,
    TEXT,
    BYTES,
    PHONE,
];

pub static POSTGRES_RULES: &[Rule] = &[
    rule("inet", &[Matcher::Contains(&["cidr", "inet"])], SemanticTag::Inet),
    LATITUDE,
    LONGITUDE,
    POINT,
    rule("bigint", &[Matcher::Pattern(r"^\w*big_*int")], SemanticTag::BigInt),
    INTEGER,
    rule("bit", &[Matcher::Contains(&["bit"])], SemanticTag::Bit),
    rule(
        "numeric",
        &[Matcher::Contains(&["numeric", "decimal", "float"])],
        SemanticTag::Numeric,
    ),
    rule("id", &[Matcher::Contains(&["id", "serial"])], SemanticTag::Id),
    rule(
        "timestamp_with_zone",
        &[Matcher::Pattern(r"^\w*(?:time_*stamp|date_*time)_*\w*zone")],
        SemanticTag::TimestampWithZone,
    ),
    TIMESTAMP,
    TIME,
    BOOLEAN,
    TEXT,
    rule("bytes", &[Matcher::Contains(&["bytes", "bytea"])], SemanticTag::Bytes),
    PHONE,
];

pub fn rules_for(backend: Backend) -> &'static [Rule] {
    match backend {
        Backend::Bigquery => BIGQUERY_RULES,
        Backend::Mysql => MYSQL_RULES,
        Backend::Postgresql => POSTGRES_RULES,
    }
}

/// Outcome of classifying one column name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Classification {
    Tag(SemanticTag),
    Fallback(&'static str),
}

impl Classification {
    /// Whether generation needs the column's declared bit width.
    pub fn needs_bit_width(&self) -> bool {
        matches!(self, Classification::Tag(SemanticTag::Bit))
    }

    pub fn label(&self) -> String {
        match self {
            Classification::Tag(tag) => tag.as_str().to_string(),
            Classification::Fallback(name) => format!("faker.{name}"),
        }
    }
}

enum CompiledMatcher {
    Contains(&'static [&'static str]),
    ContainsExcluding {
        any: &'static [&'static str],
        not: &'static str,
    },
    Pattern(Regex),
    Prefix(&'static [&'static str]),
}

impl CompiledMatcher {
    fn compile(matcher: &Matcher) -> Result<Self, GenerationError> {
        Ok(match *matcher {
            Matcher::Contains(needles) => Self::Contains(needles),
            Matcher::ContainsExcluding { any, not } => Self::ContainsExcluding { any, not },
            Matcher::Pattern(pattern) => Self::Pattern(Regex::new(pattern).map_err(|err| {
                GenerationError::InvalidOptions(format!("invalid rule pattern '{pattern}': {err}"))
            })?),
            Matcher::Prefix(prefixes) => Self::Prefix(prefixes),
        })
    }

    fn matches(&self, name: &str) -> bool {
        match self {
            Self::Contains(needles) => needles.iter().any(|needle| name.contains(needle)),
            Self::ContainsExcluding { any, not } => {
                !name.contains(not) && any.iter().any(|needle| name.contains(needle))
            }
            Self::Pattern(regex) => regex.is_match(name),
            Self::Prefix(prefixes) => prefixes.iter().any(|prefix| name.starts_with(prefix)),
        }
    }
}

struct CompiledRule {
    tag: SemanticTag,
    matchers: Vec<CompiledMatcher>,
}

/// Classifier bound to one backend's rule table and a capability catalog.
pub struct Classifier<'a> {
    backend: Backend,
    rules: Vec<CompiledRule>,
    catalog: &'a FakerCatalog,
}

impl<'a> Classifier<'a> {
    pub fn new(backend: Backend, catalog: &'a FakerCatalog) -> Result<Self, GenerationError> {
        let rules = rules_for(backend)
            .iter()
            .map(|rule| {
                let matchers = rule
                    .matchers
                    .iter()
                    .map(CompiledMatcher::compile)
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(CompiledRule {
                    tag: rule.tag,
                    matchers,
                })
            })
            .collect::<Result<Vec<_>, GenerationError>>()?;
        Ok(Self {
            backend,
            rules,
            catalog,
        })
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }

    pub fn classify(&self, column: &str) -> Result<Classification, GenerationError> {
        let name = column.to_lowercase();
        if let Some(rule) = self
            .rules
            .iter()
            .find(|rule| rule.matchers.iter().any(|matcher| matcher.matches(&name)))
        {
            return Ok(Classification::Tag(rule.tag));
        }

        self.catalog
            .find_in(&name)
            .map(|capability| Classification::Fallback(capability.name))
            .ok_or_else(|| GenerationError::CannotClassify {
                column: column.to_string(),
            })
    }
}
