//! Persistence gateway for the bookstore catalog.
//!
//! Services talk to storage only through [`Repository`]. Queries are plain
//! values ([`Filter`], [`OrderBy`], [`FindMany`]) so any backend can
//! interpret them; [`memory::MemoryRepository`] is the bundled backend.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod memory;

pub use memory::MemoryRepository;

/// Errors raised by a persistence backend.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("unknown field '{field}' on {entity}")]
    UnknownField { entity: &'static str, field: String },

    #[error("record id sequence exhausted for {0}")]
    SequenceExhausted(&'static str),

    #[error("storage backend unavailable: {0}")]
    Unavailable(String),
}

pub type DbResult<T> = Result<T, DbError>;

/// A typed column value exposed by a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Int(i64),
    Float(f64),
    Text(String),
}

impl Value {
    /// Compares two values of compatible kinds. Integers and floats compare
    /// numerically; text never compares with numbers.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
            (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
            (Value::Int(a), Value::Float(b)) => (*a as f64).partial_cmp(b),
            (Value::Float(a), Value::Int(b)) => a.partial_cmp(&(*b as f64)),
            (Value::Text(a), Value::Text(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

/// Match rule applied to a single field.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Exact match.
    Equals(Value),
    /// Case-insensitive substring match on a text field.
    Contains(String),
}

impl Condition {
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            Condition::Equals(expected) => {
                matches!(value.compare(expected), Some(Ordering::Equal))
            }
            Condition::Contains(needle) => match value {
                Value::Text(haystack) => haystack
                    .to_lowercase()
                    .contains(&needle.to_lowercase()),
                _ => false,
            },
        }
    }
}

/// Conjunction of per-field conditions. An empty filter matches everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: BTreeMap<String, Condition>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter selecting a single record by primary key.
    pub fn by_id(id: i64) -> Self {
        Self::new().equals("id", id)
    }

    pub fn equals(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions
            .insert(field.into(), Condition::Equals(value.into()));
        self
    }

    pub fn contains(mut self, field: impl Into<String>, needle: impl Into<String>) -> Self {
        self.conditions
            .insert(field.into(), Condition::Contains(needle.into()));
        self
    }

    pub fn conditions(&self) -> impl Iterator<Item = (&str, &Condition)> {
        self.conditions.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// Single-field ordering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub field: String,
    pub direction: SortDirection,
}

impl OrderBy {
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }
}

impl Default for OrderBy {
    fn default() -> Self {
        Self::new("id", SortDirection::Asc)
    }
}

/// Paginated lookup: filter, order, then skip `skip` rows and return at most `take`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FindMany {
    pub filter: Filter,
    pub order_by: OrderBy,
    pub skip: u64,
    pub take: u64,
}

/// An entity the gateway can store.
pub trait Record: Clone + Send + Sync + 'static {
    /// Fields supplied on create; the id is assigned by the store.
    type Draft: Send + 'static;
    /// Partial update.
    type Patch: Send + 'static;

    /// Entity name used in errors and logs.
    const ENTITY: &'static str;

    fn id(&self) -> i64;

    fn from_draft(id: i64, draft: Self::Draft) -> Self;

    fn apply(&mut self, patch: Self::Patch);

    /// Looks up a column by name. Returns `None` for unknown fields.
    fn field(&self, name: &str) -> Option<Value>;
}

/// Storage operations for one entity type.
#[async_trait]
pub trait Repository<R: Record>: Send + Sync {
    async fn create(&self, draft: R::Draft) -> DbResult<R>;

    async fn find_many(&self, query: &FindMany) -> DbResult<Vec<R>>;

    async fn count(&self, filter: &Filter) -> DbResult<u64>;

    async fn find_first(&self, filter: &Filter) -> DbResult<Option<R>>;

    /// Returns `None` when no record has this id.
    async fn update(&self, id: i64, patch: R::Patch) -> DbResult<Option<R>>;

    /// Returns the removed record, or `None` when no record has this id.
    async fn delete(&self, id: i64) -> DbResult<Option<R>>;
}

/// Shared handle to a repository.
pub type RepositoryArc<R> = Arc<dyn Repository<R>>;
