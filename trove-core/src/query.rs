use crate::{Criteria, Mapping, Poolable, Value, truncate_long};
use std::{
    fmt::{self, Display},
    sync::Arc,
};

/// Layout of a compiled query, query pools keep one idle list per shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryShape {
    Select,
    Count,
    CountGrouped,
    Join,
    JoinCount,
    /// DDL and DML, no rows expected.
    Statement,
}

/// A compiled query: text plus ordered bound parameters.
///
/// Leased from a backend pool, filled by the compiler, executed, then
/// returned and reset. Never kept past its lease.
#[derive(Debug)]
pub struct Query {
    pub shape: QueryShape,
    pub text: String,
    pub params: Vec<Value>,
    /// Entity the rows decode into, the left entity of a join.
    pub mapping: Option<Mapping>,
    /// Right entity of a join, rows are split right after the left columns.
    pub joined: Option<Mapping>,
    /// Criteria evaluated in process by backends that do not run SQL.
    pub criteria: Option<Criteria>,
}

impl Query {
    pub fn new(shape: QueryShape) -> Self {
        Self {
            shape,
            text: String::with_capacity(256),
            params: Vec::new(),
            mapping: None,
            joined: None,
            criteria: None,
        }
    }

    pub fn push(&mut self, c: char) {
        self.text.push(c);
    }

    pub fn push_str(&mut self, s: &str) {
        self.text.push_str(s);
    }

    /// Append a parameter value, the placeholder is written by the dialect.
    pub fn bind(&mut self, value: Value) {
        self.params.push(value);
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

impl Poolable for Query {
    fn reset(&mut self) {
        self.text.clear();
        self.params.clear();
        self.mapping = None;
        self.joined = None;
        self.criteria = None;
    }
}

impl Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", truncate_long!(self.text))
    }
}

/// Metadata about modify operations (INSERT/UPDATE/DELETE).
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowsAffected {
    /// Total number of rows impacted, `None` when the backend cannot tell.
    pub rows_affected: Option<u64>,
    /// Backend-specific last inserted identifier when available.
    pub last_affected_id: Option<i64>,
}

impl RowsAffected {
    pub fn new(rows_affected: u64) -> Self {
        Self {
            rows_affected: Some(rows_affected),
            last_affected_id: None,
        }
    }
}

impl Extend<RowsAffected> for RowsAffected {
    fn extend<T: IntoIterator<Item = RowsAffected>>(&mut self, iter: T) {
        for elem in iter {
            self.rows_affected = match (self.rows_affected, elem.rows_affected) {
                (Some(a), Some(b)) => Some(a + b),
                _ => None,
            };
            if elem.last_affected_id.is_some() {
                self.last_affected_id = elem.last_affected_id;
            }
        }
    }
}

/// Shared reference-counted column name list.
pub type RowNames = Arc<[String]>;
/// Owned row value slice matching `RowNames` length.
pub type Row = Box<[Value]>;

/// A result row with its corresponding column labels.
#[derive(Debug, Clone, PartialEq)]
pub struct RowLabeled {
    /// Column names.
    pub labels: RowNames,
    /// Data values (aligned by index with `labels`).
    pub values: Row,
}

impl RowLabeled {
    pub fn new(labels: RowNames, values: Row) -> Self {
        Self { labels, values }
    }
    pub fn names(&self) -> &[String] {
        &self.labels
    }
    pub fn values(&self) -> &[Value] {
        &self.values
    }
    pub fn get_column(&self, name: &str) -> Option<&Value> {
        self.labels
            .iter()
            .position(|v| v == name)
            .map(|i| &self.values[i])
    }
}

impl From<RowLabeled> for Row {
    fn from(value: RowLabeled) -> Self {
        value.values
    }
}

/// One group of a grouped count, `values` follow the order of the group properties.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupCount {
    pub count: u64,
    pub values: Vec<Value>,
}
