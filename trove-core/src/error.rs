use crate::{JoinType, Value};
use std::fmt::{self, Display, Formatter};
use thiserror::Error;

/// Broad classification of a failure, used by callers to decide who is at fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The caller described something the layer cannot compile or execute. Raised before any I/O.
    Configuration,
    /// The backend rejected the compiled query or could not be reached.
    Execution,
    /// A row was returned but could not be decoded.
    ResultProcessing,
    /// A pooled object was handled outside of its lease.
    PoolDiscipline,
}

/// Root causes raised by the data layer.
///
/// Every fallible function returns [`crate::Result`], recover the cause with
/// [`error_kind`] or `error.downcast_ref::<DaoError>()`.
#[derive(Error, Debug)]
pub enum DaoError {
    #[error("Cannot flip a {0} join, only left and right outer joins can be flipped")]
    UnsupportedFlip(JoinType),
    #[error("Cannot invert the raw clause `{0}`, provide the negated clause explicitly")]
    UnsupportedInvert(String),
    #[error("{operation} requires at least one expression")]
    EmptyCriteria { operation: &'static str },
    #[error("An update requires at least one value to assign")]
    EmptyAssignment,
    #[error("Property `{0}` must be compared against at least one value")]
    EmptyInList(String),
    #[error("Property `{property}` cannot be compared with NULL using {clause}")]
    NullOperand {
        property: String,
        clause: &'static str,
    },
    #[error("{backend} cannot handle {clause}")]
    UnsupportedClause {
        backend: &'static str,
        clause: String,
    },
    #[error("Unknown property `{property}` for table `{table}`")]
    UnknownProperty { table: String, property: String },
    #[error("Cannot coerce {value} into {target}")]
    TypeCoercion { value: String, target: String },
    #[error("Query execution failed: {source}\n{query}\nParameters: {params}")]
    Execution {
        query: String,
        params: Parameters,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("Could not decode a row of `{table}`: {source}")]
    ResultProcessing {
        table: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("Invalid connection url `{url}`: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("Pooled object misuse: {0}")]
    PoolDiscipline(String),
}

impl DaoError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DaoError::UnsupportedFlip(..)
            | DaoError::UnsupportedInvert(..)
            | DaoError::EmptyCriteria { .. }
            | DaoError::EmptyAssignment
            | DaoError::EmptyInList(..)
            | DaoError::NullOperand { .. }
            | DaoError::UnsupportedClause { .. }
            | DaoError::UnknownProperty { .. }
            | DaoError::TypeCoercion { .. }
            | DaoError::InvalidUrl { .. } => ErrorKind::Configuration,
            DaoError::Execution { .. } => ErrorKind::Execution,
            DaoError::ResultProcessing { .. } => ErrorKind::ResultProcessing,
            DaoError::PoolDiscipline(..) => ErrorKind::PoolDiscipline,
        }
    }

    /// Wrap a backend failure together with the query that triggered it.
    pub fn execution(
        query: &str,
        params: &[Value],
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        DaoError::Execution {
            query: crate::truncate_long!(query).to_string(),
            params: Parameters(params.to_vec()),
            source: source.into(),
        }
    }

    /// Wrap a decoding failure of a row coming from `table`.
    pub fn result_processing(table: &str, source: crate::Error) -> Self {
        DaoError::ResultProcessing {
            table: table.to_string(),
            source: source.into(),
        }
    }
}

/// Find the first [`DaoError`] in the chain and classify it.
pub fn error_kind(error: &crate::Error) -> Option<ErrorKind> {
    error
        .chain()
        .find_map(|e| e.downcast_ref::<DaoError>())
        .map(DaoError::kind)
}

/// Bound parameters attached to an execution error.
#[derive(Debug, Clone, Default)]
pub struct Parameters(pub Vec<Value>);

impl Display for Parameters {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, v) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", v)?;
        }
        f.write_str("]")
    }
}
