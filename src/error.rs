use bincode::ErrorKind as BincodeErrorKind;
use thiserror::Error;

/// Custom Result type for minidb operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for minidb
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Malformed statement text
    #[error("parse error near '{fragment}': {reason}")]
    Parse { fragment: String, reason: String },
    #[error("table '{0}' does not exist")]
    TableNotFound(String),
    #[error("table '{0}' already exists")]
    TableAlreadyExists(String),
    #[error("column '{column}' does not exist in '{table}'")]
    ColumnNotFound { table: String, column: String },
    /// Invalid table definition
    #[error("schema error: {0}")]
    Schema(String),
    /// Value coercion, length or null failure
    #[error(transparent)]
    Type(#[from] TypeError),
    /// PRIMARY KEY or UNIQUE violation
    #[error("unique constraint violation: {table}.{column}={value} already exists")]
    UniqueViolation {
        table: String,
        column: String,
        value: String,
    },
    /// Every row of a multi-row INSERT or UPDATE was rejected
    #[error("{}", describe_rejections(failures))]
    RowsRejected { failures: Vec<RowFailure> },
    /// Runtime failure that is not a schema or constraint problem
    #[error("execution error: {0}")]
    Execution(String),
    /// Internal error (serialization, etc.)
    #[error("internal error: {0}")]
    Internal(String),
}

/// A failed row inside a batch operation
#[derive(Debug, Clone, PartialEq)]
pub struct RowFailure {
    /// Row slot for UPDATE, value-row ordinal for INSERT
    pub position: usize,
    pub error: Error,
}

fn describe_rejections(failures: &[RowFailure]) -> String {
    let rows = failures
        .iter()
        .map(|f| format!("row {}: {}", f.position, f.error))
        .collect::<Vec<_>>();
    format!("all {} row(s) rejected; {}", failures.len(), rows.join("; "))
}

/// Failures produced while validating a raw value against a column
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TypeError {
    #[error("column '{column}' expects {expected}, got {found}")]
    Mismatch {
        column: String,
        expected: String,
        found: String,
    },
    #[error("value for column '{column}' is {actual} characters long, max is {max}")]
    LengthExceeded {
        column: String,
        max: usize,
        actual: usize,
    },
    #[error("column '{column}' cannot be null")]
    NotNullViolation { column: String },
}

/// Failure category, for callers that branch without matching on messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Parse,
    TableNotFound,
    TableAlreadyExists,
    ColumnNotFound,
    Schema,
    Type,
    ConstraintViolation,
    Execution,
    Internal,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Parse { .. } => ErrorKind::Parse,
            Error::TableNotFound(_) => ErrorKind::TableNotFound,
            Error::TableAlreadyExists(_) => ErrorKind::TableAlreadyExists,
            Error::ColumnNotFound { .. } => ErrorKind::ColumnNotFound,
            Error::Schema(_) => ErrorKind::Schema,
            Error::Type(_) => ErrorKind::Type,
            Error::UniqueViolation { .. } => ErrorKind::ConstraintViolation,
            // Batches report the category of their first rejected row
            Error::RowsRejected { failures } => failures
                .first()
                .map_or(ErrorKind::Execution, |f| f.error.kind()),
            Error::Execution(_) => ErrorKind::Execution,
            Error::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Shorthand for a parse error on a fragment of the input
    pub fn parse(fragment: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::Parse {
            fragment: fragment.into(),
            reason: reason.into(),
        }
    }

    /// Rejected rows carried by this error, empty unless it is `RowsRejected`
    pub fn failures(&self) -> &[RowFailure] {
        match self {
            Error::RowsRejected { failures } => failures,
            _ => &[],
        }
    }

    pub fn column_not_found(table: &str, column: &str) -> Self {
        Error::ColumnNotFound {
            table: table.to_string(),
            column: column.to_string(),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Error::Internal(value.to_string())
    }
}

impl From<Box<BincodeErrorKind>> for Error {
    fn from(value: Box<BincodeErrorKind>) -> Self {
        Error::Internal(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::{Error, ErrorKind, RowFailure, TypeError};

    #[test]
    fn test_error_kind() {
        let err = Error::UniqueViolation {
            table: "users".into(),
            column: "id".into(),
            value: "1".into(),
        };
        assert_eq!(err.kind(), ErrorKind::ConstraintViolation);
        assert_eq!(
            err.to_string(),
            "unique constraint violation: users.id=1 already exists"
        );

        let err: Error = TypeError::NotNullViolation { column: "id".into() }.into();
        assert_eq!(err.kind(), ErrorKind::Type);
        assert_eq!(err.to_string(), "column 'id' cannot be null");

        assert_eq!(Error::parse("(", "unbalanced parentheses").kind(), ErrorKind::Parse);
    }

    #[test]
    fn test_rows_rejected_keeps_every_failure() {
        let err = Error::RowsRejected {
            failures: vec![
                RowFailure {
                    position: 0,
                    error: Error::Execution("expected 2 values, got 1".into()),
                },
                RowFailure {
                    position: 2,
                    error: TypeError::NotNullViolation { column: "n".into() }.into(),
                },
            ],
        };
        assert_eq!(err.kind(), ErrorKind::Execution);
        assert_eq!(err.failures().len(), 2);
        assert_eq!(
            err.to_string(),
            "all 2 row(s) rejected; row 0: execution error: expected 2 values, got 1; row 2: column 'n' cannot be null"
        );
        assert!(Error::Internal("x".into()).failures().is_empty());
    }
}
