use std::{cmp::Ordering, fmt::Display};

use serde::{Deserialize, Serialize};

mod row;

pub use row::Row;

/// Supported column types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnType {
    Integer,
    /// Variable-length string with a maximum length in characters
    VarChar(usize),
    Boolean,
}

impl Display for ColumnType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColumnType::Integer => write!(f, "INT"),
            ColumnType::VarChar(len) => write!(f, "VARCHAR({})", len),
            ColumnType::Boolean => write!(f, "BOOLEAN"),
        }
    }
}

/// Runtime value stored in rows and carried by literals
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Value {
    Null,
    Boolean(bool),
    Integer(i64),
    String(String),
}

impl Value {
    /// Returns the type name of the value, used in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "NULL",
            Value::Boolean(_) => "BOOLEAN",
            Value::Integer(_) => "INT",
            Value::String(_) => "VARCHAR",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Boolean(true) => write!(f, "TRUE"),
            Value::Boolean(false) => write!(f, "FALSE"),
            Value::Integer(v) => write!(f, "{}", v),
            Value::String(v) => write!(f, "{}", v),
        }
    }
}

/// Ordering used by `<` and `>` in WHERE clauses.
///
/// Values of different types are incomparable. NULL only compares equal to NULL.
impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Value::Null, Value::Null) => Some(Ordering::Equal),
            (Value::Boolean(a), Value::Boolean(b)) => a.partial_cmp(b),
            (Value::Integer(a), Value::Integer(b)) => a.partial_cmp(b),
            (Value::String(a), Value::String(b)) => a.partial_cmp(b),
            (_, _) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cmp::Ordering;

    use super::{ColumnType, Value};

    #[test]
    fn test_value_ordering() {
        assert_eq!(
            Value::Integer(1).partial_cmp(&Value::Integer(2)),
            Some(Ordering::Less)
        );
        assert!(Value::String("b".into()) > Value::String("a".into()));
        assert_eq!(Value::Integer(1).partial_cmp(&Value::String("1".into())), None);
        assert_eq!(Value::Null.partial_cmp(&Value::Integer(0)), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(ColumnType::VarChar(50).to_string(), "VARCHAR(50)");
        assert_eq!(Value::Boolean(true).to_string(), "TRUE");
        assert_eq!(Value::Null.to_string(), "NULL");
    }
}
