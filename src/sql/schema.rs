use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result, TypeError},
    sql::types::{ColumnType, Row, Value},
};

/// Column schema definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDefinition {
    pub name: String,
    pub column_type: ColumnType,
    /// Whether this column is the primary key
    pub primary_key: bool,
    pub unique: bool,
    pub nullable: bool,
}

impl ColumnDefinition {
    /// Creates a column definition. A primary key is always unique and non-nullable.
    pub fn new(
        name: impl Into<String>,
        column_type: ColumnType,
        primary_key: bool,
        unique: bool,
        nullable: bool,
    ) -> Self {
        Self {
            name: name.into(),
            column_type,
            primary_key,
            unique: unique || primary_key,
            nullable: nullable && !primary_key,
        }
    }

    /// Whether the column carries a hash index
    pub fn is_indexed(&self) -> bool {
        self.primary_key || self.unique
    }

    /// Checks a raw value against this column and returns the typed value.
    ///
    /// Applies null handling, type coercion and the VARCHAR length bound.
    pub fn validate(&self, raw: &Value) -> std::result::Result<Value, TypeError> {
        if raw.is_null() {
            return if self.nullable && !self.primary_key {
                Ok(Value::Null)
            } else {
                Err(TypeError::NotNullViolation {
                    column: self.name.clone(),
                })
            };
        }

        let value = self.coerce(raw)?;
        if let (ColumnType::VarChar(max), Value::String(s)) = (self.column_type, &value) {
            let actual = s.chars().count();
            if actual > max {
                return Err(TypeError::LengthExceeded {
                    column: self.name.clone(),
                    max,
                    actual,
                });
            }
        }
        Ok(value)
    }

    /// Converts a raw value to this column's type without null or length checks.
    ///
    /// Strings holding an integer convert to INT, strings "true"/"false"
    /// (any case) convert to BOOLEAN. NULL passes through.
    pub fn coerce(&self, raw: &Value) -> std::result::Result<Value, TypeError> {
        let coerced = match (self.column_type, raw) {
            (_, Value::Null) => Some(Value::Null),
            (ColumnType::Integer, Value::Integer(i)) => Some(Value::Integer(*i)),
            (ColumnType::Integer, Value::String(s)) if is_integer_literal(s) => {
                s.parse().ok().map(Value::Integer)
            }
            (ColumnType::Boolean, Value::Boolean(b)) => Some(Value::Boolean(*b)),
            (ColumnType::Boolean, Value::String(s)) => match s.to_lowercase().as_str() {
                "true" => Some(Value::Boolean(true)),
                "false" => Some(Value::Boolean(false)),
                _ => None,
            },
            (ColumnType::VarChar(_), Value::String(s)) => Some(Value::String(s.clone())),
            _ => None,
        };

        coerced.ok_or_else(|| TypeError::Mismatch {
            column: self.name.clone(),
            expected: self.column_type.to_string(),
            found: match raw {
                Value::String(s) => format!("'{}'", s),
                other => other.type_name().to_string(),
            },
        })
    }
}

fn is_integer_literal(s: &str) -> bool {
    let digits = s.strip_prefix('-').unwrap_or(s);
    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
}

/// Table schema: ordered column definitions with unique names
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    columns: Vec<ColumnDefinition>,
}

impl Schema {
    /// Validates and builds a schema
    pub fn new(columns: Vec<ColumnDefinition>) -> Result<Self> {
        if columns.is_empty() {
            return Err(Error::Schema("a table needs at least one column".into()));
        }

        let mut seen = HashSet::new();
        for column in &columns {
            if !seen.insert(column.name.as_str()) {
                return Err(Error::Schema(format!("duplicate column {}", column.name)));
            }
        }

        if columns.iter().filter(|c| c.primary_key).count() > 1 {
            return Err(Error::Schema("multiple primary keys".into()));
        }

        // Re-normalize so definitions built by hand obey the primary key rules.
        let columns = columns
            .into_iter()
            .map(|c| ColumnDefinition::new(c.name, c.column_type, c.primary_key, c.unique, c.nullable))
            .collect();
        Ok(Self { columns })
    }

    pub fn columns(&self) -> &[ColumnDefinition] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&ColumnDefinition> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    /// Returns the primary key column, if the table has one
    pub fn primary_key(&self) -> Option<&ColumnDefinition> {
        self.columns.iter().find(|c| c.primary_key)
    }

    /// Validates a full set of raw values and builds a row in schema order.
    ///
    /// Columns absent from `values` are treated as NULL.
    pub fn validate_row(&self, table: &str, values: &BTreeMap<String, Value>) -> Result<Row> {
        if let Some(unknown) = values.keys().find(|name| self.column(name).is_none()) {
            return Err(Error::column_not_found(table, unknown));
        }

        let mut entries = Vec::with_capacity(self.columns.len());
        for column in &self.columns {
            let raw = values.get(&column.name).unwrap_or(&Value::Null);
            entries.push((column.name.clone(), column.validate(raw)?));
        }
        Ok(Row::new(entries))
    }
}
