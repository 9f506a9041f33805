use std::{collections::BTreeMap, fmt::Display};

use crate::sql::types::{ColumnType, Value};

/// One parsed statement
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    CreateTable { name: String, columns: Vec<Column> },
    /// INSERT statement; `columns` is None when the column list is omitted
    Insert {
        table_name: String,
        columns: Option<Vec<String>>,
        values: Vec<Vec<Value>>,
    },
    /// SELECT; `join` adds a second table
    Select {
        table_name: String,
        columns: Projection,
        join: Option<Join>,
        where_clause: Option<Condition>,
    },
    Update {
        table_name: String,
        assignments: BTreeMap<String, Value>,
        where_clause: Option<Condition>,
    },
    Delete {
        table_name: String,
        where_clause: Option<Condition>,
    },
}

/// Column as written in CREATE TABLE
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub column_type: ColumnType,
    pub primary_key: bool,
    pub unique: bool,
    /// Some(false) for NOT NULL, Some(true) for an explicit NULL
    pub nullable: Option<bool>,
}

/// SELECT column list
#[derive(Debug, Clone, PartialEq)]
pub enum Projection {
    All,
    Columns(Vec<String>),
}

/// `INNER JOIN table ON a.x = b.y`
#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    pub table: String,
    pub on: (QualifiedColumn, QualifiedColumn),
}

/// A `table.column` reference
#[derive(Debug, Clone, PartialEq)]
pub struct QualifiedColumn {
    pub table: String,
    pub column: String,
}

impl Display for QualifiedColumn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.table, self.column)
    }
}

/// WHERE clause: a single `column OP literal` comparison
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub column: String,
    pub operator: Operator,
    pub value: Value,
}

/// Comparison operators allowed in WHERE
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Equal,
    NotEqual,
    GreaterThan,
    LessThan,
}

impl Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Operator::Equal => "=",
            Operator::NotEqual => "!=",
            Operator::GreaterThan => ">",
            Operator::LessThan => "<",
        })
    }
}
