use tracing::warn;

use crate::{
    error::{Error, ErrorKind, Result},
    sql::{
        executor::{
            join::HashJoin,
            mutation::{Delete, Insert, Update},
            query::Scan,
            schema::CreateTable,
        },
        parser::ast::Statement,
        types::Row,
    },
    storage::{database::Database, table::RowFailure},
};

mod join;
mod mutation;
pub mod predicate;
mod query;
mod schema;

/// SQL executor trait
pub trait Executor {
    fn execute(self: Box<Self>, db: &mut Database) -> Result<ExecutionResult>;
}

/// Builds an executor from a parsed statement
impl dyn Executor {
    pub fn build(stmt: Statement) -> Box<dyn Executor> {
        match stmt {
            Statement::CreateTable { name, columns } => CreateTable::new(name, columns),
            Statement::Insert {
                table_name,
                columns,
                values,
            } => Insert::new(table_name, columns, values),
            Statement::Select {
                table_name,
                columns,
                join: Some(join),
                where_clause,
            } => HashJoin::new(table_name, join, columns, where_clause),
            Statement::Select {
                table_name,
                columns,
                join: None,
                where_clause,
            } => Scan::new(table_name, columns, where_clause),
            Statement::Update {
                table_name,
                assignments,
                where_clause,
            } => Update::new(table_name, assignments, where_clause),
            Statement::Delete {
                table_name,
                where_clause,
            } => Delete::new(table_name, where_clause),
        }
    }
}

/// Runs one statement against `db`. Failures come back as
/// [`ExecutionResult::Error`], never as a panic.
pub fn execute(stmt: Statement, db: &mut Database) -> ExecutionResult {
    match <dyn Executor>::build(stmt).execute(db) {
        Ok(result) => result,
        Err(err) => {
            warn!(kind = ?err.kind(), %err, "statement failed");
            ExecutionResult::Error(err)
        }
    }
}

/// Execution result
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionResult {
    Success(Summary),
    RowSet(RowSet),
    Error(Error),
}

impl ExecutionResult {
    pub fn is_error(&self) -> bool {
        matches!(self, ExecutionResult::Error(_))
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            ExecutionResult::Error(err) => Some(err.kind()),
            _ => None,
        }
    }
}

/// Outcome of a statement that returns no rows
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub message: String,
    /// Rows inserted, updated or deleted
    pub affected: usize,
    /// Rows rejected while the rest of the statement went through
    pub failures: Vec<RowFailure>,
}

impl Summary {
    pub fn new(message: impl Into<String>, affected: usize) -> Self {
        Self {
            message: message.into(),
            affected,
            failures: Vec::new(),
        }
    }
}

/// Rows returned by SELECT, already projected onto `columns`
#[derive(Debug, Clone, PartialEq)]
pub struct RowSet {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

/// Result for a batch write. Partial success is a success; a batch in
/// which every row failed is an error listing every rejected row.
fn batch_result(message: String, affected: usize, failures: Vec<RowFailure>) -> ExecutionResult {
    if affected == 0 && !failures.is_empty() {
        return ExecutionResult::Error(Error::RowsRejected { failures });
    }
    ExecutionResult::Success(Summary {
        message,
        affected,
        failures,
    })
}
