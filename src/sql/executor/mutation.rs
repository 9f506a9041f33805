use std::collections::{BTreeMap, BTreeSet};

use tracing::warn;

use crate::{
    error::{Error, Result},
    sql::{
        executor::{batch_result, predicate::Predicate, ExecutionResult, Executor},
        parser::ast::Condition,
        types::Value,
    },
    storage::{database::Database, table::RowFailure},
};

/// INSERT executor
pub struct Insert {
    table_name: String,
    columns: Option<Vec<String>>,
    values: Vec<Vec<Value>>,
}

impl Insert {
    pub fn new(table_name: String, columns: Option<Vec<String>>, values: Vec<Vec<Value>>) -> Box<Self> {
        Box::new(Self {
            table_name,
            columns,
            values,
        })
    }
}

impl Executor for Insert {
    fn execute(self: Box<Self>, db: &mut Database) -> Result<ExecutionResult> {
        let Insert {
            table_name,
            columns,
            values,
        } = *self;
        let table = db.get_table_mut(&table_name)?;

        // Without a column list, values map onto the columns in schema order
        let columns = match columns {
            Some(columns) => {
                let mut seen = BTreeSet::new();
                for column in &columns {
                    if table.schema().column(column).is_none() {
                        return Err(Error::column_not_found(&table_name, column));
                    }
                    if !seen.insert(column.as_str()) {
                        return Err(Error::Execution(format!(
                            "column '{}' listed more than once",
                            column
                        )));
                    }
                }
                columns
            }
            None => table.schema().column_names(),
        };

        let mut inserted = 0;
        let mut failures = Vec::new();
        for (position, row) in values.into_iter().enumerate() {
            let result = if row.len() != columns.len() {
                Err(Error::Execution(format!(
                    "expected {} values, got {}",
                    columns.len(),
                    row.len()
                )))
            } else {
                let values = columns.iter().cloned().zip(row).collect::<BTreeMap<_, _>>();
                table.insert(&values)
            };

            match result {
                Ok(_) => inserted += 1,
                Err(error) => {
                    warn!(table = %table_name, position, %error, "row insert rejected");
                    failures.push(RowFailure { position, error });
                }
            }
        }

        Ok(batch_result(
            format!("Inserted {} row(s) into '{}'", inserted, table_name),
            inserted,
            failures,
        ))
    }
}

/// UPDATE executor
pub struct Update {
    table_name: String,
    assignments: BTreeMap<String, Value>,
    filter: Option<Condition>,
}

impl Update {
    pub fn new(
        table_name: String,
        assignments: BTreeMap<String, Value>,
        filter: Option<Condition>,
    ) -> Box<Self> {
        Box::new(Self {
            table_name,
            assignments,
            filter,
        })
    }
}

impl Executor for Update {
    fn execute(self: Box<Self>, db: &mut Database) -> Result<ExecutionResult> {
        let predicate = compile_filter(db, &self.table_name, self.filter.as_ref())?;
        let outcome = db.update(
            &self.table_name,
            |row| predicate.as_ref().is_none_or(|p| p.matches(row)),
            &self.assignments,
        )?;

        Ok(batch_result(
            format!("Updated {} row(s) in '{}'", outcome.updated, self.table_name),
            outcome.updated,
            outcome.failures,
        ))
    }
}

/// DELETE executor
pub struct Delete {
    table_name: String,
    filter: Option<Condition>,
}

impl Delete {
    pub fn new(table_name: String, filter: Option<Condition>) -> Box<Self> {
        Box::new(Self { table_name, filter })
    }
}

impl Executor for Delete {
    fn execute(self: Box<Self>, db: &mut Database) -> Result<ExecutionResult> {
        let predicate = compile_filter(db, &self.table_name, self.filter.as_ref())?;
        let count = db.delete(&self.table_name, |row| {
            predicate.as_ref().is_none_or(|p| p.matches(row))
        })?;

        Ok(batch_result(
            format!("Deleted {} row(s) from '{}'", count, self.table_name),
            count,
            Vec::new(),
        ))
    }
}

fn compile_filter(db: &Database, table: &str, filter: Option<&Condition>) -> Result<Option<Predicate>> {
    let table = db.get_table(table)?;
    filter.map(|c| Predicate::for_table(table, c)).transpose()
}
