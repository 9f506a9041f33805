use tracing::debug;

use crate::{
    error::Result,
    sql::{
        executor::{
            predicate::{resolve_column, Predicate},
            ExecutionResult, Executor, RowSet,
        },
        parser::ast::{Condition, Projection},
    },
    storage::database::Database,
};

/// Table scan executor (SELECT)
pub struct Scan {
    table_name: String,
    columns: Projection,
    filter: Option<Condition>,
}

impl Scan {
    pub fn new(table_name: String, columns: Projection, filter: Option<Condition>) -> Box<Self> {
        Box::new(Self {
            table_name,
            columns,
            filter,
        })
    }
}

impl Executor for Scan {
    fn execute(self: Box<Self>, db: &mut Database) -> Result<ExecutionResult> {
        let table = db.get_table(&self.table_name)?;

        // (output name as written, stored column name)
        let projection = match &self.columns {
            Projection::All => table
                .schema()
                .column_names()
                .into_iter()
                .map(|c| (c.clone(), c))
                .collect(),
            Projection::Columns(names) => names
                .iter()
                .map(|name| resolve_column(table, name).map(|c| (name.clone(), c.name.clone())))
                .collect::<Result<Vec<_>>>()?,
        };
        let predicate = self
            .filter
            .as_ref()
            .map(|c| Predicate::for_table(table, c))
            .transpose()?;

        // An equality on an indexed column is answered from the index
        let rows = match &predicate {
            Some(p) if p.is_equality() && table.index(p.column()).is_some() => {
                debug!(table = %self.table_name, column = p.column(), "index lookup");
                table.select_by_index(p.column(), p.value())?
            }
            Some(p) => table.select_where(|row| p.matches(row)),
            None => table.select_all(),
        };

        Ok(ExecutionResult::RowSet(RowSet {
            rows: rows.iter().map(|row| row.project_as(projection.as_slice())).collect(),
            columns: projection.into_iter().map(|(output, _)| output).collect(),
        }))
    }
}
