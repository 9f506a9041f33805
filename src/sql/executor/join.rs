use crate::{
    error::{Error, Result},
    sql::{
        executor::{predicate::Predicate, ExecutionResult, Executor, RowSet},
        parser::ast::{Condition, Join, Projection},
        schema::ColumnDefinition,
    },
    storage::{database::Database, table::Table},
};

/// Equality join executor (SELECT ... INNER JOIN ... ON a.x = b.y)
pub struct HashJoin {
    left: String,
    join: Join,
    columns: Projection,
    filter: Option<Condition>,
}

impl HashJoin {
    pub fn new(left: String, join: Join, columns: Projection, filter: Option<Condition>) -> Box<Self> {
        Box::new(Self {
            left,
            join,
            columns,
            filter,
        })
    }
}

impl Executor for HashJoin {
    fn execute(self: Box<Self>, db: &mut Database) -> Result<ExecutionResult> {
        let right = &self.join.table;
        if self.left == *right {
            return Err(Error::Execution(format!(
                "cannot join table '{}' with itself",
                right
            )));
        }

        // The ON clause may name the two tables in either order
        let (a, b) = &self.join.on;
        let (left_column, right_column) = if a.table == self.left && b.table == *right {
            (&a.column, &b.column)
        } else if a.table == *right && b.table == self.left {
            (&b.column, &a.column)
        } else {
            return Err(Error::Execution(format!(
                "join condition {} = {} must reference '{}' and '{}'",
                a, b, self.left, right
            )));
        };

        let left_table = db.get_table(&self.left)?;
        let right_table = db.get_table(right)?;

        // (output name as written, key in the merged row)
        let projection = match &self.columns {
            Projection::All => qualified_columns(left_table)
                .chain(qualified_columns(right_table))
                .map(|key| (key.clone(), key))
                .collect(),
            Projection::Columns(names) => names
                .iter()
                .map(|name| {
                    resolve_joined(left_table, right_table, name).map(|(key, _)| (name.clone(), key))
                })
                .collect::<Result<Vec<_>>>()?,
        };
        let predicate = match &self.filter {
            Some(c) => {
                let (key, definition) = resolve_joined(left_table, right_table, &c.column)?;
                Some(Predicate::compile(key, definition, c.operator, &c.value)?)
            }
            None => None,
        };

        let rows = db
            .join_inner(&self.left, right, left_column, right_column)?
            .into_iter()
            .filter(|row| predicate.as_ref().is_none_or(|p| p.matches(row)))
            .map(|row| row.project_as(projection.as_slice()))
            .collect();

        Ok(ExecutionResult::RowSet(RowSet {
            columns: projection.into_iter().map(|(output, _)| output).collect(),
            rows,
        }))
    }
}

fn qualified_columns(table: &Table) -> impl Iterator<Item = String> + '_ {
    table
        .schema()
        .columns()
        .iter()
        .map(move |c| format!("{}.{}", table.name(), c.name))
}

/// Maps a column reference to its key in a merged row. Bare names are
/// looked up in the left table first, then the right.
fn resolve_joined<'a>(
    left: &'a Table,
    right: &'a Table,
    name: &str,
) -> Result<(String, &'a ColumnDefinition)> {
    let found = match name.split_once('.') {
        Some((qualifier, column)) => [left, right]
            .into_iter()
            .find(|t| t.name() == qualifier)
            .and_then(|t| t.schema().column(column).map(|c| (t, c))),
        None => [left, right]
            .into_iter()
            .find_map(|t| t.schema().column(name).map(|c| (t, c))),
    };

    found
        .map(|(table, column)| (format!("{}.{}", table.name(), column.name), column))
        .ok_or_else(|| match name.split_once('.') {
            Some((qualifier, column)) => Error::column_not_found(qualifier, column),
            None => Error::column_not_found(left.name(), name),
        })
}
