use std::collections::{BTreeMap, HashMap};

use tracing::{debug, info};

use crate::{
    error::{Error, Result},
    sql::{
        schema::Schema,
        types::{ColumnType, Row, Value},
    },
    storage::table::{Table, UpdateOutcome},
};

/// A named collection of tables
#[derive(Debug, Clone)]
pub struct Database {
    name: String,
    pub(crate) tables: BTreeMap<String, Table>,
}

impl Default for Database {
    fn default() -> Self {
        Self::new("default")
    }
}

/// Column description returned by [`Database::table_info`]
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnInfo {
    pub name: String,
    pub column_type: ColumnType,
    pub primary_key: bool,
    pub unique: bool,
    pub nullable: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableInfo {
    pub name: String,
    pub row_count: usize,
    pub columns: Vec<ColumnInfo>,
}

/// Database name plus [`TableInfo`] for every table, in name order
#[derive(Debug, Clone, PartialEq)]
pub struct DatabaseInfo {
    pub name: String,
    pub tables: Vec<TableInfo>,
}

impl Database {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tables: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn create_table(&mut self, name: &str, schema: Schema) -> Result<()> {
        if self.tables.contains_key(name) {
            return Err(Error::TableAlreadyExists(name.to_string()));
        }
        info!(database = %self.name, table = name, "create table");
        self.tables.insert(name.to_string(), Table::new(name, schema));
        Ok(())
    }

    pub fn drop_table(&mut self, name: &str) -> Result<()> {
        self.tables
            .remove(name)
            .map(|_| info!(database = %self.name, table = name, "drop table"))
            .ok_or_else(|| Error::TableNotFound(name.to_string()))
    }

    pub fn table_exists(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    pub fn list_tables(&self) -> Vec<String> {
        self.tables.keys().cloned().collect()
    }

    pub fn get_table(&self, name: &str) -> Result<&Table> {
        self.tables
            .get(name)
            .ok_or_else(|| Error::TableNotFound(name.to_string()))
    }

    pub fn get_table_mut(&mut self, name: &str) -> Result<&mut Table> {
        self.tables
            .get_mut(name)
            .ok_or_else(|| Error::TableNotFound(name.to_string()))
    }

    pub fn insert(&mut self, table: &str, values: &BTreeMap<String, Value>) -> Result<usize> {
        self.get_table_mut(table)?.insert(values)
    }

    pub fn select_all(&self, table: &str) -> Result<Vec<Row>> {
        Ok(self.get_table(table)?.select_all())
    }

    pub fn select_by_index(&self, table: &str, column: &str, value: &Value) -> Result<Vec<Row>> {
        self.get_table(table)?.select_by_index(column, value)
    }

    pub fn update<F: Fn(&Row) -> bool>(
        &mut self,
        table: &str,
        predicate: F,
        assignments: &BTreeMap<String, Value>,
    ) -> Result<UpdateOutcome> {
        self.get_table_mut(table)?.update(predicate, assignments)
    }

    pub fn delete<F: Fn(&Row) -> bool>(&mut self, table: &str, predicate: F) -> Result<usize> {
        Ok(self.get_table_mut(table)?.delete(predicate))
    }

    /// Inner equality join of `left` and `right` on `left.left_column = right.right_column`.
    ///
    /// Hashes the right table on its join column, then looks up each
    /// left row's key. Every pair of rows with equal keys produces one merged row,
    /// so duplicate keys yield their cross product. NULL keys never match.
    /// Output columns are qualified as `table.column`.
    pub fn join_inner(
        &self,
        left: &str,
        right: &str,
        left_column: &str,
        right_column: &str,
    ) -> Result<Vec<Row>> {
        let left_table = self.get_table(left)?;
        let right_table = self.get_table(right)?;
        if left_table.schema().column(left_column).is_none() {
            return Err(Error::column_not_found(left, left_column));
        }
        if right_table.schema().column(right_column).is_none() {
            return Err(Error::column_not_found(right, right_column));
        }

        let mut buckets: HashMap<&Value, Vec<&Row>> = HashMap::new();
        for row in right_table.rows() {
            match row.get(right_column) {
                Some(key) if !key.is_null() => buckets.entry(key).or_default().push(row),
                _ => {}
            }
        }

        let mut joined = Vec::new();
        for left_row in left_table.rows() {
            let Some(matches) = left_row.get(left_column).and_then(|key| buckets.get(key)) else {
                continue;
            };
            for right_row in matches {
                joined.push(Row::merge_qualified(left, left_row, right, right_row));
            }
        }
        debug!(left, right, rows = joined.len(), "inner join");
        Ok(joined)
    }

    pub fn table_info(&self, name: &str) -> Result<TableInfo> {
        let table = self.get_table(name)?;
        Ok(TableInfo {
            name: name.to_string(),
            row_count: table.len(),
            columns: table
                .schema()
                .columns()
                .iter()
                .map(|c| ColumnInfo {
                    name: c.name.clone(),
                    column_type: c.column_type,
                    primary_key: c.primary_key,
                    unique: c.unique,
                    nullable: c.nullable,
                })
                .collect(),
        })
    }

    pub fn database_info(&self) -> Result<DatabaseInfo> {
        Ok(DatabaseInfo {
            name: self.name.clone(),
            tables: self
                .list_tables()
                .iter()
                .map(|name| self.table_info(name))
                .collect::<Result<Vec<_>>>()?,
        })
    }

    /// Removes all rows from all tables, keeping their schemas
    pub fn clear_all_tables(&mut self) {
        for table in self.tables.values_mut() {
            table.clear();
        }
    }
}
