use std::collections::BTreeMap;

use tracing::{debug, warn};

pub use crate::error::RowFailure;

use crate::{
    error::{Error, Result},
    sql::{
        schema::Schema,
        types::{Row, Value},
    },
    storage::index::HashIndex,
};

/// Outcome of a batch UPDATE: applied rows stay applied even when others fail
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateOutcome {
    pub updated: usize,
    pub failures: Vec<RowFailure>,
}

/// A table: schema, row arena and hash indexes.
///
/// Rows live in `slots` addressed by a stable position. Deleting a row
/// leaves an empty slot behind, so positions held by the indexes never
/// shift. Empty slots are only reclaimed once the table holds no rows at
/// all, at which point positions start again from zero. Indexes exist
/// exactly for PRIMARY KEY and UNIQUE columns and are kept in step with
/// `slots` by every mutating method.
#[derive(Debug, Clone)]
pub struct Table {
    name: String,
    schema: Schema,
    slots: Vec<Option<Row>>,
    live: usize,
    indexes: BTreeMap<String, HashIndex>,
}

impl Table {
    pub fn new(name: impl Into<String>, schema: Schema) -> Self {
        let indexes = schema
            .columns()
            .iter()
            .filter(|c| c.is_indexed())
            .map(|c| (c.name.clone(), HashIndex::new()))
            .collect();
        Self {
            name: name.into(),
            schema,
            slots: Vec::new(),
            live: 0,
            indexes,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Number of rows currently stored
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    pub fn indexed_columns(&self) -> impl Iterator<Item = &str> {
        self.indexes.keys().map(|c| c.as_str())
    }

    pub fn index(&self, column: &str) -> Option<&HashIndex> {
        self.indexes.get(column)
    }

    /// Validates and stores a new row, returning its position.
    ///
    /// Nothing is stored and no index changes if validation or a
    /// uniqueness check fails.
    pub fn insert(&mut self, values: &BTreeMap<String, Value>) -> Result<usize> {
        let row = self.schema.validate_row(&self.name, values)?;
        self.check_unique(&row, None)?;

        let position = self.slots.len();
        for (column, index) in self.indexes.iter_mut() {
            if let Some(value) = row.get(column) {
                index.insert(value, position);
            }
        }
        debug!(table = %self.name, position, "insert {}", row);
        self.slots.push(Some(row));
        self.live += 1;
        Ok(position)
    }

    /// Live rows with their positions, in insertion order
    pub fn entries(&self) -> impl Iterator<Item = (usize, &Row)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(position, slot)| slot.as_ref().map(|row| (position, row)))
    }

    pub fn rows(&self) -> impl Iterator<Item = &Row> {
        self.entries().map(|(_, row)| row)
    }

    pub fn select_all(&self) -> Vec<Row> {
        self.rows().cloned().collect()
    }

    pub fn select_where<F: Fn(&Row) -> bool>(&self, predicate: F) -> Vec<Row> {
        self.rows().filter(|row| predicate(row)).cloned().collect()
    }

    /// Rows whose `column` equals `value`.
    ///
    /// Uses the column's hash index when there is one, otherwise scans.
    pub fn select_by_index(&self, column: &str, value: &Value) -> Result<Vec<Row>> {
        if self.schema.column(column).is_none() {
            return Err(Error::column_not_found(&self.name, column));
        }

        match self.indexes.get(column) {
            Some(index) if !value.is_null() => Ok(index
                .get(value)
                .map(|positions| {
                    positions
                        .iter()
                        .filter_map(|p| self.slots.get(*p).and_then(|slot| slot.clone()))
                        .collect()
                })
                .unwrap_or_default()),
            _ => Ok(self.select_where(|row| row.get(column) == Some(value))),
        }
    }

    /// Applies `assignments` to every row matching `predicate`.
    ///
    /// Each matching row is revalidated and re-checked for uniqueness on its
    /// own. A row that fails is reported in the outcome and left unchanged,
    /// while rows already updated in the same call stay updated.
    pub fn update<F: Fn(&Row) -> bool>(
        &mut self,
        predicate: F,
        assignments: &BTreeMap<String, Value>,
    ) -> Result<UpdateOutcome> {
        if let Some(unknown) = assignments.keys().find(|c| self.schema.column(c).is_none()) {
            return Err(Error::column_not_found(&self.name, unknown));
        }

        let targets = self
            .entries()
            .filter(|(_, row)| predicate(row))
            .map(|(position, _)| position)
            .collect::<Vec<_>>();

        let mut outcome = UpdateOutcome::default();
        for position in targets {
            match self.update_at(position, assignments) {
                Ok(()) => outcome.updated += 1,
                Err(error) => {
                    warn!(table = %self.name, position, %error, "row update rejected");
                    outcome.failures.push(RowFailure { position, error });
                }
            }
        }
        Ok(outcome)
    }

    fn update_at(&mut self, position: usize, assignments: &BTreeMap<String, Value>) -> Result<()> {
        let old = self
            .slots
            .get(position)
            .and_then(|slot| slot.clone())
            .ok_or_else(|| Error::Execution(format!("row {} vanished during update", position)))?;

        let mut coerced = BTreeMap::new();
        for (column, raw) in assignments {
            if let Some(definition) = self.schema.column(column) {
                coerced.insert(column.clone(), definition.validate(raw)?);
            }
        }
        let new = old.with_values(&coerced);
        self.check_unique(&new, Some(position))?;

        for (column, index) in self.indexes.iter_mut() {
            if let Some(value) = old.get(column) {
                index.remove(value, position);
            }
            if let Some(value) = new.get(column) {
                index.insert(value, position);
            }
        }
        debug!(table = %self.name, position, "update {} -> {}", old, new);
        self.slots[position] = Some(new);
        Ok(())
    }

    /// Removes every row matching `predicate`, returning how many were removed
    pub fn delete<F: Fn(&Row) -> bool>(&mut self, predicate: F) -> usize {
        let targets = self
            .entries()
            .filter(|(_, row)| predicate(row))
            .map(|(position, _)| position)
            .collect::<Vec<_>>();

        for &position in &targets {
            if let Some(row) = self.slots[position].take() {
                for (column, index) in self.indexes.iter_mut() {
                    if let Some(value) = row.get(column) {
                        index.remove(value, position);
                    }
                }
                self.live -= 1;
            }
        }
        // Nothing is indexed once the last row is gone
        if self.live == 0 {
            self.slots.clear();
        }
        debug!(table = %self.name, count = targets.len(), "delete");
        targets.len()
    }

    /// Drops every row and resets the indexes, keeping the schema
    pub fn clear(&mut self) {
        self.slots.clear();
        self.live = 0;
        for index in self.indexes.values_mut() {
            index.clear();
        }
    }

    /// Fails with a unique violation if an indexed value of `row` is held by
    /// a row other than the one at `except`
    fn check_unique(&self, row: &Row, except: Option<usize>) -> Result<()> {
        for (column, index) in &self.indexes {
            if let Some(value) = row.get(column) {
                if !value.is_null() && index.conflicts(value, except) {
                    return Err(Error::UniqueViolation {
                        table: self.name.clone(),
                        column: column.clone(),
                        value: value.to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}
