use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    error::{Error, Result},
    sql::{schema::Schema, types::Value},
    storage::{database::Database, table::Table},
};

/// Full logical contents of a database: every schema and every row.
///
/// Indexes are not part of the snapshot; they are rebuilt from the rows
/// on restore.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub schemas: BTreeMap<String, Schema>,
    pub rows: BTreeMap<String, Vec<BTreeMap<String, Value>>>,
}

impl Snapshot {
    /// Serializes the snapshot with bincode
    pub fn encode(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    pub fn decode(data: &[u8]) -> Result<Self> {
        Ok(bincode::deserialize(data)?)
    }
}

impl Database {
    pub fn snapshot(&self) -> Snapshot {
        let mut snapshot = Snapshot::default();
        for (name, table) in &self.tables {
            snapshot.schemas.insert(name.clone(), table.schema().clone());
            snapshot
                .rows
                .insert(name.clone(), table.rows().map(|row| row.to_map()).collect());
        }
        snapshot
    }

    /// Replaces every table with the contents of `snapshot`.
    ///
    /// Schemas are revalidated and rows re-inserted through the normal
    /// constraint checks. On any failure the database is left untouched.
    pub fn restore(&mut self, snapshot: Snapshot) -> Result<()> {
        if let Some(orphan) = snapshot.rows.keys().find(|t| !snapshot.schemas.contains_key(*t)) {
            return Err(Error::TableNotFound(orphan.clone()));
        }

        let mut tables = BTreeMap::new();
        let mut row_count = 0;
        for (name, schema) in snapshot.schemas {
            let schema = Schema::new(schema.columns().to_vec())?;
            let mut table = Table::new(name.clone(), schema);
            for values in snapshot.rows.get(&name).into_iter().flatten() {
                table.insert(values)?;
                row_count += 1;
            }
            tables.insert(name, table);
        }

        info!(database = %self.name(), tables = tables.len(), rows = row_count, "restore snapshot");
        self.tables = tables;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::{
        collections::{BTreeMap, HashSet},
        io::{Read, Seek, SeekFrom, Write},
    };

    use super::Snapshot;
    use crate::{
        error::{ErrorKind, Result},
        sql::{
            schema::{ColumnDefinition, Schema},
            types::{ColumnType, Row, Value},
        },
        storage::database::Database,
    };

    fn populated() -> Result<Database> {
        let mut db = Database::new("snap");
        db.create_table(
            "users",
            Schema::new(vec![
                ColumnDefinition::new("id", ColumnType::Integer, true, false, false),
                ColumnDefinition::new("email", ColumnType::VarChar(30), false, true, true),
                ColumnDefinition::new("active", ColumnType::Boolean, false, false, true),
            ])?,
        )?;
        for id in 1..=5 {
            let mut values = BTreeMap::new();
            values.insert("id".to_string(), Value::Integer(id));
            values.insert("email".to_string(), Value::String(format!("u{}@x", id)));
            values.insert("active".to_string(), Value::Boolean(id % 2 == 0));
            db.insert("users", &values)?;
        }
        db.delete("users", |row| row.get("id") == Some(&Value::Integer(3)))?;
        Ok(db)
    }

    fn row_set(db: &Database, table: &str) -> Result<HashSet<String>> {
        Ok(db.select_all(table)?.iter().map(Row::to_string).collect())
    }

    #[test]
    fn test_restore_roundtrip() -> Result<()> {
        let original = populated()?;
        let mut restored = Database::new("copy");
        restored.restore(original.snapshot())?;

        assert_eq!(restored.list_tables(), original.list_tables());
        assert_eq!(row_set(&restored, "users")?, row_set(&original, "users")?);
        for id in 0..=6 {
            let key = Value::Integer(id);
            assert_eq!(
                restored.select_by_index("users", "id", &key)?,
                original.select_by_index("users", "id", &key)?
            );
        }
        let email = Value::String("u4@x".into());
        assert_eq!(restored.select_by_index("users", "email", &email)?.len(), 1);
        Ok(())
    }

    #[test]
    fn test_restore_rejects_bad_snapshot() -> Result<()> {
        let mut db = populated()?;
        let mut snapshot = db.snapshot();
        let rows = snapshot.rows.get_mut("users").expect("users rows");
        let duplicate = rows[0].clone();
        rows.push(duplicate);

        let err = db.restore(snapshot).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConstraintViolation);
        assert_eq!(db.get_table("users")?.len(), 4);

        let mut orphan = Snapshot::default();
        orphan.rows.insert("ghost".into(), vec![]);
        assert_eq!(db.restore(orphan).unwrap_err().kind(), ErrorKind::TableNotFound);
        Ok(())
    }

    #[test]
    fn test_encoded_snapshot_through_file() -> Result<()> {
        let original = populated()?;
        let bytes = original.snapshot().encode()?;

        let mut file = tempfile::tempfile()?;
        file.write_all(&bytes)?;
        file.seek(SeekFrom::Start(0))?;
        let mut read_back = Vec::new();
        file.read_to_end(&mut read_back)?;

        let snapshot = Snapshot::decode(&read_back)?;
        assert_eq!(snapshot, original.snapshot());

        let mut restored = Database::default();
        restored.restore(snapshot)?;
        assert_eq!(row_set(&restored, "users")?, row_set(&original, "users")?);

        assert_eq!(Snapshot::decode(&[0xff]).unwrap_err().kind(), ErrorKind::Internal);
        Ok(())
    }
}
