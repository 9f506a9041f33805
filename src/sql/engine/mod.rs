use tracing::{debug, warn};

use crate::{
    sql::{
        executor::{self, ExecutionResult},
        parser,
    },
    storage::database::Database,
};

/// SQL session for executing statements against one database.
///
/// Each call to [`Session::execute`] runs a single statement to completion.
/// Nothing is carried between statements except the database contents.
#[derive(Debug, Clone, Default)]
pub struct Session {
    database: Database,
}

impl Session {
    pub fn new(database: Database) -> Self {
        Self { database }
    }

    /// Parses and executes a SQL statement
    pub fn execute(&mut self, sql: &str) -> ExecutionResult {
        debug!(database = %self.database.name(), sql, "execute");
        match parser::parse(sql) {
            Ok(stmt) => executor::execute(stmt, &mut self.database),
            Err(err) => {
                warn!(%err, "statement rejected by parser");
                ExecutionResult::Error(err)
            }
        }
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn database_mut(&mut self) -> &mut Database {
        &mut self.database
    }

    pub fn into_database(self) -> Database {
        self.database
    }
}
