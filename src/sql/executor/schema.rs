use crate::{
    error::Result,
    sql::{
        executor::{ExecutionResult, Executor, Summary},
        parser::ast::Column,
        schema::{ColumnDefinition, Schema},
    },
    storage::database::Database,
};

/// CREATE TABLE executor
pub struct CreateTable {
    name: String,
    columns: Vec<Column>,
}

impl CreateTable {
    pub fn new(name: String, columns: Vec<Column>) -> Box<Self> {
        Box::new(Self { name, columns })
    }
}

impl Executor for CreateTable {
    fn execute(self: Box<Self>, db: &mut Database) -> Result<ExecutionResult> {
        let CreateTable { name, columns } = *self;
        // Columns are nullable unless declared NOT NULL or PRIMARY KEY
        let schema = Schema::new(
            columns
                .into_iter()
                .map(|c| {
                    ColumnDefinition::new(
                        c.name,
                        c.column_type,
                        c.primary_key,
                        c.unique,
                        c.nullable.unwrap_or(true),
                    )
                })
                .collect(),
        )?;
        db.create_table(&name, schema)?;
        Ok(ExecutionResult::Success(Summary::new(
            format!("Table '{}' created", name),
            0,
        )))
    }
}
