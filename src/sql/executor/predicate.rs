use std::cmp::Ordering;

use crate::{
    error::{Error, Result},
    sql::{
        parser::ast::{Condition, Operator},
        schema::ColumnDefinition,
        types::{Row, Value},
    },
    storage::table::Table,
};

/// Compiled WHERE clause: the literal is already coerced to the column type
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    column: String,
    operator: Operator,
    value: Value,
}

impl Predicate {
    /// `column` is the key the predicate reads from each row
    pub fn compile(
        column: impl Into<String>,
        definition: &ColumnDefinition,
        operator: Operator,
        literal: &Value,
    ) -> Result<Self> {
        Ok(Self {
            column: column.into(),
            operator,
            value: definition.coerce(literal)?,
        })
    }

    /// Compiles a condition against a single table.
    /// The column may be bare or qualified with the table's own name.
    pub fn for_table(table: &Table, condition: &Condition) -> Result<Self> {
        let definition = resolve_column(table, &condition.column)?;
        Self::compile(
            definition.name.clone(),
            definition,
            condition.operator,
            &condition.value,
        )
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn is_equality(&self) -> bool {
        self.operator == Operator::Equal
    }

    /// A row without the column never matches
    pub fn matches(&self, row: &Row) -> bool {
        row.get(&self.column)
            .is_some_and(|value| compare(value, self.operator, &self.value))
    }
}

/// Evaluates `left OP right`.
///
/// `=` and `!=` compare values structurally, so NULL equals NULL.
/// `>` and `<` hold only between comparable values of the same type.
pub fn compare(left: &Value, operator: Operator, right: &Value) -> bool {
    match operator {
        Operator::Equal => left == right,
        Operator::NotEqual => left != right,
        Operator::GreaterThan => left.partial_cmp(right) == Some(Ordering::Greater),
        Operator::LessThan => left.partial_cmp(right) == Some(Ordering::Less),
    }
}

/// Looks up `name` (`column` or `table.column`) in a table's schema
pub fn resolve_column<'a>(table: &'a Table, name: &str) -> Result<&'a ColumnDefinition> {
    let column = match name.split_once('.') {
        Some((qualifier, column)) if qualifier == table.name() => column,
        Some(_) => return Err(Error::column_not_found(table.name(), name)),
        None => name,
    };
    table
        .schema()
        .column(column)
        .ok_or_else(|| Error::column_not_found(table.name(), name))
}

#[cfg(test)]
mod tests {
    use super::{compare, Predicate};
    use crate::{
        error::{ErrorKind, Result},
        sql::{
            parser::ast::{Condition, Operator},
            schema::{ColumnDefinition, Schema},
            types::{ColumnType, Row, Value},
        },
        storage::table::Table,
    };

    fn table() -> Result<Table> {
        Ok(Table::new(
            "users",
            Schema::new(vec![
                ColumnDefinition::new("id", ColumnType::Integer, true, false, false),
                ColumnDefinition::new("active", ColumnType::Boolean, false, false, true),
            ])?,
        ))
    }

    fn condition(column: &str, operator: Operator, value: Value) -> Condition {
        Condition {
            column: column.into(),
            operator,
            value,
        }
    }

    #[test]
    fn test_compare_operators() {
        let one = Value::Integer(1);
        let two = Value::Integer(2);
        assert!(compare(&one, Operator::LessThan, &two));
        assert!(compare(&two, Operator::GreaterThan, &one));
        assert!(compare(&one, Operator::NotEqual, &two));
        assert!(compare(&Value::Null, Operator::Equal, &Value::Null));
        assert!(!compare(&Value::Null, Operator::LessThan, &one));
        assert!(!compare(&Value::String("1".into()), Operator::Equal, &one));
    }

    #[test]
    fn test_predicate_coerces_literal() -> Result<()> {
        let table = table()?;
        let predicate = Predicate::for_table(&table, &condition("users.id", Operator::GreaterThan, Value::String("5".into())))?;
        assert_eq!(predicate.column(), "id");
        assert_eq!(predicate.value(), &Value::Integer(5));

        let row = Row::new(vec![("id".into(), Value::Integer(7)), ("active".into(), Value::Null)]);
        assert!(predicate.matches(&row));

        let by_flag = Predicate::for_table(&table, &condition("active", Operator::Equal, Value::String("TRUE".into())))?;
        assert!(!by_flag.matches(&row));
        assert!(by_flag.is_equality());
        Ok(())
    }

    #[test]
    fn test_predicate_errors() -> Result<()> {
        let table = table()?;
        let err = Predicate::for_table(&table, &condition("email", Operator::Equal, Value::Integer(1))).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ColumnNotFound);
        let err = Predicate::for_table(&table, &condition("todos.id", Operator::Equal, Value::Integer(1))).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ColumnNotFound);
        let err = Predicate::for_table(&table, &condition("id", Operator::Equal, Value::String("abc".into()))).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Type);
        Ok(())
    }
}
