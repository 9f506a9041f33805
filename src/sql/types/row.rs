use std::{collections::BTreeMap, fmt::Display};

use serde::{Deserialize, Serialize};

use super::Value;

/// An immutable, ordered mapping of column name to value.
///
/// Rows are never mutated in place; every change builds a new `Row`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Row {
    entries: Vec<(String, Value)>,
}

impl Row {
    pub fn new(entries: Vec<(String, Value)>) -> Self {
        Self { entries }
    }

    /// Returns the value of a column, or None if the row has no such column
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    pub fn contains(&self, column: &str) -> bool {
        self.get(column).is_some()
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Builds a new row with the given columns replaced.
    ///
    /// Columns the row does not have are ignored.
    pub fn with_values(&self, updates: &BTreeMap<String, Value>) -> Row {
        Row {
            entries: self
                .entries
                .iter()
                .map(|(name, value)| {
                    let value = updates.get(name).unwrap_or(value);
                    (name.clone(), value.clone())
                })
                .collect(),
        }
    }

    /// Copies the named columns, in the requested order, into a new row
    pub fn project<S: AsRef<str>>(&self, columns: &[S]) -> Row {
        let pairs = columns.iter().map(|c| (c, c)).collect::<Vec<_>>();
        self.project_as(&pairs)
    }

    /// Like [`Row::project`], but each `(output, source)` pair stores the
    /// value of `source` under the name `output`
    pub fn project_as<S: AsRef<str>>(&self, columns: &[(S, S)]) -> Row {
        Row {
            entries: columns
                .iter()
                .filter_map(|(output, source)| {
                    self.get(source.as_ref())
                        .map(|v| (output.as_ref().to_string(), v.clone()))
                })
                .collect(),
        }
    }

    /// Combines a left and right row into one, qualifying each column
    /// with its source table (e.g. `users.id`, `todos.id`)
    pub fn merge_qualified(left_table: &str, left: &Row, right_table: &str, right: &Row) -> Row {
        let qualify = |table: &str, row: &Row| {
            row.entries
                .iter()
                .map(|(name, value)| (format!("{}.{}", table, name), value.clone()))
                .collect::<Vec<_>>()
        };
        let mut entries = qualify(left_table, left);
        entries.extend(qualify(right_table, right));
        Row { entries }
    }

    pub fn to_map(&self) -> BTreeMap<String, Value> {
        self.entries.iter().cloned().collect()
    }
}

impl Display for Row {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let values = self
            .iter()
            .map(|(name, value)| format!("{}={}", name, value))
            .collect::<Vec<_>>();
        write!(f, "Row({})", values.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::Row;
    use crate::sql::types::Value;

    fn user(id: i64, name: &str) -> Row {
        Row::new(vec![
            ("id".to_string(), Value::Integer(id)),
            ("name".to_string(), Value::String(name.to_string())),
        ])
    }

    #[test]
    fn test_with_values_leaves_original_untouched() {
        let row = user(1, "alice");
        let mut updates = BTreeMap::new();
        updates.insert("name".to_string(), Value::String("bob".into()));
        updates.insert("missing".to_string(), Value::Integer(3));

        let updated = row.with_values(&updates);
        assert_eq!(updated, user(1, "bob"));
        assert_eq!(row, user(1, "alice"));
        assert!(!updated.contains("missing"));
    }

    #[test]
    fn test_project() {
        let row = user(7, "carol");
        let projected = row.project(&["name", "id"]);
        assert_eq!(projected.columns().collect::<Vec<_>>(), vec!["name", "id"]);
        assert_eq!(projected.get("id"), Some(&Value::Integer(7)));

        let renamed = row.project_as(&[("label", "name"), ("missing", "nope")]);
        assert_eq!(renamed.columns().collect::<Vec<_>>(), vec!["label"]);
        assert_eq!(renamed.get("label"), row.get("name"));
    }

    #[test]
    fn test_merge_qualified() {
        let todo = Row::new(vec![
            ("id".to_string(), Value::Integer(10)),
            ("user_id".to_string(), Value::Integer(1)),
        ]);
        let merged = Row::merge_qualified("users", &user(1, "alice"), "todos", &todo);
        assert_eq!(
            merged.columns().collect::<Vec<_>>(),
            vec!["users.id", "users.name", "todos.id", "todos.user_id"]
        );
        assert_eq!(merged.get("todos.id"), Some(&Value::Integer(10)));
        assert_eq!(merged.to_string(), "Row(users.id=1, users.name=alice, todos.id=10, todos.user_id=1)");
    }
}
