//! The connection capability and the rows it yields.

use crate::dialect::SQLDialect;
use crate::error::Result;
use chaos_types::Value;

/// One result row: column name to value, in select order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    columns: Vec<(String, Value)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            columns: Vec::with_capacity(capacity),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.columns
            .iter()
            .find(|(column, _)| column == name)
            .map(|(_, value)| value)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Value> {
        self.columns
            .iter_mut()
            .find(|(column, _)| column == name)
            .map(|(_, value)| value)
    }

    /// Sets a column, replacing an existing value in place.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        let name = name.into();
        let value = value.into();
        match self.get_mut(&name) {
            Some(slot) => Some(core::mem::replace(slot, value)),
            None => {
                self.columns.push((name, value));
                None
            }
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        let idx = self.columns.iter().position(|(column, _)| column == name)?;
        Some(self.columns.remove(idx).1)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns
            .iter()
            .map(|(column, value)| (column.as_str(), value))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(column, _)| column.as_str())
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut row = Row::new();
        for (key, value) in iter {
            row.insert(key, value);
        }
        row
    }
}

impl IntoIterator for Row {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.columns.into_iter()
    }
}

pub type Rows = Vec<Row>;

/// Executes SQL text against a backend.
///
/// Implementations own transport, pooling and transactions. Statements that
/// return no rows yield an empty vector.
pub trait Connection {
    fn dialect(&self) -> &dyn SQLDialect;

    fn execute(&self, sql: &str) -> Result<Rows>;

    /// Key generated by the most recent insert, if any.
    fn last_insert_id(&self) -> Option<Value>;
}

impl<C: Connection + ?Sized> Connection for &C {
    fn dialect(&self) -> &dyn SQLDialect {
        (**self).dialect()
    }

    fn execute(&self, sql: &str) -> Result<Rows> {
        (**self).execute(sql)
    }

    fn last_insert_id(&self) -> Option<Value> {
        (**self).last_insert_id()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_preserves_order_and_replaces() {
        let mut row: Row = [("id", Value::from(1)), ("name", Value::from("a"))]
            .into_iter()
            .collect();
        assert_eq!(row.insert("id", 2), Some(Value::Integer(1)));
        assert_eq!(row.keys().collect::<Vec<_>>(), ["id", "name"]);
        assert_eq!(row.get("id"), Some(&Value::Integer(2)));
        assert_eq!(row.remove("name"), Some(Value::from("a")));
        assert_eq!(row.len(), 1);
    }
}
