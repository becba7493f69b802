//! Connection and transaction handling for the rusqlite driver

/// SQLite transaction types
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SQLiteTransactionType {
    #[default]
    /// A deferred transaction is the default - it does not acquire locks until needed
    Deferred,
    /// An immediate transaction acquires a RESERVED lock immediately
    Immediate,
    /// An exclusive transaction acquires an EXCLUSIVE lock immediately
    Exclusive,
}

impl SQLiteTransactionType {
    /// The `BEGIN` statement opening this kind of transaction.
    pub const fn begin(&self) -> &'static str {
        match self {
            SQLiteTransactionType::Deferred => "BEGIN DEFERRED",
            SQLiteTransactionType::Immediate => "BEGIN IMMEDIATE",
            SQLiteTransactionType::Exclusive => "BEGIN EXCLUSIVE",
        }
    }
}

#[cfg(feature = "rusqlite")]
pub use driver::SqliteConnection;

#[cfg(feature = "rusqlite")]
mod driver {
    use super::SQLiteTransactionType;
    use crate::SQLiteDialect;
    use chaos_core::{Connection, Result, Row, Rows, SQLDialect, Value};
    use rusqlite::types::ValueRef;

    /// [`Connection`] over a `rusqlite` handle.
    #[derive(Debug)]
    pub struct SqliteConnection {
        conn: rusqlite::Connection,
        dialect: SQLiteDialect,
    }

    impl SqliteConnection {
        pub fn new(conn: rusqlite::Connection) -> Self {
            Self {
                conn,
                dialect: SQLiteDialect::new(),
            }
        }

        pub fn open_in_memory() -> Result<Self> {
            Ok(Self::new(rusqlite::Connection::open_in_memory()?))
        }

        pub fn open(path: impl AsRef<std::path::Path>) -> Result<Self> {
            Ok(Self::new(rusqlite::Connection::open(path)?))
        }

        #[must_use]
        pub fn with_dialect(mut self, dialect: SQLiteDialect) -> Self {
            self.dialect = dialect;
            self
        }

        pub fn inner(&self) -> &rusqlite::Connection {
            &self.conn
        }

        /// Runs `f` inside a transaction, committing on `Ok` and rolling back on `Err`.
        pub fn transaction<T, F>(&self, behavior: SQLiteTransactionType, f: F) -> Result<T>
        where
            F: FnOnce(&Self) -> Result<T>,
        {
            self.conn.execute_batch(behavior.begin())?;
            match f(self) {
                Ok(value) => {
                    self.conn.execute_batch("COMMIT")?;
                    Ok(value)
                }
                Err(err) => {
                    self.conn.execute_batch("ROLLBACK")?;
                    Err(err)
                }
            }
        }
    }

    impl From<rusqlite::Connection> for SqliteConnection {
        fn from(conn: rusqlite::Connection) -> Self {
            Self::new(conn)
        }
    }

    impl Connection for SqliteConnection {
        fn dialect(&self) -> &dyn SQLDialect {
            &self.dialect
        }

        fn execute(&self, sql: &str) -> Result<Rows> {
            let mut stmt = self.conn.prepare(sql)?;
            if stmt.column_count() == 0 {
                stmt.execute([])?;
                return Ok(Rows::new());
            }

            let names: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
            let mut rows = stmt.query([])?;
            let mut out = Rows::new();
            while let Some(row) = rows.next()? {
                let mut mapped = Row::with_capacity(names.len());
                for (idx, name) in names.iter().enumerate() {
                    mapped.insert(name.as_str(), value(row.get_ref(idx)?));
                }
                out.push(mapped);
            }
            Ok(out)
        }

        fn last_insert_id(&self) -> Option<Value> {
            match self.conn.last_insert_rowid() {
                0 => None,
                id => Some(Value::Integer(id)),
            }
        }
    }

    fn value(raw: ValueRef<'_>) -> Value {
        match raw {
            ValueRef::Null => Value::Null,
            ValueRef::Integer(i) => Value::Integer(i),
            ValueRef::Real(f) => Value::Float(f),
            ValueRef::Text(bytes) => Value::Text(String::from_utf8_lossy(bytes).into_owned()),
            ValueRef::Blob(bytes) => Value::Binary(bytes.to_vec()),
        }
    }

}
