use crate::collection::Collection;
use crate::database::Database;
use crate::entity::Entity;
use crate::relationship::Embed;
use crate::schema::Schema;
use chaos_core::condition::func;
use chaos_core::{Column, ConditionTree, Connection, Order, Result, Rows, Select, ToSQL, Value};
use std::sync::Arc;

/// A `SELECT` over one model that hydrates entities and embeds relations.
///
/// Created with [`Database::query`]. Conditions accumulate with `AND`.
#[derive(Debug)]
pub struct Query<'db, C: Connection> {
    db: &'db Database<C>,
    schema: Arc<Schema>,
    select: Select,
    embed: Embed,
}

impl<'db, C: Connection> Query<'db, C> {
    pub(crate) fn new(db: &'db Database<C>, schema: Arc<Schema>) -> Self {
        let select = Select::new().from(schema.source_name());
        Self {
            db,
            schema,
            select,
            embed: Embed::new(),
        }
    }

    #[must_use]
    pub fn fields<I, T>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Column>,
    {
        self.select = self.select.fields(fields);
        self
    }

    #[must_use]
    pub fn r#where(mut self, condition: impl Into<ConditionTree>) -> Self {
        self.select = self.select.r#where(condition);
        self
    }

    /// Adds conditions written in the JSON condition syntax.
    pub fn conditions(self, conditions: &serde_json::Value) -> Result<Self> {
        let tree = ConditionTree::from_json(conditions)?;
        Ok(self.r#where(tree))
    }

    #[must_use]
    pub fn order<I, O>(mut self, order: I) -> Self
    where
        I: IntoIterator<Item = O>,
        O: Into<Order>,
    {
        self.select = self.select.order(order);
        self
    }

    #[must_use]
    pub fn group<I, T>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Column>,
    {
        self.select = self.select.group(fields);
        self
    }

    #[must_use]
    pub fn having(mut self, condition: impl Into<ConditionTree>) -> Self {
        self.select = self.select.having(condition);
        self
    }

    #[must_use]
    pub fn limit(mut self, limit: u64) -> Self {
        self.select = self.select.limit(limit);
        self
    }

    #[must_use]
    pub fn offset(mut self, offset: u64) -> Self {
        self.select = self.select.offset(offset);
        self
    }

    #[must_use]
    pub fn page(mut self, page: u64) -> Self {
        self.select = self.select.page(page);
        self
    }

    /// Relations to embed on fetched entities, as dotted paths.
    #[must_use]
    pub fn embed<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for path in paths {
            self.embed.insert(path.as_ref());
        }
        self
    }

    #[must_use]
    pub(crate) fn embed_tree(mut self, tree: Embed) -> Self {
        self.embed.extend(tree);
        self
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn statement(&self) -> &Select {
        &self.select
    }

    pub fn to_sql(&self) -> Result<String> {
        self.select.to_sql(self.db.dialect())
    }

    /// Raw rows, without casting or embedding.
    pub fn rows(&self) -> Result<Rows> {
        self.db.execute(&self.select)
    }

    pub fn all(&self) -> Result<Collection> {
        self.load(&self.select)
    }

    pub fn first(&self) -> Result<Option<Entity>> {
        let select = self.select.clone().limit(1);
        Ok(self.load(&select)?.into_iter().next())
    }

    /// Number of matching rows, ignoring field selection, order and limit.
    pub fn count(&self) -> Result<u64> {
        let select = self
            .select
            .clone()
            .clear_fields()
            .clear_order()
            .limit(0)
            .fields([Column::expr(func("count", [])).alias("count")]);
        let rows = self.db.execute(&select)?;
        let count = rows
            .first()
            .and_then(|row| row.get("count"))
            .and_then(Value::as_i64)
            .unwrap_or(0);
        Ok(u64::try_from(count).unwrap_or(0))
    }

    fn load(&self, select: &Select) -> Result<Collection> {
        let rows = self.db.execute(select)?;
        let mut entities = Vec::with_capacity(rows.len());
        for row in rows {
            entities.push(self.schema.hydrate(row)?);
        }
        let mut collection = Collection::with_entities(self.schema.model(), entities);
        self.db
            .embed_tree(self.schema.model(), collection.as_mut_slice(), &self.embed)?;
        Ok(collection)
    }
}
