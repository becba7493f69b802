//! The facade tying a [`Connection`] to a [`Registry`].

use crate::collection::Collection;
use crate::entity::Entity;
use crate::query::Query;
use crate::registry::Registry;
use crate::relationship::{Embed, RelationKind, Relationship};
use crate::schema::Schema;
use chaos_core::condition::{eq, field};
use chaos_core::{
    ChaosError, Connection, Delete, Insert, Result, Rows, SQLDialect, ToSQL, Update, Value,
    chaos_trace_query,
};
use std::sync::Arc;

/// Options for [`Database::save_with`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SaveOptions {
    /// Relations to cascade into, as dotted paths.
    pub embed: Vec<String>,
}

impl SaveOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn embed<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.embed.extend(paths.into_iter().map(Into::into));
        self
    }
}

/// Runs statements for registered models over one connection.
///
/// ```no_run
/// # use chaos::{Database, Registry, Schema, FieldSpec};
/// # fn demo<C: chaos::Connection>(conn: C) -> chaos::Result<()> {
/// let registry = Registry::new()
///     .register(Schema::new("Gallery").field(FieldSpec::new("id", "serial")))?;
/// let db = Database::new(conn, registry);
/// let galleries = db.query("Gallery")?.embed(["images.tags"]).all()?;
/// # let _ = galleries;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Database<C: Connection> {
    connection: C,
    registry: Arc<Registry>,
}

impl<C: Connection> Database<C> {
    pub fn new(connection: C, registry: impl Into<Arc<Registry>>) -> Self {
        Self {
            connection,
            registry: registry.into(),
        }
    }

    pub fn connection(&self) -> &C {
        &self.connection
    }

    pub fn dialect(&self) -> &dyn SQLDialect {
        self.connection.dialect()
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn schema(&self, model: &str) -> Result<Arc<Schema>> {
        self.registry.schema(model)
    }

    pub fn relation(&self, model: &str, name: &str) -> Result<Relationship> {
        self.registry.relation(model, name)
    }

    /// Renders `statement` with the connection's dialect and runs it.
    pub fn execute(&self, statement: &dyn ToSQL) -> Result<Rows> {
        let sql = statement.to_sql(self.dialect())?;
        self.execute_sql(&sql)
    }

    pub fn execute_sql(&self, sql: &str) -> Result<Rows> {
        chaos_trace_query!(sql);
        self.connection.execute(sql)
    }

    pub fn query(&self, model: &str) -> Result<Query<'_, C>> {
        Ok(Query::new(self, self.schema(model)?))
    }

    /// Embeds relations on already fetched entities.
    pub fn embed<I, S>(&self, collection: &mut Collection, paths: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let tree = Embed::parse(paths);
        let model = collection.model().to_owned();
        self.embed_tree(&model, collection.as_mut_slice(), &tree)
    }

    pub(crate) fn embed_tree(
        &self,
        model: &str,
        entities: &mut [Entity],
        tree: &Embed,
    ) -> Result<()> {
        for (name, nested) in tree.iter() {
            self.relation(model, name)?.embed(self, entities, nested)?;
        }
        Ok(())
    }

    /// Creates the table of `model`.
    pub fn create_table(&self, model: &str) -> Result<()> {
        self.execute(&self.schema(model)?.create_table())?;
        Ok(())
    }

    /// Drops the table of `model` if it exists.
    pub fn drop_table(&self, model: &str) -> Result<()> {
        self.execute(&self.schema(model)?.drop_table())?;
        Ok(())
    }

    /// Persists `entity` alone.
    pub fn save(&self, entity: &mut Entity) -> Result<()> {
        self.save_with(entity, &SaveOptions::default())
    }

    /// Persists `entity` and cascades into the relations named in `options`.
    ///
    /// `BelongsTo` relations are saved first so their keys can be copied onto
    /// the entity; all other relations are saved after it.
    pub fn save_with(&self, entity: &mut Entity, options: &SaveOptions) -> Result<()> {
        self.save_tree(entity, &Embed::parse(&options.embed))
    }

    pub fn save_all(&self, collection: &mut Collection, options: &SaveOptions) -> Result<()> {
        let tree = Embed::parse(&options.embed);
        for entity in collection.iter_mut() {
            self.save_tree(entity, &tree)?;
        }
        Ok(())
    }

    pub(crate) fn save_tree(&self, entity: &mut Entity, tree: &Embed) -> Result<()> {
        let mut relations = Vec::with_capacity(tree.len());
        for (name, nested) in tree.iter() {
            relations.push((self.relation(entity.model(), name)?, nested));
        }

        for (relation, nested) in &relations {
            if relation.kind == RelationKind::BelongsTo {
                relation.save(self, entity, nested)?;
            }
        }
        self.persist(entity)?;
        for (relation, nested) in &relations {
            if relation.kind != RelationKind::BelongsTo {
                relation.save(self, entity, nested)?;
            }
        }
        Ok(())
    }

    /// Inserts a new entity or updates the modified fields of a stored one.
    ///
    /// Only fields declared on the schema are written. An unchanged stored
    /// entity issues no statement.
    pub(crate) fn persist(&self, entity: &mut Entity) -> Result<()> {
        let schema = self.schema(entity.model())?;
        let key = schema.key_name();

        if entity.exists() {
            let changes: Vec<(String, Value)> = entity
                .fields()
                .iter()
                .filter(|(name, _)| schema.has_field(name) && entity.is_modified(name))
                .map(|(name, value)| (name.to_owned(), value.clone()))
                .collect();
            if changes.is_empty() {
                return Ok(());
            }
            let id = stored_key(entity, key, schema.model())?;
            self.execute(
                &Update::new()
                    .table(schema.source_name())
                    .values(changes)
                    .r#where(eq(field(key), id)),
            )?;
        } else {
            let values: Vec<(String, Value)> = entity
                .fields()
                .iter()
                .filter(|(name, value)| {
                    schema.has_field(name) && !(*name == key && matches!(value, Value::Null))
                })
                .map(|(name, value)| (name.to_owned(), value.clone()))
                .collect();
            self.execute(&Insert::new().into(schema.source_name()).values(values))?;

            let missing_key = entity.get(key).is_none_or(|id| matches!(id, Value::Null));
            if missing_key && schema.has_field(key) {
                if let Some(id) = self.connection.last_insert_id() {
                    entity.set(key, id);
                }
            }
        }
        entity.mark_persisted();
        Ok(())
    }

    /// Deletes the stored row of `entity`, which becomes new again.
    pub fn delete(&self, entity: &mut Entity) -> Result<()> {
        let schema = self.schema(entity.model())?;
        let key = schema.key_name();
        let id = stored_key(entity, key, schema.model())?;
        self.execute(
            &Delete::new()
                .from(schema.source_name())
                .r#where(eq(field(key), id)),
        )?;
        entity.reset_new(None);
        Ok(())
    }
}

/// Key value the stored row is known by.
fn stored_key(entity: &Entity, key: &str, model: &str) -> Result<Value> {
    match entity.stored(key).or_else(|| entity.get(key)) {
        Some(id) if !matches!(id, Value::Null) => Ok(id.clone()),
        _ => Err(ChaosError::Integrity(format!(
            "The `{key}` key is missing on stored `{model}` entity."
        ))),
    }
}
