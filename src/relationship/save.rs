use super::{Embed, Reconciliation, RelationKind, Relationship, ThroughInfo};
use crate::database::Database;
use crate::entity::Entity;
use chaos_core::condition::{and, eq, field, in_list, is_null, or};
use chaos_core::{
    ChaosError, ConditionTree, Connection, Delete, Key, Result, Row, Value, chaos_trace_save,
};
use hashbrown::HashSet;

impl Relationship {
    /// Persists the related data held under this relation on `entity`.
    ///
    /// Relations that are not loaded on the entity are left untouched.
    pub(crate) fn save<C: Connection>(
        &self,
        db: &Database<C>,
        entity: &mut Entity,
        nested: &Embed,
    ) -> Result<()> {
        if !entity.is_loaded(&self.name) {
            return Ok(());
        }
        match &self.kind {
            RelationKind::BelongsTo => self.save_belongs_to(db, entity, nested),
            RelationKind::HasOne => self.save_has_one(db, entity, nested),
            RelationKind::HasMany => self.save_has_many(db, entity, nested),
            RelationKind::HasManyThrough(info) => self.save_through(db, entity, nested, info),
        }
    }

    fn save_belongs_to<C: Connection>(
        &self,
        db: &Database<C>,
        entity: &mut Entity,
        nested: &Embed,
    ) -> Result<()> {
        let key = match entity.one_mut(&self.name)? {
            Some(related) => {
                db.save_tree(related, nested)?;
                self.required_key(related, self.to_key(), &self.to)?
            }
            None => return Ok(()),
        };
        entity.set(self.from_key(), key);
        Ok(())
    }

    fn save_has_one<C: Connection>(
        &self,
        db: &Database<C>,
        entity: &mut Entity,
        nested: &Embed,
    ) -> Result<()> {
        let owner_key = self.required_key(entity, self.from_key(), &self.from)?;
        if let Some(child) = entity.one_mut(&self.name)? {
            child.set(self.to_key(), owner_key);
            db.save_tree(child, nested)?;
        }
        Ok(())
    }

    /// Saves every child, then deletes the stored children no longer present
    /// with a single statement.
    fn save_has_many<C: Connection>(
        &self,
        db: &Database<C>,
        entity: &mut Entity,
        nested: &Embed,
    ) -> Result<()> {
        let owner_key = self.required_key(entity, self.from_key(), &self.from)?;
        let schema = db.schema(&self.to)?;
        let key = schema.key_name();
        if !schema.has_field(key) {
            return Err(ChaosError::Integrity(format!(
                "The `{key}` key is missing on `{}` for the `{}` relationship.",
                self.to, self.name
            )));
        }

        let stored = db
            .query(&self.to)?
            .fields([key])
            .r#where(self.match_condition(entity)?)
            .rows()?;

        let mut present = HashSet::new();
        let mut inserted = 0usize;
        for child in entity.many_mut(&self.name)?.iter_mut() {
            child.set(self.to_key(), owner_key.clone());
            if !child.exists() {
                inserted += 1;
            }
            db.save_tree(child, nested)?;
            if let Some(id) = child.get(key).and_then(Value::key) {
                present.insert(id);
            }
        }

        let stale: Vec<Value> = stored
            .iter()
            .filter_map(|row| row.get(key))
            .filter(|id| id.key().is_some_and(|id| !present.contains(&id)))
            .cloned()
            .collect();
        let deleted = stale.len();
        if !stale.is_empty() {
            db.execute(
                &Delete::new()
                    .from(schema.source_name())
                    .r#where(in_list(field(key), stale)),
            )?;
        }
        chaos_trace_save!(
            self.name,
            present.len().saturating_sub(inserted),
            inserted,
            deleted
        );
        Ok(())
    }

    fn save_through<C: Connection>(
        &self,
        db: &Database<C>,
        entity: &mut Entity,
        nested: &Embed,
        info: &ThroughInfo,
    ) -> Result<()> {
        if !entity.is_loaded(&info.through) {
            return Ok(());
        }
        let through = db.relation(&self.from, &info.through)?;
        let using = db.relation(&info.pivot, &info.using)?;
        let owner_key = through.required_key(entity, through.from_key(), &self.from)?;
        let schema = db.schema(&info.pivot)?;
        let pivot_key = schema.has_field(schema.key_name()).then(|| schema.key_name());
        let owner_match = through.match_condition(entity)?;

        let pivots = entity.many_mut(&info.through)?;

        // far side first so every pivot can carry both keys
        for pivot in pivots.iter_mut() {
            if pivot.is_loaded(&info.using) {
                let far_key = match pivot.one_mut(&info.using)? {
                    Some(far) => {
                        db.save_tree(far, nested)?;
                        Some(using.required_key(far, using.to_key(), &using.to)?)
                    }
                    None => None,
                };
                if let Some(far_key) = far_key {
                    pivot.set(using.from_key(), far_key);
                }
            }
            pivot.set(through.to_key(), owner_key.clone());
        }

        match info.mode {
            Reconciliation::Flush => {
                db.execute(&Delete::new().from(schema.source_name()).r#where(owner_match))?;
                for pivot in pivots.iter_mut() {
                    pivot.reset_new(pivot_key);
                    db.persist(pivot)?;
                }
                chaos_trace_save!(self.name, 0usize, pivots.len(), "all");
            }
            Reconciliation::Diff => {
                let far_fk = using.from_key();
                let mut stored = Vec::new();
                for row in db.query(&info.pivot)?.r#where(owner_match).rows()? {
                    stored.push(Some(schema.cast_row(row)?));
                }

                // a stored pivot keeps its own row while the far key is unchanged;
                // the rest share the unclaimed rows by far key
                let mut claimed: Vec<Option<Row>> = Vec::with_capacity(pivots.len());
                for pivot in pivots.iter() {
                    let far = pivot.get(far_fk).and_then(Value::key);
                    let id = pivot_key
                        .filter(|_| pivot.exists())
                        .and_then(|key| pivot.stored(key).and_then(Value::key).map(|id| (key, id)));
                    let own = match (id, far) {
                        (Some((key, id)), Some(far)) => claim(&mut stored, |row| {
                            holds(row, key, &id) && holds(row, far_fk, &far)
                        }),
                        _ => None,
                    };
                    claimed.push(own);
                }
                for (pivot, slot) in pivots.iter().zip(claimed.iter_mut()) {
                    if slot.is_some() {
                        continue;
                    }
                    if let Some(far) = pivot.get(far_fk).and_then(Value::key) {
                        *slot = claim(&mut stored, |row| holds(row, far_fk, &far));
                    }
                }

                let (mut kept, mut inserted) = (0usize, 0usize);
                for (pivot, row) in pivots.iter_mut().zip(claimed) {
                    match row {
                        Some(row) => {
                            pivot.adopt(row, pivot_key);
                            kept += 1;
                        }
                        None => {
                            if pivot.exists() {
                                pivot.reset_new(pivot_key);
                            }
                            inserted += 1;
                        }
                    }
                    db.persist(pivot)?;
                }

                let stale: Vec<Row> = stored.into_iter().flatten().collect();
                let deleted = stale.len();
                if !stale.is_empty() {
                    let condition = stale_condition(&stale, pivot_key);
                    db.execute(&Delete::new().from(schema.source_name()).r#where(condition))?;
                }
                chaos_trace_save!(self.name, kept, inserted, deleted);
            }
        }
        Ok(())
    }
}

/// Takes the first unclaimed stored row accepted by `accept`.
fn claim(stored: &mut [Option<Row>], accept: impl Fn(&Row) -> bool) -> Option<Row> {
    stored
        .iter_mut()
        .find(|row| matches!(row, Some(row) if accept(row)))?
        .take()
}

fn holds(row: &Row, field: &str, key: &Key) -> bool {
    row.get(field).and_then(Value::key).as_ref() == Some(key)
}

/// Matches exactly the stale pivot rows: by primary key when every row has
/// one, otherwise by all stored values.
fn stale_condition(rows: &[Row], key: Option<&str>) -> ConditionTree {
    if let Some(key) = key {
        let ids: Option<Vec<Value>> = rows
            .iter()
            .map(|row| row.get(key).filter(|id| id.key().is_some()).cloned())
            .collect();
        if let Some(ids) = ids {
            return in_list(field(key), ids);
        }
    }
    let mut seen: HashSet<Vec<(String, Option<Key>)>> = HashSet::new();
    or(rows
        .iter()
        .filter(|row| {
            seen.insert(
                row.iter()
                    .map(|(name, value)| (name.to_owned(), value.key()))
                    .collect(),
            )
        })
        .map(|row| {
            and(row.iter().map(|(name, value)| match value {
                Value::Null => is_null(field(name)),
                value => eq(field(name), value.clone()),
            }))
        }))
}
