//! In-memory records and the relations embedded on them.

use crate::collection::Collection;
use crate::relationship::{RelationKind, Relationship};
use crate::through::Through;
use chaos_core::{ChaosError, Result, Row, Value};
use hashbrown::HashMap;

/// Relation data attached to an [`Entity`].
#[derive(Debug, Clone, PartialEq)]
pub enum Related {
    /// `BelongsTo` / `HasOne`; `None` when no counterpart exists.
    One(Option<Box<Entity>>),
    /// `HasMany`, in fetch order.
    Many(Collection),
    /// Marker for a loaded `HasManyThrough`; the data lives on the pivot relation.
    Through,
}

/// A record of one model.
///
/// An entity is new until it is hydrated from a row or persisted, after
/// which it keeps a snapshot of the stored values to track modifications.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    model: String,
    fields: Row,
    persisted: Option<Row>,
    relations: HashMap<String, Related>,
}

impl Entity {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            fields: Row::new(),
            persisted: None,
            relations: HashMap::new(),
        }
    }

    /// Builds an entity that mirrors a stored row.
    pub fn hydrated(model: impl Into<String>, row: Row) -> Self {
        Self {
            model: model.into(),
            persisted: Some(row.clone()),
            fields: row,
            relations: HashMap::new(),
        }
    }

    #[must_use]
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(field, value);
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn fields(&self) -> &Row {
        &self.fields
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(field, value)
    }

    pub fn unset(&mut self, field: &str) -> Option<Value> {
        self.fields.remove(field)
    }

    /// Value of `field` as last read from or written to storage.
    pub fn stored(&self, field: &str) -> Option<&Value> {
        self.persisted.as_ref().and_then(|row| row.get(field))
    }

    /// Whether the entity mirrors a stored row.
    pub fn exists(&self) -> bool {
        self.persisted.is_some()
    }

    /// Field names whose value differs from the stored snapshot.
    ///
    /// Every field of a new entity counts as modified.
    pub fn modified(&self) -> Vec<&str> {
        match &self.persisted {
            None => self.fields.keys().collect(),
            Some(snapshot) => self
                .fields
                .iter()
                .filter(|(name, value)| snapshot.get(name) != Some(*value))
                .map(|(name, _)| name)
                .collect(),
        }
    }

    pub fn is_modified(&self, field: &str) -> bool {
        match &self.persisted {
            None => self.fields.contains(field),
            Some(snapshot) => self.fields.get(field) != snapshot.get(field),
        }
    }

    pub fn mark_persisted(&mut self) {
        self.persisted = Some(self.fields.clone());
    }

    /// Forgets the stored snapshot and clears `key`, so the next save inserts.
    pub fn reset_new(&mut self, key: Option<&str>) {
        self.persisted = None;
        if let Some(key) = key {
            self.fields.remove(key);
        }
    }

    /// Takes over a stored row: values set in memory win except for `key`.
    pub(crate) fn adopt(&mut self, row: Row, key: Option<&str>) {
        let mut merged = row.clone();
        for (name, value) in self.fields.iter() {
            if Some(name) != key {
                merged.insert(name, value.clone());
            }
        }
        self.fields = merged;
        self.persisted = Some(row);
    }

    pub fn is_loaded(&self, relation: &str) -> bool {
        self.relations.contains_key(relation)
    }

    pub fn loaded(&self) -> impl Iterator<Item = &str> {
        self.relations.keys().map(String::as_str)
    }

    pub fn relation(&self, name: &str) -> Result<&Related> {
        self.relations.get(name).ok_or_else(|| not_loaded(&self.model, name))
    }

    pub fn relation_mut(&mut self, name: &str) -> Result<&mut Related> {
        match self.relations.get_mut(name) {
            Some(related) => Ok(related),
            None => Err(not_loaded(&self.model, name)),
        }
    }

    pub fn set_relation(&mut self, name: impl Into<String>, related: Related) -> Option<Related> {
        self.relations.insert(name.into(), related)
    }

    pub fn unset_relation(&mut self, name: &str) -> Option<Related> {
        self.relations.remove(name)
    }

    #[must_use]
    pub fn with_one(mut self, name: impl Into<String>, entity: Entity) -> Self {
        self.set_relation(name, Related::One(Some(Box::new(entity))));
        self
    }

    #[must_use]
    pub fn with_many(mut self, name: impl Into<String>, collection: Collection) -> Self {
        self.set_relation(name, Related::Many(collection));
        self
    }

    pub fn one(&self, name: &str) -> Result<Option<&Entity>> {
        match self.relation(name)? {
            Related::One(entity) => Ok(entity.as_deref()),
            _ => Err(shape_mismatch(&self.model, name, "single entity")),
        }
    }

    pub fn one_mut(&mut self, name: &str) -> Result<Option<&mut Entity>> {
        let model = self.model.clone();
        match self.relation_mut(name)? {
            Related::One(entity) => Ok(entity.as_deref_mut()),
            _ => Err(shape_mismatch(&model, name, "single entity")),
        }
    }

    pub fn many(&self, name: &str) -> Result<&Collection> {
        match self.relation(name)? {
            Related::Many(collection) => Ok(collection),
            _ => Err(shape_mismatch(&self.model, name, "collection")),
        }
    }

    pub fn many_mut(&mut self, name: &str) -> Result<&mut Collection> {
        let model = self.model.clone();
        match self.relation_mut(name)? {
            Related::Many(collection) => Ok(collection),
            _ => Err(shape_mismatch(&model, name, "collection")),
        }
    }

    /// Far-side view of a `HasManyThrough` relation.
    ///
    /// A new entity starts with an empty pivot collection; a stored entity
    /// must have the relation embedded first.
    pub fn through(&mut self, relation: &Relationship) -> Result<Through<'_>> {
        let RelationKind::HasManyThrough(info) = &relation.kind else {
            return Err(ChaosError::Configuration(format!(
                "Relation `{}` on `{}` is not a through relation.",
                relation.name, relation.from
            )));
        };
        if !self.is_loaded(&info.through) {
            if self.exists() {
                return Err(not_loaded(&self.model, &relation.name));
            }
            self.set_relation(
                info.through.clone(),
                Related::Many(Collection::new(info.pivot.clone())),
            );
        }
        self.set_relation(relation.name.clone(), Related::Through);
        let using = info.using.clone();
        let pivot = info.pivot.clone();
        let pivots = self.many_mut(&info.through)?;
        Ok(Through::new(pivots, pivot, using))
    }

    /// Far-side entities of an embedded `HasManyThrough`, in pivot order.
    pub fn through_entities(&self, relation: &Relationship) -> Result<Vec<&Entity>> {
        let RelationKind::HasManyThrough(info) = &relation.kind else {
            return Err(ChaosError::Configuration(format!(
                "Relation `{}` on `{}` is not a through relation.",
                relation.name, relation.from
            )));
        };
        if !self.is_loaded(&relation.name) && !self.is_loaded(&info.through) {
            return Err(not_loaded(&self.model, &relation.name));
        }
        let mut entities = Vec::new();
        for pivot in self.many(&info.through)? {
            if let Some(far) = pivot.one(&info.using)? {
                entities.push(far);
            }
        }
        Ok(entities)
    }
}

fn not_loaded(model: &str, relation: &str) -> ChaosError {
    ChaosError::NotLoaded(format!("Relation `{relation}` on `{model}` has not been embedded."))
}

fn shape_mismatch(model: &str, relation: &str, expected: &str) -> ChaosError {
    ChaosError::Configuration(format!(
        "Relation `{relation}` on `{model}` does not hold a {expected}."
    ))
}
