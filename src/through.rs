//! Far-side view over the pivot collection of a `HasManyThrough` relation.

use crate::collection::Collection;
use crate::entity::{Entity, Related};

/// Exposes the far-side entities of a pivot collection as a list.
///
/// Every position is backed by one pivot entity, so the same far-side
/// entity may appear more than once. Mutations create or drop pivots; the
/// save cascade reconciles them with storage.
#[derive(Debug)]
pub struct Through<'a> {
    pivots: &'a mut Collection,
    pivot: String,
    using: String,
}

impl<'a> Through<'a> {
    pub(crate) fn new(pivots: &'a mut Collection, pivot: String, using: String) -> Self {
        Self {
            pivots,
            pivot,
            using,
        }
    }

    pub fn len(&self) -> usize {
        self.pivots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pivots.is_empty()
    }

    /// Far-side entity at `idx`; `None` past the end or for a dangling pivot.
    pub fn get(&self, idx: usize) -> Option<&Entity> {
        self.pivots.get(idx).and_then(|pivot| far(pivot, &self.using))
    }

    pub fn get_mut(&mut self, idx: usize) -> Option<&mut Entity> {
        let using = self.using.as_str();
        self.pivots.get_mut(idx).and_then(|pivot| far_mut(pivot, using))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> + '_ {
        self.pivots.iter().filter_map(|pivot| far(pivot, &self.using))
    }

    /// Appends `entity` behind a new pivot.
    pub fn push(&mut self, entity: Entity) {
        let pivot = self.new_pivot(entity);
        self.pivots.push(pivot);
    }

    /// Replaces the far-side entity at `idx`, or appends when `idx` is past the end.
    ///
    /// The pivot at `idx` is kept so its stored row can be reused.
    pub fn set(&mut self, idx: usize, entity: Entity) -> Option<Entity> {
        match self.pivots.get_mut(idx) {
            Some(pivot) => pivot
                .set_relation(self.using.clone(), Related::One(Some(Box::new(entity))))
                .and_then(into_entity),
            None => {
                self.push(entity);
                None
            }
        }
    }

    /// Drops the pivot at `idx` and returns its far-side entity.
    pub fn unset(&mut self, idx: usize) -> Option<Entity> {
        let mut pivot = self.pivots.remove(idx)?;
        pivot.unset_relation(&self.using).and_then(into_entity)
    }

    pub fn clear(&mut self) {
        self.pivots.clear();
    }

    /// Copies the far-side entities into a standalone collection.
    pub fn to_collection(&self) -> Collection {
        let model = self
            .iter()
            .next()
            .map(|entity| entity.model().to_owned())
            .unwrap_or_default();
        Collection::with_entities(model, self.iter().cloned().collect())
    }

    fn new_pivot(&self, entity: Entity) -> Entity {
        let mut pivot = Entity::new(self.pivot.clone());
        pivot.set_relation(self.using.clone(), Related::One(Some(Box::new(entity))));
        pivot
    }
}

fn far<'e>(pivot: &'e Entity, using: &str) -> Option<&'e Entity> {
    match pivot.relation(using).ok()? {
        Related::One(entity) => entity.as_deref(),
        _ => None,
    }
}

fn far_mut<'e>(pivot: &'e mut Entity, using: &str) -> Option<&'e mut Entity> {
    match pivot.relation_mut(using).ok()? {
        Related::One(entity) => entity.as_deref_mut(),
        _ => None,
    }
}

fn into_entity(related: Related) -> Option<Entity> {
    match related {
        Related::One(entity) => entity.map(|boxed| *boxed),
        _ => None,
    }
}
