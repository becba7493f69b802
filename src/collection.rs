use crate::entity::Entity;
use chaos_core::{Key, Value};
use hashbrown::{HashMap, HashSet};
use smallvec::SmallVec;

/// Positions of entities sharing one key value.
pub type Positions = SmallVec<[usize; 4]>;

/// Ordered entities of one model.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Collection {
    model: String,
    entities: Vec<Entity>,
}

impl Collection {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            entities: Vec::new(),
        }
    }

    pub fn with_entities(model: impl Into<String>, entities: Vec<Entity>) -> Self {
        Self {
            model: model.into(),
            entities,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<&Entity> {
        self.entities.get(idx)
    }

    pub fn get_mut(&mut self, idx: usize) -> Option<&mut Entity> {
        self.entities.get_mut(idx)
    }

    pub fn first(&self) -> Option<&Entity> {
        self.entities.first()
    }

    pub fn push(&mut self, entity: Entity) {
        self.entities.push(entity);
    }

    pub fn insert(&mut self, idx: usize, entity: Entity) {
        self.entities.insert(idx, entity);
    }

    pub fn remove(&mut self, idx: usize) -> Option<Entity> {
        (idx < self.entities.len()).then(|| self.entities.remove(idx))
    }

    /// Replaces the entity at `idx`, returning the previous one.
    pub fn replace(&mut self, idx: usize, entity: Entity) -> Option<Entity> {
        self.entities
            .get_mut(idx)
            .map(|slot| core::mem::replace(slot, entity))
    }

    pub fn clear(&mut self) {
        self.entities.clear();
    }

    pub fn iter(&self) -> core::slice::Iter<'_, Entity> {
        self.entities.iter()
    }

    pub fn iter_mut(&mut self) -> core::slice::IterMut<'_, Entity> {
        self.entities.iter_mut()
    }

    pub fn as_mut_slice(&mut self) -> &mut [Entity] {
        &mut self.entities
    }

    pub fn into_vec(self) -> Vec<Entity> {
        self.entities
    }

    /// Maps each distinct value of `field` to the positions holding it.
    ///
    /// Entities with a missing or `NULL` value are not indexed.
    pub fn index_by(&self, field: &str) -> HashMap<Key, Positions> {
        let mut index: HashMap<Key, Positions> = HashMap::with_capacity(self.entities.len());
        for (idx, entity) in self.entities.iter().enumerate() {
            if let Some(key) = entity.get(field).and_then(Value::key) {
                index.entry(key).or_default().push(idx);
            }
        }
        index
    }

    /// Distinct non-null values of `field`, in first-seen order.
    pub fn values(&self, field: &str) -> Vec<Value> {
        distinct_values(self.entities.iter(), field)
    }
}

pub(crate) fn distinct_values<'a, I>(entities: I, field: &str) -> Vec<Value>
where
    I: IntoIterator<Item = &'a Entity>,
{
    let mut seen = HashSet::new();
    let mut values = Vec::new();
    for entity in entities {
        if let Some(value) = entity.get(field) {
            if let Some(key) = value.key() {
                if seen.insert(key) {
                    values.push(value.clone());
                }
            }
        }
    }
    values
}

impl IntoIterator for Collection {
    type Item = Entity;
    type IntoIter = std::vec::IntoIter<Entity>;

    fn into_iter(self) -> Self::IntoIter {
        self.entities.into_iter()
    }
}

impl<'a> IntoIterator for &'a Collection {
    type Item = &'a Entity;
    type IntoIter = core::slice::Iter<'a, Entity>;

    fn into_iter(self) -> Self::IntoIter {
        self.entities.iter()
    }
}

impl<'a> IntoIterator for &'a mut Collection {
    type Item = &'a mut Entity;
    type IntoIter = core::slice::IterMut<'a, Entity>;

    fn into_iter(self) -> Self::IntoIter {
        self.entities.iter_mut()
    }
}
