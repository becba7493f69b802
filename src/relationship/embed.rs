use super::{RelationKind, Relationship, ThroughInfo};
use crate::collection::{Collection, distinct_values};
use crate::database::Database;
use crate::entity::{Entity, Related};
use chaos_core::{ChaosError, Connection, Key, Result, Value, chaos_trace_embed};
use hashbrown::HashMap;

/// Tree of relation names to embed, built from dotted paths.
///
/// ```
/// use chaos::Embed;
///
/// let tree = Embed::parse(["images.tags", "images.gallery", "images"]);
/// let images = tree.get("images").unwrap();
/// assert_eq!(images.names().collect::<Vec<_>>(), ["tags", "gallery"]);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Embed {
    children: Vec<(String, Embed)>,
}

impl Embed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parse<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut tree = Self::new();
        for path in paths {
            tree.insert(path.as_ref());
        }
        tree
    }

    /// Adds a dotted path; empty segments are ignored.
    pub fn insert(&mut self, path: &str) {
        let mut node = self;
        for segment in path.split('.').filter(|segment| !segment.is_empty()) {
            node = node.child(segment);
        }
    }

    /// Merges `tree` under `name`.
    pub fn merge(&mut self, name: &str, tree: Embed) {
        let node = self.child(name);
        for (child, sub) in tree.children {
            node.merge(&child, sub);
        }
    }

    pub fn extend(&mut self, tree: Embed) {
        for (name, sub) in tree.children {
            self.merge(&name, sub);
        }
    }

    pub fn get(&self, name: &str) -> Option<&Embed> {
        self.children
            .iter()
            .find(|(child, _)| child == name)
            .map(|(_, sub)| sub)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.children.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Embed)> {
        self.children.iter().map(|(name, sub)| (name.as_str(), sub))
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    fn child(&mut self, name: &str) -> &mut Embed {
        let idx = match self.children.iter().position(|(child, _)| child == name) {
            Some(idx) => idx,
            None => {
                self.children.push((name.to_owned(), Embed::new()));
                self.children.len() - 1
            }
        };
        &mut self.children[idx].1
    }
}

impl Relationship {
    /// Attaches related data to every owner with one query per relation.
    pub(crate) fn embed<C: Connection>(
        &self,
        db: &Database<C>,
        owners: &mut [Entity],
        nested: &Embed,
    ) -> Result<()> {
        match &self.kind {
            RelationKind::BelongsTo | RelationKind::HasOne => {
                let fetched = self.fetch(db, owners, nested)?;
                self.attach_one(owners, &fetched);
                Ok(())
            }
            RelationKind::HasMany => {
                let fetched = self.fetch(db, owners, nested)?;
                self.attach_many(owners, fetched);
                Ok(())
            }
            RelationKind::HasManyThrough(info) => self.embed_through(db, owners, nested, info),
        }
    }

    fn fetch<C: Connection>(
        &self,
        db: &Database<C>,
        owners: &[Entity],
        nested: &Embed,
    ) -> Result<Collection> {
        let (from_key, to_key) = (self.from_key(), self.to_key());
        for (model, key) in [(&self.from, from_key), (&self.to, to_key)] {
            if !db.schema(model)?.has_field(key) {
                return Err(ChaosError::Integrity(format!(
                    "The `{key}` key is missing on `{model}` for the `{}` relationship.",
                    self.name
                )));
            }
        }

        let values = distinct_values(owners, from_key);
        if values.is_empty() {
            chaos_trace_embed!(self.name, owners.len(), 0usize);
            return Ok(Collection::new(self.to.clone()));
        }

        let mut query = db
            .query(&self.to)?
            .r#where(self.batch_condition(values))
            .embed_tree(nested.clone());
        if !self.fields.is_empty() {
            let mut fields = self.fields.clone();
            if !fields.iter().any(|name| name == to_key) {
                fields.push(to_key.to_owned());
            }
            query = query.fields(fields);
        }

        let fetched = query.all()?;
        chaos_trace_embed!(self.name, owners.len(), fetched.len());
        Ok(fetched)
    }

    fn attach_one(&self, owners: &mut [Entity], fetched: &Collection) {
        let index = fetched.index_by(self.to_key());
        for owner in owners.iter_mut() {
            let related = owner
                .get(self.from_key())
                .and_then(Value::key)
                .and_then(|key| index.get(&key))
                .and_then(|positions| positions.first())
                .and_then(|&idx| fetched.get(idx))
                .cloned();
            owner.set_relation(self.name.clone(), Related::One(related.map(Box::new)));
        }
    }

    fn attach_many(&self, owners: &mut [Entity], fetched: Collection) {
        let from_key = self.from_key();

        // owners sharing a key each receive a copy; the last one takes the original
        let mut demand: HashMap<Key, usize> = HashMap::new();
        for owner in owners.iter() {
            if let Some(key) = owner.get(from_key).and_then(Value::key) {
                *demand.entry(key).or_default() += 1;
            }
        }

        let mut groups: HashMap<Key, Vec<Entity>> = HashMap::new();
        for entity in fetched {
            if let Some(key) = entity.get(self.to_key()).and_then(Value::key) {
                groups.entry(key).or_default().push(entity);
            }
        }

        for owner in owners.iter_mut() {
            let children = match owner.get(from_key).and_then(Value::key) {
                Some(key) => match demand.get_mut(&key) {
                    Some(remaining) if *remaining > 1 => {
                        *remaining -= 1;
                        groups.get(&key).cloned().unwrap_or_default()
                    }
                    _ => groups.remove(&key).unwrap_or_default(),
                },
                None => Vec::new(),
            };
            owner.set_relation(
                self.name.clone(),
                Related::Many(Collection::with_entities(self.to.clone(), children)),
            );
        }
    }

    /// Embeds the pivot relation with the far-side relation nested under it.
    fn embed_through<C: Connection>(
        &self,
        db: &Database<C>,
        owners: &mut [Entity],
        nested: &Embed,
        info: &ThroughInfo,
    ) -> Result<()> {
        let through = db.relation(&self.from, &info.through)?;
        let mut tree = Embed::new();
        tree.merge(&info.using, nested.clone());
        through.embed(db, owners, &tree)?;

        for owner in owners.iter_mut() {
            owner.set_relation(self.name.clone(), Related::Through);
        }
        Ok(())
    }
}
