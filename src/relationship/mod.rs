//! Relationship declarations and their resolved form.
//!
//! A [`Schema`](crate::Schema) declares relations with [`RelationConfig`] and
//! [`ThroughConfig`]; the [`Registry`](crate::Registry) resolves them into a
//! [`Relationship`] whose keys are filled in from conventions. Embedding and
//! saving dispatch on [`RelationKind`].

mod embed;
mod save;

pub use embed::Embed;

use crate::entity::Entity;
use chaos_core::condition::{eq, field, in_list};
use chaos_core::{ChaosError, ConditionTree, Result, Value};

/// Relation flavor as declared on a schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationType {
    BelongsTo,
    HasOne,
    HasMany,
    HasManyThrough,
}

/// How two sides are tied together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Link {
    /// Correlated by key values.
    #[default]
    Key,
}

/// Pivot reconciliation strategy for `HasManyThrough` saves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Reconciliation {
    /// Keep matching pivot rows, insert the missing ones, delete the rest.
    #[default]
    Diff,
    /// Delete every pivot row of the owner and insert all current pivots.
    Flush,
}

/// Options of a `BelongsTo`, `HasOne` or `HasMany` declaration.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RelationConfig {
    pub to: String,
    /// `(from_key, to_key)`; derived from conventions when unset.
    pub keys: Option<(String, String)>,
    pub link: Link,
    /// Restricts the fields fetched on embed; the correlation key is always added.
    pub fields: Vec<String>,
    /// Extra conditions applied to every embed query.
    pub constraints: ConditionTree,
    pub correlate_name: Option<String>,
}

impl RelationConfig {
    pub fn new(to: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn keys(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.keys = Some((from.into(), to.into()));
        self
    }

    #[must_use]
    pub fn link(mut self, link: Link) -> Self {
        self.link = link;
        self
    }

    #[must_use]
    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn constraints(mut self, constraints: impl Into<ConditionTree>) -> Self {
        self.constraints = self.constraints.and(constraints);
        self
    }

    #[must_use]
    pub fn correlate_name(mut self, name: impl Into<String>) -> Self {
        self.correlate_name = Some(name.into());
        self
    }
}

/// Options of a `HasManyThrough` declaration.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ThroughConfig {
    /// Name of the owner's relation to the pivot model.
    pub through: String,
    /// Name of the pivot's relation to the far model.
    pub using: String,
    pub mode: Reconciliation,
}

impl ThroughConfig {
    pub fn new(through: impl Into<String>, using: impl Into<String>) -> Self {
        Self {
            through: through.into(),
            using: using.into(),
            mode: Reconciliation::default(),
        }
    }

    #[must_use]
    pub fn mode(mut self, mode: Reconciliation) -> Self {
        self.mode = mode;
        self
    }

    pub(crate) fn validate(&self, name: &str) -> Result<()> {
        if self.through.is_empty() {
            return Err(ChaosError::Configuration(format!(
                "The relationship `{name}` is missing its `through` option."
            )));
        }
        if self.using.is_empty() {
            return Err(ChaosError::Configuration(format!(
                "The relationship `{name}` is missing its `using` option."
            )));
        }
        Ok(())
    }
}

/// A relation as declared on a schema, before key resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct RelationDef {
    pub name: String,
    pub kind: RelationType,
    pub config: RelationConfig,
    pub through: Option<ThroughConfig>,
}

/// Resolved `HasManyThrough` routing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThroughInfo {
    pub through: String,
    pub using: String,
    /// Model of the pivot entities.
    pub pivot: String,
    pub mode: Reconciliation,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelationKind {
    BelongsTo,
    HasOne,
    HasMany,
    HasManyThrough(ThroughInfo),
}

/// A named, resolved association between two models.
#[derive(Debug, Clone, PartialEq)]
pub struct Relationship {
    pub from: String,
    pub to: String,
    pub name: String,
    pub correlate_name: String,
    /// `(from_key, to_key)`: the field on `from` and the field on `to` that must match.
    pub keys: (String, String),
    pub link: Link,
    pub fields: Vec<String>,
    pub constraints: ConditionTree,
    pub kind: RelationKind,
}

impl Relationship {
    pub fn from_key(&self) -> &str {
        &self.keys.0
    }

    pub fn to_key(&self) -> &str {
        &self.keys.1
    }

    /// Whether the relation yields a collection rather than a single entity.
    pub fn is_many(&self) -> bool {
        matches!(
            self.kind,
            RelationKind::HasMany | RelationKind::HasManyThrough(_)
        )
    }

    pub fn through(&self) -> Option<&ThroughInfo> {
        match &self.kind {
            RelationKind::HasManyThrough(info) => Some(info),
            _ => None,
        }
    }

    /// Condition selecting the related rows of `entity`.
    pub fn match_condition(&self, entity: &Entity) -> Result<ConditionTree> {
        let value = self.required_key(entity, self.from_key(), &self.from)?;
        Ok(self.correlate(eq(field(self.to_key()), value)))
    }

    /// Condition selecting the related rows of every owner key in `values`.
    pub fn batch_condition(&self, values: Vec<Value>) -> ConditionTree {
        self.correlate(in_list(field(self.to_key()), values))
    }

    fn correlate(&self, keys: ConditionTree) -> ConditionTree {
        match self.link {
            Link::Key => keys.and(self.constraints.clone()),
        }
    }

    /// Non-null value of `key` on `entity`.
    pub(crate) fn required_key(&self, entity: &Entity, key: &str, model: &str) -> Result<Value> {
        match entity.get(key) {
            Some(value) if !matches!(value, Value::Null) => Ok(value.clone()),
            _ => Err(ChaosError::Integrity(format!(
                "The `{key}` key is missing on `{model}` for the `{}` relationship.",
                self.name
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chaos_core::{GenericDialect, compiler};

    fn visible_images() -> Relationship {
        Relationship {
            from: "Gallery".into(),
            to: "Image".into(),
            name: "images".into(),
            correlate_name: "gallery".into(),
            keys: ("id".into(), "gallery_id".into()),
            link: Link::Key,
            fields: Vec::new(),
            constraints: eq(field("visible"), true),
            kind: RelationKind::HasMany,
        }
    }

    #[test]
    fn test_match_condition() {
        let dialect = GenericDialect::new();
        let images = visible_images();

        let gallery = Entity::new("Gallery").with("id", 3);
        let sql = compiler::conditions(&dialect, &images.match_condition(&gallery).unwrap());
        assert_eq!(sql.unwrap(), r#""gallery_id" = 3 AND "visible" = TRUE"#);

        let sql = compiler::conditions(
            &dialect,
            &images.batch_condition(vec![Value::from(1), Value::from(2)]),
        );
        assert_eq!(sql.unwrap(), r#""gallery_id" IN (1, 2) AND "visible" = TRUE"#);

        let err = images.match_condition(&Entity::new("Gallery")).unwrap_err();
        assert!(matches!(err, ChaosError::Integrity(_)));
        assert!(err.to_string().contains("`id`"));
    }

    #[test]
    fn test_through_config_validation() {
        assert!(ThroughConfig::new("images_tags", "tag").validate("tags").is_ok());

        let err = ThroughConfig::new("", "tag").validate("tags").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Configuration error: The relationship `tags` is missing its `through` option."
        );
        let err = ThroughConfig::new("images_tags", "").validate("tags").unwrap_err();
        assert!(err.to_string().contains("`using`"));
    }

    #[test]
    fn test_relation_config_accumulates_constraints() {
        let config = RelationConfig::new("Image")
            .keys("id", "gallery_id")
            .constraints(eq(field("visible"), true))
            .constraints(eq(field("draft"), false));
        assert_eq!(config.keys, Some(("id".into(), "gallery_id".into())));
        assert_eq!(
            config.constraints,
            chaos_core::condition::and([eq(field("visible"), true), eq(field("draft"), false)])
        );
    }
}
