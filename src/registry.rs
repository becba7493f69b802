//! Model registry: schemas by model name plus the naming conventions that
//! resolve relationship keys.

use crate::relationship::{RelationKind, RelationType, Relationship, ThroughInfo};
use crate::schema::Schema;
use chaos_core::{ChaosError, Conventions, DefaultConventions, Result};
use hashbrown::HashMap;
use std::sync::Arc;

pub struct Registry {
    schemas: HashMap<String, Arc<Schema>>,
    conventions: Arc<dyn Conventions>,
}

impl Registry {
    pub fn new() -> Self {
        Self::with_conventions(DefaultConventions::new())
    }

    pub fn with_conventions(conventions: impl Conventions + 'static) -> Self {
        Self {
            schemas: HashMap::new(),
            conventions: Arc::new(conventions),
        }
    }

    /// Registers `schema`, filling its source and key from conventions.
    pub fn insert(&mut self, mut schema: Schema) -> Result<()> {
        schema.finalize(self.conventions.as_ref())?;
        if self.schemas.contains_key(schema.model()) {
            return Err(ChaosError::Configuration(format!(
                "The model `{}` is already registered.",
                schema.model()
            )));
        }
        self.schemas
            .insert(schema.model().to_owned(), Arc::new(schema));
        Ok(())
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn register(mut self, schema: Schema) -> Result<Self> {
        self.insert(schema)?;
        Ok(self)
    }

    pub fn schema(&self, model: &str) -> Result<Arc<Schema>> {
        self.schemas
            .get(model)
            .cloned()
            .ok_or_else(|| ChaosError::Configuration(format!("Unknown model `{model}`.")))
    }

    pub fn contains(&self, model: &str) -> bool {
        self.schemas.contains_key(model)
    }

    pub fn models(&self) -> impl Iterator<Item = &str> {
        self.schemas.keys().map(String::as_str)
    }

    pub fn conventions(&self) -> &dyn Conventions {
        self.conventions.as_ref()
    }

    /// Resolves the relation `name` declared on `model`.
    ///
    /// Unset keys are derived from conventions:
    /// - `BelongsTo`: `(foreignKey(to), key of to)`
    /// - `HasOne` / `HasMany`: `(key of from, foreignKey(from))`
    /// - `HasManyThrough`: the keys of the pivot's `using` relation
    pub fn relation(&self, model: &str, name: &str) -> Result<Relationship> {
        let schema = self.schema(model)?;
        let def = schema.relation_def(name).ok_or_else(|| {
            ChaosError::Configuration(format!(
                "Relationship `{name}` is not defined on `{model}`."
            ))
        })?;
        let correlate_name = match &def.config.correlate_name {
            Some(correlate) => correlate.clone(),
            None => self.conventions.field_name(model)?,
        };

        if let Some(config) = &def.through {
            config.validate(name)?;
            let through = self.relation(model, &config.through)?;
            if !matches!(through.kind, RelationKind::HasMany | RelationKind::HasOne) {
                return Err(ChaosError::Configuration(format!(
                    "The `through` relation `{}` of `{name}` must lead to the pivot model.",
                    config.through
                )));
            }
            let using = self.relation(&through.to, &config.using)?;
            return Ok(Relationship {
                from: model.to_owned(),
                to: using.to.clone(),
                name: name.to_owned(),
                correlate_name,
                keys: using.keys.clone(),
                link: using.link,
                fields: def.config.fields.clone(),
                constraints: def.config.constraints.clone(),
                kind: RelationKind::HasManyThrough(ThroughInfo {
                    through: config.through.clone(),
                    using: config.using.clone(),
                    pivot: through.to,
                    mode: config.mode,
                }),
            });
        }

        let to = self.schema(&def.config.to)?;
        let keys = match (&def.config.keys, def.kind) {
            (Some(keys), _) => keys.clone(),
            (None, RelationType::BelongsTo) => (
                self.conventions.foreign_key(to.model())?,
                to.key_name().to_owned(),
            ),
            (None, _) => (
                schema.key_name().to_owned(),
                self.conventions.foreign_key(model)?,
            ),
        };
        let kind = match def.kind {
            RelationType::BelongsTo => RelationKind::BelongsTo,
            RelationType::HasOne => RelationKind::HasOne,
            RelationType::HasMany => RelationKind::HasMany,
            RelationType::HasManyThrough => {
                return Err(ChaosError::Configuration(format!(
                    "The relationship `{name}` is missing its `through` option."
                )));
            }
        };

        Ok(Relationship {
            from: model.to_owned(),
            to: to.model().to_owned(),
            name: name.to_owned(),
            correlate_name,
            keys,
            link: def.config.link,
            fields: def.config.fields.clone(),
            constraints: def.config.constraints.clone(),
            kind,
        })
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for Registry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Registry")
            .field("schemas", &self.schemas)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relationship::{Reconciliation, RelationConfig, ThroughConfig};
    use chaos_core::FieldSpec;

    fn registry() -> Registry {
        Registry::new()
            .register(
                Schema::new("Gallery")
                    .field(FieldSpec::new("id", "serial"))
                    .has_many("images", "Image"),
            )
            .and_then(|r| {
                r.register(
                    Schema::new("Image")
                        .field(FieldSpec::new("id", "serial"))
                        .field(FieldSpec::new("gallery_id", "integer"))
                        .belongs_to("gallery", "Gallery")
                        .has_many_with(
                            "images_tags",
                            RelationConfig::new("ImageTag").keys("id", "image_id"),
                        )
                        .has_many_through_with(
                            "tags",
                            ThroughConfig::new("images_tags", "tag").mode(Reconciliation::Flush),
                        )?,
                )
            })
            .and_then(|r| {
                r.register(
                    Schema::new("ImageTag")
                        .source("images_tags")
                        .field(FieldSpec::new("id", "serial"))
                        .field(FieldSpec::new("image_id", "integer"))
                        .field(FieldSpec::new("tag_id", "integer"))
                        .belongs_to("image", "Image")
                        .belongs_to("tag", "Tag"),
                )
            })
            .and_then(|r| r.register(Schema::new("Tag").field(FieldSpec::new("id", "serial"))))
            .unwrap()
    }

    #[test]
    fn test_default_keys() {
        let registry = registry();

        let images = registry.relation("Gallery", "images").unwrap();
        assert_eq!(images.kind, RelationKind::HasMany);
        assert_eq!(images.keys, ("id".to_owned(), "gallery_id".to_owned()));
        assert_eq!(images.correlate_name, "gallery");

        let gallery = registry.relation("Image", "gallery").unwrap();
        assert_eq!(gallery.kind, RelationKind::BelongsTo);
        assert_eq!(gallery.keys, ("gallery_id".to_owned(), "id".to_owned()));
        assert_eq!(gallery.to, "Gallery");
    }

    #[test]
    fn test_through_resolution() {
        let tags = registry().relation("Image", "tags").unwrap();
        assert_eq!(tags.to, "Tag");
        assert_eq!(tags.keys, ("tag_id".to_owned(), "id".to_owned()));
        let info = tags.through().unwrap();
        assert_eq!(info.pivot, "ImageTag");
        assert_eq!(info.using, "tag");
        assert_eq!(info.mode, Reconciliation::Flush);
        assert!(tags.is_many());
    }

    #[test]
    fn test_configuration_errors() {
        let mut registry = registry();
        let err = registry.relation("Image", "nope").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Configuration error: Relationship `nope` is not defined on `Image`."
        );
        assert!(registry.schema("Missing").is_err());
        assert!(registry.insert(Schema::new("Tag")).is_err());
        assert!(registry.insert(Schema::new("")).is_err());

        registry
            .insert(Schema::new("Orphan").belongs_to("owner", "Nobody"))
            .unwrap();
        assert!(matches!(
            registry.relation("Orphan", "owner"),
            Err(ChaosError::Configuration(_))
        ));
    }

    #[test]
    fn test_custom_conventions() {
        let conventions =
            DefaultConventions::new().with_rule("foreignKey", |model: &str| format!("{model}Id"));
        let registry = Registry::with_conventions(conventions)
            .register(Schema::new("Gallery").has_many("images", "Image"))
            .and_then(|r| r.register(Schema::new("Image")))
            .unwrap();
        let images = registry.relation("Gallery", "images").unwrap();
        assert_eq!(images.to_key(), "GalleryId");
    }
}
