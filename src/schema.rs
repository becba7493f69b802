//! Model schemas: fields, primary key, storage source and declared relations.

use crate::entity::Entity;
use crate::relationship::{RelationConfig, RelationDef, RelationType, ThroughConfig};
use chaos_core::{
    ChaosError, Constraint, Conventions, CreateTable, DropTable, FieldDescriptor, FieldSpec,
    LogicalType, Result, Row, Value,
};
use hashbrown::HashMap;

/// Describes one model.
///
/// ```
/// use chaos::{FieldSpec, Schema};
///
/// let schema = Schema::new("Image")
///     .field(FieldSpec::new("id", "serial"))
///     .field(FieldSpec::new("gallery_id", "integer"))
///     .field(FieldSpec::new("title", "string").length(64))
///     .belongs_to("gallery", "Gallery")
///     .has_many("images_tags", "ImageTag")
///     .has_many_through("tags", "images_tags", "tag")
///     .unwrap();
///
/// assert!(schema.has_field("title"));
/// assert_eq!(schema.relations().len(), 3);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    model: String,
    source: Option<String>,
    key: Option<String>,
    fields: Vec<FieldSpec>,
    positions: HashMap<String, usize>,
    constraints: Vec<Constraint>,
    relations: Vec<RelationDef>,
}

impl Schema {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            source: None,
            key: None,
            fields: Vec::new(),
            positions: HashMap::new(),
            constraints: Vec::new(),
            relations: Vec::new(),
        }
    }

    /// Storage table name; defaults to the `source` convention.
    #[must_use]
    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Primary key field; defaults to the `primaryKey` convention.
    #[must_use]
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Declares a field, replacing a previous declaration of the same name in place.
    #[must_use]
    pub fn field(mut self, spec: FieldSpec) -> Self {
        match self.positions.get(&spec.name) {
            Some(&idx) => self.fields[idx] = spec,
            None => {
                self.positions.insert(spec.name.clone(), self.fields.len());
                self.fields.push(spec);
            }
        }
        self
    }

    #[must_use]
    pub fn constraint(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    #[must_use]
    pub fn belongs_to(self, name: impl Into<String>, to: impl Into<String>) -> Self {
        self.belongs_to_with(name, RelationConfig::new(to))
    }

    #[must_use]
    pub fn belongs_to_with(self, name: impl Into<String>, config: RelationConfig) -> Self {
        self.relation(name.into(), RelationType::BelongsTo, config)
    }

    #[must_use]
    pub fn has_one(self, name: impl Into<String>, to: impl Into<String>) -> Self {
        self.has_one_with(name, RelationConfig::new(to))
    }

    #[must_use]
    pub fn has_one_with(self, name: impl Into<String>, config: RelationConfig) -> Self {
        self.relation(name.into(), RelationType::HasOne, config)
    }

    #[must_use]
    pub fn has_many(self, name: impl Into<String>, to: impl Into<String>) -> Self {
        self.has_many_with(name, RelationConfig::new(to))
    }

    #[must_use]
    pub fn has_many_with(self, name: impl Into<String>, config: RelationConfig) -> Self {
        self.relation(name.into(), RelationType::HasMany, config)
    }

    /// Declares a many-to-many relation routed through the `through` relation
    /// of this model and the `using` relation of the pivot model.
    ///
    /// Fails when either option is empty.
    pub fn has_many_through(
        self,
        name: impl Into<String>,
        through: impl Into<String>,
        using: impl Into<String>,
    ) -> Result<Self> {
        self.has_many_through_with(name, ThroughConfig::new(through, using))
    }

    pub fn has_many_through_with(
        mut self,
        name: impl Into<String>,
        config: ThroughConfig,
    ) -> Result<Self> {
        let name = name.into();
        config.validate(&name)?;
        self.relations.retain(|def| def.name != name);
        self.relations.push(RelationDef {
            name,
            kind: RelationType::HasManyThrough,
            config: RelationConfig::default(),
            through: Some(config),
        });
        Ok(self)
    }

    fn relation(mut self, name: String, kind: RelationType, config: RelationConfig) -> Self {
        self.relations.retain(|def| def.name != name);
        self.relations.push(RelationDef {
            name,
            kind,
            config,
            through: None,
        });
        self
    }

    /// Fills `source` and `key` from conventions where they were not given.
    pub(crate) fn finalize(&mut self, conventions: &dyn Conventions) -> Result<()> {
        if self.model.is_empty() {
            return Err(ChaosError::Configuration(
                "A schema requires a model name.".to_owned(),
            ));
        }
        if self.source.is_none() {
            self.source = Some(conventions.source(&self.model)?);
        }
        if self.key.is_none() {
            self.key = Some(conventions.primary_key(&self.model)?);
        }
        for def in &self.relations {
            if def.name.is_empty() {
                return Err(ChaosError::Configuration(format!(
                    "A relationship on `{}` requires a name.",
                    self.model
                )));
            }
            match &def.through {
                Some(through) => through.validate(&def.name)?,
                None if def.config.to.is_empty() => {
                    return Err(ChaosError::Configuration(format!(
                        "The relationship `{}` is missing its `to` option.",
                        def.name
                    )));
                }
                None => {}
            }
        }
        Ok(())
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn source_name(&self) -> &str {
        self.source.as_deref().unwrap_or(&self.model)
    }

    pub fn key_name(&self) -> &str {
        self.key.as_deref().unwrap_or("id")
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|spec| spec.name.as_str())
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.positions.contains_key(name)
    }

    pub fn field_spec(&self, name: &str) -> Option<&FieldSpec> {
        self.positions.get(name).map(|&idx| &self.fields[idx])
    }

    /// Introspection shape of `name`.
    pub fn descriptor(&self, name: &str) -> Option<FieldDescriptor> {
        self.field_spec(name).map(FieldSpec::descriptor)
    }

    pub fn relations(&self) -> &[RelationDef] {
        &self.relations
    }

    pub fn relation_def(&self, name: &str) -> Option<&RelationDef> {
        self.relations.iter().find(|def| def.name == name)
    }

    /// Converts a stored value to its in-memory form for field `name`.
    ///
    /// Unknown fields and dialect-specific types pass through untouched.
    pub fn cast(&self, name: &str, value: Value) -> Result<Value> {
        let Some(spec) = self.field_spec(name) else {
            return Ok(value);
        };
        if matches!(value, Value::Null) {
            return Ok(value);
        }
        if !spec.array {
            return self.cast_scalar(spec, value);
        }
        let items = match value {
            Value::Array(items) => items,
            Value::Text(text) => parse_composite(&text),
            other => return Err(self.mismatch(spec, &other)),
        };
        items
            .into_iter()
            .map(|item| match item {
                Value::Null => Ok(Value::Null),
                item => self.cast_scalar(spec, item),
            })
            .collect::<Result<Vec<_>>>()
            .map(Value::Array)
    }

    pub fn cast_row(&self, row: Row) -> Result<Row> {
        let mut cast = Row::with_capacity(row.len());
        for (name, value) in row {
            let value = self.cast(&name, value)?;
            cast.insert(name, value);
        }
        Ok(cast)
    }

    /// Builds a stored entity from a fetched row.
    pub fn hydrate(&self, row: Row) -> Result<Entity> {
        Ok(Entity::hydrated(self.model.clone(), self.cast_row(row)?))
    }

    pub fn create_table(&self) -> CreateTable {
        let mut stmt = CreateTable::new()
            .table(self.source_name())
            .columns(self.fields.iter().cloned());
        if self.has_field(self.key_name()) {
            stmt = stmt.constraint(Constraint::primary_key([self.key_name()]));
        }
        for constraint in &self.constraints {
            stmt = stmt.constraint(constraint.clone());
        }
        stmt
    }

    pub fn drop_table(&self) -> DropTable {
        DropTable::new().table(self.source_name()).if_exists(true)
    }

    fn cast_scalar(&self, spec: &FieldSpec, value: Value) -> Result<Value> {
        let Some(logical) = spec.logical_type() else {
            return Ok(value);
        };
        let cast = match logical {
            LogicalType::Id | LogicalType::Serial | LogicalType::Integer => match &value {
                Value::Integer(_) => return Ok(value),
                Value::Bool(b) => Some(Value::Integer(i64::from(*b))),
                Value::Float(f) if f.fract() == 0.0 && f.is_finite() => {
                    Some(Value::Integer(*f as i64))
                }
                Value::Text(text) => text.trim().parse().ok().map(Value::Integer),
                _ => None,
            },
            LogicalType::Float | LogicalType::Decimal => match &value {
                Value::Float(_) => return Ok(value),
                Value::Integer(i) => Some(Value::Float(*i as f64)),
                Value::Text(text) => text.trim().parse().ok().map(Value::Float),
                _ => None,
            },
            LogicalType::Boolean => match &value {
                Value::Bool(_) => return Ok(value),
                Value::Integer(i) => Some(Value::Bool(*i != 0)),
                Value::Text(text) => match text.trim() {
                    "1" | "t" | "true" | "TRUE" => Some(Value::Bool(true)),
                    "0" | "f" | "false" | "FALSE" => Some(Value::Bool(false)),
                    _ => None,
                },
                _ => None,
            },
            LogicalType::Binary => match &value {
                Value::Binary(_) => return Ok(value),
                Value::Text(text) => Some(Value::Binary(text.as_bytes().to_vec())),
                _ => None,
            },
            _ => match &value {
                Value::Text(_) => return Ok(value),
                Value::Integer(_) | Value::Float(_) | Value::Bool(_) => {
                    Some(Value::Text(value.to_string()))
                }
                Value::Binary(bytes) => String::from_utf8(bytes.clone()).ok().map(Value::Text),
                _ => None,
            },
        };
        cast.ok_or_else(|| self.mismatch(spec, &value))
    }

    fn mismatch(&self, spec: &FieldSpec, value: &Value) -> ChaosError {
        ChaosError::Mapping(format!(
            "Cannot cast `{value}` to `{}` for field `{}.{}`.",
            spec.type_name, self.model, spec.name
        ))
    }
}

/// Splits a composite literal such as `{1,"a b",NULL}` into text items.
fn parse_composite(text: &str) -> Vec<Value> {
    let inner = text
        .trim()
        .strip_prefix('{')
        .and_then(|rest| rest.strip_suffix('}'))
        .unwrap_or(text);
    if inner.trim().is_empty() {
        return Vec::new();
    }

    let mut items = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    let mut was_quoted = false;
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' if quoted => {
                if let Some(next) = chars.next() {
                    current.push(next);
                }
            }
            '"' => {
                quoted = !quoted;
                was_quoted = true;
            }
            ',' if !quoted => {
                items.push(composite_item(&current, was_quoted));
                current.clear();
                was_quoted = false;
            }
            c => current.push(c),
        }
    }
    items.push(composite_item(&current, was_quoted));
    items
}

fn composite_item(raw: &str, quoted: bool) -> Value {
    if quoted {
        return Value::Text(raw.to_owned());
    }
    match raw.trim() {
        "NULL" => Value::Null,
        item => Value::Text(item.to_owned()),
    }
}
