//! Naming conventions capability.
//!
//! Relationships ask the conventions for default key, table and field names
//! instead of hardcoding them.

use crate::error::{ChaosError, Result};
use hashbrown::HashMap;
use heck::ToSnakeCase;
use std::sync::Arc;

pub const PRIMARY_KEY: &str = "primaryKey";
pub const FOREIGN_KEY: &str = "foreignKey";
pub const SOURCE: &str = "source";
pub const FIELD_NAME: &str = "fieldName";
pub const USING_NAME: &str = "usingName";

/// Applies named naming rules to a subject (model or field name).
pub trait Conventions: Send + Sync {
    /// Fails with [`ChaosError::Convention`] for an unknown rule.
    fn apply(&self, rule: &str, subject: &str) -> Result<String>;

    fn primary_key(&self, model: &str) -> Result<String> {
        self.apply(PRIMARY_KEY, model)
    }

    fn foreign_key(&self, model: &str) -> Result<String> {
        self.apply(FOREIGN_KEY, model)
    }

    fn source(&self, model: &str) -> Result<String> {
        self.apply(SOURCE, model)
    }

    fn field_name(&self, model: &str) -> Result<String> {
        self.apply(FIELD_NAME, model)
    }

    fn using_name(&self, field: &str) -> Result<String> {
        self.apply(USING_NAME, field)
    }
}

pub type ConventionRule = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Snake case conventions: `id` keys, `<model>_id` foreign keys,
/// `<model>` tables and singular `using` names.
#[derive(Clone)]
pub struct DefaultConventions {
    rules: HashMap<String, ConventionRule>,
}

impl DefaultConventions {
    pub fn new() -> Self {
        let mut rules: HashMap<String, ConventionRule> = HashMap::new();
        rules.insert(PRIMARY_KEY.to_owned(), Arc::new(|_: &str| "id".to_owned()));
        rules.insert(
            FOREIGN_KEY.to_owned(),
            Arc::new(|model: &str| format!("{}_id", model.to_snake_case())),
        );
        rules.insert(SOURCE.to_owned(), Arc::new(|model: &str| model.to_snake_case()));
        rules.insert(FIELD_NAME.to_owned(), Arc::new(|model: &str| model.to_snake_case()));
        rules.insert(USING_NAME.to_owned(), Arc::new(singular));
        Self { rules }
    }

    /// Registers or replaces a rule.
    #[must_use]
    pub fn with_rule<F>(mut self, name: &str, rule: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.rules.insert(name.to_owned(), Arc::new(rule));
        self
    }
}

impl Default for DefaultConventions {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for DefaultConventions {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut names: Vec<&str> = self.rules.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("DefaultConventions")
            .field("rules", &names)
            .finish()
    }
}

impl Conventions for DefaultConventions {
    fn apply(&self, rule: &str, subject: &str) -> Result<String> {
        let rule_fn = self.rules.get(rule).ok_or_else(|| {
            ChaosError::Convention(format!("Convention for `{rule}` doesn't exists."))
        })?;
        Ok(rule_fn(subject))
    }
}

fn singular(name: &str) -> String {
    let snake = name.to_snake_case();
    if let Some(stem) = snake.strip_suffix("ies") {
        return format!("{stem}y");
    }
    if snake.ends_with("ss") {
        return snake;
    }
    match snake.strip_suffix('s') {
        Some(stem) if !stem.is_empty() => stem.to_owned(),
        _ => snake,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rules() {
        let c = DefaultConventions::new();
        assert_eq!(c.primary_key("Gallery").unwrap(), "id");
        assert_eq!(c.foreign_key("ImageTag").unwrap(), "image_tag_id");
        assert_eq!(c.source("ImageTag").unwrap(), "image_tag");
        assert_eq!(c.field_name("Image").unwrap(), "image");
        assert_eq!(c.using_name("tags").unwrap(), "tag");
        assert_eq!(c.using_name("categories").unwrap(), "category");
        assert_eq!(c.using_name("address").unwrap(), "address");
    }

    #[test]
    fn test_unknown_rule() {
        let err = DefaultConventions::new().apply("tableName", "x").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Convention error: Convention for `tableName` doesn't exists."
        );
    }

    #[test]
    fn test_custom_rule() {
        let c = DefaultConventions::new().with_rule(SOURCE, |model| format!("{}s", model.to_lowercase()));
        assert_eq!(c.source("Gallery").unwrap(), "gallerys");
    }
}
