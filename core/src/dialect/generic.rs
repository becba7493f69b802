use super::{SQLDialect, TypeDef, TypeTable};
use chaos_types::Dialect;

/// ANSI-flavoured base dialect: double-quoted identifiers, no arrays,
/// no statement modifiers.
#[derive(Debug, Clone)]
pub struct GenericDialect {
    types: TypeTable,
}

impl GenericDialect {
    pub fn new() -> Self {
        Self {
            types: TypeTable::base(),
        }
    }

    /// Registers or replaces a type table entry.
    #[must_use]
    pub fn with_type(mut self, name: &str, def: TypeDef) -> Self {
        self.types.insert(name, def);
        self
    }
}

impl Default for GenericDialect {
    fn default() -> Self {
        Self::new()
    }
}

impl SQLDialect for GenericDialect {
    fn dialect(&self) -> Dialect {
        Dialect::Generic
    }

    fn types(&self) -> &TypeTable {
        &self.types
    }
}
