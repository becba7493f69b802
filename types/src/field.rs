//! Field definitions and their introspection shape.

use crate::{LogicalType, Value};

/// Declarative definition of one schema field.
///
/// The type is kept as a name: it must be registered in the active dialect's
/// type table when DDL is rendered, which is where unknown names are reported.
///
/// Fields are nullable unless [`FieldSpec::not_null`] is called.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FieldSpec {
    pub name: String,
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub type_name: String,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub length: Option<u32>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub precision: Option<u32>,
    #[cfg_attr(feature = "serde", serde(default = "nullable_default"))]
    pub nullable: bool,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub default: Option<Value>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub array: bool,
    /// Native type override; replaces the type table's `use` entry.
    #[cfg_attr(
        feature = "serde",
        serde(default, rename = "use", skip_serializing_if = "Option::is_none")
    )]
    pub use_type: Option<String>,
}

#[cfg(feature = "serde")]
const fn nullable_default() -> bool {
    true
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            length: None,
            precision: None,
            nullable: true,
            default: None,
            array: false,
            use_type: None,
        }
    }

    #[must_use]
    pub fn length(mut self, length: u32) -> Self {
        self.length = Some(length);
        self
    }

    #[must_use]
    pub fn precision(mut self, precision: u32) -> Self {
        self.precision = Some(precision);
        self
    }

    #[must_use]
    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    #[must_use]
    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    #[must_use]
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    #[must_use]
    pub fn array(mut self) -> Self {
        self.array = true;
        self
    }

    #[must_use]
    pub fn use_type(mut self, native: impl Into<String>) -> Self {
        self.use_type = Some(native.into());
        self
    }

    /// The parsed logical type, or `None` for dialect-specific extensions.
    pub fn logical_type(&self) -> Option<LogicalType> {
        LogicalType::parse(&self.type_name)
    }

    pub fn descriptor(&self) -> FieldDescriptor {
        FieldDescriptor {
            r#type: self.type_name.clone(),
            length: self.length,
            precision: self.precision,
            null: self.nullable,
            default: self.default.clone(),
            array: self.array,
        }
    }
}

/// Introspection shape of a field: `{type, length?, precision?, null, default, array}`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FieldDescriptor {
    pub r#type: String,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub length: Option<u32>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub precision: Option<u32>,
    pub null: bool,
    pub default: Option<Value>,
    pub array: bool,
}
