//! Dialect-independent logical column types.

/// Logical type of a schema field.
///
/// Every dialect maps these names to a native DDL fragment through its type
/// table. Field specs carry the type as a name so that dialect-specific
/// extensions (for example a `json` entry registered on PostgreSQL) can be
/// declared without extending this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum LogicalType {
    Id,
    Serial,
    String,
    Text,
    Integer,
    Float,
    Decimal,
    Boolean,
    Date,
    Time,
    Datetime,
    Binary,
    Uuid,
}

impl LogicalType {
    /// All logical types, in declaration order.
    pub const ALL: [LogicalType; 13] = [
        LogicalType::Id,
        LogicalType::Serial,
        LogicalType::String,
        LogicalType::Text,
        LogicalType::Integer,
        LogicalType::Float,
        LogicalType::Decimal,
        LogicalType::Boolean,
        LogicalType::Date,
        LogicalType::Time,
        LogicalType::Datetime,
        LogicalType::Binary,
        LogicalType::Uuid,
    ];

    /// Parse a logical type name (case-sensitive, lowercase as in schemas).
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|ty| ty.as_str() == s)
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            LogicalType::Id => "id",
            LogicalType::Serial => "serial",
            LogicalType::String => "string",
            LogicalType::Text => "text",
            LogicalType::Integer => "integer",
            LogicalType::Float => "float",
            LogicalType::Decimal => "decimal",
            LogicalType::Boolean => "boolean",
            LogicalType::Date => "date",
            LogicalType::Time => "time",
            LogicalType::Datetime => "datetime",
            LogicalType::Binary => "binary",
            LogicalType::Uuid => "uuid",
        }
    }

    /// Whether values of this type are stored as whole numbers.
    #[must_use]
    pub const fn is_integral(&self) -> bool {
        matches!(
            self,
            LogicalType::Id | LogicalType::Serial | LogicalType::Integer
        )
    }

    /// Whether this type accepts `CURRENT_TIMESTAMP`-style defaults verbatim.
    #[must_use]
    pub const fn is_temporal(&self) -> bool {
        matches!(
            self,
            LogicalType::Date | LogicalType::Time | LogicalType::Datetime
        )
    }
}

impl AsRef<str> for LogicalType {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl core::fmt::Display for LogicalType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
