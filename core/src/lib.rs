//! Expression compiler, dialect policy and statement builders.
//!
//! Friendly inputs normalize into [`ConditionTree`] and [`Column`] values,
//! statement builders accumulate clauses, and a [`SQLDialect`] renders the
//! final SQL text.

pub mod column;
pub mod compiler;
pub mod condition;
pub mod connection;
pub mod conventions;
pub mod ddl;
pub mod dialect;
pub mod error;
pub mod statement;
pub mod token;
#[doc(hidden)]
pub mod tracing;

// Re-export key types and traits
pub use chaos_types::{Dialect, FieldDescriptor, FieldSpec, Key, LogicalType, Value};
pub use column::Column;
pub use condition::{ConditionTree, FieldRef, Operator};
pub use connection::{Connection, Row, Rows};
pub use conventions::{Conventions, DefaultConventions};
pub use ddl::{Constraint, ConstraintKind, ReferentialAction};
pub use dialect::{GenericDialect, SQLDialect, TypeDef, TypeTable};
pub use error::{ChaosError, Result};
pub use statement::{
    CreateTable, Delete, DropBehavior, DropTable, Insert, Join, JoinKind, Modifier, Order,
    OrderBy, Select, Source, StatementKind, ToSQL, Update,
};
pub use token::Token;

pub mod prelude {
    pub use crate::condition::{
        and, any, between, eq, exists, field, func, gt, gte, in_list, is_not_null, is_null, like,
        lt, lte, neq, not, or, raw, value,
    };
    pub use crate::{
        ChaosError, Column, ConditionTree, Connection, Conventions, SQLDialect, Select, ToSQL,
        Value,
    };
}
