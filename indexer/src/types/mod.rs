//! Schema and change-record types.

mod enum_definition;
mod error;
mod field;
pub mod kind;
mod module_schema;
mod object_type;
mod object_update;
mod value;

use std::collections::BTreeMap;

pub use enum_definition::{EnumDefinition, EnumRegistry};
pub use error::{SchemaError, UpdateError, ValueError};
pub use field::Field;
pub use kind::Kind;
pub use module_schema::{ModuleSchema, SchemaType};
pub use object_type::ObjectType;
pub use object_update::{ObjectKey, ObjectUpdate, ValueUpdate};
pub use value::Value;

/// Module schemas of a whole application, keyed and ordered by module name.
pub type AppSchema = BTreeMap<String, ModuleSchema>;
