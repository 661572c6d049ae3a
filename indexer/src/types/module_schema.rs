//! Module schemas: the set of types owned by one application module.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::{EnumDefinition, EnumRegistry, ObjectType, ObjectUpdate, SchemaError, UpdateError};

/// A type declared by a module schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[allow(clippy::disallowed_methods)] // Clone needed when schemas are shared with generators
pub enum SchemaType {
    Object(ObjectType),
    Enum(EnumDefinition),
}

impl SchemaType {
    /// The name the type declares for itself.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Object(ty) => &ty.name,
            Self::Enum(def) => &def.name,
        }
    }
}

/// The logical schema of one module. Immutable once handed to a simulator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[allow(clippy::disallowed_methods)] // Clone needed when schemas are shared with generators
pub struct ModuleSchema {
    pub types: BTreeMap<String, SchemaType>,
}

impl ModuleSchema {
    /// Build a schema from object types, keyed by their names.
    #[must_use]
    pub fn from_object_types(object_types: impl IntoIterator<Item = ObjectType>) -> Self {
        let types = object_types
            .into_iter()
            .map(|ty| (ty.name.as_str().to_owned(), SchemaType::Object(ty)))
            .collect();
        Self { types }
    }

    /// Add a standalone enum definition.
    #[must_use]
    pub fn with_enum(mut self, definition: EnumDefinition) -> Self {
        self.types.insert(
            definition.name.as_str().to_owned(),
            SchemaType::Enum(definition),
        );
        self
    }

    /// Object types in name order.
    pub fn object_types(&self) -> impl Iterator<Item = &ObjectType> {
        self.types.values().filter_map(|ty| match ty {
            SchemaType::Object(ty) => Some(ty),
            SchemaType::Enum(_) => None,
        })
    }

    /// The object type called `name`, if declared.
    #[must_use]
    pub fn object_type(&self, name: &str) -> Option<&ObjectType> {
        match self.types.get(name) {
            Some(SchemaType::Object(ty)) => Some(ty),
            _ => None,
        }
    }

    /// The standalone enum definition called `name`, if declared.
    #[must_use]
    pub fn enum_definition(&self, name: &str) -> Option<&EnumDefinition> {
        match self.types.get(name) {
            Some(SchemaType::Enum(def)) => Some(def),
            _ => None,
        }
    }

    /// Validate every declared type.
    ///
    /// Enum definitions are identified by name across the whole module:
    /// two definitions with the same name must carry the same values.
    pub fn validate(&self) -> Result<(), SchemaError> {
        let mut registry = EnumRegistry::new();
        for (key, ty) in &self.types {
            if key != ty.name() {
                return Err(SchemaError::TypeNameMismatch {
                    key: key.as_str().to_owned(),
                    name: ty.name().to_owned(),
                });
            }
            match ty {
                SchemaType::Object(ty) => ty.validate(&mut registry)?,
                SchemaType::Enum(def) => def.validate(&mut registry)?,
            }
        }
        Ok(())
    }

    /// Validate `update` against the object type it names.
    pub fn validate_object_update(&self, update: &ObjectUpdate) -> Result<(), UpdateError> {
        self.object_type(&update.type_name)
            .ok_or_else(|| UpdateError::TypeNotFound(update.type_name.as_str().to_owned()))?
            .validate_object_update(update)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Field, Kind, ObjectKey, Value};

    fn proposal(option_values: &[&str]) -> ObjectType {
        ObjectType::new(
            "proposal",
            vec![Field::new("id", Kind::Uint64)],
            vec![Field::new_enum(
                "status",
                EnumDefinition::new("vote_option", option_values.iter().copied()),
            )],
        )
    }

    fn vote(option_values: &[&str]) -> ObjectType {
        ObjectType::new(
            "vote",
            vec![Field::new("proposal_id", Kind::Uint64), Field::new_address("voter", "cosmos")],
            vec![Field::new_enum(
                "option",
                EnumDefinition::new("vote_option", option_values.iter().copied()),
            )],
        )
    }

    #[test]
    fn test_shared_enum_with_same_values_is_valid() {
        let schema = ModuleSchema::from_object_types([proposal(&["yes", "no"]), vote(&["yes", "no"])]);
        schema.validate().unwrap();
    }

    #[test]
    fn test_shared_enum_with_different_values_fails() {
        let schema =
            ModuleSchema::from_object_types([proposal(&["yes", "no"]), vote(&["yes", "no", "veto"])]);
        assert_eq!(
            schema.validate(),
            Err(SchemaError::EnumConflict("vote_option".into()))
        );
    }

    #[test]
    fn test_standalone_enum_participates_in_conflicts() {
        let schema = ModuleSchema::from_object_types([vote(&["yes", "no"])])
            .with_enum(EnumDefinition::new("vote_option", ["yes"]));
        assert_eq!(
            schema.validate(),
            Err(SchemaError::EnumConflict("vote_option".into()))
        );
    }

    #[test]
    fn test_validate_is_reentrant() {
        let schema = ModuleSchema::from_object_types([proposal(&["yes", "no"])]);
        schema.validate().unwrap();
        schema.validate().unwrap();
    }

    #[test]
    fn test_type_name_mismatch() {
        let mut schema = ModuleSchema::default();
        schema
            .types
            .insert("other".into(), SchemaType::Object(proposal(&["yes"])));
        assert!(matches!(
            schema.validate(),
            Err(SchemaError::TypeNameMismatch { .. })
        ));
    }

    #[test]
    fn test_validate_object_update_type_not_found() {
        let schema = ModuleSchema::from_object_types([proposal(&["yes"])]);
        let update = ObjectUpdate::delete("missing", ObjectKey::Single(Value::Uint64(1)));
        assert_eq!(
            schema.validate_object_update(&update),
            Err(UpdateError::TypeNotFound("missing".into()))
        );

        let update = ObjectUpdate::full(
            "proposal",
            ObjectKey::Single(Value::Uint64(1)),
            vec![Value::Enum("yes".into())],
        );
        schema.validate_object_update(&update).unwrap();
    }

    #[test]
    fn test_schema_json_roundtrip_shape() {
        let schema = ModuleSchema::from_object_types([vote(&["yes", "no"])]);
        let json = serde_json::to_string(&schema).unwrap();
        assert!(json.contains("\"bech32_address\""));
        let parsed: ModuleSchema = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, schema);
    }
}
