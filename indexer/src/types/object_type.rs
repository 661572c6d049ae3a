//! Object types: named records split into key and value fields.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::types::kind::is_valid_name;
use crate::types::{
    EnumRegistry, Field, ObjectKey, ObjectUpdate, SchemaError, UpdateError, Value, ValueUpdate,
};

/// A record shape. Key fields identify an object and are never nullable;
/// value fields hold its mutable payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[allow(clippy::disallowed_methods)] // Clone needed when schemas are shared with generators
pub struct ObjectType {
    pub name: String,
    #[serde(default)]
    pub key_fields: Vec<Field>,
    #[serde(default)]
    pub value_fields: Vec<Field>,
}

impl ObjectType {
    #[must_use]
    pub fn new(name: impl Into<String>, key_fields: Vec<Field>, value_fields: Vec<Field>) -> Self {
        Self {
            name: name.into(),
            key_fields,
            value_fields,
        }
    }

    /// Check the type's name and fields.
    ///
    /// Field names must be unique across key and value fields, and key
    /// fields must not be nullable. Enum definitions are registered with
    /// `registry` so conflicts across object types are caught.
    pub fn validate(&self, registry: &mut EnumRegistry) -> Result<(), SchemaError> {
        if !is_valid_name(&self.name) {
            return Err(SchemaError::InvalidName(self.name.as_str().to_owned()));
        }

        let mut names = HashSet::with_capacity(self.key_fields.len() + self.value_fields.len());
        for field in &self.key_fields {
            field.validate(registry)?;
            if field.nullable {
                return Err(SchemaError::NullableKey {
                    object_type: self.name.as_str().to_owned(),
                    field: field.name.as_str().to_owned(),
                });
            }
            self.check_unique(&mut names, field)?;
        }
        for field in &self.value_fields {
            field.validate(registry)?;
            self.check_unique(&mut names, field)?;
        }

        Ok(())
    }

    fn check_unique<'a>(
        &self,
        names: &mut HashSet<&'a str>,
        field: &'a Field,
    ) -> Result<(), SchemaError> {
        if names.insert(field.name.as_str()) {
            Ok(())
        } else {
            Err(SchemaError::DuplicateField {
                object_type: self.name.as_str().to_owned(),
                field: field.name.as_str().to_owned(),
            })
        }
    }

    /// Position of the value field called `name`.
    #[must_use]
    pub fn value_field_index(&self, name: &str) -> Option<usize> {
        self.value_fields.iter().position(|f| f.name == name)
    }

    /// Check that `update` conforms to this object type.
    ///
    /// Deletes only check the key. Other updates also check the payload:
    /// a full tuple must match the value fields in count and order, and a
    /// partial update may only name existing value fields.
    pub fn validate_object_update(&self, update: &ObjectUpdate) -> Result<(), UpdateError> {
        if update.type_name != self.name {
            return Err(UpdateError::TypeMismatch {
                expected: self.name.as_str().to_owned(),
                actual: update.type_name.as_str().to_owned(),
            });
        }

        self.validate_key(&update.key)?;

        if update.delete {
            return Ok(());
        }

        self.validate_value_update(&update.value)
    }

    /// Check a key against the key fields by position.
    pub fn validate_key(&self, key: &ObjectKey) -> Result<(), UpdateError> {
        let values = key.values();
        if values.len() != self.key_fields.len() {
            return Err(UpdateError::KeyArity {
                expected: self.key_fields.len(),
                actual: values.len(),
            });
        }
        check_fields(self.key_fields.iter().zip(values))
    }

    /// Check a value payload against the value fields.
    pub fn validate_value_update(&self, value: &ValueUpdate) -> Result<(), UpdateError> {
        match value {
            ValueUpdate::Absent if self.value_fields.is_empty() => Ok(()),
            ValueUpdate::Absent => Err(UpdateError::MissingValue),
            ValueUpdate::Full(values) => {
                if values.len() != self.value_fields.len() {
                    return Err(UpdateError::ValueArity {
                        expected: self.value_fields.len(),
                        actual: values.len(),
                    });
                }
                check_fields(self.value_fields.iter().zip(values))
            }
            ValueUpdate::Partial(fields) => {
                for (name, value) in fields {
                    let Some(index) = self.value_field_index(name) else {
                        return Err(UpdateError::UnknownField(name.as_str().to_owned()));
                    };
                    check_fields(std::iter::once((&self.value_fields[index], value)))?;
                }
                Ok(())
            }
        }
    }
}

fn check_fields<'a>(
    pairs: impl IntoIterator<Item = (&'a Field, &'a Value)>,
) -> Result<(), UpdateError> {
    for (field, value) in pairs {
        field
            .validate_value(value)
            .map_err(|error| UpdateError::InvalidField {
                field: field.name.as_str().to_owned(),
                error,
            })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{EnumDefinition, Kind, ValueError};

    fn balance() -> ObjectType {
        ObjectType::new(
            "balance",
            vec![Field::new_address("addr", "cosmos")],
            vec![
                Field::new("amount", Kind::Uint64),
                Field::new("memo", Kind::String).nullable(),
            ],
        )
    }

    fn addr() -> ObjectKey {
        ObjectKey::Single(Value::Bech32Address(vec![1; 20]))
    }

    #[test]
    fn test_object_type_validate_ok() {
        balance().validate(&mut EnumRegistry::new()).unwrap();
    }

    #[test]
    fn test_object_type_rejects_nullable_key() {
        let ty = ObjectType::new("t", vec![Field::new("id", Kind::Uint64).nullable()], vec![]);
        assert_eq!(
            ty.validate(&mut EnumRegistry::new()),
            Err(SchemaError::NullableKey {
                object_type: "t".into(),
                field: "id".into()
            })
        );
    }

    #[test]
    fn test_object_type_rejects_duplicate_fields() {
        let dup_key = ObjectType::new(
            "t",
            vec![Field::new("id", Kind::Uint64), Field::new("id", Kind::String)],
            vec![],
        );
        assert!(matches!(
            dup_key.validate(&mut EnumRegistry::new()),
            Err(SchemaError::DuplicateField { .. })
        ));

        let overlap = ObjectType::new(
            "t",
            vec![Field::new("id", Kind::Uint64)],
            vec![Field::new("id", Kind::Uint64)],
        );
        assert!(matches!(
            overlap.validate(&mut EnumRegistry::new()),
            Err(SchemaError::DuplicateField { .. })
        ));
    }

    #[test]
    fn test_object_type_enum_conflict_across_fields() {
        let ty = ObjectType::new(
            "t",
            vec![Field::new("id", Kind::Uint64)],
            vec![
                Field::new_enum("a", EnumDefinition::new("color", ["red", "blue"])),
                Field::new_enum("b", EnumDefinition::new("color", ["red"])),
            ],
        );
        assert_eq!(
            ty.validate(&mut EnumRegistry::new()),
            Err(SchemaError::EnumConflict("color".into()))
        );
    }

    #[test]
    fn test_validate_full_update() {
        let ty = balance();
        let ok = ObjectUpdate::full("balance", addr(), vec![Value::Uint64(100), Value::Null]);
        ty.validate_object_update(&ok).unwrap();

        let short = ObjectUpdate::full("balance", addr(), vec![Value::Uint64(100)]);
        assert_eq!(
            ty.validate_object_update(&short),
            Err(UpdateError::ValueArity {
                expected: 2,
                actual: 1
            })
        );

        let null_amount = ObjectUpdate::full("balance", addr(), vec![Value::Null, Value::Null]);
        assert_eq!(
            ty.validate_object_update(&null_amount),
            Err(UpdateError::InvalidField {
                field: "amount".into(),
                error: ValueError::NullNotAllowed
            })
        );
    }

    #[test]
    fn test_validate_partial_update() {
        let ty = balance();
        let empty = ObjectUpdate::partial("balance", addr(), []);
        ty.validate_object_update(&empty).unwrap();

        let memo = ObjectUpdate::partial("balance", addr(), [("memo".to_string(), Value::Null)]);
        ty.validate_object_update(&memo).unwrap();

        let unknown =
            ObjectUpdate::partial("balance", addr(), [("fee".to_string(), Value::Uint64(1))]);
        assert_eq!(
            ty.validate_object_update(&unknown),
            Err(UpdateError::UnknownField("fee".into()))
        );

        let wrong_kind = ObjectUpdate::partial(
            "balance",
            addr(),
            [("amount".to_string(), Value::Int64(-1))],
        );
        assert!(matches!(
            ty.validate_object_update(&wrong_kind),
            Err(UpdateError::InvalidField { .. })
        ));
    }

    #[test]
    fn test_validate_delete_checks_only_key() {
        let ty = balance();
        let mut delete = ObjectUpdate::delete("balance", addr());
        delete.value = ValueUpdate::Full(vec![Value::Bool(true)]);
        ty.validate_object_update(&delete).unwrap();

        let bad_key = ObjectUpdate::delete("balance", ObjectKey::Single(Value::Bytes(vec![1])));
        assert!(matches!(
            ty.validate_object_update(&bad_key),
            Err(UpdateError::InvalidField { .. })
        ));

        let null_key = ObjectUpdate::delete("balance", ObjectKey::Single(Value::Null));
        assert!(ty.validate_object_update(&null_key).is_err());
    }

    #[test]
    fn test_validate_key_arity() {
        let ty = balance();
        let update = ObjectUpdate::delete("balance", ObjectKey::Unit);
        assert_eq!(
            ty.validate_object_update(&update),
            Err(UpdateError::KeyArity {
                expected: 1,
                actual: 0
            })
        );
    }

    #[test]
    fn test_absent_value_only_without_value_fields() {
        let marker = ObjectType::new("marker", vec![Field::new("id", Kind::Uint32)], vec![]);
        let mut update = ObjectUpdate::delete("marker", ObjectKey::Single(Value::Uint32(1)));
        update.delete = false;
        marker.validate_object_update(&update).unwrap();

        let mut update = ObjectUpdate::delete("balance", addr());
        update.delete = false;
        assert_eq!(
            balance().validate_object_update(&update),
            Err(UpdateError::MissingValue)
        );
    }

    #[test]
    fn test_type_mismatch() {
        let update = ObjectUpdate::delete("supply", addr());
        assert!(matches!(
            balance().validate_object_update(&update),
            Err(UpdateError::TypeMismatch { .. })
        ));
    }
}
