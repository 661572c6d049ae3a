//! Field descriptors.

use serde::{Deserialize, Serialize};

use crate::types::kind::is_valid_name;
use crate::types::{EnumDefinition, EnumRegistry, Kind, SchemaError, Value, ValueError};

/// A named, typed slot in an object type.
///
/// `enum_definition` is set exactly when `kind` is [`Kind::Enum`], and
/// `address_prefix` exactly when `kind` is [`Kind::Bech32Address`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[allow(clippy::disallowed_methods)] // Clone needed when schemas are shared with generators
pub struct Field {
    pub name: String,
    pub kind: Kind,
    #[serde(default)]
    pub nullable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enum_definition: Option<EnumDefinition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_prefix: Option<String>,
}

impl Field {
    /// A non-nullable field of a kind that needs no auxiliary data.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: Kind) -> Self {
        Self {
            name: name.into(),
            kind,
            nullable: false,
            enum_definition: None,
            address_prefix: None,
        }
    }

    /// An enum field drawing from `definition`.
    #[must_use]
    pub fn new_enum(name: impl Into<String>, definition: EnumDefinition) -> Self {
        Self {
            enum_definition: Some(definition),
            ..Self::new(name, Kind::Enum)
        }
    }

    /// An address field rendered with `prefix`.
    #[must_use]
    pub fn new_address(name: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            address_prefix: Some(prefix.into()),
            ..Self::new(name, Kind::Bech32Address)
        }
    }

    /// Mark the field nullable.
    #[must_use]
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Check the field definition, registering its enum definition if any.
    pub fn validate(&self, registry: &mut EnumRegistry) -> Result<(), SchemaError> {
        if !is_valid_name(&self.name) {
            return Err(SchemaError::InvalidName(self.name.as_str().to_owned()));
        }
        if self.kind == Kind::Invalid {
            return Err(SchemaError::InvalidKind {
                field: self.name.as_str().to_owned(),
            });
        }

        match (&self.enum_definition, self.kind == Kind::Enum) {
            (Some(definition), true) => definition.validate(registry)?,
            (None, false) => {}
            _ => {
                return Err(SchemaError::EnumDefinitionMismatch {
                    field: self.name.as_str().to_owned(),
                    kind: self.kind,
                });
            }
        }

        match (&self.address_prefix, self.kind == Kind::Bech32Address) {
            (Some(prefix), true) if !prefix.is_empty() => Ok(()),
            (None, false) => Ok(()),
            _ => Err(SchemaError::AddressPrefixMismatch {
                field: self.name.as_str().to_owned(),
                kind: self.kind,
            }),
        }
    }

    /// Check that `value` is valid for this field: null only when nullable,
    /// otherwise matching the kind and, for enums, the definition's values.
    pub fn validate_value(&self, value: &Value) -> Result<(), ValueError> {
        if value.is_null() {
            return if self.nullable {
                Ok(())
            } else {
                Err(ValueError::NullNotAllowed)
            };
        }

        self.kind.validate_value(value)?;

        if let (Value::Enum(v), Some(definition)) = (value, &self.enum_definition) {
            if !definition.contains(v) {
                return Err(ValueError::UnknownEnumValue {
                    enum_name: definition.name.as_str().to_owned(),
                    value: v.as_str().to_owned(),
                });
            }
        }

        Ok(())
    }
}
