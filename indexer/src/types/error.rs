//! Schema and update validation errors.

use std::fmt;

use crate::types::Kind;

/// A malformed schema. Detected by `validate` before simulation starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// A type, field, enum or enum value name does not match the name grammar.
    InvalidName(String),
    /// A field uses [`Kind::Invalid`].
    InvalidKind { field: String },
    /// An enum field has no enum definition, or a non-enum field has one.
    EnumDefinitionMismatch { field: String, kind: Kind },
    /// An address field has no prefix, or a non-address field has one.
    AddressPrefixMismatch { field: String, kind: Kind },
    /// An enum definition declares no values.
    EmptyEnum(String),
    /// An enum definition repeats a value.
    DuplicateEnumValue { enum_name: String, value: String },
    /// Two definitions share an enum name but not its value set.
    EnumConflict(String),
    /// A field name appears twice within one object type.
    DuplicateField { object_type: String, field: String },
    /// A key field is nullable.
    NullableKey { object_type: String, field: String },
    /// A module schema entry is registered under a different name than it declares.
    TypeNameMismatch { key: String, name: String },
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidName(name) => write!(f, "invalid name {name:?}"),
            Self::InvalidKind { field } => write!(f, "field {field:?} has an invalid kind"),
            Self::EnumDefinitionMismatch { field, kind } => write!(
                f,
                "field {field:?} of kind {kind}: enum definition must be set exactly for enum fields"
            ),
            Self::AddressPrefixMismatch { field, kind } => write!(
                f,
                "field {field:?} of kind {kind}: address prefix must be set exactly for address fields"
            ),
            Self::EmptyEnum(name) => write!(f, "enum {name:?} has no values"),
            Self::DuplicateEnumValue { enum_name, value } => {
                write!(f, "enum {enum_name:?} repeats value {value:?}")
            }
            Self::EnumConflict(name) => {
                write!(f, "enum {name:?} is defined more than once with different values")
            }
            Self::DuplicateField { object_type, field } => {
                write!(f, "object type {object_type:?} declares field {field:?} twice")
            }
            Self::NullableKey { object_type, field } => {
                write!(f, "object type {object_type:?} has nullable key field {field:?}")
            }
            Self::TypeNameMismatch { key, name } => {
                write!(f, "type registered as {key:?} is named {name:?}")
            }
        }
    }
}

impl std::error::Error for SchemaError {}

/// A single value that does not fit its field.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueError {
    /// Null given for a field that is not nullable.
    NullNotAllowed,
    /// The value's variant does not match the field's kind.
    KindMismatch { expected: Kind, actual: Option<Kind> },
    /// An integer or decimal string does not match its grammar.
    InvalidFormat { kind: Kind, value: String },
    /// An address outside the accepted byte length range.
    AddressLength(usize),
    /// An enum value that is not part of the field's definition.
    UnknownEnumValue { enum_name: String, value: String },
}

impl fmt::Display for ValueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NullNotAllowed => write!(f, "null value for non-nullable field"),
            Self::KindMismatch {
                expected,
                actual: Some(actual),
            } => write!(f, "expected {expected} value, got {actual}"),
            Self::KindMismatch {
                expected,
                actual: None,
            } => write!(f, "expected {expected} value, got null"),
            Self::InvalidFormat { kind, value } => {
                write!(f, "{value:?} is not a valid {kind} string")
            }
            Self::AddressLength(len) => write!(
                f,
                "address length {len} outside {}..={}",
                crate::constants::MIN_ADDRESS_LENGTH,
                crate::constants::MAX_ADDRESS_LENGTH
            ),
            Self::UnknownEnumValue { enum_name, value } => {
                write!(f, "{value:?} is not a value of enum {enum_name:?}")
            }
        }
    }
}

impl std::error::Error for ValueError {}

/// An object update that does not conform to its object type.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateError {
    /// No object type with this name exists in the schema.
    TypeNotFound(String),
    /// The update was checked against an object type with a different name.
    TypeMismatch { expected: String, actual: String },
    /// The key has the wrong number of components.
    KeyArity { expected: usize, actual: usize },
    /// A full value tuple has the wrong number of components.
    ValueArity { expected: usize, actual: usize },
    /// A partial update names a field the object type does not have.
    UnknownField(String),
    /// A non-delete update without a value payload, for a type that has value fields.
    MissingValue,
    /// A key or value field holds an invalid value.
    InvalidField { field: String, error: ValueError },
}

impl fmt::Display for UpdateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TypeNotFound(name) => write!(f, "object type {name:?} not found"),
            Self::TypeMismatch { expected, actual } => {
                write!(f, "update for type {actual:?} checked against type {expected:?}")
            }
            Self::KeyArity { expected, actual } => {
                write!(f, "expected {expected} key values, got {actual}")
            }
            Self::ValueArity { expected, actual } => {
                write!(f, "expected {expected} values, got {actual}")
            }
            Self::UnknownField(name) => write!(f, "unknown value field {name:?}"),
            Self::MissingValue => write!(f, "update is missing its value"),
            Self::InvalidField { field, error } => write!(f, "field {field:?}: {error}"),
        }
    }
}

impl std::error::Error for UpdateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidField { error, .. } => Some(error),
            _ => None,
        }
    }
}
