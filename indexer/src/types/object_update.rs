//! Object update records: the unit of change delivered to listeners.

use std::collections::BTreeMap;

use crate::types::Value;

/// The key of an object, shaped by the arity of its object type's key fields.
#[derive(Debug, Clone, PartialEq)]
#[allow(clippy::disallowed_methods)] // Clone needed to hand copies to listeners
pub enum ObjectKey {
    /// The object type has no key fields; it holds a single object.
    Unit,
    /// The object type has exactly one key field.
    Single(Value),
    /// The object type has two or more key fields, in declaration order.
    Composite(Vec<Value>),
}

impl ObjectKey {
    /// Build a key from its component values, choosing the shape by count.
    #[must_use]
    pub fn from_values(mut values: Vec<Value>) -> Self {
        match values.len() {
            0 => Self::Unit,
            1 => values.pop().map_or(Self::Unit, Self::Single),
            _ => Self::Composite(values),
        }
    }

    /// The key's component values in key field order.
    #[must_use]
    pub fn values(&self) -> &[Value] {
        match self {
            Self::Unit => &[],
            Self::Single(value) => std::slice::from_ref(value),
            Self::Composite(values) => values,
        }
    }

    /// A stable rendering used to order and look up keys in a store.
    ///
    /// Structurally equal keys always render to the same string, and keys
    /// with different component values render differently.
    #[must_use]
    pub fn canonical_string(&self) -> String {
        match self {
            Self::Unit => "()".to_owned(),
            Self::Single(value) => value.to_string(),
            Self::Composite(values) => {
                let parts: Vec<String> = values.iter().map(ToString::to_string).collect();
                format!("[{}]", parts.join(", "))
            }
        }
    }
}

/// The value payload of a non-delete update.
#[derive(Debug, Clone, PartialEq)]
#[allow(clippy::disallowed_methods)] // Clone needed to hand copies to listeners
pub enum ValueUpdate {
    /// No payload. Only valid for object types without value fields.
    Absent,
    /// Replace every value field, in declaration order.
    Full(Vec<Value>),
    /// Set only the named fields; fields not mentioned keep their current value.
    Partial(BTreeMap<String, Value>),
}

impl ValueUpdate {
    /// Returns true for a partial update.
    #[must_use]
    pub const fn is_partial(&self) -> bool {
        matches!(self, Self::Partial(_))
    }
}

/// One mutation of one object.
#[derive(Debug, Clone, PartialEq)]
#[allow(clippy::disallowed_methods)] // Clone needed to hand copies to listeners
pub struct ObjectUpdate {
    /// Name of the object type this update targets.
    pub type_name: String,
    pub key: ObjectKey,
    /// Ignored when `delete` is set.
    pub value: ValueUpdate,
    pub delete: bool,
}

impl ObjectUpdate {
    /// An insert or full replacement.
    #[must_use]
    pub fn full(type_name: impl Into<String>, key: ObjectKey, values: Vec<Value>) -> Self {
        Self {
            type_name: type_name.into(),
            key,
            value: ValueUpdate::Full(values),
            delete: false,
        }
    }

    /// A sparse update touching only the given fields.
    #[must_use]
    pub fn partial(
        type_name: impl Into<String>,
        key: ObjectKey,
        fields: impl IntoIterator<Item = (String, Value)>,
    ) -> Self {
        Self {
            type_name: type_name.into(),
            key,
            value: ValueUpdate::Partial(fields.into_iter().collect()),
            delete: false,
        }
    }

    /// A deletion of the object at `key`.
    #[must_use]
    pub fn delete(type_name: impl Into<String>, key: ObjectKey) -> Self {
        Self {
            type_name: type_name.into(),
            key,
            value: ValueUpdate::Absent,
            delete: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_shape_from_values() {
        assert_eq!(ObjectKey::from_values(vec![]), ObjectKey::Unit);
        assert_eq!(
            ObjectKey::from_values(vec![Value::Uint64(1)]),
            ObjectKey::Single(Value::Uint64(1))
        );
        assert_eq!(
            ObjectKey::from_values(vec![Value::Uint64(1), Value::Bool(true)]).values(),
            &[Value::Uint64(1), Value::Bool(true)]
        );
    }

    #[test]
    fn test_composite_key_rendering_is_stable() {
        let a = ObjectKey::Composite(vec![Value::String("x".into()), Value::Uint32(7)]);
        let b = ObjectKey::Composite(vec![Value::String("x".into()), Value::Uint32(7)]);
        assert_eq!(a.canonical_string(), b.canonical_string());
        assert_eq!(a.canonical_string(), "[\"x\", 7u32]");
    }

    #[test]
    fn test_composite_key_rendering_does_not_collide() {
        let a = ObjectKey::Composite(vec![Value::String("a, b".into()), Value::String("c".into())]);
        let b = ObjectKey::Composite(vec![Value::String("a".into()), Value::String("b, c".into())]);
        assert_ne!(a.canonical_string(), b.canonical_string());
    }

    #[test]
    fn test_unit_and_single_key_rendering() {
        assert_eq!(ObjectKey::Unit.canonical_string(), "()");
        let single = ObjectKey::Single(Value::Bech32Address(vec![0xab, 0x01]));
        assert_eq!(single.canonical_string(), "addr:ab01");
        assert_eq!(
            single.canonical_string(),
            Value::Bech32Address(vec![0xab, 0x01]).to_string()
        );
        assert_ne!(
            ObjectKey::Single(Value::Uint8(1)).canonical_string(),
            ObjectKey::Single(Value::Int8(1)).canonical_string()
        );
    }
}
