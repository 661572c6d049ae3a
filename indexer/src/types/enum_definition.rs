//! Enum definitions and the module-wide enum registry.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::types::SchemaError;
use crate::types::kind::is_valid_name;

/// A named, ordered set of enum values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[allow(clippy::disallowed_methods)] // Clone needed when schemas are shared with generators
pub struct EnumDefinition {
    pub name: String,
    pub values: Vec<String>,
}

impl EnumDefinition {
    #[must_use]
    pub fn new(name: impl Into<String>, values: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            name: name.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns true if `value` is one of this enum's values.
    #[must_use]
    pub fn contains(&self, value: &str) -> bool {
        self.values.iter().any(|v| v == value)
    }

    /// Check the name, every value, and value uniqueness, then register the
    /// definition with `registry`.
    pub fn validate(&self, registry: &mut EnumRegistry) -> Result<(), SchemaError> {
        if !is_valid_name(&self.name) {
            return Err(SchemaError::InvalidName(self.name.as_str().to_owned()));
        }
        if self.values.is_empty() {
            return Err(SchemaError::EmptyEnum(self.name.as_str().to_owned()));
        }

        let mut seen = HashSet::with_capacity(self.values.len());
        for value in &self.values {
            if !is_valid_name(value) {
                return Err(SchemaError::InvalidName(value.as_str().to_owned()));
            }
            if !seen.insert(value.as_str()) {
                return Err(SchemaError::DuplicateEnumValue {
                    enum_name: self.name.as_str().to_owned(),
                    value: value.as_str().to_owned(),
                });
            }
        }

        registry.register(self)
    }
}

/// Accumulates enum definitions seen while validating one module schema.
///
/// Enum identity is by name: every definition registered under a name must
/// carry the same value set. A registry is local to one validation pass.
#[derive(Debug, Default)]
pub struct EnumRegistry {
    values_by_name: BTreeMap<String, Vec<String>>,
}

impl EnumRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `definition`, failing if a same-named definition with a
    /// different value set was recorded earlier.
    pub fn register(&mut self, definition: &EnumDefinition) -> Result<(), SchemaError> {
        match self.values_by_name.get(&definition.name) {
            Some(existing) => {
                let mut lhs: Vec<&str> = existing.iter().map(String::as_str).collect();
                let mut rhs: Vec<&str> = definition.values.iter().map(String::as_str).collect();
                lhs.sort_unstable();
                rhs.sort_unstable();
                if lhs == rhs {
                    Ok(())
                } else {
                    Err(SchemaError::EnumConflict(definition.name.as_str().to_owned()))
                }
            }
            None => {
                self.values_by_name.insert(
                    definition.name.as_str().to_owned(),
                    definition.values.iter().map(|v| v.as_str().to_owned()).collect(),
                );
                Ok(())
            }
        }
    }

    /// Number of distinct enum names registered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values_by_name.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values_by_name.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enum_definition_rejects_duplicates() {
        let def = EnumDefinition::new("vote", ["yes", "no", "yes"]);
        let err = def.validate(&mut EnumRegistry::new()).unwrap_err();
        assert_eq!(
            err,
            SchemaError::DuplicateEnumValue {
                enum_name: "vote".into(),
                value: "yes".into()
            }
        );
    }

    #[test]
    fn test_enum_definition_rejects_empty() {
        let def = EnumDefinition::new("vote", Vec::<String>::new());
        assert_eq!(
            def.validate(&mut EnumRegistry::new()),
            Err(SchemaError::EmptyEnum("vote".into()))
        );
    }

    #[test]
    fn test_registry_accepts_identical_redefinition() {
        let mut registry = EnumRegistry::new();
        registry
            .register(&EnumDefinition::new("vote", ["yes", "no"]))
            .unwrap();
        registry
            .register(&EnumDefinition::new("vote", ["no", "yes"]))
            .unwrap();
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_registry_rejects_conflicting_redefinition() {
        let mut registry = EnumRegistry::new();
        registry
            .register(&EnumDefinition::new("vote", ["yes", "no"]))
            .unwrap();
        assert_eq!(
            registry.register(&EnumDefinition::new("vote", ["yes", "no", "abstain"])),
            Err(SchemaError::EnumConflict("vote".into()))
        );
    }
}
