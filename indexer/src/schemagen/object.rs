//! Key, value-update and object-update generators, plus random object
//! types and module schemas for fuzzing schema-handling code.

use std::collections::{BTreeMap, HashSet};

use rand::Rng;

use super::field::{FieldValueGenerator, random_field, random_name};
use crate::simulation::ObjectStore;
use crate::types::{EnumDefinition, Field, ModuleSchema, ObjectKey, ObjectType, ObjectUpdate, ValueUpdate};

/// Draws keys for an ordered set of key fields.
///
/// No key fields always yields [`ObjectKey::Unit`], one yields
/// [`ObjectKey::Single`], and more yield a [`ObjectKey::Composite`] in
/// field order.
#[derive(Debug, Clone)]
pub struct KeyGenerator {
    fields: Vec<FieldValueGenerator>,
}

impl KeyGenerator {
    #[must_use]
    pub fn new(key_fields: &[Field]) -> Self {
        Self {
            fields: key_fields.iter().map(FieldValueGenerator::new).collect(),
        }
    }

    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> ObjectKey {
        ObjectKey::from_values(self.fields.iter().map(|g| g.generate(rng)).collect())
    }
}

/// Draws value payloads for an ordered set of value fields.
///
/// Each draw picks a full tuple or a partial update with equal odds. A
/// partial update includes each field independently with probability one
/// half, so empty partial updates occur too.
#[derive(Debug, Clone)]
pub struct ValueUpdateGenerator {
    fields: Vec<FieldValueGenerator>,
}

impl ValueUpdateGenerator {
    #[must_use]
    pub fn new(value_fields: &[Field]) -> Self {
        Self {
            fields: value_fields.iter().map(FieldValueGenerator::new).collect(),
        }
    }

    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> ValueUpdate {
        if self.fields.is_empty() {
            return ValueUpdate::Absent;
        }

        if rng.random_bool(0.5) {
            let mut changes = BTreeMap::new();
            for generator in &self.fields {
                if rng.random_bool(0.5) {
                    continue;
                }
                changes.insert(
                    generator.field().name.as_str().to_owned(),
                    generator.generate(rng),
                );
            }
            ValueUpdate::Partial(changes)
        } else {
            ValueUpdate::Full(self.fields.iter().map(|g| g.generate(rng)).collect())
        }
    }
}

/// Draws updates for one object type, aware of the objects that exist.
#[derive(Debug, Clone)]
pub struct ObjectUpdateGenerator {
    type_name: String,
    key: KeyGenerator,
    value: ValueUpdateGenerator,
}

impl ObjectUpdateGenerator {
    #[must_use]
    pub fn new(object_type: &ObjectType) -> Self {
        Self {
            type_name: object_type.name.as_str().to_owned(),
            key: KeyGenerator::new(&object_type.key_fields),
            value: ValueUpdateGenerator::new(&object_type.value_fields),
        }
    }

    /// Draw an upsert for a fresh key.
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> ObjectUpdate {
        ObjectUpdate {
            type_name: self.type_name.as_str().to_owned(),
            key: self.key.generate(rng),
            value: self.value.generate(rng),
            delete: false,
        }
    }

    /// Draw an update given the objects currently in `store`.
    ///
    /// Half of the time an existing key is reused; a reused key is then
    /// deleted or updated with equal odds. Otherwise a fresh key is upserted.
    pub fn generate_with_state<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        store: &ObjectStore,
    ) -> ObjectUpdate {
        if store.is_empty() || !rng.random_bool(0.5) {
            return self.generate(rng);
        }

        let index = rng.random_range(0..store.len());
        let Some(entry) = store.nth(index) else {
            return self.generate(rng);
        };
        #[allow(clippy::disallowed_methods)] // Reused keys are copied into the update
        let key = entry.key.clone();

        if rng.random_bool(0.5) {
            ObjectUpdate::delete(self.type_name.as_str(), key)
        } else {
            ObjectUpdate {
                type_name: self.type_name.as_str().to_owned(),
                key,
                value: self.value.generate(rng),
                delete: false,
            }
        }
    }
}

/// Draw a valid object type: one to three non-nullable key fields and up
/// to six value fields, all with distinct names.
pub fn random_object_type<R: Rng + ?Sized>(rng: &mut R) -> ObjectType {
    let mut names = HashSet::new();
    let mut draw_field = |rng: &mut R| loop {
        let field = random_field(rng);
        if names.insert(field.name.as_str().to_owned()) {
            return field;
        }
    };

    let key_count = rng.random_range(1..=3);
    let key_fields = (0..key_count)
        .map(|_| {
            let mut field = draw_field(rng);
            field.nullable = false;
            field
        })
        .collect();
    let value_count = rng.random_range(0..=6);
    let value_fields = (0..value_count).map(|_| draw_field(rng)).collect();

    ObjectType::new(random_name(rng), key_fields, value_fields)
}

/// Draw a module schema with one to four object types that passes
/// validation. Enum names that collide reuse the first definition drawn,
/// so shared enums appear as they would in a real module.
pub fn random_module_schema<R: Rng + ?Sized>(rng: &mut R) -> ModuleSchema {
    let count = rng.random_range(1..=4);
    let mut enums: BTreeMap<String, EnumDefinition> = BTreeMap::new();
    let mut object_types = Vec::with_capacity(count);
    let mut names = HashSet::new();

    while object_types.len() < count {
        let mut object_type = random_object_type(rng);
        if !names.insert(object_type.name.as_str().to_owned()) {
            continue;
        }
        for field in object_type
            .key_fields
            .iter_mut()
            .chain(object_type.value_fields.iter_mut())
        {
            if let Some(definition) = field.enum_definition.as_mut() {
                #[allow(clippy::disallowed_methods)] // Shared definitions are copied per field
                let shared = enums
                    .entry(definition.name.as_str().to_owned())
                    .or_insert_with(|| definition.clone())
                    .clone();
                *definition = shared;
            }
        }
        object_types.push(object_type);
    }

    ModuleSchema::from_object_types(object_types)
}
