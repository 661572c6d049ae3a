//! Canonical per-object-type state.
//!
//! An [`ObjectStore`] holds the objects of one object type, ordered by the
//! canonical rendering of their keys. It changes only by applying
//! validated updates and is never read back from a listener.

// Stored entries keep their own copies of keys and values
#![allow(clippy::disallowed_methods)]

use std::collections::{BTreeMap, HashMap, btree_map};

use crate::types::{ObjectKey, ObjectType, ObjectUpdate, UpdateError, Value, ValueUpdate};

/// One stored object.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub key: ObjectKey,
    /// One slot per value field, in declaration order. `None` means the
    /// field has never been written for this object.
    pub fields: Vec<Option<Value>>,
}

impl Entry {
    /// The current value of the value field at `index`, if written.
    #[must_use]
    pub fn field(&self, index: usize) -> Option<&Value> {
        self.fields.get(index).and_then(Option::as_ref)
    }

    /// The current value of the value field called `name`, if written.
    #[must_use]
    pub fn field_by_name(&self, object_type: &ObjectType, name: &str) -> Option<&Value> {
        object_type
            .value_field_index(name)
            .and_then(|index| self.field(index))
    }
}

/// What applying an update did to a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Inserted,
    Updated,
    Deleted,
    /// A delete for a key that was not present.
    DeleteMissing,
}

/// Objects of one object type, ordered by canonical key.
///
/// Alongside the ordered map the store keeps a dense slot list of keys so
/// [`nth`](Self::nth) is a hash lookup plus a map lookup rather than a walk.
/// Slot order is insertion order, with a delete moving the last slot into
/// the freed one.
#[derive(Debug, Clone, Default)]
pub struct ObjectStore {
    entries: BTreeMap<String, Entry>,
    slots: Vec<String>,
    slot_of: HashMap<String, usize>,
}

/// Stores are equal when they hold the same entries, whatever their slot order.
impl PartialEq for ObjectStore {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl ObjectStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The entry stored under `key`.
    #[must_use]
    pub fn get(&self, key: &ObjectKey) -> Option<&Entry> {
        self.entries.get(&key.canonical_string())
    }

    /// The entry in slot `index`, for `index < len()`.
    ///
    /// Slots are deterministic for a given sequence of updates but are not
    /// in key order; use [`iter`](Self::iter) for that.
    #[must_use]
    pub fn nth(&self, index: usize) -> Option<&Entry> {
        self.slots
            .get(index)
            .and_then(|key| self.entries.get(key))
    }

    /// Entries with their canonical keys, in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Entry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Apply one update.
    ///
    /// Deletes remove the key (a missing key is a no-op). Full updates
    /// replace every value field. Partial updates overwrite only the fields
    /// they name and leave the rest as they were; on a new key the other
    /// fields stay unwritten.
    pub fn apply(
        &mut self,
        object_type: &ObjectType,
        update: &ObjectUpdate,
    ) -> Result<ApplyOutcome, UpdateError> {
        let key = update.key.canonical_string();

        if update.delete {
            return Ok(if self.entries.remove(&key).is_some() {
                self.release_slot(&key);
                ApplyOutcome::Deleted
            } else {
                ApplyOutcome::DeleteMissing
            });
        }

        let field_count = object_type.value_fields.len();
        let current = self.entries.get(&key).map(|entry| &entry.fields);
        let outcome = if current.is_some() {
            ApplyOutcome::Updated
        } else {
            ApplyOutcome::Inserted
        };

        let new_fields = match &update.value {
            ValueUpdate::Absent if field_count == 0 => None,
            ValueUpdate::Absent => return Err(UpdateError::MissingValue),
            ValueUpdate::Full(values) => {
                if values.len() != field_count {
                    return Err(UpdateError::ValueArity {
                        expected: field_count,
                        actual: values.len(),
                    });
                }
                Some(values.iter().cloned().map(Some).collect())
            }
            ValueUpdate::Partial(changes) => {
                let mut fields = current.map_or_else(|| vec![None; field_count], Clone::clone);
                for (name, value) in changes {
                    let index = object_type
                        .value_field_index(name)
                        .ok_or_else(|| UpdateError::UnknownField(name.clone()))?;
                    fields[index] = Some(value.clone());
                }
                Some(fields)
            }
        };

        match self.entries.entry(key) {
            btree_map::Entry::Occupied(mut slot) => {
                if let Some(fields) = new_fields {
                    slot.get_mut().fields = fields;
                }
            }
            btree_map::Entry::Vacant(slot) => {
                self.slot_of.insert(slot.key().clone(), self.slots.len());
                self.slots.push(slot.key().clone());
                slot.insert(Entry {
                    key: update.key.clone(),
                    fields: new_fields.unwrap_or_default(),
                });
            }
        }

        Ok(outcome)
    }

    fn release_slot(&mut self, key: &str) {
        let Some(index) = self.slot_of.remove(key) else {
            return;
        };
        self.slots.swap_remove(index);
        if let Some(moved) = self.slots.get(index) {
            self.slot_of.insert(moved.clone(), index);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Field, Kind};

    fn balance() -> ObjectType {
        ObjectType::new(
            "balance",
            vec![Field::new_address("addr", "cosmos")],
            vec![Field::new("amount", Kind::Uint64)],
        )
    }

    fn addr(byte: u8) -> ObjectKey {
        ObjectKey::Single(Value::Bech32Address(vec![byte; 20]))
    }

    #[test]
    fn test_empty_partial_update_keeps_existing_fields() {
        let ty = balance();
        let mut store = ObjectStore::new();

        let set = ObjectUpdate::partial("balance", addr(1), [("amount".to_string(), Value::Uint64(100))]);
        assert_eq!(store.apply(&ty, &set).unwrap(), ApplyOutcome::Inserted);

        let empty = ObjectUpdate::partial("balance", addr(1), []);
        assert_eq!(store.apply(&ty, &empty).unwrap(), ApplyOutcome::Updated);

        let entry = store.get(&addr(1)).unwrap();
        assert_eq!(entry.field_by_name(&ty, "amount"), Some(&Value::Uint64(100)));
    }

    #[test]
    fn test_delete_then_delete_again_is_noop() {
        let ty = balance();
        let mut store = ObjectStore::new();
        store
            .apply(
                &ty,
                &ObjectUpdate::full("balance", addr(1), vec![Value::Uint64(5)]),
            )
            .unwrap();

        let delete = ObjectUpdate::delete("balance", addr(1));
        assert_eq!(store.apply(&ty, &delete).unwrap(), ApplyOutcome::Deleted);
        assert!(store.get(&addr(1)).is_none());
        assert_eq!(
            store.apply(&ty, &delete).unwrap(),
            ApplyOutcome::DeleteMissing
        );
        assert!(store.is_empty());
    }

    #[test]
    fn test_partial_update_on_new_key_leaves_fields_unwritten() {
        let ty = ObjectType::new(
            "t",
            vec![Field::new("id", Kind::Uint32)],
            vec![Field::new("a", Kind::Bool), Field::new("b", Kind::Bool)],
        );
        let mut store = ObjectStore::new();
        let key = ObjectKey::Single(Value::Uint32(1));
        store
            .apply(
                &ty,
                &ObjectUpdate::partial("t", key.clone(), [("b".to_string(), Value::Bool(true))]),
            )
            .unwrap();
        assert_eq!(
            store.get(&key).unwrap().fields,
            vec![None, Some(Value::Bool(true))]
        );
    }

    #[test]
    fn test_full_update_replaces_all_fields() {
        let ty = ObjectType::new(
            "t",
            vec![Field::new("id", Kind::Uint32)],
            vec![Field::new("a", Kind::Bool), Field::new("b", Kind::Bool).nullable()],
        );
        let mut store = ObjectStore::new();
        let key = ObjectKey::Single(Value::Uint32(1));
        store
            .apply(
                &ty,
                &ObjectUpdate::full("t", key.clone(), vec![Value::Bool(true), Value::Bool(true)]),
            )
            .unwrap();
        store
            .apply(
                &ty,
                &ObjectUpdate::full("t", key.clone(), vec![Value::Bool(false), Value::Null]),
            )
            .unwrap();
        assert_eq!(
            store.get(&key).unwrap().fields,
            vec![Some(Value::Bool(false)), Some(Value::Null)]
        );
    }

    #[test]
    fn test_replaying_updates_yields_same_store() {
        let ty = balance();
        let updates = vec![
            ObjectUpdate::full("balance", addr(1), vec![Value::Uint64(1)]),
            ObjectUpdate::full("balance", addr(2), vec![Value::Uint64(2)]),
            ObjectUpdate::partial("balance", addr(1), [("amount".to_string(), Value::Uint64(10))]),
            ObjectUpdate::delete("balance", addr(2)),
            ObjectUpdate::delete("balance", addr(3)),
            ObjectUpdate::partial("balance", addr(4), []),
        ];

        let replay = || {
            let mut store = ObjectStore::new();
            for update in &updates {
                store.apply(&ty, update).unwrap();
            }
            store
        };

        let first = replay();
        assert_eq!(first, replay());
        assert_eq!(first.len(), 2);
        assert_eq!(
            first.get(&addr(1)).unwrap().field(0),
            Some(&Value::Uint64(10))
        );
        assert!(first.get(&addr(2)).is_none());
        assert_eq!(first.get(&addr(4)).unwrap().field(0), None);
    }

    #[test]
    fn test_composite_keys_address_the_same_entry() {
        let ty = ObjectType::new(
            "delegation",
            vec![Field::new("delegator", Kind::String), Field::new("validator", Kind::String)],
            vec![Field::new("shares", Kind::Decimal)],
        );
        let key = || {
            ObjectKey::Composite(vec![
                Value::String("alice".into()),
                Value::String("val1".into()),
            ])
        };
        let mut store = ObjectStore::new();
        store
            .apply(
                &ty,
                &ObjectUpdate::full("delegation", key(), vec![Value::Decimal("1.5".into())]),
            )
            .unwrap();
        assert_eq!(
            store
                .apply(
                    &ty,
                    &ObjectUpdate::full("delegation", key(), vec![Value::Decimal("2".into())]),
                )
                .unwrap(),
            ApplyOutcome::Updated
        );
        assert_eq!(store.len(), 1);
    }

    fn uint_key(id: u32) -> ObjectKey {
        ObjectKey::Single(Value::Uint32(id))
    }

    fn counter() -> ObjectType {
        ObjectType::new(
            "counter",
            vec![Field::new("id", Kind::Uint32)],
            vec![Field::new("count", Kind::Uint64)],
        )
    }

    #[test]
    fn test_slots_cover_every_entry_after_deletes() {
        let ty = counter();
        let mut store = ObjectStore::new();
        for id in 0..100 {
            store
                .apply(&ty, &ObjectUpdate::full("counter", uint_key(id), vec![Value::Uint64(1)]))
                .unwrap();
        }
        for id in (0..100).step_by(3) {
            store
                .apply(&ty, &ObjectUpdate::delete("counter", uint_key(id)))
                .unwrap();
        }
        store
            .apply(&ty, &ObjectUpdate::delete("counter", uint_key(98)))
            .unwrap();

        let mut seen: Vec<ObjectKey> = (0..store.len())
            .map(|i| store.nth(i).unwrap().key.clone())
            .collect();
        assert!(store.nth(store.len()).is_none());

        let mut expected: Vec<ObjectKey> = store.iter().map(|(_, e)| e.key.clone()).collect();
        let sort_key = ObjectKey::canonical_string;
        seen.sort_by_key(sort_key);
        expected.sort_by_key(sort_key);
        assert_eq!(seen, expected);
        assert_eq!(store.len(), 100 - 34 - 1);
    }

    #[test]
    fn test_equality_ignores_slot_order() {
        let ty = counter();
        let insert = |id| ObjectUpdate::full("counter", uint_key(id), vec![Value::Uint64(7)]);

        let mut forward = ObjectStore::new();
        let mut backward = ObjectStore::new();
        for id in 0..5 {
            forward.apply(&ty, &insert(id)).unwrap();
            backward.apply(&ty, &insert(4 - id)).unwrap();
        }
        assert_ne!(forward.nth(0), backward.nth(0));
        assert_eq!(forward, backward);
    }

    #[test]
    fn test_positional_lookup_stays_cheap_on_large_stores() {
        // One lookup per insert over a large store; a linear walk per
        // lookup makes this quadratic.
        let ty = counter();
        let mut store = ObjectStore::new();
        let mut checksum = 0_u64;
        for id in 0..50_000_u32 {
            store
                .apply(&ty, &ObjectUpdate::full("counter", uint_key(id), vec![Value::Uint64(1)]))
                .unwrap();
            let index = (id as usize * 7919) % store.len();
            if let Some(Value::Uint32(found)) = store.nth(index).map(|e| &e.key.values()[0]) {
                checksum += u64::from(*found);
            }
        }
        assert_eq!(store.len(), 50_000);
        assert!(checksum > 0);
    }
}
