//! Invariant checking for deterministic simulation testing.
//!
//! After a run, every object the simulator holds must be present with the
//! same field values in the consumer's state, and the consumer must hold
//! nothing else. Any difference is reported as a violation rather than a
//! panic so a run can list all divergences at once.

use super::memory_listener::MemoryListener;
use super::simulator::Simulator;
use super::store::ObjectStore;
use crate::listener::Listener;

/// An invariant violation detected during simulation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantViolation {
    /// Description of the violation.
    pub description: String,
    pub module: String,
    /// Empty when the violation concerns a whole module.
    pub object_type: String,
    /// Additional context.
    pub context: String,
}

impl std::fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}: {}", self.module, self.object_type, self.description)?;
        if !self.context.is_empty() {
            write!(f, " ({})", self.context)?;
        }
        Ok(())
    }
}

/// Checker for consumer state invariants.
#[derive(Debug, Default)]
pub struct InvariantChecker {
    /// Detected violations.
    violations: Vec<InvariantViolation>,
}

impl InvariantChecker {
    /// Create a new invariant checker.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            violations: Vec::new(),
        }
    }

    /// Get all violations.
    #[must_use]
    pub fn violations(&self) -> &[InvariantViolation] {
        &self.violations
    }

    /// Check if any violations were detected.
    #[must_use]
    pub const fn has_violations(&self) -> bool {
        !self.violations.is_empty()
    }

    /// Clear all recorded violations.
    pub fn clear(&mut self) {
        self.violations.clear();
    }

    /// Compare a simulator's canonical state with its own listener's state.
    pub fn check_simulator(&mut self, simulator: &Simulator<MemoryListener>) {
        self.check_listener(simulator, simulator.listener());
    }

    /// Compare a simulator's canonical state with `listener`'s state.
    pub fn check_listener<L: Listener>(&mut self, simulator: &Simulator<L>, listener: &MemoryListener) {
        for (module_name, module) in simulator.module_states() {
            if !listener.schemas().contains_key(module_name) {
                self.add(module_name, "", "Module schema never announced", String::new());
                continue;
            }
            for (type_name, expected) in module.object_stores() {
                match listener.object_store(module_name, type_name) {
                    Some(actual) => self.check_store(module_name, type_name, expected, actual),
                    None => self.add(
                        module_name,
                        type_name,
                        "Object type missing from listener",
                        String::new(),
                    ),
                }
            }
        }
    }

    /// Compare one canonical store against a consumer's copy.
    pub fn check_store(
        &mut self,
        module: &str,
        object_type: &str,
        expected: &ObjectStore,
        actual: &ObjectStore,
    ) {
        for (key, entry) in expected.iter() {
            match actual.get(&entry.key) {
                None => self.add(module, object_type, "Object missing", format!("key {key}")),
                Some(found) if found != entry => self.add(
                    module,
                    object_type,
                    "Object value mismatch",
                    format!(
                        "key {key}: expected {:?}, found {:?}",
                        entry.fields, found.fields
                    ),
                ),
                Some(_) => {}
            }
        }

        for (key, entry) in actual.iter() {
            if expected.get(&entry.key).is_none() {
                self.add(module, object_type, "Unexpected object", format!("key {key}"));
            }
        }
    }

    fn add(&mut self, module: &str, object_type: &str, description: &str, context: String) {
        self.violations.push(InvariantViolation {
            description: description.to_owned(),
            module: module.to_owned(),
            object_type: object_type.to_owned(),
            context,
        });
    }
}
