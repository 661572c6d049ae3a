//! Block-driven simulator that keeps a canonical model of app state.
//!
//! The simulator owns one [`ObjectStore`] per (module, object type). Each
//! block draws a bounded number of schema-valid updates from a generator
//! seeded with `seed + block_number`, validates them, applies them to the
//! canonical store and forwards them to the listener.

// Simulation code clones schemas and names into per-module state
#![allow(clippy::disallowed_methods)]

use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::error::SimulationError;
use super::store::{ApplyOutcome, ObjectStore};
use crate::constants::DEFAULT_MAX_UPDATES_PER_BLOCK;
use crate::listener::Listener;
use crate::schemagen::ObjectUpdateGenerator;
use crate::types::{AppSchema, ModuleSchema, ObjectType, ValueUpdate};

/// Configuration for the simulator.
#[derive(Debug, Clone)]
pub struct SimulatorConfig {
    /// Schemas of every module, keyed by module name.
    pub app_schema: AppSchema,
    /// Whether consumers should flush per update rather than per block.
    /// Passed through to listeners; the simulator does not act on it.
    pub event_aligned_writes: bool,
    /// Upper bound on updates per block. Zero selects the default of 100.
    pub max_updates_per_block: usize,
    /// Base seed. Block `n` draws from `seed + n`.
    pub seed: u64,
}

impl SimulatorConfig {
    /// Create a config with the given seed and schema.
    #[must_use]
    pub const fn new(seed: u64, app_schema: AppSchema) -> Self {
        Self {
            app_schema,
            event_aligned_writes: false,
            max_updates_per_block: DEFAULT_MAX_UPDATES_PER_BLOCK,
            seed,
        }
    }

    /// Set the upper bound on updates per block.
    #[must_use]
    pub const fn with_max_updates_per_block(mut self, max: usize) -> Self {
        self.max_updates_per_block = max;
        self
    }

    /// Set whether writes are aligned to individual updates.
    #[must_use]
    pub const fn with_event_aligned_writes(mut self, aligned: bool) -> Self {
        self.event_aligned_writes = aligned;
        self
    }

    /// The bound actually used, after applying the default.
    #[must_use]
    pub const fn effective_max_updates_per_block(&self) -> usize {
        if self.max_updates_per_block == 0 {
            DEFAULT_MAX_UPDATES_PER_BLOCK
        } else {
            self.max_updates_per_block
        }
    }
}

/// Lifecycle of a simulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulatorState {
    /// Constructed; schemas not yet announced to the listener.
    Uninitialized,
    /// Ready for the next block.
    Initialized,
    /// Inside `next_block`.
    Running,
    /// A block failed. Only `initialize` is accepted.
    Terminated { block: u64 },
}

/// Counters over all successful and failed blocks since initialization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimulatorStats {
    /// Blocks committed successfully.
    pub blocks: u64,
    /// Updates applied to the canonical state.
    pub updates: u64,
    /// Deletes among `updates`.
    pub deletes: u64,
    /// Full-tuple upserts among `updates`.
    pub full_updates: u64,
    /// Partial upserts among `updates`.
    pub partial_updates: u64,
    /// Partial upserts that named no fields.
    pub empty_partial_updates: u64,
}

/// Canonical state and update generator for one object type.
#[derive(Debug)]
struct ObjectState {
    object_type: ObjectType,
    store: ObjectStore,
    update_gen: ObjectUpdateGenerator,
}

/// Canonical state of one module.
#[derive(Debug)]
pub struct ModuleState {
    schema: ModuleSchema,
    objects: BTreeMap<String, ObjectState>,
}

impl ModuleState {
    fn new(schema: ModuleSchema) -> Self {
        let objects = schema
            .object_types()
            .map(|object_type| {
                (
                    object_type.name.clone(),
                    ObjectState {
                        object_type: object_type.clone(),
                        store: ObjectStore::new(),
                        update_gen: ObjectUpdateGenerator::new(object_type),
                    },
                )
            })
            .collect();
        Self { schema, objects }
    }

    fn reset(&mut self) {
        for object in self.objects.values_mut() {
            object.store = ObjectStore::new();
        }
    }

    /// The module's schema.
    #[must_use]
    pub const fn schema(&self) -> &ModuleSchema {
        &self.schema
    }

    /// The canonical store of the object type called `name`.
    #[must_use]
    pub fn object_store(&self, name: &str) -> Option<&ObjectStore> {
        self.objects.get(name).map(|object| &object.store)
    }

    /// Canonical stores keyed by object type name.
    pub fn object_stores(&self) -> impl Iterator<Item = (&str, &ObjectStore)> {
        self.objects
            .iter()
            .map(|(name, object)| (name.as_str(), &object.store))
    }
}

/// The simulator harness.
///
/// Call [`initialize`](Self::initialize) once, then
/// [`next_block`](Self::next_block) as many times as needed. Any failure
/// stops the block where it happened: updates already applied stay in
/// the canonical state, and the simulator refuses further blocks until it
/// is initialized again.
pub struct Simulator<L> {
    config: SimulatorConfig,
    listener: L,
    modules: BTreeMap<String, ModuleState>,
    block_num: u64,
    state: SimulatorState,
    stats: SimulatorStats,
}

impl<L: Listener> Simulator<L> {
    /// Create a simulator, validating every module schema.
    pub fn new(config: SimulatorConfig, listener: L) -> Result<Self, SimulationError> {
        let mut modules = BTreeMap::new();
        for (name, schema) in &config.app_schema {
            schema
                .validate()
                .map_err(|error| SimulationError::InvalidSchema {
                    module: name.clone(),
                    error,
                })?;
            modules.insert(name.clone(), ModuleState::new(schema.clone()));
        }

        Ok(Self {
            config,
            listener,
            modules,
            block_num: 0,
            state: SimulatorState::Uninitialized,
            stats: SimulatorStats::default(),
        })
    }

    /// Announce every module schema to the listener, in module name order.
    ///
    /// Stops at the first listener error. After a failed block this resets
    /// the canonical state, the statistics and the block counter.
    pub fn initialize(&mut self) -> Result<(), SimulationError> {
        match self.state {
            SimulatorState::Initialized | SimulatorState::Running => {
                return Err(SimulationError::AlreadyInitialized);
            }
            SimulatorState::Terminated { block } => {
                tracing::info!("re-initializing simulator after failed block {block}");
                for module in self.modules.values_mut() {
                    module.reset();
                }
                self.block_num = 0;
                self.stats = SimulatorStats::default();
                self.state = SimulatorState::Uninitialized;
            }
            SimulatorState::Uninitialized => {}
        }

        for (name, module) in &self.modules {
            self.listener
                .initialize_module_schema(name, &module.schema)
                .map_err(SimulationError::Listener)?;
        }

        tracing::info!(
            "initialized simulator: modules={}, seed={}",
            self.modules.len(),
            self.config.seed
        );
        self.state = SimulatorState::Initialized;
        Ok(())
    }

    /// Simulate one block.
    pub fn next_block(&mut self) -> Result<(), SimulationError> {
        match self.state {
            SimulatorState::Uninitialized => return Err(SimulationError::NotInitialized),
            SimulatorState::Terminated { block } => {
                return Err(SimulationError::Terminated { block });
            }
            SimulatorState::Initialized | SimulatorState::Running => {}
        }

        self.block_num += 1;
        self.state = SimulatorState::Running;

        match self.run_block() {
            Ok(()) => {
                self.stats.blocks += 1;
                self.state = SimulatorState::Initialized;
                Ok(())
            }
            Err(e) => {
                tracing::warn!("block {} failed: {e}", self.block_num);
                self.state = SimulatorState::Terminated {
                    block: self.block_num,
                };
                Err(e)
            }
        }
    }

    /// Simulate `count` consecutive blocks, stopping at the first failure.
    pub fn run_blocks(&mut self, count: u64) -> Result<(), SimulationError> {
        for _ in 0..count {
            self.next_block()?;
        }
        Ok(())
    }

    fn run_block(&mut self) -> Result<(), SimulationError> {
        self.listener
            .start_block(self.block_num)
            .map_err(SimulationError::Listener)?;

        let seed = self.config.seed.wrapping_add(self.block_num);
        let mut rng = StdRng::seed_from_u64(seed);
        let num_updates = rng.random_range(1..=self.config.effective_max_updates_per_block());

        tracing::debug!(
            "block {}: seed={seed}, drawing {num_updates} updates",
            self.block_num
        );

        for _ in 0..num_updates {
            self.apply_random_update(&mut rng)?;
        }

        self.listener.commit().map_err(SimulationError::Listener)
    }

    /// Draw, validate, apply and forward one update.
    ///
    /// A module is chosen uniformly among modules with at least one object
    /// type, then an object type uniformly within it.
    fn apply_random_update(&mut self, rng: &mut StdRng) -> Result<(), SimulationError> {
        let eligible = self
            .modules
            .values()
            .filter(|module| !module.objects.is_empty())
            .count();
        if eligible == 0 {
            return Ok(());
        }

        let module_idx = rng.random_range(0..eligible);
        let Some((module_name, module)) = self
            .modules
            .iter_mut()
            .filter(|(_, module)| !module.objects.is_empty())
            .nth(module_idx)
        else {
            return Ok(());
        };

        let object_idx = rng.random_range(0..module.objects.len());
        let Some(object) = module.objects.values_mut().nth(object_idx) else {
            return Ok(());
        };

        let update = object.update_gen.generate_with_state(rng, &object.store);

        module
            .schema
            .validate_object_update(&update)
            .map_err(|error| SimulationError::InvalidUpdate {
                module: module_name.clone(),
                error,
            })?;

        let outcome = object
            .store
            .apply(&object.object_type, &update)
            .map_err(|error| SimulationError::InvalidUpdate {
                module: module_name.clone(),
                error,
            })?;

        self.stats.updates += 1;
        match (&update.value, outcome) {
            (_, ApplyOutcome::Deleted | ApplyOutcome::DeleteMissing) => self.stats.deletes += 1,
            (ValueUpdate::Partial(changes), _) => {
                self.stats.partial_updates += 1;
                if changes.is_empty() {
                    self.stats.empty_partial_updates += 1;
                }
            }
            _ => self.stats.full_updates += 1,
        }

        tracing::trace!(
            "block {}: {module_name}/{} {outcome:?} key={}",
            self.block_num,
            update.type_name,
            update.key.canonical_string()
        );

        self.listener
            .on_object_update(module_name, update)
            .map_err(SimulationError::Listener)
    }

    /// The most recently started block number.
    #[must_use]
    pub const fn block_num(&self) -> u64 {
        self.block_num
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> SimulatorState {
        self.state
    }

    /// Counters since the last initialization.
    #[must_use]
    pub const fn stats(&self) -> SimulatorStats {
        self.stats
    }

    /// The configuration the simulator was built with.
    #[must_use]
    pub const fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    /// Whether consumers were asked to write per update.
    #[must_use]
    pub const fn event_aligned_writes(&self) -> bool {
        self.config.event_aligned_writes
    }

    /// Canonical state of the module called `name`.
    #[must_use]
    pub fn module_state(&self, name: &str) -> Option<&ModuleState> {
        self.modules.get(name)
    }

    /// Canonical state of every module, in name order.
    pub fn module_states(&self) -> impl Iterator<Item = (&str, &ModuleState)> {
        self.modules.iter().map(|(name, module)| (name.as_str(), module))
    }

    /// Canonical store of one object type.
    #[must_use]
    pub fn object_store(&self, module: &str, object_type: &str) -> Option<&ObjectStore> {
        self.modules
            .get(module)
            .and_then(|module| module.object_store(object_type))
    }

    #[must_use]
    pub const fn listener(&self) -> &L {
        &self.listener
    }

    pub const fn listener_mut(&mut self) -> &mut L {
        &mut self.listener
    }

    /// Consume the simulator, returning its listener.
    #[must_use]
    pub fn into_listener(self) -> L {
        self.listener
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use crate::listener::NoopListener;
    use crate::types::{Field, Kind};

    #[test]
    fn test_simulator_basic() {
        let config = SimulatorConfig::new(12345, fixtures::example_app_schema());
        let mut simulator = Simulator::new(config, NoopListener).unwrap();

        simulator.initialize().unwrap();
        simulator.run_blocks(10).unwrap();

        assert_eq!(simulator.block_num(), 10);
        assert_eq!(simulator.stats().blocks, 10);
        assert!(simulator.stats().updates >= 10);
        assert_eq!(simulator.state(), SimulatorState::Initialized);
    }

    #[test]
    fn test_next_block_requires_initialize() {
        let config = SimulatorConfig::new(1, fixtures::example_app_schema());
        let mut simulator = Simulator::new(config, NoopListener).unwrap();
        assert!(matches!(
            simulator.next_block(),
            Err(SimulationError::NotInitialized)
        ));
        assert_eq!(simulator.block_num(), 0);
    }

    #[test]
    fn test_initialize_twice_fails() {
        let config = SimulatorConfig::new(1, fixtures::example_app_schema());
        let mut simulator = Simulator::new(config, NoopListener).unwrap();
        simulator.initialize().unwrap();
        assert!(matches!(
            simulator.initialize(),
            Err(SimulationError::AlreadyInitialized)
        ));
    }

    #[test]
    fn test_updates_per_block_respect_bound() {
        let config = SimulatorConfig::new(7, fixtures::example_app_schema())
            .with_max_updates_per_block(1);
        let mut simulator = Simulator::new(config, NoopListener).unwrap();
        simulator.initialize().unwrap();
        simulator.run_blocks(25).unwrap();
        assert_eq!(simulator.stats().updates, 25);
    }

    #[test]
    fn test_zero_max_updates_uses_default() {
        let config =
            SimulatorConfig::new(7, AppSchema::new()).with_max_updates_per_block(0);
        assert_eq!(
            config.effective_max_updates_per_block(),
            DEFAULT_MAX_UPDATES_PER_BLOCK
        );
    }

    #[test]
    fn test_invalid_schema_blocks_construction() {
        let mut schema = fixtures::example_app_schema();
        let bad = ObjectType::new(
            "broken",
            vec![Field::new("id", Kind::Uint64).nullable()],
            vec![],
        );
        schema.insert("broken".into(), ModuleSchema::from_object_types([bad]));

        let result = Simulator::new(SimulatorConfig::new(1, schema), NoopListener);
        assert!(matches!(
            result,
            Err(SimulationError::InvalidSchema { ref module, .. }) if module == "broken"
        ));
    }

    #[test]
    fn test_schema_without_object_types_commits_empty_blocks() {
        let mut schema = AppSchema::new();
        schema.insert("empty".into(), ModuleSchema::default());
        let mut simulator =
            Simulator::new(SimulatorConfig::new(1, schema), NoopListener).unwrap();
        simulator.initialize().unwrap();
        simulator.run_blocks(3).unwrap();
        assert_eq!(simulator.stats().blocks, 3);
        assert_eq!(simulator.stats().updates, 0);
    }

    #[test]
    fn test_all_update_shapes_are_exercised() {
        let config = SimulatorConfig::new(2024, fixtures::example_app_schema());
        let mut simulator = Simulator::new(config, NoopListener).unwrap();
        simulator.initialize().unwrap();
        simulator.run_blocks(20).unwrap();

        let stats = simulator.stats();
        assert!(stats.deletes > 0, "{stats:?}");
        assert!(stats.full_updates > 0, "{stats:?}");
        assert!(stats.partial_updates > 0, "{stats:?}");
        assert!(stats.empty_partial_updates > 0, "{stats:?}");
        assert_eq!(
            stats.updates,
            stats.deletes + stats.full_updates + stats.partial_updates
        );
    }
}
