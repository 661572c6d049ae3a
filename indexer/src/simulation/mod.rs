//! Deterministic simulation of an app's state changes.
//!
//! The [`Simulator`] plays the role of a chain: it announces module
//! schemas, then produces blocks of random but schema-valid object
//! updates, keeping a canonical model of the resulting state. A consumer
//! plugs in as a [`Listener`](crate::listener::Listener) and can be
//! checked against the canonical model with an [`InvariantChecker`].
//!
//! # Design Principles
//!
//! 1. All randomness is seeded for reproducibility
//! 2. Block `n` of a run with seed `s` draws from `s + n`
//! 3. Every generated update is validated before it is applied
//! 4. Given the same seed and schema, execution is identical
//!
//! # Usage
//!
//! ```ignore
//! use indexer::simulation::{InvariantChecker, MemoryListener, Simulator, SimulatorConfig};
//!
//! let config = SimulatorConfig::new(12345, app_schema).with_max_updates_per_block(50);
//! let mut sim = Simulator::new(config, MemoryListener::new(false))?;
//! sim.initialize()?;
//! sim.run_blocks(100)?;
//!
//! let mut checker = InvariantChecker::new();
//! checker.check_simulator(&sim);
//! assert!(!checker.has_violations());
//! ```

mod error;
mod invariants;
mod memory_listener;
mod simulator;
mod store;

pub use error::SimulationError;
pub use invariants::{InvariantChecker, InvariantViolation};
pub use memory_listener::{ListenerHook, MemoryListener, MemoryListenerError, RecordedUpdate};
pub use simulator::{ModuleState, Simulator, SimulatorConfig, SimulatorState, SimulatorStats};
pub use store::{ApplyOutcome, Entry, ObjectStore};
