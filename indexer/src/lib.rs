#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]
// Change data capture for schema-typed application state:
//
// 1. A module declares its object types (key fields + value fields)
// 2. The simulator produces blocks of typed object updates
// 3. Every update is validated against the schema before it leaves
// 4. A listener consumes schemas, block boundaries and updates in order
//
// System components:
//  - Schema and value model (types)
//  - Schema-driven random generators (schemagen)
//  - Block simulator with canonical state (simulation)

pub mod config;
pub mod constants;
pub mod fixtures;
pub mod listener;
pub mod schemagen;
pub mod simulation;
pub mod types;

pub use listener::{Listener, ListenerError, NoopListener};
pub use simulation::{Simulator, SimulatorConfig};
pub use types::{AppSchema, Field, Kind, ModuleSchema, ObjectType, ObjectUpdate};
