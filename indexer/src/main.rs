#![cfg_attr(test, allow(clippy::disallowed_methods))]
// Forbid unwrap() in production code to prevent panics from corrupt data.
// Test code is allowed to use unwrap() for convenience.
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
use indexer::config::{RunConfig, load_app_schema};
use indexer::fixtures;
use indexer::simulation::{InvariantChecker, MemoryListener, Simulator};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "indexer=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration from environment variables
    let config = match RunConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    tracing::info!(
        "Loaded configuration: seed={}, blocks={}, max_updates_per_block={}, event_aligned_writes={}",
        config.seed,
        config.blocks,
        config.max_updates_per_block,
        config.event_aligned_writes
    );

    let app_schema = match &config.schema_path {
        Some(path) => match load_app_schema(path) {
            Ok(schema) => schema,
            Err(e) => {
                tracing::error!("Failed to load schema: {e}");
                std::process::exit(1);
            }
        },
        None => fixtures::example_app_schema(),
    };

    let listener = MemoryListener::new(config.event_aligned_writes);
    let mut simulator = match Simulator::new(config.simulator_config(app_schema), listener) {
        Ok(simulator) => simulator,
        Err(e) => {
            tracing::error!("Failed to create simulator: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = simulator.initialize() {
        tracing::error!("Failed to initialize simulator: {e}");
        std::process::exit(1);
    }

    let run_result = simulator.run_blocks(config.blocks);

    let mut checker = InvariantChecker::new();
    checker.check_simulator(&simulator);

    let stats = simulator.stats();
    tracing::info!(
        "Simulation finished: blocks={}, updates={}, deletes={}, full_updates={}, partial_updates={}, violations={}",
        stats.blocks,
        stats.updates,
        stats.deletes,
        stats.full_updates,
        stats.partial_updates,
        checker.violations().len()
    );

    for violation in checker.violations() {
        tracing::error!("Invariant violation: {violation}");
    }

    if let Err(e) = run_result {
        tracing::error!("Simulation failed at block {}: {e}", simulator.block_num());
        std::process::exit(1);
    }
    if checker.has_violations() {
        std::process::exit(1);
    }
}
