//! Simulation run configuration module.
//!
//! This module provides configuration loading for the `indexer-sim` binary
//! from environment variables, and JSON loading of app schemas.
//!
//! # Environment Variables
//!
//! - `INDEXER_SIM_SEED`: Base seed for the run (default: `0`)
//! - `INDEXER_SIM_BLOCKS`: Number of blocks to simulate (default: `10`)
//! - `INDEXER_SIM_MAX_UPDATES_PER_BLOCK`: Upper bound on updates per block (default: `100`)
//! - `INDEXER_SIM_EVENT_ALIGNED_WRITES`: Apply updates on arrival rather than on commit (default: `false`)
//! - `INDEXER_SIM_SCHEMA_PATH`: JSON app schema to simulate (default: the built-in example schema)
//!
//! # Invariants
//!
//! - `max_updates_per_block` is always at least 1
//! - a schema returned by `load_app_schema` has passed validation

use std::path::{Path, PathBuf};

use crate::constants::DEFAULT_MAX_UPDATES_PER_BLOCK;
use crate::simulation::SimulatorConfig;
use crate::types::AppSchema;

const SEED_VAR: &str = "INDEXER_SIM_SEED";
const BLOCKS_VAR: &str = "INDEXER_SIM_BLOCKS";
const MAX_UPDATES_VAR: &str = "INDEXER_SIM_MAX_UPDATES_PER_BLOCK";
const EVENT_ALIGNED_VAR: &str = "INDEXER_SIM_EVENT_ALIGNED_WRITES";
const SCHEMA_PATH_VAR: &str = "INDEXER_SIM_SCHEMA_PATH";

/// Run configuration.
///
/// Contains all parameters needed for one simulation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    /// Base seed. Block `n` draws from `seed + n`.
    pub seed: u64,
    /// Number of blocks to simulate.
    pub blocks: u64,
    /// Upper bound on updates per block.
    pub max_updates_per_block: usize,
    /// Whether the consumer applies each update on arrival.
    pub event_aligned_writes: bool,
    /// JSON app schema to load instead of the built-in example.
    pub schema_path: Option<PathBuf>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            blocks: Self::DEFAULT_BLOCKS,
            max_updates_per_block: DEFAULT_MAX_UPDATES_PER_BLOCK,
            event_aligned_writes: false,
            schema_path: None,
        }
    }
}

/// Error returned when loading configuration fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// An environment variable has an invalid value.
    InvalidValue { name: String, message: String },
    /// A schema file could not be read or parsed.
    SchemaFile { path: PathBuf, message: String },
    /// A loaded schema failed validation.
    InvalidSchema { module: String, message: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue { name, message } => {
                write!(f, "invalid value for {name}: {message}")
            }
            Self::SchemaFile { path, message } => {
                write!(f, "cannot load schema from {}: {message}", path.display())
            }
            Self::InvalidSchema { module, message } => {
                write!(f, "invalid schema for module {module}: {message}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl RunConfig {
    /// Default number of blocks per run.
    pub const DEFAULT_BLOCKS: u64 = 10;

    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if any variable is set to a value that does not
    /// parse, or if `INDEXER_SIM_MAX_UPDATES_PER_BLOCK` is zero.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through `lookup`, which maps a variable name to
    /// its value if set.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let seed = parse_or(&lookup, SEED_VAR, defaults.seed)?;
        let blocks = parse_or(&lookup, BLOCKS_VAR, defaults.blocks)?;
        let max_updates_per_block =
            parse_or(&lookup, MAX_UPDATES_VAR, defaults.max_updates_per_block)?;
        if max_updates_per_block == 0 {
            return Err(ConfigError::InvalidValue {
                name: MAX_UPDATES_VAR.to_owned(),
                message: "must be at least 1".to_owned(),
            });
        }
        let event_aligned_writes = match lookup(EVENT_ALIGNED_VAR) {
            Some(value) => parse_bool(EVENT_ALIGNED_VAR, &value)?,
            None => defaults.event_aligned_writes,
        };
        let schema_path = lookup(SCHEMA_PATH_VAR)
            .filter(|path| !path.is_empty())
            .map(PathBuf::from);

        Ok(Self {
            seed,
            blocks,
            max_updates_per_block,
            event_aligned_writes,
            schema_path,
        })
    }

    /// Engine configuration for `app_schema` using this run's settings.
    #[must_use]
    pub fn simulator_config(&self, app_schema: AppSchema) -> SimulatorConfig {
        SimulatorConfig::new(self.seed, app_schema)
            .with_max_updates_per_block(self.max_updates_per_block)
            .with_event_aligned_writes(self.event_aligned_writes)
    }
}

fn parse_or<T: std::str::FromStr>(
    lookup: impl Fn(&str) -> Option<String>,
    name: &str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(name) {
        Some(value) => value.trim().parse::<T>().map_err(|_| ConfigError::InvalidValue {
            name: name.to_owned(),
            message: format!("'{value}' is not a valid non-negative integer"),
        }),
        None => Ok(default),
    }
}

fn parse_bool(name: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            name: name.to_owned(),
            message: format!("'{value}' is not one of true, false, 1, 0"),
        }),
    }
}

/// Load and validate a JSON app schema: an object mapping module names to
/// module schemas.
///
/// # Errors
///
/// Returns an error if the file cannot be read, is not a valid schema
/// document, or any module schema fails validation.
pub fn load_app_schema(path: &Path) -> Result<AppSchema, ConfigError> {
    let file_error = |message: String| ConfigError::SchemaFile {
        path: path.to_path_buf(),
        message,
    };

    let contents = std::fs::read_to_string(path).map_err(|e| file_error(e.to_string()))?;
    let schema: AppSchema =
        serde_json::from_str(&contents).map_err(|e| file_error(e.to_string()))?;

    for (module, module_schema) in &schema {
        module_schema
            .validate()
            .map_err(|e| ConfigError::InvalidSchema {
                module: module.as_str().to_owned(),
                message: e.to_string(),
            })?;
    }

    tracing::info!(
        "Loaded app schema from {}: modules={}",
        path.display(),
        schema.len()
    );
    Ok(schema)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::Write;

    use super::*;
    use crate::fixtures;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_default_values() {
        let config = RunConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, RunConfig::default());
        assert_eq!(config.blocks, 10);
        assert_eq!(config.max_updates_per_block, 100);
        assert!(!config.event_aligned_writes);
        assert!(config.schema_path.is_none());
    }

    #[test]
    fn test_values_from_lookup() {
        let config = RunConfig::from_lookup(lookup(&[
            (SEED_VAR, "42"),
            (BLOCKS_VAR, "7"),
            (MAX_UPDATES_VAR, "5"),
            (EVENT_ALIGNED_VAR, "TRUE"),
            (SCHEMA_PATH_VAR, "/tmp/schema.json"),
        ]))
        .unwrap();

        assert_eq!(config.seed, 42);
        assert_eq!(config.blocks, 7);
        assert_eq!(config.max_updates_per_block, 5);
        assert!(config.event_aligned_writes);
        assert_eq!(config.schema_path, Some(PathBuf::from("/tmp/schema.json")));

        let sim = config.simulator_config(AppSchema::new());
        assert_eq!(sim.seed, 42);
        assert_eq!(sim.max_updates_per_block, 5);
        assert!(sim.event_aligned_writes);
    }

    #[test]
    fn test_invalid_values() {
        let err = RunConfig::from_lookup(lookup(&[(SEED_VAR, "-1")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref name, .. } if name == SEED_VAR));

        let err = RunConfig::from_lookup(lookup(&[(MAX_UPDATES_VAR, "0")])).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid value for INDEXER_SIM_MAX_UPDATES_PER_BLOCK: must be at least 1"
        );

        let err = RunConfig::from_lookup(lookup(&[(EVENT_ALIGNED_VAR, "yes")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_config_error_display() {
        let error = ConfigError::SchemaFile {
            path: PathBuf::from("/tmp/app.json"),
            message: "not found".to_owned(),
        };
        assert_eq!(
            error.to_string(),
            "cannot load schema from /tmp/app.json: not found"
        );
    }

    #[test]
    fn test_load_app_schema_roundtrip() {
        let schema = fixtures::example_app_schema();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(serde_json::to_string_pretty(&schema).unwrap().as_bytes())
            .unwrap();

        let loaded = load_app_schema(file.path()).unwrap();
        assert_eq!(loaded, schema);
    }

    #[test]
    fn test_load_app_schema_rejects_invalid_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"{ not json").unwrap();

        let err = load_app_schema(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::SchemaFile { .. }));
    }

    #[test]
    fn test_load_app_schema_rejects_invalid_schema() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("schema.json");
        std::fs::write(
            &path,
            r#"{"bank": {"types": {"balance": {"object": {
                "name": "balance",
                "key_fields": [{"name": "addr", "kind": "string", "nullable": true}]
            }}}}}"#,
        )
        .unwrap();

        let err = load_app_schema(&path).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidSchema { ref module, .. } if module == "bank"));
    }

    #[test]
    fn test_load_app_schema_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_app_schema(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, ConfigError::SchemaFile { .. }));
    }
}
