use std::fmt;

use crate::listener::ListenerError;
use crate::types::{SchemaError, UpdateError};

/// Errors surfaced by the simulator.
#[derive(Debug)]
pub enum SimulationError {
    /// A module schema failed validation; the simulator cannot start.
    InvalidSchema { module: String, error: SchemaError },
    /// A drawn update failed validation or could not be applied.
    InvalidUpdate { module: String, error: UpdateError },
    /// A listener hook failed. Displays exactly as the listener's error.
    Listener(ListenerError),
    /// `next_block` was called before `initialize`.
    NotInitialized,
    /// `initialize` was called on a running simulator.
    AlreadyInitialized,
    /// A previous block failed; the simulator must be re-initialized.
    Terminated { block: u64 },
}

impl fmt::Display for SimulationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSchema { module, error } => {
                write!(f, "invalid schema for module {module:?}: {error}")
            }
            Self::InvalidUpdate { module, error } => {
                write!(f, "invalid update in module {module:?}: {error}")
            }
            Self::Listener(error) => write!(f, "{error}"),
            Self::NotInitialized => write!(f, "simulator is not initialized"),
            Self::AlreadyInitialized => write!(f, "simulator is already initialized"),
            Self::Terminated { block } => {
                write!(f, "simulator terminated after block {block} failed")
            }
        }
    }
}

impl std::error::Error for SimulationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidSchema { error, .. } => Some(error),
            Self::InvalidUpdate { error, .. } => Some(error),
            Self::Listener(error) => Some(error.as_ref()),
            _ => None,
        }
    }
}
