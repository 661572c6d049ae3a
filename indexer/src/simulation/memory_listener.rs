//! In-memory reference consumer.
//!
//! [`MemoryListener`] rebuilds the app state from the update stream alone,
//! so its stores can be compared against the simulator's canonical state.
//! It supports the two write disciplines a real indexer chooses between:
//! applying each update as it arrives, or buffering a block and applying it
//! on commit. Faults can be injected at any hook for a given block.

// Simulation code clones schemas and updates into its own state
#![allow(clippy::disallowed_methods)]

use std::collections::BTreeMap;
use std::fmt;

use super::store::ObjectStore;
use crate::listener::{Listener, ListenerError};
use crate::types::{ModuleSchema, ObjectUpdate, UpdateError};

/// A listener hook, used to target fault injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerHook {
    InitializeModuleSchema,
    StartBlock,
    OnObjectUpdate,
    Commit,
}

impl fmt::Display for ListenerHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::InitializeModuleSchema => "initialize_module_schema",
            Self::StartBlock => "start_block",
            Self::OnObjectUpdate => "on_object_update",
            Self::Commit => "commit",
        };
        f.write_str(name)
    }
}

/// Errors raised by [`MemoryListener`].
#[derive(Debug)]
pub enum MemoryListenerError {
    /// A fault configured with [`MemoryListener::fail_at`] fired.
    InjectedFault { hook: ListenerHook, block: u64 },
    /// An update arrived for a module whose schema was never announced.
    UnknownModule(String),
    /// An update could not be applied to the listener's store.
    InvalidUpdate { module: String, error: UpdateError },
}

impl fmt::Display for MemoryListenerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InjectedFault { hook, block } => {
                write!(f, "injected {hook} failure at block {block}")
            }
            Self::UnknownModule(module) => write!(f, "unknown module: {module}"),
            Self::InvalidUpdate { module, error } => {
                write!(f, "cannot apply update in module {module:?}: {error}")
            }
        }
    }
}

impl std::error::Error for MemoryListenerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidUpdate { error, .. } => Some(error),
            _ => None,
        }
    }
}

/// An update as received by the listener.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedUpdate {
    pub block: u64,
    pub module: String,
    pub update: ObjectUpdate,
}

/// A listener that mirrors app state in memory.
#[derive(Debug, Default)]
pub struct MemoryListener {
    event_aligned: bool,
    schemas: BTreeMap<String, ModuleSchema>,
    /// module -> object type -> store
    stores: BTreeMap<String, BTreeMap<String, ObjectStore>>,
    /// Updates received in the current block but not yet applied.
    pending: Vec<(String, ObjectUpdate)>,
    recorded: Vec<RecordedUpdate>,
    committed_blocks: Vec<u64>,
    current_block: u64,
    /// Set between the first schema announcement of a run and its first block.
    announcing: bool,
    fault: Option<(ListenerHook, u64)>,
}

impl MemoryListener {
    /// Create a listener. With `event_aligned` set each update is applied
    /// on arrival, otherwise a block's updates are applied on commit.
    #[must_use]
    pub fn new(event_aligned: bool) -> Self {
        Self {
            event_aligned,
            ..Self::default()
        }
    }

    /// Fail the next call to `hook` while at `block`. Schema announcement
    /// happens at block 0. The fault fires once.
    #[must_use]
    pub const fn fail_at(mut self, hook: ListenerHook, block: u64) -> Self {
        self.fault = Some((hook, block));
        self
    }

    /// Replace the configured fault.
    pub const fn set_fault(&mut self, fault: Option<(ListenerHook, u64)>) {
        self.fault = fault;
    }

    #[must_use]
    pub const fn event_aligned(&self) -> bool {
        self.event_aligned
    }

    /// Schemas announced so far, by module.
    #[must_use]
    pub const fn schemas(&self) -> &BTreeMap<String, ModuleSchema> {
        &self.schemas
    }

    /// The listener's store for one object type.
    #[must_use]
    pub fn object_store(&self, module: &str, object_type: &str) -> Option<&ObjectStore> {
        self.stores
            .get(module)
            .and_then(|stores| stores.get(object_type))
    }

    /// Every update received since the last initialization, in arrival order.
    #[must_use]
    pub fn recorded_updates(&self) -> &[RecordedUpdate] {
        &self.recorded
    }

    /// Blocks whose commit succeeded since the last initialization, in order.
    #[must_use]
    pub fn committed_blocks(&self) -> &[u64] {
        &self.committed_blocks
    }

    /// Number of updates received but not yet applied.
    #[must_use]
    pub const fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Forget everything from the previous run. The configured fault is kept.
    fn reset_run(&mut self) {
        self.schemas.clear();
        self.stores.clear();
        self.pending.clear();
        self.recorded.clear();
        self.committed_blocks.clear();
        self.current_block = 0;
    }

    fn check_fault(&mut self, hook: ListenerHook) -> Result<(), MemoryListenerError> {
        if self.fault == Some((hook, self.current_block)) {
            self.fault = None;
            tracing::debug!("injecting {hook} failure at block {}", self.current_block);
            return Err(MemoryListenerError::InjectedFault {
                hook,
                block: self.current_block,
            });
        }
        Ok(())
    }

    fn apply(&mut self, module: &str, update: &ObjectUpdate) -> Result<(), MemoryListenerError> {
        let schema = self
            .schemas
            .get(module)
            .ok_or_else(|| MemoryListenerError::UnknownModule(module.to_owned()))?;
        let invalid = |error| MemoryListenerError::InvalidUpdate {
            module: module.to_owned(),
            error,
        };
        let object_type = schema
            .object_type(&update.type_name)
            .ok_or_else(|| invalid(UpdateError::TypeNotFound(update.type_name.clone())))?;

        let store = self
            .stores
            .entry(module.to_owned())
            .or_default()
            .entry(update.type_name.clone())
            .or_default();
        store.apply(object_type, update).map_err(invalid)?;
        Ok(())
    }
}

impl Listener for MemoryListener {
    fn initialize_module_schema(
        &mut self,
        module_name: &str,
        schema: &ModuleSchema,
    ) -> Result<(), ListenerError> {
        if !self.announcing {
            self.reset_run();
            self.announcing = true;
        }
        self.check_fault(ListenerHook::InitializeModuleSchema)?;

        let stores = schema
            .object_types()
            .map(|object_type| (object_type.name.clone(), ObjectStore::new()))
            .collect();
        self.stores.insert(module_name.to_owned(), stores);
        self.schemas.insert(module_name.to_owned(), schema.clone());
        Ok(())
    }

    fn start_block(&mut self, block_number: u64) -> Result<(), ListenerError> {
        self.announcing = false;
        self.current_block = block_number;
        self.pending.clear();
        self.check_fault(ListenerHook::StartBlock)?;
        Ok(())
    }

    fn on_object_update(
        &mut self,
        module_name: &str,
        update: ObjectUpdate,
    ) -> Result<(), ListenerError> {
        self.check_fault(ListenerHook::OnObjectUpdate)?;

        if self.event_aligned {
            self.apply(module_name, &update)?;
        } else {
            self.pending.push((module_name.to_owned(), update.clone()));
        }
        self.recorded.push(RecordedUpdate {
            block: self.current_block,
            module: module_name.to_owned(),
            update,
        });
        Ok(())
    }

    fn commit(&mut self) -> Result<(), ListenerError> {
        self.check_fault(ListenerHook::Commit)?;

        for (module, update) in std::mem::take(&mut self.pending) {
            self.apply(&module, &update)?;
        }
        self.committed_blocks.push(self.current_block);
        Ok(())
    }
}
