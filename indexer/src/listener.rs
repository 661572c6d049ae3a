//! The consumer side of the change stream.
//!
//! A [`Listener`] receives schemas once, then one `start_block`, the
//! block's updates in application order, and one `commit` per block.
//! Every hook has a no-op default so consumers implement only what they
//! need. Returning an error from any hook stops the current step and the
//! error reaches the caller unchanged.

use crate::types::{ModuleSchema, ObjectUpdate};

/// Error type returned by listener hooks. Any consumer error fits.
pub type ListenerError = Box<dyn std::error::Error + Send + Sync>;

/// A sink for module schemas and object updates.
pub trait Listener {
    /// Called once per module, in module name order, before any block.
    fn initialize_module_schema(
        &mut self,
        _module_name: &str,
        _schema: &ModuleSchema,
    ) -> Result<(), ListenerError> {
        Ok(())
    }

    /// Called before the first update of block `block_number`.
    fn start_block(&mut self, _block_number: u64) -> Result<(), ListenerError> {
        Ok(())
    }

    /// Called once per applied update. The listener owns its copy.
    fn on_object_update(
        &mut self,
        _module_name: &str,
        _update: ObjectUpdate,
    ) -> Result<(), ListenerError> {
        Ok(())
    }

    /// Called after the last update of a block.
    fn commit(&mut self) -> Result<(), ListenerError> {
        Ok(())
    }
}

/// A listener that accepts everything and keeps nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopListener;

impl Listener for NoopListener {}

impl<L: Listener + ?Sized> Listener for &mut L {
    fn initialize_module_schema(
        &mut self,
        module_name: &str,
        schema: &ModuleSchema,
    ) -> Result<(), ListenerError> {
        (**self).initialize_module_schema(module_name, schema)
    }

    fn start_block(&mut self, block_number: u64) -> Result<(), ListenerError> {
        (**self).start_block(block_number)
    }

    fn on_object_update(
        &mut self,
        module_name: &str,
        update: ObjectUpdate,
    ) -> Result<(), ListenerError> {
        (**self).on_object_update(module_name, update)
    }

    fn commit(&mut self) -> Result<(), ListenerError> {
        (**self).commit()
    }
}

impl<L: Listener + ?Sized> Listener for Box<L> {
    fn initialize_module_schema(
        &mut self,
        module_name: &str,
        schema: &ModuleSchema,
    ) -> Result<(), ListenerError> {
        (**self).initialize_module_schema(module_name, schema)
    }

    fn start_block(&mut self, block_number: u64) -> Result<(), ListenerError> {
        (**self).start_block(block_number)
    }

    fn on_object_update(
        &mut self,
        module_name: &str,
        update: ObjectUpdate,
    ) -> Result<(), ListenerError> {
        (**self).on_object_update(module_name, update)
    }

    fn commit(&mut self) -> Result<(), ListenerError> {
        (**self).commit()
    }
}
