//! The per-architecture memory management registry.

use crate::error::{MemError, MemResult};
use crate::model::MemoryModel;
use indexmap::IndexMap;
use metior_arch::Architecture;
use metior_common::DataUnit;

/// Owns one [`MemoryModel`] per physical storage component.
///
/// The compiler builds one manager per architecture and addresses the
/// models by storage component name while emitting instruction encodings.
#[derive(Debug, Default)]
pub struct MemoryManager {
    name: String,
    models: IndexMap<String, MemoryModel>,
}

impl MemoryManager {
    /// Creates an empty manager.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            models: IndexMap::new(),
        }
    }

    /// The manager name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Builds models for every primitive component of `storage_class`
    /// found in the architecture, recursively.
    ///
    /// Each storage component must carry numeric `size` (bytes) and
    /// `width` (bits) arguments; models are keyed by the component's
    /// qualified name.
    ///
    /// # Errors
    ///
    /// Returns [`MemError::MissingArgument`] when a matching component
    /// lacks either argument.
    pub fn from_architecture(
        architecture: &Architecture,
        storage_class: &str,
    ) -> MemResult<Self> {
        let mut manager = Self::new(architecture.name());
        for (qualified_name, component) in architecture.find_class(storage_class) {
            let size_bytes = numeric_arg(component.args(), "size").ok_or_else(|| {
                MemError::MissingArgument {
                    component: qualified_name.clone(),
                    argument: "size".to_string(),
                }
            })?;
            let width_bits = numeric_arg(component.args(), "width").ok_or_else(|| {
                MemError::MissingArgument {
                    component: qualified_name.clone(),
                    argument: "width".to_string(),
                }
            })?;
            let model = MemoryModel::new(
                qualified_name.clone(),
                DataUnit::Byte.to_bits(size_bytes),
                width_bits,
            );
            manager.models.insert(qualified_name, model);
        }
        Ok(manager)
    }

    /// Adds (or replaces) a model under its own name.
    pub fn insert(&mut self, model: MemoryModel) {
        self.models.insert(model.name().to_string(), model);
    }

    /// The managed models, in insertion order.
    pub fn models(&self) -> &IndexMap<String, MemoryModel> {
        &self.models
    }

    /// Looks up a model by storage name.
    pub fn get(&self, memory_name: &str) -> Option<&MemoryModel> {
        self.models.get(memory_name)
    }

    /// Looks up a model mutably by storage name.
    pub fn get_mut(&mut self, memory_name: &str) -> Option<&mut MemoryModel> {
        self.models.get_mut(memory_name)
    }
}

fn numeric_arg(args: &metior_common::ArgBindings, name: &str) -> Option<u64> {
    args.get(name).and_then(|v| v.as_number()).map(|n| n as u64)
}
