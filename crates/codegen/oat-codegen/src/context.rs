//! Generation state threaded through every lowering call

use crate::CodegenError;
use oat_llir::{Builder, FunctionRef, Module, Type, Value};
use rustc_hash::FxHashMap;

/// What a unique name was lowered to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Binding {
    /// Storage: a global or a stack slot
    Slot {
        /// Pointer to the storage
        address: Value,
        /// Type of the stored value
        ty: Type,
    },
    /// A declared or defined function
    Function(FunctionRef),
}

/// Module under construction, its builder, and the code map
#[derive(Debug)]
pub struct GenContext {
    /// Builder owning the module, with the insertion cursor
    pub builder: Builder,
    code_map: FxHashMap<String, Binding>,
}

impl GenContext {
    /// Start generating into an empty module called `module_name`
    #[must_use]
    pub fn new(module_name: &str) -> Self {
        Self {
            builder: Builder::new(Module::new(module_name)),
            code_map: FxHashMap::default(),
        }
    }

    /// Record what `unique_name` was lowered to
    pub fn bind(&mut self, unique_name: impl Into<String>, binding: Binding) {
        self.code_map.insert(unique_name.into(), binding);
    }

    /// Look up a unique name
    ///
    /// # Errors
    ///
    /// Returns [`CodegenError::MissingBinding`] if nothing was emitted for it.
    pub fn lookup(&self, unique_name: &str) -> Result<&Binding, CodegenError> {
        self.code_map
            .get(unique_name)
            .ok_or_else(|| CodegenError::MissingBinding(unique_name.to_owned()))
    }

    /// Whether `unique_name` already names a global or a stack slot
    #[must_use]
    pub fn has_storage(&self, unique_name: &str) -> bool {
        matches!(self.code_map.get(unique_name), Some(Binding::Slot { .. }))
    }

    /// Module built so far
    #[must_use]
    pub fn module(&self) -> &Module {
        self.builder.module()
    }

    /// Finish and hand back the module
    #[must_use]
    pub fn finish(self) -> Module {
        self.builder.finish()
    }
}
