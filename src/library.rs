//! Registry of playable content modules.
//!
//! Modules are opaque to the control plane: the server only knows a module's name,
//! where the client loads its code from, and an arbitrary JSON configuration that is
//! forwarded untouched to the display.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

/// Server-side description of a content module.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ModuleDef {
    /// Unique identifier used by schedulers and operators.
    pub name: String,
    /// Client-side location of the module implementation.
    pub path: String,
    /// Module-specific configuration (e.g. a slideshow search query).
    #[serde(default)]
    pub config: Value,
}

/// Module description in the shape display clients expect inside `loadModule`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ClientModuleConfig {
    pub name: String,
    pub path: String,
    #[schema(value_type = Object)]
    pub config: Value,
}

impl ModuleDef {
    /// Build a module definition.
    pub fn new(name: impl Into<String>, path: impl Into<String>, config: Value) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            config,
        }
    }

    /// Produce the configuration sent to a display client.
    pub fn serialize_for_client(&self) -> ClientModuleConfig {
        ClientModuleConfig {
            name: self.name.clone(),
            path: self.path.clone(),
            config: self.config.clone(),
        }
    }
}

/// Lookup of module definitions by identifier.
pub trait ModuleRegistry: Send + Sync {
    /// Resolve a module identifier, returning `None` when it is not registered.
    fn resolve(&self, module_id: &str) -> Option<ModuleDef>;

    /// Names of every registered module, in registration order.
    fn names(&self) -> Vec<String>;
}

/// In-memory [`ModuleRegistry`] preserving registration order.
#[derive(Debug, Clone, Default)]
pub struct ModuleLibrary {
    modules: IndexMap<String, ModuleDef>,
}

impl ModuleLibrary {
    /// Build a library from a list of definitions. Later duplicates replace earlier ones.
    pub fn new(modules: impl IntoIterator<Item = ModuleDef>) -> Self {
        let modules = modules
            .into_iter()
            .map(|module| (module.name.clone(), module))
            .collect();
        Self { modules }
    }

    /// Number of registered modules.
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// True when no module is registered.
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

impl ModuleRegistry for ModuleLibrary {
    fn resolve(&self, module_id: &str) -> Option<ModuleDef> {
        self.modules.get(module_id).cloned()
    }

    fn names(&self) -> Vec<String> {
        self.modules.keys().cloned().collect()
    }
}
