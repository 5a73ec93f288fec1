use super::{Binding, Configuration, ModuleId};
use anyhow::{Result, anyhow};
use serde::de::DeserializeOwned;
use std::any::{Any, TypeId, type_name};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A launched test runtime: resolved bindings plus resolved configuration.
pub struct Injector {
    bindings: HashMap<TypeId, Binding>,
    configuration: Configuration,
    args: Vec<String>,
    modules: Vec<ModuleId>,
}

impl Injector {
    pub fn new(
        bindings: HashMap<TypeId, Binding>,
        configuration: Configuration,
        args: Vec<String>,
        modules: Vec<ModuleId>,
    ) -> Self {
        Self {
            bindings,
            configuration,
            args,
            modules,
        }
    }

    pub fn get<T: Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        let binding = self.bindings.get(&TypeId::of::<T>())?;
        let value: Arc<dyn Any + Send + Sync> = binding.value.clone();
        value.downcast::<T>().ok()
    }

    pub fn require<T: Send + Sync + 'static>(&self) -> Result<Arc<T>> {
        self.get::<T>()
            .ok_or_else(|| anyhow!("no binding for {}", type_name::<T>()))
    }

    pub fn contains<T: 'static>(&self) -> bool {
        self.bindings.contains_key(&TypeId::of::<T>())
    }

    /// Module that contributed the binding for `T`.
    pub fn binding_source<T: 'static>(&self) -> Option<ModuleId> {
        self.bindings.get(&TypeId::of::<T>())?.source
    }

    pub fn configuration(&self) -> &Configuration {
        &self.configuration
    }

    pub fn config<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.configuration.extract(path)
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Modules that were actually installed, after overrides.
    pub fn modules(&self) -> &[ModuleId] {
        &self.modules
    }

    pub fn has_module(&self, id: ModuleId) -> bool {
        self.modules.contains(&id)
    }
}

impl fmt::Debug for Injector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut bound: Vec<&str> = self.bindings.values().map(|b| b.type_name).collect();
        bound.sort_unstable();
        f.debug_struct("Injector")
            .field("bindings", &bound)
            .field("modules", &self.modules)
            .field("args", &self.args)
            .finish()
    }
}
