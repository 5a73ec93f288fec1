use super::{Module, ModuleId, PropertiesModule, PropertyStore};
use std::any::{Any, TypeId, type_name};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// A single bound value and the module that contributed it.
#[derive(Clone)]
pub struct Binding {
    pub value: Arc<dyn Any + Send + Sync>,
    pub type_name: &'static str,
    pub source: Option<ModuleId>,
}

/// Registration surface handed to [`Module::configure`].
///
/// One binder collects the contributions of every module installed into a runtime.
/// A later binding for the same type replaces the earlier one.
#[derive(Default)]
pub struct Binder {
    current: Option<ModuleId>,
    bindings: HashMap<TypeId, Binding>,
    config: Vec<toml::Table>,
    defaults: PropertyStore,
    properties: PropertyStore,
}

/// Everything a binder collected, split for the container.
pub struct BinderOutput {
    pub bindings: HashMap<TypeId, Binding>,
    pub config: Vec<toml::Table>,
    /// Properties contributed by ordinary modules, resolved below every module table.
    pub defaults: PropertyStore,
    /// Properties of the synthetic properties module, resolved above everything else.
    pub properties: PropertyStore,
}

impl Binder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `module.configure` with contributions attributed to `id`.
    pub fn install(&mut self, id: ModuleId, module: &dyn Module) {
        debug!("Installing module {}", id);
        self.current = Some(id);
        module.configure(self);
        self.current = None;
    }

    pub fn bind<T: Send + Sync + 'static>(&mut self, value: T) -> &mut Self {
        self.bind_arc(Arc::new(value))
    }

    pub fn bind_arc<T: Send + Sync + 'static>(&mut self, value: Arc<T>) -> &mut Self {
        let previous = self.bindings.insert(
            TypeId::of::<T>(),
            Binding {
                value,
                type_name: type_name::<T>(),
                source: self.current,
            },
        );
        if let Some(previous) = previous {
            debug!(
                "Binding for {} replaced (was from {:?})",
                previous.type_name, previous.source
            );
        }
        self
    }

    /// Contributes a configuration table with the precedence of built-in defaults.
    pub fn contribute_config(&mut self, table: toml::Table) -> &mut Self {
        self.config.push(table);
        self
    }

    /// Contributes flat properties.
    ///
    /// Only the properties module reaches the top precedence layer. Any other module's
    /// properties are demoted to defaults.
    pub fn contribute_properties(&mut self, properties: PropertyStore) -> &mut Self {
        let target = if self.current == Some(ModuleId::of::<PropertiesModule>()) {
            &mut self.properties
        } else {
            warn!(
                "Module {:?} contributed {} properties; treating them as defaults",
                self.current,
                properties.len()
            );
            &mut self.defaults
        };
        for (key, value) in properties {
            target.set(key, value);
        }
        self
    }

    pub fn is_bound<T: 'static>(&self) -> bool {
        self.bindings.contains_key(&TypeId::of::<T>())
    }

    pub fn into_output(self) -> BinderOutput {
        BinderOutput {
            bindings: self.bindings,
            config: self.config,
            defaults: self.defaults,
            properties: self.properties,
        }
    }
}
