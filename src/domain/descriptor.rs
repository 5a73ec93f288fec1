use super::{ModuleId, ModuleRef, PropertyStore};

/// Override directive: every module matching a target is shadowed by the replacements.
#[derive(Debug, Clone)]
pub struct OverrideSet {
    targets: Vec<ModuleId>,
    replacements: Vec<ModuleRef>,
}

impl OverrideSet {
    pub(crate) fn new(targets: Vec<ModuleId>, replacements: Vec<ModuleRef>) -> Self {
        debug_assert!(!targets.is_empty());
        Self {
            targets,
            replacements,
        }
    }

    pub fn targets(&self) -> &[ModuleId] {
        &self.targets
    }

    pub fn replacements(&self) -> &[ModuleRef] {
        &self.replacements
    }

    pub fn shadows(&self, id: ModuleId) -> bool {
        self.targets.contains(&id)
    }
}

/// Finalized composition handed to a [`Container`](super::Container).
#[derive(Debug, Clone)]
pub struct RuntimeDescriptor {
    pub(crate) modules: Vec<ModuleRef>,
    pub(crate) overrides: Vec<OverrideSet>,
    pub(crate) args: Vec<String>,
    pub(crate) auto_load_modules: bool,
    pub(crate) properties: PropertyStore,
}

impl RuntimeDescriptor {
    /// Plain modules in registration order; the properties module is always last.
    pub fn modules(&self) -> &[ModuleRef] {
        &self.modules
    }

    pub fn module_ids(&self) -> Vec<ModuleId> {
        self.modules.iter().map(ModuleRef::id).collect()
    }

    pub fn overrides(&self) -> &[OverrideSet] {
        &self.overrides
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn auto_load_modules(&self) -> bool {
        self.auto_load_modules
    }

    /// Snapshot carried by the properties module.
    pub fn properties(&self) -> &PropertyStore {
        &self.properties
    }
}
