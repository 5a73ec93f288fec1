use crate::domain::{
    Module, ModuleId, ModuleProvider, ModuleRef, OverrideSet, PropertiesModule, PropertyStore,
    RuntimeDescriptor,
};
use crate::error::BuilderError;
use crate::services::OverrideBuilder;
use tracing::{debug, info, warn};

/// Composition state reachable from the deprecated [`Compose::configurator`] hook.
#[derive(Debug, Default)]
pub struct Composition {
    pub args: Vec<String>,
    pub modules: Vec<ModuleRef>,
    pub overrides: Vec<OverrideSet>,
    pub auto_load_modules: bool,
}

/// Collects modules, overrides, arguments and properties for one test runtime.
///
/// Single use: [`RuntimeBuilder::into_descriptor`] consumes it.
#[derive(Debug, Default)]
pub struct RuntimeBuilder {
    composition: Composition,
    properties: PropertyStore,
}

impl RuntimeBuilder {
    pub fn new<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut builder = Self::default();
        builder.args(args);
        builder
    }

    pub fn properties(&self) -> &PropertyStore {
        &self.properties
    }

    pub fn composition(&self) -> &Composition {
        &self.composition
    }

    pub(crate) fn record_override(&mut self, set: OverrideSet) {
        debug!(
            "Recording override of {:?} with {:?}",
            set.targets(),
            set.replacements()
        );
        self.composition.overrides.push(set);
    }

    /// Appends the properties module and freezes the composition.
    pub fn into_descriptor(self) -> RuntimeDescriptor {
        let Self {
            composition,
            properties,
        } = self;
        let Composition {
            args,
            mut modules,
            overrides,
            auto_load_modules,
        } = composition;

        let protected = ModuleId::of::<PropertiesModule>();
        let before = modules.len();
        modules.retain(|module| !module.is(protected));
        if modules.len() != before {
            warn!(
                "Dropped {} stray {} module(s); only the builder's properties are used",
                before - modules.len(),
                PropertiesModule::NAME
            );
        }
        modules.push(ModuleRef::instance(PropertiesModule::new(properties.clone())));

        info!(
            "Runtime composed: {} module(s), {} override(s), {} properties, args {:?}",
            modules.len(),
            overrides.len(),
            properties.len(),
            args
        );

        RuntimeDescriptor {
            modules,
            overrides,
            args,
            auto_load_modules,
            properties,
        }
    }
}

/// Chainable composition surface shared by every test runtime builder.
///
/// Implementors only expose their [`RuntimeBuilder`]; each method returns the implementor
/// itself so specialized builders keep their own methods across the chain.
pub trait Compose: Sized {
    fn composer(&mut self) -> &mut RuntimeBuilder;

    /// Appends CLI arguments in order.
    fn args<I, S>(&mut self, args: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let target = &mut self.composer().composition.args;
        let before = target.len();
        target.extend(args.into_iter().map(Into::into));
        debug!("Appended {} argument(s)", target.len() - before);
        self
    }

    fn arg(&mut self, arg: impl Into<String>) -> &mut Self {
        self.args([arg])
    }

    /// Asks the container to add its catalog of discoverable modules.
    fn auto_load_modules(&mut self) -> &mut Self {
        self.composer().composition.auto_load_modules = true;
        self
    }

    fn module<M: Module>(&mut self, module: M) -> &mut Self {
        self.module_ref(ModuleRef::instance(module))
    }

    /// Registers a module the container instantiates through `Default`.
    fn module_type<M: Module + Default>(&mut self) -> &mut Self {
        self.module_ref(ModuleRef::of_type::<M>())
    }

    fn module_ref(&mut self, module: ModuleRef) -> &mut Self {
        debug!("Adding module {:?}", module);
        self.composer().composition.modules.push(module);
        self
    }

    fn modules<I: IntoIterator<Item = ModuleRef>>(&mut self, modules: I) -> &mut Self {
        for module in modules {
            self.module_ref(module);
        }
        self
    }

    /// Registers a provider's module; overrides it declares are recorded right away.
    fn provider<P: ModuleProvider>(&mut self, provider: P) -> &mut Self {
        let protected = ModuleId::of::<PropertiesModule>();
        let mut targets = provider.overrides();
        targets.retain(|target| {
            let keep = *target != protected;
            if !keep {
                warn!(
                    "Provider {} may not override {}; ignoring that target",
                    provider.name(),
                    PropertiesModule::NAME
                );
            }
            keep
        });

        let module = ModuleRef::provider(provider);
        if targets.is_empty() {
            return self.module_ref(module);
        }
        self.composer()
            .record_override(OverrideSet::new(targets, vec![module]));
        self
    }

    /// Sets a configuration property; the last value written for a key wins.
    fn property(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        let key = key.into();
        let value = value.into();
        debug!("Setting property {} = {}", key, value);
        if let Some(previous) = self.composer().properties.set(key, value) {
            debug!("Replaced previous value {}", previous);
        }
        self
    }

    /// Starts an override of every module matching `targets`.
    ///
    /// Fails without touching the builder when no target is given or when a target is the
    /// properties module.
    fn override_modules<I>(&mut self, targets: I) -> Result<OverrideBuilder<'_, Self>, BuilderError>
    where
        I: IntoIterator<Item = ModuleId>,
    {
        let targets: Vec<ModuleId> = targets.into_iter().collect();
        if targets.is_empty() {
            return Err(BuilderError::EmptyOverride);
        }
        let protected = ModuleId::of::<PropertiesModule>();
        if let Some(target) = targets.iter().find(|t| **t == protected) {
            return Err(BuilderError::ProtectedTarget(*target));
        }
        Ok(OverrideBuilder::new(self, targets))
    }

    /// Raw access to the composition state for setups the methods above do not cover.
    #[deprecated(note = "use the builder methods to add modules, overrides and arguments")]
    fn configurator<F>(&mut self, configure: F) -> &mut Self
    where
        F: FnOnce(&mut Composition),
    {
        configure(&mut self.composer().composition);
        self
    }
}

impl Compose for RuntimeBuilder {
    fn composer(&mut self) -> &mut RuntimeBuilder {
        self
    }
}
