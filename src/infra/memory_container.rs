use crate::domain::{
    Binder, Container, Injector, ModuleId, ModuleRef, PropertiesModule, RuntimeDescriptor,
};
use crate::infra::config::resolve_configuration;
use anyhow::{Context, Result};
use clap::Parser;
use std::collections::HashSet;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Arguments the in-memory container understands itself.
#[derive(Parser, Debug, Default, Clone, PartialEq, Eq)]
#[command(disable_help_flag = true)]
pub struct LaunchOptions {
    /// Configuration file, applied in the order given
    #[arg(short, long = "config", value_name = "FILE")]
    pub config: Vec<PathBuf>,

    /// Print help instead of running a command
    #[arg(long)]
    pub help: bool,
}

impl LaunchOptions {
    pub fn parse_args(app_name: &str, args: &[String]) -> Result<Self> {
        let argv = std::iter::once(app_name.to_string()).chain(args.iter().cloned());
        Self::try_parse_from(argv).with_context(|| format!("parsing arguments {:?}", args))
    }
}

/// Reference container: installs modules into a single binder and resolves layered
/// configuration, entirely in memory.
#[derive(Debug)]
pub struct InMemoryContainer {
    app_name: String,
    catalog: Vec<ModuleRef>,
}

impl InMemoryContainer {
    pub fn new() -> Self {
        Self {
            app_name: "testrig".to_string(),
            catalog: Vec::new(),
        }
    }

    pub fn with_app_name(mut self, name: impl Into<String>) -> Self {
        self.app_name = name.into();
        self
    }

    /// Modules added when a descriptor asks for auto-loading.
    pub fn with_catalog<I: IntoIterator<Item = ModuleRef>>(mut self, modules: I) -> Self {
        self.catalog.extend(modules);
        self
    }

    /// Modules that would be installed for `descriptor`, after overrides, in install order.
    pub fn effective_modules(&self, descriptor: &RuntimeDescriptor) -> Vec<ModuleRef> {
        let mut modules: Vec<ModuleRef> = Vec::new();

        if descriptor.auto_load_modules() {
            let explicit: HashSet<ModuleId> = descriptor.module_ids().into_iter().collect();
            for module in &self.catalog {
                if explicit.contains(&module.id()) {
                    debug!("Catalog module {} already registered explicitly", module.id());
                    continue;
                }
                modules.push(module.clone());
            }
        }
        modules.extend(descriptor.modules().iter().cloned());

        apply_overrides(modules, descriptor)
    }
}

impl Default for InMemoryContainer {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies override directives in registration order. Each directive removes every
/// module matching one of its targets, replacements included, then appends its own
/// replacements. The properties module is never removed and ends up installed last.
fn apply_overrides(mut modules: Vec<ModuleRef>, descriptor: &RuntimeDescriptor) -> Vec<ModuleRef> {
    let protected = ModuleId::of::<PropertiesModule>();

    for set in descriptor.overrides() {
        for target in set.targets() {
            if !modules.iter().any(|m| m.is(*target)) {
                warn!("Override target {} matches no registered module", target);
            }
        }

        modules.retain(|module| {
            let id = module.id();
            let shadowed = id != protected && set.shadows(id);
            if shadowed {
                debug!("Module {} shadowed by override", id);
            }
            !shadowed
        });
        modules.extend(set.replacements().iter().cloned());
    }

    let (properties, mut modules): (Vec<ModuleRef>, Vec<ModuleRef>) =
        modules.into_iter().partition(|m| m.is(protected));
    modules.extend(properties);
    modules
}

impl Container for InMemoryContainer {
    fn launch(&self, descriptor: RuntimeDescriptor) -> Result<Injector> {
        let options = LaunchOptions::parse_args(&self.app_name, descriptor.args())?;
        let modules = self.effective_modules(&descriptor);

        info!(
            "Launching {} with {} module(s)",
            self.app_name,
            modules.len()
        );

        let mut binder = Binder::new();
        for module in &modules {
            let realized = module.realize();
            binder.install(module.id(), realized.as_ref());
        }
        let output = binder.into_output();

        let configuration = resolve_configuration(
            &output.defaults,
            &output.config,
            &options.config,
            &output.properties,
        )
        .context("resolving test runtime configuration")?;

        let args = descriptor.args().to_vec();
        let installed = modules.iter().map(ModuleRef::id).collect();
        Ok(Injector::new(output.bindings, configuration, args, installed))
    }

    fn shutdown(&self, injector: &Injector) -> Result<()> {
        info!(
            "Shutting down {} ({} module(s))",
            self.app_name,
            injector.modules().len()
        );
        Ok(())
    }
}
