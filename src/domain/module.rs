use super::Binder;
use std::any::{TypeId, type_name};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// A unit of bindings contributed to a runtime.
pub trait Module: Send + Sync + 'static {
    fn configure(&self, binder: &mut Binder);
}

/// Supplies a module and optionally declares which modules it overrides.
pub trait ModuleProvider: Send + Sync + 'static {
    type Module: Module;

    fn module(&self) -> Self::Module;

    /// Modules whose bindings the provided module replaces wholesale.
    fn overrides(&self) -> Vec<ModuleId> {
        Vec::new()
    }

    fn name(&self) -> String {
        ModuleId::of::<Self::Module>().name().to_string()
    }
}

/// Identity of a module for override matching.
///
/// Two references share an id when they declare the same module type, regardless of
/// whether they point at the same instance.
#[derive(Clone, Copy)]
pub struct ModuleId {
    type_id: TypeId,
    name: &'static str,
}

impl ModuleId {
    pub fn of<M: Module>() -> Self {
        Self {
            type_id: TypeId::of::<M>(),
            name: type_name::<M>(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for ModuleId {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for ModuleId {}

impl Hash for ModuleId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

impl fmt::Debug for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ModuleId({})", self.name)
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

type ProviderFactory = Arc<dyn Fn() -> Box<dyn Module> + Send + Sync>;

/// Reference to a module, realized by the container at launch.
#[derive(Clone)]
pub enum ModuleRef {
    /// Instantiated by the container through `Default`.
    Type {
        id: ModuleId,
        factory: fn() -> Box<dyn Module>,
    },
    /// Already constructed by the caller.
    Instance { id: ModuleId, module: Arc<dyn Module> },
    /// Produced on demand by a [`ModuleProvider`].
    Provider {
        id: ModuleId,
        name: String,
        factory: ProviderFactory,
    },
}

fn instantiate<M: Module + Default>() -> Box<dyn Module> {
    Box::new(M::default())
}

impl ModuleRef {
    pub fn of_type<M: Module + Default>() -> Self {
        Self::Type {
            id: ModuleId::of::<M>(),
            factory: instantiate::<M>,
        }
    }

    pub fn instance<M: Module>(module: M) -> Self {
        Self::Instance {
            id: ModuleId::of::<M>(),
            module: Arc::new(module),
        }
    }

    /// Wraps a provider. Its declared overrides are not consulted here; callers that
    /// care about them read `provider.overrides()` first.
    pub fn provider<P: ModuleProvider>(provider: P) -> Self {
        let name = provider.name();
        let provider = Arc::new(provider);
        Self::Provider {
            id: ModuleId::of::<P::Module>(),
            name,
            factory: Arc::new(move || Box::new(provider.module()) as Box<dyn Module>),
        }
    }

    pub fn id(&self) -> ModuleId {
        match self {
            Self::Type { id, .. } | Self::Instance { id, .. } | Self::Provider { id, .. } => *id,
        }
    }

    pub fn is(&self, id: ModuleId) -> bool {
        self.id() == id
    }

    /// Produces the module value. Instances are shared, the other variants build a fresh one.
    pub fn realize(&self) -> Arc<dyn Module> {
        match self {
            Self::Type { factory, .. } => Arc::from(factory()),
            Self::Instance { module, .. } => module.clone(),
            Self::Provider { factory, .. } => Arc::from(factory()),
        }
    }
}

impl fmt::Debug for ModuleRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Type { id, .. } => write!(f, "Type({id})"),
            Self::Instance { id, .. } => write!(f, "Instance({id})"),
            Self::Provider { id, name, .. } => write!(f, "Provider({name} -> {id})"),
        }
    }
}
