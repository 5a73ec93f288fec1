mod binder;
mod configuration;
mod descriptor;
mod injector;
mod module;
mod properties;
pub mod traits;

pub use binder::{Binder, BinderOutput, Binding};
pub use configuration::Configuration;
pub use descriptor::{OverrideSet, RuntimeDescriptor};
pub use injector::Injector;
pub use module::{Module, ModuleId, ModuleProvider, ModuleRef};
pub use properties::{PropertiesModule, PropertyStore};
pub use traits::Container;
