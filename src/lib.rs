pub mod domain;
pub mod error;
pub mod infra;
pub mod services;

// Make test_support available for integration tests
pub mod test_support;

pub use domain::{
    Binder, Configuration, Container, Injector, Module, ModuleId, ModuleProvider, ModuleRef,
    OverrideSet, PropertiesModule, PropertyStore, RuntimeDescriptor,
};
pub use error::BuilderError;
pub use infra::InMemoryContainer;
pub use services::{
    Compose, Composition, FactoryBuilder, OverrideBuilder, RuntimeBuilder, TestRuntimeFactory,
};
