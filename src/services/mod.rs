mod override_builder;
mod runtime_builder;
mod test_factory;

pub use override_builder::OverrideBuilder;
pub use runtime_builder::{Compose, Composition, RuntimeBuilder};
pub use test_factory::{FactoryBuilder, TestRuntimeFactory};
