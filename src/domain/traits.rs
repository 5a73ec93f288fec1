use super::{Injector, RuntimeDescriptor};
use anyhow::Result;
use std::fmt::Debug;

/// Injection container that realizes runtime descriptors
pub trait Container: Send + Sync + Debug {
    /// Instantiate the descriptor's modules, apply its overrides and resolve configuration
    fn launch(&self, descriptor: RuntimeDescriptor) -> Result<Injector>;

    /// Release whatever a launched runtime holds
    fn shutdown(&self, injector: &Injector) -> Result<()>;
}
