use crate::domain::{Container, Injector, RuntimeDescriptor};
use crate::infra::InMemoryContainer;
use anyhow::{Result, bail};
use std::sync::RwLock;
use tracing_subscriber::EnvFilter;

/// Installs a test-friendly tracing subscriber. Safe to call from every test.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

/// Container double that records every call and delegates to an [`InMemoryContainer`].
#[derive(Debug)]
pub struct RecordingContainer {
    inner: InMemoryContainer,
    commands: RwLock<Vec<String>>,
    descriptors: RwLock<Vec<RuntimeDescriptor>>,
    fail_on: RwLock<Option<String>>,
}

impl RecordingContainer {
    pub fn new() -> Self {
        Self::wrapping(InMemoryContainer::new())
    }

    pub fn wrapping(inner: InMemoryContainer) -> Self {
        Self {
            inner,
            commands: RwLock::new(Vec::new()),
            descriptors: RwLock::new(Vec::new()),
            fail_on: RwLock::new(None),
        }
    }

    /// Makes the named operation (`launch` or `shutdown`) fail from now on.
    pub fn set_fail_on(&self, operation: &str) {
        *self.fail_on.write().unwrap() = Some(operation.to_string());
    }

    pub fn clear_fail_on(&self) {
        *self.fail_on.write().unwrap() = None;
    }

    pub fn get_commands(&self) -> Vec<String> {
        self.commands.read().unwrap().clone()
    }

    /// Descriptors received by `launch`, in order.
    pub fn descriptors(&self) -> Vec<RuntimeDescriptor> {
        self.descriptors.read().unwrap().clone()
    }

    fn record_command(&self, cmd: String) {
        self.commands.write().unwrap().push(cmd);
    }

    fn check_fail(&self, operation: &str) -> Result<()> {
        if let Some(ref fail_on) = *self.fail_on.read().unwrap() {
            if fail_on == operation {
                bail!("Mock failure on: {}", operation);
            }
        }
        Ok(())
    }
}

impl Default for RecordingContainer {
    fn default() -> Self {
        Self::new()
    }
}

impl Container for RecordingContainer {
    fn launch(&self, descriptor: RuntimeDescriptor) -> Result<Injector> {
        self.record_command(format!("launch:{}", descriptor.args().join(" ")));
        self.descriptors.write().unwrap().push(descriptor.clone());
        self.check_fail("launch")?;
        self.inner.launch(descriptor)
    }

    fn shutdown(&self, injector: &Injector) -> Result<()> {
        self.record_command(format!("shutdown:{}", injector.args().join(" ")));
        self.check_fail("shutdown")?;
        self.inner.shutdown(injector)
    }
}
