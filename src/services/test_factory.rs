use crate::domain::{Container, Injector};
use crate::services::{Compose, RuntimeBuilder};
use anyhow::{Context, Result, bail};
use std::cell::RefCell;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Launches test runtimes on a container and shuts every one of them down when dropped.
pub struct TestRuntimeFactory {
    container: Arc<dyn Container>,
    runtimes: RefCell<Vec<Arc<Injector>>>,
}

impl TestRuntimeFactory {
    pub fn new(container: Arc<dyn Container>) -> Self {
        Self {
            container,
            runtimes: RefCell::new(Vec::new()),
        }
    }

    /// Starts composing a runtime with the given CLI arguments.
    pub fn app<I, S>(&self, args: I) -> FactoryBuilder<'_>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FactoryBuilder {
            factory: self,
            inner: RuntimeBuilder::new(args),
            launched: false,
        }
    }

    pub fn active_runtimes(&self) -> usize {
        self.runtimes.borrow().len()
    }

    /// Shuts down every runtime launched so far, most recent first.
    ///
    /// Failures are logged and do not stop the remaining shutdowns; the first one is returned.
    pub fn shutdown_all(&self) -> Result<()> {
        let runtimes: Vec<Arc<Injector>> = self.runtimes.borrow_mut().drain(..).collect();
        if runtimes.is_empty() {
            return Ok(());
        }

        info!("Shutting down {} test runtime(s)", runtimes.len());
        let mut first_error = None;
        for runtime in runtimes.iter().rev() {
            match self.container.shutdown(runtime) {
                Ok(()) => debug!("Runtime {:?} stopped", runtime.args()),
                Err(e) => {
                    error!("Failed to shut down runtime {:?}: {:#}", runtime.args(), e);
                    first_error.get_or_insert(e);
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn launch(&self, builder: RuntimeBuilder) -> Result<Arc<Injector>> {
        let descriptor = builder.into_descriptor();
        let args = descriptor.args().to_vec();
        let injector = self
            .container
            .launch(descriptor)
            .with_context(|| format!("launching test runtime with args {:?}", args))?;
        let injector = Arc::new(injector);
        self.runtimes.borrow_mut().push(injector.clone());
        Ok(injector)
    }
}

impl Drop for TestRuntimeFactory {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown_all() {
            error!("Test runtime teardown incomplete: {:#}", e);
        }
    }
}

/// Runtime builder bound to a [`TestRuntimeFactory`].
pub struct FactoryBuilder<'f> {
    factory: &'f TestRuntimeFactory,
    inner: RuntimeBuilder,
    launched: bool,
}

impl FactoryBuilder<'_> {
    /// Finalizes the composition and launches it; the factory owns its teardown.
    ///
    /// A builder launches at most once.
    pub fn create_runtime(&mut self) -> Result<Arc<Injector>> {
        if self.launched {
            bail!("runtime already created from this builder");
        }
        self.launched = true;
        let builder = std::mem::take(&mut self.inner);
        self.factory.launch(builder)
    }
}

impl Compose for FactoryBuilder<'_> {
    fn composer(&mut self) -> &mut RuntimeBuilder {
        &mut self.inner
    }
}
