use anyhow::Result;
use serde::Deserialize;
use std::fs;
use std::sync::Arc;
use testrig::test_support::{RecordingContainer, init_tracing};
use testrig::{
    Binder, Compose, InMemoryContainer, Module, ModuleId, ModuleProvider, ModuleRef,
    PropertiesModule, PropertyStore, TestRuntimeFactory,
};

trait Greeter: Send + Sync {
    fn greet(&self) -> String;
}

struct English;

impl Greeter for English {
    fn greet(&self) -> String {
        "hello".into()
    }
}

struct Pirate;

impl Greeter for Pirate {
    fn greet(&self) -> String {
        "ahoy".into()
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Audit(&'static str);

#[derive(Debug, Deserialize, PartialEq)]
struct Http {
    port: u16,
    host: String,
}

/// Base module: binds a greeter, an audit marker and default config.
#[derive(Default)]
struct CoreModule;

impl Module for CoreModule {
    fn configure(&self, binder: &mut Binder) {
        binder
            .bind::<Arc<dyn Greeter>>(Arc::new(English))
            .bind(Audit("core"));
        let defaults = toml::from_str("[http]\nport = 80\nhost = \"core\"\n")
            .unwrap_or_default();
        binder.contribute_config(defaults);
    }
}

/// Rebinds only the greeter; everything else the core module declared must disappear.
#[derive(Default)]
struct PirateModule;

impl Module for PirateModule {
    fn configure(&self, binder: &mut Binder) {
        binder.bind::<Arc<dyn Greeter>>(Arc::new(Pirate));
        let config = toml::from_str("[http]\nport = 81\nhost = \"pirate\"\n").unwrap_or_default();
        binder.contribute_config(config);
    }
}

/// Replacement that tries to push its own value for a key the test sets.
#[derive(Default)]
struct PropertyGrabber;

impl Module for PropertyGrabber {
    fn configure(&self, binder: &mut Binder) {
        binder.bind::<Arc<dyn Greeter>>(Arc::new(Pirate));
        let grabbed: PropertyStore = [("http.host", "from-replacement"), ("http.port", "7070")]
            .into_iter()
            .collect();
        binder.contribute_properties(grabbed);
    }
}

struct PirateProvider;

impl ModuleProvider for PirateProvider {
    type Module = PirateModule;

    fn module(&self) -> PirateModule {
        PirateModule
    }

    fn overrides(&self) -> Vec<ModuleId> {
        vec![ModuleId::of::<CoreModule>()]
    }
}

fn factory() -> (TestRuntimeFactory, Arc<RecordingContainer>) {
    init_tracing();
    let container = Arc::new(RecordingContainer::new());
    (TestRuntimeFactory::new(container.clone()), container)
}

#[test]
fn test_workflow_launch_and_teardown() -> Result<()> {
    let (factory, container) = factory();

    let runtime = factory
        .app(["--help"])
        .module_type::<CoreModule>()
        .create_runtime()?;

    let greeter = runtime.require::<Arc<dyn Greeter>>()?;
    assert_eq!(greeter.greet(), "hello");
    assert_eq!(runtime.get::<Audit>().as_deref(), Some(&Audit("core")));
    assert_eq!(factory.active_runtimes(), 1);

    factory.shutdown_all()?;
    assert_eq!(factory.active_runtimes(), 0);
    assert_eq!(
        container.get_commands(),
        vec!["launch:--help".to_string(), "shutdown:--help".to_string()]
    );
    Ok(())
}

#[test]
fn test_override_shadows_whole_module() -> Result<()> {
    let (factory, _container) = factory();

    let runtime = factory
        .app(Vec::<String>::new())
        .module(CoreModule)
        .override_modules([ModuleId::of::<CoreModule>()])?
        .with(PirateModule)
        .create_runtime()?;

    // overlapping binding comes from the replacement
    assert_eq!(runtime.require::<Arc<dyn Greeter>>()?.greet(), "ahoy");
    // non-overlapping binding of the target is gone as well
    assert!(!runtime.contains::<Audit>());
    assert!(!runtime.has_module(ModuleId::of::<CoreModule>()));
    assert_eq!(
        runtime.binding_source::<Arc<dyn Greeter>>(),
        Some(ModuleId::of::<PirateModule>())
    );

    let http: Http = runtime.config("http")?;
    assert_eq!(http.host, "pirate");
    Ok(())
}

#[test]
fn test_provider_declared_override() -> Result<()> {
    let (factory, container) = factory();

    let runtime = factory
        .app(Vec::<String>::new())
        .module_type::<CoreModule>()
        .provider(PirateProvider)
        .create_runtime()?;

    assert_eq!(runtime.require::<Arc<dyn Greeter>>()?.greet(), "ahoy");
    assert!(!runtime.contains::<Audit>());

    let descriptor = &container.descriptors()[0];
    assert_eq!(descriptor.overrides().len(), 1);
    assert_eq!(
        descriptor.module_ids(),
        vec![ModuleId::of::<CoreModule>(), ModuleId::of::<PropertiesModule>()]
    );
    Ok(())
}

#[test]
fn test_properties_win_over_modules_and_files() -> Result<()> {
    let (factory, _container) = factory();
    let dir = tempfile::tempdir()?;
    let config_path = dir.path().join("app.yml");
    fs::write(&config_path, "http:\n  port: 8080\n  host: from-file\n")?;

    let runtime = factory
        .app(["--config".to_string(), config_path.to_string_lossy().into_owned()])
        .module(CoreModule)
        .override_modules([ModuleId::of::<CoreModule>()])?
        .with(PirateModule)
        .property("http.port", "9090")
        .create_runtime()?;

    let http: Http = runtime.config("http")?;
    assert_eq!(
        http,
        Http {
            port: 9090,
            host: "from-file".into(),
        }
    );
    assert_eq!(
        runtime.configuration().get_str("http.port").as_deref(),
        Some("9090")
    );
    Ok(())
}

#[test]
fn test_properties_win_over_replacement_contributions() -> Result<()> {
    let (factory, _container) = factory();

    let runtime = factory
        .app(Vec::<String>::new())
        .module(CoreModule)
        .override_modules([ModuleId::of::<CoreModule>()])?
        .with(PropertyGrabber)
        .property("http.host", "from-test")
        .create_runtime()?;

    assert_eq!(
        runtime.configuration().get_str("http.host").as_deref(),
        Some("from-test")
    );
    // keys the test leaves alone fall back to the replacement's value
    let http: Http = runtime.config("http")?;
    assert_eq!(
        http,
        Http {
            port: 7070,
            host: "from-test".into(),
        }
    );
    assert_eq!(
        runtime.modules().last(),
        Some(&ModuleId::of::<PropertiesModule>())
    );
    Ok(())
}

#[test]
fn test_auto_loaded_modules_can_be_overridden() -> Result<()> {
    init_tracing();
    let container = InMemoryContainer::new().with_catalog([ModuleRef::of_type::<CoreModule>()]);
    let factory = TestRuntimeFactory::new(Arc::new(container));

    let runtime = factory
        .app(Vec::<String>::new())
        .auto_load_modules()
        .override_modules([ModuleId::of::<CoreModule>()])?
        .with_type::<PirateModule>()
        .create_runtime()?;

    assert_eq!(runtime.require::<Arc<dyn Greeter>>()?.greet(), "ahoy");
    assert_eq!(
        runtime.modules(),
        [ModuleId::of::<PirateModule>(), ModuleId::of::<PropertiesModule>()]
    );
    Ok(())
}

#[test]
fn test_runtimes_are_shut_down_when_factory_drops() -> Result<()> {
    let container = Arc::new(RecordingContainer::new());
    {
        let factory = TestRuntimeFactory::new(container.clone());
        factory.app(["-c", "/dev/null"]).create_runtime()?;
        factory.app(Vec::<String>::new()).create_runtime()?;
        assert_eq!(factory.active_runtimes(), 2);
    }

    let commands = container.get_commands();
    assert_eq!(commands.len(), 4);
    assert_eq!(commands[2], "shutdown:");
    assert_eq!(commands[3], "shutdown:-c /dev/null");
    Ok(())
}
