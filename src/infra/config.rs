use crate::domain::{Configuration, PropertyStore};
use anyhow::{Context, Result, bail};
use config::{Config, File, FileFormat, FileSourceString};
use std::fs;
use std::path::{Path, PathBuf};
use toml::Table;
use tracing::debug;

type ConfigSource = File<FileSourceString, FileFormat>;

/// Loads a configuration file as a source. `.yml`/`.yaml` files are read as YAML,
/// anything else as TOML. A leading `~` is expanded.
pub fn load_config_file(path: &Path) -> Result<ConfigSource> {
    let path = PathBuf::from(shellexpand::tilde(path.to_string_lossy().as_ref()).into_owned());
    if !path.exists() {
        bail!("config file not found: {:?}", path);
    }

    let content = fs::read_to_string(&path).with_context(|| format!("reading {:?}", path))?;
    let format = match path.extension().and_then(|e| e.to_str()) {
        Some("yml") | Some("yaml") if !content.trim().is_empty() => FileFormat::Yaml,
        _ => FileFormat::Toml,
    };

    debug!("Loaded {:?} as {:?}", path, format);
    Ok(File::from_str(&content, format))
}

/// Turns a module-contributed table into a source.
fn table_source(table: &Table) -> Result<ConfigSource> {
    let content = toml::to_string(table).context("serializing module configuration")?;
    Ok(File::from_str(&content, FileFormat::Toml))
}

/// Resolves configuration from lowest to highest precedence: demoted property defaults,
/// module contributions, files, then properties.
///
/// Properties are applied as dotted overrides and stay strings in the tree.
pub fn resolve_configuration(
    defaults: &PropertyStore,
    module_config: &[Table],
    files: &[PathBuf],
    properties: &PropertyStore,
) -> Result<Configuration> {
    let mut builder = Config::builder();
    for (key, value) in defaults.iter() {
        builder = builder
            .set_default(key, value)
            .with_context(|| format!("invalid property key '{}'", key))?;
    }
    for table in module_config {
        builder = builder.add_source(table_source(table)?);
    }
    for file in files {
        builder = builder.add_source(load_config_file(file)?);
    }
    for (key, value) in properties.iter() {
        builder = builder
            .set_override(key, value)
            .with_context(|| format!("invalid property key '{}'", key))?;
    }

    let config = builder.build().context("building layered configuration")?;
    Ok(Configuration::new(config))
}
