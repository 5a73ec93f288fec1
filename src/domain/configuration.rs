use anyhow::{Context, Result};
use config::{Config, ConfigError, Value};
use serde::de::DeserializeOwned;

/// Resolved configuration tree of a launched runtime.
#[derive(Debug, Clone, Default)]
pub struct Configuration {
    inner: Config,
}

impl Configuration {
    pub fn new(inner: Config) -> Self {
        Self { inner }
    }

    pub fn contains(&self, path: &str) -> bool {
        self.inner.get::<Value>(path).is_ok()
    }

    /// Scalar value at a dotted path such as `server.port`, rendered as a string.
    pub fn get_str(&self, path: &str) -> Option<String> {
        self.inner.get_string(path).ok()
    }

    /// Deserializes the subtree at `path` into `T`. An empty path means the whole tree.
    ///
    /// String leaves are coerced to numbers or booleans when `T` asks for them, so values
    /// set as properties bind the same way as typed values from a file. A missing subtree
    /// deserializes from an empty table.
    pub fn extract<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let extracted = if path.is_empty() {
            self.inner.clone().try_deserialize()
        } else {
            match self.inner.get::<T>(path) {
                Err(ConfigError::NotFound(_)) => Config::default().try_deserialize(),
                other => other,
            }
        };
        extracted.with_context(|| format!("invalid configuration at '{}'", path))
    }
}
