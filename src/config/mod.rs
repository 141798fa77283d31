//! Configuration of the wireless core.
//!
//! Settings load in priority order: hardcoded defaults, an optional config
//! file, then `REDWIRE`-prefixed environment variables on top.

mod cache;
mod storage;
mod wireless;

pub use cache::*;
pub use storage::*;
pub use wireless::*;

use std::env;

use config::Config;
use config::Environment;
use config::File;
use serde::Deserialize;
use serde::Serialize;

use crate::Result;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Hot-swappable behavior switches
    #[serde(default)]
    pub wireless: WirelessConfig,

    /// Endpoint cache bounds and validity windows
    #[serde(default)]
    pub cache: CacheConfig,

    /// Channel-file locations
    #[serde(default)]
    pub storage: StorageConfig,
}

impl Settings {
    /// Load configuration from defaults, the optional `config/redwire`
    /// file (or the file named by `REDWIRE_CONFIG`), and the environment.
    pub fn new() -> Result<Self> {
        let mut builder = Config::builder().add_source(File::with_name("config/redwire").required(false));

        if let Ok(path) = env::var("REDWIRE_CONFIG") {
            builder = builder.add_source(File::with_name(&path).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix("REDWIRE")
                .separator("__")
                .ignore_empty(true)
                .try_parsing(true),
        );

        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Overlay an explicit config file on top of this configuration.
    pub fn with_override_config(
        &self,
        path: &str,
    ) -> Result<Self> {
        let settings: Settings = Config::builder()
            .add_source(Config::try_from(self)?)
            .add_source(File::with_name(path).required(true))
            .build()?
            .try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        self.cache.validate()?;
        self.storage.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod config_test;
