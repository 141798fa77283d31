use std::time::Duration;

use config::ConfigError;
use serde::Deserialize;
use serde::Serialize;

use crate::Error;
use crate::Result;

/// Bounds of the three endpoint caches and the receiver validity window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum number of cached location → transmitter classifications.
    #[serde(default = "default_transmitter_location_capacity")]
    pub transmitter_location_capacity: u64,

    /// Seconds a location classification may sit unused before eviction.
    #[serde(default = "default_transmitter_location_idle_secs")]
    pub transmitter_location_idle_secs: u64,

    /// Maximum number of networks with cached endpoint sets, per cache.
    #[serde(default = "default_network_capacity")]
    pub network_capacity: u64,

    /// Seconds a network's endpoint set may sit unused before eviction.
    #[serde(default = "default_network_idle_secs")]
    pub network_idle_secs: u64,

    /// Seconds a receiver's validation is trusted before the engine
    /// re-reads its live sign text.
    #[serde(default = "default_receiver_validity_secs")]
    pub receiver_validity_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            transmitter_location_capacity: default_transmitter_location_capacity(),
            transmitter_location_idle_secs: default_transmitter_location_idle_secs(),
            network_capacity: default_network_capacity(),
            network_idle_secs: default_network_idle_secs(),
            receiver_validity_secs: default_receiver_validity_secs(),
        }
    }
}

impl CacheConfig {
    pub fn validate(&self) -> Result<()> {
        if self.transmitter_location_capacity == 0 {
            return Err(Error::Config(ConfigError::Message(
                "transmitter_location_capacity must be greater than 0".into(),
            )));
        }

        if self.network_capacity == 0 {
            return Err(Error::Config(ConfigError::Message(
                "network_capacity must be greater than 0".into(),
            )));
        }

        if self.transmitter_location_idle_secs == 0 || self.network_idle_secs == 0 {
            return Err(Error::Config(ConfigError::Message(
                "cache idle windows must be at least 1s".into(),
            )));
        }

        Ok(())
    }

    pub fn transmitter_location_idle(&self) -> Duration {
        Duration::from_secs(self.transmitter_location_idle_secs)
    }

    pub fn network_idle(&self) -> Duration {
        Duration::from_secs(self.network_idle_secs)
    }

    pub fn receiver_validity(&self) -> Duration {
        Duration::from_secs(self.receiver_validity_secs)
    }
}

fn default_transmitter_location_capacity() -> u64 {
    500
}

// 5 minutes
fn default_transmitter_location_idle_secs() -> u64 {
    300
}

fn default_network_capacity() -> u64 {
    1000
}

// 40 minutes
fn default_network_idle_secs() -> u64 {
    2400
}

// 5 minutes
fn default_receiver_validity_secs() -> u64 {
    300
}
