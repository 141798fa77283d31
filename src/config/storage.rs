use std::path::PathBuf;

use config::ConfigError;
use serde::Deserialize;
use serde::Serialize;

use crate::constants::RECEIVER_FILES_DIR;
use crate::Error;
use crate::Result;

/// Where the per-channel receiver files live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root data directory; channel files are kept in a subdirectory of it.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

impl StorageConfig {
    pub fn validate(&self) -> Result<()> {
        if self.data_dir.as_os_str().is_empty() {
            return Err(Error::Config(ConfigError::Message(
                "data_dir must not be empty".into(),
            )));
        }

        Ok(())
    }

    pub fn receiver_files_dir(&self) -> PathBuf {
        self.data_dir.join(RECEIVER_FILES_DIR)
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}
