use std::collections::HashSet;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use tokio::io::AsyncWriteExt;
use tracing::debug;
use tracing::warn;

use crate::constants::FILENAME_FORBIDDEN;
use crate::constants::FILENAME_PLACEHOLDER;
use crate::constants::RECEIVER_FILES_DIR;
use crate::network::Network;
use crate::world::WorldLocation;
use crate::Result;
use crate::StorageError;

/// Durable record of the receiver locations of every channel.
///
/// One UTF-8 JSON array of `{"world", "x", "y", "z"}` objects per
/// `(sanitized channel, owner | global)` pair; owner-scoped channels keep
/// their files in a per-owner subdirectory. A channel that was never saved
/// has no file, which is a normal state and distinct from a load failure.
///
/// Transmitters are never persisted: they are rediscovered lazily through
/// the location cache, so a missing entry costs one extra lookup, while a
/// missing receiver file would mean silent feature loss.
pub struct ReceiverStore {
    root: PathBuf,
    // serializes channel-file writes; at most one in flight per store
    write_gate: tokio::sync::Mutex<()>,
}

impl ReceiverStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            root: data_dir.into().join(RECEIVER_FILES_DIR),
            write_gate: tokio::sync::Mutex::new(()),
        }
    }

    /// Replaces characters a filename must not contain with the
    /// placeholder token; an empty channel becomes the placeholder alone.
    pub fn sanitize_channel(channel: &str) -> String {
        if channel.is_empty() {
            return FILENAME_PLACEHOLDER.to_string();
        }

        let mut sanitized = String::with_capacity(channel.len());
        for c in channel.chars() {
            if FILENAME_FORBIDDEN.contains(&c) {
                sanitized.push_str(FILENAME_PLACEHOLDER);
            } else {
                sanitized.push(c);
            }
        }
        sanitized
    }

    /// Path of a network's channel file. Derived from the case-folded
    /// channel id, so case-insensitive network identity maps onto one file.
    pub fn channel_file(
        &self,
        network: &Network,
    ) -> PathBuf {
        let name = format!("{}.json", Self::sanitize_channel(network.key().id()));
        match network.owner() {
            Some(owner) => self.root.join(owner.to_string()).join(name),
            None => self.root.join(name),
        }
    }

    /// Blocking read of a channel's stored locations.
    ///
    /// `Ok(None)` means the channel was never saved. A malformed entry is
    /// skipped with a warning and the rest of the file still loads.
    pub fn load(
        &self,
        network: &Network,
    ) -> Result<Option<Vec<WorldLocation>>> {
        let path = self.channel_file(network);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StorageError::Io { path, source: e }.into()),
        };

        let parsed: serde_json::Value = serde_json::from_str(&raw).map_err(StorageError::from)?;
        let Some(entries) = parsed.as_array() else {
            return Err(StorageError::NotAnArray { path }.into());
        };

        let mut locations = Vec::with_capacity(entries.len());
        for entry in entries {
            match serde_json::from_value::<WorldLocation>(entry.clone()) {
                Ok(location) => locations.push(location),
                Err(e) => warn!(
                    file = %path.display(),
                    error = %e,
                    "skipping malformed receiver entry"
                ),
            }
        }

        debug!(file = %path.display(), count = locations.len(), "loaded channel file");
        Ok(Some(locations))
    }

    /// Write a channel's receiver set, replacing the previous file.
    ///
    /// Runs on the IO runtime, never on the simulation thread. Locations
    /// are written in sorted order so a channel file is reproducible for a
    /// given set.
    pub async fn save(
        &self,
        network: &Network,
        locations: &HashSet<WorldLocation>,
    ) -> Result<()> {
        let path = self.channel_file(network);
        let mut ordered: Vec<&WorldLocation> = locations.iter().collect();
        ordered.sort();
        let body = serde_json::to_vec(&ordered).map_err(StorageError::from)?;

        let _gate = self.write_gate.lock().await;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| StorageError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }

        let mut file = tokio::fs::File::create(&path)
            .await
            .map_err(|source| StorageError::Io {
                path: path.clone(),
                source,
            })?;
        file.write_all(&body)
            .await
            .map_err(|source| StorageError::Io {
                path: path.clone(),
                source,
            })?;
        file.flush().await.map_err(|source| StorageError::Io {
            path: path.clone(),
            source,
        })?;

        debug!(file = %path.display(), count = locations.len(), "wrote channel file");
        Ok(())
    }
}
