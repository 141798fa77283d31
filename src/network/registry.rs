use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use uuid::Uuid;

use super::network::Network;
use super::network::NetworkKey;

/// Resolves `(channel, owner)` pairs to canonical [`Network`] instances.
///
/// The coarse map lock is held for the lookup-or-insert only; callers then
/// transition to the returned network's own lock, always in that order. No
/// network lock is ever acquired while the map lock is held.
pub struct NetworkRegistry {
    networks: Mutex<HashMap<NetworkKey, Arc<Network>>>,
}

impl NetworkRegistry {
    pub fn new() -> Self {
        Self {
            networks: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the canonical network for the pair, creating it lazily.
    pub fn resolve(
        &self,
        channel: &str,
        owner: Option<Uuid>,
    ) -> Arc<Network> {
        let key = NetworkKey::new(channel, owner);
        let mut networks = self.networks.lock();
        Arc::clone(
            networks
                .entry(key)
                .or_insert_with(|| Arc::new(Network::new(channel, owner))),
        )
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.networks.lock().len()
    }
}

impl Default for NetworkRegistry {
    fn default() -> Self {
        Self::new()
    }
}
