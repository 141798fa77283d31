//! The three propagation caches.
//!
//! Each map is safe for concurrent access, but the endpoint sets held
//! inside are not: callers mutate them through the narrow operations below
//! while holding the owning network's lock. Entries carry a last-used stamp;
//! an idle entry is dropped when next touched and the oldest entry is
//! evicted when a map is at capacity.

use std::collections::HashSet;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;
use std::time::Instant;

use dashmap::DashMap;

use crate::config::CacheConfig;
use crate::network::NetworkKey;
use crate::network::Receiver;
use crate::network::Transmitter;
use crate::world::ChunkPos;
use crate::world::WorldLocation;

struct TimedEntry<V> {
    value: V,
    last_used: Instant,
}

impl<V> TimedEntry<V> {
    fn new(value: V) -> Self {
        Self {
            value,
            last_used: Instant::now(),
        }
    }

    fn touch(&mut self) {
        self.last_used = Instant::now();
    }
}

/// Drop-if-idle lookup; touches the entry on a hit.
fn fetch<K, V>(
    map: &DashMap<K, TimedEntry<V>>,
    key: &K,
    idle: Duration,
) -> Option<V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    if let Some(mut entry) = map.get_mut(key) {
        if entry.last_used.elapsed() >= idle {
            drop(entry);
            map.remove(key);
            return None;
        }
        entry.touch();
        return Some(entry.value.clone());
    }
    None
}

/// Insert with capacity enforcement: the least recently used entry makes
/// room when the map is full.
fn insert_bounded<K, V>(
    map: &DashMap<K, TimedEntry<V>>,
    key: K,
    value: V,
    capacity: u64,
) where
    K: Eq + Hash + Clone,
{
    if map.len() as u64 >= capacity && !map.contains_key(&key) {
        let oldest = map
            .iter()
            .min_by_key(|entry| entry.value().last_used)
            .map(|entry| entry.key().clone());
        if let Some(oldest) = oldest {
            map.remove(&oldest);
        }
    }
    map.insert(key, TimedEntry::new(value));
}

/// Transmitter-by-location, transmitters-per-network and
/// receivers-per-network, sized and idle-bounded per [`CacheConfig`].
pub struct SignalCaches {
    transmitter_by_location: DashMap<WorldLocation, TimedEntry<Arc<Transmitter>>>,
    transmitters_per_network: DashMap<NetworkKey, TimedEntry<HashSet<Arc<Transmitter>>>>,
    receivers_per_network: DashMap<NetworkKey, TimedEntry<HashSet<Arc<Receiver>>>>,
    config: CacheConfig,
}

impl SignalCaches {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            transmitter_by_location: DashMap::new(),
            transmitters_per_network: DashMap::new(),
            receivers_per_network: DashMap::new(),
            config,
        }
    }

    /// Location lookup; runs `classify` on a miss and caches the result,
    /// negative classifications included.
    pub fn transmitter_at(
        &self,
        location: &WorldLocation,
        classify: impl FnOnce() -> Arc<Transmitter>,
    ) -> Arc<Transmitter> {
        if let Some(transmitter) = fetch(
            &self.transmitter_by_location,
            location,
            self.config.transmitter_location_idle(),
        ) {
            return transmitter;
        }

        let transmitter = classify();
        insert_bounded(
            &self.transmitter_by_location,
            location.clone(),
            Arc::clone(&transmitter),
            self.config.transmitter_location_capacity,
        );
        transmitter
    }

    /// Cache a freshly placed transmitter under its location.
    pub fn cache_transmitter_location(
        &self,
        transmitter: Arc<Transmitter>,
    ) {
        insert_bounded(
            &self.transmitter_by_location,
            transmitter.location().clone(),
            transmitter,
            self.config.transmitter_location_capacity,
        );
    }

    /// Add a transmitter to its network's set, replacing any previous
    /// entry at the same location. Caller holds the network's write lock.
    pub fn register_transmitter(
        &self,
        key: &NetworkKey,
        transmitter: Arc<Transmitter>,
    ) {
        if let Some(mut entry) = self.transmitters_per_network.get_mut(key) {
            entry.touch();
            entry.value.replace(transmitter);
            return;
        }

        let mut set = HashSet::new();
        set.insert(transmitter);
        insert_bounded(
            &self.transmitters_per_network,
            key.clone(),
            set,
            self.config.network_capacity,
        );
    }

    /// Snapshot of a network's transmitters; empty when uncached. Caller
    /// holds at least the network's read lock.
    pub fn transmitters(
        &self,
        key: &NetworkKey,
    ) -> Vec<Arc<Transmitter>> {
        fetch(&self.transmitters_per_network, key, self.config.network_idle())
            .map(|set| set.into_iter().collect())
            .unwrap_or_default()
    }

    /// Snapshot of a network's receivers. A miss runs `load` on the
    /// calling thread -- file IO and all -- which is acceptable off the
    /// warm propagation path. Caller holds the network's lock.
    pub fn receivers_or_load(
        &self,
        key: &NetworkKey,
        load: impl FnOnce() -> HashSet<Arc<Receiver>>,
    ) -> Vec<Arc<Receiver>> {
        if let Some(set) = fetch(&self.receivers_per_network, key, self.config.network_idle()) {
            return set.into_iter().collect();
        }

        let set = load();
        let snapshot = set.iter().cloned().collect();
        insert_bounded(
            &self.receivers_per_network,
            key.clone(),
            set,
            self.config.network_capacity,
        );
        snapshot
    }

    /// Add a receiver to its network's set, loading the set first if it is
    /// not cached. Caller holds the network's write lock.
    pub fn add_receiver(
        &self,
        key: &NetworkKey,
        receiver: Arc<Receiver>,
        load: impl FnOnce() -> HashSet<Arc<Receiver>>,
    ) {
        if let Some(mut entry) = self.receivers_per_network.get_mut(key) {
            entry.touch();
            entry.value.replace(receiver);
            return;
        }

        let mut set = load();
        set.replace(receiver);
        insert_bounded(
            &self.receivers_per_network,
            key.clone(),
            set,
            self.config.network_capacity,
        );
    }

    /// Remove the receiver cached at `location` from a network's set.
    /// Caller holds the network's write lock.
    pub fn remove_receiver(
        &self,
        key: &NetworkKey,
        location: &WorldLocation,
    ) -> bool {
        if let Some(mut entry) = self.receivers_per_network.get_mut(key) {
            entry.touch();
            let before = entry.value.len();
            entry.value.retain(|receiver| receiver.location() != location);
            return entry.value.len() != before;
        }
        false
    }

    /// Current receiver locations of a network, for persistence. Caller
    /// holds the network's lock.
    pub fn receiver_locations(
        &self,
        key: &NetworkKey,
    ) -> HashSet<WorldLocation> {
        self.receivers_per_network
            .get(key)
            .map(|entry| {
                entry
                    .value
                    .iter()
                    .map(|receiver| receiver.location().clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Drop cached transmitter locations inside an unloading chunk.
    pub fn evict_chunk(
        &self,
        chunk: &ChunkPos,
    ) {
        self.transmitter_by_location
            .retain(|location, _| location.chunk() != *chunk);
    }

    /// Invalidate everything. Cached classifications depend on the
    /// wireless configuration, so any config change ends up here.
    pub fn clear(&self) {
        self.transmitter_by_location.clear();
        self.transmitters_per_network.clear();
        self.receivers_per_network.clear();
    }
}

#[cfg(test)]
mod caches_test;
