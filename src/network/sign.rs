use std::hash::Hash;
use std::hash::Hasher;
use std::sync::Arc;
use std::time::Duration;
use std::time::Instant;

use parking_lot::Mutex;

use super::network::Network;
use crate::world::WorldLocation;

/// A sign-backed signal source.
///
/// `network == None` is a cached negative: the location was probed and is
/// definitively not a transmitter, so plain decorative signs are parsed at
/// most once per cache lifetime.
pub struct Transmitter {
    location: WorldLocation,
    network: Option<Arc<Network>>,
    last_power: Mutex<Option<u8>>,
}

impl Transmitter {
    pub fn new(
        location: WorldLocation,
        network: Arc<Network>,
    ) -> Self {
        Self {
            location,
            network: Some(network),
            last_power: Mutex::new(None),
        }
    }

    /// The cached "nothing here" result.
    pub fn not_wireless(location: WorldLocation) -> Self {
        Self {
            location,
            network: None,
            last_power: Mutex::new(None),
        }
    }

    pub fn is_wireless(&self) -> bool {
        self.network.is_some()
    }

    pub fn location(&self) -> &WorldLocation {
        &self.location
    }

    pub fn network(&self) -> Option<&Arc<Network>> {
        self.network.as_ref()
    }

    /// `None` until the first physics event is observed.
    pub fn last_power(&self) -> Option<u8> {
        *self.last_power.lock()
    }

    pub fn record_power(
        &self,
        power: u8,
    ) {
        *self.last_power.lock() = Some(power);
    }
}

// Cache sets dedupe endpoints by block position.
impl PartialEq for Transmitter {
    fn eq(
        &self,
        other: &Self,
    ) -> bool {
        self.location == other.location
    }
}

impl Eq for Transmitter {}

impl Hash for Transmitter {
    fn hash<H: Hasher>(
        &self,
        state: &mut H,
    ) {
        self.location.hash(state);
    }
}

/// A sign-backed signal sink, bound to the network its sign text named when
/// it was last validated.
pub struct Receiver {
    location: WorldLocation,
    network: Arc<Network>,
    last_refreshed: Mutex<Instant>,
    validity: Duration,
}

impl Receiver {
    pub fn new(
        location: WorldLocation,
        network: Arc<Network>,
        validity: Duration,
    ) -> Self {
        Self {
            location,
            network,
            last_refreshed: Mutex::new(Instant::now()),
            validity,
        }
    }

    pub fn location(&self) -> &WorldLocation {
        &self.location
    }

    pub fn network(&self) -> &Arc<Network> {
        &self.network
    }

    /// Past the validity window the engine re-reads the live sign before
    /// trusting the cached channel mapping.
    pub fn is_expired(&self) -> bool {
        self.last_refreshed.lock().elapsed() >= self.validity
    }

    pub fn refresh(&self) {
        *self.last_refreshed.lock() = Instant::now();
    }
}

impl PartialEq for Receiver {
    fn eq(
        &self,
        other: &Self,
    ) -> bool {
        self.location == other.location
    }
}

impl Eq for Receiver {}

impl Hash for Receiver {
    fn hash<H: Hasher>(
        &self,
        state: &mut H,
    ) {
        self.location.hash(state);
    }
}
