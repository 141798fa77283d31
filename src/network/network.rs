use std::fmt;
use std::hash::Hash;
use std::hash::Hasher;

use parking_lot::RwLock;
use parking_lot::RwLockReadGuard;
use parking_lot::RwLockWriteGuard;
use uuid::Uuid;

/// Identity of a channel: case-folded channel id plus exact owner.
///
/// This is the key type of the registry and of the per-network caches.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NetworkKey {
    id: String,
    owner: Option<Uuid>,
}

impl NetworkKey {
    pub fn new(
        channel: &str,
        owner: Option<Uuid>,
    ) -> Self {
        Self {
            id: channel.to_lowercase(),
            owner,
        }
    }

    /// Case-folded channel id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// `None` is the global channel.
    pub fn owner(&self) -> Option<Uuid> {
        self.owner
    }
}

/// The owner-scoped identity of a channel, and the lock serializing all
/// mutation of its transmitter/receiver membership.
///
/// Two networks are equal iff the channel id matches case-insensitively and
/// the owner matches exactly; live signal state never participates in
/// identity.
pub struct Network {
    /// Channel text as first seen, kept for display and logging.
    id: String,
    key: NetworkKey,
    lock: RwLock<()>,
}

impl Network {
    pub fn new(
        channel: impl Into<String>,
        owner: Option<Uuid>,
    ) -> Self {
        let id = channel.into();
        let key = NetworkKey::new(&id, owner);
        Self {
            id,
            key,
            lock: RwLock::new(()),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn owner(&self) -> Option<Uuid> {
        self.key.owner()
    }

    pub fn key(&self) -> &NetworkKey {
        &self.key
    }

    /// Shared access to the membership sets.
    pub fn read(&self) -> RwLockReadGuard<'_, ()> {
        self.lock.read()
    }

    /// Exclusive access for structural changes. Taken after the registry
    /// lock, never before it.
    pub fn write(&self) -> RwLockWriteGuard<'_, ()> {
        self.lock.write()
    }
}

impl PartialEq for Network {
    fn eq(
        &self,
        other: &Self,
    ) -> bool {
        self.key == other.key
    }
}

impl Eq for Network {}

impl Hash for Network {
    fn hash<H: Hasher>(
        &self,
        state: &mut H,
    ) {
        self.key.hash(state);
    }
}

impl fmt::Debug for Network {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("Network")
            .field("id", &self.id)
            .field("owner", &self.key.owner())
            .finish()
    }
}
