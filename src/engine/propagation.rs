use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use parking_lot::RwLockWriteGuard;
use tokio::runtime::Handle;
use tracing::debug;
use tracing::error;
use tracing::warn;
use uuid::Uuid;

use super::classify;
use super::classify::SignRole;
use crate::cache::SignalCaches;
use crate::config::Settings;
use crate::config::WirelessConfig;
use crate::constants::MAX_POWER;
use crate::network::Network;
use crate::network::NetworkRegistry;
use crate::network::Receiver;
use crate::network::Transmitter;
use crate::storage::ReceiverStore;
use crate::world::Actuator;
use crate::world::ChunkPos;
use crate::world::SignSnapshot;
use crate::world::WorldLocation;
use crate::world::WorldView;

/// Outcome of a sign-placement event, for the host adapter to act on
/// (player feedback, breaking a misplaced sign).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementOutcome {
    /// The sign joined a network under the given role.
    Registered(SignRole),
    /// Carries a wireless tag but is not mounted on a wall.
    RejectedNotWallSign,
    /// A plain sign; nothing to do.
    NotWireless,
}

/// The application context of the wireless core.
///
/// Owns the registry, the caches, the receiver store and the live wireless
/// settings, and is handed to whoever adapts host events -- there is no
/// global state. Clones are cheap handles onto the same state. Event
/// handlers run on the host's simulation thread; every file write and
/// chunk scan is dispatched onto `io`.
pub struct PropagationEngine<W: WorldView> {
    world: Arc<W>,
    registry: Arc<NetworkRegistry>,
    caches: Arc<SignalCaches>,
    store: Arc<ReceiverStore>,
    wireless: Arc<ArcSwap<WirelessConfig>>,
    receiver_validity: Duration,
    io: Handle,
}

impl<W: WorldView> Clone for PropagationEngine<W> {
    fn clone(&self) -> Self {
        Self {
            world: Arc::clone(&self.world),
            registry: Arc::clone(&self.registry),
            caches: Arc::clone(&self.caches),
            store: Arc::clone(&self.store),
            wireless: Arc::clone(&self.wireless),
            receiver_validity: self.receiver_validity,
            io: self.io.clone(),
        }
    }
}

impl<W: WorldView> PropagationEngine<W> {
    pub fn new(
        world: Arc<W>,
        settings: Settings,
        io: Handle,
    ) -> Self {
        Self {
            world,
            registry: Arc::new(NetworkRegistry::new()),
            caches: Arc::new(SignalCaches::new(settings.cache.clone())),
            store: Arc::new(ReceiverStore::new(settings.storage.data_dir.clone())),
            wireless: Arc::new(ArcSwap::from_pointee(settings.wireless)),
            receiver_validity: settings.cache.receiver_validity(),
            io,
        }
    }

    pub fn wireless_config(&self) -> Arc<WirelessConfig> {
        self.wireless.load_full()
    }

    /// Swap the wireless settings. Cached classifications depend on them,
    /// so the caches are dropped wholesale.
    pub fn update_wireless_config(
        &self,
        config: WirelessConfig,
    ) {
        self.wireless.store(Arc::new(config));
        self.caches.clear();
    }

    /// Invalidate every cache; used on reload and shutdown.
    pub fn clear_caches(&self) {
        self.caches.clear();
    }

    /// A redstone physics event touched the block at `location`.
    ///
    /// Resolves the transmitter, folds the new power level into its
    /// network's aggregate and, when this transmitter is the loudest,
    /// pushes the broadcast level to every cached receiver -- repairing
    /// stale or relocated receivers on the way.
    pub fn on_power_changed(
        &self,
        location: &WorldLocation,
    ) {
        // fail fast for the overwhelming majority of physics events
        if !self.world.is_wall_sign(location) {
            return;
        }

        let transmitter = self
            .caches
            .transmitter_at(location, || self.classify_transmitter(location));
        let Some(network) = transmitter.network().map(Arc::clone) else {
            return;
        };

        let mut membership = network.write();

        let power = self.world.block_power(location);
        if transmitter.last_power() != Some(power) {
            transmitter.record_power(power);
        }
        // Idle eviction may have emptied the bucket; re-registering keeps
        // the aggregate grounded in at least this transmitter.
        self.caches
            .register_transmitter(network.key(), Arc::clone(&transmitter));

        let highest = self.highest_power(&network);
        if power >= highest {
            debug!(network = %network.id(), level = highest, "broadcasting power level");
            membership = self.broadcast(&network, membership, highest);
        }
        drop(membership);
    }

    /// A sign's text was just written at `location` by `placer`.
    ///
    /// Registers the endpoint with its network and, for receivers, writes
    /// the channel file.
    pub fn on_sign_placed(
        &self,
        location: &WorldLocation,
        placer: Option<Uuid>,
    ) -> PlacementOutcome {
        let Some(sign) = self.world.sign_at(location) else {
            return PlacementOutcome::NotWireless;
        };
        let Some(role) = classify::sign_role(&sign) else {
            return PlacementOutcome::NotWireless;
        };
        if !sign.is_wall_sign {
            return PlacementOutcome::RejectedNotWallSign;
        }

        let owner = if self.wireless.load().use_player_specific_channels {
            placer
        } else {
            None
        };
        let network = self.registry.resolve(classify::channel_of(&sign), owner);

        let _membership = network.write();
        match role {
            SignRole::Receiver => {
                let receiver = Arc::new(Receiver::new(
                    location.clone(),
                    Arc::clone(&network),
                    self.receiver_validity,
                ));
                self.caches
                    .add_receiver(network.key(), receiver, || self.load_receivers(&network));
                self.persist_receivers(&network);
            }
            SignRole::Transmitter => {
                let transmitter =
                    Arc::new(Transmitter::new(location.clone(), Arc::clone(&network)));
                self.caches
                    .register_transmitter(network.key(), Arc::clone(&transmitter));
                self.caches.cache_transmitter_location(transmitter);
            }
        }

        debug!(network = %network.id(), role = ?role, "registered wireless sign");
        PlacementOutcome::Registered(role)
    }

    /// Cached classifications for blocks in an unloading chunk are dead
    /// weight; drop them.
    pub fn on_chunk_unloaded(
        &self,
        chunk: &ChunkPos,
    ) {
        self.caches.evict_chunk(chunk);
    }

    /// Classification on a transmitter-location cache miss. Negative
    /// results are cached too, so plain signs are parsed at most once.
    fn classify_transmitter(
        &self,
        location: &WorldLocation,
    ) -> Arc<Transmitter> {
        let Some(sign) = self.world.sign_at(location) else {
            return Arc::new(Transmitter::not_wireless(location.clone()));
        };
        if !sign.is_wall_sign || classify::sign_role(&sign) != Some(SignRole::Transmitter) {
            return Arc::new(Transmitter::not_wireless(location.clone()));
        }

        let config = self.wireless.load();
        let owner = classify::owner_of(&sign, config.use_player_specific_channels, false);
        let network = self.registry.resolve(classify::channel_of(&sign), owner);

        let transmitter = Arc::new(Transmitter::new(location.clone(), Arc::clone(&network)));
        let _membership = network.write();
        self.caches
            .register_transmitter(network.key(), Arc::clone(&transmitter));
        transmitter
    }

    /// Highest power any transmitter of the network last reported,
    /// saturating at [`MAX_POWER`] without visiting the rest. Caller holds
    /// the network's lock.
    fn highest_power(
        &self,
        network: &Network,
    ) -> u8 {
        let mut highest = 0;
        for transmitter in self.caches.transmitters(network.key()) {
            if let Some(power) = transmitter.last_power() {
                if power >= MAX_POWER {
                    return MAX_POWER;
                }
                if power > highest {
                    highest = power;
                }
            }
        }
        highest
    }

    /// Push `level` to every cached receiver of the network.
    ///
    /// Receivers in unloaded chunks are skipped. A receiver whose block no
    /// longer is a wall sign is dropped and the shrunk set persisted; an
    /// expired receiver has its live text re-validated and is rebound to
    /// the network it now names, restarting the walk since the snapshot no
    /// longer matches the mutated set. Takes and returns the network's
    /// write guard: a migration briefly releases it to take the target
    /// network's lock, keeping lock acquisition one-at-a-time.
    fn broadcast<'a>(
        &self,
        network: &'a Arc<Network>,
        mut membership: RwLockWriteGuard<'a, ()>,
        level: u8,
    ) -> RwLockWriteGuard<'a, ()> {
        'scan: loop {
            let receivers = self
                .caches
                .receivers_or_load(network.key(), || self.load_receivers(network));

            for receiver in receivers {
                let location = receiver.location().clone();
                if !self.world.is_chunk_loaded(&location.chunk()) {
                    continue;
                }

                let live_sign = match self.world.sign_at(&location) {
                    Some(sign) if sign.is_wall_sign => sign,
                    _ => {
                        // sign gone; forget the receiver
                        self.caches.remove_receiver(network.key(), &location);
                        self.persist_receivers(network);
                        continue;
                    }
                };

                if receiver.is_expired() {
                    match classify::sign_role(&live_sign) {
                        Some(SignRole::Receiver) => {
                            let config = self.wireless.load();
                            let owner = classify::owner_of(
                                &live_sign,
                                config.use_player_specific_channels,
                                false,
                            );
                            let live = self
                                .registry
                                .resolve(classify::channel_of(&live_sign), owner);

                            if live.key() == receiver.network().key() {
                                receiver.refresh();
                            } else {
                                debug!(
                                    from = %receiver.network().id(),
                                    to = %live.id(),
                                    "receiver sign changed channel, migrating"
                                );
                                let rebound = Arc::new(Receiver::new(
                                    location,
                                    Arc::clone(&live),
                                    self.receiver_validity,
                                ));
                                membership = self.migrate(network, membership, &live, rebound);
                                continue 'scan;
                            }
                        }
                        _ => {
                            // tag no longer present
                            self.caches.remove_receiver(network.key(), &location);
                            self.persist_receivers(network);
                            continue;
                        }
                    }
                }

                let claimed = Arc::clone(receiver.network());
                if claimed.key().id() == network.key().id() {
                    let config = self.wireless.load();
                    if !config.use_player_specific_channels || claimed.owner() == network.owner() {
                        self.actuate(&live_sign, &location, level);
                    } else {
                        membership =
                            self.migrate(network, membership, &claimed, Arc::clone(&receiver));
                    }
                } else {
                    membership =
                        self.migrate(network, membership, &claimed, Arc::clone(&receiver));
                }
            }

            break;
        }

        membership
    }

    /// Move a receiver out of `from`'s bucket into `to`'s, persisting both
    /// channel files. `from`'s lock is held only long enough to remove the
    /// entry; the receiver is briefly in neither bucket while `to`'s lock
    /// is taken.
    fn migrate<'a>(
        &self,
        from: &'a Arc<Network>,
        membership: RwLockWriteGuard<'a, ()>,
        to: &Arc<Network>,
        receiver: Arc<Receiver>,
    ) -> RwLockWriteGuard<'a, ()> {
        self.caches.remove_receiver(from.key(), receiver.location());
        self.persist_receivers(from);
        drop(membership);

        {
            let _membership = to.write();
            self.caches
                .add_receiver(to.key(), receiver, || self.load_receivers(to));
            self.persist_receivers(to);
        }

        from.write()
    }

    /// Push `level` to the receiver's paired actuator. A lectern directly
    /// behind the sign takes precedence; only without one does the lever
    /// slot two blocks behind get considered.
    fn actuate(
        &self,
        sign: &SignSnapshot,
        location: &WorldLocation,
        level: u8,
    ) {
        let lectern_spot = location.behind(sign.facing, 1);
        if let Some(Actuator::Lectern { pages }) = self.world.actuator_at(&lectern_spot) {
            if level == 0 {
                // reserved; a page for "no signal" has no defined meaning yet
                return;
            }
            if pages > 1 {
                self.world
                    .set_lectern_page(&lectern_spot, page_for_level(level, pages));
            }
            return;
        }

        let lever_spot = location.behind(sign.facing, 2);
        if let Some(Actuator::Lever { .. }) = self.world.actuator_at(&lever_spot) {
            self.world.set_lever_powered(&lever_spot, level > 0);
        }
    }

    /// Blocking channel-file read, invoked on receiver-cache misses.
    /// Entries naming unknown worlds are dropped; a load failure degrades
    /// to an empty set and never propagates.
    pub(super) fn load_receivers(
        &self,
        network: &Arc<Network>,
    ) -> HashSet<Arc<Receiver>> {
        let stored = match self.store.load(network) {
            Ok(Some(locations)) => locations,
            Ok(None) => return HashSet::new(),
            Err(e) => {
                warn!(network = %network.id(), error = %e, "could not load channel file");
                return HashSet::new();
            }
        };

        stored
            .into_iter()
            .filter(|location| {
                if self.world.has_world(&location.world) {
                    true
                } else {
                    warn!(world = %location.world, "dropping receiver in unknown world");
                    false
                }
            })
            .map(|location| {
                Arc::new(Receiver::new(
                    location,
                    Arc::clone(network),
                    self.receiver_validity,
                ))
            })
            .collect()
    }

    /// Hand the network's receiver locations to a background write. The set
    /// is read when the write runs, so overlapping writes to one channel
    /// settle on the latest membership. Fire-and-forget: a failed write is
    /// logged, not retried, and never reaches the event path.
    pub(super) fn persist_receivers(
        &self,
        network: &Arc<Network>,
    ) {
        let caches = Arc::clone(&self.caches);
        let store = Arc::clone(&self.store);
        let network = Arc::clone(network);
        self.io.spawn(async move {
            let locations = caches.receiver_locations(network.key());
            if let Err(e) = store.save(&network, &locations).await {
                error!(
                    network = %network.id(),
                    error = %e,
                    "failed to write channel file, receiver data will be lost"
                );
            }
        });
    }

    pub(super) fn world(&self) -> &Arc<W> {
        &self.world
    }

    pub(super) fn registry(&self) -> &NetworkRegistry {
        &self.registry
    }

    pub(super) fn caches(&self) -> &SignalCaches {
        &self.caches
    }

    pub(super) fn wireless(&self) -> &ArcSwap<WirelessConfig> {
        &self.wireless
    }

    pub(super) fn receiver_validity(&self) -> Duration {
        self.receiver_validity
    }

    pub(super) fn io(&self) -> &Handle {
        &self.io
    }
}

/// Maps power 1..=15 onto a zero-based page index proportional to the page
/// range of the held book.
fn page_for_level(
    level: u8,
    pages: u32,
) -> u32 {
    let span = f64::from(pages - 1);
    ((f64::from(level) - 1.0) / 14.0 * span).ceil() as u32
}
