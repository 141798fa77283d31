//! Recovery scanning: rebuilds the receiver cache and channel files from
//! the signs actually standing in the world, for stores that are missing
//! or stale.

use std::sync::Arc;

use tracing::debug;

use super::classify;
use super::classify::SignRole;
use super::propagation::PropagationEngine;
use crate::network::Receiver;
use crate::world::ChunkPos;
use crate::world::WorldView;

impl<W: WorldView> PropagationEngine<W> {
    /// Walks a chunk's sign block entities and re-registers every receiver
    /// found, exactly as live classification would.
    pub fn scan_chunk(
        &self,
        chunk: &ChunkPos,
    ) {
        for (location, sign) in self.world().signs_in_chunk(chunk) {
            if !sign.is_wall_sign || classify::sign_role(&sign) != Some(SignRole::Receiver) {
                continue;
            }

            let config = self.wireless().load();
            // legacy signs may carry the owner only as text on the fourth line
            let owner = classify::owner_of(&sign, config.use_player_specific_channels, true);
            let network = self
                .registry()
                .resolve(classify::channel_of(&sign), owner);

            let _membership = network.write();
            let receiver = Arc::new(Receiver::new(
                location,
                Arc::clone(&network),
                self.receiver_validity(),
            ));
            self.caches()
                .add_receiver(network.key(), receiver, || self.load_receivers(&network));
            self.persist_receivers(&network);

            debug!(network = %network.id(), "recovered receiver sign");
        }
    }

    /// Chunk-load hook. While compatibility mode is on, every loading
    /// chunk is scanned in the background.
    pub fn on_chunk_loaded(
        &self,
        chunk: &ChunkPos,
    ) {
        if !self.wireless().load().compatibility_mode {
            return;
        }

        let engine = self.clone();
        let chunk = chunk.clone();
        self.io().spawn_blocking(move || engine.scan_chunk(&chunk));
    }

    /// Administrative recovery sweep: scans square perimeter rings
    /// outward from `center`, nearest ring first, off the event thread.
    pub fn scan_around(
        &self,
        center: &ChunkPos,
        radius: i32,
    ) {
        let engine = self.clone();
        let center = center.clone();
        self.io().spawn_blocking(move || {
            for chunk in ring_chunks(&center, radius) {
                engine.scan_chunk(&chunk);
            }
        });
    }
}

/// Chunks of the square rings around `center`, nearest ring first.
pub(super) fn ring_chunks(
    center: &ChunkPos,
    radius: i32,
) -> Vec<ChunkPos> {
    let at = |x: i32, z: i32| ChunkPos {
        world: center.world.clone(),
        x,
        z,
    };

    let mut chunks = Vec::new();
    for dist in 0..=radius {
        if dist == 0 {
            chunks.push(at(center.x, center.z));
            continue;
        }

        // north edge
        for x in (center.x - dist)..=(center.x + dist) {
            chunks.push(at(x, center.z + dist));
        }
        // east edge, skipping the corners the north/south edges cover
        for z in (center.z - dist + 1)..=(center.z + dist - 1) {
            chunks.push(at(center.x + dist, z));
        }
        // south edge
        for x in (center.x - dist)..=(center.x + dist) {
            chunks.push(at(x, center.z - dist));
        }
        // west edge
        for z in (center.z - dist + 1)..=(center.z + dist - 1) {
            chunks.push(at(center.x - dist, z));
        }
    }
    chunks
}
