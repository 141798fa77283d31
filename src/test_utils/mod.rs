//! Hand-written world double driving the engine tests.

use std::collections::HashMap;
use std::collections::HashSet;

use parking_lot::Mutex;
use uuid::Uuid;

use crate::constants::RECEIVER_TAG;
use crate::constants::TRANSMITTER_TAG;
use crate::world::Actuator;
use crate::world::BlockFace;
use crate::world::ChunkPos;
use crate::world::SignSnapshot;
use crate::world::WorldLocation;
use crate::world::WorldView;

#[derive(Default)]
struct WorldState {
    worlds: HashSet<String>,
    signs: HashMap<WorldLocation, SignSnapshot>,
    power: HashMap<WorldLocation, u8>,
    unloaded_chunks: HashSet<ChunkPos>,
    levers: HashMap<WorldLocation, bool>,
    // pages, current page
    lecterns: HashMap<WorldLocation, (u32, u32)>,
}

/// An in-memory block world: signs, power, levers, lecterns and chunk load
/// state, all mutable from the test body.
pub struct FakeWorld {
    state: Mutex<WorldState>,
}

impl FakeWorld {
    /// A world registry containing only `world`.
    pub fn new() -> Self {
        let fake = Self {
            state: Mutex::new(WorldState::default()),
        };
        fake.add_world("world");
        fake
    }

    pub fn add_world(
        &self,
        name: &str,
    ) {
        self.state.lock().worlds.insert(name.to_string());
    }

    pub fn place_sign(
        &self,
        location: WorldLocation,
        snapshot: SignSnapshot,
    ) {
        self.state.lock().signs.insert(location, snapshot);
    }

    pub fn remove_sign(
        &self,
        location: &WorldLocation,
    ) {
        self.state.lock().signs.remove(location);
    }

    pub fn set_power(
        &self,
        location: &WorldLocation,
        power: u8,
    ) {
        self.state.lock().power.insert(location.clone(), power);
    }

    pub fn set_chunk_loaded(
        &self,
        chunk: ChunkPos,
        loaded: bool,
    ) {
        let mut state = self.state.lock();
        if loaded {
            state.unloaded_chunks.remove(&chunk);
        } else {
            state.unloaded_chunks.insert(chunk);
        }
    }

    pub fn place_lever(
        &self,
        location: WorldLocation,
    ) {
        self.state.lock().levers.insert(location, false);
    }

    pub fn lever_powered(
        &self,
        location: &WorldLocation,
    ) -> Option<bool> {
        self.state.lock().levers.get(location).copied()
    }

    pub fn place_lectern(
        &self,
        location: WorldLocation,
        pages: u32,
    ) {
        self.state.lock().lecterns.insert(location, (pages, 0));
    }

    pub fn lectern_page(
        &self,
        location: &WorldLocation,
    ) -> Option<u32> {
        self.state
            .lock()
            .lecterns
            .get(location)
            .map(|(_, page)| *page)
    }
}

impl Default for FakeWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl WorldView for FakeWorld {
    fn is_wall_sign(
        &self,
        location: &WorldLocation,
    ) -> bool {
        self.state
            .lock()
            .signs
            .get(location)
            .map(|sign| sign.is_wall_sign)
            .unwrap_or(false)
    }

    fn sign_at(
        &self,
        location: &WorldLocation,
    ) -> Option<SignSnapshot> {
        self.state.lock().signs.get(location).cloned()
    }

    fn block_power(
        &self,
        location: &WorldLocation,
    ) -> u8 {
        self.state.lock().power.get(location).copied().unwrap_or(0)
    }

    fn is_chunk_loaded(
        &self,
        chunk: &ChunkPos,
    ) -> bool {
        !self.state.lock().unloaded_chunks.contains(chunk)
    }

    fn has_world(
        &self,
        name: &str,
    ) -> bool {
        self.state.lock().worlds.contains(name)
    }

    fn signs_in_chunk(
        &self,
        chunk: &ChunkPos,
    ) -> Vec<(WorldLocation, SignSnapshot)> {
        self.state
            .lock()
            .signs
            .iter()
            .filter(|(location, _)| location.chunk() == *chunk)
            .map(|(location, sign)| (location.clone(), sign.clone()))
            .collect()
    }

    fn actuator_at(
        &self,
        location: &WorldLocation,
    ) -> Option<Actuator> {
        let state = self.state.lock();
        if let Some(powered) = state.levers.get(location) {
            return Some(Actuator::Lever { powered: *powered });
        }
        if let Some((pages, _)) = state.lecterns.get(location) {
            return Some(Actuator::Lectern { pages: *pages });
        }
        None
    }

    fn set_lever_powered(
        &self,
        location: &WorldLocation,
        powered: bool,
    ) {
        if let Some(lever) = self.state.lock().levers.get_mut(location) {
            *lever = powered;
        }
    }

    fn set_lectern_page(
        &self,
        location: &WorldLocation,
        page: u32,
    ) {
        if let Some((_, current)) = self.state.lock().lecterns.get_mut(location) {
            *current = page;
        }
    }
}

/// A wall sign carrying the given bracket-wrapped technical tag.
pub fn tagged_sign(
    tag: &str,
    channel: &str,
    owner: Option<Uuid>,
    facing: BlockFace,
) -> SignSnapshot {
    SignSnapshot {
        is_wall_sign: true,
        lines: [
            String::new(),
            format!("[{tag}]"),
            channel.to_string(),
            String::new(),
        ],
        owner,
        facing,
    }
}

pub fn transmitter_sign(channel: &str) -> SignSnapshot {
    tagged_sign(TRANSMITTER_TAG, channel, None, BlockFace::North)
}

pub fn receiver_sign(channel: &str) -> SignSnapshot {
    tagged_sign(RECEIVER_TAG, channel, None, BlockFace::North)
}

/// An ordinary decorative sign.
pub fn plain_sign(text: &str) -> SignSnapshot {
    SignSnapshot {
        is_wall_sign: true,
        lines: [
            text.to_string(),
            text.to_string(),
            String::new(),
            String::new(),
        ],
        owner: None,
        facing: BlockFace::North,
    }
}
