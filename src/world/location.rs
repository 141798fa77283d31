use serde::Deserialize;
use serde::Serialize;

/// A block position in a named world.
///
/// Doubles as the persisted shape of a receiver entry, so the serialized
/// field names are part of the channel-file contract.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WorldLocation {
    pub world: String,
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl WorldLocation {
    pub fn new(
        world: impl Into<String>,
        x: i32,
        y: i32,
        z: i32,
    ) -> Self {
        Self {
            world: world.into(),
            x,
            y,
            z,
        }
    }

    /// The 16x16 column this block falls into.
    pub fn chunk(&self) -> ChunkPos {
        ChunkPos {
            world: self.world.clone(),
            x: self.x >> 4,
            z: self.z >> 4,
        }
    }

    /// The block `distance` steps behind a wall sign facing `facing`.
    pub fn behind(
        &self,
        facing: BlockFace,
        distance: i32,
    ) -> WorldLocation {
        let (dx, dz) = facing.vector();
        WorldLocation {
            world: self.world.clone(),
            x: self.x - dx * distance,
            y: self.y,
            z: self.z - dz * distance,
        }
    }
}

/// Chunk coordinates within a named world.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChunkPos {
    pub world: String,
    pub x: i32,
    pub z: i32,
}

/// Horizontal direction a wall sign can face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockFace {
    North,
    South,
    East,
    West,
}

impl BlockFace {
    /// Unit vector of the direction, as `(x, z)`.
    pub fn vector(self) -> (i32, i32) {
        match self {
            BlockFace::North => (0, -1),
            BlockFace::South => (0, 1),
            BlockFace::West => (-1, 0),
            BlockFace::East => (1, 0),
        }
    }
}
