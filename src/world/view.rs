use uuid::Uuid;

#[cfg(test)]
use mockall::automock;

use super::location::ChunkPos;
use super::location::WorldLocation;
use super::location::BlockFace;

/// Point-in-time copy of a sign block's readable state.
#[derive(Debug, Clone)]
pub struct SignSnapshot {
    /// Wall-mounted signs are the only valid wireless endpoints.
    pub is_wall_sign: bool,
    /// The four front-side text lines, verbatim.
    pub lines: [String; 4],
    /// Owner id from the sign's structured metadata, if any was attached.
    pub owner: Option<Uuid>,
    /// Direction the sign face points to.
    pub facing: BlockFace,
}

/// A block able to act on a broadcast level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actuator {
    /// A lectern; `pages` is the page count of the held book, 0 when the
    /// lectern is empty.
    Lectern { pages: u32 },
    Lever { powered: bool },
}

/// Everything the signal core needs from the host world.
///
/// The engine performs all block reads and mutations through this trait and
/// is otherwise free of host types, so tests can drive it with a synthetic
/// in-memory world.
#[cfg_attr(test, automock)]
pub trait WorldView: Send + Sync + 'static {
    /// Cheap shape probe, run before any cache lookup.
    fn is_wall_sign(
        &self,
        location: &WorldLocation,
    ) -> bool;

    /// Full sign read; `None` when the block is not a sign.
    fn sign_at(
        &self,
        location: &WorldLocation,
    ) -> Option<SignSnapshot>;

    /// Redstone power currently applied to the block.
    fn block_power(
        &self,
        location: &WorldLocation,
    ) -> u8;

    fn is_chunk_loaded(
        &self,
        chunk: &ChunkPos,
    ) -> bool;

    /// Whether a world of this name is currently registered.
    fn has_world(
        &self,
        name: &str,
    ) -> bool;

    /// Sign block entities of a chunk, loading the chunk if needed.
    fn signs_in_chunk(
        &self,
        chunk: &ChunkPos,
    ) -> Vec<(WorldLocation, SignSnapshot)>;

    fn actuator_at(
        &self,
        location: &WorldLocation,
    ) -> Option<Actuator>;

    fn set_lever_powered(
        &self,
        location: &WorldLocation,
        powered: bool,
    );

    /// Page index is zero-based; values past the book's range are clamped
    /// by the host.
    fn set_lectern_page(
        &self,
        location: &WorldLocation,
        page: u32,
    );
}
