use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use uuid::Uuid;

use super::scanner::ring_chunks;
use super::*;
use crate::config::Settings;
use crate::constants::RECEIVER_TAG;
use crate::test_utils::plain_sign;
use crate::test_utils::receiver_sign;
use crate::test_utils::tagged_sign;
use crate::test_utils::transmitter_sign;
use crate::test_utils::FakeWorld;
use crate::world::BlockFace;
use crate::world::ChunkPos;
use crate::world::WorldLocation;

fn loc(
    x: i32,
    z: i32,
) -> WorldLocation {
    WorldLocation::new("world", x, 64, z)
}

fn chunk(
    x: i32,
    z: i32,
) -> ChunkPos {
    ChunkPos {
        world: "world".to_string(),
        x,
        z,
    }
}

fn engine_in(
    world: Arc<FakeWorld>,
    data_dir: &Path,
) -> PropagationEngine<FakeWorld> {
    let mut settings = Settings::default();
    settings.storage.data_dir = data_dir.to_path_buf();
    PropagationEngine::new(world, settings, Handle::current())
}

async fn settle() {
    tokio::time::sleep(Duration::from_millis(250)).await;
}

#[test]
fn ring_chunks_should_cover_the_center_alone_at_radius_zero() {
    assert_eq!(ring_chunks(&chunk(3, -2), 0), vec![chunk(3, -2)]);
}

#[test]
fn ring_chunks_should_cover_the_full_square_without_duplicates() {
    let chunks = ring_chunks(&chunk(0, 0), 2);
    let unique: HashSet<ChunkPos> = chunks.iter().cloned().collect();

    // a 5x5 square around the center
    assert_eq!(chunks.len(), 25);
    assert_eq!(unique.len(), 25);
    for x in -2..=2 {
        for z in -2..=2 {
            assert!(unique.contains(&chunk(x, z)), "missing chunk ({x}, {z})");
        }
    }
}

#[test]
fn ring_chunks_should_walk_nearest_rings_first() {
    let chunks = ring_chunks(&chunk(0, 0), 2);

    assert_eq!(chunks[0], chunk(0, 0));
    // the first ring (8 chunks) comes before any second-ring chunk
    for near in &chunks[1..9] {
        assert!(near.x.abs() <= 1 && near.z.abs() <= 1);
    }
    for far in &chunks[9..] {
        assert!(far.x.abs() == 2 || far.z.abs() == 2);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn scan_chunk_should_recover_receivers_from_world_state() {
    let world = Arc::new(FakeWorld::new());
    let dir = tempfile::tempdir().unwrap();
    let engine = engine_in(Arc::clone(&world), dir.path());

    let receiver = loc(10, 0);
    let lever = receiver.behind(BlockFace::North, 2);
    world.place_sign(receiver.clone(), receiver_sign("gate"));
    world.place_lever(lever.clone());
    // bystanders the scan must ignore
    world.place_sign(loc(1, 1), plain_sign("welcome"));
    world.place_sign(loc(2, 2), transmitter_sign("gate"));

    engine.scan_chunk(&receiver.chunk());

    settle().await;
    let file = dir.path().join("receiverFiles").join("gate.json");
    let raw = std::fs::read_to_string(&file).expect("channel file exists");
    let stored: Vec<WorldLocation> = serde_json::from_str(&raw).unwrap();
    assert_eq!(stored, vec![receiver.clone()]);

    // the recovered receiver is live without any placement event
    let transmitter = loc(2, 2);
    world.set_power(&transmitter, 15);
    engine.on_power_changed(&transmitter);
    assert_eq!(world.lever_powered(&lever), Some(true));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn scan_chunk_should_read_legacy_owners_off_the_fourth_line() {
    let world = Arc::new(FakeWorld::new());
    let dir = tempfile::tempdir().unwrap();
    let engine = engine_in(Arc::clone(&world), dir.path());

    let owner = Uuid::new_v4();
    let receiver = loc(10, 0);
    let mut sign = tagged_sign(RECEIVER_TAG, "door", None, BlockFace::North);
    sign.lines[3] = owner.to_string();
    world.place_sign(receiver.clone(), sign);

    engine.scan_chunk(&receiver.chunk());

    settle().await;
    let file = dir
        .path()
        .join("receiverFiles")
        .join(owner.to_string())
        .join("door.json");
    assert!(file.is_file());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn chunk_loads_should_only_scan_while_compatibility_mode_is_on() {
    let world = Arc::new(FakeWorld::new());
    let dir = tempfile::tempdir().unwrap();
    let engine = engine_in(Arc::clone(&world), dir.path());

    let receiver = loc(10, 0);
    world.place_sign(receiver.clone(), receiver_sign("gate"));
    let file = dir.path().join("receiverFiles").join("gate.json");

    engine.on_chunk_loaded(&receiver.chunk());
    settle().await;
    assert!(!file.exists());

    let mut config = (*engine.wireless_config()).clone();
    config.compatibility_mode = true;
    engine.update_wireless_config(config);

    engine.on_chunk_loaded(&receiver.chunk());
    settle().await;
    assert!(file.is_file());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn scan_around_should_sweep_every_ring_chunk() {
    let world = Arc::new(FakeWorld::new());
    let dir = tempfile::tempdir().unwrap();
    let engine = engine_in(Arc::clone(&world), dir.path());

    // receivers two chunks apart, both within the sweep radius
    let near = loc(10, 0);
    let far = loc(40, 40);
    world.place_sign(near.clone(), receiver_sign("ring"));
    world.place_sign(far.clone(), receiver_sign("ring"));

    engine.scan_around(&chunk(0, 0), 3);

    settle().await;
    let file = dir.path().join("receiverFiles").join("ring.json");
    let raw = std::fs::read_to_string(&file).expect("channel file exists");
    let stored: HashSet<WorldLocation> = serde_json::from_str::<Vec<WorldLocation>>(&raw)
        .unwrap()
        .into_iter()
        .collect();
    assert_eq!(stored, [near, far].into_iter().collect());
}
