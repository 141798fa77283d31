use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use super::*;
use crate::config::CacheConfig;
use crate::network::Network;
use crate::network::Receiver;
use crate::network::Transmitter;
use crate::world::WorldLocation;

fn caches_with(config: CacheConfig) -> SignalCaches {
    SignalCaches::new(config)
}

fn small_config() -> CacheConfig {
    CacheConfig {
        transmitter_location_capacity: 2,
        transmitter_location_idle_secs: 60,
        network_capacity: 2,
        network_idle_secs: 60,
        receiver_validity_secs: 300,
    }
}

fn network(channel: &str) -> Arc<Network> {
    Arc::new(Network::new(channel, None))
}

fn location(x: i32) -> WorldLocation {
    WorldLocation::new("world", x, 64, 0)
}

fn transmitter(
    net: &Arc<Network>,
    x: i32,
) -> Arc<Transmitter> {
    Arc::new(Transmitter::new(location(x), Arc::clone(net)))
}

fn receiver(
    net: &Arc<Network>,
    x: i32,
) -> Arc<Receiver> {
    Arc::new(Receiver::new(
        location(x),
        Arc::clone(net),
        Duration::from_secs(300),
    ))
}

#[test]
fn transmitter_at_should_classify_once_and_serve_from_cache() {
    let caches = caches_with(small_config());
    let net = network("gate");
    let classified = AtomicUsize::new(0);

    let classify = || {
        classified.fetch_add(1, Ordering::SeqCst);
        transmitter(&net, 0)
    };

    let first = caches.transmitter_at(&location(0), classify);
    let second = caches.transmitter_at(&location(0), || unreachable!("must hit the cache"));

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(classified.load(Ordering::SeqCst), 1);
}

#[test]
fn transmitter_at_should_evict_the_least_recently_used_entry_at_capacity() {
    let caches = caches_with(small_config());
    let net = network("gate");

    caches.transmitter_at(&location(0), || transmitter(&net, 0));
    caches.transmitter_at(&location(1), || transmitter(&net, 1));
    // touch 0 so 1 becomes the oldest
    caches.transmitter_at(&location(0), || unreachable!());
    // at capacity: inserting 2 pushes 1 out
    caches.transmitter_at(&location(2), || transmitter(&net, 2));

    caches.transmitter_at(&location(0), || unreachable!("still cached"));
    let reclassified = AtomicUsize::new(0);
    caches.transmitter_at(&location(1), || {
        reclassified.fetch_add(1, Ordering::SeqCst);
        transmitter(&net, 1)
    });
    assert_eq!(reclassified.load(Ordering::SeqCst), 1);
}

#[test]
fn transmitter_at_should_drop_idle_entries() {
    let config = CacheConfig {
        transmitter_location_idle_secs: 1,
        ..small_config()
    };
    let caches = caches_with(config);
    let net = network("gate");

    caches.transmitter_at(&location(0), || transmitter(&net, 0));
    std::thread::sleep(Duration::from_millis(1100));

    let reclassified = AtomicUsize::new(0);
    caches.transmitter_at(&location(0), || {
        reclassified.fetch_add(1, Ordering::SeqCst);
        transmitter(&net, 0)
    });
    assert_eq!(reclassified.load(Ordering::SeqCst), 1);
}

#[test]
fn register_transmitter_should_replace_the_entry_at_the_same_location() {
    let caches = caches_with(small_config());
    let net = network("gate");

    let stale = transmitter(&net, 0);
    stale.record_power(15);
    let fresh = transmitter(&net, 0);

    caches.register_transmitter(net.key(), Arc::clone(&stale));
    caches.register_transmitter(net.key(), Arc::clone(&fresh));

    let snapshot = caches.transmitters(net.key());
    assert_eq!(snapshot.len(), 1);
    assert!(Arc::ptr_eq(&snapshot[0], &fresh));
    assert_eq!(snapshot[0].last_power(), None);
}

#[test]
fn transmitters_should_be_empty_for_an_uncached_network() {
    let caches = caches_with(small_config());
    let net = network("gate");

    assert!(caches.transmitters(net.key()).is_empty());
}

#[test]
fn receivers_or_load_should_invoke_the_loader_once() {
    let caches = caches_with(small_config());
    let net = network("gate");
    let loads = AtomicUsize::new(0);

    let first = caches.receivers_or_load(net.key(), || {
        loads.fetch_add(1, Ordering::SeqCst);
        [receiver(&net, 0), receiver(&net, 1)].into_iter().collect()
    });
    let second = caches.receivers_or_load(net.key(), || unreachable!("must hit the cache"));

    assert_eq!(first.len(), 2);
    assert_eq!(second.len(), 2);
    assert_eq!(loads.load(Ordering::SeqCst), 1);
}

#[test]
fn add_receiver_should_merge_into_the_loaded_set() {
    let caches = caches_with(small_config());
    let net = network("gate");

    // cold add pulls the stored set in first
    caches.add_receiver(net.key(), receiver(&net, 5), || {
        [receiver(&net, 0)].into_iter().collect()
    });

    let locations = caches.receiver_locations(net.key());
    assert!(locations.contains(&location(0)));
    assert!(locations.contains(&location(5)));
    assert_eq!(locations.len(), 2);
}

#[test]
fn remove_receiver_should_shrink_the_cached_set() {
    let caches = caches_with(small_config());
    let net = network("gate");

    caches.receivers_or_load(net.key(), || {
        [receiver(&net, 0), receiver(&net, 1)].into_iter().collect()
    });

    assert!(caches.remove_receiver(net.key(), &location(0)));
    assert!(!caches.remove_receiver(net.key(), &location(0)));
    assert_eq!(caches.receiver_locations(net.key()).len(), 1);
}

#[test]
fn evict_chunk_should_only_drop_locations_in_that_chunk() {
    let caches = caches_with(small_config());
    let net = network("gate");

    // x = 0 and x = 40 fall into different chunks
    caches.transmitter_at(&location(0), || transmitter(&net, 0));
    caches.transmitter_at(&location(40), || transmitter(&net, 40));

    caches.evict_chunk(&location(0).chunk());

    caches.transmitter_at(&location(40), || unreachable!("other chunk untouched"));
    let reclassified = AtomicUsize::new(0);
    caches.transmitter_at(&location(0), || {
        reclassified.fetch_add(1, Ordering::SeqCst);
        transmitter(&net, 0)
    });
    assert_eq!(reclassified.load(Ordering::SeqCst), 1);
}

#[test]
fn clear_should_empty_all_three_caches() {
    let caches = caches_with(small_config());
    let net = network("gate");

    caches.transmitter_at(&location(0), || transmitter(&net, 0));
    caches.register_transmitter(net.key(), transmitter(&net, 0));
    caches.receivers_or_load(net.key(), || [receiver(&net, 1)].into_iter().collect());

    caches.clear();

    assert!(caches.transmitters(net.key()).is_empty());
    assert!(caches.receiver_locations(net.key()).is_empty());
    let reclassified = AtomicUsize::new(0);
    caches.transmitter_at(&location(0), || {
        reclassified.fetch_add(1, Ordering::SeqCst);
        transmitter(&net, 0)
    });
    assert_eq!(reclassified.load(Ordering::SeqCst), 1);
}
