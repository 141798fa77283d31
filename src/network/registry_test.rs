use std::sync::Arc;

use uuid::Uuid;

use super::*;

#[test]
fn resolve_should_return_the_canonical_instance_for_case_variants() {
    let registry = NetworkRegistry::new();

    let upper = registry.resolve("Door", None);
    let lower = registry.resolve("door", None);

    assert!(Arc::ptr_eq(&upper, &lower));
    assert_eq!(registry.len(), 1);
    // first-seen casing survives
    assert_eq!(lower.id(), "Door");
}

#[test]
fn resolve_should_scope_networks_by_owner() {
    let registry = NetworkRegistry::new();
    let owner_a = Uuid::new_v4();
    let owner_b = Uuid::new_v4();

    let a = registry.resolve("door", Some(owner_a));
    let b = registry.resolve("door", Some(owner_b));
    let global = registry.resolve("door", None);

    assert!(!Arc::ptr_eq(&a, &b));
    assert!(!Arc::ptr_eq(&a, &global));
    assert_eq!(registry.len(), 3);
}

#[test]
fn resolve_should_create_networks_lazily_exactly_once() {
    let registry = NetworkRegistry::new();

    let first = registry.resolve("lobby", None);
    let second = registry.resolve("LOBBY", None);
    let third = registry.resolve("lobby", None);

    assert!(Arc::ptr_eq(&first, &second));
    assert!(Arc::ptr_eq(&first, &third));
    assert_eq!(registry.len(), 1);
}
