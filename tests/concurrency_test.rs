use std::sync::Arc;
use std::thread;
use std::time::Duration;

use quiver::config::EngineSettings;
use quiver::engine::SearchEngine;
use quiver::entity::{AttributeValue, MemoryEntity, MemoryEntityStore};
use quiver::error::QuiverError;
use quiver::index::RangeSearch;
use quiver::registry::{IndexRegistry, IndexType};
use quiver::sync::CatalogLock;

#[test]
fn test_parallel_indexing_posts_every_uid() {
    let store = Arc::new(MemoryEntityStore::new());
    let engine = Arc::new(SearchEngine::new(EngineSettings::default(), store.clone()).unwrap());
    engine.create_index(IndexType::Exact, "color", "Color").unwrap();
    engine.create_index(IndexType::Range, "year", "Year").unwrap();

    let handles: Vec<_> = (0..4u64)
        .map(|worker| {
            let engine = Arc::clone(&engine);
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for offset in 0..250u64 {
                    let uid = worker * 250 + offset;
                    let color = if uid % 2 == 0 { "red" } else { "blue" };
                    let year = AttributeValue::Integer(2000 + (uid % 10) as i64);
                    let entity = MemoryEntity::new(uid, format!("e{uid}"))
                        .with_text("color", color)
                        .with_attribute("year", year);
                    engine.index_entity(&entity).unwrap();
                    store.insert(entity);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let red = engine.get_string("color", "red").unwrap().unwrap();
    let blue = engine.get_string("color", "blue").unwrap().unwrap();
    assert_eq!(red.len(), 500);
    assert_eq!(blue.len(), 500);
    assert!(red.as_slice().windows(2).all(|pair| pair[0] < pair[1]));

    let years = engine
        .get_range("year", RangeSearch::Between, 2000, 2009)
        .unwrap();
    assert_eq!(years.len(), 1000);
    assert_eq!(store.len(), 1000);
}

#[test]
fn test_concurrent_registration_assigns_unique_uids() {
    let registry = Arc::new(IndexRegistry::new());

    let handles: Vec<_> = (0..8)
        .map(|worker| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                (0..25)
                    .map(|n| {
                        let key = format!("field{worker}_{n}");
                        registry.put(IndexType::Exact, &key, &key).unwrap()
                    })
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let mut uids: Vec<u64> = handles
        .into_iter()
        .flat_map(|handle| handle.join().unwrap())
        .collect();
    uids.sort_unstable();
    assert_eq!(uids, (0..200).collect::<Vec<u64>>());
}

#[test]
fn test_lock_timeout_reports_failure() {
    let lock = CatalogLock::with_timeout("test catalog", 0u32, Duration::from_millis(20));

    let writer = lock.write().unwrap();
    assert!(lock.is_locked());
    assert!(matches!(lock.read(), Err(QuiverError::LockFailure(_))));
    drop(writer);

    assert!(!lock.is_locked());
    let first = lock.read().unwrap();
    let second = lock.read().unwrap();
    assert_eq!(lock.reader_count(), 2);
    assert!(matches!(lock.write(), Err(QuiverError::LockFailure(_))));
    drop((first, second));
    assert!(!lock.is_read_locked());
}
