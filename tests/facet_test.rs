use std::sync::Arc;

use quiver::analysis::{ExcludedWords, SuffixStemmer};
use quiver::config::EngineSettings;
use quiver::engine::SearchEngine;
use quiver::entity::{MemoryEntity, MemoryEntityStore};
use quiver::error::QuiverError;
use quiver::intersect::Intersect;
use quiver::registry::IndexType;
use quiver::sort::FacetEntry;

fn engine_with(settings: EngineSettings, entities: &[(u64, &str, &str)]) -> SearchEngine {
    let store = MemoryEntityStore::new();
    for (uid, attribute, value) in entities {
        let entity = MemoryEntity::new(*uid, format!("entity-{uid}")).with_text(*attribute, *value);
        store.insert(entity);
    }
    let engine = SearchEngine::new(settings, Arc::new(store)).unwrap();
    engine.create_index(IndexType::Exact, "color", "Color").unwrap();
    engine.create_index(IndexType::Wildcard, "title", "Title").unwrap();
    engine
}

fn facets(engine: &SearchEngine, uids: Vec<u64>, attribute: &str) -> Vec<(String, usize)> {
    let mut intersect = Intersect::from_result(uids);
    engine
        .search_sort(&mut intersect)
        .calculate_facets(attribute)
        .unwrap()
        .into_iter()
        .map(|FacetEntry { value, count }| (value, count))
        .collect()
}

#[test]
fn test_full_string_facets_count_each_entity_once() {
    let engine = engine_with(
        EngineSettings::default(),
        &[
            (1, "color", "Red"),
            (2, "color", "blue"),
            (3, "color", "red"),
            (4, "title", "x"),
        ],
    );
    engine
        .registry()
        .set_string_indexing("color", true, false)
        .unwrap();

    let counts = facets(&engine, vec![1, 2, 3, 4, 99], "color");
    assert_eq!(
        counts,
        vec![("blue".to_string(), 1), ("red".to_string(), 2)]
    );
    let total: usize = counts.iter().map(|(_, count)| count).sum();
    assert_eq!(total, 3);
}

#[test]
fn test_tokenized_facets() {
    let engine = engine_with(
        EngineSettings::default(),
        &[(1, "title", "red sports car"), (2, "title", "red")],
    );

    let counts = facets(&engine, vec![1, 2], "title");
    assert_eq!(
        counts,
        vec![
            ("car".to_string(), 1),
            ("red".to_string(), 2),
            ("red sports car".to_string(), 1),
            ("sports".to_string(), 1),
        ]
    );
}

#[test]
fn test_excluded_words_are_not_counted() {
    let settings = EngineSettings {
        excluded_words: vec!["the".to_string()],
        ..EngineSettings::default()
    };
    let engine = engine_with(settings, &[(1, "title", "the sports car")]);

    assert_eq!(
        facets(&engine, vec![1], "title"),
        vec![
            ("car".to_string(), 1),
            ("sports".to_string(), 1),
            ("the sports car".to_string(), 1),
        ]
    );

    // An index-level list replaces the engine list. Its stems also exclude
    // inflections on wildcard indexes.
    let words = ExcludedWords::from_words(["sport"], &SuffixStemmer::new());
    engine.registry().set_excluded_words("title", words).unwrap();

    assert_eq!(
        facets(&engine, vec![1], "title"),
        vec![
            ("car".to_string(), 1),
            ("the".to_string(), 1),
            ("the sports car".to_string(), 1),
        ]
    );
}

#[test]
fn test_reserved_and_unknown_attributes() {
    let engine = engine_with(EngineSettings::default(), &[(1, "color", "red")]);

    assert!(facets(&engine, vec![1], "uid").is_empty());
    assert!(facets(&engine, vec![1], "searchd_containerName").is_empty());

    let mut intersect = Intersect::from_result(vec![1]);
    assert!(matches!(
        engine.search_sort(&mut intersect).calculate_facets("size"),
        Err(QuiverError::NotFound(_))
    ));
}

#[test]
fn test_values_outside_thresholds_are_skipped() {
    let engine = engine_with(
        EngineSettings::default(),
        &[(1, "color", "ox"), (2, "color", "an extraordinarily long value")],
    );

    let counts = facets(&engine, vec![1, 2], "color");
    assert_eq!(
        counts,
        vec![
            ("extraordinarily".to_string(), 1),
            ("long".to_string(), 1),
            ("value".to_string(), 1),
        ]
    );
}
