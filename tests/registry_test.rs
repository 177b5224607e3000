use std::sync::Arc;

use quiver::config::{EngineSettings, IndexSettingsConfig};
use quiver::engine::SearchEngine;
use quiver::entity::MemoryEntityStore;
use quiver::error::QuiverError;
use quiver::registry::{IndexRegistry, IndexType};

fn engine() -> SearchEngine {
    SearchEngine::new(EngineSettings::default(), Arc::new(MemoryEntityStore::new())).unwrap()
}

#[test]
fn test_uids_are_assigned_in_registration_order() {
    let registry = IndexRegistry::new();
    assert_eq!(registry.put(IndexType::Exact, "color", "Color").unwrap(), 0);
    assert_eq!(registry.put(IndexType::Range, "year", "Year").unwrap(), 1);
    assert_eq!(registry.put(IndexType::Wildcard, "title", "Title").unwrap(), 2);

    // Removing does not recycle uids.
    registry.remove("year").unwrap();
    assert_eq!(registry.put(IndexType::Range, "price", "Price").unwrap(), 3);

    assert_eq!(registry.keys().unwrap(), vec!["color", "price", "title"]);
}

#[test]
fn test_duplicate_and_missing_keys() {
    let registry = IndexRegistry::new();
    registry.put(IndexType::Exact, "color", "Color").unwrap();

    assert!(matches!(
        registry.put(IndexType::Range, "color", "Other"),
        Err(QuiverError::DuplicateKey(_))
    ));
    assert!(matches!(registry.get("size"), Err(QuiverError::NotFound(_))));
    assert!(matches!(registry.remove("size"), Err(QuiverError::NotFound(_))));
    assert!(matches!(
        registry.put(IndexType::Exact, "", "Empty"),
        Err(QuiverError::InvalidArgument(_))
    ));
    assert!(matches!(
        registry.put(IndexType::Exact, "shape", ""),
        Err(QuiverError::InvalidArgument(_))
    ));
}

#[test]
fn test_reset_keeps_uid_and_drops_overrides() {
    let registry = IndexRegistry::new();
    registry.put(IndexType::Exact, "color", "Color").unwrap();
    registry.put(IndexType::Exact, "shade", "Shade").unwrap();
    registry.set_string_delimiters("color", "|").unwrap();

    let reset = registry
        .reset("color", IndexType::Wildcard, "hue", "Hue")
        .unwrap();
    assert_eq!(reset.uid(), 0);
    assert_eq!(reset.index_type(), IndexType::Wildcard);
    assert!(!reset.settings().has_overrides());
    assert!(!registry.contains("color").unwrap());

    // A taken target key leaves the source untouched.
    assert!(matches!(
        registry.reset("hue", IndexType::Exact, "shade", "Shade"),
        Err(QuiverError::DuplicateKey(_))
    ));
    assert_eq!(registry.get("hue").unwrap().name(), "Hue");
}

#[test]
fn test_numbered_geo_keys_resolve_to_canonical_index() {
    let registry = IndexRegistry::new();
    registry.put(IndexType::Range, "longitude", "Longitude").unwrap();

    assert_eq!(registry.get("longitude002").unwrap().key(), "longitude");
    assert!(registry.get("longitudes").is_err());
    assert!(registry.get("latitude002").is_err());
}

#[test]
fn test_settings_round_trip_through_config() {
    let engine = engine();
    engine
        .create_index(IndexType::Wildcard, "title", "Title")
        .unwrap();

    let mut config = IndexSettingsConfig::new(IndexType::Wildcard, "title", "Title");
    config.min_string_length = Some(2);
    config.max_string_length = Some(10);
    config.string_delimiters = Some(" -".to_string());
    config.is_index_full_string = Some(false);

    engine
        .registry()
        .update_settings_from_config("title", &config, engine.stemmer())
        .unwrap();

    let context = engine.registry().update_config_context("title").unwrap();
    assert_eq!(context.min_string_length, Some(2));
    assert_eq!(context.max_string_length, Some(10));
    assert_eq!(context.string_delimiters.as_deref(), Some(" -"));
    assert_eq!(context.is_index_full_string, Some(false));
    assert_eq!(context.is_index_tokenized_string, Some(true));

    let resolved = engine.resolve_settings(&engine.get_index("title").unwrap());
    assert_eq!(resolved.min_string_length, 2);
    assert_eq!(resolved.delimiters, " -");
    assert!(!resolved.string_indexing.full_string);
}

#[test]
fn test_invalid_thresholds_are_rejected() {
    let registry = IndexRegistry::new();
    registry.put(IndexType::Exact, "color", "Color").unwrap();

    for (min, max) in [(0, 5), (6, 5), (3, 1024)] {
        assert!(
            registry.set_string_index_thresholds("color", min, max).is_err(),
            "{min}..{max} should be rejected"
        );
    }
    registry.set_string_index_thresholds("color", 1, 1023).unwrap();
}

#[test]
fn test_engine_rename_moves_storage() {
    let engine = engine();
    engine.create_index(IndexType::Exact, "color", "Color").unwrap();
    engine.put_string("color", "red", 7).unwrap();

    let renamed = engine.rename_index("color", "Colour", "Colour").unwrap();
    assert_eq!(renamed.key(), "colour");
    assert_eq!(renamed.uid(), 0);

    let list = engine.get_string("colour", "red").unwrap().unwrap();
    assert_eq!(list.as_slice(), &[7]);
    assert!(engine.get_string("color", "red").is_err());
    assert!(!engine.search_index().contains("color").unwrap());
}
