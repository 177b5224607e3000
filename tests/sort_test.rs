use std::sync::Arc;

use quiver::config::EngineSettings;
use quiver::engine::SearchEngine;
use quiver::entity::{AttributeValue, MemoryEntity, MemoryEntityStore};
use quiver::error::QuiverError;
use quiver::intersect::Intersect;
use quiver::registry::IndexType;
use quiver::sort::{MultiSort, SortOrder};

struct Fixture {
    engine: SearchEngine,
    store: Arc<MemoryEntityStore>,
}

impl Fixture {
    fn new() -> Self {
        let store = Arc::new(MemoryEntityStore::new());
        let engine = SearchEngine::new(EngineSettings::default(), store.clone()).unwrap();
        engine.create_index(IndexType::Wildcard, "title", "Title").unwrap();
        engine.create_index(IndexType::Exact, "color", "Color").unwrap();
        engine.create_index(IndexType::Range, "year", "Year").unwrap();
        Fixture { engine, store }
    }

    fn add(&self, mut entity: MemoryEntity) {
        if let Some(AttributeValue::Text(title)) = entity.attribute("title").cloned()
            && let Some(attributes) = self
                .engine
                .build_relevancy_attributes("title", &title)
                .unwrap()
        {
            for (attribute, value) in attributes {
                entity.set(attribute, value);
            }
        }
        self.engine.index_entity(&entity).unwrap();
        self.store.insert(entity);
    }
}

fn vehicle(uid: u64, title: &str, color: &str, year: i64) -> MemoryEntity {
    MemoryEntity::new(uid, format!("vehicle-{uid}"))
        .with_text("title", title)
        .with_text("color", color)
        .with_attribute("year", AttributeValue::Integer(year))
}

#[test]
fn test_attribute_sort_orders_numbers_then_text_then_missing() {
    let fixture = Fixture::new();
    fixture.add(MemoryEntity::new(1, "a").with_text("rank", "10"));
    fixture.add(MemoryEntity::new(2, "b").with_text("rank", "9.5"));
    fixture.add(MemoryEntity::new(3, "c").with_text("rank", "Beta"));
    fixture.add(MemoryEntity::new(4, "d"));
    fixture.add(MemoryEntity::new(5, "e").with_text("rank", "alpha"));

    let mut intersect = Intersect::from_result(vec![4, 3, 1, 5, 2]);
    fixture
        .engine
        .search_sort(&mut intersect)
        .sort_by_attribute_name("rank", SortOrder::Ascending)
        .unwrap();
    assert_eq!(intersect.result(), &[2, 1, 5, 3, 4]);

    fixture
        .engine
        .search_sort(&mut intersect)
        .sort_by_attribute_name("rank", SortOrder::Descending)
        .unwrap();
    assert_eq!(intersect.result(), &[4, 3, 5, 1, 2]);
}

#[test]
fn test_attribute_sort_is_stable() {
    let fixture = Fixture::new();
    fixture.add(vehicle(1, "one", "red", 2001));
    fixture.add(vehicle(2, "two", "blue", 2002));
    fixture.add(vehicle(3, "three", "red", 2003));
    fixture.add(vehicle(4, "four", "blue", 2004));

    let mut intersect = Intersect::from_result(vec![3, 4, 1, 2]);
    fixture
        .engine
        .search_sort(&mut intersect)
        .sort_by_attribute_name("color", SortOrder::Ascending)
        .unwrap();
    assert_eq!(intersect.result(), &[4, 2, 3, 1]);
}

#[test]
fn test_reserved_attributes_sort_by_uid_and_name() {
    let fixture = Fixture::new();
    fixture.add(MemoryEntity::new(30, "beta"));
    fixture.add(MemoryEntity::new(4, "gamma"));
    fixture.add(MemoryEntity::new(100, "alpha"));

    let mut intersect = Intersect::from_result(vec![30, 4, 100]);
    fixture
        .engine
        .search_sort(&mut intersect)
        .sort_by_attribute_name("searchd_containerUid", SortOrder::Ascending)
        .unwrap();
    assert_eq!(intersect.result(), &[4, 30, 100]);

    fixture
        .engine
        .search_sort(&mut intersect)
        .sort_by_attribute_name("searchd_containerName", SortOrder::Ascending)
        .unwrap();
    assert_eq!(intersect.result(), &[100, 30, 4]);
}

#[test]
fn test_relevancy_sort_puts_best_match_first() {
    let fixture = Fixture::new();
    fixture.add(vehicle(1, "red car", "red", 2001));
    fixture.add(vehicle(2, "blue boat", "blue", 2002));
    fixture.add(MemoryEntity::new(3, "untitled"));

    let mut intersect = Intersect::from_result(vec![2, 3, 1]);
    fixture
        .engine
        .search_sort(&mut intersect)
        .sort_by_relevancy("title", "red car", SortOrder::Descending)
        .unwrap();
    assert_eq!(intersect.result()[0], 1);
    assert_eq!(intersect.result()[2], 3);
}

#[test]
fn test_relevancy_sort_rejects_bad_input() {
    let fixture = Fixture::new();
    let mut intersect = Intersect::from_result(vec![1]);
    let mut sort = fixture.engine.search_sort(&mut intersect);

    assert!(matches!(
        sort.sort_by_relevancy("year", "red", SortOrder::Descending),
        Err(QuiverError::Unsupported(_))
    ));
    assert!(matches!(
        sort.sort_by_relevancy("title", "", SortOrder::Descending),
        Err(QuiverError::InvalidArgument(_))
    ));
    assert!(matches!(
        sort.sort_by_relevancy("missing", "red", SortOrder::Descending),
        Err(QuiverError::NotFound(_))
    ));
}

#[test]
fn test_distance_sort_nearest_first() {
    let fixture = Fixture::new();
    let city = |uid: u64, latitude: f64, longitude: f64| {
        MemoryEntity::new(uid, format!("city-{uid}"))
            .with_attribute("latitude", AttributeValue::Double(latitude))
            .with_attribute("longitude", AttributeValue::Double(longitude))
    };
    // New York, Chicago, Los Angeles
    fixture.add(city(1, 40.7128, -74.0060));
    fixture.add(city(2, 41.8781, -87.6298));
    fixture.add(city(3, 34.0522, -118.2437));

    // Query from Philadelphia.
    let mut intersect = Intersect::from_result(vec![3, 2, 1]);
    fixture
        .engine
        .search_sort(&mut intersect)
        .sort_by_distance(39.9526, -75.1652, SortOrder::Ascending)
        .unwrap();
    assert_eq!(intersect.result(), &[1, 2, 3]);

    let mut intersect = Intersect::from_result(vec![1]);
    assert!(fixture
        .engine
        .search_sort(&mut intersect)
        .sort_by_distance(91.0, 0.0, SortOrder::Ascending)
        .is_err());
}

#[test]
fn test_multi_sort_breaks_ties_with_later_criteria() {
    let fixture = Fixture::new();
    fixture.add(vehicle(1, "red car", "red", 2010));
    fixture.add(vehicle(2, "blue car", "blue", 2015));
    fixture.add(vehicle(3, "red van", "red", 2020));
    fixture.add(vehicle(4, "blue van", "blue", 2005));

    let mut intersect = Intersect::from_result(vec![1, 2, 3, 4]);
    let mut sort = MultiSort::new(&fixture.engine, intersect.result());
    sort.add_sort_by_attribute_name("color", SortOrder::Ascending)
        .unwrap();
    sort.add_sort_by_attribute_name("year", SortOrder::Descending)
        .unwrap();
    assert_eq!(sort.criteria().len(), 2);
    sort.execute(&mut intersect);

    assert_eq!(intersect.result(), &[2, 4, 3, 1]);
}

#[test]
fn test_multi_sort_memory_budget() {
    let store = Arc::new(MemoryEntityStore::new());
    let settings = EngineSettings {
        max_sort_operation_memory_length: 64,
        ..EngineSettings::default()
    };
    let engine = SearchEngine::new(settings, store.clone()).unwrap();
    for uid in 0..100 {
        store.insert(MemoryEntity::new(uid, "e").with_text("rank", uid.to_string()));
    }

    let uids: Vec<u64> = (0..100).collect();
    let mut sort = MultiSort::new(&engine, &uids);
    assert!(matches!(
        sort.add_sort_by_attribute_name_checked("rank", SortOrder::Ascending),
        Err(QuiverError::Unsupported(_))
    ));
    assert!(sort.is_empty());
}
