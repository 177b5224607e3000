//! Command implementations for the quiver CLI.

use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, bail};
use log::{debug, info};
use serde_json::Value;

use crate::cli::args::*;
use crate::cli::output::*;
use crate::config::{EngineSettings, IndexSettingsConfig};
use crate::engine::SearchEngine;
use crate::entity::{Entity, MemoryEntity, MemoryEntityStore};
use crate::intersect::Intersect;
use crate::posting::EntityUid;
use crate::sort::{MultiSort, SortOrder};

/// Execute a CLI command.
pub fn execute_command(args: QuiverArgs) -> anyhow::Result<()> {
    match &args.command {
        Command::IndexStats(stats_args) => show_index_stats(stats_args, &args),
        Command::Sort(sort_args) => sort_entities(sort_args, &args),
        Command::Facets(facet_args) => show_facets(facet_args, &args),
    }
}

/// Engine loaded with the schema and every entity of the data file.
struct LoadedData {
    engine: SearchEngine,
    uids: Vec<EntityUid>,
    postings: usize,
}

fn load_settings(config: Option<&Path>) -> anyhow::Result<EngineSettings> {
    match config {
        Some(path) => EngineSettings::from_json_file(path)
            .with_context(|| format!("failed to load settings from '{}'", path.display())),
        None => Ok(EngineSettings::default()),
    }
}

fn load_schema(path: &Path) -> anyhow::Result<Vec<IndexSettingsConfig>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read schema '{}'", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("invalid schema '{}'", path.display()))
}

fn load_data(input: &DataArgs, cli_args: &QuiverArgs) -> anyhow::Result<LoadedData> {
    let settings = load_settings(cli_args.config.as_deref())?;
    let store = Arc::new(MemoryEntityStore::new());
    let engine = SearchEngine::new(settings, store.clone())?;

    let schema = load_schema(&input.schema)?;
    for section in &schema {
        let index = engine.create_index(section.index_type, &section.key, &section.name)?;
        engine
            .registry()
            .update_settings_from_config(index.key(), section, engine.stemmer())?;
        if let (Some(min), Some(max)) = (section.min_string_length, section.max_string_length) {
            engine.set_string_index_thresholds(index.key(), min, max)?;
        }
    }
    let string_indexes: Vec<_> = engine
        .registry()
        .entries()?
        .into_iter()
        .filter(|index| index.index_type().is_string())
        .collect();
    debug!("registered {} indexes", schema.len());

    let file = File::open(&input.data)
        .with_context(|| format!("failed to open data file '{}'", input.data.display()))?;
    let reader = BufReader::new(file);

    let mut uids = Vec::new();
    let mut postings = 0;
    for (line_num, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let value: Value = serde_json::from_str(&line)
            .with_context(|| format!("invalid JSON on line {}", line_num + 1))?;
        let mut entity = MemoryEntity::from_json(&value)
            .with_context(|| format!("invalid entity on line {}", line_num + 1))?;

        for index in &string_indexes {
            if let Some(text) = entity.get_string(index.key())
                && let Some(attributes) = engine.build_relevancy_attributes(index.key(), &text)?
            {
                for (attribute, value) in attributes {
                    entity.set(attribute, value);
                }
            }
        }

        postings += engine.index_entity(&entity)?;
        uids.push(entity.uid());
        if store.insert(entity).is_some() {
            bail!("duplicate entity uid on line {}", line_num + 1);
        }
    }
    info!("loaded {} entities from '{}'", uids.len(), input.data.display());

    Ok(LoadedData {
        engine,
        uids,
        postings,
    })
}

fn show_index_stats(args: &IndexStatsArgs, cli_args: &QuiverArgs) -> anyhow::Result<()> {
    let data = load_data(&args.input, cli_args)?;
    let search_index = data.engine.search_index();

    let mut indexes = Vec::new();
    for index in data.engine.registry().entries()? {
        let (index_type, key) = (index.index_type(), index.key());
        indexes.push(IndexStatsRow {
            key: key.to_string(),
            name: index.name().to_string(),
            index_type: index_type.to_string(),
            uid: index.uid(),
            distinct_values: search_index.build_index_value_summary(index_type, key)?.len(),
            entity_count: search_index.get_index_value_count(index_type, key)?,
            leaf_count: search_index.get_index_count(index_type, key)?,
            depth: search_index.get_index_depth(index_type, key)?,
        });
    }

    output_result(
        "Index statistics",
        &IndexStatsReport {
            entities: data.uids.len(),
            postings: data.postings,
            indexes,
        },
        cli_args,
    )
}

fn sort_entities(args: &SortArgs, cli_args: &QuiverArgs) -> anyhow::Result<()> {
    if args.by.is_empty() && args.relevancy.is_none() && args.near.is_none() {
        bail!("no sort criterion given, use --by, --relevancy or --near");
    }

    let data = load_data(&args.input, cli_args)?;
    let mut intersect = Intersect::from_result(data.uids);
    let mut sort = MultiSort::new(&data.engine, intersect.result());
    let mut criteria = Vec::new();

    for by in &args.by {
        sort.add_sort_by_attribute_name_checked(&by.attribute, by.order)?;
        criteria.push(format!("{} {}", by.attribute, by.order));
    }
    if let Some(relevancy) = &args.relevancy {
        sort.add_sort_by_relevancy_checked(
            &relevancy.attribute,
            &relevancy.query,
            SortOrder::Descending,
        )?;
        criteria.push(format!(
            "relevancy of {} to '{}'",
            relevancy.attribute, relevancy.query
        ));
    }
    if let Some((latitude, longitude)) = args.near {
        sort.add_sort_by_distance_checked(latitude, longitude, SortOrder::Ascending)?;
        criteria.push(format!("distance from {latitude},{longitude}"));
    }
    sort.execute(&mut intersect);

    let mut uids = intersect.into_result();
    if let Some(limit) = args.limit {
        uids.truncate(limit);
    }

    output_result("Sorted entities", &SortReport { criteria, uids }, cli_args)
}

fn show_facets(args: &FacetsArgs, cli_args: &QuiverArgs) -> anyhow::Result<()> {
    let data = load_data(&args.input, cli_args)?;
    let mut intersect = Intersect::from_result(data.uids);
    let facets = data
        .engine
        .search_sort(&mut intersect)
        .calculate_facets(&args.attribute)?;

    output_result(
        "Facets",
        &FacetReport {
            attribute: args.attribute.clone(),
            facets,
        },
        cli_args,
    )
}
