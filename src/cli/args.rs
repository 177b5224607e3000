//! Command line argument parsing for the quiver CLI using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::sort::SortOrder;

/// Quiver - typed multi-index search with composite sorting and facets
#[derive(Parser, Debug, Clone)]
#[command(name = "quiver")]
#[command(about = "Index entities, sort result sets and count facets")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct QuiverArgs {
    /// Verbosity level (0=quiet, 1=normal, 2=verbose, 3=debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long)]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'f', long = "format", default_value = "human")]
    pub output_format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Engine settings file (JSON)
    #[arg(short, long, env = "QUIVER_CONFIG", value_name = "CONFIG_FILE")]
    pub config: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl QuiverArgs {
    /// Get the effective verbosity level
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            match self.verbose {
                0 => 1,
                n => n,
            }
        }
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Index the data file and show per-index statistics
    #[command(name = "index-stats")]
    IndexStats(IndexStatsArgs),

    /// Print entity uids in composite-sort order
    Sort(SortArgs),

    /// Count the values of one attribute
    Facets(FacetsArgs),
}

/// Input files shared by every command
#[derive(Args, Debug, Clone)]
pub struct DataArgs {
    /// Entities, one JSON object per line
    #[arg(long, value_name = "DATA_FILE")]
    pub data: PathBuf,

    /// Index definitions (JSON array of index sections)
    #[arg(long, value_name = "SCHEMA_FILE")]
    pub schema: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct IndexStatsArgs {
    #[command(flatten)]
    pub input: DataArgs,
}

#[derive(Args, Debug, Clone)]
pub struct SortArgs {
    #[command(flatten)]
    pub input: DataArgs,

    /// Attribute criterion, `name[:asc|:desc]`; repeat for more criteria
    #[arg(long = "by", value_name = "ATTRIBUTE", value_parser = parse_attribute_sort)]
    pub by: Vec<AttributeSortSpec>,

    /// Relevancy criterion, `attribute=query`, most relevant first
    #[arg(long, value_name = "ATTRIBUTE=QUERY", value_parser = parse_relevancy_sort)]
    pub relevancy: Option<RelevancySortSpec>,

    /// Distance criterion, `latitude,longitude`, nearest first
    #[arg(long, value_name = "LAT,LON", value_parser = parse_point, allow_hyphen_values = true)]
    pub near: Option<(f64, f64)>,

    /// Print at most this many uids
    #[arg(short, long)]
    pub limit: Option<usize>,
}

#[derive(Args, Debug, Clone)]
pub struct FacetsArgs {
    #[command(flatten)]
    pub input: DataArgs,

    /// Attribute to count
    #[arg(short, long)]
    pub attribute: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AttributeSortSpec {
    pub attribute: String,
    pub order: SortOrder,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RelevancySortSpec {
    pub attribute: String,
    pub query: String,
}

/// Output formats for CLI
#[derive(ValueEnum, Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}

fn parse_attribute_sort(value: &str) -> Result<AttributeSortSpec, String> {
    let (attribute, order) = match value.rsplit_once(':') {
        Some((attribute, order)) => (attribute, order.parse().map_err(|e| format!("{e}"))?),
        None => (value, SortOrder::Ascending),
    };
    if attribute.is_empty() {
        return Err("empty sort attribute".to_string());
    }
    Ok(AttributeSortSpec {
        attribute: attribute.to_string(),
        order,
    })
}

fn parse_relevancy_sort(value: &str) -> Result<RelevancySortSpec, String> {
    match value.split_once('=') {
        Some((attribute, query)) if !attribute.is_empty() && !query.is_empty() => {
            Ok(RelevancySortSpec {
                attribute: attribute.to_string(),
                query: query.to_string(),
            })
        }
        _ => Err(format!("expected ATTRIBUTE=QUERY, got '{value}'")),
    }
}

fn parse_point(value: &str) -> Result<(f64, f64), String> {
    let (latitude, longitude) = value
        .split_once(',')
        .ok_or_else(|| format!("expected LAT,LON, got '{value}'"))?;
    let parse = |part: &str| {
        part.trim()
            .parse::<f64>()
            .map_err(|e| format!("invalid coordinate '{part}': {e}"))
    };
    Ok((parse(latitude)?, parse(longitude)?))
}
