//! Output formatting for CLI commands.

use serde::Serialize;

use crate::cli::args::{OutputFormat, QuiverArgs};
use crate::sort::FacetEntry;

/// Statistics of one registered index.
#[derive(Debug, Serialize)]
pub struct IndexStatsRow {
    pub key: String,
    pub name: String,
    #[serde(rename = "type")]
    pub index_type: String,
    pub uid: u64,
    pub distinct_values: usize,
    pub entity_count: usize,
    pub leaf_count: usize,
    pub depth: usize,
}

#[derive(Debug, Serialize)]
pub struct IndexStatsReport {
    pub entities: usize,
    pub postings: usize,
    pub indexes: Vec<IndexStatsRow>,
}

#[derive(Debug, Serialize)]
pub struct SortReport {
    pub criteria: Vec<String>,
    pub uids: Vec<u64>,
}

#[derive(Debug, Serialize)]
pub struct FacetReport {
    pub attribute: String,
    pub facets: Vec<FacetEntry>,
}

/// Human-readable rendering of a report.
pub trait HumanOutput {
    fn to_human(&self) -> String;
}

impl HumanOutput for IndexStatsReport {
    fn to_human(&self) -> String {
        let mut out = format!(
            "Indexed {} entities ({} postings)\n",
            self.entities, self.postings
        );
        for row in &self.indexes {
            out.push_str(&format!(
                "{:<20} {:<9} uid {:<4} values {:<8} entities {:<8} leaves {:<6} depth {}\n",
                row.key,
                row.index_type,
                row.uid,
                row.distinct_values,
                row.entity_count,
                row.leaf_count,
                row.depth
            ));
        }
        out
    }
}

impl HumanOutput for SortReport {
    fn to_human(&self) -> String {
        let mut out = format!("Sorted by: {}\n", self.criteria.join(", "));
        for (rank, uid) in self.uids.iter().enumerate() {
            out.push_str(&format!("{:>6}  {uid}\n", rank + 1));
        }
        out
    }
}

impl HumanOutput for FacetReport {
    fn to_human(&self) -> String {
        let mut out = format!("Facets for '{}':\n", self.attribute);
        for facet in &self.facets {
            out.push_str(&format!("  {} ({})\n", facet.value, facet.count));
        }
        out
    }
}

/// Output a result in the selected format.
pub fn output_result<T: Serialize + HumanOutput>(
    message: &str,
    result: &T,
    args: &QuiverArgs,
) -> anyhow::Result<()> {
    match args.output_format {
        OutputFormat::Human => {
            if args.verbosity() > 1 {
                println!("{message}");
                println!();
            }
            print!("{}", result.to_human());
        }
        OutputFormat::Json => {
            let json = if args.pretty {
                serde_json::to_string_pretty(result)?
            } else {
                serde_json::to_string(result)?
            };
            println!("{json}");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_facet_report_human() {
        let report = FacetReport {
            attribute: "color".to_string(),
            facets: vec![FacetEntry {
                value: "red".to_string(),
                count: 2,
            }],
        };
        assert_eq!(report.to_human(), "Facets for 'color':\n  red (2)\n");
    }

    #[test]
    fn test_sort_report_json() {
        let report = SortReport {
            criteria: vec!["color asc".to_string()],
            uids: vec![3, 1],
        };
        assert_eq!(
            serde_json::to_string(&report).unwrap(),
            r#"{"criteria":["color asc"],"uids":[3,1]}"#
        );
    }
}
