//! # Quiver
//!
//! A multi-type search index engine with typed index registries, exact and
//! wildcard string postings, integer range postings, and composite sorting
//! of result sets.
//!
//! ## Features
//!
//! - Named index registry with per-index string settings
//! - Exact, wildcard, user key and range index storage
//! - Posting list set operations
//! - Attribute, relevancy and geo distance sorts
//! - Facet counting over result sets

pub mod analysis;
pub mod cli;
pub mod config;
pub mod engine;
pub mod entity;
pub mod error;
pub mod index;
pub mod intersect;
pub mod ordered;
pub mod posting;
pub mod registry;
pub mod search_index;
pub mod sort;
pub mod sync;

pub mod prelude {
    pub use crate::config::EngineSettings;
    pub use crate::engine::SearchEngine;
    pub use crate::entity::{AttributeValue, Entity, EntityStore, MemoryEntity, MemoryEntityStore};
    pub use crate::error::{QuiverError, Result};
    pub use crate::intersect::Intersect;
    pub use crate::registry::{IndexRegistry, IndexType};
    pub use crate::search_index::SearchIndex;
    pub use crate::sort::{MultiSort, SearchSort, SortOrder};
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
