//! Storage backends behind the typed search indexes.
//!
//! - [`wildcard::WildcardIndex`]: string values, either posted exactly or
//!   expanded into prefix and suffix permutations for substring lookups.
//! - [`range::RangeIndex`]: integer values bucketed for interval searches.

pub mod range;
pub mod wildcard;

pub use range::{RangeIndex, RangeSearch};
pub use wildcard::{WildcardIndex, WildcardMode, wildcard_length};
