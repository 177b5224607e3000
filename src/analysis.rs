//! Text analysis used by indexing, relevancy sorting and faceting.
//!
//! Everything here is a pure function over strings: normalization to the
//! index alphabet, delimiter tokenization, suffix stemming, excluded-word sets
//! and the token-overlap relevancy score.

pub mod excluded;
pub mod normalize;
pub mod relevancy;
pub mod stemmer;
pub mod tokenizer;

pub use excluded::ExcludedWords;
pub use normalize::{build_index_string, contains_alphabetic, contains_vowel, normalize_string};
pub use stemmer::{IdentityStemmer, Stemmer, SuffixStemmer};
pub use tokenizer::{string_to_tokens, tokenize};
