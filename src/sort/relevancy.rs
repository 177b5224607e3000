//! Relevancy sort keys: token-overlap scores against a query.

use std::sync::Arc;

use log::warn;
use rayon::prelude::*;

use crate::analysis::relevancy::{
    compare_arrays, deserialize_tokens, relevancy_key, relevancy_length_key,
};
use crate::analysis::string_to_tokens;
use crate::engine::SearchEngine;
use crate::entity::Entity;
use crate::error::{QuiverError, Result};
use crate::posting::EntityUid;
use crate::registry::{IndexType, RegisteredIndex};

/// Positions searched on each side for a displaced token.
pub const RELEVANCY_TOKEN_DISTANCE: usize = 4;

/// Resolve a string index and tokenize the query against engine settings.
pub(crate) fn prepare_query(
    engine: &SearchEngine,
    attribute: &str,
    query: &str,
) -> Result<(Arc<RegisteredIndex>, Vec<String>)> {
    let index = engine.get_index(attribute)?;
    if !matches!(
        index.index_type(),
        IndexType::Exact | IndexType::Wildcard | IndexType::UserKey
    ) {
        warn!(
            "relevancy sort on {} index '{}'",
            index.index_type(),
            index.key()
        );
        return Err(QuiverError::unsupported(format!(
            "relevancy sort needs a string index, '{}' is {}",
            index.key(),
            index.index_type()
        )));
    }

    let settings = engine.settings();
    let tokens = string_to_tokens(
        query,
        settings.min_string_length,
        &settings.delimiters,
        engine.stemmer(),
    );
    if tokens.is_empty() {
        warn!("relevancy query '{query}' has no usable tokens");
        return Err(QuiverError::invalid_argument(format!(
            "relevancy query '{query}' has no usable tokens"
        )));
    }
    Ok((index, tokens))
}

/// Score of one entity. Missing entities or token lists score zero.
pub fn relevancy_score(entity: Option<&dyn Entity>, index_key: &str, query: &[String]) -> f64 {
    let Some(entity) = entity else {
        return 0.0;
    };
    let Some(serialized) = entity.get_string(&relevancy_key(index_key)) else {
        return 0.0;
    };
    let count = entity
        .get_integer(&relevancy_length_key(index_key))
        .and_then(|count| usize::try_from(count).ok())
        .unwrap_or(0);

    let tokens = deserialize_tokens(&serialized, count);
    if tokens.is_empty() {
        return 0.0;
    }
    compare_arrays(&tokens, query, RELEVANCY_TOKEN_DISTANCE)
}

pub(crate) fn build_scores(
    engine: &SearchEngine,
    uids: &[EntityUid],
    index_key: &str,
    query: &[String],
) -> Vec<f64> {
    uids.par_iter()
        .map(|uid| relevancy_score(engine.entity(*uid).as_deref(), index_key, query))
        .collect()
}
