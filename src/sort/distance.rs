//! Geographic distance sort keys.
//!
//! An entity carries a canonical `latitude`/`longitude` pair and any number of
//! numbered pairs (`latitude000`/`longitude000`, ...). Each of its occurrences
//! in a result list is matched with one of those pairs: the first occurrence
//! with the nearest, the second with the next nearest, and so on, clamped to
//! the farthest.

use ahash::AHashMap;
use rayon::prelude::*;

use crate::engine::SearchEngine;
use crate::entity::Entity;
use crate::error::{QuiverError, Result};
use crate::posting::EntityUid;

pub const EARTH_RADIUS_MILES: f64 = 3963.1;

/// Distance reported between identical points. `0.0` means no coordinates.
pub const SAME_POINT_DISTANCE: f64 = 0.000001;

pub const LATITUDE_ATTRIBUTE: &str = "latitude";
pub const LONGITUDE_ATTRIBUTE: &str = "longitude";

/// Numbered pairs probed per entity.
pub const MAX_NUMBERED_COORDINATES: usize = 1000;

/// Consecutive missing numbered pairs that end the probe.
pub const MAX_COORDINATE_MISSES: usize = 3;

pub fn validate_coordinates(latitude: f64, longitude: f64) -> Result<()> {
    if !(-90.0..=90.0).contains(&latitude) {
        return Err(QuiverError::invalid_argument(format!(
            "latitude {latitude} is outside [-90, 90]"
        )));
    }
    if !(-180.0..=180.0).contains(&longitude) {
        return Err(QuiverError::invalid_argument(format!(
            "longitude {longitude} is outside [-180, 180]"
        )));
    }
    Ok(())
}

/// Great-circle distance in miles, spherical law of cosines with the
/// longitude difference expanded into per-point terms.
pub fn calculate_geo_coord_distance_miles(
    latitude_a: f64,
    longitude_a: f64,
    latitude_b: f64,
    longitude_b: f64,
) -> f64 {
    if latitude_a == latitude_b && longitude_a == longitude_b {
        return SAME_POINT_DISTANCE;
    }

    let (lat1, lon1) = (latitude_a.to_radians(), longitude_a.to_radians());
    let (lat2, lon2) = (latitude_b.to_radians(), longitude_b.to_radians());

    let cosine = lat1.cos() * lon1.cos() * lat2.cos() * lon2.cos()
        + lat1.cos() * lon1.sin() * lat2.cos() * lon2.sin()
        + lat1.sin() * lat2.sin();

    cosine.clamp(-1.0, 1.0).acos() * EARTH_RADIUS_MILES
}

/// Every coordinate pair an entity carries, canonical pair first.
pub fn geo_coords(entity: &dyn Entity) -> Vec<(f64, f64)> {
    let mut coords = Vec::new();
    if let Some(pair) = coord_pair(entity, LATITUDE_ATTRIBUTE, LONGITUDE_ATTRIBUTE) {
        coords.push(pair);
    }

    let mut misses = 0;
    for id in 0..MAX_NUMBERED_COORDINATES {
        let latitude = format!("{LATITUDE_ATTRIBUTE}{id:03}");
        let longitude = format!("{LONGITUDE_ATTRIBUTE}{id:03}");
        match coord_pair(entity, &latitude, &longitude) {
            Some(pair) => {
                coords.push(pair);
                misses = 0;
            }
            None => {
                misses += 1;
                if misses >= MAX_COORDINATE_MISSES {
                    break;
                }
            }
        }
    }
    coords
}

fn coord_pair(entity: &dyn Entity, latitude: &str, longitude: &str) -> Option<(f64, f64)> {
    if !entity.exists(latitude) || !entity.exists(longitude) {
        return None;
    }
    Some((entity.get_double(latitude)?, entity.get_double(longitude)?))
}

/// Distance from the query point to the `occurrence`-th nearest pair of the
/// entity, `None` when it has no coordinates.
pub fn determine_geo_coords(
    entity: &dyn Entity,
    latitude: f64,
    longitude: f64,
    occurrence: usize,
) -> Option<f64> {
    let mut distances: Vec<f64> = geo_coords(entity)
        .into_iter()
        .map(|(lat, lon)| calculate_geo_coord_distance_miles(latitude, longitude, lat, lon))
        .collect();
    if distances.is_empty() {
        return None;
    }

    distances.sort_by(f64::total_cmp);
    let position = occurrence.min(distances.len() - 1);
    Some(distances[position])
}

/// For each position, how many times its uid appeared at earlier positions.
pub fn occurrences(uids: &[EntityUid]) -> Vec<usize> {
    let mut seen: AHashMap<EntityUid, usize> = AHashMap::new();
    uids.iter()
        .map(|uid| {
            let count = seen.entry(*uid).or_insert(0);
            let occurrence = *count;
            *count += 1;
            occurrence
        })
        .collect()
}

pub(crate) fn build_distances(
    engine: &SearchEngine,
    uids: &[EntityUid],
    latitude: f64,
    longitude: f64,
) -> Vec<f64> {
    let occurrences = occurrences(uids);
    uids.par_iter()
        .zip(occurrences.par_iter())
        .map(|(uid, occurrence)| {
            engine
                .entity(*uid)
                .and_then(|entity| {
                    determine_geo_coords(entity.as_ref(), latitude, longitude, *occurrence)
                })
                .unwrap_or(0.0)
        })
        .collect()
}
