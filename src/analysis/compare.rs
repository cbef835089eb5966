//! Side-by-side comparison of a few stations.

use crate::analysis::summary::station_profile;
use crate::analysis::types::StationProfile;
use crate::error::QueryError;
use crate::model::Observation;

/// Most stations a comparison accepts.
pub const MAX_COMPARE_STATIONS: usize = 3;

/// Profiles of `stations` within `subset`, in request order.
///
/// Repeated names count once. Stations without data under the filter are
/// left out of the result.
pub fn compare_stations(
    subset: &[&Observation],
    stations: &[String],
    max: usize,
) -> Result<Vec<StationProfile>, QueryError> {
    let mut requested: Vec<&str> = Vec::with_capacity(stations.len());
    for station in stations {
        let station = station.trim();
        if !station.is_empty() && !requested.contains(&station) {
            requested.push(station);
        }
    }

    if requested.len() > max {
        return Err(QueryError::TooManyStations {
            max,
            got: requested.len(),
        });
    }

    Ok(requested
        .into_iter()
        .filter_map(|station| station_profile(subset.iter().copied(), station))
        .collect())
}
