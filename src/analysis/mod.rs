//! Query pipeline over the long table.
//!
//! Filtering selects a subset of observations; summaries, rankings,
//! comparisons and heatmap matrices are pure functions of that subset.

pub mod compare;
pub mod filter;
pub mod heatmap;
pub mod ranking;
pub mod summary;
pub mod types;
pub mod utility;

pub use compare::{MAX_COMPARE_STATIONS, compare_stations};
pub use filter::{FilterCriteria, filter};
pub use heatmap::build_matrix;
pub use ranking::rank;
pub use summary::{overview, station_profile, summarize};
pub use types::{
    HeatmapMatrix, MatrixStats, OverviewStats, RankingEntry, RowLimit, SeriesPoint, SortMode,
    StationProfile, StationSummary,
};

#[cfg(test)]
pub(crate) mod test_support {
    use crate::model::Observation;
    use crate::timeslot::TimeSlot;

    pub fn slot(label: &str) -> TimeSlot {
        TimeSlot::parse_label(label).unwrap()
    }

    pub fn obs(line: &str, station: &str, direction: &str, time: &str, value: Option<f64>) -> Observation {
        let time_slot = slot(time);
        Observation {
            line: line.to_string(),
            station: station.to_string(),
            direction: direction.to_string(),
            station_code: None,
            day_type: None,
            time_slot,
            hour: time_slot.hour(),
            value,
        }
    }
}
