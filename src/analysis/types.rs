//! Data types produced by the query pipeline.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::QueryError;
use crate::timeslot::TimeSlot;

/// Smallest accepted Top-N / heatmap row count.
pub const MIN_ROWS: usize = 5;
/// Largest accepted Top-N / heatmap row count.
pub const MAX_ROWS: usize = 50;
/// Row count used when the caller does not choose one.
pub const DEFAULT_ROWS: usize = 20;

/// A row count clamped to `[MIN_ROWS, MAX_ROWS]`.
///
/// Used for both the ranking Top-N and the heatmap row limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RowLimit(usize);

impl RowLimit {
    pub fn clamped(n: usize) -> Self {
        Self(n.clamp(MIN_ROWS, MAX_ROWS))
    }

    pub fn get(self) -> usize {
        self.0
    }
}

impl Default for RowLimit {
    fn default() -> Self {
        Self(DEFAULT_ROWS)
    }
}

impl From<usize> for RowLimit {
    fn from(n: usize) -> Self {
        Self::clamped(n)
    }
}

/// Per-station statistics over a filtered subset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationSummary {
    pub station: String,
    pub peak_value: f64,
    /// Earliest slot at which `peak_value` occurs.
    pub peak_time_slot: TimeSlot,
    pub mean_value: f64,
    pub sample_count: usize,
}

/// One row of a Top-N ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingEntry {
    pub rank: usize,
    pub station: String,
    pub peak_value: f64,
    pub mean_value: f64,
    pub peak_time_slot: TimeSlot,
}

/// Headline figures for a filtered subset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverviewStats {
    pub station_count: usize,
    pub observation_count: usize,
    pub max_value: f64,
    pub mean_value: f64,
}

/// A single point of a station's time series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub direction: String,
    pub time_slot: TimeSlot,
    pub value: f64,
}

/// KPIs and time series of one station under the active filter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationProfile {
    pub summary: StationSummary,
    /// Ordered by direction, then slot.
    pub series: Vec<SeriesPoint>,
}

/// Row ordering of a heatmap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortMode {
    #[default]
    Alphabetical,
    PeakValueDesc,
}

impl FromStr for SortMode {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "alphabetical" | "name" | "가나다순" => Ok(SortMode::Alphabetical),
            "peak" | "peak_value_desc" | "피크 혼잡도순" => Ok(SortMode::PeakValueDesc),
            other => Err(QueryError::UnknownSortMode(other.to_string())),
        }
    }
}

/// Aggregates over the present cells of a heatmap.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatrixStats {
    pub max_value: f64,
    pub mean_value: f64,
    pub min_value: f64,
}

/// A station x slot grid. `cells[row][col]` is `None` where no value exists.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatmapMatrix {
    pub stations: Vec<String>,
    pub slots: Vec<TimeSlot>,
    pub cells: Vec<Vec<Option<f64>>>,
    pub sort_mode: SortMode,
    pub stats: Option<MatrixStats>,
}

impl HeatmapMatrix {
    pub fn cell(&self, station: &str, slot: TimeSlot) -> Option<f64> {
        let row = self.stations.iter().position(|s| s == station)?;
        let col = self.slots.iter().position(|s| *s == slot)?;
        self.cells[row][col]
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }
}
