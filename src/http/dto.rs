//! Data Transfer Objects for the HTTP API.
//!
//! View payloads (rankings, heatmaps, profiles) are serialized straight from
//! [`crate::dashboard`]; this module holds the query-string shape and the
//! catalog responses.

use serde::{Deserialize, Serialize};

use crate::analysis::OverviewStats;
use crate::dashboard::FilterParams;
use crate::timeslot::TimeSlot;

/// Query parameters shared by the view endpoints.
///
/// `stations` is a comma-separated list used by `/v1/compare`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ViewQuery {
    pub line: Option<String>,
    pub direction: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub top_n: Option<usize>,
    pub limit: Option<usize>,
    pub sort: Option<String>,
    pub stations: Option<String>,
}

impl ViewQuery {
    pub fn filter_params(&self) -> FilterParams {
        FilterParams {
            line: self.line.clone(),
            direction: self.direction.clone(),
            from: self.from.clone(),
            to: self.to.clone(),
        }
    }

    pub fn station_list(&self) -> Vec<String> {
        self.stations
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub observations: usize,
    pub stations: usize,
    pub lines: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinesResponse {
    pub lines: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StationsResponse {
    pub line: String,
    pub stations: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectionsResponse {
    pub line: String,
    pub directions: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotsResponse {
    pub slots: Vec<TimeSlot>,
    pub canonical: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct OverviewResponse {
    pub overview: Option<OverviewStats>,
}
