//! The loaded table plus the views built from it.
//!
//! A [`Dashboard`] is created once at startup and only read afterwards; the
//! CLI borrows it and the HTTP server shares it behind an `Arc`.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::analysis::{
    self, FilterCriteria, HeatmapMatrix, MAX_COMPARE_STATIONS, OverviewStats, RankingEntry,
    SortMode, StationProfile,
};
use crate::config::DashboardConfig;
use crate::error::{DataLoadError, QueryError};
use crate::model::CongestionTable;
use crate::reshape::load_table;
use crate::timeslot::SlotSequence;

/// Filter inputs as they arrive from a caller, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FilterParams {
    pub line: Option<String>,
    pub direction: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
}

impl FilterParams {
    /// Validates time bounds against `slots` and builds the criteria.
    pub fn to_criteria(&self, slots: &SlotSequence) -> Result<FilterCriteria, QueryError> {
        let mut criteria = FilterCriteria::new();
        if let Some(line) = self.line.as_deref().map(str::trim).filter(|l| !l.is_empty()) {
            criteria = criteria.with_line(line);
        }
        if let Some(direction) = &self.direction {
            criteria = criteria.with_direction(direction.as_str());
        }
        criteria.with_time_bounds(slots, self.from.as_deref(), self.to.as_deref())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RankingView {
    pub line: Option<String>,
    pub direction: Option<String>,
    pub top_n: usize,
    /// `None` when the filter matches no present value.
    pub overview: Option<OverviewStats>,
    pub entries: Vec<RankingEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompareView {
    pub requested: Vec<String>,
    pub profiles: Vec<StationProfile>,
}

pub struct Dashboard {
    table: CongestionTable,
    config: DashboardConfig,
}

impl Dashboard {
    /// Loads the configured data file. Any failure is fatal for the caller.
    pub fn load(config: DashboardConfig) -> Result<Self, DataLoadError> {
        let table = load_table(&config.data_path, &config.encodings)?;
        info!(
            path = %config.data_path.display(),
            observations = table.len(),
            stations = table.station_count(),
            lines = table.lines().len(),
            "Dashboard data ready"
        );
        Ok(Self::new(table, config))
    }

    pub fn new(table: CongestionTable, config: DashboardConfig) -> Self {
        Self { table, config }
    }

    pub fn table(&self) -> &CongestionTable {
        &self.table
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    fn criteria(&self, params: &FilterParams) -> Result<FilterCriteria, QueryError> {
        params.to_criteria(self.table.slots())
    }

    /// Top-N stations by peak value. `top_n` defaults to the configured value.
    pub fn ranking(&self, params: &FilterParams, top_n: Option<usize>) -> Result<RankingView, QueryError> {
        let criteria = self.criteria(params)?;
        let top_n = top_n.unwrap_or(self.config.default_top_n.get());

        let subset = analysis::filter(self.table.observations(), &criteria);
        let summaries = analysis::summarize(subset.iter().copied());
        let entries = analysis::rank(summaries.values(), top_n);

        Ok(RankingView {
            line: criteria.line,
            direction: criteria.direction,
            top_n: analysis::RowLimit::clamped(top_n).get(),
            overview: analysis::overview(subset.iter().copied()),
            entries,
        })
    }

    pub fn overview(&self, params: &FilterParams) -> Result<Option<OverviewStats>, QueryError> {
        let criteria = self.criteria(params)?;
        let subset = analysis::filter(self.table.observations(), &criteria);
        Ok(analysis::overview(subset.iter().copied()))
    }

    /// Heatmap over the slots inside the requested time range.
    pub fn heatmap(
        &self,
        params: &FilterParams,
        sort: Option<&str>,
        limit: Option<usize>,
    ) -> Result<HeatmapMatrix, QueryError> {
        let criteria = self.criteria(params)?;
        let sort_mode = sort.map(str::parse::<SortMode>).transpose()?.unwrap_or_default();
        let limit = limit.unwrap_or(self.config.default_heatmap_rows.get());

        let subset = analysis::filter(self.table.observations(), &criteria);
        let slots = self.table.slots().within(criteria.time_range.as_ref());
        Ok(analysis::build_matrix(&subset, &slots, sort_mode, limit))
    }

    /// Profile of one station; `Ok(None)` when it has no data under the filter.
    pub fn station(&self, params: &FilterParams, station: &str) -> Result<Option<StationProfile>, QueryError> {
        let criteria = self.criteria(params)?.with_stations([station]);
        let subset = analysis::filter(self.table.observations(), &criteria);
        Ok(analysis::station_profile(subset.iter().copied(), station))
    }

    pub fn compare(&self, params: &FilterParams, stations: &[String]) -> Result<CompareView, QueryError> {
        let criteria = self.criteria(params)?;
        let subset = analysis::filter(self.table.observations(), &criteria);
        let profiles = analysis::compare_stations(&subset, stations, MAX_COMPARE_STATIONS)?;

        Ok(CompareView {
            requested: stations.to_vec(),
            profiles,
        })
    }
}
