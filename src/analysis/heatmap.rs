//! Station x slot matrix for heatmap rendering.

use std::collections::BTreeMap;
use tracing::debug;

use crate::analysis::ranking::by_peak_desc;
use crate::analysis::summary::summarize;
use crate::analysis::types::{HeatmapMatrix, MatrixStats, RowLimit, SortMode, StationSummary};
use crate::analysis::utility::{extremes, mean};
use crate::model::Observation;
use crate::timeslot::TimeSlot;

/// Pivots `subset` into a matrix with one column per entry of `slots`.
///
/// Rows are the stations holding at least one present value, ordered by
/// `sort_mode` and cut to `limit` (clamped to the accepted row range).
/// Several observations in one cell (different directions or day types)
/// are averaged. Cells without a value are `None`. `stats` cover every
/// present value of the shown rows and columns.
pub fn build_matrix(
    subset: &[&Observation],
    slots: &[TimeSlot],
    sort_mode: SortMode,
    limit: usize,
) -> HeatmapMatrix {
    let limit = RowLimit::clamped(limit);

    let summaries = summarize(subset.iter().copied());
    let mut ordered: Vec<&StationSummary> = summaries.values().collect();
    if sort_mode == SortMode::PeakValueDesc {
        ordered.sort_by(|a, b| by_peak_desc(a, b));
    }
    let stations: Vec<String> = ordered
        .into_iter()
        .take(limit.get())
        .map(|s| s.station.clone())
        .collect();

    let row_of: BTreeMap<&str, usize> = stations
        .iter()
        .enumerate()
        .map(|(idx, s)| (s.as_str(), idx))
        .collect();
    let col_of: BTreeMap<TimeSlot, usize> = slots.iter().enumerate().map(|(idx, s)| (*s, idx)).collect();

    let mut buckets: Vec<Vec<Vec<f64>>> = vec![vec![Vec::new(); slots.len()]; stations.len()];
    for observation in subset {
        let (Some(value), Some(row), Some(col)) = (
            observation.value,
            row_of.get(observation.station.as_str()),
            col_of.get(&observation.time_slot),
        ) else {
            continue;
        };
        buckets[*row][*col].push(value);
    }

    let cells: Vec<Vec<Option<f64>>> = buckets
        .iter()
        .map(|row| row.iter().map(|values| mean(values)).collect())
        .collect();

    // Stats use the raw values behind the cells, not the cell means.
    let present: Vec<f64> = buckets.iter().flatten().flatten().copied().collect();
    let stats = extremes(&present).and_then(|(max_value, min_value)| {
        Some(MatrixStats {
            max_value,
            mean_value: mean(&present)?,
            min_value,
        })
    });

    debug!(
        rows = stations.len(),
        columns = slots.len(),
        present = present.len(),
        "Heatmap matrix built"
    );

    HeatmapMatrix {
        stations,
        slots: slots.to_vec(),
        cells,
        sort_mode,
        stats,
    }
}
