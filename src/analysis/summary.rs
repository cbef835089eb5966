//! Per-station statistics over a filtered subset.

use std::collections::{BTreeMap, BTreeSet};

use crate::analysis::types::{OverviewStats, SeriesPoint, StationProfile, StationSummary};
use crate::analysis::utility::{extremes, mean};
use crate::model::Observation;
use crate::timeslot::TimeSlot;

#[derive(Default)]
struct Accumulator {
    peak: Option<(f64, TimeSlot)>,
    sum: f64,
    count: usize,
}

impl Accumulator {
    fn push(&mut self, value: f64, slot: TimeSlot) {
        self.sum += value;
        self.count += 1;
        self.peak = match self.peak {
            Some((peak, peak_slot)) if peak > value || (peak == value && peak_slot <= slot) => {
                Some((peak, peak_slot))
            }
            _ => Some((value, slot)),
        };
    }

    fn finish(self, station: String) -> Option<StationSummary> {
        let (peak_value, peak_time_slot) = self.peak?;
        Some(StationSummary {
            station,
            peak_value,
            peak_time_slot,
            mean_value: self.sum / self.count as f64,
            sample_count: self.count,
        })
    }
}

/// Summarizes each station of `subset`.
///
/// Missing values are ignored; a station with no present value has no entry.
/// The peak slot is the earliest slot holding the maximum.
pub fn summarize<'a, I>(subset: I) -> BTreeMap<String, StationSummary>
where
    I: IntoIterator<Item = &'a Observation>,
{
    let mut accumulators: BTreeMap<&'a str, Accumulator> = BTreeMap::new();

    for observation in subset {
        if let Some(value) = observation.value {
            accumulators
                .entry(observation.station.as_str())
                .or_default()
                .push(value, observation.time_slot);
        }
    }

    accumulators
        .into_iter()
        .filter_map(|(station, acc)| acc.finish(station.to_string()).map(|s| (station.to_string(), s)))
        .collect()
}

/// Station count, maximum and mean over the present values of `subset`.
///
/// Stations whose values are all missing are not counted.
///
/// Returns `None` when `subset` holds no present value.
pub fn overview<'a, I>(subset: I) -> Option<OverviewStats>
where
    I: IntoIterator<Item = &'a Observation>,
{
    let mut stations = BTreeSet::new();
    let mut values = Vec::new();

    for observation in subset {
        if let Some(value) = observation.value {
            stations.insert(observation.station.as_str());
            values.push(value);
        }
    }

    let (max_value, _) = extremes(&values)?;
    Some(OverviewStats {
        station_count: stations.len(),
        observation_count: values.len(),
        max_value,
        mean_value: mean(&values)?,
    })
}

/// KPIs and time series of `station` within `subset`.
pub fn station_profile<'a, I>(subset: I, station: &str) -> Option<StationProfile>
where
    I: IntoIterator<Item = &'a Observation>,
{
    let rows: Vec<&Observation> = subset.into_iter().filter(|o| o.station == station).collect();
    let summary = summarize(rows.iter().copied()).remove(station)?;

    let mut series: Vec<SeriesPoint> = rows
        .iter()
        .filter_map(|o| {
            o.value.map(|value| SeriesPoint {
                direction: o.direction.clone(),
                time_slot: o.time_slot,
                value,
            })
        })
        .collect();
    series.sort_by(|a, b| {
        a.direction
            .cmp(&b.direction)
            .then_with(|| a.time_slot.cmp(&b.time_slot))
    });

    Some(StationProfile { summary, series })
}
