//! Core data types: the wide table as loaded and the long table queries run on.

use serde::Serialize;
use std::collections::BTreeSet;

use crate::timeslot::{SlotSequence, TimeSlot};

/// One row of the source file: a (line, station, day, direction) with one
/// value per slot column.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    pub line: String,
    pub station: String,
    pub direction: String,
    pub station_code: Option<String>,
    pub day_type: Option<String>,
    pub operator: Option<String>,
    /// Raw cell text aligned with [`RawTable::slots`]; short rows are padded
    /// with empty cells.
    pub cells: Vec<String>,
}

/// The wide-format table produced by the loader.
#[derive(Debug, Clone)]
pub struct RawTable {
    pub slots: SlotSequence,
    pub records: Vec<RawRecord>,
}

/// One (station, direction, slot) measurement in long form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Observation {
    pub line: String,
    pub station: String,
    pub direction: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub station_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day_type: Option<String>,
    pub time_slot: TimeSlot,
    /// Hour-of-day bucket of `time_slot`.
    pub hour: u8,
    pub value: Option<f64>,
}

/// The immutable long table, loaded once and shared by every query.
#[derive(Debug, Clone)]
pub struct CongestionTable {
    slots: SlotSequence,
    observations: Vec<Observation>,
}

impl CongestionTable {
    pub(crate) fn new(slots: SlotSequence, observations: Vec<Observation>) -> Self {
        Self {
            slots,
            observations,
        }
    }

    pub fn slots(&self) -> &SlotSequence {
        &self.slots
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Distinct line names, sorted.
    pub fn lines(&self) -> Vec<String> {
        distinct(self.observations.iter().map(|o| o.line.as_str()))
    }

    /// Distinct station names of `line` (all lines when `None`), sorted.
    pub fn stations(&self, line: Option<&str>) -> Vec<String> {
        distinct(
            self.observations
                .iter()
                .filter(|o| line.is_none_or(|l| o.line == l))
                .map(|o| o.station.as_str()),
        )
    }

    /// Distinct directions of `line` (all lines when `None`), sorted.
    pub fn directions(&self, line: Option<&str>) -> Vec<String> {
        distinct(
            self.observations
                .iter()
                .filter(|o| line.is_none_or(|l| o.line == l))
                .map(|o| o.direction.as_str()),
        )
    }

    pub fn station_count(&self) -> usize {
        self.stations(None).len()
    }
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    values
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}
