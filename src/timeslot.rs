//! Time-of-day slots and their service-day ordering.
//!
//! Slot labels cross midnight (`23:30`, `00:00`, `00:30`), so ordering is by
//! a service-day ordinal rather than by label: hours before
//! [`ROLLOVER_HOUR`] count as the next day.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{DataLoadError, QueryError};

/// Hours strictly before this one belong to the previous service day.
pub const ROLLOVER_HOUR: u8 = 5;

/// Spacing of the canonical slot grid.
pub const SLOT_STEP_MINUTES: u16 = 30;

const CANONICAL_FIRST_ORDINAL: u16 = 5 * 60 + 30;
const CANONICAL_LAST_ORDINAL: u16 = 24 * 60 + 30;

/// A labelled time-of-day slot such as `08:30`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeSlot {
    hour: u8,
    minute: u8,
}

impl TimeSlot {
    /// Returns `None` unless `hour < 24` (24 is accepted as midnight) and `minute < 60`.
    pub fn new(hour: u8, minute: u8) -> Option<Self> {
        let hour = if hour == 24 { 0 } else { hour };
        if hour >= 24 || minute >= 60 {
            return None;
        }
        Some(Self { hour, minute })
    }

    /// Parses a header or user label.
    ///
    /// Accepts `05:30`, `5:30`, `5시30분` and `5시` (minutes default to zero).
    pub fn parse_label(label: &str) -> Option<Self> {
        let cleaned = label.trim().replace('시', ":").replace('분', "");
        let (hour, minute) = cleaned.split_once(':')?;
        let hour = hour.trim();
        let minute = minute.trim();
        if hour.is_empty() || !hour.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        if !minute.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let minute = if minute.is_empty() { 0 } else { minute.parse().ok()? };
        Self::new(hour.parse().ok()?, minute)
    }

    fn from_ordinal(ordinal: u16) -> Self {
        let minutes = ordinal % (24 * 60);
        Self {
            hour: (minutes / 60) as u8,
            minute: (minutes % 60) as u8,
        }
    }

    pub fn hour(&self) -> u8 {
        self.hour
    }

    pub fn minute(&self) -> u8 {
        self.minute
    }

    /// Minutes since 00:00 of the service day; `00:30` maps to 1470.
    pub fn ordinal(&self) -> u16 {
        let hour = if self.hour < ROLLOVER_HOUR {
            self.hour as u16 + 24
        } else {
            self.hour as u16
        };
        hour * 60 + self.minute as u16
    }

    pub fn label(&self) -> String {
        format!("{:02}:{:02}", self.hour, self.minute)
    }
}

impl Ord for TimeSlot {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.ordinal().cmp(&other.ordinal())
    }
}

impl PartialOrd for TimeSlot {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl FromStr for TimeSlot {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_label(s).ok_or_else(|| QueryError::UnknownTimeSlot(s.to_string()))
    }
}

impl TryFrom<String> for TimeSlot {
    type Error = QueryError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TimeSlot> for String {
    fn from(slot: TimeSlot) -> Self {
        slot.label()
    }
}

/// Inclusive range of slots, compared by service-day ordinal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeRange {
    pub start: TimeSlot,
    pub end: TimeSlot,
}

impl TimeRange {
    pub fn new(start: TimeSlot, end: TimeSlot) -> Result<Self, QueryError> {
        if start > end {
            return Err(QueryError::InvalidTimeRange {
                start: start.label(),
                end: end.label(),
            });
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, slot: TimeSlot) -> bool {
        self.start <= slot && slot <= self.end
    }
}

/// The ordered slot columns of a loaded table.
///
/// Always strictly increasing by ordinal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SlotSequence(Vec<TimeSlot>);

impl SlotSequence {
    /// Validates that `slots` is non-empty and strictly increasing by ordinal.
    pub fn new(slots: Vec<TimeSlot>) -> Result<Self, DataLoadError> {
        if slots.is_empty() {
            return Err(DataLoadError::NoTimeSlots);
        }
        for pair in slots.windows(2) {
            if pair[0] >= pair[1] {
                return Err(DataLoadError::SlotOrder {
                    previous: pair[0].label(),
                    current: pair[1].label(),
                });
            }
        }
        Ok(Self(slots))
    }

    /// `05:30` through `00:30` at [`SLOT_STEP_MINUTES`] spacing.
    pub fn canonical() -> Self {
        let slots = (CANONICAL_FIRST_ORDINAL..=CANONICAL_LAST_ORDINAL)
            .step_by(SLOT_STEP_MINUTES as usize)
            .map(TimeSlot::from_ordinal)
            .collect();
        Self(slots)
    }

    pub fn is_canonical(&self) -> bool {
        *self == Self::canonical()
    }

    pub fn as_slice(&self) -> &[TimeSlot] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn first(&self) -> Option<TimeSlot> {
        self.0.first().copied()
    }

    pub fn last(&self) -> Option<TimeSlot> {
        self.0.last().copied()
    }

    pub fn position(&self, slot: TimeSlot) -> Option<usize> {
        self.0.binary_search(&slot).ok()
    }

    /// Parses `label` and requires the slot to be one of this sequence's columns.
    pub fn resolve(&self, label: &str) -> Result<TimeSlot, QueryError> {
        let slot: TimeSlot = label.parse()?;
        self.position(slot)
            .map(|_| slot)
            .ok_or_else(|| QueryError::UnknownTimeSlot(label.to_string()))
    }

    /// Slots inside `range`, or all slots when there is no range.
    pub fn within(&self, range: Option<&TimeRange>) -> Vec<TimeSlot> {
        match range {
            Some(range) => self.0.iter().copied().filter(|s| range.contains(*s)).collect(),
            None => self.0.clone(),
        }
    }
}
