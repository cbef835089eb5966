//! Filter criteria and subset selection.

use std::collections::BTreeSet;
use tracing::debug;

use crate::error::QueryError;
use crate::model::Observation;
use crate::timeslot::{SlotSequence, TimeRange};

/// Direction values that mean "every direction".
const ALL_DIRECTIONS: &[&str] = &["전체", "all"];

/// Optional restrictions on the long table. `None` means unrestricted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterCriteria {
    pub line: Option<String>,
    pub stations: Option<BTreeSet<String>>,
    pub direction: Option<String>,
    pub time_range: Option<TimeRange>,
}

impl FilterCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_line(mut self, line: impl Into<String>) -> Self {
        self.line = Some(line.into());
        self
    }

    /// `전체`, `all` and blank values clear the direction restriction.
    pub fn with_direction(mut self, direction: impl Into<String>) -> Self {
        let direction = direction.into();
        let trimmed = direction.trim();
        self.direction = if trimmed.is_empty()
            || ALL_DIRECTIONS.iter().any(|all| trimmed.eq_ignore_ascii_case(all))
        {
            None
        } else {
            Some(trimmed.to_string())
        };
        self
    }

    pub fn with_stations<I, S>(mut self, stations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.stations = Some(stations.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_time_range(mut self, range: TimeRange) -> Self {
        self.time_range = Some(range);
        self
    }

    /// Resolves `from` / `to` labels against `slots`. A missing bound defaults
    /// to the first or last slot; both missing leaves the range unset.
    pub fn with_time_bounds(
        mut self,
        slots: &SlotSequence,
        from: Option<&str>,
        to: Option<&str>,
    ) -> Result<Self, QueryError> {
        if from.is_none() && to.is_none() {
            return Ok(self);
        }

        let start = match from {
            Some(label) => slots.resolve(label)?,
            None => slots
                .first()
                .ok_or_else(|| QueryError::UnknownTimeSlot(String::new()))?,
        };
        let end = match to {
            Some(label) => slots.resolve(label)?,
            None => slots
                .last()
                .ok_or_else(|| QueryError::UnknownTimeSlot(String::new()))?,
        };

        self.time_range = Some(TimeRange::new(start, end)?);
        Ok(self)
    }

    pub fn matches(&self, observation: &Observation) -> bool {
        self.line.as_ref().is_none_or(|l| observation.line == *l)
            && self
                .direction
                .as_ref()
                .is_none_or(|d| observation.direction == *d)
            && self
                .stations
                .as_ref()
                .is_none_or(|s| s.contains(&observation.station))
            && self
                .time_range
                .as_ref()
                .is_none_or(|r| r.contains(observation.time_slot))
    }
}

/// Returns the observations matching `criteria`, in table order.
pub fn filter<'a>(observations: &'a [Observation], criteria: &FilterCriteria) -> Vec<&'a Observation> {
    let subset: Vec<_> = observations.iter().filter(|o| criteria.matches(o)).collect();
    debug!(
        line = ?criteria.line,
        direction = ?criteria.direction,
        matched = subset.len(),
        "Filter applied"
    );
    subset
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::test_support::{obs, slot};

    fn sample() -> Vec<Observation> {
        vec![
            obs("1호선", "서울역", "상행", "07:30", Some(80.0)),
            obs("1호선", "서울역", "하행", "08:00", Some(90.0)),
            obs("1호선", "시청", "상행", "23:30", Some(30.0)),
            obs("1호선", "시청", "상행", "00:30", None),
            obs("2호선", "강남", "내선", "08:00", Some(150.0)),
        ]
    }

    #[test]
    fn test_empty_criteria_matches_everything() {
        let data = sample();
        assert_eq!(filter(&data, &FilterCriteria::new()).len(), 5);
    }

    #[test]
    fn test_filter_by_line_and_direction() {
        let data = sample();
        let criteria = FilterCriteria::new().with_line("1호선").with_direction("상행");
        let subset = filter(&data, &criteria);
        assert_eq!(subset.len(), 3);
        assert!(subset.iter().all(|o| o.line == "1호선" && o.direction == "상행"));
    }

    #[test]
    fn test_all_direction_is_unrestricted() {
        assert_eq!(FilterCriteria::new().with_direction("전체").direction, None);
        assert_eq!(FilterCriteria::new().with_direction("ALL").direction, None);
        assert_eq!(FilterCriteria::new().with_direction(" ").direction, None);
        assert_eq!(
            FilterCriteria::new().with_direction(" 하행 ").direction.as_deref(),
            Some("하행")
        );
    }

    #[test]
    fn test_filter_by_stations() {
        let data = sample();
        let criteria = FilterCriteria::new().with_stations(["시청", "강남"]);
        let stations: BTreeSet<_> = filter(&data, &criteria)
            .iter()
            .map(|o| o.station.clone())
            .collect();
        assert_eq!(stations, BTreeSet::from(["강남".to_string(), "시청".to_string()]));
    }

    #[test]
    fn test_time_range_uses_service_day_order() {
        let data = sample();
        let range = TimeRange::new(slot("23:00"), slot("00:30")).unwrap();
        let subset = filter(&data, &FilterCriteria::new().with_time_range(range));
        assert_eq!(subset.len(), 2);
        assert!(subset.iter().all(|o| o.station == "시청"));
    }

    #[test]
    fn test_with_time_bounds() {
        let slots = SlotSequence::canonical();

        let criteria = FilterCriteria::new()
            .with_time_bounds(&slots, Some("07:00"), None)
            .unwrap();
        let range = criteria.time_range.unwrap();
        assert_eq!(range.start, slot("07:00"));
        assert_eq!(range.end, slot("00:30"));

        let unset = FilterCriteria::new().with_time_bounds(&slots, None, None).unwrap();
        assert_eq!(unset.time_range, None);

        assert!(matches!(
            FilterCriteria::new().with_time_bounds(&slots, Some("09:00"), Some("07:00")),
            Err(QueryError::InvalidTimeRange { .. })
        ));
        assert!(matches!(
            FilterCriteria::new().with_time_bounds(&slots, Some("07:10"), None),
            Err(QueryError::UnknownTimeSlot(_))
        ));
    }

    #[test]
    fn test_no_match_is_empty_not_error() {
        let data = sample();
        let criteria = FilterCriteria::new().with_line("9호선");
        assert!(filter(&data, &criteria).is_empty());
    }
}
