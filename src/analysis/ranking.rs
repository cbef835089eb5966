//! Top-N ranking by peak congestion.

use std::cmp::Ordering;

use crate::analysis::types::{RankingEntry, RowLimit, StationSummary};

/// Orders summaries by peak value descending, then station name ascending.
pub(crate) fn by_peak_desc(a: &StationSummary, b: &StationSummary) -> Ordering {
    b.peak_value
        .total_cmp(&a.peak_value)
        .then_with(|| a.station.cmp(&b.station))
}

/// Ranks `summaries` by peak value and keeps the first `top_n`.
///
/// `top_n` is clamped to the accepted row range. Equal peaks are ordered by
/// station name. Fewer qualifying stations than `top_n` yields all of them.
pub fn rank<'a, I>(summaries: I, top_n: usize) -> Vec<RankingEntry>
where
    I: IntoIterator<Item = &'a StationSummary>,
{
    let top_n = RowLimit::clamped(top_n);
    let mut ordered: Vec<&StationSummary> = summaries.into_iter().collect();
    ordered.sort_by(|a, b| by_peak_desc(a, b));

    ordered
        .into_iter()
        .take(top_n.get())
        .enumerate()
        .map(|(idx, s)| RankingEntry {
            rank: idx + 1,
            station: s.station.clone(),
            peak_value: s.peak_value,
            mean_value: s.mean_value,
            peak_time_slot: s.peak_time_slot,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::filter::{FilterCriteria, filter};
    use crate::analysis::summary::summarize;
    use crate::analysis::test_support::{obs, slot};

    fn summary(station: &str, peak: f64, peak_slot: &str) -> StationSummary {
        StationSummary {
            station: station.to_string(),
            peak_value: peak,
            peak_time_slot: slot(peak_slot),
            mean_value: peak / 2.0,
            sample_count: 1,
        }
    }

    #[test]
    fn test_rank_orders_by_peak_desc() {
        let summaries = vec![
            summary("A", 50.0, "07:00"),
            summary("B", 150.0, "08:00"),
            summary("C", 90.0, "18:00"),
        ];

        let ranking = rank(&summaries, 20);
        let order: Vec<_> = ranking.iter().map(|e| (e.rank, e.station.as_str())).collect();
        assert_eq!(order, vec![(1, "B"), (2, "C"), (3, "A")]);
        assert_eq!(ranking[0].peak_time_slot, slot("08:00"));
        assert_eq!(ranking[0].mean_value, 75.0);
    }

    #[test]
    fn test_rank_tie_breaks_by_station_name() {
        // Earlier peak time does not win a tie; the name does.
        let summaries = vec![summary("B", 150.0, "07:30"), summary("A", 150.0, "08:00")];

        let ranking = rank(&summaries, 5);
        assert_eq!(ranking[0].station, "A");
        assert_eq!(ranking[1].station, "B");
    }

    #[test]
    fn test_rank_truncates_to_clamped_top_n() {
        let summaries: Vec<_> = (0..60)
            .map(|i| summary(&format!("S{:02}", i), i as f64, "08:00"))
            .collect();

        assert_eq!(rank(&summaries, 3).len(), 5);
        assert_eq!(rank(&summaries, 10).len(), 10);
        assert_eq!(rank(&summaries, 500).len(), 50);
        assert_eq!(rank(&summaries, 10)[0].station, "S59");
    }

    #[test]
    fn test_rank_with_fewer_stations_than_top_n() {
        let summaries = vec![summary("A", 1.0, "08:00"), summary("B", 2.0, "08:00")];
        let ranking = rank(&summaries, 20);
        assert_eq!(ranking.len(), 2);
        assert_eq!(ranking[1].rank, 2);
    }

    #[test]
    fn test_rank_pipeline_is_strictly_ordered() {
        let data = vec![
            obs("1호선", "서울역", "상행", "08:00", Some(130.0)),
            obs("1호선", "서울역", "하행", "08:30", Some(140.0)),
            obs("1호선", "시청", "상행", "08:00", Some(140.0)),
            obs("1호선", "종각", "상행", "18:00", None),
            obs("1호선", "종로3가", "상행", "18:00", Some(60.0)),
            obs("2호선", "강남", "내선", "08:00", Some(200.0)),
        ];

        let subset = filter(&data, &FilterCriteria::new().with_line("1호선"));
        let summaries = summarize(subset.iter().copied());
        let ranking = rank(summaries.values(), 5);

        let stations: Vec<_> = ranking.iter().map(|e| e.station.as_str()).collect();
        assert_eq!(stations, vec!["서울역", "시청", "종로3가"]);
        for pair in ranking.windows(2) {
            assert!(
                pair[0].peak_value > pair[1].peak_value
                    || (pair[0].peak_value == pair[1].peak_value && pair[0].station < pair[1].station)
            );
        }
    }
}
